//! Response language selection
//!
//! The assistant answers in the language of the question. Detection is a
//! fixed marker-word scan: the presence of any French market-vocabulary word
//! selects French, otherwise English. This only affects the phrasing
//! instruction passed to the LLM, never the data fetched.

use serde::{Deserialize, Serialize};
use std::fmt;

/// French marker words checked against the lowercased query
///
/// Accented and unaccented market vocabulary, plus common imperative forms
/// ("donnez-moi...") that rarely appear in English questions.
const FRENCH_MARKERS: &[&str] = &[
    "analyse",
    "action",
    "bourse",
    "cours",
    "résultats",
    "marché",
    "actualité",
    "dernières",
    "récentes",
    "donnez",
    "donne",
];

/// Languages the assistant can answer in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Language {
    /// English
    #[default]
    English,
    /// French
    French,
}

impl Language {
    /// Detect the response language for a query
    pub fn detect(query: &str) -> Self {
        let query_lower = query.to_lowercase();
        if FRENCH_MARKERS.iter().any(|m| query_lower.contains(m)) {
            Language::French
        } else {
            Language::English
        }
    }

    /// Get ISO 639-1 language code
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::French => "fr",
        }
    }

    /// Get language name for display and prompt instructions
    pub fn name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::French => "French",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
