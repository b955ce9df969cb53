//! Prompt builders for the synthesis step
//!
//! Two fixed templates, aimed at instruct-tuned models. The rules are
//! deliberately blunt: synthesis may only reorganize data that was already
//! fetched, so every number in the output must appear verbatim in the
//! source blocks.

use crate::language::Language;

/// Attribution label for the market data block
pub const FINANCIAL_SOURCE: &str = "Market Data API";

/// Attribution label for the web search block
pub const WEB_SOURCE: &str = "Web Search";

/// Build the strict dual-source synthesis prompt
pub fn synthesis_prompt(lang: Language, financial_data: &str, web_data: &str) -> String {
    let lang = lang.name();
    format!(
        r"[INST] You are a financial data formatter. Your ONLY job is to reorganize the data below.

## ABSOLUTE RULES - VIOLATION = FAILURE

1. COPY ONLY: Every number in your response MUST appear exactly in the SOURCE DATA below
2. NO INVENTION: Do NOT create any numbers, percentages, prices, or dates
3. NO EXTERNAL KNOWLEDGE: Ignore everything you know about stocks. Use ONLY the data below.
4. CITE SOURCES: Every data point must mention its source ({FINANCIAL_SOURCE} or {WEB_SOURCE})

## FORBIDDEN (examples of what NOT to do):
- 'The stock is expected to reach $500' (if 500 is not in the data)
- 'Revenue grew 45% in Q3' (if 45% and Q3 are not in the data)
- 'According to Bloomberg...' (if Bloomberg is not mentioned in sources)
- Adding any analysis, predictions, or opinions

## REQUIRED OUTPUT FORMAT:

### Summary
- List 3-5 key facts using ONLY numbers from the data

### Financial Data
- Copy the key metrics from the market data below

### News
- Summarize headlines from the web search below (cite source)

### Sources
- {FINANCIAL_SOURCE} (real-time data)
- {WEB_SOURCE}

---

## SOURCE DATA (use ONLY this):

### From {FINANCIAL_SOURCE}:
{financial_data}

### From {WEB_SOURCE}:
{web_data}

---

Now write the formatted response in {lang}. Remember: COPY numbers, don't invent them. [/INST]"
    )
}

/// Build the single-source reformat prompt
pub fn reformat_prompt(lang: Language, data: &str, source: &str) -> String {
    let lang = lang.name();
    format!(
        r"[INST] Reformat this data in {lang}.

RULES:
- COPY all numbers exactly as they appear
- Do NOT add any new data
- Do NOT make predictions

DATA:
{data}

Write a clean, formatted version in {lang}. End with: 'Source: {source}' [/INST]"
    )
}
