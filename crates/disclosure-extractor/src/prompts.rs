//! Prompt selection (spec §4.3): the Transformer routes on
//! `(content_type, source_site)` to one of three specialized prompts. Each
//! variant is `const` data — a system prompt plus the JSON schema
//! description appended to the user turn — following the teacher's
//! convention of keeping provider config (`ml_client::MLConfig`) as one
//! typed struct rather than scattered string matches.

use disclosure_core::{FetchError, SourceFormat};
use fetcher_core::ContentType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    SenateHtml,
    HousePdf,
    CapitolTradesHtml,
}

impl PromptKind {
    pub fn resolve(content_type: ContentType, source_site: &str) -> Result<Self, FetchError> {
        match (content_type, source_site) {
            (ContentType::Html, "senate_efd") => Ok(PromptKind::SenateHtml),
            (ContentType::Pdf, "house_clerk") => Ok(PromptKind::HousePdf),
            (ContentType::Html, "capitol_trades") => Ok(PromptKind::CapitolTradesHtml),
            (content_type, site) => {
                Err(FetchError::Parse(format!("no prompt registered for ({content_type:?}, {site})")))
            }
        }
    }

    pub fn source_format(&self) -> SourceFormat {
        match self {
            PromptKind::SenateHtml => SourceFormat::SenateHtml,
            PromptKind::HousePdf => SourceFormat::HousePdf,
            PromptKind::CapitolTradesHtml => SourceFormat::CapitolTradesHtml,
        }
    }

    pub fn system_prompt(&self) -> &'static str {
        match self {
            PromptKind::SenateHtml => SENATE_SYSTEM_PROMPT,
            PromptKind::HousePdf => HOUSE_SYSTEM_PROMPT,
            PromptKind::CapitolTradesHtml => CAPITOL_TRADES_SYSTEM_PROMPT,
        }
    }

    /// Whether this prompt kind expects rasterized page images rather than
    /// a text payload (spec §4.3: "the House-PDF prompt expects a
    /// multimodal invocation").
    pub fn is_multimodal(&self) -> bool {
        matches!(self, PromptKind::HousePdf)
    }
}

const TRADE_SCHEMA_DESCRIPTION: &str = r#"
Respond with a single JSON object of the form:
{
  "confidence": <float 0..1, your overall confidence in this extraction>,
  "trades": [
    {
      "politician_name": <string>,
      "transaction_date": <"YYYY-MM-DD">,
      "filing_date": <"YYYY-MM-DD">,
      "ticker": <string or null>,
      "asset_name": <string>,
      "asset_type": <"Stock" | "Bond" | "Fund" | other string>,
      "transaction_type": <"Buy" | "Sale" | "Exchange">,
      "amount_bucket_label": <string, exact label as printed on the form>,
      "owner": <"Self" | "Spouse" | "Joint" | "Dependent-Child" | "Unknown">,
      "comment": <string or null>
    }
  ]
}
Return JSON only. Do not include trades you are not reasonably confident occurred.
"#;

const SENATE_SYSTEM_PROMPT: &str = "You extract structured stock transaction records from Senate electronic \
financial disclosure (EFD) search result HTML. Each row represents one disclosed transaction.";

const HOUSE_SYSTEM_PROMPT: &str = "You extract structured stock transaction records from scanned pages of a \
U.S. House of Representatives Periodic Transaction Report (PTR) PDF. Read the filer's name from the report \
header and the transaction table rows from the page images provided.";

const CAPITOL_TRADES_SYSTEM_PROMPT: &str = "You extract structured stock transaction records from a trimmed \
Capitol Trades listing row. Capitol Trades aggregates congressional disclosures; treat its fields as \
already-summarized and extract them faithfully rather than re-deriving them.";

pub fn build_user_prompt(body_text: &str, correction: Option<&str>) -> String {
    let mut prompt = String::new();
    if let Some(correction) = correction {
        prompt.push_str("Your previous attempt failed with the following error(s); correct it:\n");
        prompt.push_str(correction);
        prompt.push_str("\n\n");
    }
    prompt.push_str("Source content:\n");
    prompt.push_str(body_text);
    prompt.push('\n');
    prompt.push_str(TRADE_SCHEMA_DESCRIPTION);
    prompt
}
