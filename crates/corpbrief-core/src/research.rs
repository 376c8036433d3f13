//! Schema-enforced research record and extraction-reply normalization.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CorpbriefError;

/// Structured research output for one company.
///
/// `sources` is always derived from search results by the researcher; a
/// sources list offered by the extraction service is never accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchRecord {
    pub company: String,
    pub summary: String,
    pub products: Vec<String>,
    pub financials: String,
    pub competitors: Vec<String>,
    pub sources: Vec<String>,
}

impl ResearchRecord {
    /// Normalize the extraction service's raw reply into a record.
    ///
    /// The reply is expected to be, or to contain, a single JSON object.
    /// Keys outside the schema are discarded, missing keys get schema
    /// defaults (`company` falls back to the input name), and `sources` is
    /// unconditionally overwritten with the canonical list computed from
    /// search results.
    pub fn from_extraction_reply(
        raw: &str,
        company: &str,
        sources: Vec<String>,
    ) -> Result<Self, CorpbriefError> {
        let mut object = parse_json_object(raw)?;

        // Default only fills a missing key; a provided empty value is kept.
        object
            .entry("company")
            .or_insert_with(|| Value::String(company.to_string()));

        let mut record: ResearchRecord = serde_json::from_value(Value::Object(object))
            .map_err(|err| CorpbriefError::Schema(err.to_string()))?;
        record.sources = sources;
        Ok(record)
    }
}

/// Parse `raw` as a JSON object, falling back to the substring between the
/// first `{` and the last `}` when the reply wraps the object in prose.
fn parse_json_object(raw: &str) -> Result<Map<String, Value>, CorpbriefError> {
    let value = match serde_json::from_str::<Value>(raw) {
        Ok(value) => value,
        Err(_) => {
            let start = raw.find('{');
            let end = raw.rfind('}');
            let Some((start, end)) = start.zip(end).filter(|(start, end)| start < end) else {
                return Err(CorpbriefError::Schema(
                    "reply contains no JSON object".to_string(),
                ));
            };
            serde_json::from_str::<Value>(&raw[start..=end])
                .map_err(|err| CorpbriefError::Schema(err.to_string()))?
        }
    };

    match value {
        Value::Object(object) => Ok(object),
        other => Err(CorpbriefError::Schema(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}
