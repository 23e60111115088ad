//! Response normalization
//!
//! One function turns any accepted response shape into an ordered
//! `Vec<Company>`; everything else is rejected rather than guessed at.

use serde::Deserialize;
use serde_json::Value;

use super::company::Company;
use super::error::{LoadError, LoadResult};

/// Wire format of one company record
#[derive(Debug, Deserialize)]
struct CompanyRecord {
    company_id: CompanyId,
    company_name: String,
    looker_link: String,
}

/// Identifiers arrive as strings or integers depending on the backend
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CompanyId {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

impl CompanyId {
    fn into_string(self) -> String {
        match self {
            CompanyId::Text(s) => s,
            CompanyId::Signed(n) => n.to_string(),
            CompanyId::Unsigned(n) => n.to_string(),
        }
    }
}

impl From<CompanyRecord> for Company {
    fn from(record: CompanyRecord) -> Self {
        Company {
            id: record.company_id.into_string(),
            name: record.company_name,
            dashboard_link: record.looker_link,
        }
    }
}

/// Normalize raw response text
pub fn normalize_text(text: &str) -> LoadResult<Vec<Company>> {
    let payload: Value = serde_json::from_str(text)?;
    normalize_payload(payload)
}

/// Normalize a decoded response into companies, preserving source order
pub fn normalize_payload(payload: Value) -> LoadResult<Vec<Company>> {
    let records = match payload {
        Value::Array(records) => records,
        Value::Object(mut envelope) => match envelope.remove("body") {
            Some(Value::Array(records)) => records,
            Some(Value::String(encoded)) => match serde_json::from_str::<Value>(&encoded)? {
                Value::Array(records) => records,
                other => {
                    return Err(LoadError::Parse(format!(
                        "encoded body is {}, expected an array",
                        kind_of(&other)
                    )))
                }
            },
            Some(other) => {
                return Err(LoadError::Parse(format!(
                    "envelope body is {}, expected an array or encoded array",
                    kind_of(&other)
                )))
            }
            None => {
                return Err(LoadError::Parse(
                    "object response without a body field".to_string(),
                ))
            }
        },
        other => {
            return Err(LoadError::Parse(format!(
                "response is {}, expected an array or envelope",
                kind_of(&other)
            )))
        }
    };

    records
        .into_iter()
        .enumerate()
        .map(|(idx, record)| {
            serde_json::from_value::<CompanyRecord>(record)
                .map(Company::from)
                .map_err(|e| LoadError::Parse(format!("record {}: {}", idx, e)))
        })
        .collect()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
