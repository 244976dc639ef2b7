use crate::domain::{dates, money};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One raw row of an exported bank statement, exactly as it arrived.
///
/// Every field is optional free text; JSON scalars of any type are accepted
/// and stringified so that `"monto": 100.5` and `"monto": "100.5"` are the
/// same movement. Wire keys are the Spanish column names of the export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMovement {
    #[serde(default, rename = "fecha", deserialize_with = "de_scalar")]
    pub date: Option<String>,
    #[serde(default, rename = "tipo", deserialize_with = "de_scalar")]
    pub kind: Option<String>,
    #[serde(default, rename = "monto", deserialize_with = "de_scalar")]
    pub amount: Option<String>,
    #[serde(default, rename = "signo", deserialize_with = "de_scalar")]
    pub sign: Option<String>,
    #[serde(default, rename = "sucursal", deserialize_with = "de_scalar")]
    pub branch: Option<String>,
    #[serde(default, rename = "referencia_numerica", deserialize_with = "de_scalar")]
    pub numeric_reference: Option<String>,
    #[serde(default, rename = "referencia_alfanumerica", deserialize_with = "de_scalar")]
    pub alpha_reference: Option<String>,
    #[serde(default, rename = "concepto", deserialize_with = "de_scalar")]
    pub concept: Option<String>,
    #[serde(default, rename = "autorizacion", deserialize_with = "de_scalar")]
    pub authorization: Option<String>,
    #[serde(default, rename = "emisor_nombre", deserialize_with = "de_scalar")]
    pub sender_name: Option<String>,
    #[serde(default, rename = "institucion_emisora", deserialize_with = "de_scalar")]
    pub issuing_institution: Option<String>,
    #[serde(default, rename = "descripcion_raw", deserialize_with = "de_scalar")]
    pub raw_description: Option<String>,
}

fn de_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }))
}

impl RawMovement {
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        self.date.as_deref().and_then(dates::parse_flexible)
    }

    /// Amount as positive magnitude; direction lives in the sign field.
    pub fn parsed_amount(&self) -> Option<Decimal> {
        self.amount.as_deref().and_then(money::parse).map(|d| d.abs())
    }

    /// `-1` only for a literal integer -1; everything else is an inflow.
    pub fn normalized_sign(&self) -> i8 {
        self.sign
            .as_deref()
            .and_then(|s| s.trim().parse::<i64>().ok())
            .map_or(1, |n| if n == -1 { -1 } else { 1 })
    }

    /// Stable idempotency key over the canonicalized fields.
    ///
    /// Identical logical movements hash identically regardless of date or
    /// amount formatting, casing, or redundant whitespace; the ingestion
    /// upsert keys on this digest so re-importing an export never creates
    /// duplicate rows.
    pub fn content_hash(&self) -> String {
        let parts = [
            canon_date(self.date.as_deref()),
            canon_text(self.kind.as_deref()),
            canon_amount(self.amount.as_deref()),
            self.normalized_sign().to_string(),
            canon_text(self.branch.as_deref()),
            canon_text(self.numeric_reference.as_deref()),
            canon_text(self.alpha_reference.as_deref()),
            canon_text(self.authorization.as_deref()),
            canon_text(self.sender_name.as_deref()),
            canon_text(self.issuing_institution.as_deref()),
            canon_text(self.concept.as_deref()),
            canon_text(self.raw_description.as_deref()),
        ];
        let mut hasher = Sha256::new();
        hasher.update(parts.join("|").as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

/// Trimmed, inner whitespace collapsed, upper-cased; missing -> "".
fn canon_text(value: Option<&str>) -> String {
    value
        .map(|s| {
            s.split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
                .to_uppercase()
        })
        .unwrap_or_default()
}

/// ISO `YYYY-MM-DD`, or "" when unparseable.
fn canon_date(value: Option<&str>) -> String {
    value
        .and_then(dates::parse_flexible)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Absolute magnitude with exactly two fraction digits, or "" when missing.
fn canon_amount(value: Option<&str>) -> String {
    value
        .and_then(money::parse)
        .map(|d| format!("{:.2}", d.abs()))
        .unwrap_or_default()
}

/// Where an ingested movement came from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    pub sheet_id: Option<String>,
    pub sheet_name: Option<String>,
    pub gid: Option<String>,
    pub row: usize,
}

/// The persisted bank movement row, keyed by its content hash.
///
/// `reconciled` is set by a human action downstream (which also creates the
/// payment records); this crate never flips it and the upsert preserves it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankMovement {
    pub uid_hash: String,
    pub date: Option<NaiveDate>,
    pub kind: Option<String>,
    /// Positive magnitude; see `sign`.
    pub amount: Option<Decimal>,
    /// -1 outflow, 1 inflow.
    pub sign: i8,
    pub branch: Option<String>,
    pub numeric_reference: Option<String>,
    pub alpha_reference: Option<String>,
    pub concept: Option<String>,
    pub authorization: Option<String>,
    pub sender_name: Option<String>,
    pub issuing_institution: Option<String>,
    pub raw_description: Option<String>,
    pub reconciled: bool,
    pub source: SourceRef,
}
