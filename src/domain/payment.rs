use crate::domain::charge::StudentId;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub type PaymentId = i64;

/// The identity keys a payment may be matched against.
///
/// Payments arrive from several origination paths (manual capture, bank
/// reconciliation, gateway webhooks) and each path may populate only one of
/// these fields, so matching is an OR across all of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRef {
    pub id: StudentId,
    pub national_id: Option<String>,
    pub student_number: Option<i64>,
}

impl StudentRef {
    pub fn new(id: StudentId) -> Self {
        Self {
            id,
            national_id: None,
            student_number: None,
        }
    }
}

/// An atomic cash receipt. Immutable from the engine's perspective: the
/// allocation engine only reads these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: PaymentId,
    pub student_id: Option<StudentId>,
    pub national_id: Option<String>,
    pub student_number: Option<i64>,
    pub folio: Option<String>,
    pub date: NaiveDate,
    /// Tie-breaker when two payments share a date.
    pub recorded_at: NaiveDateTime,
    pub amount: Option<Decimal>,
    /// Free-text concept as captured at the cash desk or by the importer.
    pub concept: Option<String>,
    /// Free-text detail line; matched alongside `concept`.
    pub detail: Option<String>,
}
