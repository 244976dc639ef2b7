use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub type StudentId = i64;
pub type ChargeId = i64;

/// A named category of charge (inscription, tuition, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    pub code: String,
    pub name: String,
    /// Informational only; the engine does not branch on it.
    pub recurring: bool,
}

impl Concept {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            recurring: false,
        }
    }
}

/// An amount owed by a student for one concept.
///
/// `paid` is a derived, persisted cache: the allocation engine recomputes it
/// on every run and nothing else in the system may assign it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Charge {
    pub id: ChargeId,
    pub student_id: StudentId,
    pub concept: Concept,
    pub amount: Decimal,
    pub issued_on: NaiveDate,
    pub due_on: Option<NaiveDate>,
    pub paid: bool,
}

impl Charge {
    /// Due date when set, issue date otherwise.
    pub fn effective_due_date(&self) -> NaiveDate {
        self.due_on.unwrap_or(self.issued_on)
    }
}

/// Per-charge allocation outcome. Recomputed on every run, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerEntry {
    pub charge_id: ChargeId,
    pub concept_code: String,
    pub concept_name: String,
    pub issued_on: NaiveDate,
    pub due_on: Option<NaiveDate>,
    pub original: Decimal,
    pub applied: Decimal,
    pub remaining: Decimal,
    pub is_overdue: bool,
    pub is_due_today: bool,
    pub days_overdue: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Totals {
    pub original: Decimal,
    pub applied: Decimal,
    pub remaining: Decimal,
}
