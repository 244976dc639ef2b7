use crate::domain::charge::{Charge, ChargeId, StudentId};
use crate::domain::movement::BankMovement;
use crate::domain::payment::{PaymentRecord, StudentRef};
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ChargeStore: Send + Sync {
    /// All charges owed by the student, most recently issued first.
    async fn charges_for_student(&self, student: StudentId) -> Result<Vec<Charge>>;

    /// Persists recomputed paid flags as one atomic batch.
    ///
    /// A failure must leave every flag untouched; partial updates would
    /// leave the ledger cache inconsistent.
    async fn save_paid_flags(&self, changes: &[(ChargeId, bool)]) -> Result<()>;
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Payments plausibly belonging to the student: direct linkage OR
    /// national ID OR student number, whichever the origination path
    /// populated.
    async fn payments_for_student(&self, student: &StudentRef) -> Result<Vec<PaymentRecord>>;
}

#[async_trait]
pub trait MovementStore: Send + Sync {
    async fn get(&self, uid_hash: &str) -> Result<Option<BankMovement>>;

    /// Insert or replace keyed on `uid_hash`; returns true when a new row
    /// was created. Replacing must preserve the existing `reconciled` flag.
    async fn upsert(&self, movement: BankMovement) -> Result<bool>;
}

pub type ChargeStoreBox = Box<dyn ChargeStore>;
pub type PaymentStoreBox = Box<dyn PaymentStore>;
pub type MovementStoreBox = Box<dyn MovementStore>;
