use crate::application::matching::IdentityMatcher;
use crate::domain::charge::{Charge, ChargeId, StudentId};
use crate::domain::movement::BankMovement;
use crate::domain::payment::{PaymentRecord, StudentRef};
use crate::domain::ports::{ChargeStore, MovementStore, PaymentStore};
use crate::error::{CarteraError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for charges.
///
/// Uses `Arc<RwLock<HashMap<..>>>` for shared concurrent access. The
/// paid-flag batch takes a single write lock, which stands in for the
/// per-student transaction a relational adapter would open.
#[derive(Default, Clone)]
pub struct InMemoryChargeStore {
    charges: Arc<RwLock<HashMap<ChargeId, Charge>>>,
}

impl InMemoryChargeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, charge: Charge) {
        let mut charges = self.charges.write().await;
        charges.insert(charge.id, charge);
    }

    pub async fn get(&self, id: ChargeId) -> Option<Charge> {
        let charges = self.charges.read().await;
        charges.get(&id).cloned()
    }
}

#[async_trait]
impl ChargeStore for InMemoryChargeStore {
    async fn charges_for_student(&self, student: StudentId) -> Result<Vec<Charge>> {
        let charges = self.charges.read().await;
        let mut rows: Vec<Charge> = charges
            .values()
            .filter(|c| c.student_id == student)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.issued_on.cmp(&a.issued_on).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn save_paid_flags(&self, changes: &[(ChargeId, bool)]) -> Result<()> {
        let mut charges = self.charges.write().await;
        // Validate the whole batch before touching anything.
        for (id, _) in changes {
            if !charges.contains_key(id) {
                return Err(CarteraError::StorageError(format!(
                    "unknown charge id {id} in paid-flag batch"
                )));
            }
        }
        for (id, paid) in changes {
            if let Some(charge) = charges.get_mut(id) {
                charge.paid = *paid;
            }
        }
        Ok(())
    }
}

/// In-memory payment store; applies the identity OR via [`IdentityMatcher`]
/// the way a relational adapter would fold the three lookups into one query.
#[derive(Clone)]
pub struct InMemoryPaymentStore {
    payments: Arc<RwLock<Vec<PaymentRecord>>>,
    matcher: Arc<IdentityMatcher>,
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self::with_matcher(IdentityMatcher::default())
    }

    pub fn with_matcher(matcher: IdentityMatcher) -> Self {
        Self {
            payments: Arc::new(RwLock::new(Vec::new())),
            matcher: Arc::new(matcher),
        }
    }

    pub async fn insert(&self, payment: PaymentRecord) {
        let mut payments = self.payments.write().await;
        payments.push(payment);
    }
}

impl Default for InMemoryPaymentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn payments_for_student(&self, student: &StudentRef) -> Result<Vec<PaymentRecord>> {
        let payments = self.payments.read().await;
        Ok(payments
            .iter()
            .filter(|p| self.matcher.belongs_to(student, p))
            .cloned()
            .collect())
    }
}

/// In-memory movement store keyed by content hash.
#[derive(Default, Clone)]
pub struct InMemoryMovementStore {
    movements: Arc<RwLock<HashMap<String, BankMovement>>>,
}

impl InMemoryMovementStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        let movements = self.movements.read().await;
        movements.len()
    }

    /// Test/ops helper mirroring the human reconciliation action.
    pub async fn set_reconciled(&self, uid_hash: &str, reconciled: bool) -> Result<()> {
        let mut movements = self.movements.write().await;
        let movement = movements.get_mut(uid_hash).ok_or_else(|| {
            CarteraError::StorageError(format!("unknown movement {uid_hash}"))
        })?;
        movement.reconciled = reconciled;
        Ok(())
    }
}

#[async_trait]
impl MovementStore for InMemoryMovementStore {
    async fn get(&self, uid_hash: &str) -> Result<Option<BankMovement>> {
        let movements = self.movements.read().await;
        Ok(movements.get(uid_hash).cloned())
    }

    async fn upsert(&self, mut movement: BankMovement) -> Result<bool> {
        let mut movements = self.movements.write().await;
        match movements.get(&movement.uid_hash) {
            Some(existing) => {
                movement.reconciled = existing.reconciled;
                movements.insert(movement.uid_hash.clone(), movement);
                Ok(false)
            }
            None => {
                movements.insert(movement.uid_hash.clone(), movement);
                Ok(true)
            }
        }
    }
}
