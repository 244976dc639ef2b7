use crate::application::matching::ConceptKeywords;
use crate::domain::charge::{ChargeId, LedgerEntry, Totals};
use crate::domain::money;
use crate::domain::payment::{PaymentId, StudentRef};
use crate::domain::ports::{ChargeStoreBox, PaymentStoreBox};
use crate::error::Result;
use chrono::{Local, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Which payment gets applied to which charge first. Charges are always
/// consumed oldest-first; this knob only orders the payments scanned
/// against them. Totals are invariant under either policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaymentOrder {
    #[default]
    MostRecentFirst,
    Chronological,
}

/// Payment amount left over after fully covering every charge in its
/// concept group. Surfaced for manual review, never silently dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExcessPayment {
    pub payment_id: PaymentId,
    pub concept_code: String,
    pub date: NaiveDate,
    pub leftover: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AllocationReport {
    pub entries: Vec<LedgerEntry>,
    pub excess_payments: Vec<ExcessPayment>,
    pub totals: Totals,
}

impl AllocationReport {
    /// Entries that still carry a balance.
    pub fn pending(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.iter().filter(|e| e.remaining > Decimal::ZERO)
    }
}

/// Matches a student's payments against their outstanding charges and
/// recomputes each charge's persisted `paid` flag.
///
/// Read-only with respect to payments; the paid-flag batch is the single
/// side effect, and it is atomic at the store.
pub struct AllocationEngine {
    charges: ChargeStoreBox,
    payments: PaymentStoreBox,
    keywords: ConceptKeywords,
}

impl AllocationEngine {
    pub fn new(
        charges: ChargeStoreBox,
        payments: PaymentStoreBox,
        keywords: ConceptKeywords,
    ) -> Self {
        Self {
            charges,
            payments,
            keywords,
        }
    }

    pub async fn allocate(
        &self,
        student: &StudentRef,
        order: PaymentOrder,
    ) -> Result<AllocationReport> {
        self.allocate_as_of(student, order, Local::now().date_naive())
            .await
    }

    /// Same as [`allocate`](Self::allocate) with an explicit "today" for
    /// deterministic overdue flags.
    pub async fn allocate_as_of(
        &self,
        student: &StudentRef,
        order: PaymentOrder,
        today: NaiveDate,
    ) -> Result<AllocationReport> {
        let charges = self.charges.charges_for_student(student.id).await?;
        if charges.is_empty() {
            return Ok(AllocationReport::default());
        }

        let mut entries: Vec<LedgerEntry> = charges
            .iter()
            .map(|c| {
                let original = money::quantize(c.amount);
                LedgerEntry {
                    charge_id: c.id,
                    concept_code: c.concept.code.clone(),
                    concept_name: c.concept.name.clone(),
                    issued_on: c.issued_on,
                    due_on: c.due_on,
                    original,
                    applied: Decimal::ZERO,
                    remaining: original,
                    is_overdue: false,
                    is_due_today: false,
                    days_overdue: 0,
                }
            })
            .collect();

        let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (i, entry) in entries.iter().enumerate() {
            groups
                .entry(entry.concept_code.trim().to_uppercase())
                .or_default()
                .push(i);
        }

        let matched = self.payments.payments_for_student(student).await?;
        let mut excess_payments = Vec::new();

        for (code, mut idxs) in groups {
            // Oldest debt absorbs money first, id as stable tie-break.
            idxs.sort_by(|&a, &b| {
                entries[a]
                    .issued_on
                    .cmp(&entries[b].issued_on)
                    .then(entries[a].charge_id.cmp(&entries[b].charge_id))
            });

            let mut pool: Vec<(PaymentId, NaiveDate, NaiveDateTime, Decimal)> = matched
                .iter()
                .filter(|p| self.keywords.matches(&code, p))
                .filter_map(|p| {
                    p.amount
                        .map(|a| (p.id, p.date, p.recorded_at, money::quantize(a)))
                })
                .filter(|(_, _, _, amount)| !amount.is_zero())
                .collect();
            match order {
                PaymentOrder::MostRecentFirst => {
                    pool.sort_by(|a, b| (b.1, b.2).cmp(&(a.1, a.2)));
                }
                PaymentOrder::Chronological => {
                    pool.sort_by(|a, b| (a.1, a.2).cmp(&(b.1, b.2)));
                }
            }

            for (payment_id, date, _, amount) in pool {
                let mut left = amount;
                if left <= Decimal::ZERO {
                    continue;
                }
                for &i in &idxs {
                    if left <= Decimal::ZERO {
                        break;
                    }
                    let entry = &mut entries[i];
                    if entry.remaining <= Decimal::ZERO {
                        continue;
                    }
                    let applied = entry.remaining.min(left);
                    entry.applied = money::quantize(entry.applied + applied);
                    entry.remaining = money::quantize(entry.remaining - applied);
                    left = money::quantize(left - applied);
                }
                if left > Decimal::ZERO {
                    excess_payments.push(ExcessPayment {
                        payment_id,
                        concept_code: code.clone(),
                        date,
                        leftover: left,
                    });
                }
            }
        }

        for entry in &mut entries {
            if entry.remaining > Decimal::ZERO {
                let due = entry.due_on.unwrap_or(entry.issued_on);
                entry.is_overdue = due < today;
                entry.is_due_today = due == today;
                entry.days_overdue = if due < today { (today - due).num_days() } else { 0 };
            }
        }

        let changes: Vec<(ChargeId, bool)> = charges
            .iter()
            .zip(entries.iter())
            .filter(|(charge, entry)| charge.paid != entry.remaining.is_zero())
            .map(|(charge, entry)| (charge.id, entry.remaining.is_zero()))
            .collect();
        if !changes.is_empty() {
            debug!(
                student = student.id,
                changed = changes.len(),
                "persisting recomputed paid flags"
            );
            self.charges.save_paid_flags(&changes).await?;
        }

        let totals = Totals {
            original: money::quantize(entries.iter().map(|e| e.original).sum::<Decimal>()),
            applied: money::quantize(entries.iter().map(|e| e.applied).sum::<Decimal>()),
            remaining: money::quantize(entries.iter().map(|e| e.remaining).sum::<Decimal>()),
        };
        debug!(
            student = student.id,
            charges = entries.len(),
            excess = excess_payments.len(),
            "allocation complete"
        );

        Ok(AllocationReport {
            entries,
            excess_payments,
            totals,
        })
    }
}
