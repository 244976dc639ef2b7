use crate::domain::movement::{BankMovement, RawMovement, SourceRef};
use crate::domain::ports::MovementStoreBox;
use crate::error::Result;
use serde::Serialize;
use tracing::info;

/// Metadata identifying the spreadsheet an export came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetSource {
    pub sheet_id: Option<String>,
    pub sheet_name: Option<String>,
    pub gid: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
}

/// Ingests raw bank-statement rows idempotently.
///
/// Each row is keyed by its content hash, so re-importing the same export
/// never creates duplicates; it only refreshes the non-identifying fields
/// and the source metadata of the existing rows.
pub struct MovementLoader {
    store: MovementStoreBox,
}

impl MovementLoader {
    pub fn new(store: MovementStoreBox) -> Self {
        Self { store }
    }

    pub async fn upsert_movements<I>(&self, items: I, source: &SheetSource) -> Result<IngestSummary>
    where
        I: IntoIterator<Item = RawMovement>,
    {
        let mut summary = IngestSummary::default();
        for (idx, raw) in items.into_iter().enumerate() {
            let movement = to_movement(&raw, source, idx + 1);
            if self.store.upsert(movement).await? {
                summary.created += 1;
            } else {
                summary.updated += 1;
            }
        }
        info!(
            created = summary.created,
            updated = summary.updated,
            "movement ingestion finished"
        );
        Ok(summary)
    }
}

fn to_movement(raw: &RawMovement, source: &SheetSource, row: usize) -> BankMovement {
    BankMovement {
        uid_hash: raw.content_hash(),
        date: raw.parsed_date(),
        kind: non_empty(&raw.kind),
        amount: raw.parsed_amount(),
        sign: raw.normalized_sign(),
        branch: non_empty(&raw.branch),
        numeric_reference: non_empty(&raw.numeric_reference),
        alpha_reference: non_empty(&raw.alpha_reference),
        concept: non_empty(&raw.concept),
        authorization: non_empty(&raw.authorization),
        sender_name: non_empty(&raw.sender_name),
        issuing_institution: non_empty(&raw.issuing_institution),
        raw_description: non_empty(&raw.raw_description),
        reconciled: false,
        source: SourceRef {
            sheet_id: source.sheet_id.clone(),
            sheet_name: source.sheet_name.clone(),
            gid: source.gid.clone(),
            row,
        },
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_ref()
        .filter(|s| !s.trim().is_empty())
        .cloned()
}
