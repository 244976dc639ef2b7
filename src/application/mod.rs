//! Application layer: the allocation engine and the movement ingestion
//! loader, both talking to storage exclusively through the domain ports.

pub mod allocation;
pub mod ingest;
pub mod matching;
