//! Domain types and the ports the application layer depends on.
//!
//! Everything here is persistence-agnostic: charges, payments and bank
//! movements are plain values, and the stores are `async_trait` ports
//! implemented under `infrastructure`.

pub mod charge;
pub mod dates;
pub mod money;
pub mod movement;
pub mod payment;
pub mod ports;
