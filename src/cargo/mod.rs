//! Cargo density rules and the greedy ledger allocator.

pub mod allocate;
pub mod classify;
pub mod ledger;
