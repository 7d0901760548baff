//! Allocation of cargo consoles to two CFS ledgers by weight-to-volume ratio.
//!
//! ```text
//!  ledger A ─┐                         ┌─► updated_<a>_cfs.xlsx
//!  ledger B ─┼─► filter ─► allocate A ─┼─► allocate B ─► updated_<b>_cfs.xlsx
//!  tracking ─┘                         └─► statements
//! ```

pub mod cargo;
pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;

pub use config::AllocationConfig;
pub use error::{AllocError, Result};
pub use pipeline::{run_allocation, AllocationRun};
