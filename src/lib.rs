//! Salary computation engine for a school administration dashboard.
//!
//! Converts between gross and net salary, breaks gross down into social
//! contributions and income tax, aggregates per-class lesson pay, and keeps
//! the approval-gated ledger of manual adjustments for each teacher's monthly
//! salary calculation.

pub mod adjustments;
pub mod breakdown;
pub mod builder;
pub mod calculation;
pub mod config;
pub mod contributions;
pub mod converter;
pub mod inputs;
pub mod math;
pub mod prelude;
pub mod report;
pub mod tiers;
pub mod traits;
pub mod types;

pub use breakdown::{compute_breakdown, preview, SalaryBreakdown};
pub use calculation::{CalculationStatus, SalaryCalculation};
pub use config::TaxRateTable;
pub use inputs::SalaryInput;
pub use types::SalaryError;
