//! Prelude module for the salary engine
//!
//! This module re-exports commonly used structs, traits, and types to allow
//! for easier usage of the library.
//!
//! # Usage
//!
//! ```rust
//! use school_payroll::prelude::*;
//! ```

// Core exports
pub use crate::builder::{Builder, Validate};
pub use crate::config::{TaxRateTable, TaxRateTableBuilder};
pub use crate::inputs::{IntoMoney, SalaryInput, MAX_SALARY_INPUT};
pub use crate::math::round2;
pub use crate::types::{CalculationStep, Operation, SalaryError};

// Calculators
pub use crate::breakdown::{breakdown_for, compute_breakdown, preview, SalaryBreakdown};
pub use crate::contributions::{compute_contributions, ContributionBreakdown, ContributionKind};
pub use crate::converter::{gross_from_net, net_from_gross};
pub use crate::report::{ContributionLine, ReportSummary, SalaryReport};
pub use crate::tiers::{aggregate, group_by_class, ClassGroup, ClassTierItem, TierRate, TierRateTable, TierSummary};

// Calculations and adjustments
pub use crate::adjustments::{
    add_adjustment, remove_adjustment, total_signed, AdjustmentLedger, AdjustmentType, InMemoryAdjustmentStore,
    NewAdjustment, SalaryAdjustment,
};
pub use crate::calculation::{CalculationStatus, PayPeriod, SalaryCalculation};
pub use crate::traits::AdjustmentStore;
#[cfg(feature = "async")]
pub use crate::traits::AsyncAdjustmentStore;
