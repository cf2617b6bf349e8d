use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::calculation::CalculationStatus;

/// The kind of arithmetic a [`CalculationStep`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    Initial,
    Add,
    Subtract,
    Rate,
    Result,
    Info,
}

impl Operation {
    fn symbol(&self) -> &'static str {
        match self {
            Operation::Initial | Operation::Info => " ",
            Operation::Add => "+",
            Operation::Subtract => "-",
            Operation::Rate => "x",
            Operation::Result => "=",
        }
    }
}

/// Represents a single step in a salary calculation.
///
/// Steps are what `explain()` renders, so a payroll clerk can follow how the
/// net figure was derived from the gross one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalculationStep {
    /// Human-readable description of what this step does.
    pub description: String,
    /// The value at this step (if applicable).
    pub amount: Option<Decimal>,
    pub operation: Operation,
}

impl CalculationStep {
    fn with(operation: Operation, description: impl Into<String>, amount: Option<Decimal>) -> Self {
        Self {
            description: description.into(),
            amount,
            operation,
        }
    }

    pub fn initial(description: impl Into<String>, amount: Decimal) -> Self {
        Self::with(Operation::Initial, description, Some(amount))
    }

    pub fn add(description: impl Into<String>, amount: Decimal) -> Self {
        Self::with(Operation::Add, description, Some(amount))
    }

    pub fn subtract(description: impl Into<String>, amount: Decimal) -> Self {
        Self::with(Operation::Subtract, description, Some(amount))
    }

    pub fn rate(description: impl Into<String>, rate: Decimal) -> Self {
        Self::with(Operation::Rate, description, Some(rate))
    }

    pub fn result(description: impl Into<String>, amount: Decimal) -> Self {
        Self::with(Operation::Result, description, Some(amount))
    }

    pub fn info(description: impl Into<String>) -> Self {
        Self::with(Operation::Info, description, None)
    }

    pub fn symbol(&self) -> &'static str {
        self.operation.symbol()
    }
}

/// Errors raised by the salary engine.
///
/// Preview calculators never return these for empty or non-positive input;
/// they degrade to an all-zero breakdown instead. Errors are reserved for
/// explicit conversions, ledger mutations and configuration.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "camelCase")]
pub enum SalaryError {
    #[error("Invalid input [{field}={value}]: {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Cannot {action} while the salary calculation is {status}; reopen it first")]
    InvalidState {
        action: String,
        status: CalculationStatus,
    },

    #[error("Adjustment {adjustment_id} not found in salary calculation {calculation_id}")]
    NotFound {
        calculation_id: Uuid,
        adjustment_id: Uuid,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Arithmetic overflow: operation '{operation}' failed")]
    Overflow { operation: String },

    #[error("Persistence failed: {0}")]
    Persistence(String),
}

impl SalaryError {
    pub fn invalid_input(
        field: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        SalaryError::InvalidInput {
            field: field.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn invalid_state(action: impl Into<String>, status: CalculationStatus) -> Self {
        SalaryError::InvalidState {
            action: action.into(),
            status,
        }
    }

    pub fn overflow(operation: impl Into<String>) -> Self {
        SalaryError::Overflow {
            operation: operation.into(),
        }
    }

    /// True for failures that a form should show next to the offending field.
    pub fn is_validation(&self) -> bool {
        matches!(self, SalaryError::InvalidInput { .. })
    }
}
