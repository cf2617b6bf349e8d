//! Rounding and checked arithmetic for monetary values.
//!
//! Every monetary figure the engine produces is rounded to two decimal places
//! at the point it is computed, using half-up rounding (midpoint away from
//! zero). Intermediate figures are never carried at full precision into the
//! next step.

use rust_decimal::{Decimal, RoundingStrategy};
use std::ops::Deref;

use crate::types::SalaryError;

/// Rounds to two decimal places, midpoint away from zero.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// A `Decimal` wrapper whose operations report overflow as [`SalaryError::Overflow`]
/// instead of panicking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Money(Decimal);

impl Money {
    pub fn new(value: Decimal) -> Self {
        Money(value)
    }

    pub fn safe_add(self, rhs: Decimal) -> Result<Self, SalaryError> {
        self.0
            .checked_add(rhs)
            .map(Money)
            .ok_or_else(|| SalaryError::overflow(format!("{} + {}", self.0, rhs)))
    }

    pub fn safe_sub(self, rhs: Decimal) -> Result<Self, SalaryError> {
        self.0
            .checked_sub(rhs)
            .map(Money)
            .ok_or_else(|| SalaryError::overflow(format!("{} - {}", self.0, rhs)))
    }

    pub fn safe_mul(self, rhs: Decimal) -> Result<Self, SalaryError> {
        self.0
            .checked_mul(rhs)
            .map(Money)
            .ok_or_else(|| SalaryError::overflow(format!("{} * {}", self.0, rhs)))
    }

    /// Division by zero is reported as overflow as well; callers only divide
    /// by validated, strictly positive factors.
    pub fn safe_div(self, rhs: Decimal) -> Result<Self, SalaryError> {
        self.0
            .checked_div(rhs)
            .map(Money)
            .ok_or_else(|| SalaryError::overflow(format!("{} / {}", self.0, rhs)))
    }

    pub fn round2(self) -> Self {
        Money(round2(self.0))
    }

    pub fn value(self) -> Decimal {
        self.0
    }
}

impl Deref for Money {
    type Target = Decimal;

    fn deref(&self) -> &Decimal {
        &self.0
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Money(value)
    }
}
