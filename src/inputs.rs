use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::types::SalaryError;

/// Largest salary figure the entry form accepts.
pub const MAX_SALARY_INPUT: Decimal = dec!(9999999.99);

/// Trait for converting various types into `Decimal` for salary calculations.
///
/// This trait allows users to pass `i32`, `f64`, `&str`, etc. directly into
/// constructors without needing to wrap them in `dec!()` or `Decimal::from()`.
pub trait IntoMoney {
    fn into_money(self) -> Result<Decimal, SalaryError>;
}

impl IntoMoney for Decimal {
    fn into_money(self) -> Result<Decimal, SalaryError> {
        Ok(self)
    }
}

macro_rules! impl_into_money_int {
    ($($t:ty),*) => {
        $(
            impl IntoMoney for $t {
                fn into_money(self) -> Result<Decimal, SalaryError> {
                    Ok(Decimal::from(self))
                }
            }
        )*
    };
}

impl_into_money_int!(i32, u32, i64, u64, isize, usize);

macro_rules! impl_into_money_float {
    ($($t:ty),*) => {
        $(
            impl IntoMoney for $t {
                fn into_money(self) -> Result<Decimal, SalaryError> {
                    Decimal::from_f64_retain(self as f64)
                        .ok_or_else(|| SalaryError::invalid_input("amount", self, "Not a finite number"))
                }
            }
        )*
    };
}

impl_into_money_float!(f32, f64);

impl IntoMoney for &str {
    fn into_money(self) -> Result<Decimal, SalaryError> {
        let trimmed = self.trim();
        if trimmed.is_empty() {
            return Err(SalaryError::invalid_input("amount", self, "Amount is required"));
        }
        Decimal::from_str(trimmed)
            .map_err(|e| SalaryError::invalid_input("amount", self, format!("Invalid number format: {}", e)))
    }
}

impl IntoMoney for String {
    fn into_money(self) -> Result<Decimal, SalaryError> {
        self.as_str().into_money()
    }
}

/// The single live figure on the salary setup form.
///
/// Exactly one of net or gross is ever being typed; the other side is always
/// derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "amount", rename_all = "camelCase")]
pub enum SalaryInput {
    /// Desired take-home pay; gross is derived from it.
    NetEntry(Decimal),
    /// Gross pay entered directly.
    GrossEntry(Decimal),
}

impl SalaryInput {
    pub fn net(amount: impl IntoMoney) -> Result<Self, SalaryError> {
        Ok(SalaryInput::NetEntry(amount.into_money()?))
    }

    pub fn gross(amount: impl IntoMoney) -> Result<Self, SalaryError> {
        Ok(SalaryInput::GrossEntry(amount.into_money()?))
    }

    /// Parses and validates a submitted form value.
    ///
    /// This is the strict submit-time check: the figure must be numeric,
    /// positive and no larger than [`MAX_SALARY_INPUT`]. Live preview should
    /// use [`crate::breakdown::preview`] instead, which never fails.
    pub fn parse(raw: &str, is_direct_gross_entry: bool) -> Result<Self, SalaryError> {
        let field = if is_direct_gross_entry { "grossSalary" } else { "netSalary" };
        let amount = raw.into_money().map_err(|e| match e {
            SalaryError::InvalidInput { value, reason, .. } => SalaryError::InvalidInput {
                field: field.to_string(),
                value,
                reason,
            },
            other => other,
        })?;

        if amount <= Decimal::ZERO {
            return Err(SalaryError::invalid_input(field, amount, "Salary must be greater than zero"));
        }
        if amount > MAX_SALARY_INPUT {
            return Err(SalaryError::invalid_input(
                field,
                amount,
                format!("Salary must not exceed {}", MAX_SALARY_INPUT),
            ));
        }

        Ok(if is_direct_gross_entry {
            SalaryInput::GrossEntry(amount)
        } else {
            SalaryInput::NetEntry(amount)
        })
    }

    pub fn amount(&self) -> Decimal {
        match self {
            SalaryInput::NetEntry(a) | SalaryInput::GrossEntry(a) => *a,
        }
    }

    pub fn is_direct_gross_entry(&self) -> bool {
        matches!(self, SalaryInput::GrossEntry(_))
    }
}
