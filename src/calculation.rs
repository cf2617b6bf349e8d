//! The per-teacher, per-period salary calculation and its approval lifecycle.
//!
//! ```text
//! Draft ──approve()──▶ Approved ──reopen()──▶ Reopened
//!                         ▲                      │
//!                         └──────approve()───────┘
//! ```
//!
//! Adjustments can be added or removed in `Draft` and `Reopened` only.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};
use uuid::Uuid;

use crate::adjustments::{total_signed, SalaryAdjustment};
use crate::inputs::IntoMoney;
use crate::math::Money;
use crate::tiers::{aggregate, ClassTierItem, TierSummary};
use crate::types::SalaryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, AsRefStr, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CalculationStatus {
    #[default]
    Draft,
    Approved,
    Reopened,
}

impl CalculationStatus {
    /// Whether `self → next` is one of the three allowed transitions.
    pub fn can_transition_to(&self, next: CalculationStatus) -> bool {
        matches!(
            (*self, next),
            (CalculationStatus::Draft, CalculationStatus::Approved)
                | (CalculationStatus::Approved, CalculationStatus::Reopened)
                | (CalculationStatus::Reopened, CalculationStatus::Approved)
        )
    }

    pub fn allows_adjustments(&self) -> bool {
        *self != CalculationStatus::Approved
    }
}

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "PayPeriodRecord")]
pub struct PayPeriod {
    year: i32,
    month: u32,
}

impl PayPeriod {
    pub fn new(year: i32, month: u32) -> Result<Self, SalaryError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|_| PayPeriod { year, month })
            .ok_or_else(|| SalaryError::invalid_input("period", format!("{}-{}", year, month), "Not a valid month"))
    }

    pub fn containing(date: NaiveDate) -> Self {
        PayPeriod {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    pub fn last_day(&self) -> NaiveDate {
        let (year, month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(year, month, 1)
            .and_then(|d| d.pred_opt())
            .unwrap_or_default()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

#[derive(Deserialize)]
struct PayPeriodRecord {
    year: i32,
    month: u32,
}

impl TryFrom<PayPeriodRecord> for PayPeriod {
    type Error = SalaryError;

    fn try_from(record: PayPeriodRecord) -> Result<Self, Self::Error> {
        PayPeriod::new(record.year, record.month)
    }
}

impl std::fmt::Display for PayPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Salary calculation for one teacher and one pay period.
///
/// Owns its adjustments. Class tier items and the base salary are inputs
/// copied from the teacher's setup and lesson records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryCalculation {
    pub id: Uuid,
    pub teacher_id: Uuid,
    pub teacher_name: Option<String>,
    pub period: PayPeriod,
    pub base_salary: Option<Decimal>,
    pub class_items: Vec<ClassTierItem>,
    adjustments: Vec<SalaryAdjustment>,
    status: CalculationStatus,
    approved_amount: Option<Decimal>,
    approved_at: Option<DateTime<Utc>>,
    approved_by: Option<String>,
}

impl SalaryCalculation {
    pub fn new(teacher_id: Uuid, period: PayPeriod) -> Self {
        Self {
            id: Uuid::new_v4(),
            teacher_id,
            teacher_name: None,
            period,
            base_salary: None,
            class_items: Vec::new(),
            adjustments: Vec::new(),
            status: CalculationStatus::Draft,
            approved_amount: None,
            approved_at: None,
            approved_by: None,
        }
    }

    pub fn teacher_name(mut self, name: impl Into<String>) -> Self {
        self.teacher_name = Some(name.into());
        self
    }

    /// Fixed monthly base. Zero is allowed, negative is not.
    pub fn base_salary(mut self, base: impl IntoMoney) -> Result<Self, SalaryError> {
        let base = base.into_money()?;
        if base < Decimal::ZERO {
            return Err(SalaryError::invalid_input("baseSalary", base, "Base salary must be non-negative"));
        }
        self.base_salary = Some(base);
        Ok(self)
    }

    pub fn class_items(mut self, items: Vec<ClassTierItem>) -> Self {
        self.class_items = items;
        self
    }

    pub fn status(&self) -> CalculationStatus {
        self.status
    }

    pub fn adjustments(&self) -> &[SalaryAdjustment] {
        &self.adjustments
    }

    pub fn approved_amount(&self) -> Option<Decimal> {
        self.approved_amount
    }

    pub fn approved_at(&self) -> Option<DateTime<Utc>> {
        self.approved_at
    }

    pub fn approved_by(&self) -> Option<&str> {
        self.approved_by.as_deref()
    }

    pub fn tier_summary(&self) -> Result<TierSummary, SalaryError> {
        aggregate(self.base_salary, &self.class_items)
    }

    pub fn adjustments_total(&self) -> Result<Decimal, SalaryError> {
        total_signed(&self.adjustments)
    }

    /// Base salary + class tier pay + signed adjustments.
    pub fn calculated_amount(&self) -> Result<Decimal, SalaryError> {
        let summary = self.tier_summary()?;
        let total = Money::new(summary.grand_total).safe_add(self.adjustments_total()?)?;
        Ok(total.value())
    }

    /// Live amount minus the approved snapshot, when there is one.
    pub fn amount_drift(&self) -> Result<Option<Decimal>, SalaryError> {
        match self.approved_amount {
            Some(approved) => Ok(Some(Money::new(self.calculated_amount()?).safe_sub(approved)?.value())),
            None => Ok(None),
        }
    }

    /// Approves the calculation and snapshots its current amount.
    pub fn approve(&mut self, approved_by: impl Into<String>) -> Result<Decimal, SalaryError> {
        self.check_transition(CalculationStatus::Approved, "approve")?;
        let amount = self.calculated_amount()?;
        self.status = CalculationStatus::Approved;
        self.approved_amount = Some(amount);
        self.approved_at = Some(Utc::now());
        self.approved_by = Some(approved_by.into());
        tracing::info!(calculation_id = %self.id, teacher_id = %self.teacher_id, period = %self.period, %amount, "salary calculation approved");
        Ok(amount)
    }

    /// Unlocks an approved calculation for further adjustments.
    ///
    /// The previous approval snapshot is kept until the next approval.
    pub fn reopen(&mut self) -> Result<(), SalaryError> {
        self.check_transition(CalculationStatus::Reopened, "reopen")?;
        self.status = CalculationStatus::Reopened;
        tracing::info!(calculation_id = %self.id, period = %self.period, "salary calculation reopened");
        Ok(())
    }

    pub(crate) fn ensure_adjustable(&self, action: &str) -> Result<(), SalaryError> {
        if !self.status.allows_adjustments() {
            tracing::warn!(calculation_id = %self.id, action, "rejected adjustment change on approved calculation");
            return Err(SalaryError::invalid_state(action, self.status));
        }
        Ok(())
    }

    pub(crate) fn push_adjustment(&mut self, adjustment: SalaryAdjustment) {
        self.adjustments.push(adjustment);
    }

    pub(crate) fn position_of(&self, adjustment_id: Uuid) -> Result<usize, SalaryError> {
        self.adjustments
            .iter()
            .position(|a| a.id == adjustment_id)
            .ok_or(SalaryError::NotFound {
                calculation_id: self.id,
                adjustment_id,
            })
    }

    pub(crate) fn take_adjustment(&mut self, index: usize) -> SalaryAdjustment {
        self.adjustments.remove(index)
    }

    fn check_transition(&self, next: CalculationStatus, action: &str) -> Result<(), SalaryError> {
        if !self.status.can_transition_to(next) {
            tracing::warn!(calculation_id = %self.id, from = %self.status, to = %next, "invalid status transition");
            return Err(SalaryError::invalid_state(action, self.status));
        }
        Ok(())
    }
}
