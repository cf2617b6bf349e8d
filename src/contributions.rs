//! Mandatory social contributions withheld from gross salary.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter};

use crate::config::TaxRateTable;
use crate::math::round2;

/// The four contribution categories, in payslip order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, AsRefStr, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ContributionKind {
    Pension,
    Health,
    Employment,
    Injury,
}

impl ContributionKind {
    pub fn rate(&self, rates: &TaxRateTable) -> Decimal {
        match self {
            ContributionKind::Pension => rates.pension_rate(),
            ContributionKind::Health => rates.health_rate(),
            ContributionKind::Employment => rates.employment_rate(),
            ContributionKind::Injury => rates.injury_rate(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContributionKind::Pension => "Pension Insurance",
            ContributionKind::Health => "Health Insurance",
            ContributionKind::Employment => "Employment Insurance",
            ContributionKind::Injury => "Injury Insurance",
        }
    }
}

/// Itemized contributions for one gross salary.
///
/// `total` is the rounded sum of the already-rounded categories, so the
/// figures shown on a payslip always add up to the total shown beside them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContributionBreakdown {
    pub pension: Decimal,
    pub health: Decimal,
    pub employment: Decimal,
    pub injury: Decimal,
    pub total: Decimal,
}

impl ContributionBreakdown {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: ContributionKind) -> Decimal {
        match kind {
            ContributionKind::Pension => self.pension,
            ContributionKind::Health => self.health,
            ContributionKind::Employment => self.employment,
            ContributionKind::Injury => self.injury,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::zero()
    }
}

/// Computes each contribution as `round2(gross * rate)`, then totals the
/// rounded parts.
///
/// Non-positive gross yields the all-zero breakdown rather than an error.
pub fn compute_contributions(gross: Decimal, rates: &TaxRateTable) -> ContributionBreakdown {
    if gross <= Decimal::ZERO {
        return ContributionBreakdown::zero();
    }

    let pension = round2(gross * rates.pension_rate());
    let health = round2(gross * rates.health_rate());
    let employment = round2(gross * rates.employment_rate());
    let injury = round2(gross * rates.injury_rate());

    ContributionBreakdown {
        pension,
        health,
        employment,
        injury,
        total: round2(pension + health + employment + injury),
    }
}
