//! Salary detail report consumed by the per-teacher salary view.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::breakdown::SalaryBreakdown;
use crate::config::TaxRateTable;
use crate::contributions::ContributionKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContributionLine {
    pub kind: ContributionKind,
    pub label: String,
    pub rate: Decimal,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub gross_salary: Decimal,
    pub total_contributions: Decimal,
    pub taxable_income: Decimal,
    pub income_tax: Decimal,
    pub net_salary: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalaryReport {
    pub gross_salary: Decimal,
    pub contributions: Vec<ContributionLine>,
    pub income_tax: Decimal,
    pub summary: ReportSummary,
}

impl SalaryReport {
    pub fn from_breakdown(breakdown: &SalaryBreakdown, rates: &TaxRateTable) -> Self {
        let contributions = ContributionKind::iter()
            .map(|kind| ContributionLine {
                kind,
                label: kind.label().to_string(),
                rate: kind.rate(rates),
                amount: breakdown.contributions.get(kind),
            })
            .collect();

        SalaryReport {
            gross_salary: breakdown.gross_salary,
            contributions,
            income_tax: breakdown.income_tax,
            summary: ReportSummary {
                gross_salary: breakdown.gross_salary,
                total_contributions: breakdown.contributions.total,
                taxable_income: breakdown.taxable_income,
                income_tax: breakdown.income_tax,
                net_salary: breakdown.net_salary,
            },
        }
    }

    /// JSON schema of the report, for generating UI typings.
    pub fn json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(SalaryReport)
    }
}
