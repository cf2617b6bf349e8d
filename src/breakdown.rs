//! Full salary breakdown: contributions, taxable income, income tax and net.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::config::TaxRateTable;
use crate::contributions::{compute_contributions, ContributionBreakdown, ContributionKind};
use crate::converter::gross_from_net;
use crate::inputs::SalaryInput;
use crate::math::round2;
use crate::types::{CalculationStep, Operation, SalaryError};

/// Gross-to-net breakdown for a single salary.
///
/// Recomputed on every input change and never persisted by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalaryBreakdown {
    pub gross_salary: Decimal,
    pub contributions: ContributionBreakdown,
    /// Gross minus total contributions; the income tax base.
    pub taxable_income: Decimal,
    pub income_tax: Decimal,
    pub net_salary: Decimal,
    /// Income tax rate the breakdown was computed with.
    pub income_tax_rate: Decimal,
}

impl SalaryBreakdown {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_zero(&self) -> bool {
        self.gross_salary.is_zero() && self.net_salary.is_zero() && self.contributions.is_zero()
    }

    /// Ordered steps from gross to net.
    pub fn trace(&self) -> Vec<CalculationStep> {
        if self.is_zero() {
            return vec![CalculationStep::info("No gross salary entered")];
        }

        let mut trace = vec![CalculationStep::initial("Gross Salary", self.gross_salary)];
        for kind in ContributionKind::iter() {
            trace.push(CalculationStep::subtract(kind.label(), self.contributions.get(kind)));
        }
        trace.push(CalculationStep::result("Taxable Income", self.taxable_income));
        trace.push(CalculationStep::rate("Income Tax Rate", self.income_tax_rate));
        trace.push(CalculationStep::subtract("Income Tax", self.income_tax));
        trace.push(CalculationStep::result("Net Salary", self.net_salary));
        trace
    }

    /// Generates a human-readable explanation of the breakdown, one aligned
    /// line per step.
    pub fn explain(&self) -> String {
        use std::fmt::Write;
        let trace = self.trace();
        let mut output = String::new();

        let _ = writeln!(&mut output, "Salary breakdown:");
        let _ = writeln!(&mut output, "{:-<50}", "");

        let width = trace
            .iter()
            .map(|step| step.description.len())
            .max()
            .unwrap_or(20)
            .max(20);

        for step in &trace {
            match (step.operation, step.amount) {
                (Operation::Info, _) | (_, None) => {
                    let _ = writeln!(&mut output, "  INFO: {}", step.description);
                }
                (Operation::Rate, Some(rate)) => {
                    let _ = writeln!(
                        &mut output,
                        "  {:<width$} : {} {:>12}",
                        step.description,
                        step.symbol(),
                        format!("{:.3}", rate),
                        width = width
                    );
                }
                (_, Some(amount)) => {
                    let _ = writeln!(
                        &mut output,
                        "  {:<width$} : {} {:>12}",
                        step.description,
                        step.symbol(),
                        format!("{:.2}", amount),
                        width = width
                    );
                }
            }
        }

        let _ = writeln!(&mut output, "{:-<50}", "");
        output
    }
}

impl std::fmt::Display for SalaryBreakdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Gross: {:.2} | Contributions: {:.2} | Tax: {:.2} | Net: {:.2}",
            self.gross_salary, self.contributions.total, self.income_tax, self.net_salary
        )
    }
}

/// Computes the full breakdown for `gross`.
///
/// Non-positive gross returns [`SalaryBreakdown::zero`]; live-preview forms
/// feed half-typed values through here.
pub fn compute_breakdown(gross: Decimal, rates: &TaxRateTable) -> SalaryBreakdown {
    if gross <= Decimal::ZERO {
        return SalaryBreakdown::zero();
    }

    let contributions = compute_contributions(gross, rates);
    let taxable_income = round2(gross - contributions.total);
    let income_tax = round2(taxable_income * rates.income_tax_rate());
    let net_salary = round2(gross - contributions.total - income_tax);

    let breakdown = SalaryBreakdown {
        gross_salary: gross,
        contributions,
        taxable_income,
        income_tax,
        net_salary,
        income_tax_rate: rates.income_tax_rate(),
    };
    tracing::debug!(%gross, net = %breakdown.net_salary, "computed salary breakdown");
    breakdown
}

/// Resolves the input to gross (deriving it from net when needed) and computes
/// the breakdown.
///
/// In net mode the displayed net may differ from the typed one by a cent or
/// two, since the derived gross is rounded before being broken down again.
pub fn breakdown_for(input: &SalaryInput, rates: &TaxRateTable) -> Result<SalaryBreakdown, SalaryError> {
    let gross = match *input {
        SalaryInput::GrossEntry(gross) => {
            if gross <= Decimal::ZERO {
                return Err(SalaryError::invalid_input("grossSalary", gross, "Gross salary must be greater than zero"));
            }
            gross
        }
        SalaryInput::NetEntry(net) => gross_from_net(net, rates)?,
    };
    Ok(compute_breakdown(gross, rates))
}

/// Live-preview variant of [`breakdown_for`]: never fails.
///
/// Any input that cannot be resolved to a positive gross produces the all-zero
/// breakdown.
pub fn preview(input: &SalaryInput, rates: &TaxRateTable) -> SalaryBreakdown {
    if input.amount() <= Decimal::ZERO {
        return SalaryBreakdown::zero();
    }
    match breakdown_for(input, rates) {
        Ok(breakdown) => breakdown,
        Err(e) => {
            tracing::warn!(error = %e, "salary preview degraded to zero");
            SalaryBreakdown::zero()
        }
    }
}
