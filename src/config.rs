//! Contribution and income tax rates.
//!
//! A [`TaxRateTable`] is passed explicitly into every calculator call. There is
//! no process-wide rate state, so alternate tables (a new tax year, a test
//! fixture) can be used side by side.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;

use crate::builder::{Builder, Validate};
use crate::inputs::IntoMoney;
use crate::types::SalaryError;

pub const DEFAULT_PENSION_RATE: Decimal = dec!(0.188);
pub const DEFAULT_HEALTH_RATE: Decimal = dec!(0.075);
pub const DEFAULT_EMPLOYMENT_RATE: Decimal = dec!(0.012);
pub const DEFAULT_INJURY_RATE: Decimal = dec!(0.005);
pub const DEFAULT_INCOME_TAX_RATE: Decimal = dec!(0.10);

/// Immutable table of employee contribution rates and the flat income tax rate.
///
/// All rates are fractions (`0.188` is 18.8%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxRateTable {
    pension_rate: Decimal,
    health_rate: Decimal,
    employment_rate: Decimal,
    injury_rate: Decimal,
    income_tax_rate: Decimal,
}

impl Default for TaxRateTable {
    fn default() -> Self {
        TaxRateTable {
            pension_rate: DEFAULT_PENSION_RATE,
            health_rate: DEFAULT_HEALTH_RATE,
            employment_rate: DEFAULT_EMPLOYMENT_RATE,
            injury_rate: DEFAULT_INJURY_RATE,
            income_tax_rate: DEFAULT_INCOME_TAX_RATE,
        }
    }
}

// Ensure the caller can easily create a table from a JSON document.
impl std::str::FromStr for TaxRateTable {
    type Err = SalaryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let table: TaxRateTable = serde_json::from_str(s)
            .map_err(|e| SalaryError::Configuration(format!("Failed to parse rate table JSON: {}", e)))?;
        table.validate()?;
        Ok(table)
    }
}

impl TaxRateTable {
    pub fn builder() -> TaxRateTableBuilder {
        TaxRateTableBuilder::default()
    }

    pub fn new(
        pension_rate: impl IntoMoney,
        health_rate: impl IntoMoney,
        employment_rate: impl IntoMoney,
        injury_rate: impl IntoMoney,
        income_tax_rate: impl IntoMoney,
    ) -> Result<Self, SalaryError> {
        let table = TaxRateTable {
            pension_rate: pension_rate.into_money()?,
            health_rate: health_rate.into_money()?,
            employment_rate: employment_rate.into_money()?,
            injury_rate: injury_rate.into_money()?,
            income_tax_rate: income_tax_rate.into_money()?,
        };
        table.validate()?;
        Ok(table)
    }

    /// Loads rates from `SALARY_*_RATE` environment variables.
    ///
    /// Variables that are not set keep their reference value; variables that
    /// are set but unparsable are an error.
    pub fn from_env() -> Result<Self, SalaryError> {
        fn read(name: &str, fallback: Decimal) -> Result<Decimal, SalaryError> {
            match env::var(name) {
                Ok(raw) => raw
                    .trim()
                    .parse::<Decimal>()
                    .map_err(|e| SalaryError::Configuration(format!("Invalid {} format: {}", name, e))),
                Err(_) => Ok(fallback),
            }
        }

        let table = TaxRateTable {
            pension_rate: read("SALARY_PENSION_RATE", DEFAULT_PENSION_RATE)?,
            health_rate: read("SALARY_HEALTH_RATE", DEFAULT_HEALTH_RATE)?,
            employment_rate: read("SALARY_EMPLOYMENT_RATE", DEFAULT_EMPLOYMENT_RATE)?,
            injury_rate: read("SALARY_INJURY_RATE", DEFAULT_INJURY_RATE)?,
            income_tax_rate: read("SALARY_INCOME_TAX_RATE", DEFAULT_INCOME_TAX_RATE)?,
        };
        table.validate()?;
        tracing::debug!(multiplier = %table.net_to_gross_multiplier(), "loaded tax rate table from environment");
        Ok(table)
    }

    /// Attempts to load the table from a JSON file.
    pub fn try_from_json(path: &str) -> Result<Self, SalaryError> {
        let content = fs::read_to_string(path)
            .map_err(|e| SalaryError::Configuration(format!("Failed to read rate table file: {}", e)))?;
        content.parse()
    }

    pub fn pension_rate(&self) -> Decimal {
        self.pension_rate
    }

    pub fn health_rate(&self) -> Decimal {
        self.health_rate
    }

    pub fn employment_rate(&self) -> Decimal {
        self.employment_rate
    }

    pub fn injury_rate(&self) -> Decimal {
        self.injury_rate
    }

    pub fn income_tax_rate(&self) -> Decimal {
        self.income_tax_rate
    }

    /// Sum of the four contribution rates.
    pub fn total_contribution_rate(&self) -> Decimal {
        self.pension_rate + self.health_rate + self.employment_rate + self.injury_rate
    }

    /// Fraction of gross that reaches the employee:
    /// `(1 - total_contribution_rate) * (1 - income_tax_rate)`.
    pub fn net_to_gross_multiplier(&self) -> Decimal {
        (Decimal::ONE - self.total_contribution_rate()) * (Decimal::ONE - self.income_tax_rate)
    }
}

impl Validate for TaxRateTable {
    fn validate(&self) -> Result<(), SalaryError> {
        let rates = [
            ("pensionRate", self.pension_rate),
            ("healthRate", self.health_rate),
            ("employmentRate", self.employment_rate),
            ("injuryRate", self.injury_rate),
            ("incomeTaxRate", self.income_tax_rate),
        ];
        for (name, rate) in rates {
            if rate < Decimal::ZERO || rate >= Decimal::ONE {
                return Err(SalaryError::Configuration(format!(
                    "{} must be in [0, 1), got {}",
                    name, rate
                )));
            }
        }

        if self.total_contribution_rate() >= Decimal::ONE {
            return Err(SalaryError::Configuration(format!(
                "Total contribution rate must be below 1, got {}",
                self.total_contribution_rate()
            )));
        }

        let multiplier = self.net_to_gross_multiplier();
        if multiplier <= Decimal::ZERO || multiplier >= Decimal::ONE {
            return Err(SalaryError::Configuration(format!(
                "Net-to-gross multiplier must be in (0, 1), got {}",
                multiplier
            )));
        }

        Ok(())
    }
}

// ========== TaxRateTableBuilder ==========

/// Builder starting from the reference rates; only the overridden rates change.
#[derive(Default)]
pub struct TaxRateTableBuilder {
    pension_rate: Option<Decimal>,
    health_rate: Option<Decimal>,
    employment_rate: Option<Decimal>,
    injury_rate: Option<Decimal>,
    income_tax_rate: Option<Decimal>,
    rejected: Option<SalaryError>,
}

impl TaxRateTableBuilder {
    fn set(mut self, rate: impl IntoMoney, apply: impl FnOnce(&mut Self, Decimal)) -> Self {
        match rate.into_money() {
            Ok(r) => apply(&mut self, r),
            Err(e) => {
                self.rejected.get_or_insert(e);
            }
        }
        self
    }

    pub fn pension_rate(self, rate: impl IntoMoney) -> Self {
        self.set(rate, |b, r| b.pension_rate = Some(r))
    }

    pub fn health_rate(self, rate: impl IntoMoney) -> Self {
        self.set(rate, |b, r| b.health_rate = Some(r))
    }

    pub fn employment_rate(self, rate: impl IntoMoney) -> Self {
        self.set(rate, |b, r| b.employment_rate = Some(r))
    }

    pub fn injury_rate(self, rate: impl IntoMoney) -> Self {
        self.set(rate, |b, r| b.injury_rate = Some(r))
    }

    pub fn income_tax_rate(self, rate: impl IntoMoney) -> Self {
        self.set(rate, |b, r| b.income_tax_rate = Some(r))
    }

    fn assemble(&self) -> TaxRateTable {
        TaxRateTable {
            pension_rate: self.pension_rate.unwrap_or(DEFAULT_PENSION_RATE),
            health_rate: self.health_rate.unwrap_or(DEFAULT_HEALTH_RATE),
            employment_rate: self.employment_rate.unwrap_or(DEFAULT_EMPLOYMENT_RATE),
            injury_rate: self.injury_rate.unwrap_or(DEFAULT_INJURY_RATE),
            income_tax_rate: self.income_tax_rate.unwrap_or(DEFAULT_INCOME_TAX_RATE),
        }
    }
}

impl Validate for TaxRateTableBuilder {
    fn validate(&self) -> Result<(), SalaryError> {
        if let Some(err) = &self.rejected {
            return Err(SalaryError::Configuration(err.to_string()));
        }
        self.assemble().validate()
    }
}

impl Builder<TaxRateTable> for TaxRateTableBuilder {
    fn build(self) -> Result<TaxRateTable, SalaryError> {
        self.validate()?;
        Ok(self.assemble())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_multiplier() {
        let rates = TaxRateTable::default();
        assert_eq!(rates.total_contribution_rate(), dec!(0.280));
        assert_eq!(rates.net_to_gross_multiplier(), dec!(0.648));
        assert!(rates.validate().is_ok());
    }

    #[test]
    fn test_new_rejects_out_of_range_rates() {
        assert!(TaxRateTable::new(dec!(1.0), 0, 0, 0, 0).is_err());
        assert!(TaxRateTable::new(dec!(-0.01), 0, 0, 0, 0).is_err());
        assert!(TaxRateTable::new(dec!(0.5), dec!(0.5), 0, 0, 0).is_err());
        assert!(TaxRateTable::new(0, 0, 0, 0, 0).is_err());
        assert!(TaxRateTable::new(dec!(0.2), dec!(0.1), 0, 0, dec!(0.15)).is_ok());
    }

    #[test]
    fn test_builder_overrides_reference_rates() {
        let rates = TaxRateTable::builder().income_tax_rate(dec!(0.12)).build().unwrap();
        assert_eq!(rates.income_tax_rate(), dec!(0.12));
        assert_eq!(rates.pension_rate(), DEFAULT_PENSION_RATE);
        assert_eq!(rates.net_to_gross_multiplier(), dec!(0.72) * dec!(0.88));

        let res = TaxRateTable::builder().pension_rate("not a rate").build();
        assert!(matches!(res, Err(SalaryError::Configuration(_))));
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "pensionRate": "0.188",
            "healthRate": "0.075",
            "employmentRate": "0.012",
            "injuryRate": "0.005",
            "incomeTaxRate": "0.10"
        }"#;
        let rates: TaxRateTable = json.parse().unwrap();
        assert_eq!(rates, TaxRateTable::default());

        let bad = json.replace("0.188", "0.95");
        assert!(bad.parse::<TaxRateTable>().is_err());
        assert!("{}".parse::<TaxRateTable>().is_err());
    }

    #[test]
    fn test_try_from_json_missing_file() {
        let res = TaxRateTable::try_from_json("/nonexistent/rates.json");
        assert!(matches!(res, Err(SalaryError::Configuration(_))));
    }
}
