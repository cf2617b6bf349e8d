//! Gross ↔ net salary conversion.
//!
//! Both directions go through the table's net-to-gross multiplier and round
//! the result to two decimals. Converting back and forth can therefore drift
//! by up to two cents.

use rust_decimal::Decimal;

use crate::config::TaxRateTable;
use crate::math::Money;
use crate::types::SalaryError;

/// Gross salary required to take home `net`.
pub fn gross_from_net(net: Decimal, rates: &TaxRateTable) -> Result<Decimal, SalaryError> {
    if net <= Decimal::ZERO {
        return Err(SalaryError::invalid_input("netSalary", net, "Net salary must be greater than zero"));
    }
    let gross = Money::new(net)
        .safe_div(rates.net_to_gross_multiplier())?
        .round2();
    tracing::debug!(%net, gross = %gross.value(), "derived gross from net");
    Ok(gross.value())
}

/// Take-home salary for a given `gross`.
pub fn net_from_gross(gross: Decimal, rates: &TaxRateTable) -> Result<Decimal, SalaryError> {
    if gross <= Decimal::ZERO {
        return Err(SalaryError::invalid_input("grossSalary", gross, "Gross salary must be greater than zero"));
    }
    let net = Money::new(gross)
        .safe_mul(rates.net_to_gross_multiplier())?
        .round2();
    Ok(net.value())
}
