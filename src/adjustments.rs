//! Manual bonuses and deductions on top of a salary calculation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use strum::{AsRefStr, Display};
use uuid::Uuid;

use crate::calculation::SalaryCalculation;
use crate::math::Money;
use crate::traits::AdjustmentStore;
#[cfg(feature = "async")]
use crate::traits::AsyncAdjustmentStore;
use crate::types::SalaryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AdjustmentType {
    Addition,
    Deduction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryAdjustment {
    pub id: Uuid,
    pub adjustment_type: AdjustmentType,
    /// Always positive; the sign comes from `adjustment_type`.
    pub amount: Decimal,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub created_by_name: Option<String>,
}

impl SalaryAdjustment {
    pub fn signed_amount(&self) -> Decimal {
        match self.adjustment_type {
            AdjustmentType::Addition => self.amount,
            AdjustmentType::Deduction => -self.amount,
        }
    }
}

/// Adjustment as submitted from the add-adjustment form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAdjustment {
    pub adjustment_type: AdjustmentType,
    pub amount: Decimal,
    pub description: String,
    #[serde(default)]
    pub created_by_name: Option<String>,
}

impl NewAdjustment {
    pub fn new(adjustment_type: AdjustmentType, amount: Decimal, description: impl Into<String>) -> Self {
        Self {
            adjustment_type,
            amount,
            description: description.into(),
            created_by_name: None,
        }
    }

    pub fn created_by(mut self, name: impl Into<String>) -> Self {
        self.created_by_name = Some(name.into());
        self
    }
}

/// Signed sum of adjustments. Negative when deductions outweigh additions.
pub fn total_signed(adjustments: &[SalaryAdjustment]) -> Result<Decimal, SalaryError> {
    adjustments
        .iter()
        .try_fold(Money::default(), |acc, a| acc.safe_add(a.signed_amount()))
        .map(Money::value)
}

fn prepare(calc: &SalaryCalculation, request: NewAdjustment) -> Result<SalaryAdjustment, SalaryError> {
    calc.ensure_adjustable("add adjustment")?;
    if request.amount <= Decimal::ZERO {
        return Err(SalaryError::invalid_input(
            "amount",
            request.amount,
            "Adjustment amount must be greater than zero",
        ));
    }

    Ok(SalaryAdjustment {
        id: Uuid::new_v4(),
        adjustment_type: request.adjustment_type,
        amount: request.amount,
        description: request.description.trim().to_string(),
        created_at: Utc::now(),
        created_by_name: request.created_by_name,
    })
}

/// Adds an adjustment to an unapproved calculation, without persisting it.
pub fn add_adjustment(calc: &mut SalaryCalculation, request: NewAdjustment) -> Result<SalaryAdjustment, SalaryError> {
    let adjustment = prepare(calc, request)?;
    calc.push_adjustment(adjustment.clone());
    Ok(adjustment)
}

/// Removes an adjustment from an unapproved calculation, without persisting
/// the removal.
pub fn remove_adjustment(calc: &mut SalaryCalculation, adjustment_id: Uuid) -> Result<SalaryAdjustment, SalaryError> {
    calc.ensure_adjustable("remove adjustment")?;
    let index = calc.position_of(adjustment_id)?;
    Ok(calc.take_adjustment(index))
}

/// Applies adjustment changes to calculations through a persistence
/// collaborator.
pub struct AdjustmentLedger<S> {
    store: S,
}

impl<S> AdjustmentLedger<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: AdjustmentStore> AdjustmentLedger<S> {
    pub fn add_adjustment(
        &self,
        calc: &mut SalaryCalculation,
        request: NewAdjustment,
    ) -> Result<SalaryAdjustment, SalaryError> {
        let adjustment = prepare(calc, request)?;
        self.store.save_adjustment(calc.id, &adjustment)?;
        calc.push_adjustment(adjustment.clone());
        tracing::info!(
            calculation_id = %calc.id,
            adjustment_id = %adjustment.id,
            kind = %adjustment.adjustment_type,
            amount = %adjustment.amount,
            "salary adjustment added"
        );
        Ok(adjustment)
    }

    pub fn remove_adjustment(
        &self,
        calc: &mut SalaryCalculation,
        adjustment_id: Uuid,
    ) -> Result<SalaryAdjustment, SalaryError> {
        calc.ensure_adjustable("remove adjustment")?;
        let index = calc.position_of(adjustment_id)?;
        self.store.delete_adjustment(calc.id, adjustment_id)?;
        let removed = calc.take_adjustment(index);
        tracing::info!(calculation_id = %calc.id, %adjustment_id, "salary adjustment removed");
        Ok(removed)
    }
}

#[cfg(feature = "async")]
impl<S: AsyncAdjustmentStore> AdjustmentLedger<S> {
    pub async fn add_adjustment_async(
        &self,
        calc: &mut SalaryCalculation,
        request: NewAdjustment,
    ) -> Result<SalaryAdjustment, SalaryError> {
        let adjustment = prepare(calc, request)?;
        self.store.save_adjustment_async(calc.id, &adjustment).await?;
        calc.push_adjustment(adjustment.clone());
        tracing::info!(calculation_id = %calc.id, adjustment_id = %adjustment.id, "salary adjustment added");
        Ok(adjustment)
    }

    pub async fn remove_adjustment_async(
        &self,
        calc: &mut SalaryCalculation,
        adjustment_id: Uuid,
    ) -> Result<SalaryAdjustment, SalaryError> {
        calc.ensure_adjustable("remove adjustment")?;
        let index = calc.position_of(adjustment_id)?;
        self.store.delete_adjustment_async(calc.id, adjustment_id).await?;
        let removed = calc.take_adjustment(index);
        tracing::info!(calculation_id = %calc.id, %adjustment_id, "salary adjustment removed");
        Ok(removed)
    }
}

/// Store that keeps adjustments in memory, keyed by calculation.
#[derive(Debug, Default)]
pub struct InMemoryAdjustmentStore {
    records: Mutex<HashMap<Uuid, Vec<SalaryAdjustment>>>,
}

impl InMemoryAdjustmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn adjustments_for(&self, calculation_id: Uuid) -> Result<Vec<SalaryAdjustment>, SalaryError> {
        let records = self
            .records
            .lock()
            .map_err(|e| SalaryError::Persistence(format!("Adjustment store lock poisoned: {}", e)))?;
        Ok(records.get(&calculation_id).cloned().unwrap_or_default())
    }
}

impl AdjustmentStore for InMemoryAdjustmentStore {
    fn save_adjustment(&self, calculation_id: Uuid, adjustment: &SalaryAdjustment) -> Result<(), SalaryError> {
        let mut records = self
            .records
            .lock()
            .map_err(|e| SalaryError::Persistence(format!("Adjustment store lock poisoned: {}", e)))?;
        records.entry(calculation_id).or_default().push(adjustment.clone());
        Ok(())
    }

    fn delete_adjustment(&self, calculation_id: Uuid, adjustment_id: Uuid) -> Result<(), SalaryError> {
        let mut records = self
            .records
            .lock()
            .map_err(|e| SalaryError::Persistence(format!("Adjustment store lock poisoned: {}", e)))?;
        let stored = records.entry(calculation_id).or_default();
        let before = stored.len();
        stored.retain(|a| a.id != adjustment_id);
        if stored.len() == before {
            return Err(SalaryError::NotFound {
                calculation_id,
                adjustment_id,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::{CalculationStatus, PayPeriod};
    use rust_decimal_macros::dec;

    fn adjustment(kind: AdjustmentType, amount: Decimal) -> SalaryAdjustment {
        SalaryAdjustment {
            id: Uuid::new_v4(),
            adjustment_type: kind,
            amount,
            description: String::new(),
            created_at: Utc::now(),
            created_by_name: None,
        }
    }

    fn calculation() -> SalaryCalculation {
        SalaryCalculation::new(Uuid::new_v4(), PayPeriod::new(2026, 10).unwrap())
    }

    #[test]
    fn test_total_signed() {
        let mixed = [
            adjustment(AdjustmentType::Addition, dec!(100)),
            adjustment(AdjustmentType::Deduction, dec!(30)),
        ];
        assert_eq!(total_signed(&mixed).unwrap(), dec!(70));
        assert_eq!(total_signed(&[adjustment(AdjustmentType::Deduction, dec!(100))]).unwrap(), dec!(-100));
        assert_eq!(total_signed(&[]).unwrap(), Decimal::ZERO);

        let huge = [
            adjustment(AdjustmentType::Addition, Decimal::MAX),
            adjustment(AdjustmentType::Addition, Decimal::MAX),
        ];
        assert!(matches!(total_signed(&huge), Err(SalaryError::Overflow { .. })));
    }

    #[test]
    fn test_add_rejects_non_positive_amount() {
        let mut calc = calculation();
        for amount in [Decimal::ZERO, dec!(-10)] {
            let res = add_adjustment(&mut calc, NewAdjustment::new(AdjustmentType::Addition, amount, "Bonus"));
            assert!(matches!(res, Err(SalaryError::InvalidInput { .. })));
        }
        assert!(calc.adjustments().is_empty());
    }

    #[test]
    fn test_approved_calculation_is_locked() {
        let mut calc = calculation();
        let kept = add_adjustment(&mut calc, NewAdjustment::new(AdjustmentType::Addition, dec!(100), "Bonus")).unwrap();
        calc.approve("Director").unwrap();

        let res = add_adjustment(&mut calc, NewAdjustment::new(AdjustmentType::Addition, dec!(50), "Late bonus"));
        assert!(matches!(res, Err(SalaryError::InvalidState { status: CalculationStatus::Approved, .. })));
        // State gate is checked before the amount.
        let res = add_adjustment(&mut calc, NewAdjustment::new(AdjustmentType::Addition, dec!(-1), "x"));
        assert!(matches!(res, Err(SalaryError::InvalidState { .. })));
        assert!(matches!(remove_adjustment(&mut calc, kept.id), Err(SalaryError::InvalidState { .. })));

        calc.reopen().unwrap();
        add_adjustment(&mut calc, NewAdjustment::new(AdjustmentType::Addition, dec!(50), "Late bonus")).unwrap();
        remove_adjustment(&mut calc, kept.id).unwrap();
        assert_eq!(calc.adjustments_total().unwrap(), dec!(50));
    }

    #[test]
    fn test_remove_unknown_adjustment() {
        let mut calc = calculation();
        let mut other = calculation();
        let foreign = add_adjustment(&mut other, NewAdjustment::new(AdjustmentType::Addition, dec!(10), "x")).unwrap();

        let err = remove_adjustment(&mut calc, foreign.id).unwrap_err();
        assert_eq!(
            err,
            SalaryError::NotFound {
                calculation_id: calc.id,
                adjustment_id: foreign.id
            }
        );
    }

    #[test]
    fn test_ledger_persists_through_store() {
        let store = InMemoryAdjustmentStore::new();
        let ledger = AdjustmentLedger::new(&store);
        let mut calc = calculation();

        let added = ledger
            .add_adjustment(
                &mut calc,
                NewAdjustment::new(AdjustmentType::Deduction, dec!(250), "  Broken projector  ").created_by("Accountant"),
            )
            .unwrap();
        assert_eq!(added.description, "Broken projector");
        assert_eq!(added.created_by_name.as_deref(), Some("Accountant"));
        assert_eq!(store.adjustments_for(calc.id).unwrap(), vec![added.clone()]);

        ledger.remove_adjustment(&mut calc, added.id).unwrap();
        assert!(store.adjustments_for(calc.id).unwrap().is_empty());
        assert!(calc.adjustments().is_empty());
    }

    struct FailingStore;

    impl AdjustmentStore for FailingStore {
        fn save_adjustment(&self, _: Uuid, _: &SalaryAdjustment) -> Result<(), SalaryError> {
            Err(SalaryError::Persistence("backend unavailable".to_string()))
        }

        fn delete_adjustment(&self, _: Uuid, _: Uuid) -> Result<(), SalaryError> {
            Err(SalaryError::Persistence("backend unavailable".to_string()))
        }
    }

    #[test]
    fn test_store_failure_leaves_calculation_untouched() {
        let ledger = AdjustmentLedger::new(FailingStore);
        let mut calc = calculation();
        let res = ledger.add_adjustment(&mut calc, NewAdjustment::new(AdjustmentType::Addition, dec!(10), "Bonus"));
        assert!(matches!(res, Err(SalaryError::Persistence(_))));
        assert!(calc.adjustments().is_empty());

        let existing = add_adjustment(&mut calc, NewAdjustment::new(AdjustmentType::Addition, dec!(10), "Bonus")).unwrap();
        assert!(ledger.remove_adjustment(&mut calc, existing.id).is_err());
        assert_eq!(calc.adjustments().len(), 1);
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn test_async_ledger_uses_blanket_store() {
        let ledger = AdjustmentLedger::new(InMemoryAdjustmentStore::new());
        let mut calc = calculation();
        let added = ledger
            .add_adjustment_async(&mut calc, NewAdjustment::new(AdjustmentType::Addition, dec!(300), "Olympiad coaching"))
            .await
            .unwrap();
        assert_eq!(ledger.store().adjustments_for(calc.id).unwrap().len(), 1);

        calc.approve("Director").unwrap();
        let res = ledger.remove_adjustment_async(&mut calc, added.id).await;
        assert!(matches!(res, Err(SalaryError::InvalidState { .. })));
    }
}
