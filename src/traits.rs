use uuid::Uuid;

use crate::adjustments::SalaryAdjustment;
use crate::types::SalaryError;

/// Persistence collaborator for salary adjustments.
///
/// The ledger validates state and amount before calling into the store, and
/// only changes the in-memory calculation once the store has succeeded.
pub trait AdjustmentStore {
    fn save_adjustment(&self, calculation_id: Uuid, adjustment: &SalaryAdjustment) -> Result<(), SalaryError>;

    fn delete_adjustment(&self, calculation_id: Uuid, adjustment_id: Uuid) -> Result<(), SalaryError>;
}

impl<T: AdjustmentStore + ?Sized> AdjustmentStore for &T {
    fn save_adjustment(&self, calculation_id: Uuid, adjustment: &SalaryAdjustment) -> Result<(), SalaryError> {
        (**self).save_adjustment(calculation_id, adjustment)
    }

    fn delete_adjustment(&self, calculation_id: Uuid, adjustment_id: Uuid) -> Result<(), SalaryError> {
        (**self).delete_adjustment(calculation_id, adjustment_id)
    }
}

/// Async version of the AdjustmentStore trait, for stores backed by an API.
///
/// This trait is automatically implemented for any type that implements `AdjustmentStore + Send + Sync`.
#[cfg(feature = "async")]
#[async_trait::async_trait]
pub trait AsyncAdjustmentStore: Send + Sync {
    async fn save_adjustment_async(&self, calculation_id: Uuid, adjustment: &SalaryAdjustment) -> Result<(), SalaryError>;

    async fn delete_adjustment_async(&self, calculation_id: Uuid, adjustment_id: Uuid) -> Result<(), SalaryError>;
}

#[cfg(feature = "async")]
#[async_trait::async_trait]
impl<T> AsyncAdjustmentStore for T
where
    T: AdjustmentStore + Send + Sync,
{
    async fn save_adjustment_async(&self, calculation_id: Uuid, adjustment: &SalaryAdjustment) -> Result<(), SalaryError> {
        self.save_adjustment(calculation_id, adjustment)
    }

    async fn delete_adjustment_async(&self, calculation_id: Uuid, adjustment_id: Uuid) -> Result<(), SalaryError> {
        self.delete_adjustment(calculation_id, adjustment_id)
    }
}
