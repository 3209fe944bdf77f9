use chrono::Utc;
use log::{info, warn};

use crate::errors::{CustomResult, Error};
use crate::modules::models::category::ManualOverride;
use crate::modules::store::DataStore;

pub struct OverrideManager {}

impl OverrideManager {
    /// # set a manual winner
    /// replaces any earlier override of the category. only allowed while
    /// voting is closed. the votes of the category are left untouched.
    ///
    /// ## Arguments
    /// * `store` - the data store
    /// * `category_id` - the category to override
    /// * `car_id` - the car that wins the category
    /// * `reason` - why the tally is overridden, kept for audit
    ///
    /// ## Returns
    /// * `ManualOverride` - the stored override
    pub fn set_manual_winner<S: DataStore>(
        store: &mut S,
        category_id: i32,
        car_id: i32,
        reason: &str,
    ) -> CustomResult<ManualOverride> {
        OverrideManager::ensure_voting_closed(store, "modules/overrides:set_manual_winner")?;

        let reason = reason.trim();
        if reason.is_empty() {
            return Err(Error::ValidationError {
                message: "a reason is required to override a winner".to_string(),
            });
        }

        let category = store.category(category_id)?;
        let car = store.car(car_id)?;
        if !car.eligible {
            return Err(Error::ValidationError {
                message: format!("car #{} is not eligible to win", car.car_number),
            });
        }

        let manual = ManualOverride {
            car_id: car.id,
            reason: reason.to_string(),
            overridden_at: Utc::now().naive_utc(),
        };
        store.set_override(category.id, &manual)?;

        info!(target:"modules/overrides:set_manual_winner", "category {} ({}) overridden to car #{}: {}", category.id, category.name, car.car_number, manual.reason);
        Ok(manual)
    }

    /// # clear a manual winner
    /// the category falls back to its vote tally. only allowed while voting is closed.
    pub fn clear_manual_winner<S: DataStore>(store: &mut S, category_id: i32) -> CustomResult<()> {
        OverrideManager::ensure_voting_closed(store, "modules/overrides:clear_manual_winner")?;

        let category = store.category(category_id)?;
        store.clear_override(category.id)?;

        info!(target:"modules/overrides:clear_manual_winner", "override of category {} ({}) cleared", category.id, category.name);
        Ok(())
    }

    fn ensure_voting_closed<S: DataStore>(store: &mut S, target: &str) -> CustomResult<()> {
        if store.is_voting_open()? {
            warn!(target: target, "refusing to change winners while voting is open");
            return Err(Error::VotingOpenError {});
        }
        Ok(())
    }
}
