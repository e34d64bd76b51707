use super::errors::{dependencies_not_met, GuardResult};
use crate::models::ProductionItem;
use crate::orchestration::eligibility::{eligibility, sibling_status_map};
use crate::state_machine::states::ItemStatus;
use crate::store::{DependencyProvider, ItemStore};
use async_trait::async_trait;

/// Read-only handles a guard may consult while deciding a transition.
pub struct GuardContext<'a> {
    pub items: &'a dyn ItemStore,
    pub dependencies: &'a dyn DependencyProvider,
}

/// Trait for implementing state transition guards.
#[async_trait]
pub trait StateGuard: Send + Sync {
    /// Check if a transition is allowed.
    async fn check(&self, item: &ProductionItem, ctx: &GuardContext<'_>) -> GuardResult<bool>;

    /// Get a description of this guard for logging.
    fn description(&self) -> &'static str;
}

/// Guard to check that every upstream station dependency is done before an
/// operator starts work. A dependency station with no released sibling item
/// counts as not done (blocking).
pub struct DependenciesMetGuard;

#[async_trait]
impl StateGuard for DependenciesMetGuard {
    async fn check(&self, item: &ProductionItem, ctx: &GuardContext<'_>) -> GuardResult<bool> {
        let dependencies = ctx.dependencies.dependencies_of(item.station_id).await?;
        if dependencies.is_empty() {
            return Ok(true);
        }

        let siblings = ctx.items.list_items_by_logical_key(&item.logical_key()).await?;
        let statuses = sibling_status_map(&siblings);

        if eligibility(&dependencies, &statuses) == ItemStatus::Queued {
            return Ok(true);
        }

        let unmet: Vec<String> = dependencies
            .iter()
            .filter(|dep| {
                statuses
                    .get(*dep)
                    .map_or(true, |status| !status.satisfies_dependencies())
            })
            .map(|dep| dep.to_string())
            .collect();

        Err(dependencies_not_met(format!(
            "item {} at station {} is waiting on station(s) {}",
            item.id,
            item.station_id,
            unmet.join(", ")
        )))
    }

    fn description(&self) -> &'static str {
        "All upstream station dependencies must be done"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_description() {
        assert_eq!(
            DependenciesMetGuard.description(),
            "All upstream station dependencies must be done"
        );
    }
}
