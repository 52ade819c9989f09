use serde::{Deserialize, Serialize};
use shared::{BudgetBucket, DashboardConfig, Journey, MaintenanceItem};

/// The whole single-user ledger, owned in one place
///
/// Transitions take a state by value and hand back the next one; nothing
/// mutates shared fields behind the caller's back. Persistence rewrites each
/// field in full.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerState {
    pub active_journey: Option<Journey>,
    /// Completed journeys, oldest first
    pub history: Vec<Journey>,
    pub current_km: f64,
    pub buckets: Vec<BudgetBucket>,
    pub maintenance: Vec<MaintenanceItem>,
    pub config: DashboardConfig,
}

impl Default for LedgerState {
    fn default() -> Self {
        Self {
            active_journey: None,
            history: Vec::new(),
            current_km: 0.0,
            buckets: default_buckets(),
            maintenance: Vec::new(),
            config: DashboardConfig::default(),
        }
    }
}

/// Buckets a fresh ledger starts with; percentages add up to 100
pub fn default_buckets() -> Vec<BudgetBucket> {
    [
        ("bucket::maintenance", "Vehicle Maintenance", 25.0, 2000.0),
        ("bucket::emergency", "Emergency Fund", 20.0, 5000.0),
        ("bucket::taxes", "Taxes", 25.0, 3000.0),
        ("bucket::personal", "Personal", 30.0, 4000.0),
    ]
    .into_iter()
    .map(|(id, label, percentage, goal_amount)| BudgetBucket {
        id: id.to_string(),
        label: label.to_string(),
        percentage,
        current_amount: 0.0,
        goal_amount,
    })
    .collect()
}
