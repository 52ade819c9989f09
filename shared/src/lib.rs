use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Cost per kilometer used for depreciation when nothing else is configured
pub const DEFAULT_COST_PER_KM: f64 = 0.45;

/// Maintenance progress (percent) above which an item is flagged as critical
pub const DEFAULT_MAINTENANCE_ALERT_PERCENT: f64 = 90.0;

/// Ride-hailing platform a gross value was earned on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Platform {
    Uber,
    #[serde(rename = "99")]
    NinetyNine,
    InDrive,
    /// Rides arranged directly with the passenger
    Private,
}

impl Platform {
    pub fn label(&self) -> &'static str {
        match self {
            Platform::Uber => "Uber",
            Platform::NinetyNine => "99",
            Platform::InDrive => "InDrive",
            Platform::Private => "Private",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Category of a shift expense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpenseCategory {
    Fuel,
    Food,
    Maintenance,
    Toll,
    Parking,
    Cleaning,
    Other,
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExpenseCategory::Fuel => "Fuel",
            ExpenseCategory::Food => "Food",
            ExpenseCategory::Maintenance => "Maintenance",
            ExpenseCategory::Toll => "Toll",
            ExpenseCategory::Parking => "Parking",
            ExpenseCategory::Cleaning => "Cleaning",
            ExpenseCategory::Other => "Other",
        };
        f.write_str(label)
    }
}

/// One platform's aggregated gross earnings for a journey
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ride {
    pub id: String,
    pub platform: Platform,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub category: ExpenseCategory,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JourneyStatus {
    Active,
    Completed,
}

/// Figures frozen onto a journey when it is ended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub km_travelled: f64,
    pub total_gross: f64,
    pub total_expenses: f64,
    pub depreciation: f64,
    pub net: f64,
    /// Cost per kilometer in force when the journey was settled
    pub cost_per_km: f64,
}

/// One driving shift, from odometer start to odometer end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Journey {
    pub id: String,
    pub start_time: DateTime<Utc>,
    pub start_km: f64,
    pub end_time: Option<DateTime<Utc>>,
    pub end_km: Option<f64>,
    pub rides: Vec<Ride>,
    pub expenses: Vec<Expense>,
    pub status: JourneyStatus,
    pub is_paused: bool,
    /// Sum of all closed pause intervals, in milliseconds
    pub total_paused_ms: i64,
    /// Start of the pause interval currently open, if paused
    #[serde(default)]
    pub paused_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub settlement: Option<Settlement>,
}

impl Journey {
    pub fn is_active(&self) -> bool {
        self.status == JourneyStatus::Active
    }

    pub fn total_gross(&self) -> f64 {
        self.rides.iter().map(|r| r.value).sum()
    }

    pub fn total_expenses(&self) -> f64 {
        self.expenses.iter().map(|e| e.value).sum()
    }

    /// Kilometers recorded at settlement; zero while the journey is still active
    pub fn km_travelled(&self) -> f64 {
        self.settlement
            .as_ref()
            .map(|s| s.km_travelled)
            .unwrap_or(0.0)
    }
}

/// A named savings target fed by a fixed share of each shift's positive net
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetBucket {
    pub id: String,
    pub label: String,
    /// Share of distributable net profit, in percent
    pub percentage: f64,
    pub current_amount: f64,
    pub goal_amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenancePriority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceItem {
    pub id: String,
    pub title: String,
    pub last_km: f64,
    pub next_km: f64,
    pub priority: MaintenancePriority,
}

/// Maintenance item together with its computed due progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceStatus {
    pub item: MaintenanceItem,
    pub progress_percent: f64,
    pub is_critical: bool,
    pub km_remaining: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub cost_per_km: f64,
    pub daily_net_goal: f64,
    pub maintenance_alert_percent: f64,
    pub currency_symbol: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            cost_per_km: DEFAULT_COST_PER_KM,
            daily_net_goal: 200.0,
            maintenance_alert_percent: DEFAULT_MAINTENANCE_ALERT_PERCENT,
            currency_symbol: "R$".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    pub vehicle: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Amount typed by the user, either as a JSON number or as raw form text
///
/// Form fields arrive as text ("", "12,50", "abc"); `value()` is the single
/// place where that text becomes a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(f64),
    Text(String),
    /// JSON `null`, sent for a field the user left untouched
    Blank,
}

impl AmountInput {
    /// Parsed finite amount, or `None` for blank or non-numeric input
    pub fn value(&self) -> Option<f64> {
        match self {
            AmountInput::Number(n) if n.is_finite() => Some(*n),
            AmountInput::Number(_) | AmountInput::Blank => None,
            AmountInput::Text(text) => {
                let cleaned = text.trim().replace(' ', "").replace(',', ".");
                if cleaned.is_empty() {
                    return None;
                }
                cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
            }
        }
    }
}

impl From<f64> for AmountInput {
    fn from(value: f64) -> Self {
        AmountInput::Number(value)
    }
}

impl From<&str> for AmountInput {
    fn from(value: &str) -> Self {
        AmountInput::Text(value.to_string())
    }
}

// ---------------------------------------------------------------------------
// Requests and responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartJourneyRequest {
    pub start_km: AmountInput,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddExpenseRequest {
    pub category: ExpenseCategory,
    pub value: AmountInput,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndJourneyRequest {
    pub final_km: AmountInput,
    /// Gross per platform as typed at the end of the shift
    #[serde(default)]
    pub platform_totals: BTreeMap<Platform, AmountInput>,
    /// Final expense list; when omitted the expenses accumulated during the
    /// journey are kept
    #[serde(default)]
    pub expenses: Option<Vec<Expense>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveJourneyResponse {
    pub journey: Option<Journey>,
    pub elapsed_seconds: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndJourneyResponse {
    pub journey: Journey,
    pub settlement: Settlement,
    pub buckets: Vec<BudgetBucket>,
    pub distributed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OdometerResponse {
    pub current_km: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetOdometerRequest {
    pub current_km: AmountInput,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateBucketRequest {
    pub label: Option<String>,
    pub percentage: Option<f64>,
    pub goal_amount: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceItemRequest {
    pub title: String,
    pub last_km: AmountInput,
    pub next_km: AmountInput,
    pub priority: MaintenancePriority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodGranularity {
    Day,
    Week,
    Month,
    Year,
}

/// Rollup of completed journeys that started inside one calendar period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    /// Human-readable period key: `2025-03-14`, `2025-W11`, `2025-03`, `2025`
    pub period: String,
    pub journey_count: usize,
    pub ride_count: usize,
    pub gross: f64,
    pub expenses: f64,
    /// Gross minus expenses; depreciation is not part of period rollups
    pub net: f64,
    pub worked_hours: f64,
    pub hourly_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodaySummary {
    pub gross: f64,
    pub expenses: f64,
    pub net: f64,
    pub km_travelled: f64,
    pub depreciation: f64,
    /// Net with distance depreciation subtracted
    pub real_net: f64,
    pub daily_goal: f64,
    pub goal_progress_percent: f64,
}

/// Figures handed to the insight generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JourneyMetrics {
    pub gross: f64,
    pub expenses: f64,
    pub net: f64,
    pub km_travelled: f64,
    pub worked_hours: f64,
    pub ride_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightResponse {
    pub text: String,
    /// True when the text came from the static fallback instead of the service
    pub fallback: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeRequest {
    pub theme: Theme,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastScreenRequest {
    pub screen: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferencesResponse {
    pub theme: Theme,
    pub last_screen: Option<String>,
}
