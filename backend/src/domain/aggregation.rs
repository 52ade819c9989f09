//! Aggregation views over the journey history.
//!
//! Read-only folds that bucket completed journeys by the calendar day, ISO
//! week, month or year in which they started.
//!
//! Period rollups report `net = gross − expenses` and do **not** subtract
//! distance depreciation, unlike single-journey settlement. Only the "today"
//! view reports a depreciation-adjusted `real_net`. Both figures are kept as
//! they are so existing reports stay comparable.

use chrono::{DateTime, Datelike, Local, TimeZone};
use shared::{
    Journey, JourneyMetrics, PeriodGranularity, PeriodSummary, TodaySummary,
};
use std::collections::BTreeMap;

use super::lifecycle::elapsed_ms;
use super::models::LedgerState;
use crate::storage::LedgerRepository;

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Calendar key of the period `time` falls into
pub fn period_key<Tz: TimeZone>(time: &DateTime<Tz>, granularity: PeriodGranularity) -> String {
    let date = time.date_naive();
    match granularity {
        PeriodGranularity::Day => date.format("%Y-%m-%d").to_string(),
        PeriodGranularity::Week => {
            let week = date.iso_week();
            format!("{}-W{:02}", week.year(), week.week())
        }
        PeriodGranularity::Month => format!("{}-{:02}", date.year(), date.month()),
        PeriodGranularity::Year => format!("{}", date.year()),
    }
}

fn worked_hours(journey: &Journey) -> f64 {
    match journey.end_time {
        Some(end) => elapsed_ms(journey, end) as f64 / MS_PER_HOUR,
        None => 0.0,
    }
}

#[derive(Default)]
struct PeriodAccumulator {
    journey_count: usize,
    ride_count: usize,
    gross: f64,
    expenses: f64,
    worked_hours: f64,
}

impl PeriodAccumulator {
    fn add(&mut self, journey: &Journey) {
        self.journey_count += 1;
        self.ride_count += journey.rides.len();
        self.gross += journey.total_gross();
        self.expenses += journey.total_expenses();
        self.worked_hours += worked_hours(journey);
    }

    fn finish(self, period: String) -> PeriodSummary {
        let net = self.gross - self.expenses;
        let hourly_rate = if self.worked_hours > 0.0 {
            Some(net / self.worked_hours)
        } else {
            None
        };
        PeriodSummary {
            period,
            journey_count: self.journey_count,
            ride_count: self.ride_count,
            gross: self.gross,
            expenses: self.expenses,
            net,
            worked_hours: self.worked_hours,
            hourly_rate,
        }
    }
}

/// Roll completed journeys up by period, newest period first
pub fn rollup<Tz: TimeZone>(
    history: &[Journey],
    granularity: PeriodGranularity,
    tz: &Tz,
) -> Vec<PeriodSummary> {
    let mut periods: BTreeMap<String, PeriodAccumulator> = BTreeMap::new();

    for journey in history.iter().filter(|j| !j.is_active()) {
        let key = period_key(&journey.start_time.with_timezone(tz), granularity);
        periods.entry(key).or_default().add(journey);
    }

    periods
        .into_iter()
        .rev()
        .map(|(period, acc)| acc.finish(period))
        .collect()
}

/// Today's figures: completed journeys that started today plus the running one
pub fn today_summary<Tz: TimeZone>(state: &LedgerState, now: &DateTime<Tz>) -> TodaySummary {
    let tz = now.timezone();
    let today = now.date_naive();

    let completed_today: Vec<&Journey> = state
        .history
        .iter()
        .filter(|j| j.start_time.with_timezone(&tz).date_naive() == today)
        .collect();

    let mut gross: f64 = completed_today.iter().map(|j| j.total_gross()).sum();
    let mut expenses: f64 = completed_today.iter().map(|j| j.total_expenses()).sum();
    let mut km_travelled: f64 = completed_today.iter().map(|j| j.km_travelled()).sum();

    if let Some(active) = &state.active_journey {
        gross += active.total_gross();
        expenses += active.total_expenses();
        km_travelled += (state.current_km - active.start_km).max(0.0);
    }

    let net = gross - expenses;
    let depreciation = km_travelled * state.config.cost_per_km;
    let real_net = net - depreciation;
    let daily_goal = state.config.daily_net_goal;
    let goal_progress_percent = if daily_goal > 0.0 {
        (real_net / daily_goal * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };

    TodaySummary {
        gross,
        expenses,
        net,
        km_travelled,
        depreciation,
        real_net,
        daily_goal,
        goal_progress_percent,
    }
}

/// Metrics of one completed journey, as handed to the insight generator
pub fn journey_metrics(journey: &Journey) -> JourneyMetrics {
    let gross = journey.total_gross();
    let expenses = journey.total_expenses();
    let net = journey
        .settlement
        .as_ref()
        .map(|s| s.net)
        .unwrap_or(gross - expenses);

    JourneyMetrics {
        gross,
        expenses,
        net,
        km_travelled: journey.km_travelled(),
        worked_hours: worked_hours(journey),
        ride_count: journey.rides.len(),
    }
}

/// Read-side service exposing the rollups in the device's local calendar
#[derive(Clone)]
pub struct SummaryService {
    repository: LedgerRepository,
}

impl SummaryService {
    pub fn new(repository: LedgerRepository) -> Self {
        Self { repository }
    }

    pub async fn today(&self) -> TodaySummary {
        let state = self.repository.load().await;
        today_summary(&state, &Local::now())
    }

    pub async fn periods(&self, granularity: PeriodGranularity) -> Vec<PeriodSummary> {
        let state = self.repository.load().await;
        rollup(&state.history, granularity, &Local)
    }

    /// Today's figures reshaped as insight metrics
    pub async fn today_metrics(&self) -> JourneyMetrics {
        let state = self.repository.load().await;
        let now = Local::now();
        let summary = today_summary(&state, &now);

        let today = now.date_naive();
        let todays: Vec<&Journey> = state
            .history
            .iter()
            .filter(|j| j.start_time.with_timezone(&Local).date_naive() == today)
            .collect();
        let mut worked_ms: i64 = todays
            .iter()
            .filter_map(|j| j.end_time.map(|end| elapsed_ms(j, end)))
            .sum();
        let mut ride_count: usize = todays.iter().map(|j| j.rides.len()).sum();
        if let Some(active) = &state.active_journey {
            worked_ms += elapsed_ms(active, now.with_timezone(&chrono::Utc));
            ride_count += active.rides.len();
        }

        JourneyMetrics {
            gross: summary.gross,
            expenses: summary.expenses,
            net: summary.real_net,
            km_travelled: summary.km_travelled,
            worked_hours: worked_ms as f64 / MS_PER_HOUR,
            ride_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use shared::{Expense, ExpenseCategory, JourneyStatus, Platform, Ride, Settlement};

    fn at(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc)
    }

    fn completed(start: &str, hours: i64, gross: f64, expense: f64, km: f64) -> Journey {
        let start_time = at(start);
        let end_time = start_time + Duration::hours(hours);
        Journey {
            id: format!("journey::{}", start),
            start_time,
            start_km: 1000.0,
            end_time: Some(end_time),
            end_km: Some(1000.0 + km),
            rides: vec![Ride {
                id: "ride::1".to_string(),
                platform: Platform::Uber,
                value: gross,
                timestamp: end_time,
            }],
            expenses: vec![Expense {
                id: "expense::1".to_string(),
                category: ExpenseCategory::Fuel,
                value: expense,
                timestamp: start_time,
            }],
            status: JourneyStatus::Completed,
            is_paused: false,
            total_paused_ms: 0,
            paused_at: None,
            settlement: Some(Settlement {
                km_travelled: km,
                total_gross: gross,
                total_expenses: expense,
                depreciation: km * 0.45,
                net: gross - expense - km * 0.45,
                cost_per_km: 0.45,
            }),
        }
    }

    #[test]
    fn test_period_keys() {
        let time = at("2025-03-14T10:00:00Z");
        assert_eq!(period_key(&time, PeriodGranularity::Day), "2025-03-14");
        assert_eq!(period_key(&time, PeriodGranularity::Week), "2025-W11");
        assert_eq!(period_key(&time, PeriodGranularity::Month), "2025-03");
        assert_eq!(period_key(&time, PeriodGranularity::Year), "2025");
        // ISO week year differs from calendar year around new year
        assert_eq!(period_key(&at("2024-12-30T10:00:00Z"), PeriodGranularity::Week), "2025-W01");
    }

    #[test]
    fn test_daily_rollup_omits_depreciation() {
        let history = vec![
            completed("2025-03-14T08:00:00Z", 4, 200.0, 40.0, 100.0),
            completed("2025-03-14T15:00:00Z", 2, 100.0, 10.0, 50.0),
            completed("2025-03-15T08:00:00Z", 5, 150.0, 30.0, 80.0),
        ];

        let days = rollup(&history, PeriodGranularity::Day, &Utc);

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].period, "2025-03-15");
        assert_eq!(days[1].period, "2025-03-14");
        assert_eq!(days[1].journey_count, 2);
        assert_eq!(days[1].gross, 300.0);
        assert_eq!(days[1].expenses, 50.0);
        assert_eq!(days[1].net, 250.0);
        assert_eq!(days[1].worked_hours, 6.0);
        assert_eq!(days[1].hourly_rate, Some(250.0 / 6.0));
    }

    #[test]
    fn test_monthly_and_yearly_rollup() {
        let history = vec![
            completed("2024-12-31T08:00:00Z", 4, 100.0, 10.0, 10.0),
            completed("2025-01-02T08:00:00Z", 4, 100.0, 10.0, 10.0),
            completed("2025-01-20T08:00:00Z", 4, 100.0, 10.0, 10.0),
        ];

        let months = rollup(&history, PeriodGranularity::Month, &Utc);
        assert_eq!(
            months.iter().map(|m| m.period.as_str()).collect::<Vec<_>>(),
            vec!["2025-01", "2024-12"]
        );
        assert_eq!(months[0].journey_count, 2);

        let years = rollup(&history, PeriodGranularity::Year, &Utc);
        assert_eq!(years.len(), 2);
        assert_eq!(years[0].net, 180.0);
    }

    #[test]
    fn test_today_summary_includes_active_journey() {
        let now = at("2025-03-14T20:00:00Z");
        let mut state = LedgerState::default();
        state.history = vec![
            completed("2025-03-13T08:00:00Z", 4, 500.0, 50.0, 100.0),
            completed("2025-03-14T08:00:00Z", 4, 200.0, 40.0, 100.0),
        ];

        let mut active = completed("2025-03-14T18:00:00Z", 0, 0.0, 10.0, 0.0);
        active.rides.clear();
        active.status = JourneyStatus::Active;
        active.end_time = None;
        active.end_km = None;
        active.settlement = None;
        active.start_km = 2000.0;
        state.active_journey = Some(active);
        state.current_km = 2020.0;

        let summary = today_summary(&state, &now);

        assert_eq!(summary.gross, 200.0);
        assert_eq!(summary.expenses, 50.0);
        assert_eq!(summary.net, 150.0);
        assert_eq!(summary.km_travelled, 120.0);
        assert!((summary.depreciation - 54.0).abs() < 1e-9);
        assert!((summary.real_net - 96.0).abs() < 1e-9);
        assert!((summary.goal_progress_percent - 48.0).abs() < 1e-9);
    }

    #[test]
    fn test_journey_metrics_use_settled_net() {
        let journey = completed("2025-03-14T08:00:00Z", 5, 120.0, 50.0, 50.0);
        let metrics = journey_metrics(&journey);
        assert!((metrics.net - 47.5).abs() < 1e-9);
        assert_eq!(metrics.worked_hours, 5.0);
        assert_eq!(metrics.ride_count, 1);
    }
}
