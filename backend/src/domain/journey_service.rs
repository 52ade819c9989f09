//! Journey service domain logic for the ride ledger.
//!
//! Wraps the pure transitions in [`lifecycle`](super::lifecycle) with input
//! parsing, persistence and logging. Each mutating call is one
//! load → transition → save cycle; a refused call writes nothing.
//!
//! ## Business Rules
//!
//! - At most one active journey
//! - Expenses only while a journey is active, always strictly positive
//! - Ending settles the journey and feeds positive net into the buckets
//! - The odometer follows journey start/end and can only be corrected by hand
//!   when no journey is running

use chrono::Utc;
use log::{info, warn};
use shared::{
    ActiveJourneyResponse, AddExpenseRequest, EndJourneyRequest, EndJourneyResponse, Expense,
    Journey, OdometerResponse, SetOdometerRequest, StartJourneyRequest,
};

use super::errors::{LedgerError, LedgerResult};
use super::lifecycle;
use super::validation::{parse_non_negative, parse_positive};
use crate::storage::LedgerRepository;

#[derive(Clone)]
pub struct JourneyService {
    repository: LedgerRepository,
}

impl JourneyService {
    pub fn new(repository: LedgerRepository) -> Self {
        Self { repository }
    }

    /// Start a new shift at the given odometer reading
    pub async fn start_journey(&self, request: StartJourneyRequest) -> LedgerResult<Journey> {
        let start_km = parse_non_negative(&request.start_km, "Start odometer")?;
        let now = Utc::now();

        let journey = self
            .repository
            .transact(|state| {
                if state.active_journey.is_none() && start_km < state.current_km {
                    warn!(
                        "Start odometer {:.1} is below the last known reading {:.1}",
                        start_km, state.current_km
                    );
                }
                lifecycle::start(state, start_km, now)
            })
            .await?;

        info!("Started journey {} at {:.1} km", journey.id, journey.start_km);
        Ok(journey)
    }

    /// Pause the running journey, or resume it when already paused
    pub async fn toggle_pause(&self) -> LedgerResult<Journey> {
        let now = Utc::now();
        let journey = self
            .repository
            .transact(|state| lifecycle::toggle_pause(state, now))
            .await?;

        info!(
            "Journey {} {}",
            journey.id,
            if journey.is_paused { "paused" } else { "resumed" }
        );
        Ok(journey)
    }

    pub async fn add_expense(&self, request: AddExpenseRequest) -> LedgerResult<Expense> {
        let value = parse_positive(&request.value, "Expense value")?;
        let now = Utc::now();

        let expense = self
            .repository
            .transact(|state| lifecycle::record_expense(state, request.category, value, now))
            .await?;

        info!("Recorded {} expense of {:.2}", expense.category, expense.value);
        Ok(expense)
    }

    pub async fn remove_expense(&self, expense_id: &str) -> LedgerResult<Expense> {
        let removed = self
            .repository
            .transact(|state| lifecycle::remove_expense(state, expense_id))
            .await?;

        info!("Removed expense {}", removed.id);
        Ok(removed)
    }

    /// End the running journey and distribute its net profit
    pub async fn end_journey(&self, request: EndJourneyRequest) -> LedgerResult<EndJourneyResponse> {
        let final_km = parse_non_negative(&request.final_km, "Final odometer")?;
        let now = Utc::now();

        let outcome = self
            .repository
            .transact(|state| {
                lifecycle::end(state, final_km, &request.platform_totals, request.expenses, now)
            })
            .await?;

        info!(
            "Ended journey {}: {} rides, net {:.2}{}",
            outcome.journey.id,
            outcome.journey.rides.len(),
            outcome.settlement.net,
            if outcome.distributed { "" } else { " (nothing distributed)" }
        );

        Ok(EndJourneyResponse {
            journey: outcome.journey,
            settlement: outcome.settlement,
            buckets: outcome.buckets,
            distributed: outcome.distributed,
        })
    }

    /// The running journey, if any, with its worked time so far
    pub async fn get_active(&self) -> ActiveJourneyResponse {
        let state = self.repository.load().await;
        let now = Utc::now();

        let elapsed_seconds = state
            .active_journey
            .as_ref()
            .map(|j| lifecycle::elapsed_ms(j, now) / 1000);

        ActiveJourneyResponse {
            journey: state.active_journey,
            elapsed_seconds,
        }
    }

    /// Completed journeys, newest first
    pub async fn history(&self) -> Vec<Journey> {
        let mut history = self.repository.load().await.history;
        history.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        history
    }

    pub async fn get_journey(&self, journey_id: &str) -> LedgerResult<Journey> {
        self.repository
            .load()
            .await
            .history
            .into_iter()
            .find(|j| j.id == journey_id)
            .ok_or_else(|| LedgerError::not_found("Journey", journey_id))
    }

    pub async fn delete_history_entry(&self, journey_id: &str) -> LedgerResult<Journey> {
        let removed = self
            .repository
            .transact(|state| lifecycle::delete_history_entry(state, journey_id))
            .await?;

        info!("Deleted journey {} from history", removed.id);
        Ok(removed)
    }

    pub async fn get_odometer(&self) -> OdometerResponse {
        OdometerResponse {
            current_km: self.repository.load().await.current_km,
        }
    }

    pub async fn set_odometer(&self, request: SetOdometerRequest) -> LedgerResult<OdometerResponse> {
        let km = parse_non_negative(&request.current_km, "Odometer")?;
        let current_km = self
            .repository
            .transact(|state| lifecycle::set_odometer(state, km))
            .await?;

        info!("Odometer set to {:.1} km", current_km);
        Ok(OdometerResponse { current_km })
    }
}
