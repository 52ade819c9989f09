//! Journey lifecycle state machine.
//!
//! ```text
//! NONE ──start──▶ ACTIVE ◀──toggle_pause──▶ PAUSED
//!                   │                          │
//!                   └──────────end─────────────┴──▶ COMPLETED (history)
//! ```
//!
//! Every transition takes the ledger by value and returns the next ledger
//! together with whatever the caller needs to report. A refused transition
//! returns an error instead, and the repository then persists nothing.
//!
//! Pause accounting keeps a single cumulative `total_paused_ms` plus the start
//! of the currently open pause. Per-interval pause history is not kept.

use chrono::{DateTime, Utc};
use shared::{
    AmountInput, BudgetBucket, Expense, ExpenseCategory, Journey, JourneyStatus, Platform,
    Settlement,
};
use std::collections::BTreeMap;

use super::errors::{LedgerError, LedgerResult};
use super::models::{generate_id, LedgerState};
use super::settlement;

/// What ending a journey produced
#[derive(Debug, Clone, PartialEq)]
pub struct EndOutcome {
    pub journey: Journey,
    pub settlement: Settlement,
    pub buckets: Vec<BudgetBucket>,
    /// False when net was zero or negative and no bucket changed
    pub distributed: bool,
}

/// Start a new journey at `start_km`
pub fn start(
    mut state: LedgerState,
    start_km: f64,
    now: DateTime<Utc>,
) -> LedgerResult<(LedgerState, Journey)> {
    if state.active_journey.is_some() {
        return Err(LedgerError::JourneyAlreadyActive);
    }

    let journey = Journey {
        id: generate_id("journey"),
        start_time: now,
        start_km,
        end_time: None,
        end_km: None,
        rides: Vec::new(),
        expenses: Vec::new(),
        status: JourneyStatus::Active,
        is_paused: false,
        total_paused_ms: 0,
        paused_at: None,
        settlement: None,
    };

    state.active_journey = Some(journey.clone());
    state.current_km = start_km;
    Ok((state, journey))
}

/// Close the open pause interval, if any, folding it into `total_paused_ms`
fn close_pause(journey: &mut Journey, now: DateTime<Utc>) {
    if let Some(paused_at) = journey.paused_at.take() {
        let interval = (now - paused_at).num_milliseconds().max(0);
        journey.total_paused_ms += interval;
    }
    journey.is_paused = false;
}

/// Pause a running journey or resume a paused one
pub fn toggle_pause(
    mut state: LedgerState,
    now: DateTime<Utc>,
) -> LedgerResult<(LedgerState, Journey)> {
    let journey = state
        .active_journey
        .as_mut()
        .ok_or(LedgerError::NoActiveJourney)?;

    if journey.is_paused {
        close_pause(journey, now);
    } else {
        journey.is_paused = true;
        journey.paused_at = Some(now);
    }

    let journey = journey.clone();
    Ok((state, journey))
}

/// Worked time so far: `now − start − paused`, excluding an open pause
pub fn elapsed_ms(journey: &Journey, now: DateTime<Utc>) -> i64 {
    let end = journey.end_time.unwrap_or(now);
    let open_pause = match (journey.is_paused, journey.paused_at) {
        (true, Some(paused_at)) => (end - paused_at).num_milliseconds().max(0),
        _ => 0,
    };
    let total = (end - journey.start_time).num_milliseconds();
    (total - journey.total_paused_ms - open_pause).max(0)
}

/// Append an expense to the active journey
pub fn record_expense(
    mut state: LedgerState,
    category: ExpenseCategory,
    value: f64,
    now: DateTime<Utc>,
) -> LedgerResult<(LedgerState, Expense)> {
    if !(value > 0.0 && value.is_finite()) {
        return Err(LedgerError::invalid_input("Expense value must be greater than zero"));
    }

    let journey = state
        .active_journey
        .as_mut()
        .ok_or(LedgerError::NoActiveJourney)?;

    let expense = Expense {
        id: generate_id("expense"),
        category,
        value,
        timestamp: now,
    };
    journey.expenses.push(expense.clone());

    Ok((state, expense))
}

/// Drop an expense from the active journey
pub fn remove_expense(
    mut state: LedgerState,
    expense_id: &str,
) -> LedgerResult<(LedgerState, Expense)> {
    let journey = state
        .active_journey
        .as_mut()
        .ok_or(LedgerError::NoActiveJourney)?;

    let index = journey
        .expenses
        .iter()
        .position(|e| e.id == expense_id)
        .ok_or_else(|| LedgerError::not_found("Expense", expense_id))?;
    let removed = journey.expenses.remove(index);

    Ok((state, removed))
}

/// End the active journey, settle it and distribute positive net into buckets
///
/// `expenses` replaces the accumulated list when given; `None` keeps what was
/// recorded during the shift.
pub fn end(
    mut state: LedgerState,
    final_km: f64,
    platform_totals: &BTreeMap<Platform, AmountInput>,
    expenses: Option<Vec<Expense>>,
    now: DateTime<Utc>,
) -> LedgerResult<(LedgerState, EndOutcome)> {
    let mut journey = state
        .active_journey
        .take()
        .ok_or(LedgerError::NoActiveJourney)?;

    if let Some(bad) = expenses
        .iter()
        .flatten()
        .find(|e| !(e.value > 0.0 && e.value.is_finite()))
    {
        return Err(LedgerError::invalid_input(format!(
            "Expense {} must have a value greater than zero",
            bad.id
        )));
    }

    close_pause(&mut journey, now);

    let rides = settlement::rides_from_platform_totals(platform_totals, now);
    let final_expenses = expenses.unwrap_or_else(|| std::mem::take(&mut journey.expenses));
    let km_travelled = settlement::km_travelled(journey.start_km, final_km);
    let settled = settlement::settle(&rides, &final_expenses, km_travelled, state.config.cost_per_km);
    let end_km = final_km.max(journey.start_km);

    journey.end_time = Some(now);
    journey.end_km = Some(end_km);
    journey.rides = rides;
    journey.expenses = final_expenses;
    journey.status = JourneyStatus::Completed;
    journey.settlement = Some(settled.clone());

    let distributed = settled.net > 0.0;
    state.buckets = settlement::distribute(std::mem::take(&mut state.buckets), settled.net);
    state.history.retain(|j| j.id != journey.id);
    state.history.push(journey.clone());
    state.current_km = end_km;

    let outcome = EndOutcome {
        journey,
        settlement: settled,
        buckets: state.buckets.clone(),
        distributed,
    };
    Ok((state, outcome))
}

/// Manually correct the current odometer; refused while a journey is running
pub fn set_odometer(mut state: LedgerState, km: f64) -> LedgerResult<(LedgerState, f64)> {
    if state.active_journey.is_some() {
        return Err(LedgerError::OdometerLocked);
    }
    state.current_km = km;
    Ok((state, km))
}

/// Remove a completed journey from history. Buckets are left as they are.
pub fn delete_history_entry(
    mut state: LedgerState,
    journey_id: &str,
) -> LedgerResult<(LedgerState, Journey)> {
    let index = state
        .history
        .iter()
        .position(|j| j.id == journey_id)
        .ok_or_else(|| LedgerError::not_found("Journey", journey_id))?;
    let removed = state.history.remove(index);
    Ok((state, removed))
}
