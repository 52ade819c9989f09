//! Export service domain logic for the ride ledger.
//!
//! Produces a CSV of completed journeys, one row per journey, oldest first.

use anyhow::{Context, Result};
use log::info;
use shared::Journey;

use crate::storage::LedgerRepository;

const HEADER: [&str; 11] = [
    "journey_id",
    "start_time",
    "end_time",
    "start_km",
    "end_km",
    "km_travelled",
    "rides",
    "gross",
    "expenses",
    "depreciation",
    "net",
];

/// Render journeys as CSV text
pub fn journeys_to_csv(journeys: &[Journey]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;

    for journey in journeys.iter().filter(|j| !j.is_active()) {
        let (depreciation, net) = journey
            .settlement
            .as_ref()
            .map(|s| (s.depreciation, s.net))
            .unwrap_or((0.0, journey.total_gross() - journey.total_expenses()));

        writer.write_record([
            journey.id.clone(),
            journey.start_time.to_rfc3339(),
            journey.end_time.map(|t| t.to_rfc3339()).unwrap_or_default(),
            format!("{:.1}", journey.start_km),
            journey.end_km.map(|km| format!("{:.1}", km)).unwrap_or_default(),
            format!("{:.1}", journey.km_travelled()),
            journey.rides.len().to_string(),
            format!("{:.2}", journey.total_gross()),
            format!("{:.2}", journey.total_expenses()),
            format!("{:.2}", depreciation),
            format!("{:.2}", net),
        ])?;
    }

    let bytes = writer.into_inner().context("Failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output was not valid UTF-8")
}

#[derive(Clone)]
pub struct ExportService {
    repository: LedgerRepository,
}

impl ExportService {
    pub fn new(repository: LedgerRepository) -> Self {
        Self { repository }
    }

    pub async fn export_journeys_csv(&self) -> Result<String> {
        let mut history = self.repository.load().await.history;
        history.sort_by(|a, b| a.start_time.cmp(&b.start_time));

        let csv = journeys_to_csv(&history)?;
        info!("Exported {} journeys as CSV", history.len());
        Ok(csv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::lifecycle;
    use crate::domain::models::LedgerState;
    use chrono::Utc;
    use shared::{AmountInput, Platform};
    use std::collections::BTreeMap;

    #[test]
    fn test_csv_has_header_and_one_row_per_completed_journey() {
        let (state, _) = lifecycle::start(LedgerState::default(), 45750.0, Utc::now()).unwrap();
        let mut totals = BTreeMap::new();
        totals.insert(Platform::Uber, AmountInput::from(120.0));
        let (state, _) = lifecycle::end(state, 45800.0, &totals, None, Utc::now()).unwrap();
        let (state, _) = lifecycle::start(state, 45800.0, Utc::now()).unwrap();

        let mut journeys = state.history.clone();
        journeys.extend(state.active_journey.clone());

        let csv = journeys_to_csv(&journeys).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("journey_id,start_time"));
        assert!(lines[1].ends_with(",45750.0,45800.0,50.0,1,120.00,0.00,22.50,97.50"));
    }

    #[test]
    fn test_empty_history_exports_header_only() {
        let csv = journeys_to_csv(&[]).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }
}
