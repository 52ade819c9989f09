//! Settlement calculator.
//!
//! Turns the gross typed per platform and the shift's expenses into a net
//! profit, and spreads positive net profit over the budget buckets.
//!
//! ## Rules
//!
//! - `km_travelled = max(0, final_km − start_km)`
//! - `depreciation = km_travelled × cost_per_km`
//! - `net = Σ rides − Σ expenses − depreciation`
//! - Only `net > 0` is distributed; losses are never clawed back from buckets
//! - Each bucket receives `net × percentage / 100`, with percentages read at
//!   settlement time

use chrono::{DateTime, Utc};
use log::debug;
use shared::{AmountInput, BudgetBucket, Expense, Platform, Ride, Settlement};
use std::collections::BTreeMap;

use super::models::generate_id;

/// Build one ride per platform whose typed total is a strictly positive number
///
/// Zero, blank and non-numeric entries produce no ride.
pub fn rides_from_platform_totals(
    totals: &BTreeMap<Platform, AmountInput>,
    timestamp: DateTime<Utc>,
) -> Vec<Ride> {
    totals
        .iter()
        .filter_map(|(platform, input)| {
            let value = input.value().filter(|v| *v > 0.0)?;
            Some(Ride {
                id: generate_id("ride"),
                platform: *platform,
                value,
                timestamp,
            })
        })
        .collect()
}

pub fn km_travelled(start_km: f64, final_km: f64) -> f64 {
    (final_km - start_km).max(0.0)
}

/// Compute the settlement figures for a finished shift
pub fn settle(rides: &[Ride], expenses: &[Expense], km_travelled: f64, cost_per_km: f64) -> Settlement {
    let total_gross: f64 = rides.iter().map(|r| r.value).sum();
    let total_expenses: f64 = expenses.iter().map(|e| e.value).sum();
    let depreciation = km_travelled * cost_per_km;
    let net = total_gross - total_expenses - depreciation;

    debug!(
        "Settlement: gross={:.2} expenses={:.2} km={:.1} depreciation={:.2} net={:.2}",
        total_gross, total_expenses, km_travelled, depreciation, net
    );

    Settlement {
        km_travelled,
        total_gross,
        total_expenses,
        depreciation,
        net,
        cost_per_km,
    }
}

/// Share of `net` each bucket would receive, in bucket order
pub fn bucket_shares(buckets: &[BudgetBucket], net: f64) -> Vec<f64> {
    buckets
        .iter()
        .map(|bucket| net * (bucket.percentage / 100.0))
        .collect()
}

/// Add each bucket's share of `net`; returns the buckets unchanged when `net <= 0`
pub fn distribute(buckets: Vec<BudgetBucket>, net: f64) -> Vec<BudgetBucket> {
    if net <= 0.0 {
        return buckets;
    }

    let shares = bucket_shares(&buckets, net);
    buckets
        .into_iter()
        .zip(shares)
        .map(|(bucket, share)| BudgetBucket {
            current_amount: bucket.current_amount + share,
            ..bucket
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::default_buckets;
    use shared::ExpenseCategory;

    fn expense(value: f64) -> Expense {
        Expense {
            id: generate_id("expense"),
            category: ExpenseCategory::Fuel,
            value,
            timestamp: Utc::now(),
        }
    }

    fn ride(value: f64) -> Ride {
        Ride {
            id: generate_id("ride"),
            platform: Platform::Uber,
            value,
            timestamp: Utc::now(),
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_zero_and_blank_platform_entries_produce_no_ride() {
        let mut totals = BTreeMap::new();
        totals.insert(Platform::Uber, AmountInput::from(120.0));
        totals.insert(Platform::NinetyNine, AmountInput::from(0.0));
        totals.insert(Platform::InDrive, AmountInput::from(""));
        totals.insert(Platform::Private, AmountInput::from("abc"));

        let rides = rides_from_platform_totals(&totals, Utc::now());

        assert_eq!(rides.len(), 1);
        assert_eq!(rides[0].platform, Platform::Uber);
        assert_eq!(rides[0].value, 120.0);
    }

    #[test]
    fn test_negative_platform_entry_produces_no_ride() {
        let mut totals = BTreeMap::new();
        totals.insert(Platform::Uber, AmountInput::from("-10"));
        assert!(rides_from_platform_totals(&totals, Utc::now()).is_empty());
    }

    #[test]
    fn test_km_travelled_never_negative() {
        assert_eq!(km_travelled(45750.0, 45800.0), 50.0);
        assert_eq!(km_travelled(45800.0, 45750.0), 0.0);
    }

    #[test]
    fn test_net_formula() {
        let rides = vec![ride(80.0), ride(40.25), ride(10.0)];
        let expenses = vec![expense(20.0), expense(5.5)];

        let settlement = settle(&rides, &expenses, 100.0, 0.45);

        assert_close(settlement.total_gross, 130.25);
        assert_close(settlement.total_expenses, 25.5);
        assert_close(settlement.depreciation, 45.0);
        assert_close(settlement.net, 130.25 - 25.5 - 45.0);
    }

    #[test]
    fn test_worked_example_distribution() {
        let settlement = settle(&[ride(120.0)], &[expense(50.0)], 50.0, 0.45);
        assert_close(settlement.depreciation, 22.5);
        assert_close(settlement.net, 47.5);

        let before = default_buckets();
        let after = distribute(before.clone(), settlement.net);

        let deltas: Vec<f64> = before
            .iter()
            .zip(&after)
            .map(|(b, a)| a.current_amount - b.current_amount)
            .collect();
        assert_close(deltas[0], 11.875);
        assert_close(deltas[1], 9.5);
        assert_close(deltas[2], 11.875);
        assert_close(deltas[3], 14.25);
    }

    #[test]
    fn test_distribution_adds_exactly_net() {
        let mut buckets = default_buckets();
        buckets[1].current_amount = 300.0;
        let before: f64 = buckets.iter().map(|b| b.current_amount).sum();

        let after = distribute(buckets, 73.31);

        let total: f64 = after.iter().map(|b| b.current_amount).sum();
        assert_close(total - before, 73.31);
    }

    #[test]
    fn test_non_positive_net_changes_nothing() {
        let buckets = default_buckets();
        assert_eq!(distribute(buckets.clone(), 0.0), buckets);
        assert_eq!(distribute(buckets.clone(), -12.0), buckets);
    }

    #[test]
    fn test_distribution_keeps_percentage_and_goal() {
        let buckets = default_buckets();
        let after = distribute(buckets.clone(), 100.0);
        for (b, a) in buckets.iter().zip(&after) {
            assert_eq!(b.percentage, a.percentage);
            assert_eq!(b.goal_amount, a.goal_amount);
            assert_eq!(b.id, a.id);
        }
    }
}
