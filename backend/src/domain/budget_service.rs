//! Budget bucket service.
//!
//! Buckets only grow through settlement (see [`settlement`](super::settlement)).
//! Here they are listed, reconfigured, and reset by hand. A reset zeroes the
//! accumulated amount and never touches percentage or goal.

use log::{info, warn};
use shared::{BudgetBucket, UpdateBucketRequest};

use super::errors::{LedgerError, LedgerResult};
use super::validation::require_text;
use crate::storage::LedgerRepository;

const MAX_LABEL_LENGTH: usize = 64;

/// Zero the accumulated amount of one bucket
pub fn reset_bucket(mut buckets: Vec<BudgetBucket>, bucket_id: &str) -> LedgerResult<Vec<BudgetBucket>> {
    let bucket = buckets
        .iter_mut()
        .find(|b| b.id == bucket_id)
        .ok_or_else(|| LedgerError::not_found("Bucket", bucket_id))?;
    bucket.current_amount = 0.0;
    Ok(buckets)
}

/// Zero the accumulated amount of every bucket
pub fn reset_all(buckets: Vec<BudgetBucket>) -> Vec<BudgetBucket> {
    buckets
        .into_iter()
        .map(|bucket| BudgetBucket {
            current_amount: 0.0,
            ..bucket
        })
        .collect()
}

fn percentage_total(buckets: &[BudgetBucket]) -> f64 {
    buckets.iter().map(|b| b.percentage).sum()
}

#[derive(Clone)]
pub struct BudgetService {
    repository: LedgerRepository,
}

impl BudgetService {
    pub fn new(repository: LedgerRepository) -> Self {
        Self { repository }
    }

    pub async fn list_buckets(&self) -> Vec<BudgetBucket> {
        self.repository.load().await.buckets
    }

    /// Change label, percentage or goal of one bucket
    ///
    /// Percentages that no longer add up to 100 are accepted and logged; they
    /// only affect future settlements.
    pub async fn update_bucket(
        &self,
        bucket_id: &str,
        request: UpdateBucketRequest,
    ) -> LedgerResult<BudgetBucket> {
        let label = request
            .label
            .as_deref()
            .map(|l| require_text(l, "Bucket label", MAX_LABEL_LENGTH))
            .transpose()?;
        if let Some(percentage) = request.percentage {
            if !(0.0..=100.0).contains(&percentage) {
                return Err(LedgerError::invalid_input(
                    "Bucket percentage must be between 0 and 100",
                ));
            }
        }
        if let Some(goal) = request.goal_amount {
            if !(goal >= 0.0 && goal.is_finite()) {
                return Err(LedgerError::invalid_input("Bucket goal cannot be negative"));
            }
        }

        let (updated, total) = self
            .repository
            .transact(|mut state| {
                let bucket = state
                    .buckets
                    .iter_mut()
                    .find(|b| b.id == bucket_id)
                    .ok_or_else(|| LedgerError::not_found("Bucket", bucket_id))?;

                if let Some(label) = label {
                    bucket.label = label;
                }
                if let Some(percentage) = request.percentage {
                    bucket.percentage = percentage;
                }
                if let Some(goal) = request.goal_amount {
                    bucket.goal_amount = goal;
                }

                let updated = bucket.clone();
                let total = percentage_total(&state.buckets);
                Ok::<_, LedgerError>((state, (updated, total)))
            })
            .await?;

        if (total - 100.0).abs() > 0.01 {
            warn!("Bucket percentages now add up to {:.2}%, not 100%", total);
        }
        info!("Updated bucket {}", updated.id);
        Ok(updated)
    }

    pub async fn reset_bucket(&self, bucket_id: &str) -> LedgerResult<Vec<BudgetBucket>> {
        let buckets = self
            .repository
            .transact(|mut state| {
                state.buckets = reset_bucket(std::mem::take(&mut state.buckets), bucket_id)?;
                let buckets = state.buckets.clone();
                Ok::<_, LedgerError>((state, buckets))
            })
            .await?;

        info!("Reset bucket {}", bucket_id);
        Ok(buckets)
    }

    pub async fn reset_all(&self) -> LedgerResult<Vec<BudgetBucket>> {
        let buckets = self
            .repository
            .transact(|mut state| {
                state.buckets = reset_all(std::mem::take(&mut state.buckets));
                let buckets = state.buckets.clone();
                Ok::<_, LedgerError>((state, buckets))
            })
            .await?;

        info!("Reset all {} buckets", buckets.len());
        Ok(buckets)
    }
}
