//! # Domain Module
//!
//! Contains all business logic for the ride ledger.
//!
//! ## Module Organization
//!
//! - **lifecycle**: the journey state machine as pure transitions over
//!   [`LedgerState`](models::LedgerState)
//! - **settlement**: net profit and bucket distribution arithmetic
//! - **aggregation**: daily / weekly / monthly / yearly rollups
//! - **journey_service**, **budget_service**, **maintenance_service**,
//!   **profile_service**, **export_service**: persistence-backed services used
//!   by the REST layer
//! - **insight_service**: best-effort narrative summaries from an external
//!   text model
//!
//! ## Core Concepts
//!
//! - **Journey**: one driving shift from odometer start to odometer end
//! - **Ride**: one platform's aggregated gross for a journey
//! - **Bucket**: savings target fed by a fixed share of positive net profit
//! - **Net**: gross minus expenses minus distance depreciation
//!
//! ## Business Rules
//!
//! - Only one journey can be active at a time
//! - Invalid input and illegal transitions change nothing
//! - Losses are never clawed back from buckets
//! - Nothing here is fatal; unreadable stored data falls back to defaults

pub mod aggregation;
pub mod budget_service;
pub mod errors;
pub mod export_service;
pub mod insight_service;
pub mod journey_service;
pub mod lifecycle;
pub mod maintenance_service;
pub mod models;
pub mod profile_service;
pub mod settlement;
pub mod validation;

pub use aggregation::SummaryService;
pub use budget_service::BudgetService;
pub use errors::{LedgerError, LedgerResult};
pub use export_service::ExportService;
pub use insight_service::{InsightProvider, InsightService};
pub use journey_service::JourneyService;
pub use maintenance_service::MaintenanceService;
pub use profile_service::ProfileService;
