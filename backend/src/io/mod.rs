//! # IO Module
//!
//! Adapter layer between HTTP clients and the domain services. Only REST is
//! implemented; handlers receive the services through Axum state and never
//! contain business rules of their own.

pub mod rest;
