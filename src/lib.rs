//! # CRM Tenancy
//!
//! Moves a single-tenant CRM datastore onto the multi-tenant schema: entity
//! models, support-row repositories, the idempotent tenant backfill, and the
//! operator admin API that exposes it.

pub mod auth;
pub mod backfill;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod server;
pub mod telemetry;
pub use migration;
