//! Incident dashboard backend: cached aggregates, KPIs, and action-plan lifecycle.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
