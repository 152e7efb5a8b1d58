pub mod action_plans;
pub mod clock;
pub mod dashboard;
pub mod error;
pub mod kpi;
pub mod ratio;
pub mod reports;
pub mod repos;
