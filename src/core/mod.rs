pub mod alerts;
pub mod breath;
pub mod config;
pub mod coordinator;
pub mod fetch;
pub mod model;
pub mod snapshot;
