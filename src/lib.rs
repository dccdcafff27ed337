pub mod chart;
pub mod config;
pub mod decoder;
pub mod error;
pub mod fetch;
pub mod infra;
pub mod output;
pub mod payload;
pub mod results;
pub mod services;
pub mod session;
pub mod share;
pub mod step;
pub mod validation;
