pub mod alert;
pub mod analyzers;
pub mod classify;
pub mod config;
pub mod dedupe;
pub mod fetch;
pub mod infra;
pub mod output;
pub mod services;
