pub mod activity;
pub mod api;
pub mod chart;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod resolver;
pub mod scanner;
pub mod search;
pub mod utils;
pub mod watchlist;

pub use error::{Error, Result};

#[cfg(test)]
pub mod tests;
