//! Fixed versus dynamic electricity contracts and home battery payback.
//!
//! Hourly spot prices and a household description go in; annual costs,
//! Monte Carlo risk bands and 15-year battery cash flows come out.

#[cfg(feature = "api")]
pub mod api;
pub mod battery;
pub mod cli;
pub mod config;
pub mod contract;
/// Annual cost, risk distribution and contract comparison.
pub mod cost;
pub mod error;
pub mod io;
pub mod logging;
pub mod prices;
/// Household energy mix and hourly consumption profile.
pub mod profile;
pub mod runner;

pub use error::{CalcError, Result};
