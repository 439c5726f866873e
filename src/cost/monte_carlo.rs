//! Block-bootstrap Monte Carlo over the hourly cost sequence.
//!
//! Contiguous blocks of whole days are resampled with replacement so that
//! the diurnal and weekly shape of prices survives inside each block.

use std::fmt;

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CalcError, Result, ensure_finite};
use crate::prices::percentile;

/// Upper bound on trials per run.
pub const MAX_ITERATIONS: usize = 1_000_000;
/// Upper bound on block length in days.
pub const MAX_BLOCK_DAYS: usize = 366;

/// Monte Carlo run parameters. The seed makes runs reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MonteCarloOptions {
    pub iterations: usize,
    pub block_days: usize,
    pub seed: u64,
}

impl Default for MonteCarloOptions {
    fn default() -> Self {
        Self {
            iterations: 1000,
            block_days: 7,
            seed: 42,
        }
    }
}

impl MonteCarloOptions {
    /// # Errors
    ///
    /// [`CalcError::Range`] when iterations or block length fall outside
    /// `1..=MAX_ITERATIONS` / `1..=MAX_BLOCK_DAYS`.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_ITERATIONS).contains(&self.iterations) {
            return Err(CalcError::range(
                "mc_iterations",
                1.0,
                MAX_ITERATIONS as f64,
                self.iterations as f64,
            ));
        }
        if !(1..=MAX_BLOCK_DAYS).contains(&self.block_days) {
            return Err(CalcError::range(
                "mc_block_days",
                1.0,
                MAX_BLOCK_DAYS as f64,
                self.block_days as f64,
            ));
        }
        Ok(())
    }
}

/// Distribution of simulated annual costs (€).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskDistribution {
    pub median: f64,
    #[serde(rename = "P10")]
    pub p10: f64,
    #[serde(rename = "P90")]
    pub p90: f64,
    pub mean: f64,
    /// Population standard deviation.
    pub std: f64,
    pub iterations: usize,
    pub block_days: usize,
    /// Number of blocks the cost sequence was cut into.
    pub blocks: usize,
}

/// Resamples `hourly_costs` in blocks of `block_days * 24` hours.
///
/// Each trial draws as many blocks as the sequence holds, independently
/// and with replacement, and adds `fixed_costs`. Percentiles are read at
/// index `floor(n * p)` of the sorted trial totals.
///
/// # Errors
///
/// [`CalcError::Range`] for invalid options, [`CalcError::Calculation`]
/// for an empty sequence or a non-finite statistic.
pub fn block_bootstrap(
    hourly_costs: &[f64],
    fixed_costs: f64,
    options: &MonteCarloOptions,
) -> Result<RiskDistribution> {
    options.validate()?;
    if hourly_costs.is_empty() {
        return Err(CalcError::Calculation(
            crate::error::NO_VALID_PRICE_DATA.to_string(),
        ));
    }

    let block_len = options.block_days * 24;
    let block_sums: Vec<f64> = hourly_costs
        .chunks(block_len)
        .map(|block| block.iter().sum())
        .collect();
    let n_blocks = block_sums.len();

    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut totals = Vec::with_capacity(options.iterations);
    for _ in 0..options.iterations {
        let mut total = fixed_costs;
        for _ in 0..n_blocks {
            total += block_sums[rng.random_range(0..n_blocks)];
        }
        totals.push(total);
    }
    totals.sort_by(f64::total_cmp);

    let n = totals.len() as f64;
    let mean = totals.iter().sum::<f64>() / n;
    let variance = totals.iter().map(|t| (t - mean).powi(2)).sum::<f64>() / n;

    let at = |p: f64| percentile(&totals, p).unwrap_or(f64::NAN);
    let dist = RiskDistribution {
        median: ensure_finite("median", at(0.5))?,
        p10: ensure_finite("P10", at(0.1))?,
        p90: ensure_finite("P90", at(0.9))?,
        mean: ensure_finite("mean", mean)?,
        std: ensure_finite("std", variance.sqrt())?,
        iterations: options.iterations,
        block_days: options.block_days,
        blocks: n_blocks,
    };
    debug!(
        iterations = dist.iterations,
        blocks = dist.blocks,
        median = dist.median,
        "monte carlo run finished"
    );
    Ok(dist)
}

impl fmt::Display for RiskDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Monte Carlo:           {} trials, {} blocks of {} day(s)",
            self.iterations, self.blocks, self.block_days
        )?;
        writeln!(f, "P10 (optimistic):      EUR {:.2}", self.p10)?;
        writeln!(f, "Median:                EUR {:.2}", self.median)?;
        writeln!(f, "P90 (pessimistic):     EUR {:.2}", self.p90)?;
        write!(
            f,
            "Mean +/- std:          EUR {:.2} +/- {:.2}",
            self.mean, self.std
        )
    }
}
