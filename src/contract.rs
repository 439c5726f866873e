//! Electricity contract variants.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CalcError, Result};

/// Quantiles of the price distribution used as arbitrage charge/discharge levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArbitrageThresholds {
    /// Charge below this quantile (default 0.2).
    pub low_quantile: f64,
    /// Discharge above this quantile (default 0.8).
    pub high_quantile: f64,
}

impl Default for ArbitrageThresholds {
    fn default() -> Self {
        Self {
            low_quantile: 0.2,
            high_quantile: 0.8,
        }
    }
}

/// Fixed-price ("vast") contract parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedTariff {
    /// All-in price per imported kWh (€).
    pub price_per_kwh: f64,
}

/// Hour-granular ("dynamisch") contract parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicTariff {
    /// Supplier markup plus taxes added to every spot price (€/kWh).
    #[serde(default)]
    pub markup_per_kwh: f64,
    #[serde(default)]
    pub arbitrage: ArbitrageThresholds,
}

/// Contract type discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractKind {
    #[serde(rename = "vast")]
    Fixed,
    #[serde(rename = "dynamisch")]
    Dynamic,
}

impl fmt::Display for ContractKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fixed => "vast",
            Self::Dynamic => "dynamisch",
        })
    }
}

/// An electricity contract; each variant carries only its own parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Contract {
    #[serde(rename = "vast")]
    Fixed(FixedTariff),
    #[serde(rename = "dynamisch")]
    Dynamic(DynamicTariff),
}

impl Contract {
    pub fn kind(&self) -> ContractKind {
        match self {
            Self::Fixed(_) => ContractKind::Fixed,
            Self::Dynamic(_) => ContractKind::Dynamic,
        }
    }

    /// Checks the variant's parameters.
    ///
    /// # Errors
    ///
    /// [`CalcError::InvalidInput`] for a negative or non-finite fixed price
    /// or markup, [`CalcError::Range`] for quantiles outside [0, 1] or out
    /// of order.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Fixed(t) => {
                if !(t.price_per_kwh.is_finite() && t.price_per_kwh >= 0.0) {
                    return Err(CalcError::invalid(
                        "price_per_kwh",
                        "must be a non-negative number",
                    ));
                }
            }
            Self::Dynamic(t) => {
                if !t.markup_per_kwh.is_finite() {
                    return Err(CalcError::invalid("markup_per_kwh", "must be a number"));
                }
                let q = t.arbitrage;
                if !(0.0..=1.0).contains(&q.low_quantile) {
                    return Err(CalcError::range("low_quantile", 0.0, 1.0, q.low_quantile));
                }
                if !(q.low_quantile..=1.0).contains(&q.high_quantile) {
                    return Err(CalcError::range(
                        "high_quantile",
                        q.low_quantile,
                        1.0,
                        q.high_quantile,
                    ));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        let fixed = Contract::Fixed(FixedTariff {
            price_per_kwh: 0.28,
        });
        assert_eq!(fixed.kind(), ContractKind::Fixed);
        assert_eq!(fixed.kind().to_string(), "vast");
    }

    #[test]
    fn default_thresholds_are_p20_p80() {
        let q = ArbitrageThresholds::default();
        assert_eq!(q.low_quantile, 0.2);
        assert_eq!(q.high_quantile, 0.8);
    }

    #[test]
    fn validate_rejects_inverted_quantiles() {
        let c = Contract::Dynamic(DynamicTariff {
            markup_per_kwh: 0.15,
            arbitrage: ArbitrageThresholds {
                low_quantile: 0.7,
                high_quantile: 0.3,
            },
        });
        assert!(matches!(c.validate(), Err(CalcError::Range { .. })));
    }

    #[test]
    fn validate_rejects_negative_fixed_price() {
        let c = Contract::Fixed(FixedTariff {
            price_per_kwh: -0.1,
        });
        assert!(matches!(c.validate(), Err(CalcError::InvalidInput { .. })));
    }
}
