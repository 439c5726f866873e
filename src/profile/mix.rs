//! Split of an annual consumption total into base and heating components.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CalcError, Result};

/// NIBUD reference base consumption (kWh/year) for households of 1-5 persons.
pub const NIBUD_BASE_KWH: [f64; 5] = [1600.0, 2450.0, 2900.0, 3300.0, 3600.0];

/// Minimum heating share for the NIBUD split to be accepted.
pub const MIN_HEATING_SHARE: f64 = 0.10;

/// Accepted construction years.
const BUILD_YEAR_RANGE: (i32, i32) = (1800, 2100);

/// How the space heating of a household is powered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeatingType {
    /// Gas boiler; electricity covers only the base load.
    Gas,
    /// Hybrid heat pump next to a boiler.
    Hybrid,
    /// Heat pump or other fully electric heating.
    AllElectric,
}

/// Heuristic that produced an [`EnergyMix`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MixMethod {
    /// Base taken from the NIBUD household-size table.
    Nibud,
    /// Heating share derived from the building's insulation era.
    BuildYear,
    /// Gas-heated home; all electricity is base load.
    NoElectricHeating,
}

impl fmt::Display for MixMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Nibud => "nibud",
            Self::BuildYear => "buildYear",
            Self::NoElectricHeating => "noElectricHeating",
        })
    }
}

/// Annual kWh split into base and heating components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyMix {
    pub base_kwh: f64,
    pub heating_kwh: f64,
    pub method: MixMethod,
}

impl EnergyMix {
    /// Sum of both components.
    pub fn total_kwh(&self) -> f64 {
        self.base_kwh + self.heating_kwh
    }
}

/// Caller-supplied household description.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseholdProfile {
    pub annual_kwh: f64,
    pub heating_type: HeatingType,
    pub build_year: i32,
    #[serde(default)]
    pub persons: Option<u32>,
}

impl HouseholdProfile {
    /// Splits this household's consumption according to its heating type.
    ///
    /// # Errors
    ///
    /// Same as [`mix`].
    pub fn energy_mix(&self) -> Result<EnergyMix> {
        match self.heating_type {
            HeatingType::Gas => {
                validate_total(self.annual_kwh)?;
                Ok(EnergyMix {
                    base_kwh: self.annual_kwh,
                    heating_kwh: 0.0,
                    method: MixMethod::NoElectricHeating,
                })
            }
            HeatingType::Hybrid | HeatingType::AllElectric => {
                mix(self.annual_kwh, self.build_year, self.persons)
            }
        }
    }
}

/// Heating share of total consumption by construction year.
pub fn heating_share(build_year: i32) -> f64 {
    match build_year {
        ..=1991 => 0.70,
        1992..=2005 => 0.60,
        2006..=2016 => 0.50,
        _ => 0.40,
    }
}

/// Splits `total_kwh` into base and heating consumption.
///
/// With `persons` in 1..=5 the base comes from [`NIBUD_BASE_KWH`] and the
/// remainder is heating, provided the heating share exceeds
/// [`MIN_HEATING_SHARE`]. Otherwise the split falls back to
/// [`heating_share`] of `build_year`.
///
/// # Errors
///
/// [`CalcError::InvalidInput`] for a non-positive total and
/// [`CalcError::Range`] for an implausible build year.
pub fn mix(total_kwh: f64, build_year: i32, persons: Option<u32>) -> Result<EnergyMix> {
    validate_total(total_kwh)?;
    let (min_year, max_year) = BUILD_YEAR_RANGE;
    if !(min_year..=max_year).contains(&build_year) {
        return Err(CalcError::range(
            "build_year",
            f64::from(min_year),
            f64::from(max_year),
            f64::from(build_year),
        ));
    }

    if let Some(base_kwh) = persons.and_then(nibud_base_kwh) {
        let heating_kwh = total_kwh - base_kwh;
        if heating_kwh > 0.0 && heating_kwh / total_kwh > MIN_HEATING_SHARE {
            return Ok(EnergyMix {
                base_kwh,
                heating_kwh,
                method: MixMethod::Nibud,
            });
        }
        debug!(
            total_kwh,
            base_kwh, "NIBUD base leaves too little heating, using build year"
        );
    }

    let share = heating_share(build_year);
    Ok(EnergyMix {
        base_kwh: total_kwh * (1.0 - share),
        heating_kwh: total_kwh * share,
        method: MixMethod::BuildYear,
    })
}

fn nibud_base_kwh(persons: u32) -> Option<f64> {
    match persons {
        1..=5 => NIBUD_BASE_KWH.get(persons as usize - 1).copied(),
        _ => None,
    }
}

fn validate_total(total_kwh: f64) -> Result<()> {
    if total_kwh.is_finite() && total_kwh > 0.0 {
        Ok(())
    } else {
        Err(CalcError::invalid("annual_kwh", "must be a positive number"))
    }
}
