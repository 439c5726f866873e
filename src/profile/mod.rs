//! Disaggregation of annual consumption into an hourly profile.

pub mod disaggregate;
/// Base/heating split heuristics.
pub mod mix;
/// Reference daily shapes and monthly intensities.
pub mod shapes;

pub use disaggregate::{ConsumptionProfile, HourFraction, days_in_month};
pub use mix::{EnergyMix, HeatingType, HouseholdProfile, MixMethod, heating_share, mix};
