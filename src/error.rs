//! Error taxonomy shared by every calculation component.

use thiserror::Error;

/// Message raised when a cost computation has no price hours to work with.
pub const NO_VALID_PRICE_DATA: &str = "Geen geldige prijsdata gevonden in CSV";

/// Errors produced by the calculation core.
///
/// Every variant except [`CalcError::Calculation`] is caused by caller input
/// and can be fixed by resubmitting corrected data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    /// A caller-supplied value is outside its domain.
    #[error("invalid input for `{field}`: {message}")]
    InvalidInput {
        /// Name of the offending field.
        field: String,
        /// Constraint that was violated.
        message: String,
    },
    /// The price source lacks the required columns.
    #[error("price data error: {0}")]
    CsvData(String),
    /// A required field was not supplied.
    #[error("missing required field `{field}`")]
    MissingData {
        /// Name of the absent field.
        field: String,
    },
    /// A numeric field lies outside its documented range.
    #[error("`{field}` = {value} is outside the accepted range [{min}, {max}]")]
    Range {
        /// Name of the offending field.
        field: String,
        /// Inclusive lower bound.
        min: f64,
        /// Inclusive upper bound.
        max: f64,
        /// Supplied value.
        value: f64,
    },
    /// An internal computation failed or produced a non-finite value.
    #[error("{0}")]
    Calculation(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CalcError>;

impl CalcError {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn missing(field: &str) -> Self {
        Self::MissingData {
            field: field.to_string(),
        }
    }

    pub(crate) fn range(field: &str, min: f64, max: f64, value: f64) -> Self {
        Self::Range {
            field: field.to_string(),
            min,
            max,
            value,
        }
    }

    /// Stable machine-readable name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "invalid_input",
            Self::CsvData(_) => "csv_data",
            Self::MissingData { .. } => "missing_data",
            Self::Range { .. } => "range",
            Self::Calculation(_) => "calculation",
        }
    }

    /// Returns `false` only for internal calculation failures.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Calculation(_))
    }

    /// Localized message suitable for showing to an end user.
    ///
    /// Calculation failures never leak internal details.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidInput { field, message } => {
                format!("De waarde voor '{field}' is ongeldig: {message}.")
            }
            Self::CsvData(_) => {
                "Het prijsbestand bevat geen herkenbare tijd- en prijskolommen.".to_string()
            }
            Self::MissingData { field } => format!("Het verplichte veld '{field}' ontbreekt."),
            Self::Range {
                field, min, max, ..
            } => format!("De waarde voor '{field}' moet tussen {min} en {max} liggen."),
            Self::Calculation(_) => {
                "Er ging iets mis bij de berekening. Probeer het later opnieuw.".to_string()
            }
        }
    }

    /// Suggested recovery action for the end user.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "Pas de ingevulde waarde aan en probeer het opnieuw.",
            Self::CsvData(_) => "Kies een ander prijsbestand of gebruik de standaardtarieven.",
            Self::MissingData { .. } => "Controleer of alle verplichte velden zijn ingevuld.",
            Self::Range { .. } => "Kies een waarde binnen het toegestane bereik.",
            Self::Calculation(_) => "Probeer het later opnieuw.",
        }
    }
}

/// Fails with [`CalcError::Calculation`] when `value` is NaN or infinite.
pub(crate) fn ensure_finite(label: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::Calculation(format!(
            "{label} is not a finite number ({value})"
        )))
    }
}
