//! Run parameters and the validator that turns a raw parameter document into them.
//!
//! The wire document is permissive about number encoding because browser forms
//! post their values as strings. Everything past [`ParameterDocument::validate`]
//! works on the strongly typed [`Parameters`].

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::instrument;

const DEFAULT_POPULATION: i64 = 150;
const DEFAULT_GENERATIONS: i64 = 300;
const DEFAULT_MUTATION: f64 = 0.03;
const DEFAULT_STAFF: i64 = 10;
const DEFAULT_DAYS: i64 = 30;

/// A number as it arrives on the wire: either a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl From<i64> for Numeric {
    fn from(value: i64) -> Self {
        Numeric::Integer(value)
    }
}

impl From<f64> for Numeric {
    fn from(value: f64) -> Self {
        Numeric::Float(value)
    }
}

impl From<&str> for Numeric {
    fn from(value: &str) -> Self {
        Numeric::Text(value.to_string())
    }
}

impl Numeric {
    fn as_integer(&self, field: &str) -> Result<i64, ValidationError> {
        match self {
            Numeric::Integer(value) => Ok(*value),
            Numeric::Float(value) if value.fract() == 0.0 && value.is_finite() => Ok(*value as i64),
            Numeric::Text(text) => text
                .trim()
                .parse::<i64>()
                .map_err(|_| ValidationError::not_a_number(field, text)),
            Numeric::Float(value) => Err(ValidationError::not_a_number(field, value)),
        }
    }

    fn as_float(&self, field: &str) -> Result<f64, ValidationError> {
        let value = match self {
            Numeric::Integer(value) => *value as f64,
            Numeric::Float(value) => *value,
            Numeric::Text(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| ValidationError::not_a_number(field, text))?,
        };

        if !value.is_finite() {
            return Err(ValidationError::not_a_number(field, value));
        }

        Ok(value)
    }
}

/// One preference entry of the wire document. Indices are 0-based.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferenceDocument {
    pub enfermera: Numeric,
    #[serde(default)]
    pub dias: Vec<Numeric>,
    #[serde(rename = "esEspecialista", default)]
    pub es_especialista: bool,
}

/// The raw parameter document submitted by a client to start a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParameterDocument {
    pub poblacion: Option<Numeric>,
    pub generaciones: Option<Numeric>,
    pub mutacion: Option<Numeric>,
    pub enfermeras: Option<Numeric>,
    pub dias: Option<Numeric>,
    #[serde(default)]
    pub preferencias: Vec<PreferenceDocument>,
    /// Seed for reproducible runs.
    pub semilla: Option<Numeric>,
}

/// Upper bounds applied on top of the structural minimums.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationLimits {
    pub max_population: usize,
    pub max_generations: usize,
    pub max_staff: usize,
    pub max_days: usize,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            max_population: 5_000,
            max_generations: 100_000,
            max_staff: 500,
            max_days: 366,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("NotANumber: field `{field}` must be numeric, got `{value}`")]
    NotANumber { field: String, value: String },
    #[error("OutOfRange: field `{field}` must be within [{min}, {max}], got {value}")]
    OutOfRange {
        field: String,
        value: String,
        min: String,
        max: String,
    },
    #[error("EmptyDays: field `{field}` must list at least one day")]
    EmptyDays { field: String },
    /// The body could not be read as a parameter document at all.
    #[error("Malformed: {reason}")]
    Malformed { reason: String },
}

impl ValidationError {
    fn not_a_number(field: &str, value: impl ToString) -> Self {
        Self::NotANumber {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    fn out_of_range(field: &str, value: impl ToString, min: impl ToString, max: impl ToString) -> Self {
        Self::OutOfRange {
            field: field.to_string(),
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        }
    }

    pub fn malformed(reason: impl ToString) -> Self {
        Self::Malformed {
            reason: reason.to_string(),
        }
    }

    /// Name of the offending field. A malformed body is reported against the whole document.
    pub fn field(&self) -> &str {
        match self {
            Self::NotANumber { field, .. }
            | Self::OutOfRange { field, .. }
            | Self::EmptyDays { field } => field,
            Self::Malformed { .. } => "documento",
        }
    }
}

/// Preferred days of one staff member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preference {
    pub staff: usize,
    /// Sorted, without duplicates.
    pub days: Vec<usize>,
    pub specialist: bool,
}

/// Validated parameters of one optimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub population_size: usize,
    pub generations: usize,
    pub mutation_rate: f64,
    pub staff_count: usize,
    pub day_count: usize,
    /// At most one entry per staff member, ordered by staff index.
    pub preferences: Vec<Preference>,
    pub seed: Option<u64>,
}

impl Parameters {
    /// Staff explicitly flagged as specialists, ascending.
    pub fn flagged_specialists(&self) -> Vec<usize> {
        self.preferences
            .iter()
            .filter(|preference| preference.specialist)
            .map(|preference| preference.staff)
            .collect()
    }

    pub fn preference_for(&self, staff: usize) -> Option<&Preference> {
        self.preferences.iter().find(|preference| preference.staff == staff)
    }
}

fn bounded_count(
    value: Option<&Numeric>,
    default: i64,
    field: &str,
    min: i64,
    max: usize,
) -> Result<usize, ValidationError> {
    let value = match value {
        Some(numeric) => numeric.as_integer(field)?,
        None => default,
    };

    if value < min || value > max as i64 {
        return Err(ValidationError::out_of_range(field, value, min, max));
    }

    Ok(value as usize)
}

impl ParameterDocument {
    /// Validates the document against the structural rules and `limits`.
    ///
    /// Pure: either the fully validated [`Parameters`] or the first offending field.
    #[instrument(level = "debug", skip(self, limits), fields(preferences = self.preferencias.len()))]
    pub fn validate(&self, limits: &ValidationLimits) -> Result<Parameters, ValidationError> {
        let population_size = bounded_count(
            self.poblacion.as_ref(),
            DEFAULT_POPULATION,
            "poblacion",
            2,
            limits.max_population,
        )?;
        let generations = bounded_count(
            self.generaciones.as_ref(),
            DEFAULT_GENERATIONS,
            "generaciones",
            1,
            limits.max_generations,
        )?;
        let mutation_rate = match &self.mutacion {
            Some(numeric) => numeric.as_float("mutacion")?,
            None => DEFAULT_MUTATION,
        };
        if !(0.0..=1.0).contains(&mutation_rate) {
            return Err(ValidationError::out_of_range("mutacion", mutation_rate, 0.0, 1.0));
        }
        let staff_count = bounded_count(
            self.enfermeras.as_ref(),
            DEFAULT_STAFF,
            "enfermeras",
            1,
            limits.max_staff,
        )?;
        let day_count = bounded_count(self.dias.as_ref(), DEFAULT_DAYS, "dias", 1, limits.max_days)?;
        let seed = match &self.semilla {
            Some(numeric) => {
                let seed = numeric.as_integer("semilla")?;
                if seed < 0 {
                    return Err(ValidationError::out_of_range("semilla", seed, 0, i64::MAX));
                }
                Some(seed as u64)
            }
            None => None,
        };

        // Repeated entries for one staff member are merged.
        let mut merged: BTreeMap<usize, (BTreeSet<usize>, bool)> = BTreeMap::new();
        for (index, preference) in self.preferencias.iter().enumerate() {
            let staff_field = format!("preferencias[{index}].enfermera");
            let staff = preference.enfermera.as_integer(&staff_field)?;
            if staff < 0 || staff >= staff_count as i64 {
                return Err(ValidationError::out_of_range(
                    &staff_field,
                    staff,
                    0,
                    staff_count - 1,
                ));
            }

            if preference.dias.is_empty() {
                return Err(ValidationError::EmptyDays {
                    field: format!("preferencias[{index}].dias"),
                });
            }

            let entry = merged.entry(staff as usize).or_default();
            for (position, day) in preference.dias.iter().enumerate() {
                let day_field = format!("preferencias[{index}].dias[{position}]");
                let day = day.as_integer(&day_field)?;
                if day < 0 || day >= day_count as i64 {
                    return Err(ValidationError::out_of_range(
                        &day_field,
                        day,
                        0,
                        day_count - 1,
                    ));
                }
                entry.0.insert(day as usize);
            }
            entry.1 |= preference.es_especialista;
        }

        let preferences = merged
            .into_iter()
            .map(|(staff, (days, specialist))| Preference {
                staff,
                days: days.into_iter().collect(),
                specialist,
            })
            .collect();

        Ok(Parameters {
            population_size,
            generations,
            mutation_rate,
            staff_count,
            day_count,
            preferences,
            seed,
        })
    }
}
