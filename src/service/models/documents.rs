//! Documents exchanged with the browser client.

use crate::models::{Shift, ViolationKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartResponse {
    pub success: bool,
    pub session_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl ToString) -> Self {
        Self {
            success: false,
            error: error.to_string(),
        }
    }
}

/// Answer to a progress poll.
///
/// The scores are absent until the initial population has been scored. The
/// classification flags are only present once the run completed successfully.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressDocument {
    #[serde(rename = "generacion_actual")]
    pub generation: usize,
    #[serde(rename = "total_generaciones")]
    pub total_generations: usize,
    #[serde(rename = "porcentaje")]
    pub percentage: f64,
    #[serde(rename = "mejor_aptitud", default, skip_serializing_if = "Option::is_none")]
    pub best_fitness: Option<f64>,
    #[serde(rename = "penalizacion_dura", default, skip_serializing_if = "Option::is_none")]
    pub hard_penalty: Option<u64>,
    #[serde(rename = "penalizacion_blanda", default, skip_serializing_if = "Option::is_none")]
    pub soft_penalty: Option<u64>,
    #[serde(rename = "completado")]
    pub completed: bool,
    pub error: Option<String>,
    #[serde(rename = "es_optimo", default, skip_serializing_if = "Option::is_none")]
    pub optimal: Option<bool>,
    #[serde(rename = "es_aceptable", default, skip_serializing_if = "Option::is_none")]
    pub acceptable: Option<bool>,
}

/// One staff member's row of the roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// `"Enfermera {n}"`, 1-based.
    #[serde(rename = "enfermera")]
    pub staff: String,
    #[serde(rename = "turnos")]
    pub shifts: Vec<Shift>,
}

/// Final result of a completed session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultDocument {
    #[serde(rename = "horario")]
    pub schedule: Vec<ScheduleRow>,
    #[serde(rename = "aptitud")]
    pub fitness: f64,
    #[serde(rename = "penalizacion_dura")]
    pub hard_penalty: u64,
    #[serde(rename = "penalizacion_blanda")]
    pub soft_penalty: u64,
    #[serde(rename = "evoluciones")]
    pub evolution: Vec<f64>,
    #[serde(rename = "violaciones_duras")]
    pub hard_violations: BTreeMap<ViolationKind, Vec<String>>,
    #[serde(rename = "violaciones_blandas")]
    pub soft_violations: BTreeMap<ViolationKind, Vec<String>>,
    #[serde(rename = "es_optimo")]
    pub optimal: bool,
    #[serde(rename = "es_aceptable")]
    pub acceptable: bool,
    /// 1-based staff numbers.
    #[serde(rename = "especialistas")]
    pub specialists: Vec<usize>,
}
