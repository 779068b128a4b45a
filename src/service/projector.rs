//! Projection of session state into client documents.

use super::models::{ProgressDocument, ResultDocument, ScheduleRow, SessionSnapshot, SessionStatus};
use crate::engine::Outcome;

pub fn progress_document(snapshot: &SessionSnapshot) -> ProgressDocument {
    let progress = &snapshot.progress;
    let classification = snapshot
        .outcome
        .as_ref()
        .map(|outcome| outcome.classification);

    ProgressDocument {
        generation: progress.generation,
        total_generations: progress.total_generations,
        percentage: progress.percentage(),
        best_fitness: progress.best.map(|best| best.fitness),
        hard_penalty: progress.best.map(|best| best.hard_penalty),
        soft_penalty: progress.best.map(|best| best.soft_penalty),
        completed: snapshot.status != SessionStatus::Running,
        error: snapshot.error.clone(),
        optimal: classification.map(|classification| classification.is_optimal()),
        acceptable: classification.map(|classification| classification.is_acceptable()),
    }
}

pub fn result_document(outcome: &Outcome) -> ResultDocument {
    let best = &outcome.best;

    let schedule = best
        .schedule
        .rows()
        .enumerate()
        .map(|(staff, shifts)| ScheduleRow {
            staff: format!("Enfermera {}", staff + 1),
            shifts: shifts.to_vec(),
        })
        .collect();

    ResultDocument {
        schedule,
        fitness: best.evaluation.fitness,
        hard_penalty: best.evaluation.hard_penalty,
        soft_penalty: best.evaluation.soft_penalty,
        evolution: outcome.evolution.clone(),
        hard_violations: best.evaluation.report.hard.clone(),
        soft_violations: best.evaluation.report.soft.clone(),
        optimal: outcome.classification.is_optimal(),
        acceptable: outcome.classification.is_acceptable(),
        specialists: outcome.specialists.iter().map(|staff| staff + 1).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{BestScore, ProgressSnapshot};
    use crate::models::{
        Classification, Evaluation, Individual, Schedule, Shift, ViolationKind, ViolationReport,
    };

    fn outcome(classification: Classification) -> Outcome {
        let mut report = ViolationReport::default();
        report.record(
            ViolationKind::Coverage,
            "Día 2, turno Tarde: 1 personas (mín: 2, faltan 1)".to_string(),
        );
        report.record(
            ViolationKind::Preferences,
            "Enfermera 1: día preferido 1 asignado como Libre".to_string(),
        );

        let schedule = Schedule::from_rows(vec![
            vec![Shift::Rest, Shift::Morning],
            vec![Shift::Night, Shift::Afternoon],
        ])
        .unwrap();

        Outcome {
            best: Individual::new(
                schedule,
                Evaluation {
                    hard_penalty: 20,
                    soft_penalty: 5,
                    fitness: 445.0,
                    report,
                },
            ),
            classification,
            evolution: vec![900.0, 445.0],
            generations_run: 1,
            total_generations: 1,
            specialists: vec![0, 1],
        }
    }

    #[test]
    fn it_projects_the_result_with_external_labels() {
        let document = result_document(&outcome(Classification::Invalid));
        let value = serde_json::to_value(&document).unwrap();

        assert_eq!(value["horario"][0]["enfermera"], "Enfermera 1");
        assert_eq!(value["horario"][0]["turnos"][0], "Libre");
        assert_eq!(value["horario"][0]["turnos"][1], "Mañana");
        assert_eq!(value["horario"][1]["turnos"][0], "Noche");
        assert_eq!(value["horario"][1]["turnos"][1], "Tarde");
        assert_eq!(value["aptitud"], 445.0);
        assert_eq!(value["penalizacion_dura"], 20);
        assert_eq!(value["penalizacion_blanda"], 5);
        assert_eq!(value["evoluciones"][0], 900.0);
        assert_eq!(value["violaciones_duras"]["cobertura"].as_array().unwrap().len(), 1);
        assert_eq!(value["violaciones_blandas"]["preferencias"].as_array().unwrap().len(), 1);
        assert_eq!(value["es_optimo"], false);
        assert_eq!(value["es_aceptable"], false);
        assert_eq!(value["especialistas"], serde_json::json!([1, 2]));
    }

    #[test]
    fn it_marks_optimal_results_acceptable_too() {
        let document = result_document(&outcome(Classification::Optimal));
        assert!(document.optimal);
        assert!(document.acceptable);

        let document = result_document(&outcome(Classification::Acceptable));
        assert!(!document.optimal);
        assert!(document.acceptable);
    }

    #[test]
    fn it_omits_classification_until_completed() {
        let progress = ProgressSnapshot {
            generation: 5,
            total_generations: 20,
            best: Some(BestScore {
                fitness: 120.0,
                hard_penalty: 1,
                soft_penalty: 3,
            }),
        };

        let running = progress_document(&SessionSnapshot::running(progress.clone()));
        let value = serde_json::to_value(&running).unwrap();
        assert_eq!(value["generacion_actual"], 5);
        assert_eq!(value["porcentaje"], 25.0);
        assert_eq!(value["completado"], false);
        assert!(value["error"].is_null());
        assert!(value.get("es_optimo").is_none());
        assert_eq!(value["mejor_aptitud"], 120.0);
        assert_eq!(value["penalizacion_dura"], 1);

        let completed = progress_document(&SessionSnapshot::completed(
            progress.clone(),
            outcome(Classification::Acceptable),
        ));
        assert!(completed.completed);
        assert_eq!(completed.optimal, Some(false));
        assert_eq!(completed.acceptable, Some(true));

        let failed = progress_document(&SessionSnapshot::failed(progress, "cancelled".to_string()));
        assert!(failed.completed);
        assert_eq!(failed.error.as_deref(), Some("cancelled"));
        assert_eq!(failed.optimal, None);
    }

    #[test]
    fn it_omits_scores_before_the_initial_population_is_scored() {
        let queued = progress_document(&SessionSnapshot::running(ProgressSnapshot::initial(10)));
        let value = serde_json::to_value(&queued).unwrap();

        assert_eq!(value["generacion_actual"], 0);
        assert_eq!(value["total_generaciones"], 10);
        assert!(value.get("mejor_aptitud").is_none());
        assert!(value.get("penalizacion_dura").is_none());
        assert!(value.get("penalizacion_blanda").is_none());
    }
}
