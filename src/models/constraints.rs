//! Hard and soft scheduling rules.
//!
//! Hard rules (a usable roster has none of these):
//! - a Night shift directly followed by a Morning shift,
//! - a run of working days longer than [`ConstraintConfig::max_consecutive_days`],
//! - a working shift with fewer specialists than required,
//! - a working shift with fewer staff than [`ConstraintConfig::min_coverage`].
//!
//! Soft rules (quality only):
//! - a preferred day assigned as rest,
//! - uneven worked-day counts across staff,
//! - uneven night counts across staff.
//!
//! Descriptions are written for the end user, so days and staff are 1-based.

use super::{
    Detail, Evaluation, Evaluator, Parameters, Schedule, Shift, ViolationKind, ViolationReport,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Penalty points per violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenaltyWeights {
    pub night_morning: u64,
    /// Per working day beyond the consecutive limit.
    pub consecutive_day: u64,
    /// Per missing specialist in a working shift.
    pub specialist: u64,
    /// Per missing staff member in a working shift.
    pub coverage: u64,
    /// Per preferred day left as rest.
    pub preference: u64,
    /// Per unit of worked-day standard deviation above the threshold.
    pub equity: f64,
    /// Per unit of night-count standard deviation above the threshold.
    pub nights: f64,
}

impl Default for PenaltyWeights {
    fn default() -> Self {
        Self {
            night_morning: 50,
            consecutive_day: 30,
            specialist: 40,
            coverage: 20,
            preference: 5,
            equity: 3.0,
            nights: 5.0,
        }
    }
}

/// Engine-internal rule configuration. Not exposed through the parameter document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintConfig {
    pub max_consecutive_days: usize,
    /// Minimum headcount of every working shift on every day.
    pub min_coverage: usize,
    /// Specialists required in every working shift on every day.
    pub specialists_per_shift: usize,
    /// When no preference flags a specialist, the first `n` staff members are used.
    pub fallback_specialists: usize,
    /// Worked-day standard deviation tolerated without penalty.
    pub equity_threshold: f64,
    /// Night-count standard deviation tolerated without penalty.
    pub night_threshold: f64,
    pub weights: PenaltyWeights,
}

impl Default for ConstraintConfig {
    fn default() -> Self {
        Self {
            max_consecutive_days: 6,
            min_coverage: 2,
            specialists_per_shift: 1,
            fallback_specialists: 3,
            equity_threshold: 1.0,
            night_threshold: 1.0,
            weights: PenaltyWeights::default(),
        }
    }
}

impl ConstraintConfig {
    /// Staff members counted as specialists for `parameters`, ascending.
    pub fn specialists(&self, parameters: &Parameters) -> Vec<usize> {
        let flagged = parameters.flagged_specialists();
        if !flagged.is_empty() {
            return flagged;
        }

        (0..self.fallback_specialists.min(parameters.staff_count)).collect()
    }
}

/// Summary statistics of a per-staff count.
struct Dispersion {
    std_dev: f64,
    mean: f64,
    min: usize,
    max: usize,
}

impl Dispersion {
    fn of(values: &[usize]) -> Self {
        let n = values.len().max(1) as f64;
        let mean = values.iter().sum::<usize>() as f64 / n;
        let variance = values
            .iter()
            .map(|&value| (value as f64 - mean).powi(2))
            .sum::<f64>()
            / n;

        Self {
            std_dev: variance.sqrt(),
            mean,
            min: values.iter().copied().min().unwrap_or(0),
            max: values.iter().copied().max().unwrap_or(0),
        }
    }

    fn penalty(&self, threshold: f64, weight: f64) -> u64 {
        ((self.std_dev - threshold).max(0.0) * weight).floor() as u64
    }
}

/// Collects penalty points and, in [`Detail::Full`], descriptions.
struct Tally {
    detail: Detail,
    hard: u64,
    soft: u64,
    report: ViolationReport,
}

impl Tally {
    fn new(detail: Detail) -> Self {
        Self {
            detail,
            hard: 0,
            soft: 0,
            report: ViolationReport::default(),
        }
    }

    fn add(&mut self, kind: ViolationKind, points: u64, describe: impl FnOnce() -> String) {
        match kind.severity() {
            super::Severity::Hard => self.hard += points,
            super::Severity::Soft => self.soft += points,
        }
        if self.detail == Detail::Full {
            self.report.record(kind, describe());
        }
    }
}

/// Scores schedules of one run against [`ConstraintConfig`].
#[derive(Debug, Clone)]
pub struct ConstraintEvaluator {
    config: ConstraintConfig,
    staff_count: usize,
    day_count: usize,
    specialists: Vec<usize>,
    /// (staff, preferred days)
    preferences: Vec<(usize, Vec<usize>)>,
    hard_weight: u64,
}

impl ConstraintEvaluator {
    pub fn new(parameters: &Parameters, config: ConstraintConfig) -> Self {
        let specialists = config.specialists(parameters);
        let preferences: Vec<(usize, Vec<usize>)> = parameters
            .preferences
            .iter()
            .map(|preference| (preference.staff, preference.days.clone()))
            .collect();

        // Upper bound of the soft penalty: every preferred day unmet and the
        // largest possible deviation (half the horizon) for both dispersions.
        let preferred_days: u64 = preferences.iter().map(|(_, days)| days.len() as u64).sum();
        let half_horizon = parameters.day_count as f64 / 2.0;
        let soft_ceiling = preferred_days * config.weights.preference
            + (half_horizon * config.weights.equity).ceil() as u64
            + (half_horizon * config.weights.nights).ceil() as u64;

        Self {
            staff_count: parameters.staff_count,
            day_count: parameters.day_count,
            specialists,
            preferences,
            hard_weight: soft_ceiling + 1,
            config,
        }
    }

    pub fn config(&self) -> &ConstraintConfig {
        &self.config
    }

    /// Effective specialists, ascending.
    pub fn specialists(&self) -> &[usize] {
        &self.specialists
    }

    /// Multiplier applied to hard penalty points in the scalar fitness.
    pub fn hard_weight(&self) -> u64 {
        self.hard_weight
    }

    fn check_night_morning(&self, schedule: &Schedule, tally: &mut Tally) {
        let weight = self.config.weights.night_morning;
        for staff in 0..self.staff_count {
            let row = schedule.row(staff);
            for day in 1..row.len() {
                if row[day - 1] == Shift::Night && row[day] == Shift::Morning {
                    tally.add(ViolationKind::NightMorning, weight, || {
                        format!(
                            "Enfermera {}: Noche día {}, Mañana día {}",
                            staff + 1,
                            day,
                            day + 1
                        )
                    });
                }
            }
        }
    }

    fn check_consecutive_days(&self, schedule: &Schedule, tally: &mut Tally) {
        let limit = self.config.max_consecutive_days;
        let weight = self.config.weights.consecutive_day;

        for staff in 0..self.staff_count {
            let row = schedule.row(staff);
            let mut day = 0;
            while day < row.len() {
                if !row[day].is_working() {
                    day += 1;
                    continue;
                }

                let start = day;
                while day < row.len() && row[day].is_working() {
                    day += 1;
                }
                let length = day - start;

                if length > limit {
                    let excess = (length - limit) as u64;
                    tally.add(ViolationKind::ConsecutiveDays, excess * weight, || {
                        format!(
                            "Enfermera {}: {} días consecutivos del día {} al {} (máx: {})",
                            staff + 1,
                            length,
                            start + 1,
                            day,
                            limit
                        )
                    });
                }
            }
        }
    }

    fn check_specialists(&self, schedule: &Schedule, tally: &mut Tally) {
        let required = self.config.specialists_per_shift;
        if self.specialists.is_empty() || required == 0 {
            return;
        }

        let weight = self.config.weights.specialist;
        for day in 0..self.day_count {
            for shift in Shift::WORKING {
                let present = self
                    .specialists
                    .iter()
                    .filter(|&&staff| schedule.get(staff, day) == shift)
                    .count();

                if present < required {
                    let shortfall = (required - present) as u64;
                    tally.add(ViolationKind::Specialists, shortfall * weight, || {
                        if present == 0 {
                            format!("Día {}, turno {}: sin especialistas", day + 1, shift)
                        } else {
                            format!(
                                "Día {}, turno {}: {} especialistas (mín: {})",
                                day + 1,
                                shift,
                                present,
                                required
                            )
                        }
                    });
                }
            }
        }
    }

    fn check_coverage(&self, schedule: &Schedule, tally: &mut Tally) {
        let minimum = self.config.min_coverage;
        let weight = self.config.weights.coverage;

        for day in 0..self.day_count {
            for shift in Shift::WORKING {
                let headcount = schedule.headcount(day, shift);
                if headcount < minimum {
                    let shortfall = minimum - headcount;
                    tally.add(ViolationKind::Coverage, shortfall as u64 * weight, || {
                        format!(
                            "Día {}, turno {}: {} personas (mín: {}, faltan {})",
                            day + 1,
                            shift,
                            headcount,
                            minimum,
                            shortfall
                        )
                    });
                }
            }
        }
    }

    fn check_preferences(&self, schedule: &Schedule, tally: &mut Tally) {
        let weight = self.config.weights.preference;
        for (staff, days) in &self.preferences {
            for &day in days {
                if schedule.get(*staff, day) == Shift::Rest {
                    tally.add(ViolationKind::Preferences, weight, || {
                        format!(
                            "Enfermera {}: día preferido {} asignado como Libre",
                            staff + 1,
                            day + 1
                        )
                    });
                }
            }
        }
    }

    fn check_dispersion(
        &self,
        kind: ViolationKind,
        counts: &[usize],
        threshold: f64,
        weight: f64,
        unit: &str,
        tally: &mut Tally,
    ) {
        let dispersion = Dispersion::of(counts);
        let points = dispersion.penalty(threshold, weight);
        if points > 0 {
            tally.add(kind, points, || {
                format!(
                    "Desviación: {:.1} {} (min: {}, max: {}, promedio: {:.1})",
                    dispersion.std_dev, unit, dispersion.min, dispersion.max, dispersion.mean
                )
            });
        }
    }
}

impl Evaluator for ConstraintEvaluator {
    #[instrument(level = "trace", skip(self, schedule))]
    fn evaluate(&self, schedule: &Schedule, detail: Detail) -> Result<Evaluation, anyhow::Error> {
        if !schedule.has_shape(self.staff_count, self.day_count) {
            anyhow::bail!(
                "schedule shape {}x{} does not match parameters {}x{}",
                schedule.staff_count(),
                schedule.day_count(),
                self.staff_count,
                self.day_count
            );
        }

        let mut tally = Tally::new(detail);

        self.check_night_morning(schedule, &mut tally);
        self.check_consecutive_days(schedule, &mut tally);
        self.check_specialists(schedule, &mut tally);
        self.check_coverage(schedule, &mut tally);

        self.check_preferences(schedule, &mut tally);
        let worked: Vec<usize> = (0..self.staff_count)
            .map(|staff| schedule.worked_days(staff))
            .collect();
        self.check_dispersion(
            ViolationKind::Equity,
            &worked,
            self.config.equity_threshold,
            self.config.weights.equity,
            "días",
            &mut tally,
        );
        let nights: Vec<usize> = (0..self.staff_count)
            .map(|staff| schedule.nights(staff))
            .collect();
        self.check_dispersion(
            ViolationKind::Nights,
            &nights,
            self.config.night_threshold,
            self.config.weights.nights,
            "noches",
            &mut tally,
        );

        Ok(Evaluation {
            hard_penalty: tally.hard,
            soft_penalty: tally.soft,
            fitness: (tally.hard * self.hard_weight + tally.soft) as f64,
            report: tally.report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Preference, QualityGoal};
    use rand::{SeedableRng, rngs::StdRng};
    use crate::models::Shift::{Afternoon as A, Morning as M, Night as N, Rest as R};

    fn parameters(staff_count: usize, day_count: usize, preferences: Vec<Preference>) -> Parameters {
        Parameters {
            population_size: 10,
            generations: 5,
            mutation_rate: 0.05,
            staff_count,
            day_count,
            preferences,
            seed: None,
        }
    }

    /// Only the rule under test produces penalties.
    fn isolated() -> ConstraintConfig {
        ConstraintConfig {
            max_consecutive_days: usize::MAX,
            min_coverage: 0,
            specialists_per_shift: 0,
            equity_threshold: f64::MAX,
            night_threshold: f64::MAX,
            ..ConstraintConfig::default()
        }
    }

    fn schedule(rows: Vec<Vec<Shift>>) -> Schedule {
        Schedule::from_rows(rows).unwrap()
    }

    #[test]
    fn it_flags_night_followed_by_morning() {
        let evaluator = ConstraintEvaluator::new(&parameters(2, 4, vec![]), isolated());
        let roster = schedule(vec![vec![N, M, N, M], vec![M, N, A, M]]);

        let evaluation = evaluator.evaluate(&roster, Detail::Full).unwrap();

        assert_eq!(evaluation.hard_penalty, 100);
        assert_eq!(
            evaluation.report.entries(ViolationKind::NightMorning),
            &[
                "Enfermera 1: Noche día 1, Mañana día 2".to_string(),
                "Enfermera 1: Noche día 3, Mañana día 4".to_string()
            ]
        );
    }

    #[test]
    fn it_flags_each_run_beyond_the_consecutive_limit() {
        let config = ConstraintConfig {
            max_consecutive_days: 3,
            ..isolated()
        };
        let evaluator = ConstraintEvaluator::new(&parameters(1, 11, vec![]), config);
        // Runs of 5, 2 and 2 days; only the first exceeds the limit
        let roster = schedule(vec![vec![M, A, N, A, M, R, M, A, R, N, N]]);

        let evaluation = evaluator.evaluate(&roster, Detail::Full).unwrap();

        assert_eq!(evaluation.hard_penalty, 2 * 30);
        assert_eq!(
            evaluation.report.entries(ViolationKind::ConsecutiveDays),
            &["Enfermera 1: 5 días consecutivos del día 1 al 5 (máx: 3)".to_string()]
        );
    }

    #[test]
    fn it_flags_a_run_that_reaches_the_horizon_end() {
        let config = ConstraintConfig {
            max_consecutive_days: 2,
            ..isolated()
        };
        let evaluator = ConstraintEvaluator::new(&parameters(1, 5, vec![]), config);
        let roster = schedule(vec![vec![R, M, M, M, M]]);

        let evaluation = evaluator.evaluate(&roster, Detail::Full).unwrap();

        assert_eq!(evaluation.hard_penalty, 60);
        assert!(evaluation.report.entries(ViolationKind::ConsecutiveDays)[0]
            .contains("del día 2 al 5"));
    }

    #[test]
    fn it_requires_a_specialist_in_every_working_shift() {
        let config = ConstraintConfig {
            specialists_per_shift: 1,
            ..isolated()
        };
        let preferences = vec![
            Preference {
                staff: 0,
                days: vec![0],
                specialist: true,
            },
            Preference {
                staff: 1,
                days: vec![0],
                specialist: true,
            },
        ];
        let evaluator = ConstraintEvaluator::new(&parameters(3, 1, preferences), config);
        // Specialists cover Morning and Night; Afternoon is only staffed by staff 2
        let roster = schedule(vec![vec![M], vec![N], vec![A]]);

        let evaluation = evaluator.evaluate(&roster, Detail::Full).unwrap();

        assert_eq!(evaluator.specialists(), &[0, 1]);
        assert_eq!(evaluation.hard_penalty, 40);
        assert_eq!(
            evaluation.report.entries(ViolationKind::Specialists),
            &["Día 1, turno Tarde: sin especialistas".to_string()]
        );
    }

    #[test]
    fn it_falls_back_to_the_first_staff_as_specialists() {
        let evaluator = ConstraintEvaluator::new(&parameters(5, 3, vec![]), isolated());
        assert_eq!(evaluator.specialists(), &[0, 1, 2]);

        let evaluator = ConstraintEvaluator::new(&parameters(2, 3, vec![]), isolated());
        assert_eq!(evaluator.specialists(), &[0, 1]);
    }

    #[test]
    fn it_reports_the_coverage_shortfall() {
        let config = ConstraintConfig {
            min_coverage: 2,
            ..isolated()
        };
        let evaluator = ConstraintEvaluator::new(&parameters(6, 5, vec![]), config);
        // Two staff on every working shift each day, except a single Night on day index 3
        let mut roster = Schedule::filled(6, 5, R);
        for day in 0..5 {
            for (staff, shift) in [M, M, A, A, N, N].into_iter().enumerate() {
                roster.set(staff, day, shift);
            }
        }
        roster.set(5, 3, R);

        let evaluation = evaluator.evaluate(&roster, Detail::Full).unwrap();

        assert_eq!(evaluation.hard_penalty, 20);
        let entries = evaluation.report.entries(ViolationKind::Coverage);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0], "Día 4, turno Noche: 1 personas (mín: 2, faltan 1)");
    }

    #[test]
    fn it_counts_rest_on_preferred_days() {
        let preferences = vec![Preference {
            staff: 0,
            days: vec![0, 7, 14],
            specialist: true,
        }];
        let evaluator = ConstraintEvaluator::new(&parameters(2, 21, preferences), isolated());
        let mut roster = Schedule::filled(2, 21, M);
        roster.set(0, 7, R);

        let evaluation = evaluator.evaluate(&roster, Detail::Full).unwrap();

        let entries = evaluation.report.entries(ViolationKind::Preferences);
        assert_eq!(entries, &["Enfermera 1: día preferido 8 asignado como Libre".to_string()]);
        assert_eq!(evaluation.soft_penalty, 5);
        // Satisfied days are recoverable from the report
        assert_eq!(3 - entries.len(), 2);
    }

    #[test]
    fn it_penalises_uneven_workload_above_threshold() {
        let config = ConstraintConfig {
            equity_threshold: 1.0,
            ..isolated()
        };
        let evaluator = ConstraintEvaluator::new(&parameters(2, 10, vec![]), config);
        // Worked days 10 and 0: std dev 5.0, penalty floor((5 - 1) * 3) = 12
        let roster = schedule(vec![vec![A; 10], vec![R; 10]]);

        let evaluation = evaluator.evaluate(&roster, Detail::Full).unwrap();

        assert_eq!(evaluation.soft_penalty, 12);
        assert_eq!(
            evaluation.report.entries(ViolationKind::Equity),
            &["Desviación: 5.0 días (min: 0, max: 10, promedio: 5.0)".to_string()]
        );
    }

    #[test]
    fn it_penalises_uneven_nights_above_threshold() {
        let config = ConstraintConfig {
            night_threshold: 0.5,
            ..isolated()
        };
        let evaluator = ConstraintEvaluator::new(&parameters(2, 4, vec![]), config);
        // Nights 4 and 0: std dev 2.0, penalty floor((2 - 0.5) * 5) = 7
        let roster = schedule(vec![vec![N; 4], vec![A; 4]]);

        let evaluation = evaluator.evaluate(&roster, Detail::Full).unwrap();

        assert_eq!(evaluation.soft_penalty, 7);
        assert_eq!(evaluation.report.count(ViolationKind::Nights), 1);
    }

    #[test]
    fn it_keeps_balanced_rosters_free_of_dispersion_penalties() {
        let evaluator =
            ConstraintEvaluator::new(&parameters(3, 3, vec![]), ConstraintConfig::default());
        let roster = schedule(vec![vec![M, A, N], vec![A, N, R], vec![N, R, M]]);

        let evaluation = evaluator.evaluate(&roster, Detail::Full).unwrap();

        assert_eq!(evaluation.report.count(ViolationKind::Equity), 0);
        assert_eq!(evaluation.report.count(ViolationKind::Nights), 0);
    }

    #[test]
    fn it_produces_the_same_totals_with_and_without_detail() {
        let preferences = vec![Preference {
            staff: 1,
            days: vec![2, 3, 9],
            specialist: false,
        }];
        let evaluator =
            ConstraintEvaluator::new(&parameters(6, 14, preferences), ConstraintConfig::default());
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..20 {
            let roster = Schedule::random(6, 14, &mut rng);
            let totals = evaluator.evaluate(&roster, Detail::Totals).unwrap();
            let full = evaluator.evaluate(&roster, Detail::Full).unwrap();

            assert_eq!(totals.hard_penalty, full.hard_penalty);
            assert_eq!(totals.soft_penalty, full.soft_penalty);
            assert_eq!(totals.fitness, full.fitness);
            assert!(totals.report.is_clean());
            assert_eq!(full.report.has_hard_violations(), full.hard_penalty > 0);
        }
    }

    #[test]
    fn it_ranks_fewer_hard_points_strictly_better_in_scalar_fitness() {
        let preferences = vec![Preference {
            staff: 0,
            days: (0..10).collect(),
            specialist: false,
        }];
        let evaluator =
            ConstraintEvaluator::new(&parameters(4, 10, preferences), ConstraintConfig::default());

        // Worst soft case with a single hard point vs. no soft penalty with two
        let soft_max = evaluator.hard_weight() - 1;
        let one_hard = (evaluator.hard_weight() + soft_max) as f64;
        let two_hard = (2 * evaluator.hard_weight()) as f64;
        assert!(one_hard < two_hard);

        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..50 {
            let roster = Schedule::random(4, 10, &mut rng);
            let evaluation = evaluator.evaluate(&roster, Detail::Totals).unwrap();
            assert!(evaluation.soft_penalty < evaluator.hard_weight());
        }
    }

    #[test]
    fn it_rejects_schedules_of_the_wrong_shape() {
        let evaluator =
            ConstraintEvaluator::new(&parameters(3, 7, vec![]), ConstraintConfig::default());
        let roster = Schedule::filled(3, 6, R);
        assert!(evaluator.evaluate(&roster, Detail::Totals).is_err());
    }

    #[test]
    fn it_feeds_classification() {
        let evaluator = ConstraintEvaluator::new(&parameters(1, 2, vec![]), isolated());
        let evaluation = evaluator
            .evaluate(&schedule(vec![vec![A, M]]), Detail::Full)
            .unwrap();

        assert_eq!(evaluation.hard_penalty, 0);
        assert!(QualityGoal::default()
            .classify(evaluation.hard_penalty, evaluation.soft_penalty)
            .is_acceptable());
    }
}
