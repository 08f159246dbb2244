use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregators::clock::{Clock, SystemClock};
use crate::aggregators::types::{
    AssessmentObservation, Decision, GradingObservation, ReviewerBatch, SubmissionBatch,
};
use crate::grade::{Grade, div_half_up};

/// How a submission whose only graded assessment has weight 0 is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroWeightPolicy {
    /// A sole graded assessment counts whatever its weight.
    #[default]
    TolerateSingle,
    /// A sole graded assessment with weight 0 leaves the submission ungraded.
    Disqualify,
}

/// Computes aggregate grades and the persistence decision for each batch.
///
/// Pure: the only collaborator is the clock, consulted when the caller does
/// not pass a timestamp.
#[derive(Debug, Clone, Default)]
pub struct GradeAggregator<C = SystemClock> {
    zero_weight: ZeroWeightPolicy,
    clock: C,
}

impl GradeAggregator<SystemClock> {
    pub fn new(zero_weight: ZeroWeightPolicy) -> Self {
        Self {
            zero_weight,
            clock: SystemClock,
        }
    }
}

impl<C: Clock> GradeAggregator<C> {
    pub fn with_clock(zero_weight: ZeroWeightPolicy, clock: C) -> Self {
        Self { zero_weight, clock }
    }

    pub fn zero_weight_policy(&self) -> ZeroWeightPolicy {
        self.zero_weight
    }

    /// Weighted mean of the graded assessments, rounded half-up to 5 places.
    ///
    /// `None` when nothing is graded yet, or when several graded assessments
    /// all carry weight 0.
    pub fn submission_candidate(&self, rows: &[AssessmentObservation]) -> Option<Grade> {
        let graded: Vec<(u32, Grade)> = rows
            .iter()
            .filter_map(|r| r.grade.map(|g| (r.weight, g)))
            .collect();

        match graded.as_slice() {
            [] => None,
            [(0, _)] if self.zero_weight == ZeroWeightPolicy::Disqualify => None,
            [(_, grade)] => Some(*grade),
            many => weighted_mean(many),
        }
    }

    /// Decides whether the stored grade of a submission must change.
    ///
    /// Emits [`Decision::Update`] only when a candidate exists and differs
    /// from `batch.current_grade`. There is no insert for submissions: the
    /// submission row always exists.
    pub fn aggregate_submission_grades(
        &self,
        batch: &SubmissionBatch,
        now: Option<DateTime<Utc>>,
    ) -> Decision {
        let candidate = self.submission_candidate(&batch.rows);

        let decision = match candidate {
            Some(value) if Some(value) != batch.current_grade => Decision::Update {
                value,
                timestamp: now.unwrap_or_else(|| self.clock.now()),
            },
            _ => Decision::NoAction,
        };

        debug!(
            submission_id = batch.submission_id,
            rows = batch.rows.len(),
            current = ?batch.current_grade,
            candidate = ?candidate,
            decision = decision.label(),
            "Submission grades aggregated"
        );

        decision
    }

    /// Mean of the effective grading grades (override first), rounded
    /// half-up to 5 places. `None` when no row has an effective grade.
    pub fn reviewer_candidate(&self, rows: &[GradingObservation]) -> Option<Grade> {
        let effective: Vec<Grade> = rows.iter().filter_map(GradingObservation::effective).collect();
        if effective.is_empty() {
            return None;
        }

        let sum: i128 = effective.iter().map(|g| i128::from(g.units())).sum();
        let mean = div_half_up(sum, effective.len() as i128);
        Grade::from_units(i64::try_from(mean).ok()?)
    }

    /// Decides whether the reviewer's aggregation record must be created or
    /// changed.
    ///
    /// Without a candidate nothing happens, whatever is stored. Without an
    /// existing record the candidate is inserted. Otherwise it is written
    /// only if it differs from the stored aggregate.
    pub fn aggregate_reviewer_grades(
        &self,
        batch: &ReviewerBatch,
        now: Option<DateTime<Utc>>,
    ) -> Decision {
        let candidate = self.reviewer_candidate(&batch.rows);
        let timestamp = || now.unwrap_or_else(|| self.clock.now());

        let decision = match (candidate, batch.existing) {
            (None, _) => Decision::NoAction,
            (Some(value), None) => Decision::Insert {
                value,
                timestamp: timestamp(),
            },
            (Some(value), Some(existing)) if existing.aggregated_grade != Some(value) => {
                Decision::Update {
                    value,
                    timestamp: timestamp(),
                }
            }
            (Some(_), Some(_)) => Decision::NoAction,
        };

        debug!(
            reviewer_id = batch.reviewer_id,
            owner_module_id = batch.owner_module_id,
            rows = batch.rows.len(),
            existing = ?batch.existing,
            candidate = ?candidate,
            decision = decision.label(),
            "Reviewer grading grades aggregated"
        );

        decision
    }
}

fn weighted_mean(graded: &[(u32, Grade)]) -> Option<Grade> {
    let weight_sum: i128 = graded.iter().map(|&(w, _)| i128::from(w)).sum();
    if weight_sum == 0 {
        return None;
    }

    let weighted: i128 = graded
        .iter()
        .map(|&(w, g)| i128::from(w) * i128::from(g.units()))
        .sum();
    let mean = div_half_up(weighted, weight_sum);
    Grade::from_units(i64::try_from(mean).ok()?)
}

/// Aggregates a submission batch with the default policy and the wall clock.
pub fn aggregate_submission_grades(batch: &SubmissionBatch) -> Decision {
    GradeAggregator::new(ZeroWeightPolicy::default()).aggregate_submission_grades(batch, None)
}

/// Aggregates a reviewer batch with the default policy. `now` defaults to the
/// wall clock.
pub fn aggregate_reviewer_grades(batch: &ReviewerBatch, now: Option<DateTime<Utc>>) -> Decision {
    GradeAggregator::new(ZeroWeightPolicy::default()).aggregate_reviewer_grades(batch, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregators::clock::FixedClock;
    use crate::aggregators::types::ExistingAggregation;
    use chrono::TimeZone;

    fn g(v: f64) -> Grade {
        Grade::new(v).unwrap()
    }

    fn instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn aggregator() -> GradeAggregator<FixedClock> {
        GradeAggregator::with_clock(ZeroWeightPolicy::default(), FixedClock(instant()))
    }

    fn submission(current: Option<f64>, rows: &[(u32, Option<f64>)]) -> SubmissionBatch {
        SubmissionBatch {
            submission_id: 45,
            current_grade: current.map(g),
            rows: rows
                .iter()
                .map(|&(weight, grade)| AssessmentObservation {
                    weight,
                    grade: grade.map(g),
                })
                .collect(),
        }
    }

    fn reviewer(
        existing: Option<(u64, Option<f64>)>,
        rows: &[(Option<f64>, Option<f64>)],
    ) -> ReviewerBatch {
        ReviewerBatch {
            owner_module_id: 1,
            reviewer_id: 5,
            existing: existing.map(|(id, grade)| ExistingAggregation {
                id,
                aggregated_grade: grade.map(g),
            }),
            rows: rows
                .iter()
                .map(|&(grade, over)| GradingObservation {
                    grading_grade: grade.map(g),
                    grading_grade_override: over.map(g),
                })
                .collect(),
        }
    }

    fn update(v: f64) -> Decision {
        Decision::Update {
            value: g(v),
            timestamp: instant(),
        }
    }

    #[test]
    fn test_submission_not_graded() {
        let batch = submission(None, &[(1, None)]);
        assert_eq!(aggregator().aggregate_submission_grades(&batch, None), Decision::NoAction);
    }

    #[test]
    fn test_submission_empty_batch() {
        let batch = submission(Some(10.0), &[]);
        assert_eq!(aggregator().aggregate_submission_grades(&batch, None), Decision::NoAction);
    }

    #[test]
    fn test_submission_single() {
        let batch = submission(None, &[(1, Some(10.12345))]);
        assert_eq!(
            aggregator().aggregate_submission_grades(&batch, None),
            update(10.12345)
        );
    }

    #[test]
    fn test_submission_null_doesnt_influence() {
        let batch = submission(None, &[(1, Some(45.54321)), (1, None)]);
        assert_eq!(
            aggregator().aggregate_submission_grades(&batch, None),
            update(45.54321)
        );
    }

    #[test]
    fn test_submission_weighted_single() {
        let batch = submission(None, &[(4, Some(14.00012))]);
        assert_eq!(
            aggregator().aggregate_submission_grades(&batch, None),
            update(14.00012)
        );
    }

    #[test]
    fn test_submission_single_zero_weight_tolerated() {
        let batch = submission(None, &[(0, Some(33.3)), (2, None)]);
        assert_eq!(aggregator().aggregate_submission_grades(&batch, None), update(33.3));
    }

    #[test]
    fn test_submission_single_zero_weight_disqualified() {
        let agg = GradeAggregator::with_clock(ZeroWeightPolicy::Disqualify, FixedClock(instant()));
        let batch = submission(None, &[(0, Some(33.3))]);
        assert_eq!(agg.aggregate_submission_grades(&batch, None), Decision::NoAction);

        let batch = submission(None, &[(2, Some(33.3))]);
        assert_eq!(agg.aggregate_submission_grades(&batch, None), update(33.3));
    }

    #[test]
    fn test_submission_all_zero_weights() {
        let batch = submission(None, &[(0, Some(10.0)), (0, Some(20.0))]);
        assert_eq!(aggregator().aggregate_submission_grades(&batch, None), Decision::NoAction);
    }

    #[test]
    fn test_submission_mean() {
        let rows = [(1, Some(56.12)), (1, Some(12.59)), (1, Some(10.0)), (1, Some(0.0))];
        let batch = submission(None, &rows);
        assert_eq!(aggregator().aggregate_submission_grades(&batch, None), update(19.6775));
    }

    #[test]
    fn test_submission_mean_changed() {
        let rows = [(1, Some(56.12)), (1, Some(12.59)), (1, Some(10.0)), (1, Some(0.0))];
        let batch = submission(Some(12.5775), &rows);
        assert_eq!(aggregator().aggregate_submission_grades(&batch, None), update(19.6775));
    }

    #[test]
    fn test_submission_mean_nochange() {
        let rows = [(1, Some(56.12)), (1, Some(12.59)), (1, Some(10.0)), (1, Some(0.0))];
        let batch = submission(Some(19.6775), &rows);
        assert_eq!(aggregator().aggregate_submission_grades(&batch, None), Decision::NoAction);
    }

    #[test]
    fn test_submission_rounding() {
        let batch = submission(None, &[(1, Some(4.0)), (1, Some(2.0)), (1, Some(1.0))]);
        assert_eq!(aggregator().aggregate_submission_grades(&batch, None), update(2.33333));
    }

    #[test]
    fn test_submission_weighted_mean() {
        let rows = [(3, Some(12.0)), (2, Some(30.0)), (1, Some(10.0)), (0, Some(1000.0))];
        let batch = submission(None, &rows);
        assert_eq!(aggregator().aggregate_submission_grades(&batch, None), update(17.66667));
    }

    #[test]
    fn test_submission_explicit_timestamp() {
        let later = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let batch = submission(None, &[(1, Some(50.0))]);
        assert_eq!(
            aggregator().aggregate_submission_grades(&batch, Some(later)),
            Decision::Update {
                value: g(50.0),
                timestamp: later
            }
        );
    }

    #[test]
    fn test_reviewer_no_grading() {
        let batch = reviewer(None, &[(None, None)]);
        assert_eq!(aggregator().aggregate_reviewer_grades(&batch, None), Decision::NoAction);

        let batch = reviewer(Some((3, Some(40.0))), &[(None, None)]);
        assert_eq!(aggregator().aggregate_reviewer_grades(&batch, None), Decision::NoAction);
    }

    #[test]
    fn test_reviewer_single_grade_new() {
        let batch = reviewer(None, &[(Some(82.8767), None)]);
        assert_eq!(
            aggregator().aggregate_reviewer_grades(&batch, None),
            Decision::Insert {
                value: g(82.8767),
                timestamp: instant()
            }
        );
    }

    #[test]
    fn test_reviewer_single_grade_update() {
        let batch = reviewer(Some((1, Some(82.8767))), &[(Some(90.0), None)]);
        assert_eq!(aggregator().aggregate_reviewer_grades(&batch, None), update(90.0));
    }

    #[test]
    fn test_reviewer_single_grade_uptodate() {
        let batch = reviewer(Some((1, Some(90.0))), &[(Some(90.0), None)]);
        assert_eq!(aggregator().aggregate_reviewer_grades(&batch, None), Decision::NoAction);
    }

    #[test]
    fn test_reviewer_single_grade_overridden() {
        let batch = reviewer(Some((2, Some(91.567))), &[(Some(91.567), Some(82.32105))]);
        assert_eq!(aggregator().aggregate_reviewer_grades(&batch, None), update(82.32105));
    }

    #[test]
    fn test_reviewer_multiple_grades_new() {
        let rows = [(Some(99.4567), None), (Some(87.34311), None), (Some(51.12), None)];
        let batch = reviewer(None, &rows);
        assert_eq!(
            aggregator().aggregate_reviewer_grades(&batch, None).value(),
            Some(g(79.3066))
        );
    }

    #[test]
    fn test_reviewer_multiple_grades_overridden() {
        let rows = [
            (Some(56.234), Some(99.4567)),
            (Some(87.34311), None),
            (Some(51.12), None),
        ];
        let batch = reviewer(Some((2, Some(64.89904))), &rows);
        assert_eq!(aggregator().aggregate_reviewer_grades(&batch, None), update(79.3066));
    }

    #[test]
    fn test_reviewer_multiple_grades_one_missing() {
        let rows = [(Some(50.0), None), (None, None), (Some(52.2), None)];
        let batch = reviewer(Some((3, Some(100.0))), &rows);
        assert_eq!(aggregator().aggregate_reviewer_grades(&batch, None), update(51.1));
    }

    #[test]
    fn test_reviewer_override_without_grade() {
        let rows = [(Some(50.0), None), (None, Some(69.0)), (Some(52.2), None)];
        let batch = reviewer(Some((3, Some(100.0))), &rows);
        assert_eq!(aggregator().aggregate_reviewer_grades(&batch, None), update(57.06667));
    }

    #[test]
    fn test_reviewer_existing_without_grade_is_updated() {
        let batch = reviewer(Some((3, None)), &[(Some(40.0), None)]);
        assert_eq!(aggregator().aggregate_reviewer_grades(&batch, None), update(40.0));
    }

    #[test]
    fn test_free_functions_use_defaults() {
        let batch = submission(None, &[(0, Some(20.0))]);
        assert_eq!(aggregate_submission_grades(&batch).value(), Some(g(20.0)));

        let batch = reviewer(None, &[(Some(10.0), None)]);
        let decision = aggregate_reviewer_grades(&batch, Some(instant()));
        assert_eq!(
            decision,
            Decision::Insert {
                value: g(10.0),
                timestamp: instant()
            }
        );
    }
}
