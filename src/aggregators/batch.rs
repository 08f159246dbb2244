//! Grouping of flat collaborator rows into batches.
//!
//! The collaborator repeats the persisted aggregate on every row. Grouping
//! lifts it into a single current-state value per batch and rejects batches
//! whose rows disagree on it.

use std::collections::HashMap;

use tracing::warn;

use crate::aggregators::types::{
    AssessmentGradeRow, AssessmentObservation, ExistingAggregation, GradingObservation, ModuleId,
    ReviewerBatch, ReviewerGradeRow, SubmissionBatch,
};
use crate::error::{GradingError, Result};
use crate::grade::Grade;

/// Groups assessment rows by submission, in first-seen order.
///
/// Grades above the 100-point scale are kept and logged.
///
/// # Errors
///
/// Returns [`GradingError::InconsistentBatch`] if rows of one submission
/// carry different `submission_grade` values.
pub fn group_submission_rows<I>(rows: I) -> Result<Vec<SubmissionBatch>>
where
    I: IntoIterator<Item = AssessmentGradeRow>,
{
    let mut batches: Vec<SubmissionBatch> = Vec::new();
    let mut index: HashMap<u64, usize> = HashMap::new();

    for row in rows {
        warn_off_scale("submission", row.submission_id, row.grade);
        let observation = AssessmentObservation {
            weight: row.weight,
            grade: row.grade,
        };

        match index.get(&row.submission_id).copied() {
            Some(i) => {
                let batch = &mut batches[i];
                if batch.current_grade != row.submission_grade {
                    return Err(GradingError::InconsistentBatch {
                        batch: "submission",
                        id: row.submission_id,
                        reason: format!(
                            "rows disagree on the stored grade ({:?} vs {:?})",
                            batch.current_grade, row.submission_grade
                        ),
                    });
                }
                batch.rows.push(observation);
            }
            None => {
                index.insert(row.submission_id, batches.len());
                batches.push(SubmissionBatch {
                    submission_id: row.submission_id,
                    current_grade: row.submission_grade,
                    rows: vec![observation],
                });
            }
        }
    }

    Ok(batches)
}

/// Groups grading-grade rows by reviewer, in first-seen order.
///
/// # Errors
///
/// Returns [`GradingError::InconsistentBatch`] if rows of one reviewer
/// disagree on the existing aggregation, or carry an aggregated grade
/// without an aggregation id.
pub fn group_reviewer_rows<I>(owner_module_id: ModuleId, rows: I) -> Result<Vec<ReviewerBatch>>
where
    I: IntoIterator<Item = ReviewerGradeRow>,
{
    let mut batches: Vec<ReviewerBatch> = Vec::new();
    let mut index: HashMap<u64, usize> = HashMap::new();

    for row in rows {
        let existing = existing_aggregation(&row)?;
        warn_off_scale("reviewer", row.reviewer_id, row.grading_grade);
        warn_off_scale("reviewer", row.reviewer_id, row.grading_grade_override);
        let observation = GradingObservation {
            grading_grade: row.grading_grade,
            grading_grade_override: row.grading_grade_override,
        };

        match index.get(&row.reviewer_id).copied() {
            Some(i) => {
                let batch = &mut batches[i];
                if batch.existing != existing {
                    return Err(GradingError::InconsistentBatch {
                        batch: "reviewer",
                        id: row.reviewer_id,
                        reason: format!(
                            "rows disagree on the existing aggregation ({:?} vs {:?})",
                            batch.existing, existing
                        ),
                    });
                }
                batch.rows.push(observation);
            }
            None => {
                index.insert(row.reviewer_id, batches.len());
                batches.push(ReviewerBatch {
                    owner_module_id,
                    reviewer_id: row.reviewer_id,
                    existing,
                    rows: vec![observation],
                });
            }
        }
    }

    Ok(batches)
}

fn warn_off_scale(batch: &'static str, id: u64, grade: Option<Grade>) {
    if let Some(grade) = grade.filter(|g| !g.is_on_scale()) {
        warn!(batch, id, %grade, "Grade above the 100-point scale");
    }
}

fn existing_aggregation(row: &ReviewerGradeRow) -> Result<Option<ExistingAggregation>> {
    match (row.existing_aggregation_id, row.existing_aggregated_grade) {
        (Some(id), aggregated_grade) => Ok(Some(ExistingAggregation {
            id,
            aggregated_grade,
        })),
        (None, None) => Ok(None),
        (None, Some(grade)) => Err(GradingError::InconsistentBatch {
            batch: "reviewer",
            id: row.reviewer_id,
            reason: format!("aggregated grade {grade} without an aggregation id"),
        }),
    }
}
