//! Data types used by the aggregation engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::grade::Grade;

pub type SubmissionId = u64;
pub type ReviewerId = u64;
pub type AggregationId = u64;
pub type ModuleId = u64;

/// A single peer assessment of a submission, as stored by the collaborator.
///
/// `submission_grade` is the currently persisted aggregate and is repeated on
/// every row of the same submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentGradeRow {
    pub submission_id: SubmissionId,
    pub submission_grade: Option<Grade>,
    pub weight: u32,
    pub grade: Option<Grade>,
}

/// A single grading-quality observation of a reviewer.
///
/// The `existing_*` columns describe the reviewer's persisted aggregation
/// record and are repeated on every row of the same reviewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewerGradeRow {
    pub reviewer_id: ReviewerId,
    pub grading_grade: Option<Grade>,
    pub grading_grade_override: Option<Grade>,
    pub existing_aggregation_id: Option<AggregationId>,
    pub existing_aggregated_grade: Option<Grade>,
}

/// One weighted peer grade inside a [`SubmissionBatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssessmentObservation {
    pub weight: u32,
    pub grade: Option<Grade>,
}

/// All assessments of one submission plus its persisted aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionBatch {
    pub submission_id: SubmissionId,
    pub current_grade: Option<Grade>,
    pub rows: Vec<AssessmentObservation>,
}

/// One grading grade inside a [`ReviewerBatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradingObservation {
    pub grading_grade: Option<Grade>,
    pub grading_grade_override: Option<Grade>,
}

impl GradingObservation {
    /// The override when present, the computed grading grade otherwise.
    pub fn effective(&self) -> Option<Grade> {
        self.grading_grade_override.or(self.grading_grade)
    }
}

/// The persisted aggregation record a reviewer batch was read against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExistingAggregation {
    pub id: AggregationId,
    pub aggregated_grade: Option<Grade>,
}

/// All grading grades of one reviewer within one activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewerBatch {
    pub owner_module_id: ModuleId,
    pub reviewer_id: ReviewerId,
    pub existing: Option<ExistingAggregation>,
    pub rows: Vec<GradingObservation>,
}

impl ReviewerBatch {
    /// Materializes an insert decision into a new record.
    ///
    /// Returns `None` for any other decision. The record has no id until the
    /// storage collaborator assigns one.
    pub fn insert_record(&self, decision: &Decision) -> Option<AggregationRecord> {
        match *decision {
            Decision::Insert { value, timestamp } => Some(AggregationRecord {
                id: None,
                owner_module_id: self.owner_module_id,
                user_id: self.reviewer_id,
                aggregated_grade: value,
                time_graded: timestamp,
            }),
            _ => None,
        }
    }
}

/// Reviewer aggregation record owned by the storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationRecord {
    pub id: Option<AggregationId>,
    pub owner_module_id: ModuleId,
    pub user_id: ReviewerId,
    pub aggregated_grade: Grade,
    pub time_graded: DateTime<Utc>,
}

impl AggregationRecord {
    /// Applies an update decision in place. Returns whether anything changed.
    pub fn apply(&mut self, decision: &Decision) -> bool {
        match *decision {
            Decision::Update { value, timestamp } => {
                self.aggregated_grade = value;
                self.time_graded = timestamp;
                true
            }
            _ => false,
        }
    }
}

/// Minimal-diff persistence decision emitted by an aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Decision {
    NoAction,
    Insert {
        value: Grade,
        timestamp: DateTime<Utc>,
    },
    Update {
        value: Grade,
        timestamp: DateTime<Utc>,
    },
}

impl Decision {
    /// The value to persist, if any.
    pub fn value(&self) -> Option<Grade> {
        match *self {
            Decision::NoAction => None,
            Decision::Insert { value, .. } | Decision::Update { value, .. } => Some(value),
        }
    }

    pub fn is_no_action(&self) -> bool {
        matches!(self, Decision::NoAction)
    }

    /// Short lower-case label, used in logs and decision records.
    pub fn label(&self) -> &'static str {
        match self {
            Decision::NoAction => "no_action",
            Decision::Insert { .. } => "insert",
            Decision::Update { .. } => "update",
        }
    }
}
