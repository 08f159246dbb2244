//! Peer-assessment grade aggregation.
//!
//! Turns batches of per-reviewer grade observations into aggregate grades and
//! a minimal-diff persistence [`Decision`]: nothing, insert, or update.
//! Re-running an aggregation over unchanged inputs yields
//! [`Decision::NoAction`], so callers may re-aggregate on every grading change.

pub mod aggregate;
pub mod batch;
pub mod clock;
pub mod types;

pub use aggregate::{
    GradeAggregator, ZeroWeightPolicy, aggregate_reviewer_grades, aggregate_submission_grades,
};
pub use batch::{group_reviewer_rows, group_submission_rows};
pub use clock::{Clock, FixedClock, SystemClock};
pub use types::{
    AggregationRecord, AssessmentGradeRow, AssessmentObservation, Decision, ExistingAggregation,
    GradingObservation, ReviewerBatch, ReviewerGradeRow, SubmissionBatch,
};
