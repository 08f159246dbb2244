//! CSV readers for collaborator row exports.
//!
//! Empty cells deserialize to `None`, so ungraded assessments and missing
//! overrides are plain blanks.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::aggregators::{AssessmentGradeRow, ReviewerGradeRow};
use crate::error::Result;

/// Deserializes every record of a headed CSV stream.
///
/// # Errors
///
/// Returns an error on malformed CSV, or on a negative or non-finite grade.
pub fn parse_rows<T, R>(reader: R) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut rows = Vec::new();

    for result in rdr.deserialize() {
        let record: T = result?;
        rows.push(record);
    }

    Ok(rows)
}

/// Reads assessment rows (`submission_id,submission_grade,weight,grade`).
pub fn load_assessment_rows(path: impl AsRef<Path>) -> Result<Vec<AssessmentGradeRow>> {
    parse_rows(File::open(path)?)
}

/// Reads grading-grade rows (`reviewer_id,grading_grade,grading_grade_override,
/// existing_aggregation_id,existing_aggregated_grade`).
pub fn load_reviewer_rows(path: impl AsRef<Path>) -> Result<Vec<ReviewerGradeRow>> {
    parse_rows(File::open(path)?)
}
