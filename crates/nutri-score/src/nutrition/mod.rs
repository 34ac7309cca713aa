//! Nutri-Score computation: rubric compilation, per-record scoring and grading.
//!
//! The threshold table is compiled once and only read afterwards, so a
//! [`NutriScore`] can be shared across threads while scoring a batch.

mod category;
mod component;
mod fields;
mod grade;
mod score;
mod summary;
mod thresholds;

pub use category::{FoodCategory, GradeCategory, DEFAULT_GROUP_FIELD};
pub use component::Component;
pub use fields::{FieldMapping, FieldSource};
pub use grade::{NutriGrade, NutriGrader};
pub use score::{ComponentPoints, NutriScore, ScoreBreakdown};
pub use summary::{CategoryCount, GradeCount, ScoringSummary, SummaryBuilder};
pub use thresholds::{
    Bins, Comparison, EdgeDefinition, EdgeOptions, ResolvedBins, RubricDefinition, RubricError,
    ThresholdTable, SENTINEL_EDGE,
};

use crate::record::Record;

/// Output column names for an annotation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputColumns {
    pub score: String,
    pub grade: String,
}

impl Default for OutputColumns {
    fn default() -> Self {
        Self {
            score: "NutriScore".to_string(),
            grade: "NutriGrade".to_string(),
        }
    }
}

/// Scores then grades every record in place and summarizes the batch.
pub fn annotate(
    scorer: &NutriScore<'_>,
    records: &mut [Record],
    columns: &OutputColumns,
    parallel: bool,
) -> ScoringSummary {
    if parallel {
        scorer.compute_into_parallel(records, &columns.score, None);
    } else {
        scorer.compute_into(records, &columns.score, None);
    }

    let grader = NutriGrader::new(scorer.fields().group_field.clone());
    grader.compute_into(records, &columns.score, &columns.grade, None);

    let mut summary = SummaryBuilder::default();
    for record in records.iter() {
        let score = record.number(&columns.score).map(|score| score as i32);
        let grade = record
            .text(&columns.grade)
            .and_then(|letter| NutriGrade::ALL.into_iter().find(|grade| grade.letter() == letter));
        summary.record(scorer.category(record), score, grade);
    }
    summary.finish()
}
