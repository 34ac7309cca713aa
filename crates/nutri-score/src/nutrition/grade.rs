use super::category::{GradeCategory, DEFAULT_GROUP_FIELD};
use crate::record::{FieldValue, Record};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// Letter grade, `A` being the healthiest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NutriGrade {
    A,
    B,
    C,
    D,
    E,
}

impl NutriGrade {
    pub const ALL: [NutriGrade; 5] = [
        NutriGrade::A,
        NutriGrade::B,
        NutriGrade::C,
        NutriGrade::D,
        NutriGrade::E,
    ];

    /// Maps a score with the rubric's comparison chain, first match wins.
    ///
    /// The chain is kept as published: scores below -15 fall through to `B`,
    /// and scores above 40 have no grade.
    pub fn from_score(score: f64) -> Option<Self> {
        if (-15.0..=-1.0).contains(&score) {
            Some(NutriGrade::A)
        } else if score <= -2.0 {
            Some(NutriGrade::B)
        } else if score <= 10.0 {
            Some(NutriGrade::C)
        } else if score <= 18.0 {
            Some(NutriGrade::D)
        } else if score <= 40.0 {
            Some(NutriGrade::E)
        } else {
            None
        }
    }

    /// Beverages and unclassified products are not graded.
    pub fn for_category(score: Option<f64>, category: Option<GradeCategory>) -> Option<Self> {
        match (category?, score) {
            (GradeCategory::Beverage, _) => None,
            (GradeCategory::NonBeverage, Some(score)) if !score.is_nan() => Self::from_score(score),
            (GradeCategory::NonBeverage, _) => None,
        }
    }

    pub fn letter(&self) -> &'static str {
        match self {
            NutriGrade::A => "a",
            NutriGrade::B => "b",
            NutriGrade::C => "c",
            NutriGrade::D => "d",
            NutriGrade::E => "e",
        }
    }
}

impl fmt::Display for NutriGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.letter())
    }
}

impl From<NutriGrade> for FieldValue {
    fn from(grade: NutriGrade) -> Self {
        FieldValue::Text(grade.letter().to_string())
    }
}

/// Derives grades from a score column already present on the records.
#[derive(Debug, Clone)]
pub struct NutriGrader {
    group_field: String,
}

impl Default for NutriGrader {
    fn default() -> Self {
        Self::new(DEFAULT_GROUP_FIELD)
    }
}

impl NutriGrader {
    pub fn new(group_field: impl Into<String>) -> Self {
        Self {
            group_field: group_field.into(),
        }
    }

    pub fn category(&self, record: &Record) -> Option<GradeCategory> {
        GradeCategory::classify(record, &self.group_field)
    }

    pub fn grade(
        &self,
        record: &Record,
        score_column: &str,
        category: Option<GradeCategory>,
    ) -> Option<NutriGrade> {
        let category = category.or_else(|| self.category(record));
        NutriGrade::for_category(record.number(score_column), category)
    }

    pub fn compute(
        &self,
        records: &[Record],
        score_column: &str,
        category: Option<GradeCategory>,
    ) -> Vec<Option<NutriGrade>> {
        records
            .iter()
            .map(|record| self.grade(record, score_column, category))
            .collect()
    }

    /// Writes each grade into `column`; returns how many records were graded.
    pub fn compute_into(
        &self,
        records: &mut [Record],
        score_column: &str,
        column: &str,
        category: Option<GradeCategory>,
    ) -> usize {
        let mut graded = 0;
        for record in records.iter_mut() {
            let grade = self.grade(record, score_column, category);
            if grade.is_some() {
                graded += 1;
            }
            record.set(column, FieldValue::from(grade));
        }

        info!(column, total = records.len(), graded, "computed nutri-grades");
        graded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparison_chain_is_applied_literally() {
        assert_eq!(NutriGrade::from_score(-1.0), Some(NutriGrade::A));
        assert_eq!(NutriGrade::from_score(-15.0), Some(NutriGrade::A));
        assert_eq!(NutriGrade::from_score(-16.0), Some(NutriGrade::B));
        assert_eq!(NutriGrade::from_score(-0.5), Some(NutriGrade::C));
        assert_eq!(NutriGrade::from_score(0.0), Some(NutriGrade::C));
        assert_eq!(NutriGrade::from_score(10.0), Some(NutriGrade::C));
        assert_eq!(NutriGrade::from_score(11.0), Some(NutriGrade::D));
        assert_eq!(NutriGrade::from_score(18.0), Some(NutriGrade::D));
        assert_eq!(NutriGrade::from_score(19.0), Some(NutriGrade::E));
        assert_eq!(NutriGrade::from_score(40.0), Some(NutriGrade::E));
        assert_eq!(NutriGrade::from_score(41.0), None);
    }

    #[test]
    fn beverages_and_unknown_groups_are_not_graded() {
        let grader = NutriGrader::default();
        let beverage = Record::new()
            .with(DEFAULT_GROUP_FIELD, "Sweetened beverages")
            .with("NutriScore", 3.0);
        let unknown = Record::new().with("NutriScore", 3.0);
        let unscored = Record::new().with(DEFAULT_GROUP_FIELD, "Cheese");

        assert_eq!(grader.grade(&beverage, "NutriScore", None), None);
        assert_eq!(grader.grade(&unknown, "NutriScore", None), None);
        assert_eq!(grader.grade(&unscored, "NutriScore", None), None);
        assert_eq!(
            grader.grade(&unknown, "NutriScore", Some(GradeCategory::NonBeverage)),
            Some(NutriGrade::C)
        );
    }

    #[test]
    fn compute_into_writes_letters() {
        let grader = NutriGrader::default();
        let mut records = vec![
            Record::new()
                .with(DEFAULT_GROUP_FIELD, "Cheese")
                .with("NutriScore", 15.0),
            Record::new()
                .with(DEFAULT_GROUP_FIELD, "Fruit nectars")
                .with("NutriScore", 2.0),
        ];

        let graded = grader.compute_into(&mut records, "NutriScore", "NutriGrade", None);

        assert_eq!(graded, 1);
        assert_eq!(records[0].text("NutriGrade"), Some("d"));
        assert!(records[1].is_missing("NutriGrade"));
    }
}
