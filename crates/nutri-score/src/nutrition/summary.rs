use super::category::FoodCategory;
use super::grade::NutriGrade;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeCount {
    pub grade: NutriGrade,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub category: FoodCategory,
    pub count: usize,
}

/// Aggregate view over a scored batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoringSummary {
    pub total: usize,
    pub scored: usize,
    pub graded: usize,
    pub mean_score: Option<f64>,
    pub grades: Vec<GradeCount>,
    pub categories: Vec<CategoryCount>,
}

#[derive(Debug, Default)]
pub struct SummaryBuilder {
    total: usize,
    score_sum: i64,
    scored: usize,
    grades: BTreeMap<NutriGrade, usize>,
    categories: BTreeMap<FoodCategory, usize>,
}

impl SummaryBuilder {
    pub fn record(
        &mut self,
        category: Option<FoodCategory>,
        score: Option<i32>,
        grade: Option<NutriGrade>,
    ) {
        self.total += 1;
        if let Some(category) = category {
            *self.categories.entry(category).or_default() += 1;
        }
        if let Some(score) = score {
            self.scored += 1;
            self.score_sum += i64::from(score);
        }
        if let Some(grade) = grade {
            *self.grades.entry(grade).or_default() += 1;
        }
    }

    pub fn finish(self) -> ScoringSummary {
        let graded = self.grades.values().sum();
        let mean_score = (self.scored > 0).then(|| self.score_sum as f64 / self.scored as f64);

        let grades = NutriGrade::ALL
            .into_iter()
            .map(|grade| GradeCount {
                grade,
                count: self.grades.get(&grade).copied().unwrap_or(0),
            })
            .collect();

        let categories = self
            .categories
            .into_iter()
            .map(|(category, count)| CategoryCount { category, count })
            .collect();

        ScoringSummary {
            total: self.total,
            scored: self.scored,
            graded,
            mean_score,
            grades,
            categories,
        }
    }
}
