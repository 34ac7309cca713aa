use super::category::FoodCategory;
use super::component::Component;
use super::fields::FieldMapping;
use super::thresholds::{RubricError, ThresholdTable};
use crate::record::{FieldValue, Record};
use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

/// Negative points at which protein credit becomes conditional.
const PROTEIN_CAP_NEGATIVE_POINTS: u32 = 11;

/// Points awarded for one component, kept for audits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentPoints {
    pub component: Component,
    pub value: f64,
    pub points: u32,
    /// False when the component was computed but left out of the total.
    pub counted: bool,
}

/// Full derivation of a record's score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub category: FoodCategory,
    pub components: Vec<ComponentPoints>,
    pub negative_points: u32,
    pub positive_points: u32,
    pub fruits_vegetables_nuts_points: u32,
    pub proteins_excluded: bool,
    pub score: i32,
}

impl ScoreBreakdown {
    pub fn points_for(&self, component: Component) -> Option<&ComponentPoints> {
        self.components
            .iter()
            .find(|entry| entry.component == component)
    }
}

/// Stateless scorer parameterized by a compiled rubric and a field mapping.
#[derive(Debug, Clone)]
pub struct NutriScore<'t> {
    table: &'t ThresholdTable,
    fields: FieldMapping,
}

impl NutriScore<'static> {
    /// Scorer over the built-in rubric and Open Food Facts columns.
    pub fn standard() -> Result<Self, RubricError> {
        Ok(Self::new(ThresholdTable::standard()?, FieldMapping::standard()))
    }
}

impl<'t> NutriScore<'t> {
    pub fn new(table: &'t ThresholdTable, fields: FieldMapping) -> Self {
        Self { table, fields }
    }

    pub fn table(&self) -> &ThresholdTable {
        self.table
    }

    pub fn fields(&self) -> &FieldMapping {
        &self.fields
    }

    pub fn category(&self, record: &Record) -> Option<FoodCategory> {
        self.fields.category(record)
    }

    pub fn component_value(
        &self,
        record: &Record,
        component: Component,
        category: FoodCategory,
    ) -> f64 {
        self.fields.value(record, component, category)
    }

    pub fn component_score(&self, value: f64, component: Component, category: FoodCategory) -> u32 {
        self.table.component_score(value, component, category)
    }

    /// Scores the record, classifying it when no category is given.
    ///
    /// Returns `None` when the category cannot be resolved.
    pub fn breakdown(
        &self,
        record: &Record,
        category: Option<FoodCategory>,
    ) -> Option<ScoreBreakdown> {
        let category = category.or_else(|| self.category(record))?;

        let points = |component: Component| {
            let value = self.component_value(record, component, category);
            ComponentPoints {
                component,
                value,
                points: self.component_score(value, component, category),
                counted: true,
            }
        };

        let mut components: Vec<ComponentPoints> =
            Component::NEGATIVE.into_iter().map(&points).collect();
        let negative_points: u32 = components.iter().map(|entry| entry.points).sum();

        let fruits_vegetables_nuts_points = points(Component::FruitsVegetablesNuts).points;
        let proteins_excluded = negative_points >= PROTEIN_CAP_NEGATIVE_POINTS
            && fruits_vegetables_nuts_points < category.protein_credit_threshold();

        let mut positive_points = 0;
        for component in Component::POSITIVE {
            let mut entry = points(component);
            if proteins_excluded && component == Component::Proteins {
                entry.counted = false;
            } else {
                positive_points += entry.points;
            }
            components.push(entry);
        }

        Some(ScoreBreakdown {
            category,
            components,
            negative_points,
            positive_points,
            fruits_vegetables_nuts_points,
            proteins_excluded,
            score: negative_points as i32 - positive_points as i32,
        })
    }

    pub fn score(&self, record: &Record, category: Option<FoodCategory>) -> Option<i32> {
        self.breakdown(record, category)
            .map(|breakdown| breakdown.score)
    }

    /// One score per record, in input order.
    pub fn compute(&self, records: &[Record], category: Option<FoodCategory>) -> Vec<Option<i32>> {
        records
            .iter()
            .map(|record| self.score(record, category))
            .collect()
    }

    /// Same as [`NutriScore::compute`], spread across the rayon pool.
    pub fn compute_parallel(
        &self,
        records: &[Record],
        category: Option<FoodCategory>,
    ) -> Vec<Option<i32>> {
        records
            .par_iter()
            .map(|record| self.score(record, category))
            .collect()
    }

    /// Writes each score into `column`; unscorable records get a missing value.
    /// Returns how many records were scored.
    pub fn compute_into(
        &self,
        records: &mut [Record],
        column: &str,
        category: Option<FoodCategory>,
    ) -> usize {
        let scores = self.compute(records, category);
        write_scores(records, column, scores)
    }

    pub fn compute_into_parallel(
        &self,
        records: &mut [Record],
        column: &str,
        category: Option<FoodCategory>,
    ) -> usize {
        let scores = self.compute_parallel(records, category);
        write_scores(records, column, scores)
    }
}

fn write_scores(records: &mut [Record], column: &str, scores: Vec<Option<i32>>) -> usize {
    let total = records.len();
    let mut scored = 0;
    for (record, score) in records.iter_mut().zip(scores) {
        if score.is_some() {
            scored += 1;
        }
        record.set(column, FieldValue::from(score));
    }

    info!(column, total, scored, "computed nutri-scores");
    scored
}
