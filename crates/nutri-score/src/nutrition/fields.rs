use super::category::{FoodCategory, DEFAULT_GROUP_FIELD};
use super::component::Component;
use crate::record::Record;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Column(s) supplying a component's value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldSource {
    Single(String),
    Sum(Vec<String>),
}

impl FieldSource {
    pub fn single(field: &str) -> Self {
        Self::Single(field.to_string())
    }

    pub fn sum(fields: &[&str]) -> Self {
        Self::Sum(fields.iter().map(|field| field.to_string()).collect())
    }

    /// A missing single field reads as zero. Summed fields skip missing contributions.
    fn read(&self, record: &Record) -> f64 {
        match self {
            FieldSource::Single(field) => record.number(field).unwrap_or(0.0),
            FieldSource::Sum(fields) => fields
                .iter()
                .filter_map(|field| record.number(field))
                .sum(),
        }
    }
}

/// Where each component is read from, per category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMapping {
    pub group_field: String,
    pub defaults: BTreeMap<Component, FieldSource>,
    #[serde(default)]
    pub overrides: BTreeMap<FoodCategory, BTreeMap<Component, FieldSource>>,
}

impl FieldMapping {
    /// Open Food Facts `*_100g` columns. Salt is read from the sodium column.
    pub fn standard() -> Self {
        let defaults = BTreeMap::from([
            (Component::Energy, FieldSource::single("energy_100g")),
            (Component::Sugars, FieldSource::single("sugars_100g")),
            (
                Component::SaturatedFat,
                FieldSource::single("saturated-fat_100g"),
            ),
            (Component::Salt, FieldSource::single("sodium_100g")),
            (Component::Fiber, FieldSource::single("fiber_100g")),
            (Component::Proteins, FieldSource::single("proteins_100g")),
            (
                Component::FruitsVegetablesNuts,
                FieldSource::single("fruits-vegetables-nuts_100g"),
            ),
        ]);

        let overrides = BTreeMap::from([(
            FoodCategory::AddedFats,
            BTreeMap::from([(
                Component::SaturatedFat,
                FieldSource::sum(&[
                    "saturated-fat_100g",
                    "monounsaturated-fat_100g",
                    "polyunsaturated-fat_100g",
                ]),
            )]),
        )]);

        Self {
            group_field: DEFAULT_GROUP_FIELD.to_string(),
            defaults,
            overrides,
        }
    }

    pub fn with_group_field(mut self, group_field: impl Into<String>) -> Self {
        self.group_field = group_field.into();
        self
    }

    /// Category-specific source, else the component default.
    pub fn source(&self, component: Component, category: FoodCategory) -> Option<&FieldSource> {
        self.overrides
            .get(&category)
            .and_then(|sources| sources.get(&component))
            .or_else(|| self.defaults.get(&component))
    }

    /// Component value for the record; unmapped components read as zero.
    pub fn value(&self, record: &Record, component: Component, category: FoodCategory) -> f64 {
        self.source(component, category)
            .map(|source| source.read(record))
            .unwrap_or(0.0)
    }

    pub fn category(&self, record: &Record) -> Option<FoodCategory> {
        FoodCategory::classify(record, &self.group_field)
    }
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_single_field_reads_as_zero() {
        let mapping = FieldMapping::standard();
        let record = Record::new().with("sugars_100g", f64::NAN);

        assert_eq!(
            mapping.value(&record, Component::Sugars, FoodCategory::Solid),
            0.0
        );
        assert_eq!(
            mapping.value(&record, Component::Energy, FoodCategory::Solid),
            0.0
        );
    }

    #[test]
    fn salt_reads_from_sodium_column() {
        let mapping = FieldMapping::standard();
        let record = Record::new()
            .with("salt_100g", 2.5)
            .with("sodium_100g", 1.0);

        assert_eq!(
            mapping.value(&record, Component::Salt, FoodCategory::Solid),
            1.0
        );
    }

    #[test]
    fn added_fats_sum_all_fat_columns() {
        let mapping = FieldMapping::standard();
        let record = Record::new()
            .with("saturated-fat_100g", 10.0)
            .with("monounsaturated-fat_100g", 20.0)
            .with("polyunsaturated-fat_100g", 5.5);

        assert_eq!(
            mapping.value(&record, Component::SaturatedFat, FoodCategory::AddedFats),
            35.5
        );
        assert_eq!(
            mapping.value(&record, Component::SaturatedFat, FoodCategory::Solid),
            10.0
        );
    }

    #[test]
    fn summed_fields_skip_missing_contributions() {
        let mapping = FieldMapping::standard();
        let record = Record::new()
            .with("saturated-fat_100g", 12.0)
            .with("monounsaturated-fat_100g", f64::NAN);

        assert_eq!(
            mapping.value(&record, Component::SaturatedFat, FoodCategory::AddedFats),
            12.0
        );
    }

    #[test]
    fn mapping_round_trips_through_json() {
        let json = serde_json::to_string(&FieldMapping::standard()).expect("serialize mapping");
        assert!(json.contains("\"added_fats\""));
        let parsed: FieldMapping = serde_json::from_str(&json).expect("parse mapping");
        assert_eq!(parsed, FieldMapping::standard());
    }
}
