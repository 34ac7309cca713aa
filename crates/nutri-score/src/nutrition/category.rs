use crate::record::Record;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Column holding the PNNS group label in Open Food Facts exports.
pub const DEFAULT_GROUP_FIELD: &str = "pnns_groups_2";

/// Food bucket selecting the threshold table and field mapping used for scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodCategory {
    Solid,
    Beverage,
    Cheese,
    AddedFats,
}

impl FoodCategory {
    /// Classifies a PNNS group label. First matching rule wins.
    pub fn from_group(group: &str) -> Self {
        if is_beverage_group(group) {
            FoodCategory::Beverage
        } else if group == "Cheese" {
            FoodCategory::Cheese
        } else if group == "Fats" {
            FoodCategory::AddedFats
        } else {
            FoodCategory::Solid
        }
    }

    /// Reads the group field of a record; `None` when the field is missing or not text.
    pub fn classify(record: &Record, group_field: &str) -> Option<Self> {
        record.text(group_field).map(Self::from_group)
    }

    pub fn key(&self) -> &'static str {
        match self {
            FoodCategory::Solid => "solid",
            FoodCategory::Beverage => "beverage",
            FoodCategory::Cheese => "cheese",
            FoodCategory::AddedFats => "added_fats",
        }
    }

    /// Minimum fruits-vegetables-nuts points needed to keep protein credit
    /// once negative points reach the cap.
    pub(crate) fn protein_credit_threshold(&self) -> u32 {
        match self {
            FoodCategory::Beverage => 10,
            _ => 5,
        }
    }
}

impl fmt::Display for FoodCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Coarser bucket used when mapping scores to letter grades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GradeCategory {
    Beverage,
    NonBeverage,
}

impl GradeCategory {
    pub fn from_group(group: &str) -> Self {
        if is_beverage_group(group) {
            GradeCategory::Beverage
        } else {
            GradeCategory::NonBeverage
        }
    }

    pub fn classify(record: &Record, group_field: &str) -> Option<Self> {
        record.text(group_field).map(Self::from_group)
    }
}

impl From<FoodCategory> for GradeCategory {
    fn from(category: FoodCategory) -> Self {
        match category {
            FoodCategory::Beverage => GradeCategory::Beverage,
            _ => GradeCategory::NonBeverage,
        }
    }
}

fn is_beverage_group(group: &str) -> bool {
    group.contains("beverage") || group == "Fruit nectars"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_rules_apply_in_order() {
        assert_eq!(
            FoodCategory::from_group("Non-sugared beverages"),
            FoodCategory::Beverage
        );
        assert_eq!(
            FoodCategory::from_group("Fruit nectars"),
            FoodCategory::Beverage
        );
        assert_eq!(FoodCategory::from_group("Cheese"), FoodCategory::Cheese);
        assert_eq!(FoodCategory::from_group("Fats"), FoodCategory::AddedFats);
        assert_eq!(FoodCategory::from_group("Bread"), FoodCategory::Solid);
        // Matching is exact and case sensitive.
        assert_eq!(FoodCategory::from_group("cheese"), FoodCategory::Solid);
        assert_eq!(FoodCategory::from_group("Beverages"), FoodCategory::Solid);
    }

    #[test]
    fn missing_group_yields_no_category() {
        let record = Record::new().with(DEFAULT_GROUP_FIELD, f64::NAN);
        assert_eq!(FoodCategory::classify(&record, DEFAULT_GROUP_FIELD), None);
        assert_eq!(GradeCategory::classify(&record, DEFAULT_GROUP_FIELD), None);
    }

    #[test]
    fn grading_collapses_everything_but_beverages() {
        assert_eq!(
            GradeCategory::from_group("Sweetened beverages"),
            GradeCategory::Beverage
        );
        assert_eq!(GradeCategory::from_group("Cheese"), GradeCategory::NonBeverage);
        assert_eq!(
            GradeCategory::from(FoodCategory::AddedFats),
            GradeCategory::NonBeverage
        );
    }
}
