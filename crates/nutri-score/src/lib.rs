pub mod config;
pub mod dataset;
pub mod error;
pub mod nutrition;
pub mod record;
pub mod telemetry;

pub use nutrition::{FoodCategory, NutriGrade, NutriGrader, NutriScore, ThresholdTable};
pub use record::{FieldValue, Record};
