use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Single cell of a product row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    #[default]
    Missing,
}

impl FieldValue {
    /// Treats NaN as missing, matching how the source datasets encode gaps.
    pub fn is_missing(&self) -> bool {
        match self {
            FieldValue::Missing => true,
            FieldValue::Number(value) => value.is_nan(),
            FieldValue::Text(_) => false,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(value) if !value.is_nan() => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(value) if value.is_nan() => Ok(()),
            FieldValue::Number(value) => write!(f, "{value}"),
            FieldValue::Text(value) => f.write_str(value),
            FieldValue::Missing => Ok(()),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Missing)
    }
}

/// One product row keyed by column name. Absent keys read as missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    fields: HashMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn number(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(FieldValue::as_number)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(FieldValue::as_text)
    }

    pub fn is_missing(&self, field: &str) -> bool {
        self.get(field).map(FieldValue::is_missing).unwrap_or(true)
    }

    /// Number of non-missing cells in the row.
    pub fn filled_count(&self) -> usize {
        self.fields.values().filter(|value| !value.is_missing()).count()
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (field, value) in iter {
            record.set(field, value);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nan_and_absent_fields_read_as_missing() {
        let record = Record::new()
            .with("energy_100g", f64::NAN)
            .with("pnns_groups_2", "Cheese");

        assert!(record.is_missing("energy_100g"));
        assert!(record.is_missing("sugars_100g"));
        assert_eq!(record.number("energy_100g"), None);
        assert_eq!(record.text("pnns_groups_2"), Some("Cheese"));
        assert_eq!(record.filled_count(), 1);
    }

    #[test]
    fn optional_values_convert_to_missing() {
        let record = Record::new().with("fiber_100g", None::<f64>);
        assert_eq!(record.get("fiber_100g"), Some(&FieldValue::Missing));
        assert_eq!(FieldValue::default(), FieldValue::Missing);
    }
}
