use serde::{Deserialize, Serialize};
use std::fmt;

/// Nutritional axis contributing points to the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Component {
    Energy,
    Sugars,
    SaturatedFat,
    Salt,
    Fiber,
    Proteins,
    FruitsVegetablesNuts,
}

impl Component {
    /// Components whose points penalize the product.
    pub const NEGATIVE: [Component; 4] = [
        Component::Energy,
        Component::Sugars,
        Component::SaturatedFat,
        Component::Salt,
    ];

    /// Components whose points reward the product.
    pub const POSITIVE: [Component; 3] = [
        Component::Fiber,
        Component::Proteins,
        Component::FruitsVegetablesNuts,
    ];

    pub const ALL: [Component; 7] = [
        Component::Energy,
        Component::Sugars,
        Component::SaturatedFat,
        Component::Salt,
        Component::Fiber,
        Component::Proteins,
        Component::FruitsVegetablesNuts,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Component::Energy => "energy",
            Component::Sugars => "sugars",
            Component::SaturatedFat => "saturated-fat",
            Component::Salt => "salt",
            Component::Fiber => "fiber",
            Component::Proteins => "proteins",
            Component::FruitsVegetablesNuts => "fruits-vegetables-nuts",
        }
    }

    pub fn is_negative(&self) -> bool {
        Self::NEGATIVE.contains(self)
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
