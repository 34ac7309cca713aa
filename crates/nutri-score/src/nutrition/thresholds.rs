use super::category::FoodCategory;
use super::component::Component;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::debug;

/// Raw edge value meaning "no threshold at this rank".
pub const SENTINEL_EDGE: f64 = -1.0;

static STANDARD_TABLE: OnceLock<Result<ThresholdTable, RubricError>> = OnceLock::new();

/// Comparison applied between a nutrient value and an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Comparison {
    #[default]
    #[serde(rename = "<=", alias = "≤")]
    LessOrEqual,
    #[serde(rename = "<")]
    Less,
}

impl Comparison {
    pub fn symbol(&self) -> &'static str {
        match self {
            Comparison::LessOrEqual => "<=",
            Comparison::Less => "<",
        }
    }

    fn holds(&self, value: f64, edge: f64) -> bool {
        match self {
            Comparison::LessOrEqual => value <= edge,
            Comparison::Less => value < edge,
        }
    }
}

/// Options attached to an edge list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeOptions {
    #[serde(default)]
    pub op: Comparison,
    /// Multiplier applied to every edge, e.g. unit conversion.
    #[serde(rename = "m", default = "unit_scale")]
    pub scale: f64,
}

impl Default for EdgeOptions {
    fn default() -> Self {
        Self {
            op: Comparison::LessOrEqual,
            scale: unit_scale(),
        }
    }
}

fn unit_scale() -> f64 {
    1.0
}

/// Edge list for one component, either bare or with options.
///
/// In JSON this is `[335, 670, ...]` or `[[10, 16, ...], {"op": "<"}]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EdgeDefinition {
    Plain(Vec<f64>),
    WithOptions(Vec<f64>, EdgeOptions),
}

impl EdgeDefinition {
    fn parts(&self) -> (&[f64], EdgeOptions) {
        match self {
            EdgeDefinition::Plain(edges) => (edges, EdgeOptions::default()),
            EdgeDefinition::WithOptions(edges, options) => (edges, *options),
        }
    }
}

/// Uncompiled rubric: category -> component -> edges.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RubricDefinition {
    pub categories: BTreeMap<FoodCategory, BTreeMap<Component, EdgeDefinition>>,
}

impl RubricDefinition {
    /// The 2017 Nutri-Score rubric. Salt edges are in mg and scaled to grams.
    pub fn standard() -> Self {
        use Component::*;
        use FoodCategory::*;

        let mut rubric = RubricDefinition::default();
        rubric.insert(
            Solid,
            Energy,
            EdgeDefinition::Plain(vec![
                335.0, 670.0, 1005.0, 1340.0, 1675.0, 2010.0, 2345.0, 2680.0, 3015.0, 3350.0,
            ]),
        );
        rubric.insert(
            Solid,
            Sugars,
            EdgeDefinition::Plain(vec![4.5, 9.0, 13.5, 18.0, 22.5, 27.0, 31.0, 36.0, 40.0, 45.0]),
        );
        rubric.insert(
            Solid,
            SaturatedFat,
            EdgeDefinition::Plain(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]),
        );
        rubric.insert(
            Solid,
            Salt,
            EdgeDefinition::WithOptions(
                vec![
                    90.0, 180.0, 270.0, 360.0, 450.0, 540.0, 630.0, 720.0, 810.0, 900.0,
                ],
                EdgeOptions {
                    op: Comparison::LessOrEqual,
                    scale: 1.0 / 1000.0,
                },
            ),
        );
        rubric.insert(
            Solid,
            Fiber,
            EdgeDefinition::Plain(vec![0.9, 1.9, 2.8, 3.7, 4.7]),
        );
        rubric.insert(
            Solid,
            Proteins,
            EdgeDefinition::Plain(vec![1.6, 3.2, 4.8, 6.4, 8.0]),
        );
        rubric.insert(
            Solid,
            FruitsVegetablesNuts,
            EdgeDefinition::Plain(vec![40.0, 40.0, 60.0, -1.0, -1.0, 80.0]),
        );

        rubric.insert(
            Beverage,
            Energy,
            EdgeDefinition::Plain(vec![
                0.0, 30.0, 60.0, 90.0, 120.0, 150.0, 180.0, 210.0, 240.0, 270.0,
            ]),
        );
        rubric.insert(
            Beverage,
            Sugars,
            EdgeDefinition::Plain(vec![0.0, 1.5, 3.0, 4.5, 6.0, 7.5, 9.0, 10.5, 12.0, 13.5]),
        );
        rubric.insert(
            Beverage,
            FruitsVegetablesNuts,
            EdgeDefinition::Plain(vec![
                40.0, -1.0, 60.0, -1.0, 80.0, -1.0, -1.0, -1.0, -1.0, -1.0, -1.0,
            ]),
        );

        rubric.insert(
            AddedFats,
            SaturatedFat,
            EdgeDefinition::WithOptions(
                vec![10.0, 16.0, 22.0, 28.0, 34.0, 40.0, 46.0, 52.0, 58.0, 64.0],
                EdgeOptions {
                    op: Comparison::Less,
                    scale: 1.0,
                },
            ),
        );

        rubric
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(reader)
    }

    pub fn insert(&mut self, category: FoodCategory, component: Component, edges: EdgeDefinition) {
        self.categories
            .entry(category)
            .or_default()
            .insert(component, edges);
    }
}

/// Construction-time failures; a rubric is either fully compiled or rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RubricError {
    #[error("rubric has no solid fallback for component '{component}'")]
    MissingFallback { component: Component },
    #[error("rubric entry {category}/{component} has no edges")]
    EmptyEdges {
        category: FoodCategory,
        component: Component,
    },
    #[error("rubric entry {category}/{component} has a non-finite edge at rank {rank}")]
    NonFiniteEdge {
        category: FoodCategory,
        component: Component,
        rank: usize,
    },
    #[error("rubric entry {category}/{component} has invalid scale {scale}")]
    InvalidScale {
        category: FoodCategory,
        component: Component,
        scale: f64,
    },
    #[error("rubric entry {category}/{component} decreases at rank {rank}")]
    UnorderedEdges {
        category: FoodCategory,
        component: Component,
        rank: usize,
    },
}

/// Compiled edges for one (category, component) pair. The index of an edge is its rank.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bins {
    comparison: Comparison,
    edges: Vec<Option<f64>>,
}

impl Bins {
    fn compile(
        category: FoodCategory,
        component: Component,
        definition: &EdgeDefinition,
    ) -> Result<Self, RubricError> {
        let (raw_edges, options) = definition.parts();

        if raw_edges.is_empty() {
            return Err(RubricError::EmptyEdges {
                category,
                component,
            });
        }
        if !options.scale.is_finite() || options.scale <= 0.0 {
            return Err(RubricError::InvalidScale {
                category,
                component,
                scale: options.scale,
            });
        }

        let mut edges = Vec::with_capacity(raw_edges.len());
        let mut previous: Option<f64> = None;
        for (rank, raw) in raw_edges.iter().copied().enumerate() {
            if raw == SENTINEL_EDGE {
                edges.push(None);
                continue;
            }
            if !raw.is_finite() {
                return Err(RubricError::NonFiniteEdge {
                    category,
                    component,
                    rank,
                });
            }
            let edge = raw * options.scale;
            if previous.is_some_and(|last| edge < last) {
                return Err(RubricError::UnorderedEdges {
                    category,
                    component,
                    rank,
                });
            }
            previous = Some(edge);
            edges.push(Some(edge));
        }

        Ok(Self {
            comparison: options.op,
            edges,
        })
    }

    pub fn comparison(&self) -> Comparison {
        self.comparison
    }

    /// Ranked edges; `None` marks a skipped rank.
    pub fn edges(&self) -> &[Option<f64>] {
        &self.edges
    }

    /// Points for `value`: the first rank whose edge admits it, else the rank count.
    pub fn score(&self, value: f64) -> u32 {
        self.edges
            .iter()
            .enumerate()
            .find_map(|(rank, edge)| match edge {
                Some(edge) if self.comparison.holds(value, *edge) => Some(rank as u32),
                _ => None,
            })
            .unwrap_or(self.edges.len() as u32)
    }
}

/// Compiled, immutable rubric shared by all scoring calls.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdTable {
    solid: BTreeMap<Component, Bins>,
    overrides: BTreeMap<(FoodCategory, Component), Bins>,
}

impl ThresholdTable {
    pub fn build(definition: &RubricDefinition) -> Result<Self, RubricError> {
        let empty = BTreeMap::new();
        let solid_definitions = definition
            .categories
            .get(&FoodCategory::Solid)
            .unwrap_or(&empty);

        let mut solid = BTreeMap::new();
        for component in Component::ALL {
            let edges = solid_definitions
                .get(&component)
                .ok_or(RubricError::MissingFallback { component })?;
            solid.insert(
                component,
                Bins::compile(FoodCategory::Solid, component, edges)?,
            );
        }

        let mut overrides = BTreeMap::new();
        for (category, components) in &definition.categories {
            if *category == FoodCategory::Solid {
                continue;
            }
            for (component, edges) in components {
                overrides.insert(
                    (*category, *component),
                    Bins::compile(*category, *component, edges)?,
                );
            }
        }

        debug!(
            fallback_entries = solid.len(),
            override_entries = overrides.len(),
            "compiled nutri-score threshold table"
        );

        Ok(Self { solid, overrides })
    }

    /// The built-in rubric, compiled once per process on first use.
    pub fn standard() -> Result<&'static ThresholdTable, RubricError> {
        STANDARD_TABLE
            .get_or_init(|| Self::build(&RubricDefinition::standard()))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Bins for the pair, falling back to the solid table.
    pub fn bins(&self, component: Component, category: FoodCategory) -> &Bins {
        match self.overrides.get(&(category, component)) {
            Some(bins) => bins,
            None => &self.solid[&component],
        }
    }

    pub fn has_override(&self, component: Component, category: FoodCategory) -> bool {
        self.overrides.contains_key(&(category, component))
    }

    pub fn component_score(
        &self,
        value: f64,
        component: Component,
        category: FoodCategory,
    ) -> u32 {
        self.bins(component, category).score(value)
    }

    /// Every (category, component) pair as it resolves after fallback.
    pub fn resolved(&self) -> Vec<ResolvedBins<'_>> {
        let categories = [
            FoodCategory::Solid,
            FoodCategory::Beverage,
            FoodCategory::Cheese,
            FoodCategory::AddedFats,
        ];
        categories
            .into_iter()
            .flat_map(|category| {
                Component::ALL.into_iter().map(move |component| ResolvedBins {
                    category,
                    component,
                    inherited: category != FoodCategory::Solid
                        && !self.has_override(component, category),
                    bins: self.bins(component, category),
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolvedBins<'a> {
    pub category: FoodCategory,
    pub component: Component,
    /// True when the solid table is used in place of a category entry.
    pub inherited: bool,
    pub bins: &'a Bins,
}
