//! Grid specifications: named axes materialized into a cross-product.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use pfs_types::{EstimatorFamily, HyperparameterSet, ParameterValue, RegistryError};

/// A single parameter dimension: its name and ordered candidate values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub name: String,
    pub values: Vec<ParameterValue>,
}

impl Axis {
    pub fn new<I, V>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ParameterValue>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Declarative description of one estimator's grid: parameters fixed across
/// every configuration plus the axes whose product is searched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub fixed: HyperparameterSet,
    pub axes: Vec<Axis>,
    /// Fixed parameters pinned more than once; the map keeps only the last.
    #[serde(skip)]
    repinned: Vec<String>,
}

impl GridSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin a parameter to one value in every configuration.
    pub fn fixed(mut self, name: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        let name = name.into();
        if self.fixed.contains(&name) {
            self.repinned.push(name.clone());
        }
        self.fixed.insert(name, value);
        self
    }

    /// Add an axis. Axis order decides iteration order: the first axis
    /// varies slowest.
    pub fn axis<I, V>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ParameterValue>,
    {
        self.axes.push(Axis::new(name, values));
        self
    }

    /// Number of configurations the product yields, or `None` on overflow.
    pub fn grid_size(&self) -> Option<usize> {
        let mut total: usize = 1;
        for axis in &self.axes {
            total = total.checked_mul(axis.len())?;
        }
        Some(total)
    }

    /// First parameter name used by more than one fixed value or axis.
    pub fn duplicate_parameter(&self) -> Option<&str> {
        if let Some(name) = self.repinned.first() {
            return Some(name.as_str());
        }
        let mut seen: HashSet<&str> = self.fixed.keys().collect();
        self.axes
            .iter()
            .map(|axis| axis.name.as_str())
            .find(|name| !seen.insert(*name))
    }

    /// Materialize the cross-product for `estimator`.
    ///
    /// A parameter name may appear once, as a fixed value or as an axis;
    /// otherwise later values would overwrite earlier ones and the grid would
    /// hold repeated configurations.
    pub fn build(&self, estimator: EstimatorFamily) -> Result<EstimatorGrid, RegistryError> {
        if let Some(parameter) = self.duplicate_parameter() {
            return Err(RegistryError::DuplicateParameter {
                estimator: estimator.to_string(),
                parameter: parameter.to_string(),
            });
        }

        // Cartesian product
        let mut result: Vec<HyperparameterSet> = vec![self.fixed.clone()];
        for axis in &self.axes {
            let mut next = Vec::with_capacity(result.len() * axis.len());
            for existing in &result {
                for value in &axis.values {
                    let mut combo = existing.clone();
                    combo.insert(axis.name.as_str(), value.clone());
                    next.push(combo);
                }
            }
            result = next;
        }
        Ok(EstimatorGrid::new(result))
    }
}

/// Ordered, materialized configurations for one estimator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EstimatorGrid(Vec<HyperparameterSet>);

impl EstimatorGrid {
    pub fn new(configurations: Vec<HyperparameterSet>) -> Self {
        Self(configurations)
    }

    pub fn configurations(&self) -> &[HyperparameterSet] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HyperparameterSet> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a EstimatorGrid {
    type Item = &'a HyperparameterSet;
    type IntoIter = std::slice::Iter<'a, HyperparameterSet>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TREE: EstimatorFamily = EstimatorFamily::DecisionTreeRegressor;

    #[test]
    fn grid_produces_correct_count() {
        let spec = GridSpec::new()
            .axis("alpha", [0.01, 0.1, 1.0])
            .axis("selection", ["cyclic", "random"]);
        assert_eq!(spec.grid_size(), Some(6));
        assert_eq!(spec.build(TREE).unwrap().len(), 6);
    }

    #[test]
    fn first_axis_varies_slowest() {
        let grid = GridSpec::new()
            .axis("a", [1i64, 2])
            .axis("b", ["x", "y"])
            .build(TREE)
            .unwrap();
        let pairs: Vec<(i64, String)> = grid
            .iter()
            .map(|p| {
                (
                    p.get("a").and_then(ParameterValue::as_i64).unwrap(),
                    p.get("b").and_then(ParameterValue::as_str).unwrap().to_string(),
                )
            })
            .collect();
        assert_eq!(
            pairs,
            vec![
                (1, "x".to_string()),
                (1, "y".to_string()),
                (2, "x".to_string()),
                (2, "y".to_string())
            ]
        );
    }

    #[test]
    fn fixed_parameters_appear_everywhere() {
        let grid = GridSpec::new()
            .fixed("random_state", 0i64)
            .axis("max_depth", [1i64, 5, 10])
            .build(TREE)
            .unwrap();
        assert_eq!(grid.len(), 3);
        for params in &grid {
            assert_eq!(params.get("random_state"), Some(&ParameterValue::Int(0)));
            assert_eq!(params.len(), 2);
        }
    }

    #[test]
    fn no_axes_yields_single_fixed_configuration() {
        let spec = GridSpec::new().fixed("n_jobs", -1i64);
        assert_eq!(spec.grid_size(), Some(1));
        let grid = spec.build(TREE).unwrap();
        assert_eq!(grid.configurations(), [HyperparameterSet::new().with("n_jobs", -1i64)]);
    }

    #[test]
    fn empty_axis_empties_the_grid() {
        let spec = GridSpec::new()
            .axis("n_estimators", [10i64, 100])
            .axis("criterion", Vec::<&str>::new());
        assert_eq!(spec.grid_size(), Some(0));
        assert!(spec.build(TREE).unwrap().is_empty());
    }

    #[test]
    fn grid_size_detects_overflow() {
        let huge: Vec<i64> = (0..1 << 16).collect();
        let spec = GridSpec::new()
            .axis("a", huge.clone())
            .axis("b", huge.clone())
            .axis("c", huge.clone())
            .axis("d", huge)
            .axis("e", [1i64, 2]);
        assert_eq!(spec.grid_size(), None);
    }

    #[test]
    fn optional_axis_values() {
        let grid = GridSpec::new()
            .axis("max_features", [Some("sqrt"), Some("log2"), None])
            .build(TREE)
            .unwrap();
        assert_eq!(grid.configurations()[2].get("max_features"), Some(&ParameterValue::Default));
    }

    #[test]
    fn repeated_axis_is_rejected() {
        let spec = GridSpec::new().axis("a", [1i64, 2]).axis("a", [3i64, 4]);
        assert_eq!(spec.duplicate_parameter(), Some("a"));
        assert_eq!(
            spec.build(TREE),
            Err(RegistryError::DuplicateParameter {
                estimator: "DecisionTreeRegressor".into(),
                parameter: "a".into()
            })
        );
    }

    #[test]
    fn axis_cannot_shadow_fixed_parameter() {
        let spec = GridSpec::new()
            .fixed("max_depth", 3i64)
            .axis("splitter", ["best"])
            .axis("max_depth", [5i64]);
        assert!(matches!(
            spec.build(TREE),
            Err(RegistryError::DuplicateParameter { parameter, .. }) if parameter == "max_depth"
        ));
    }

    #[test]
    fn repinned_fixed_parameter_is_rejected() {
        let spec = GridSpec::new()
            .fixed("random_state", 0i64)
            .fixed("random_state", 1i64);
        assert_eq!(spec.duplicate_parameter(), Some("random_state"));
        assert!(spec.build(TREE).is_err());
    }
}
