//! Hyperparameter values and sets.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::estimator::EstimatorFamily;

/// A concrete hyperparameter value.
///
/// `Default` stands for "leave the argument at the library default" and
/// serializes as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Default,
    BaseLearner(BaseLearner),
}

impl ParameterValue {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::Text(_) => "string",
            Self::Default => "default",
            Self::BaseLearner(_) => "base learner",
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric view; integers widen to floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "'{v}'"),
            Self::Default => f.write_str("None"),
            Self::BaseLearner(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for ParameterValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for ParameterValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for ParameterValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for ParameterValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<BaseLearner> for ParameterValue {
    fn from(v: BaseLearner) -> Self {
        Self::BaseLearner(v)
    }
}

/// `None` maps to [`ParameterValue::Default`].
impl<T: Into<ParameterValue>> From<Option<T>> for ParameterValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Default, Into::into)
    }
}

/// The sub-estimator handed to an ensemble as its base learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "base_learner", rename_all = "snake_case")]
pub enum BaseLearner {
    /// No explicit base learner; the ensemble picks its own.
    FamilyDefault,
    /// A fully configured estimator of the given family.
    Configured {
        family: EstimatorFamily,
        params: HyperparameterSet,
    },
}

impl BaseLearner {
    pub fn configured(family: EstimatorFamily, params: HyperparameterSet) -> Self {
        Self::Configured { family, params }
    }
}

impl fmt::Display for BaseLearner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FamilyDefault => f.write_str("None"),
            Self::Configured { family, params } => write!(f, "{family}({params})"),
        }
    }
}

/// One point in a search space: parameter name to value.
///
/// Keys are kept sorted so serialization and display are reproducible.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HyperparameterSet(BTreeMap<String, ParameterValue>);

impl HyperparameterSet {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParameterValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for HyperparameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<ParameterValue>> FromIterator<(K, V)> for HyperparameterSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
