//! Estimator families, task types and grid fidelities.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::RegistryError;

/// Whether the label is continuous or discrete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Regression,
    Classification,
}

impl TaskType {
    pub const ALL: [TaskType; 2] = [Self::Regression, Self::Classification];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regression => "regression",
            Self::Classification => "classification",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grid size in use: `Test` is a quick sanity pass, `Main` is exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fidelity {
    Test,
    Main,
}

impl Fidelity {
    pub const ALL: [Fidelity; 2] = [Self::Test, Self::Main];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Test => "test",
            Self::Main => "main",
        }
    }
}

impl fmt::Display for Fidelity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one of the search registries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RegistryKey {
    pub fidelity: Fidelity,
    pub task_type: TaskType,
}

impl RegistryKey {
    pub const fn new(fidelity: Fidelity, task_type: TaskType) -> Self {
        Self {
            fidelity,
            task_type,
        }
    }

    /// Every supported (fidelity, task type) pair, in a fixed order.
    pub fn all() -> [RegistryKey; 4] {
        [
            Self::new(Fidelity::Test, TaskType::Regression),
            Self::new(Fidelity::Main, TaskType::Regression),
            Self::new(Fidelity::Test, TaskType::Classification),
            Self::new(Fidelity::Main, TaskType::Classification),
        ]
    }

    /// Parse a registry key from user-supplied names such as `"main"` and
    /// `"classification"`. Short forms `reg` and `class` are accepted.
    pub fn parse(fidelity: &str, task_type: &str) -> Result<Self, RegistryError> {
        let unknown = || RegistryError::UnknownRegistry {
            fidelity: fidelity.to_string(),
            task_type: task_type.to_string(),
        };
        let fidelity_value = match fidelity.to_ascii_lowercase().as_str() {
            "test" => Fidelity::Test,
            "main" => Fidelity::Main,
            _ => return Err(unknown()),
        };
        let task_value = match task_type.to_ascii_lowercase().as_str() {
            "regression" | "reg" => TaskType::Regression,
            "classification" | "class" => TaskType::Classification,
            _ => return Err(unknown()),
        };
        Ok(Self::new(fidelity_value, task_value))
    }
}

impl fmt::Display for RegistryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.fidelity, self.task_type)
    }
}

/// Candidate estimator families, named after the scikit-learn classes the
/// trainer instantiates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EstimatorFamily {
    LinearRegression,
    Lasso,
    Ridge,
    LinearSVR,
    DecisionTreeRegressor,
    BaggingRegressor,
    GradientBoostingRegressor,
    RandomForestRegressor,
    LinearSVC,
    DecisionTreeClassifier,
    BaggingClassifier,
    AdaBoostClassifier,
    KNeighborsClassifier,
    RandomForestClassifier,
    GradientBoostingClassifier,
}

impl EstimatorFamily {
    pub const ALL: &'static [EstimatorFamily] = &[
        Self::LinearRegression,
        Self::Lasso,
        Self::Ridge,
        Self::LinearSVR,
        Self::DecisionTreeRegressor,
        Self::BaggingRegressor,
        Self::GradientBoostingRegressor,
        Self::RandomForestRegressor,
        Self::LinearSVC,
        Self::DecisionTreeClassifier,
        Self::BaggingClassifier,
        Self::AdaBoostClassifier,
        Self::KNeighborsClassifier,
        Self::RandomForestClassifier,
        Self::GradientBoostingClassifier,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::LinearRegression => "LinearRegression",
            Self::Lasso => "Lasso",
            Self::Ridge => "Ridge",
            Self::LinearSVR => "LinearSVR",
            Self::DecisionTreeRegressor => "DecisionTreeRegressor",
            Self::BaggingRegressor => "BaggingRegressor",
            Self::GradientBoostingRegressor => "GradientBoostingRegressor",
            Self::RandomForestRegressor => "RandomForestRegressor",
            Self::LinearSVC => "LinearSVC",
            Self::DecisionTreeClassifier => "DecisionTreeClassifier",
            Self::BaggingClassifier => "BaggingClassifier",
            Self::AdaBoostClassifier => "AdaBoostClassifier",
            Self::KNeighborsClassifier => "KNeighborsClassifier",
            Self::RandomForestClassifier => "RandomForestClassifier",
            Self::GradientBoostingClassifier => "GradientBoostingClassifier",
        }
    }

    /// The task type this family belongs to.
    pub fn task_type(&self) -> TaskType {
        match self {
            Self::LinearRegression
            | Self::Lasso
            | Self::Ridge
            | Self::LinearSVR
            | Self::DecisionTreeRegressor
            | Self::BaggingRegressor
            | Self::GradientBoostingRegressor
            | Self::RandomForestRegressor => TaskType::Regression,
            Self::LinearSVC
            | Self::DecisionTreeClassifier
            | Self::BaggingClassifier
            | Self::AdaBoostClassifier
            | Self::KNeighborsClassifier
            | Self::RandomForestClassifier
            | Self::GradientBoostingClassifier => TaskType::Classification,
        }
    }
}

impl fmt::Display for EstimatorFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EstimatorFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|family| family.name() == s)
            .ok_or_else(|| format!("unknown estimator family: {s}"))
    }
}
