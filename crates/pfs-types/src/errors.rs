use thiserror::Error;

/// Main error type for the Poverty-from-the-Sky configuration surface
#[derive(Error, Debug)]
pub enum PfsError {
    #[error("Feature error: {0}")]
    Feature(#[from] FeatureError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Feature taxonomy errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeatureError {
    #[error("Unknown feature group: {name}")]
    UnknownGroup { name: String },

    #[error("Duplicate feature identifier {identifier} in group {group}")]
    DuplicateFeatureIdentifier { identifier: String, group: String },
}

/// Search registry errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Unknown registry: fidelity {fidelity}, task type {task_type}")]
    UnknownRegistry { fidelity: String, task_type: String },

    #[error("Estimator {estimator} is not active in the {registry} registry")]
    UnknownEstimator { estimator: String, registry: String },

    #[error("Invalid hyperparameter set #{position} for {estimator}: {reason}")]
    InvalidHyperparameterSet {
        estimator: String,
        position: usize,
        reason: String,
    },

    #[error("Estimator {estimator} is active in the {registry} registry but has no grid")]
    MissingGrid { estimator: String, registry: String },

    #[error("Estimator {estimator} is a {actual} family and cannot be registered in the {registry} registry")]
    TaskTypeMismatch {
        estimator: String,
        actual: String,
        registry: String,
    },

    #[error("Parameter {parameter} is set more than once in the {estimator} grid")]
    DuplicateParameter { estimator: String, parameter: String },

    #[error("Registry {registry} is defined more than once")]
    DuplicateRegistry { registry: String },

    #[error("Registry {registry} failed validation with {} violation(s)", violations.len())]
    Invalid {
        registry: String,
        violations: Vec<String>,
    },
}

/// Result type alias for Poverty-from-the-Sky operations
pub type PfsResult<T> = Result<T, PfsError>;

/// Macro for creating validation errors
#[macro_export]
macro_rules! validation_error {
    ($($arg:tt)*) => {
        $crate::PfsError::Validation(format!($($arg)*))
    };
}

/// Macro for creating configuration errors
#[macro_export]
macro_rules! config_error {
    ($($arg:tt)*) => {
        $crate::PfsError::Config(format!($($arg)*))
    };
}
