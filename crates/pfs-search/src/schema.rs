//! Accepted-parameter schemas for estimator families.
//!
//! The schema belongs to the ML library the trainer targets. [`SklearnSchema`]
//! describes the scikit-learn 0.22 constructor signatures the grids were
//! written against; other libraries plug in through [`ParameterSchema`].

use std::fmt;

use pfs_types::{EstimatorFamily, ParameterValue};

/// One acceptable shape for a parameter value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Domain {
    /// Integer in `[min, max]`.
    Int { min: i64, max: i64 },
    /// Number in `[min, max]`; integers are accepted too.
    Float { min: f64, max: f64 },
    Bool,
    /// One of a fixed set of strings.
    Choice(&'static [&'static str]),
    /// `None`, i.e. keep the library default.
    Default,
    /// A base learner: either the ensemble's own default or a configured
    /// estimator from one of these families.
    BaseLearner(&'static [EstimatorFamily]),
}

impl Domain {
    pub const POSITIVE_INT: Domain = Domain::Int {
        min: 1,
        max: i64::MAX,
    };
    pub const NON_NEGATIVE_INT: Domain = Domain::Int {
        min: 0,
        max: i64::MAX,
    };
    pub const NON_NEGATIVE: Domain = Domain::Float {
        min: 0.0,
        max: f64::INFINITY,
    };
    pub const POSITIVE: Domain = Domain::Float {
        min: f64::MIN_POSITIVE,
        max: f64::INFINITY,
    };
    pub const FRACTION: Domain = Domain::Float {
        min: f64::MIN_POSITIVE,
        max: 1.0,
    };

    /// Scalar check. Base learners only have their family checked here;
    /// their nested parameters are the caller's to recurse into.
    pub fn accepts(&self, value: &ParameterValue) -> bool {
        match (self, value) {
            (Domain::Int { min, max }, ParameterValue::Int(v)) => v >= min && v <= max,
            (Domain::Float { min, max }, v @ (ParameterValue::Int(_) | ParameterValue::Float(_))) => {
                v.as_f64().is_some_and(|v| v >= *min && v <= *max)
            }
            (Domain::Bool, ParameterValue::Bool(_)) => true,
            (Domain::Choice(options), ParameterValue::Text(v)) => options.iter().any(|o| o == v),
            (Domain::Default, ParameterValue::Default) => true,
            (Domain::BaseLearner(families), ParameterValue::BaseLearner(learner)) => match learner {
                pfs_types::BaseLearner::FamilyDefault => true,
                pfs_types::BaseLearner::Configured { family, .. } => families.contains(family),
            },
            _ => false,
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::Int { min, max } if *max == i64::MAX => write!(f, "int >= {min}"),
            Domain::Int { min, max } => write!(f, "int in [{min}, {max}]"),
            Domain::Float { min, max } if max.is_infinite() && *min == f64::MIN_POSITIVE => {
                f.write_str("number > 0")
            }
            Domain::Float { min, max } if max.is_infinite() => write!(f, "number >= {min}"),
            Domain::Float { min, max } if *min == f64::MIN_POSITIVE => {
                write!(f, "number in (0, {max}]")
            }
            Domain::Float { min, max } => write!(f, "number in [{min}, {max}]"),
            Domain::Bool => f.write_str("bool"),
            Domain::Choice(options) => write!(f, "one of {options:?}"),
            Domain::Default => f.write_str("None"),
            Domain::BaseLearner(families) => {
                let names: Vec<&str> = families.iter().map(EstimatorFamily::name).collect();
                write!(f, "None or an estimator of {names:?}")
            }
        }
    }
}

/// An accepted parameter: its name and every domain a value may fall in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub domains: &'static [Domain],
}

impl ParamSpec {
    pub const fn new(name: &'static str, domains: &'static [Domain]) -> Self {
        Self { name, domains }
    }

    pub fn accepts(&self, value: &ParameterValue) -> bool {
        self.domains.iter().any(|domain| domain.accepts(value))
    }

    pub fn describe_domains(&self) -> String {
        self.domains
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// Source of accepted parameter names and value domains per family.
pub trait ParameterSchema: Send + Sync + fmt::Debug {
    /// Every parameter the family's constructor accepts.
    fn parameters(&self, family: EstimatorFamily) -> &[ParamSpec];

    /// Human-readable schema name.
    fn name(&self) -> &str;

    fn parameter(&self, family: EstimatorFamily, name: &str) -> Option<&ParamSpec> {
        self.parameters(family).iter().find(|spec| spec.name == name)
    }
}

/// scikit-learn 0.22 constructor signatures.
#[derive(Debug, Clone, Copy, Default)]
pub struct SklearnSchema;

impl ParameterSchema for SklearnSchema {
    fn parameters(&self, family: EstimatorFamily) -> &[ParamSpec] {
        use EstimatorFamily::*;
        match family {
            LinearRegression => LINEAR_REGRESSION,
            Lasso => LASSO,
            Ridge => RIDGE,
            LinearSVR => LINEAR_SVR,
            DecisionTreeRegressor => DECISION_TREE_REGRESSOR,
            BaggingRegressor => BAGGING_REGRESSOR,
            GradientBoostingRegressor => GRADIENT_BOOSTING_REGRESSOR,
            RandomForestRegressor => RANDOM_FOREST_REGRESSOR,
            LinearSVC => LINEAR_SVC,
            DecisionTreeClassifier => DECISION_TREE_CLASSIFIER,
            BaggingClassifier => BAGGING_CLASSIFIER,
            AdaBoostClassifier => ADA_BOOST_CLASSIFIER,
            KNeighborsClassifier => K_NEIGHBORS_CLASSIFIER,
            RandomForestClassifier => RANDOM_FOREST_CLASSIFIER,
            GradientBoostingClassifier => GRADIENT_BOOSTING_CLASSIFIER,
        }
    }

    fn name(&self) -> &str {
        "scikit-learn 0.22"
    }
}

// ---------------------------------------------------------------------------
// Shared parameter shapes
// ---------------------------------------------------------------------------

const BOOL: &[Domain] = &[Domain::Bool];
const POSITIVE_INT: &[Domain] = &[Domain::POSITIVE_INT];
const OPTIONAL_POSITIVE_INT: &[Domain] = &[Domain::POSITIVE_INT, Domain::Default];
const NON_NEGATIVE: &[Domain] = &[Domain::NON_NEGATIVE];
const POSITIVE: &[Domain] = &[Domain::POSITIVE];
const FRACTION: &[Domain] = &[Domain::FRACTION];
const RANDOM_STATE: &[Domain] = &[Domain::NON_NEGATIVE_INT, Domain::Default];
const N_JOBS: &[Domain] = &[
    Domain::Int {
        min: -1,
        max: i64::MAX,
    },
    Domain::Default,
];
const VERBOSE: &[Domain] = &[Domain::NON_NEGATIVE_INT];
/// Split/leaf minimums: absolute count or fraction of samples.
const MIN_SAMPLES: &[Domain] = &[Domain::POSITIVE_INT, Domain::FRACTION];
const MAX_FEATURES: &[Domain] = &[
    Domain::Choice(&["auto", "sqrt", "log2"]),
    Domain::POSITIVE_INT,
    Domain::FRACTION,
    Domain::Default,
];
const ENSEMBLE_SUBSET: &[Domain] = &[Domain::POSITIVE_INT, Domain::FRACTION];
const CLASS_WEIGHT: &[Domain] = &[Domain::Choice(&["balanced"]), Domain::Default];
const TREE_SPLITTER: &[Domain] = &[Domain::Choice(&["best", "random"])];
const REGRESSION_TREE_CRITERION: &[Domain] = &[Domain::Choice(&["mse", "friedman_mse", "mae"])];
const CLASSIFICATION_TREE_CRITERION: &[Domain] = &[Domain::Choice(&["gini", "entropy"])];
const BOOSTING_CRITERION: &[Domain] = &[Domain::Choice(&["friedman_mse", "mse", "mae"])];

// ---------------------------------------------------------------------------
// Regression families
// ---------------------------------------------------------------------------

const LINEAR_REGRESSION: &[ParamSpec] = &[
    ParamSpec::new("fit_intercept", BOOL),
    ParamSpec::new("normalize", BOOL),
    ParamSpec::new("copy_X", BOOL),
    ParamSpec::new("n_jobs", N_JOBS),
];

const LASSO: &[ParamSpec] = &[
    ParamSpec::new("alpha", NON_NEGATIVE),
    ParamSpec::new("fit_intercept", BOOL),
    ParamSpec::new("normalize", BOOL),
    ParamSpec::new("precompute", BOOL),
    ParamSpec::new("copy_X", BOOL),
    ParamSpec::new("max_iter", POSITIVE_INT),
    ParamSpec::new("tol", POSITIVE),
    ParamSpec::new("warm_start", BOOL),
    ParamSpec::new("positive", BOOL),
    ParamSpec::new("random_state", RANDOM_STATE),
    ParamSpec::new("selection", &[Domain::Choice(&["cyclic", "random"])]),
];

const RIDGE: &[ParamSpec] = &[
    ParamSpec::new("alpha", NON_NEGATIVE),
    ParamSpec::new("fit_intercept", BOOL),
    ParamSpec::new("normalize", BOOL),
    ParamSpec::new("copy_X", BOOL),
    ParamSpec::new("max_iter", OPTIONAL_POSITIVE_INT),
    ParamSpec::new("tol", POSITIVE),
    ParamSpec::new(
        "solver",
        &[Domain::Choice(&[
            "auto",
            "svd",
            "cholesky",
            "lsqr",
            "sparse_cg",
            "sag",
            "saga",
        ])],
    ),
    ParamSpec::new("random_state", RANDOM_STATE),
];

const LINEAR_SVR: &[ParamSpec] = &[
    ParamSpec::new("epsilon", NON_NEGATIVE),
    ParamSpec::new("tol", POSITIVE),
    ParamSpec::new("C", POSITIVE),
    ParamSpec::new(
        "loss",
        &[Domain::Choice(&[
            "epsilon_insensitive",
            "squared_epsilon_insensitive",
        ])],
    ),
    ParamSpec::new("fit_intercept", BOOL),
    ParamSpec::new("intercept_scaling", POSITIVE),
    ParamSpec::new("dual", BOOL),
    ParamSpec::new("verbose", VERBOSE),
    ParamSpec::new("random_state", RANDOM_STATE),
    ParamSpec::new("max_iter", POSITIVE_INT),
];

const DECISION_TREE_REGRESSOR: &[ParamSpec] = &[
    ParamSpec::new("criterion", REGRESSION_TREE_CRITERION),
    ParamSpec::new("splitter", TREE_SPLITTER),
    ParamSpec::new("max_depth", OPTIONAL_POSITIVE_INT),
    ParamSpec::new("min_samples_split", MIN_SAMPLES),
    ParamSpec::new("min_samples_leaf", MIN_SAMPLES),
    ParamSpec::new("max_features", MAX_FEATURES),
    ParamSpec::new("random_state", RANDOM_STATE),
    ParamSpec::new("max_leaf_nodes", OPTIONAL_POSITIVE_INT),
];

const BAGGING_REGRESSOR: &[ParamSpec] = &[
    ParamSpec::new(
        "base_estimator",
        &[Domain::BaseLearner(&[
            EstimatorFamily::DecisionTreeRegressor,
            EstimatorFamily::LinearRegression,
            EstimatorFamily::Ridge,
            EstimatorFamily::Lasso,
        ])],
    ),
    ParamSpec::new("n_estimators", POSITIVE_INT),
    ParamSpec::new("max_samples", ENSEMBLE_SUBSET),
    ParamSpec::new("max_features", ENSEMBLE_SUBSET),
    ParamSpec::new("bootstrap", BOOL),
    ParamSpec::new("bootstrap_features", BOOL),
    ParamSpec::new("oob_score", BOOL),
    ParamSpec::new("warm_start", BOOL),
    ParamSpec::new("n_jobs", N_JOBS),
    ParamSpec::new("random_state", RANDOM_STATE),
    ParamSpec::new("verbose", VERBOSE),
];

const GRADIENT_BOOSTING_REGRESSOR: &[ParamSpec] = &[
    ParamSpec::new("loss", &[Domain::Choice(&["ls", "lad", "huber", "quantile"])]),
    ParamSpec::new("learning_rate", POSITIVE),
    ParamSpec::new("n_estimators", POSITIVE_INT),
    ParamSpec::new("subsample", FRACTION),
    ParamSpec::new("criterion", BOOSTING_CRITERION),
    ParamSpec::new("min_samples_split", MIN_SAMPLES),
    ParamSpec::new("min_samples_leaf", MIN_SAMPLES),
    ParamSpec::new("max_depth", OPTIONAL_POSITIVE_INT),
    ParamSpec::new("random_state", RANDOM_STATE),
    ParamSpec::new("max_features", MAX_FEATURES),
    ParamSpec::new("alpha", &[Domain::Float { min: 0.0, max: 1.0 }]),
    ParamSpec::new("max_leaf_nodes", OPTIONAL_POSITIVE_INT),
    ParamSpec::new("n_iter_no_change", OPTIONAL_POSITIVE_INT),
];

const RANDOM_FOREST_REGRESSOR: &[ParamSpec] = &[
    ParamSpec::new("n_estimators", POSITIVE_INT),
    ParamSpec::new("criterion", &[Domain::Choice(&["mse", "mae"])]),
    ParamSpec::new("max_depth", OPTIONAL_POSITIVE_INT),
    ParamSpec::new("min_samples_split", MIN_SAMPLES),
    ParamSpec::new("min_samples_leaf", MIN_SAMPLES),
    ParamSpec::new("max_features", MAX_FEATURES),
    ParamSpec::new("max_leaf_nodes", OPTIONAL_POSITIVE_INT),
    ParamSpec::new("bootstrap", BOOL),
    ParamSpec::new("oob_score", BOOL),
    ParamSpec::new("n_jobs", N_JOBS),
    ParamSpec::new("random_state", RANDOM_STATE),
    ParamSpec::new("verbose", VERBOSE),
    ParamSpec::new("warm_start", BOOL),
];

// ---------------------------------------------------------------------------
// Classification families
// ---------------------------------------------------------------------------

const LINEAR_SVC: &[ParamSpec] = &[
    ParamSpec::new("penalty", &[Domain::Choice(&["l1", "l2"])]),
    ParamSpec::new("loss", &[Domain::Choice(&["hinge", "squared_hinge"])]),
    ParamSpec::new("dual", BOOL),
    ParamSpec::new("tol", POSITIVE),
    ParamSpec::new("C", POSITIVE),
    ParamSpec::new("multi_class", &[Domain::Choice(&["ovr", "crammer_singer"])]),
    ParamSpec::new("fit_intercept", BOOL),
    ParamSpec::new("intercept_scaling", POSITIVE),
    ParamSpec::new("class_weight", CLASS_WEIGHT),
    ParamSpec::new("verbose", VERBOSE),
    ParamSpec::new("random_state", RANDOM_STATE),
    ParamSpec::new("max_iter", POSITIVE_INT),
];

const DECISION_TREE_CLASSIFIER: &[ParamSpec] = &[
    ParamSpec::new("criterion", CLASSIFICATION_TREE_CRITERION),
    ParamSpec::new("splitter", TREE_SPLITTER),
    ParamSpec::new("max_depth", OPTIONAL_POSITIVE_INT),
    ParamSpec::new("min_samples_split", MIN_SAMPLES),
    ParamSpec::new("min_samples_leaf", MIN_SAMPLES),
    ParamSpec::new("max_features", MAX_FEATURES),
    ParamSpec::new("random_state", RANDOM_STATE),
    ParamSpec::new("max_leaf_nodes", OPTIONAL_POSITIVE_INT),
    ParamSpec::new("class_weight", CLASS_WEIGHT),
];

const BAGGING_CLASSIFIER: &[ParamSpec] = &[
    ParamSpec::new(
        "base_estimator",
        &[Domain::BaseLearner(&[
            EstimatorFamily::DecisionTreeClassifier,
            EstimatorFamily::KNeighborsClassifier,
            EstimatorFamily::LinearSVC,
        ])],
    ),
    ParamSpec::new("n_estimators", POSITIVE_INT),
    ParamSpec::new("max_samples", ENSEMBLE_SUBSET),
    ParamSpec::new("max_features", ENSEMBLE_SUBSET),
    ParamSpec::new("bootstrap", BOOL),
    ParamSpec::new("bootstrap_features", BOOL),
    ParamSpec::new("oob_score", BOOL),
    ParamSpec::new("warm_start", BOOL),
    ParamSpec::new("n_jobs", N_JOBS),
    ParamSpec::new("random_state", RANDOM_STATE),
    ParamSpec::new("verbose", VERBOSE),
];

const ADA_BOOST_CLASSIFIER: &[ParamSpec] = &[
    // SAMME.R needs predict_proba, which rules out LinearSVC.
    ParamSpec::new(
        "base_estimator",
        &[Domain::BaseLearner(&[
            EstimatorFamily::DecisionTreeClassifier,
            EstimatorFamily::RandomForestClassifier,
        ])],
    ),
    ParamSpec::new("n_estimators", POSITIVE_INT),
    ParamSpec::new("learning_rate", POSITIVE),
    ParamSpec::new("algorithm", &[Domain::Choice(&["SAMME", "SAMME.R"])]),
    ParamSpec::new("random_state", RANDOM_STATE),
];

const K_NEIGHBORS_CLASSIFIER: &[ParamSpec] = &[
    ParamSpec::new("n_neighbors", POSITIVE_INT),
    ParamSpec::new("weights", &[Domain::Choice(&["uniform", "distance"])]),
    ParamSpec::new(
        "algorithm",
        &[Domain::Choice(&["auto", "ball_tree", "kd_tree", "brute"])],
    ),
    ParamSpec::new("leaf_size", POSITIVE_INT),
    ParamSpec::new("p", POSITIVE_INT),
    ParamSpec::new("metric", &[Domain::Choice(&["minkowski", "euclidean", "manhattan", "chebyshev"])]),
    ParamSpec::new("n_jobs", N_JOBS),
];

const RANDOM_FOREST_CLASSIFIER: &[ParamSpec] = &[
    ParamSpec::new("n_estimators", POSITIVE_INT),
    ParamSpec::new("criterion", CLASSIFICATION_TREE_CRITERION),
    ParamSpec::new("max_depth", OPTIONAL_POSITIVE_INT),
    ParamSpec::new("min_samples_split", MIN_SAMPLES),
    ParamSpec::new("min_samples_leaf", MIN_SAMPLES),
    ParamSpec::new("max_features", MAX_FEATURES),
    ParamSpec::new("max_leaf_nodes", OPTIONAL_POSITIVE_INT),
    ParamSpec::new("bootstrap", BOOL),
    ParamSpec::new("oob_score", BOOL),
    ParamSpec::new("n_jobs", N_JOBS),
    ParamSpec::new("random_state", RANDOM_STATE),
    ParamSpec::new("verbose", VERBOSE),
    ParamSpec::new("warm_start", BOOL),
    ParamSpec::new(
        "class_weight",
        &[
            Domain::Choice(&["balanced", "balanced_subsample"]),
            Domain::Default,
        ],
    ),
];

const GRADIENT_BOOSTING_CLASSIFIER: &[ParamSpec] = &[
    ParamSpec::new("loss", &[Domain::Choice(&["deviance", "exponential"])]),
    ParamSpec::new("learning_rate", POSITIVE),
    ParamSpec::new("n_estimators", POSITIVE_INT),
    ParamSpec::new("subsample", FRACTION),
    ParamSpec::new("criterion", BOOSTING_CRITERION),
    ParamSpec::new("min_samples_split", MIN_SAMPLES),
    ParamSpec::new("min_samples_leaf", MIN_SAMPLES),
    ParamSpec::new("max_depth", OPTIONAL_POSITIVE_INT),
    ParamSpec::new("random_state", RANDOM_STATE),
    ParamSpec::new("max_features", MAX_FEATURES),
    ParamSpec::new("max_leaf_nodes", OPTIONAL_POSITIVE_INT),
    ParamSpec::new("n_iter_no_change", OPTIONAL_POSITIVE_INT),
];
