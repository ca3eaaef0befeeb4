//! The four standard registries.
//!
//! Each family has one authoring function taking its axis values; the test
//! and main registries call it with different values and, where the two
//! fidelities search different parameters, append their own extra axes.

use pfs_types::{
    BaseLearner, EstimatorFamily, Fidelity, HyperparameterSet, ParameterValue, RegistryError,
    RegistryKey, TaskType,
};

use crate::axes::GridSpec;
use crate::registry::SearchRegistry;

use EstimatorFamily::*;

/// Seed passed to every estimator that takes one.
pub const RANDOM_STATE: i64 = 0;
/// Use every core for estimators that parallelize internally.
pub const ALL_CORES: i64 = -1;

/// Build the four standard registries.
pub fn standard_registries() -> Result<Vec<SearchRegistry>, RegistryError> {
    Ok(vec![
        test_regression()?,
        main_regression()?,
        test_classification()?,
        main_classification()?,
    ])
}

pub fn test_regression() -> Result<SearchRegistry, RegistryError> {
    SearchRegistry::builder(RegistryKey::new(Fidelity::Test, TaskType::Regression))
        .active(LinearRegression, linear_regression())
        .active(Lasso, lasso(&[1e-2], &[1_000], &["random"]))
        .active(Ridge, ridge(&[1e-2], &[1_000], &["cholesky"]))
        .active(
            LinearSVR,
            linear_svr(&[0.0], &[1e-2], &["epsilon_insensitive"], &[1_000]),
        )
        .active(
            DecisionTreeRegressor,
            decision_tree(&["mse"], &["best"], &[1], &[Some("sqrt")]),
        )
        .active(BaggingRegressor, bagging(&[100], &[1i64]))
        .active(
            GradientBoostingRegressor,
            gradient_boosting(&[1e-4], &[100], &["mse"], &[Some("sqrt")]).axis("loss", ["ls"]),
        )
        .active(
            RandomForestRegressor,
            random_forest(&[100], &["mse"], &[1], &[Some("sqrt")]),
        )
        .build()
}

pub fn main_regression() -> Result<SearchRegistry, RegistryError> {
    const ALPHAS: &[f64] = &[1e-2, 1e-1, 1e0, 1e1, 1e2];
    const MAX_ITERS: &[i64] = &[1_000, 10_000, 100_000];
    const MAX_FEATURES: &[Option<&str>] = &[Some("sqrt"), Some("log2"), None];
    const DEPTHS: &[i64] = &[1, 5, 10, 20];

    SearchRegistry::builder(RegistryKey::new(Fidelity::Main, TaskType::Regression))
        .active(LinearRegression, linear_regression())
        .active(Lasso, lasso(ALPHAS, MAX_ITERS, &["cyclic", "random"]))
        .active(
            Ridge,
            ridge(ALPHAS, MAX_ITERS, &["svd", "cholesky", "lsqr", "sparse_cg"]),
        )
        .active(
            LinearSVR,
            linear_svr(
                &[0.0, 0.1, 0.2, 0.3],
                ALPHAS,
                &["epsilon_insensitive", "squared_epsilon_insensitive"],
                MAX_ITERS,
            ),
        )
        .active(
            DecisionTreeRegressor,
            decision_tree(
                &["mse", "friedman_mse", "mae"],
                &["best", "random"],
                DEPTHS,
                MAX_FEATURES,
            ),
        )
        .active(BaggingRegressor, bagging(&[100, 1_000, 10_000], &[0.3, 0.5, 1.0]))
        .active(
            GradientBoostingRegressor,
            gradient_boosting(
                &[1e-4, 1e-3, 1e-2, 1e-1],
                &[100, 1_000, 10_000],
                &["mse", "friedman_mse", "mae"],
                MAX_FEATURES,
            ),
        )
        .active(
            RandomForestRegressor,
            random_forest(&[10, 100, 1_000], &["mse", "mae"], DEPTHS, MAX_FEATURES),
        )
        .build()
}

pub fn test_classification() -> Result<SearchRegistry, RegistryError> {
    SearchRegistry::builder(RegistryKey::new(Fidelity::Test, TaskType::Classification))
        .active(
            LinearSVC,
            linear_svc(&["l2", "l1"], &[1e-2], &["squared_hinge"]).axis("class_weight", ["balanced"]),
        )
        .active(
            DecisionTreeClassifier,
            decision_tree(&["gini"], &["best"], &[1], &[Some("sqrt")]),
        )
        .active(BaggingClassifier, bagging(&[100], &[1i64]))
        .active(
            GradientBoostingClassifier,
            gradient_boosting(&[1e-4], &[100], &["friedman_mse"], &[Some("sqrt")])
                .axis("loss", ["deviance"]),
        )
        .active(
            RandomForestClassifier,
            random_forest(&[100], &["gini"], &[1], &[Some("sqrt")]),
        )
        .build()
}

pub fn main_classification() -> Result<SearchRegistry, RegistryError> {
    SearchRegistry::builder(RegistryKey::new(Fidelity::Main, TaskType::Classification))
        .active(
            LinearSVC,
            linear_svc(&["l2"], &[1e-2, 1.0, 2.0], &["hinge", "squared_hinge"]).axis("max_iter", [10i64]),
        )
        .active(
            DecisionTreeClassifier,
            decision_tree(
                &["gini"],
                &["best"],
                &[1, 2, 3, 4, 5, 10, 20, 30, 50, 70, 100],
                &[Some("sqrt")],
            ),
        )
        .active(
            BaggingClassifier,
            bagging(&[10, 50, 100, 1_000], &[0.1, 0.2, 0.3, 0.4, 0.5, 1.0]),
        )
        .active(
            AdaBoostClassifier,
            ada_boost(&[5, 10, 50, 100], &[None, Some(2), Some(5), Some(6), Some(10), Some(15)]),
        )
        .active(KNeighborsClassifier, k_neighbors(&[2, 5, 10, 15]))
        .active(
            RandomForestClassifier,
            random_forest(
                &[5, 10, 100, 1_000, 5_000],
                &["gini"],
                &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10],
                &[Some("sqrt"), Some("log2"), None],
            ),
        )
        .active(
            GradientBoostingClassifier,
            gradient_boosting(&[1e-4], &[100], &["friedman_mse"], &[Some("sqrt")])
                .axis("loss", ["deviance"]),
        )
        .build()
}

// ---------------------------------------------------------------------------
// Per-family authoring
// ---------------------------------------------------------------------------

fn seeded() -> GridSpec {
    GridSpec::new().fixed("random_state", RANDOM_STATE)
}

fn linear_regression() -> GridSpec {
    GridSpec::new().fixed("n_jobs", ALL_CORES)
}

fn lasso(alphas: &[f64], max_iters: &[i64], selections: &[&str]) -> GridSpec {
    seeded()
        .axis("alpha", alphas.iter().copied())
        .axis("max_iter", max_iters.iter().copied())
        .axis("selection", selections.iter().copied())
}

fn ridge(alphas: &[f64], max_iters: &[i64], solvers: &[&str]) -> GridSpec {
    seeded()
        .axis("alpha", alphas.iter().copied())
        .axis("max_iter", max_iters.iter().copied())
        .axis("solver", solvers.iter().copied())
}

fn linear_svr(epsilons: &[f64], cs: &[f64], losses: &[&str], max_iters: &[i64]) -> GridSpec {
    seeded()
        .axis("epsilon", epsilons.iter().copied())
        .axis("C", cs.iter().copied())
        .axis("loss", losses.iter().copied())
        .axis("max_iter", max_iters.iter().copied())
}

fn linear_svc(penalties: &[&str], cs: &[f64], losses: &[&str]) -> GridSpec {
    seeded()
        .axis("penalty", penalties.iter().copied())
        .axis("C", cs.iter().copied())
        .axis("loss", losses.iter().copied())
}

/// Shared by the regression and classification trees; the criterion names
/// differ per task.
fn decision_tree(
    criteria: &[&str],
    splitters: &[&str],
    depths: &[i64],
    max_features: &[Option<&str>],
) -> GridSpec {
    seeded()
        .axis("criterion", criteria.iter().copied())
        .axis("splitter", splitters.iter().copied())
        .axis("max_depth", depths.iter().copied())
        .axis("max_features", max_features.iter().copied())
}

/// `max_features` is a feature count when integral, a fraction otherwise.
fn bagging<V>(n_estimators: &[i64], max_features: &[V]) -> GridSpec
where
    V: Into<ParameterValue> + Copy,
{
    seeded()
        .fixed("n_jobs", ALL_CORES)
        .axis("n_estimators", n_estimators.iter().copied())
        .axis("max_features", max_features.iter().copied())
}

fn gradient_boosting(
    learning_rates: &[f64],
    n_estimators: &[i64],
    criteria: &[&str],
    max_features: &[Option<&str>],
) -> GridSpec {
    seeded()
        .axis("learning_rate", learning_rates.iter().copied())
        .axis("n_estimators", n_estimators.iter().copied())
        .axis("criterion", criteria.iter().copied())
        .axis("max_features", max_features.iter().copied())
}

fn random_forest(
    n_estimators: &[i64],
    criteria: &[&str],
    depths: &[i64],
    max_features: &[Option<&str>],
) -> GridSpec {
    seeded()
        .fixed("n_jobs", ALL_CORES)
        .axis("n_estimators", n_estimators.iter().copied())
        .axis("criterion", criteria.iter().copied())
        .axis("max_depth", depths.iter().copied())
        .axis("max_features", max_features.iter().copied())
}

/// Base learners are depth-limited classification trees; `None` leaves the
/// choice to AdaBoost.
fn ada_boost(n_estimators: &[i64], base_depths: &[Option<i64>]) -> GridSpec {
    let base_learners = base_depths.iter().map(|depth| match depth {
        None => BaseLearner::FamilyDefault,
        Some(depth) => BaseLearner::configured(
            DecisionTreeClassifier,
            HyperparameterSet::new().with("max_depth", *depth),
        ),
    });
    seeded()
        .axis("n_estimators", n_estimators.iter().copied())
        .axis("base_estimator", base_learners)
}

fn k_neighbors(neighbors: &[i64]) -> GridSpec {
    GridSpec::new().axis("n_neighbors", neighbors.iter().copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(registry: &SearchRegistry, family: EstimatorFamily) -> usize {
        registry.grid_for(family.name()).unwrap().len()
    }

    #[test]
    fn test_grids_are_single_configuration_except_linear_svc() {
        let reg = test_regression().unwrap();
        for family in reg.active() {
            assert_eq!(count(&reg, *family), 1, "{family}");
        }
        let class = test_classification().unwrap();
        assert_eq!(count(&class, LinearSVC), 2);
        assert_eq!(count(&class, DecisionTreeClassifier), 1);
        assert_eq!(count(&class, RandomForestClassifier), 1);
    }

    #[test]
    fn main_regression_cardinalities() {
        let reg = main_regression().unwrap();
        assert_eq!(count(&reg, LinearRegression), 1);
        assert_eq!(count(&reg, Lasso), 30);
        assert_eq!(count(&reg, Ridge), 60);
        assert_eq!(count(&reg, LinearSVR), 120);
        assert_eq!(count(&reg, DecisionTreeRegressor), 72);
        assert_eq!(count(&reg, BaggingRegressor), 9);
        assert_eq!(count(&reg, GradientBoostingRegressor), 108);
        assert_eq!(count(&reg, RandomForestRegressor), 72);
        assert_eq!(reg.cost().total, 472);
    }

    #[test]
    fn main_classification_cardinalities() {
        let class = main_classification().unwrap();
        assert_eq!(count(&class, LinearSVC), 6);
        assert_eq!(count(&class, BaggingClassifier), 24);
        assert_eq!(count(&class, AdaBoostClassifier), 24);
        assert_eq!(count(&class, KNeighborsClassifier), 4);
        assert_eq!(count(&class, RandomForestClassifier), 150);
        assert_eq!(count(&class, GradientBoostingClassifier), 1);
    }

    #[test]
    fn fidelities_use_different_axes() {
        let test = test_classification().unwrap();
        let main = main_classification().unwrap();
        let test_svc = &test.grid_for("LinearSVC").unwrap()[0];
        let main_svc = &main.grid_for("LinearSVC").unwrap()[0];
        assert!(test_svc.contains("class_weight") && !test_svc.contains("max_iter"));
        assert!(main_svc.contains("max_iter") && !main_svc.contains("class_weight"));

        let test_reg = test_regression().unwrap();
        let test_gbr = &test_reg.grid_for("GradientBoostingRegressor").unwrap()[0];
        assert_eq!(test_gbr.get("loss"), Some(&ParameterValue::from("ls")));
        let main_reg = main_regression().unwrap();
        assert!(!main_reg.grid_for("GradientBoostingRegressor").unwrap()[0].contains("loss"));
    }

    #[test]
    fn first_configurations_match_declaration_order() {
        let reg = main_regression().unwrap();
        let lasso = reg.grid_for("Lasso").unwrap();
        assert_eq!(
            lasso[0],
            HyperparameterSet::new()
                .with("alpha", 1e-2)
                .with("max_iter", 1_000i64)
                .with("selection", "cyclic")
                .with("random_state", 0i64)
        );
        assert_eq!(lasso[1].get("selection"), Some(&ParameterValue::from("random")));
        assert_eq!(lasso[2].get("max_iter"), Some(&ParameterValue::Int(10_000)));
        assert_eq!(lasso[29].get("alpha"), Some(&ParameterValue::Float(1e2)));
    }

    #[test]
    fn ada_boost_base_learners() {
        let class = main_classification().unwrap();
        let grid = class.grid_for("AdaBoostClassifier").unwrap();
        assert_eq!(
            grid[0].get("base_estimator"),
            Some(&ParameterValue::BaseLearner(BaseLearner::FamilyDefault))
        );
        assert_eq!(
            grid[1].get("base_estimator"),
            Some(&ParameterValue::BaseLearner(BaseLearner::configured(
                DecisionTreeClassifier,
                HyperparameterSet::new().with("max_depth", 2i64)
            )))
        );
        assert_eq!(grid[6].get("n_estimators"), Some(&ParameterValue::Int(10)));
    }

    #[test]
    fn bagging_max_features_kinds() {
        let test = test_regression().unwrap();
        let main = main_regression().unwrap();
        assert_eq!(
            test.grid_for("BaggingRegressor").unwrap()[0].get("max_features"),
            Some(&ParameterValue::Int(1))
        );
        assert_eq!(
            main.grid_for("BaggingRegressor").unwrap()[2].get("max_features"),
            Some(&ParameterValue::Float(1.0))
        );
    }
}
