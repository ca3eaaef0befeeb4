//! Run plans: the validated, ordered list of fits a trainer executes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use pfs_types::{
    EstimatorFamily, ExperimentConfig, FeatureGroupName, FeatureTaxonomy, HyperparameterSet,
    PfsResult, RegistryKey,
};

use crate::registry::{CostSummary, SearchRegistries};

/// Unique run plan identifier.
pub type PlanId = Uuid;

/// One model fit: an estimator and its configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedFit {
    pub estimator: EstimatorFamily,
    /// Index into the estimator's grid; result tables are keyed by it.
    pub position: usize,
    pub parameters: HyperparameterSet,
}

/// Everything a trainer needs to run one registry against one feature group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunPlan {
    pub id: PlanId,
    pub registry: RegistryKey,
    pub feature_group: FeatureGroupName,
    /// Columns to slice, in order.
    pub features: Vec<String>,
    pub label: String,
    pub test_size: f64,
    /// Fits grouped by estimator in active order, each group in grid order.
    pub fits: Vec<PlannedFit>,
    pub cost: CostSummary,
    pub created_at: DateTime<Utc>,
}

impl RunPlan {
    /// Validate the config and the registry, then lay out every fit.
    ///
    /// Fails with [`pfs_types::RegistryError::Invalid`] instead of producing
    /// a partial plan when the registry has any violation.
    pub fn prepare(
        registries: &SearchRegistries,
        taxonomy: &FeatureTaxonomy,
        config: &ExperimentConfig,
        registry: RegistryKey,
        feature_group: FeatureGroupName,
    ) -> PfsResult<Self> {
        config.validate()?;

        let validation = registries.validate(registry.fidelity, registry.task_type)?;
        if !validation.is_valid() {
            warn!(
                registry = %registry,
                violations = validation.violations.len(),
                "Refusing to plan a run against an invalid registry"
            );
            validation.into_result()?;
        }

        let search = registries.registry(registry.fidelity, registry.task_type)?;
        let cost = search.cost();
        let mut fits = Vec::with_capacity(cost.total);
        for family in search.active() {
            let grid = search.grid_for(family.name())?;
            fits.extend(grid.iter().enumerate().map(|(position, parameters)| PlannedFit {
                estimator: *family,
                position,
                parameters: parameters.clone(),
            }));
        }

        if let Some(largest) = cost.largest() {
            info!(
                registry = %registry,
                estimator = %largest.estimator,
                configurations = largest.configurations,
                "Largest grid in plan"
            );
        }

        let plan = Self {
            id: Uuid::new_v4(),
            registry,
            feature_group,
            features: taxonomy.group(feature_group).columns().to_vec(),
            label: config.label.clone(),
            test_size: config.test_size,
            fits,
            cost,
            created_at: Utc::now(),
        };

        info!(
            plan = %plan.id,
            registry = %registry,
            features = plan.features.len(),
            fits = plan.fits.len(),
            "Prepared run plan"
        );
        Ok(plan)
    }

    /// Fits for one estimator, in grid order.
    pub fn fits_for(&self, estimator: EstimatorFamily) -> impl Iterator<Item = &PlannedFit> {
        self.fits.iter().filter(move |fit| fit.estimator == estimator)
    }

    pub fn to_json(&self) -> PfsResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axes::GridSpec;
    use crate::registry::SearchRegistry;
    use crate::schema::SklearnSchema;
    use pfs_types::{Fidelity, PfsError, RegistryError, TaskType};

    fn fixtures() -> (SearchRegistries, FeatureTaxonomy, ExperimentConfig) {
        (
            SearchRegistries::new().unwrap(),
            FeatureTaxonomy::new().unwrap(),
            ExperimentConfig::default(),
        )
    }

    #[test]
    fn plan_covers_every_configuration_in_order() {
        let (registries, taxonomy, config) = fixtures();
        let key = RegistryKey::new(Fidelity::Main, TaskType::Classification);
        let plan =
            RunPlan::prepare(&registries, &taxonomy, &config, key, FeatureGroupName::All).unwrap();

        assert_eq!(plan.fits.len(), 220);
        assert_eq!(plan.cost.total, 220);
        assert_eq!(plan.features.len(), 32);
        assert_eq!(plan.label, "hhinc_2011");
        assert_eq!(plan.fits[0].estimator, EstimatorFamily::LinearSVC);
        assert_eq!(
            plan.fits.last().map(|fit| fit.estimator),
            Some(EstimatorFamily::GradientBoostingClassifier)
        );

        let trees: Vec<usize> = plan
            .fits_for(EstimatorFamily::DecisionTreeClassifier)
            .map(|fit| fit.position)
            .collect();
        assert_eq!(trees, (0..11).collect::<Vec<_>>());

        let grid = registries
            .grid_for(key.fidelity, key.task_type, "DecisionTreeClassifier")
            .unwrap();
        for fit in plan.fits_for(EstimatorFamily::DecisionTreeClassifier) {
            assert_eq!(fit.parameters, grid[fit.position]);
        }
    }

    #[test]
    fn plan_uses_requested_feature_group() {
        let (registries, taxonomy, config) = fixtures();
        let key = RegistryKey::new(Fidelity::Test, TaskType::Regression);
        let plan =
            RunPlan::prepare(&registries, &taxonomy, &config, key, FeatureGroupName::Night).unwrap();
        assert_eq!(plan.features, taxonomy.resolve("night").unwrap());
        assert_eq!(plan.fits.len(), 8);
    }

    #[test]
    fn invalid_registry_is_refused() {
        let key = RegistryKey::new(Fidelity::Test, TaskType::Classification);
        let broken = SearchRegistry::builder(key)
            .active(
                EstimatorFamily::KNeighborsClassifier,
                GridSpec::new().axis("n_neighbors", [5i64]),
            )
            .active(
                EstimatorFamily::LinearSVC,
                GridSpec::new().axis("loss", ["epsilon_insensitive"]),
            )
            .build()
            .unwrap();
        let registries = SearchRegistries::with_schema([broken], SklearnSchema).unwrap();
        let taxonomy = FeatureTaxonomy::new().unwrap();

        let result = RunPlan::prepare(
            &registries,
            &taxonomy,
            &ExperimentConfig::default(),
            key,
            FeatureGroupName::All,
        );
        match result {
            Err(PfsError::Registry(RegistryError::Invalid { violations, .. })) => {
                assert_eq!(violations.len(), 1);
                assert!(violations[0].contains("LinearSVC"));
            }
            other => panic!("expected invalid registry, got {other:?}"),
        }
    }

    #[test]
    fn unknown_registry_and_bad_config_are_refused() {
        let (_, taxonomy, config) = fixtures();
        let registries = SearchRegistries::with_schema(Vec::new(), SklearnSchema).unwrap();
        let key = RegistryKey::new(Fidelity::Main, TaskType::Regression);
        assert!(matches!(
            RunPlan::prepare(&registries, &taxonomy, &config, key, FeatureGroupName::All),
            Err(PfsError::Registry(RegistryError::UnknownRegistry { .. }))
        ));

        let (registries, _, _) = fixtures();
        let bad = ExperimentConfig {
            test_size: 1.0,
            ..config
        };
        assert!(matches!(
            RunPlan::prepare(&registries, &taxonomy, &bad, key, FeatureGroupName::All),
            Err(PfsError::Validation(_))
        ));
    }

    #[test]
    fn plan_serializes_for_the_trainer() {
        let (registries, taxonomy, config) = fixtures();
        let key = RegistryKey::new(Fidelity::Main, TaskType::Classification);
        let plan =
            RunPlan::prepare(&registries, &taxonomy, &config, key, FeatureGroupName::Day).unwrap();
        let json = plan.to_json().unwrap();
        let back: RunPlan = serde_json::from_str(&json).unwrap();
        assert_eq!(back, plan);
        assert!(json.contains("\"feature_group\": \"day\""));
    }
}
