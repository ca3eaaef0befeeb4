//! Search registries: active estimators and their grids per
//! (fidelity, task type), with lookup and schema validation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info, warn};

use pfs_types::{
    BaseLearner, EstimatorFamily, Fidelity, HyperparameterSet, ParameterValue, RegistryError,
    RegistryKey, TaskType,
};

use crate::axes::{EstimatorGrid, GridSpec};
use crate::grids;
use crate::schema::{ParameterSchema, SklearnSchema};

/// Active estimator list plus a grid per registered estimator.
///
/// Grids may be registered without being active; such dormant grids are kept
/// intact but are invisible to [`SearchRegistry::grid_for`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRegistry {
    key: RegistryKey,
    active: Vec<EstimatorFamily>,
    grids: BTreeMap<EstimatorFamily, EstimatorGrid>,
}

impl SearchRegistry {
    pub fn builder(key: RegistryKey) -> SearchRegistryBuilder {
        SearchRegistryBuilder {
            key,
            active: Vec::new(),
            specs: BTreeMap::new(),
        }
    }

    pub fn key(&self) -> RegistryKey {
        self.key
    }

    /// Active estimators in declaration order.
    pub fn active(&self) -> &[EstimatorFamily] {
        &self.active
    }

    pub fn is_active(&self, family: EstimatorFamily) -> bool {
        self.active.contains(&family)
    }

    /// Registered but inactive estimators.
    pub fn dormant(&self) -> impl Iterator<Item = EstimatorFamily> + '_ {
        self.grids
            .keys()
            .copied()
            .filter(move |family| !self.is_active(*family))
    }

    /// Configurations of an active estimator, in materialization order.
    pub fn grid_for(&self, estimator_id: &str) -> Result<&[HyperparameterSet], RegistryError> {
        let unknown = || RegistryError::UnknownEstimator {
            estimator: estimator_id.to_string(),
            registry: self.key.to_string(),
        };
        let family: EstimatorFamily = estimator_id.parse().map_err(|_| unknown())?;
        if !self.is_active(family) {
            return Err(unknown());
        }
        self.grids
            .get(&family)
            .map(EstimatorGrid::configurations)
            .ok_or_else(unknown)
    }

    /// Configuration counts of the active estimators.
    pub fn cost(&self) -> CostSummary {
        let estimators: Vec<EstimatorCost> = self
            .active
            .iter()
            .map(|family| EstimatorCost {
                estimator: *family,
                configurations: self.grids.get(family).map_or(0, EstimatorGrid::len),
            })
            .collect();
        let total = estimators.iter().map(|e| e.configurations).sum();
        CostSummary {
            registry: self.key,
            estimators,
            total,
        }
    }

    /// Check every active grid against `schema`, collecting all violations.
    pub fn validate(&self, schema: &dyn ParameterSchema) -> ValidationResult {
        let mut violations = Vec::new();

        for family in &self.active {
            let grid = match self.grids.get(family) {
                Some(grid) if !grid.is_empty() => grid,
                _ => {
                    violations.push(Violation {
                        estimator: *family,
                        position: None,
                        kind: ViolationKind::EmptyGrid,
                    });
                    continue;
                }
            };

            for (position, params) in grid.iter().enumerate() {
                let mut found = Vec::new();
                check_parameters(schema, *family, params, "", &mut found);
                violations.extend(found.into_iter().map(|kind| Violation {
                    estimator: *family,
                    position: Some(position),
                    kind,
                }));
            }
        }

        for violation in &violations {
            warn!(registry = %self.key, "{violation}");
        }
        info!(
            registry = %self.key,
            schema = schema.name(),
            violations = violations.len(),
            "Validated search registry"
        );

        ValidationResult {
            registry: self.key,
            violations,
        }
    }
}

fn check_parameters(
    schema: &dyn ParameterSchema,
    family: EstimatorFamily,
    params: &HyperparameterSet,
    prefix: &str,
    out: &mut Vec<ViolationKind>,
) {
    for (name, value) in params.iter() {
        let path = format!("{prefix}{name}");
        let Some(spec) = schema.parameter(family, name) else {
            out.push(ViolationKind::UnknownParameter {
                family,
                parameter: path,
            });
            continue;
        };

        if !spec.accepts(value) {
            out.push(ViolationKind::ValueOutOfDomain {
                family,
                parameter: path.clone(),
                value: value.to_string(),
                expected: spec.describe_domains(),
            });
        }

        if let ParameterValue::BaseLearner(BaseLearner::Configured {
            family: nested,
            params: nested_params,
        }) = value
        {
            check_parameters(schema, *nested, nested_params, &format!("{path}."), out);
        }
    }
}

/// Builder enforcing the structural invariants of a [`SearchRegistry`].
#[derive(Debug, Clone)]
pub struct SearchRegistryBuilder {
    key: RegistryKey,
    active: Vec<EstimatorFamily>,
    specs: BTreeMap<EstimatorFamily, GridSpec>,
}

impl SearchRegistryBuilder {
    /// Register a grid and mark the estimator active.
    pub fn active(mut self, family: EstimatorFamily, grid: GridSpec) -> Self {
        self.specs.insert(family, grid);
        if !self.active.contains(&family) {
            self.active.push(family);
        }
        self
    }

    /// Register a grid without activating it.
    pub fn dormant(mut self, family: EstimatorFamily, grid: GridSpec) -> Self {
        self.specs.insert(family, grid);
        self
    }

    /// Mark an estimator active without registering a grid; `build` fails
    /// unless a grid is registered too.
    pub fn activate(mut self, family: EstimatorFamily) -> Self {
        if !self.active.contains(&family) {
            self.active.push(family);
        }
        self
    }

    pub fn build(self) -> Result<SearchRegistry, RegistryError> {
        for family in self.specs.keys() {
            if family.task_type() != self.key.task_type {
                return Err(RegistryError::TaskTypeMismatch {
                    estimator: family.to_string(),
                    actual: family.task_type().to_string(),
                    registry: self.key.to_string(),
                });
            }
        }
        for family in &self.active {
            if !self.specs.contains_key(family) {
                return Err(RegistryError::MissingGrid {
                    estimator: family.to_string(),
                    registry: self.key.to_string(),
                });
            }
        }

        let mut grids = BTreeMap::new();
        for (family, spec) in &self.specs {
            let grid = spec.build(*family).inspect_err(|err| {
                warn!(registry = %self.key, "{err}");
            })?;
            debug!(
                registry = %self.key,
                estimator = %family,
                configurations = grid.len(),
                active = self.active.contains(family),
                "Registered estimator grid"
            );
            grids.insert(*family, grid);
        }

        Ok(SearchRegistry {
            key: self.key,
            active: self.active,
            grids,
        })
    }
}

/// All search registries plus the schema they are validated against.
#[derive(Debug)]
pub struct SearchRegistries {
    registries: BTreeMap<RegistryKey, SearchRegistry>,
    schema: Box<dyn ParameterSchema>,
}

impl SearchRegistries {
    /// The four standard registries, validated against scikit-learn.
    pub fn new() -> Result<Self, RegistryError> {
        Self::with_schema(grids::standard_registries()?, SklearnSchema)
    }

    /// Fails if two registries share a (fidelity, task type) key.
    pub fn with_schema(
        registries: impl IntoIterator<Item = SearchRegistry>,
        schema: impl ParameterSchema + 'static,
    ) -> Result<Self, RegistryError> {
        let mut by_key = BTreeMap::new();
        for registry in registries {
            let key = registry.key();
            if by_key.insert(key, registry).is_some() {
                return Err(RegistryError::DuplicateRegistry {
                    registry: key.to_string(),
                });
            }
        }
        info!(
            registries = by_key.len(),
            schema = schema.name(),
            "Search registries ready"
        );
        Ok(Self {
            registries: by_key,
            schema: Box::new(schema),
        })
    }

    pub fn schema(&self) -> &dyn ParameterSchema {
        self.schema.as_ref()
    }

    pub fn keys(&self) -> impl Iterator<Item = RegistryKey> + '_ {
        self.registries.keys().copied()
    }

    pub fn registry(
        &self,
        fidelity: Fidelity,
        task_type: TaskType,
    ) -> Result<&SearchRegistry, RegistryError> {
        self.registries
            .get(&RegistryKey::new(fidelity, task_type))
            .ok_or_else(|| RegistryError::UnknownRegistry {
                fidelity: fidelity.to_string(),
                task_type: task_type.to_string(),
            })
    }

    pub fn list_active_estimators(
        &self,
        fidelity: Fidelity,
        task_type: TaskType,
    ) -> Result<&[EstimatorFamily], RegistryError> {
        Ok(self.registry(fidelity, task_type)?.active())
    }

    pub fn grid_for(
        &self,
        fidelity: Fidelity,
        task_type: TaskType,
        estimator_id: &str,
    ) -> Result<&[HyperparameterSet], RegistryError> {
        self.registry(fidelity, task_type)?.grid_for(estimator_id)
    }

    pub fn validate(
        &self,
        fidelity: Fidelity,
        task_type: TaskType,
    ) -> Result<ValidationResult, RegistryError> {
        Ok(self
            .registry(fidelity, task_type)?
            .validate(self.schema.as_ref()))
    }

    /// Validate every registry.
    pub fn validate_all(&self) -> Vec<ValidationResult> {
        self.registries
            .values()
            .map(|registry| registry.validate(self.schema.as_ref()))
            .collect()
    }
}

/// Configuration count for one estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimatorCost {
    pub estimator: EstimatorFamily,
    pub configurations: usize,
}

/// How many configurations a trainer would fit for a registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostSummary {
    pub registry: RegistryKey,
    pub estimators: Vec<EstimatorCost>,
    pub total: usize,
}

impl CostSummary {
    /// Number of model fits for k-fold cross-validation, saturating.
    pub fn fits_for_folds(&self, folds: usize) -> usize {
        self.total.saturating_mul(folds)
    }

    /// The estimator with the most configurations.
    pub fn largest(&self) -> Option<EstimatorCost> {
        self.estimators
            .iter()
            .copied()
            .max_by_key(|cost| cost.configurations)
    }
}

/// What went wrong with a grid or one of its configurations.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViolationKind {
    /// The estimator is active but has no configurations.
    EmptyGrid,
    /// Parameter name not accepted by `family`.
    UnknownParameter {
        family: EstimatorFamily,
        parameter: String,
    },
    /// Parameter accepted by `family`, value is not.
    ValueOutOfDomain {
        family: EstimatorFamily,
        parameter: String,
        value: String,
        expected: String,
    },
}

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub estimator: EstimatorFamily,
    /// Index of the offending configuration; `None` for grid-level findings.
    pub position: Option<usize>,
    pub kind: ViolationKind,
}

impl Violation {
    /// The per-configuration error this violation corresponds to, if any.
    pub fn to_error(&self) -> Option<RegistryError> {
        let position = self.position?;
        Some(RegistryError::InvalidHyperparameterSet {
            estimator: self.estimator.to_string(),
            position,
            reason: self.describe_kind(),
        })
    }

    fn describe_kind(&self) -> String {
        match &self.kind {
            ViolationKind::EmptyGrid => "grid has no configurations".to_string(),
            ViolationKind::UnknownParameter { family, parameter } => {
                format!("{family} does not accept parameter {parameter}")
            }
            ViolationKind::ValueOutOfDomain {
                family,
                parameter,
                value,
                expected,
            } => format!("{family} parameter {parameter}={value}, expected {expected}"),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(position) => write!(
                f,
                "{} configuration #{position}: {}",
                self.estimator,
                self.describe_kind()
            ),
            None => write!(f, "{}: {}", self.estimator, self.describe_kind()),
        }
    }
}

/// Outcome of validating one registry. Empty means valid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pub registry: RegistryKey,
    pub violations: Vec<Violation>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Turn findings into an error carrying every violation.
    pub fn into_result(self) -> Result<(), RegistryError> {
        if self.is_valid() {
            return Ok(());
        }
        Err(RegistryError::Invalid {
            registry: self.registry.to_string(),
            violations: self.violations.iter().map(ToString::to_string).collect(),
        })
    }
}
