//! # pfs-search
//!
//! Hyperparameter search spaces for the Poverty-from-the-Sky income models.
//!
//! Provides named-axis grid specifications, the four standard search
//! registries ({test, main} x {regression, classification}), validation
//! against an estimator parameter schema, and run plans for the trainer.

mod axes;
pub mod grids;
mod plan;
mod registry;
mod schema;

pub use axes::{Axis, EstimatorGrid, GridSpec};
pub use plan::{PlanId, PlannedFit, RunPlan};
pub use registry::{
    CostSummary, EstimatorCost, SearchRegistries, SearchRegistry, SearchRegistryBuilder,
    ValidationResult, Violation, ViolationKind,
};
pub use schema::{Domain, ParamSpec, ParameterSchema, SklearnSchema};
