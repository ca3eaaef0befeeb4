use anyhow::{bail, Context};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use pfs_search::{RunPlan, SearchRegistries};
use pfs_types::{ExperimentConfig, FeatureGroupName, FeatureTaxonomy, RegistryKey};

const USAGE: &str = "usage: pfs-grid-report <test|main> <regression|classification> [feature-group]";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (fidelity, task_type) = match args.as_slice() {
        [fidelity, task_type] | [fidelity, task_type, _] => (fidelity, task_type),
        _ => bail!(USAGE),
    };
    let key = RegistryKey::parse(fidelity, task_type)?;

    let config = ExperimentConfig::from_env().context("invalid experiment configuration")?;
    let taxonomy = FeatureTaxonomy::new()?;
    let registries = SearchRegistries::new()?;

    if let Some(group) = args.get(2) {
        let group: FeatureGroupName = group.parse()?;
        let plan = RunPlan::prepare(&registries, &taxonomy, &config, key, group)?;
        println!("{}", plan.to_json()?);
        return Ok(());
    }

    let registry = registries.registry(key.fidelity, key.task_type)?;
    let validation = registry.validate(registries.schema());
    let report = json!({
        "registry": key,
        "schema": registries.schema().name(),
        "active": registry.active(),
        "dormant": registry.dormant().collect::<Vec<_>>(),
        "cost": registry.cost(),
        "validation": validation,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !validation.is_valid() {
        bail!(
            "{key} registry has {} violation(s); refusing to report it as runnable",
            validation.violations.len()
        );
    }
    Ok(())
}
