//! Feature taxonomy: named column groups used to slice the joined
//! household/satellite table.
//!
//! Three leaf groups partition the feature columns:
//! - `day`: Landsat-7 2011 band values followed by every pairwise band ratio
//! - `night_raw`: DMSP-OLS 2011 and VIIRS 2012 luminosity
//! - `night_imputed`: the imputed versions of the night-light measures
//!
//! Two derived groups are concatenations of leaves: `night` is
//! `night_raw ++ night_imputed` and `all` is `night ++ day`.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::errors::FeatureError;

/// Number of Landsat-7 bands in the day-time imagery.
pub const LANDSAT_BANDS: usize = 7;

/// Names of the feature groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureGroupName {
    Day,
    NightRaw,
    NightImputed,
    Night,
    All,
}

impl FeatureGroupName {
    pub const ALL: [FeatureGroupName; 5] = [
        Self::Day,
        Self::NightRaw,
        Self::NightImputed,
        Self::Night,
        Self::All,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::NightRaw => "night_raw",
            Self::NightImputed => "night_imputed",
            Self::Night => "night",
            Self::All => "all",
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Day | Self::NightRaw | Self::NightImputed)
    }
}

impl fmt::Display for FeatureGroupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeatureGroupName {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|group| group.as_str() == s)
            .ok_or_else(|| FeatureError::UnknownGroup {
                name: s.to_string(),
            })
    }
}

/// A named, ordered list of unique column identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFeatureGroup")]
pub struct FeatureGroup {
    pub name: FeatureGroupName,
    columns: Vec<String>,
}

impl FeatureGroup {
    /// Build a group, rejecting repeated identifiers.
    pub fn new(name: FeatureGroupName, columns: Vec<String>) -> Result<Self, FeatureError> {
        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(FeatureError::DuplicateFeatureIdentifier {
                    identifier: column.clone(),
                    group: name.to_string(),
                });
            }
        }
        Ok(Self { name, columns })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}

/// The full set of feature groups, built once and read-only afterwards.
///
/// Serialized as its three leaves; the derived groups are rebuilt on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TaxonomyLeaves", into = "TaxonomyLeaves")]
pub struct FeatureTaxonomy {
    day: FeatureGroup,
    night_raw: FeatureGroup,
    night_imputed: FeatureGroup,
    night: FeatureGroup,
    all: FeatureGroup,
}

impl FeatureTaxonomy {
    /// The satellite feature catalogue used by the income models.
    pub fn new() -> Result<Self, FeatureError> {
        Self::from_leaves(day_columns(), night_raw_columns(), night_imputed_columns())
    }

    /// Assemble a taxonomy from leaf column lists. Fails if any identifier
    /// repeats within a leaf or appears in more than one leaf.
    pub fn from_leaves(
        day: Vec<String>,
        night_raw: Vec<String>,
        night_imputed: Vec<String>,
    ) -> Result<Self, FeatureError> {
        let day = FeatureGroup::new(FeatureGroupName::Day, day)?;
        let night_raw = FeatureGroup::new(FeatureGroupName::NightRaw, night_raw)?;
        let night_imputed = FeatureGroup::new(FeatureGroupName::NightImputed, night_imputed)?;

        let night = FeatureGroup::new(
            FeatureGroupName::Night,
            concat(&[&night_raw, &night_imputed]),
        )?;
        let all = FeatureGroup::new(FeatureGroupName::All, concat(&[&night, &day]))?;

        tracing::debug!(
            day = day.len(),
            night = night.len(),
            all = all.len(),
            "Built feature taxonomy"
        );

        Ok(Self {
            day,
            night_raw,
            night_imputed,
            night,
            all,
        })
    }

    pub fn group(&self, name: FeatureGroupName) -> &FeatureGroup {
        match name {
            FeatureGroupName::Day => &self.day,
            FeatureGroupName::NightRaw => &self.night_raw,
            FeatureGroupName::NightImputed => &self.night_imputed,
            FeatureGroupName::Night => &self.night,
            FeatureGroupName::All => &self.all,
        }
    }

    /// Ordered column identifiers for a group given by name.
    pub fn resolve(&self, group_name: &str) -> Result<&[String], FeatureError> {
        let name: FeatureGroupName = group_name.parse()?;
        Ok(self.group(name).columns())
    }

    /// The leaf group that owns `column`, if any.
    pub fn leaf_of(&self, column: &str) -> Option<FeatureGroupName> {
        [&self.day, &self.night_raw, &self.night_imputed]
            .into_iter()
            .find(|group| group.contains(column))
            .map(|group| group.name)
    }
}

#[derive(Deserialize)]
struct RawFeatureGroup {
    name: FeatureGroupName,
    columns: Vec<String>,
}

impl TryFrom<RawFeatureGroup> for FeatureGroup {
    type Error = FeatureError;

    fn try_from(raw: RawFeatureGroup) -> Result<Self, Self::Error> {
        Self::new(raw.name, raw.columns)
    }
}

#[derive(Serialize, Deserialize)]
struct TaxonomyLeaves {
    day: Vec<String>,
    night_raw: Vec<String>,
    night_imputed: Vec<String>,
}

impl TryFrom<TaxonomyLeaves> for FeatureTaxonomy {
    type Error = FeatureError;

    fn try_from(leaves: TaxonomyLeaves) -> Result<Self, Self::Error> {
        Self::from_leaves(leaves.day, leaves.night_raw, leaves.night_imputed)
    }
}

impl From<FeatureTaxonomy> for TaxonomyLeaves {
    fn from(taxonomy: FeatureTaxonomy) -> Self {
        Self {
            day: taxonomy.day.columns,
            night_raw: taxonomy.night_raw.columns,
            night_imputed: taxonomy.night_imputed.columns,
        }
    }
}

fn concat(groups: &[&FeatureGroup]) -> Vec<String> {
    groups
        .iter()
        .flat_map(|group| group.columns().iter().cloned())
        .collect()
}

/// Band values `l7_2011_1..7` then ratios `ratio_i_j` for every `i < j`.
fn day_columns() -> Vec<String> {
    let bands = (1..=LANDSAT_BANDS).map(|band| format!("l7_2011_{band}"));
    let ratios = (1..=LANDSAT_BANDS)
        .flat_map(|i| (i + 1..=LANDSAT_BANDS).map(move |j| format!("ratio_{i}_{j}")));
    bands.chain(ratios).collect()
}

fn night_raw_columns() -> Vec<String> {
    vec!["dmspols_2011".to_string(), "viirs_2012".to_string()]
}

fn night_imputed_columns() -> Vec<String> {
    vec![
        "dmspols_2011_imputed".to_string(),
        "viirs_2012_imputed".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn taxonomy() -> FeatureTaxonomy {
        FeatureTaxonomy::new().unwrap()
    }

    #[test]
    fn group_sizes() {
        let t = taxonomy();
        assert_eq!(t.resolve("day").unwrap().len(), 28);
        assert_eq!(t.resolve("night").unwrap().len(), 4);
        assert_eq!(t.resolve("night_raw").unwrap().len(), 2);
        assert_eq!(t.resolve("night_imputed").unwrap().len(), 2);
        assert_eq!(t.resolve("all").unwrap().len(), 32);
    }

    #[test]
    fn all_is_night_then_day() {
        let t = taxonomy();
        let mut expected = t.resolve("night").unwrap().to_vec();
        expected.extend_from_slice(t.resolve("day").unwrap());
        assert_eq!(t.resolve("all").unwrap(), expected.as_slice());

        let unique: HashSet<&String> = expected.iter().collect();
        assert_eq!(unique.len(), expected.len());
    }

    #[test]
    fn every_column_has_exactly_one_leaf() {
        let t = taxonomy();
        for column in t.resolve("all").unwrap() {
            let owners = FeatureGroupName::ALL
                .into_iter()
                .filter(|name| name.is_leaf() && t.group(*name).contains(column))
                .count();
            assert_eq!(owners, 1, "{column} owned by {owners} leaf groups");
            assert!(t.leaf_of(column).is_some());
        }
    }

    #[test]
    fn day_column_order() {
        let t = taxonomy();
        let day = t.resolve("day").unwrap();
        assert_eq!(day[0], "l7_2011_1");
        assert_eq!(day[6], "l7_2011_7");
        assert_eq!(day[7], "ratio_1_2");
        assert_eq!(day[12], "ratio_1_7");
        assert_eq!(day[13], "ratio_2_3");
        assert_eq!(day[27], "ratio_6_7");
        assert_eq!(
            t.resolve("night").unwrap(),
            [
                "dmspols_2011",
                "viirs_2012",
                "dmspols_2011_imputed",
                "viirs_2012_imputed"
            ]
        );
    }

    #[test]
    fn unknown_group_is_rejected() {
        let t = taxonomy();
        assert_eq!(
            t.resolve("infrared"),
            Err(FeatureError::UnknownGroup {
                name: "infrared".into()
            })
        );
        assert!(t.resolve("ALL").is_err());
    }

    #[test]
    fn duplicate_within_leaf_is_rejected() {
        let result = FeatureTaxonomy::from_leaves(
            vec!["l7_2011_1".into(), "l7_2011_1".into()],
            night_raw_columns(),
            night_imputed_columns(),
        );
        assert_eq!(
            result,
            Err(FeatureError::DuplicateFeatureIdentifier {
                identifier: "l7_2011_1".into(),
                group: "day".into()
            })
        );
    }

    #[test]
    fn duplicate_across_leaves_is_rejected() {
        let result = FeatureTaxonomy::from_leaves(
            vec!["viirs_2012".into()],
            night_raw_columns(),
            night_imputed_columns(),
        );
        match result {
            Err(FeatureError::DuplicateFeatureIdentifier { identifier, group }) => {
                assert_eq!(identifier, "viirs_2012");
                assert_eq!(group, "all");
            }
            other => panic!("expected duplicate error, got {other:?}"),
        }
    }

    #[test]
    fn deserialized_taxonomy_is_rebuilt_from_leaves() {
        let t = taxonomy();
        let json = serde_json::to_string(&t).unwrap();
        assert!(!json.contains("\"all\""));
        let back: FeatureTaxonomy = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);

        let custom: FeatureTaxonomy = serde_json::from_str(
            r#"{"day": ["b1", "b2"], "night_raw": ["n1"], "night_imputed": ["n1_imp"]}"#,
        )
        .unwrap();
        assert_eq!(custom.resolve("all").unwrap(), ["n1", "n1_imp", "b1", "b2"]);
    }

    #[test]
    fn deserializing_duplicates_is_rejected() {
        let repeated = serde_json::from_str::<FeatureTaxonomy>(
            r#"{"day": ["x", "x"], "night_raw": ["y"], "night_imputed": ["z"]}"#,
        );
        let err = repeated.unwrap_err().to_string();
        assert!(err.contains("x"), "{err}");

        let shared = serde_json::from_str::<FeatureTaxonomy>(
            r#"{"day": ["y"], "night_raw": ["y"], "night_imputed": ["z"]}"#,
        );
        assert!(shared.is_err());

        let group = serde_json::from_str::<FeatureGroup>(
            r#"{"name": "night", "columns": ["viirs_2012", "viirs_2012"]}"#,
        );
        assert!(group.is_err());
    }
}
