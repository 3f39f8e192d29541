//! Typed operation configuration.
//!
//! Operations never read loose scalar inputs directly: they parse them once
//! into one of these structs. [`project_defaults`] turns the project config
//! file into input values so callers can apply it underneath explicit
//! inputs.

use netrank_analysis::community::CommunityLimits;
use netrank_core::config::ProjectConfig;
use netrank_core::{NetrankError, Result, WeightMeaning};

use crate::value::{Value, ValueMap};

/// Default eigenvector iteration limit.
pub const DEFAULT_ITERATIONS: i64 = 1000;

/// Default row count for table sampling.
pub const DEFAULT_SAMPLE_SIZE: i64 = 15;

/// Settings shared by the centrality operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CentralityConfig {
    /// Also compute the weighted variant as a secondary column.
    pub weighted: bool,
    /// Edge attribute holding weights; `None` falls back to `weight`.
    pub weight_column: Option<String>,
    pub weight_meaning: WeightMeaning,
    /// Power-iteration limit (eigenvector only).
    pub iterations: usize,
}

impl Default for CentralityConfig {
    fn default() -> Self {
        Self {
            weighted: false,
            weight_column: None,
            weight_meaning: WeightMeaning::Strength,
            iterations: usize::try_from(DEFAULT_ITERATIONS).unwrap_or(usize::MAX),
        }
    }
}

impl CentralityConfig {
    /// Parse from bound operation inputs. Absent fields keep their default;
    /// an empty `weight_column` means none.
    ///
    /// # Errors
    ///
    /// Mistyped inputs, an unknown weight meaning, or fewer than one
    /// iteration.
    pub fn from_inputs(inputs: &ValueMap) -> Result<Self> {
        let mut config = Self::default();
        if let Some(weighted) = inputs.opt_boolean("weighted")? {
            config.weighted = weighted;
        }
        config.weight_column = inputs
            .opt_string("weight_column")?
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        if let Some(raw) = inputs.opt_string("weight_meaning")? {
            config.weight_meaning = WeightMeaning::parse(raw).ok_or_else(|| {
                NetrankError::invalid_input(
                    "weight_meaning",
                    format!("'{raw}' is neither 'strength' nor 'cost'"),
                )
            })?;
        }
        if let Some(iterations) = inputs.opt_integer("iterations")? {
            config.iterations = positive("iterations", iterations)?;
        }
        Ok(config)
    }
}

/// Settings for greedy modularity communities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModularityConfig {
    pub cutoff: usize,
    pub best_n: Option<usize>,
}

impl Default for ModularityConfig {
    fn default() -> Self {
        Self {
            cutoff: 1,
            best_n: None,
        }
    }
}

impl ModularityConfig {
    /// Parse from bound operation inputs.
    ///
    /// # Errors
    ///
    /// [`NetrankError::InvalidPartition`] for a zero or negative count.
    pub fn from_inputs(inputs: &ValueMap) -> Result<Self> {
        let count = |name: &str, raw: i64| {
            usize::try_from(raw)
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| NetrankError::InvalidPartition(format!("{name}={raw} must be at least 1")))
        };
        let cutoff = match inputs.opt_integer("cutoff")? {
            Some(raw) => count("cutoff", raw)?,
            None => 1,
        };
        let best_n = inputs
            .opt_integer("best_n")?
            .map(|raw| count("best_n", raw))
            .transpose()?;
        Ok(Self { cutoff, best_n })
    }

    #[must_use]
    pub const fn limits(self) -> CommunityLimits {
        CommunityLimits {
            cutoff: self.cutoff,
            best_n: self.best_n,
        }
    }
}

/// Settings for random table sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleConfig {
    pub sample_size: usize,
    /// Fixed seed for reproducible samples.
    pub seed: Option<u64>,
}

impl SampleConfig {
    /// Parse from bound operation inputs.
    ///
    /// # Errors
    ///
    /// Negative size or seed.
    pub fn from_inputs(inputs: &ValueMap) -> Result<Self> {
        let sample_size = match inputs.opt_integer("sample_size")? {
            Some(raw) => usize::try_from(raw).map_err(|_| {
                NetrankError::invalid_input("sample_size", format!("{raw} is negative"))
            })?,
            None => usize::try_from(DEFAULT_SAMPLE_SIZE).unwrap_or_default(),
        };
        let seed = inputs
            .opt_integer("seed")?
            .map(|raw| {
                u64::try_from(raw)
                    .map_err(|_| NetrankError::invalid_input("seed", format!("{raw} is negative")))
            })
            .transpose()?;
        Ok(Self { sample_size, seed })
    }
}

fn positive(field: &str, raw: i64) -> Result<usize> {
    usize::try_from(raw)
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| NetrankError::invalid_input(field, format!("{raw} must be at least 1")))
}

/// Input values implied by the project config.
///
/// Keys use the operation input names (`weighted`, `weight_column`,
/// `weight_meaning`, `iterations`, `cutoff`, `sample_size`, `seed`); callers
/// apply only those an operation declares and the user did not give.
#[must_use]
pub fn project_defaults(config: &ProjectConfig) -> ValueMap {
    let mut values = ValueMap::new()
        .with("weighted", config.centrality.weighted)
        .with(
            "weight_meaning",
            match config.centrality.weight_meaning {
                WeightMeaning::Strength => "strength",
                WeightMeaning::Cost => "cost",
            },
        )
        .with("iterations", saturating_i64(config.centrality.iterations))
        .with("cutoff", saturating_i64(config.modularity.cutoff))
        .with("sample_size", saturating_i64(config.sampling.sample_size));
    if let Some(column) = &config.centrality.weight_column {
        values.insert("weight_column", Value::from(column.as_str()));
    }
    if let Some(seed) = config.sampling.seed {
        values.insert("seed", Value::Integer(i64::try_from(seed).unwrap_or(i64::MAX)));
    }
    values
}

fn saturating_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use netrank_core::ErrorCode;

    #[test]
    fn centrality_defaults() {
        let config = CentralityConfig::from_inputs(&ValueMap::new()).expect("defaults");
        assert_eq!(config, CentralityConfig::default());
        assert_eq!(config.iterations, 1000);
        assert_eq!(i64::try_from(config.iterations).ok(), Some(DEFAULT_ITERATIONS));
    }

    #[test]
    fn empty_weight_column_means_none() {
        let inputs = ValueMap::new().with("weight_column", "  ").with("weighted", true);
        let config = CentralityConfig::from_inputs(&inputs).expect("parse");
        assert!(config.weighted);
        assert_eq!(config.weight_column, None);
    }

    #[test]
    fn weight_meaning_accepts_cost_and_rejects_junk() {
        let cost = ValueMap::new().with("weight_meaning", "cost");
        assert_eq!(
            CentralityConfig::from_inputs(&cost).expect("cost").weight_meaning,
            WeightMeaning::Cost
        );
        let junk = ValueMap::new().with("weight_meaning", "heavy");
        assert!(CentralityConfig::from_inputs(&junk).is_err());
    }

    #[test]
    fn zero_iterations_rejected() {
        let inputs = ValueMap::new().with("iterations", 0i64);
        assert!(CentralityConfig::from_inputs(&inputs).is_err());
    }

    #[test]
    fn negative_community_count_is_partition_error() {
        let inputs = ValueMap::new().with("best_n", -2i64);
        let err = ModularityConfig::from_inputs(&inputs).expect_err("negative");
        assert_eq!(err.code(), ErrorCode::InvalidPartition);
        assert!(err.to_string().contains("best_n=-2"));
    }

    #[test]
    fn sample_defaults_to_fifteen() {
        let config = SampleConfig::from_inputs(&ValueMap::new()).expect("defaults");
        assert_eq!(config.sample_size, 15);
        assert_eq!(i64::try_from(config.sample_size).ok(), Some(DEFAULT_SAMPLE_SIZE));
        assert_eq!(config.seed, None);
    }

    #[test]
    fn project_defaults_carry_config_values() {
        let mut config = ProjectConfig::default();
        config.centrality.weight_column = Some("letters".to_string());
        config.sampling.seed = Some(7);
        let values = project_defaults(&config);
        assert_eq!(values.string("weight_column").expect("column"), "letters");
        assert_eq!(values.integer("seed").expect("seed"), 7);
        assert_eq!(values.string("weight_meaning").expect("meaning"), "strength");
        assert_eq!(values.integer("cutoff").expect("cutoff"), 1);
    }
}
