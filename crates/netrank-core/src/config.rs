//! Project and user configuration.
//!
//! Project defaults live in `.netrank/config.toml` under the working
//! directory; per-user preferences live in `<config dir>/netrank/config.toml`.
//! Both files are optional and every key has a default.

use serde::{Deserialize, Serialize};
use std::env;
use std::io::IsTerminal;
use std::path::Path;

use crate::error::{NetrankError, Result};
use crate::network::WeightMeaning;

/// Relative location of the project config file.
pub const PROJECT_CONFIG_PATH: &str = ".netrank/config.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub centrality: CentralityDefaults,
    #[serde(default)]
    pub modularity: ModularityDefaults,
    #[serde(default)]
    pub sampling: SamplingDefaults,
}

/// Defaults applied to centrality operations when an input is not given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentralityDefaults {
    #[serde(default)]
    pub weighted: bool,
    #[serde(default)]
    pub weight_column: Option<String>,
    #[serde(default)]
    pub weight_meaning: WeightMeaning,
    #[serde(default = "default_iterations")]
    pub iterations: usize,
}

impl Default for CentralityDefaults {
    fn default() -> Self {
        Self {
            weighted: false,
            weight_column: None,
            weight_meaning: WeightMeaning::default(),
            iterations: default_iterations(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModularityDefaults {
    #[serde(default = "default_cutoff")]
    pub cutoff: usize,
}

impl Default for ModularityDefaults {
    fn default() -> Self {
        Self {
            cutoff: default_cutoff(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingDefaults {
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SamplingDefaults {
    fn default() -> Self {
        Self {
            sample_size: default_sample_size(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
}

/// Load `.netrank/config.toml` below `project_root`, or defaults if absent.
///
/// # Errors
///
/// Returns [`NetrankError::Config`] if the file exists but cannot be read
/// or parsed.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = project_root.join(PROJECT_CONFIG_PATH);
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }
    read_toml(&path)
}

/// Load the per-user config, or defaults if absent.
///
/// # Errors
///
/// Returns [`NetrankError::Config`] if the file exists but cannot be read
/// or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    let path = config_dir.join("netrank/config.toml");
    if !path.exists() {
        return Ok(UserConfig::default());
    }
    read_toml(&path)
}

fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| NetrankError::Config {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    toml::from_str::<T>(&content).map_err(|e| NetrankError::Config {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Resolve the output mode name (`pretty`, `text` or `json`).
///
/// Precedence: `--json` flag, then the `FORMAT` environment variable, then
/// the user config, then TTY detection on stdout.
#[must_use]
pub fn resolve_output(cli_json: bool, user_output: Option<&str>) -> &'static str {
    let env_format = env::var("FORMAT").ok();
    resolve_output_inner(
        cli_json,
        user_output,
        env_format.as_deref(),
        std::io::stdout().is_terminal(),
    )
}

fn resolve_output_inner(
    cli_json: bool,
    user_output: Option<&str>,
    env_format: Option<&str>,
    is_tty: bool,
) -> &'static str {
    if cli_json {
        return "json";
    }

    if let Some(mode) = env_format.and_then(normalize_output_mode) {
        return mode;
    }

    if let Some(mode) = user_output.and_then(normalize_output_mode) {
        return mode;
    }

    if is_tty { "pretty" } else { "text" }
}

/// Canonical output mode for a user-supplied name.
#[must_use]
pub fn normalize_output_mode(raw: &str) -> Option<&'static str> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "pretty" | "human" => Some("pretty"),
        "text" | "table" | "csv" => Some("text"),
        "json" => Some("json"),
        _ => None,
    }
}

const fn default_iterations() -> usize {
    1000
}

const fn default_cutoff() -> usize {
    1
}

const fn default_sample_size() -> usize {
    15
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_project_config_uses_defaults() {
        let root = tempfile::tempdir().expect("temp dir");
        let cfg = load_project_config(root.path()).expect("load should succeed");
        assert!(!cfg.centrality.weighted);
        assert_eq!(cfg.centrality.iterations, 1000);
        assert_eq!(cfg.centrality.weight_meaning, WeightMeaning::Strength);
        assert_eq!(cfg.modularity.cutoff, 1);
        assert_eq!(cfg.sampling.sample_size, 15);
        assert_eq!(cfg.sampling.seed, None);
    }

    #[test]
    fn partial_project_config_keeps_other_defaults() {
        let root = tempfile::tempdir().expect("temp dir");
        std::fs::create_dir_all(root.path().join(".netrank")).expect("mkdir");
        std::fs::write(
            root.path().join(PROJECT_CONFIG_PATH),
            r#"
[centrality]
weighted = true
weight_column = "letters"
weight_meaning = "cost"

[sampling]
seed = 7
"#,
        )
        .expect("write config");

        let cfg = load_project_config(root.path()).expect("load");
        assert!(cfg.centrality.weighted);
        assert_eq!(cfg.centrality.weight_column.as_deref(), Some("letters"));
        assert_eq!(cfg.centrality.weight_meaning, WeightMeaning::Cost);
        assert_eq!(cfg.centrality.iterations, 1000);
        assert_eq!(cfg.sampling.seed, Some(7));
        assert_eq!(cfg.sampling.sample_size, 15);
        assert_eq!(cfg.modularity, ModularityDefaults::default());
    }

    #[test]
    fn malformed_project_config_is_config_error() {
        let root = tempfile::tempdir().expect("temp dir");
        std::fs::create_dir_all(root.path().join(".netrank")).expect("mkdir");
        std::fs::write(root.path().join(PROJECT_CONFIG_PATH), "[centrality\n").expect("write");

        let err = load_project_config(root.path()).expect_err("must fail");
        assert!(matches!(err, NetrankError::Config { .. }));
        assert_eq!(err.code().code(), "E1001");
    }

    #[test]
    fn cli_json_overrides_env_and_config() {
        assert_eq!(resolve_output_inner(true, Some("pretty"), Some("text"), true), "json");
    }

    #[test]
    fn env_beats_user_config() {
        assert_eq!(resolve_output_inner(false, Some("json"), Some("text"), true), "text");
    }

    #[test]
    fn aliases_are_normalized() {
        assert_eq!(resolve_output_inner(false, Some("table"), Some("human"), false), "pretty");
        assert_eq!(resolve_output_inner(false, Some("human"), Some("bogus"), false), "pretty");
    }

    #[test]
    fn tty_decides_when_nothing_is_set() {
        assert_eq!(resolve_output_inner(false, None, None, true), "pretty");
        assert_eq!(resolve_output_inner(false, None, None, false), "text");
    }

    #[test]
    fn user_config_parses_output() {
        let cfg: UserConfig = toml::from_str("output = \"json\"").expect("parse");
        assert_eq!(cfg.output.as_deref(), Some("json"));
    }
}
