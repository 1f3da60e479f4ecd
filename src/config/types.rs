use serde::{Deserialize, Serialize};
use sidm_pipeline::{ActionSpec, RuleSpec};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Placeholder a string param may use to refer to `general.output_dir`.
pub const OUTPUT_DIR_PLACEHOLDER: &str = "GENERAL_OUTPUT_DIR";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    /// Configured processes keyed by name.
    #[serde(default)]
    pub processes: BTreeMap<String, ProcessConfig>,
}

impl Config {
    pub fn process_names(&self) -> Vec<&str> {
        self.processes.keys().map(String::as_str).collect()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Descend into subdirectories of the source directory
    #[serde(default = "default_true")]
    pub recursive: bool,

    /// Halt the whole batch at the first per-file error
    #[serde(default)]
    pub stop_on_error: bool,

    /// Substituted for `GENERAL_OUTPUT_DIR` in binding params
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Default tracing filter when neither `RUST_LOG` nor `--verbose` is set
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Only attempt files with these extensions (empty: every file)
    #[serde(default)]
    pub extensions: Vec<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            recursive: true,
            stop_on_error: false,
            output_dir: default_output_dir(),
            log_level: default_log_level(),
            extensions: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./output")
}

fn default_log_level() -> String {
    "info".to_string()
}

/// One process: rules evaluated first, then gated actions.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProcessConfig {
    #[serde(default)]
    pub rules: Vec<RuleSpec>,

    #[serde(default)]
    pub actions: Vec<ActionSpec>,
}
