mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    resolve_references(&mut config);

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./sidm.toml",
        "./config.toml",
        "~/.config/sidm/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    // Return default config if no file found
    Ok(Config::default())
}

/// Replace `GENERAL_OUTPUT_DIR` in every binding's params.
fn resolve_references(config: &mut Config) {
    let output_dir = config.general.output_dir.to_string_lossy().into_owned();
    for process in config.processes.values_mut() {
        for rule in &mut process.rules {
            rule.params
                .replace_placeholder(OUTPUT_DIR_PLACEHOLDER, &output_dir);
        }
        for action in &mut process.actions {
            action
                .params
                .replace_placeholder(OUTPUT_DIR_PLACEHOLDER, &output_dir);
        }
    }
}

/// Validate configuration.
///
/// Structural problems are errors. Suspicious but runnable setups come back
/// as warnings for the caller to log.
pub fn validate_config(config: &Config) -> Result<Vec<String>> {
    let mut warnings = Vec::new();

    for (name, process) in &config.processes {
        if name.trim().is_empty() {
            anyhow::bail!("Process names cannot be empty");
        }
        if process.actions.is_empty() {
            anyhow::bail!("Process '{}' has no actions", name);
        }

        let mut rule_names = HashSet::new();
        for rule in &process.rules {
            if rule.name.trim().is_empty() || rule.plugin.trim().is_empty() {
                anyhow::bail!("Process '{}' has a rule without a name or plugin", name);
            }
            if !rule_names.insert(rule.name.as_str()) {
                anyhow::bail!("Process '{}' declares rule '{}' twice", name, rule.name);
            }
        }

        let mut action_names = HashSet::new();
        for action in &process.actions {
            if action.name.trim().is_empty() || action.plugin.trim().is_empty() {
                anyhow::bail!("Process '{}' has an action without a name or plugin", name);
            }
            if !action_names.insert(action.name.as_str()) {
                anyhow::bail!("Process '{}' declares action '{}' twice", name, action.name);
            }
            for condition in &action.conditions {
                if !rule_names.contains(condition.as_str()) {
                    warnings.push(format!(
                        "Process '{}': action '{}' is gated on undeclared rule '{}' and will never run",
                        name, action.name, condition
                    ));
                }
            }
        }

        if process.rules.is_empty() {
            warnings.push(format!(
                "Process '{}' has no rules; it will skip every file",
                name
            ));
        }
    }

    Ok(warnings)
}
