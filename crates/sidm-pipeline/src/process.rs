//! A named, ordered composition of rule bindings and action bindings.
//!
//! One evaluation of a process against a file happens in two phases:
//!
//! 1. [`Process::apply`] runs every rule, in declared order, and collects the
//!    outcomes. A failing rule is logged and recorded as errored (false);
//!    it never stops the phase.
//! 2. [`Process::execute`] runs every action whose conditions all hold,
//!    threading the working set from one action into the next. A failing
//!    action aborts the phase and surfaces as
//!    [`Error::ActionExecution`](sidm_common::Error::ActionExecution).

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use sidm_common::error::display_paths;
use sidm_common::{Capability, Error, Metadata, Params, Result, RunLog};

use crate::outcome::{RuleOutcome, RuleResults};
use crate::plugin::{ActionUnit, Rule};
use crate::registry::PluginRegistry;
use crate::spec::{ActionSpec, RuleSpec};

/// A rule unit bound to its name.
pub struct RuleBinding {
    name: String,
    unit: Box<dyn Rule>,
}

/// An action unit bound to its name and gating conditions.
pub struct ActionBinding {
    name: String,
    conditions: Vec<String>,
    unit: ActionUnit,
}

impl ActionBinding {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn conditions(&self) -> &[String] {
        &self.conditions
    }
}

/// One curation pipeline.
pub struct Process {
    name: String,
    rules: Vec<RuleBinding>,
    actions: Vec<ActionBinding>,
    log: RunLog,
}

impl Process {
    /// Start building a process whose units are supplied directly.
    pub fn builder(name: impl Into<String>, log: &RunLog) -> ProcessBuilder {
        ProcessBuilder {
            process: Process {
                name: name.into(),
                rules: Vec::new(),
                actions: Vec::new(),
                log: log.clone(),
            },
            rule_names: HashSet::new(),
            action_names: HashSet::new(),
        }
    }

    /// Build a process from descriptors, resolving each unit from `registry`
    /// and initializing it once.
    ///
    /// # Errors
    ///
    /// Any resolution or initialization failure aborts construction.
    pub fn from_specs(
        name: impl Into<String>,
        rules: &[RuleSpec],
        actions: &[ActionSpec],
        registry: &PluginRegistry,
        log: &RunLog,
    ) -> Result<Self> {
        let mut builder = Self::builder(name, log);
        for spec in rules {
            let unit = registry.resolve_rule(&spec.plugin, log)?;
            builder = builder.rule(&spec.name, unit, &spec.params)?;
        }
        for spec in actions {
            let unit = registry.resolve_action(&spec.plugin, log)?;
            builder = builder.action(&spec.name, unit, &spec.params, spec.conditions.clone())?;
        }
        Ok(builder.build())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|b| b.name.as_str()).collect()
    }

    pub fn actions(&self) -> &[ActionBinding] {
        &self.actions
    }

    /// `(action, condition)` pairs whose condition names no declared rule.
    pub fn undeclared_conditions(&self) -> Vec<(&str, &str)> {
        let declared: HashSet<&str> = self.rules.iter().map(|b| b.name.as_str()).collect();
        self.actions
            .iter()
            .flat_map(|a| {
                a.conditions
                    .iter()
                    .filter(|c| !declared.contains(c.as_str()))
                    .map(move |c| (a.name.as_str(), c.as_str()))
            })
            .collect()
    }

    /// Evaluate every rule against `path`.
    pub fn apply(&mut self, path: &Path, metadata: &Metadata) -> RuleResults {
        let mut results = RuleResults::new();

        for binding in &mut self.rules {
            let outcome = match binding.unit.apply(path, metadata) {
                Ok(matched) => RuleOutcome::from(matched),
                Err(e) => {
                    self.log.append(format!(
                        "Error applying rule {} to {}: {}",
                        binding.name,
                        path.display(),
                        e
                    ));
                    RuleOutcome::Errored(e.to_string())
                }
            };
            tracing::debug!(
                process = %self.name,
                rule = %binding.name,
                ?outcome,
                "Rule evaluated: {}",
                path.display()
            );
            results.record(binding.name.clone(), outcome);
        }

        results
    }

    /// Run the gated actions, threading the working set through them.
    ///
    /// # Errors
    ///
    /// The first action failure stops the phase and is returned as
    /// [`Error::ActionExecution`]; later actions do not run.
    pub fn execute(
        &mut self,
        paths: Vec<PathBuf>,
        metadata: &Metadata,
        results: &RuleResults,
    ) -> Result<Vec<PathBuf>> {
        let mut current = paths;

        for binding in &mut self.actions {
            let unmet = results.unmet(&binding.conditions);
            if !unmet.is_empty() {
                self.log.append(format!(
                    "Skipped action {} for {} due to unmet conditions: {}",
                    binding.name,
                    display_paths(&current),
                    describe_unmet(&unmet, results)
                ));
                continue;
            }

            current = match &mut binding.unit {
                ActionUnit::Transform(unit) => {
                    if current.is_empty() {
                        self.log.append(format!(
                            "Skipped action {} in process '{}': artifact no longer exists",
                            binding.name, self.name
                        ));
                        continue;
                    }
                    unit.execute(current.clone(), metadata)
                        .map_err(|e| Error::action_execution(&binding.name, &current, e))?
                }
                ActionUnit::Source(unit) => unit
                    .generate(metadata)
                    .map_err(|e| Error::action_execution(&binding.name, &[], e))?,
            };

            tracing::debug!(
                process = %self.name,
                action = %binding.name,
                "Action produced: {}",
                display_paths(&current)
            );
        }

        Ok(current)
    }

    /// End-of-run hook forwarded to every unit.
    pub fn finalize(&mut self) {
        for binding in &mut self.rules {
            binding.unit.finalize();
        }
        for binding in &mut self.actions {
            binding.unit.finalize();
        }
    }
}

impl std::fmt::Debug for Process {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Process")
            .field("name", &self.name)
            .field("rules", &self.rule_names())
            .field(
                "actions",
                &self.actions.iter().map(|a| a.name.as_str()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

fn describe_unmet(unmet: &[&str], results: &RuleResults) -> String {
    unmet
        .iter()
        .map(|name| match results.get(name) {
            None => format!("{name} (missing)"),
            Some(RuleOutcome::Errored(_)) => format!("{name} (errored)"),
            Some(_) => (*name).to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Incremental construction of a [`Process`].
pub struct ProcessBuilder {
    process: Process,
    rule_names: HashSet<String>,
    action_names: HashSet<String>,
}

impl ProcessBuilder {
    /// Bind and initialize a rule unit.
    pub fn rule(mut self, name: &str, mut unit: Box<dyn Rule>, params: &Params) -> Result<Self> {
        if !self.rule_names.insert(name.to_string()) {
            return Err(self.duplicate(Capability::Rule, name));
        }
        unit.initialize(params)
            .map_err(|e| Error::plugin_init(name, e))?;
        self.process.rules.push(RuleBinding {
            name: name.to_string(),
            unit,
        });
        Ok(self)
    }

    /// Bind and initialize an action unit.
    pub fn action(
        mut self,
        name: &str,
        mut unit: ActionUnit,
        params: &Params,
        conditions: Vec<String>,
    ) -> Result<Self> {
        if !self.action_names.insert(name.to_string()) {
            return Err(self.duplicate(Capability::Action, name));
        }
        unit.initialize(params)
            .map_err(|e| Error::plugin_init(name, e))?;
        self.process.actions.push(ActionBinding {
            name: name.to_string(),
            conditions,
            unit,
        });
        Ok(self)
    }

    fn duplicate(&self, capability: Capability, name: &str) -> Error {
        Error::DuplicateBinding {
            process: self.process.name.clone(),
            capability,
            name: name.to_string(),
        }
    }

    /// Finish construction. Conditions naming undeclared rules are allowed
    /// (they never hold) but reported.
    pub fn build(self) -> Process {
        for (action, condition) in self.process.undeclared_conditions() {
            tracing::warn!(
                "Process '{}': action '{}' is gated on undeclared rule '{}' and will never run",
                self.process.name,
                action,
                condition
            );
        }
        self.process
    }
}
