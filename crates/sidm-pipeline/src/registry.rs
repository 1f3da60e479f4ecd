//! Plugin registry: stable identifiers mapped to unit factories.
//!
//! Each capability has its own table. An identifier may be registered at
//! most once per table, so resolution never depends on registration order.
//! Every resolution calls the factory again; instances are never shared
//! between bindings.

use std::collections::BTreeMap;

use sidm_common::{Capability, Error, Result, RunLog};

use crate::plugin::{Action, ActionUnit, Rule, SourceAction};

type RuleFactory = Box<dyn Fn(RunLog) -> Box<dyn Rule> + Send + Sync>;
type ActionFactory = Box<dyn Fn(RunLog) -> Box<dyn Action> + Send + Sync>;
type SourceFactory = Box<dyn Fn(RunLog) -> Box<dyn SourceAction> + Send + Sync>;

enum ActionEntry {
    Transform(ActionFactory),
    Source(SourceFactory),
}

/// Registry of rule and action factories.
#[derive(Default)]
pub struct PluginRegistry {
    rules: BTreeMap<String, RuleFactory>,
    actions: BTreeMap<String, ActionEntry>,
}

impl PluginRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule factory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicatePlugin`] if `id` is already taken.
    pub fn register_rule<F, R>(&mut self, id: &str, factory: F) -> Result<()>
    where
        F: Fn(RunLog) -> R + Send + Sync + 'static,
        R: Rule + 'static,
    {
        let key = normalize_id(id);
        if self.rules.contains_key(&key) {
            return Err(Error::DuplicatePlugin {
                location: key,
                capability: Capability::Rule,
            });
        }
        self.rules
            .insert(key, Box::new(move |log| -> Box<dyn Rule> { Box::new(factory(log)) }));
        Ok(())
    }

    /// Register a transform action factory.
    pub fn register_action<F, A>(&mut self, id: &str, factory: F) -> Result<()>
    where
        F: Fn(RunLog) -> A + Send + Sync + 'static,
        A: Action + 'static,
    {
        let key = self.vacant_action_key(id)?;
        self.actions.insert(
            key,
            ActionEntry::Transform(Box::new(move |log| -> Box<dyn Action> {
                Box::new(factory(log))
            })),
        );
        Ok(())
    }

    /// Register a generation action factory. Shares the action namespace.
    pub fn register_source_action<F, A>(&mut self, id: &str, factory: F) -> Result<()>
    where
        F: Fn(RunLog) -> A + Send + Sync + 'static,
        A: SourceAction + 'static,
    {
        let key = self.vacant_action_key(id)?;
        self.actions.insert(
            key,
            ActionEntry::Source(Box::new(move |log| -> Box<dyn SourceAction> {
                Box::new(factory(log))
            })),
        );
        Ok(())
    }

    fn vacant_action_key(&self, id: &str) -> Result<String> {
        let key = normalize_id(id);
        if self.actions.contains_key(&key) {
            return Err(Error::DuplicatePlugin {
                location: key,
                capability: Capability::Action,
            });
        }
        Ok(key)
    }

    /// Construct a fresh rule unit registered under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PluginNotFound`] naming the identifier and capability.
    pub fn resolve_rule(&self, id: &str, log: &RunLog) -> Result<Box<dyn Rule>> {
        self.rules
            .get(&normalize_id(id))
            .map(|factory| factory(log.clone()))
            .ok_or_else(|| Error::plugin_not_found(id, Capability::Rule))
    }

    /// Construct a fresh action unit registered under `id`.
    pub fn resolve_action(&self, id: &str, log: &RunLog) -> Result<ActionUnit> {
        match self.actions.get(&normalize_id(id)) {
            Some(ActionEntry::Transform(factory)) => Ok(ActionUnit::Transform(factory(log.clone()))),
            Some(ActionEntry::Source(factory)) => Ok(ActionUnit::Source(factory(log.clone()))),
            None => Err(Error::plugin_not_found(id, Capability::Action)),
        }
    }

    /// Registered identifiers for a capability, sorted.
    pub fn ids(&self, capability: Capability) -> Vec<&str> {
        match capability {
            Capability::Rule => self.rules.keys().map(String::as_str).collect(),
            Capability::Action => self.actions.keys().map(String::as_str).collect(),
        }
    }

    /// Whether `id` names a generation action.
    pub fn is_source_action(&self, id: &str) -> bool {
        matches!(
            self.actions.get(&normalize_id(id)),
            Some(ActionEntry::Source(_))
        )
    }

    /// Total number of registered factories.
    pub fn len(&self) -> usize {
        self.rules.len() + self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("rules", &self.rules.keys().collect::<Vec<_>>())
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Canonical form of a plugin identifier.
///
/// Accepts identifiers written as file locations (`./rules/is_image.py`,
/// `rules\\is_image.rs`) and maps them to `rules/is_image`.
pub fn normalize_id(id: &str) -> String {
    let mut key = id.trim().replace('\\', "/");
    while let Some(rest) = key.strip_prefix("./") {
        key = rest.to_string();
    }
    for ext in [".py", ".rs"] {
        if let Some(stem) = key.strip_suffix(ext) {
            key = stem.to_string();
            break;
        }
    }
    key.trim_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sidm_common::{Metadata, Params, PluginResult};
    use std::path::{Path, PathBuf};

    struct Always(bool);

    impl crate::plugin::Plugin for Always {
        fn initialize(&mut self, _params: &Params) -> PluginResult<()> {
            Ok(())
        }
    }

    impl Rule for Always {
        fn apply(&mut self, _path: &Path, _metadata: &Metadata) -> PluginResult<bool> {
            Ok(self.0)
        }
    }

    struct Passthrough;

    impl crate::plugin::Plugin for Passthrough {
        fn initialize(&mut self, _params: &Params) -> PluginResult<()> {
            Ok(())
        }
    }

    impl Action for Passthrough {
        fn execute(&mut self, paths: Vec<PathBuf>, _metadata: &Metadata) -> PluginResult<Vec<PathBuf>> {
            Ok(paths)
        }
    }

    struct Generator;

    impl crate::plugin::Plugin for Generator {
        fn initialize(&mut self, _params: &Params) -> PluginResult<()> {
            Ok(())
        }
    }

    impl SourceAction for Generator {
        fn generate(&mut self, _metadata: &Metadata) -> PluginResult<Vec<PathBuf>> {
            Ok(vec![PathBuf::from("generated.png")])
        }
    }

    #[test]
    fn normalize_strips_location_noise() {
        assert_eq!(normalize_id("rules/is_image"), "rules/is_image");
        assert_eq!(normalize_id("./rules/is_image.py"), "rules/is_image");
        assert_eq!(normalize_id("io\\actions\\move.rs"), "io/actions/move");
        assert_eq!(normalize_id(" /rules/x/ "), "rules/x");
    }

    #[test]
    fn resolve_returns_fresh_instances() {
        let mut reg = PluginRegistry::new();
        reg.register_rule("rules/yes", |_| Always(true)).unwrap();
        let log = RunLog::new();

        let mut a = reg.resolve_rule("rules/yes", &log).unwrap();
        let mut b = reg.resolve_rule("rules/yes.py", &log).unwrap();
        let meta = Metadata::synthetic("x.png", 1);
        assert!(a.apply(Path::new("x.png"), &meta).unwrap());
        assert!(b.apply(Path::new("x.png"), &meta).unwrap());
    }

    #[test]
    fn unknown_id_is_plugin_not_found() {
        let reg = PluginRegistry::new();
        let log = RunLog::new();
        let err = reg.resolve_rule("rules/missing", &log).err().unwrap();
        assert!(matches!(
            err,
            Error::PluginNotFound { ref location, capability: Capability::Rule } if location == "rules/missing"
        ));

        let err = reg.resolve_action("actions/missing", &log).err().unwrap();
        assert!(err.to_string().contains("no action registered"));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut reg = PluginRegistry::new();
        reg.register_rule("rules/yes", |_| Always(true)).unwrap();
        let err = reg
            .register_rule("./rules/yes.py", |_| Always(false))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicatePlugin { capability: Capability::Rule, .. }));

        reg.register_action("actions/pass", |_| Passthrough).unwrap();
        let err = reg
            .register_source_action("actions/pass", |_| Generator)
            .unwrap_err();
        assert!(matches!(err, Error::DuplicatePlugin { capability: Capability::Action, .. }));
    }

    #[test]
    fn rule_and_action_namespaces_are_independent() {
        let mut reg = PluginRegistry::new();
        reg.register_rule("shared", |_| Always(true)).unwrap();
        reg.register_action("shared", |_| Passthrough).unwrap();
        let log = RunLog::new();

        assert!(reg.resolve_rule("shared", &log).is_ok());
        assert!(reg.resolve_action("shared", &log).is_ok());
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn source_actions_resolve_to_source_variant() {
        let mut reg = PluginRegistry::new();
        reg.register_source_action("generate/x", |_| Generator).unwrap();
        reg.register_action("actions/pass", |_| Passthrough).unwrap();
        let log = RunLog::new();

        assert!(reg.resolve_action("generate/x", &log).unwrap().is_source());
        assert!(!reg.resolve_action("actions/pass", &log).unwrap().is_source());
        assert!(reg.is_source_action("generate/x"));
        assert_eq!(reg.ids(Capability::Action), vec!["actions/pass", "generate/x"]);
    }
}
