//! Error types used throughout sidm.
//!
//! Two layers: [`PluginError`] is what a capability unit reports from its own
//! methods, and [`Error`] is what the engine surfaces to its callers. Rule
//! failures never become an [`Error`]; action failures always do.

use std::fmt;
use std::path::PathBuf;

/// The two capability shapes a plugin can satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// A boolean predicate over a file.
    Rule,
    /// A side-effecting transform (or generator) of artifact paths.
    Action,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Rule => f.write_str("rule"),
            Capability::Action => f.write_str("action"),
        }
    }
}

/// Failure reported by a capability unit.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// A required parameter was not supplied at initialization.
    #[error("missing required parameter '{0}'")]
    MissingParam(String),

    /// A parameter was supplied with an unusable value.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParam {
        /// Parameter name.
        name: String,
        /// What was wrong with it.
        message: String,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Decoding or encoding an image failed.
    #[error("image error: {0}")]
    Image(String),

    /// Any other unit-specific failure.
    #[error("{0}")]
    Failed(String),
}

impl PluginError {
    /// Create a new InvalidParam error.
    pub fn invalid_param(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParam {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a new Image error from any displayable decoder/encoder error.
    pub fn image(err: impl fmt::Display) -> Self {
        Self::Image(err.to_string())
    }

    /// Create a new Failed error.
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }
}

/// Result alias for capability unit methods.
pub type PluginResult<T> = std::result::Result<T, PluginError>;

/// Engine-level error type for sidm.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No unit is registered under the identifier for the capability.
    #[error("plugin not found: no {capability} registered at '{location}'")]
    PluginNotFound {
        /// The identifier that was looked up.
        location: String,
        /// The capability that was required.
        capability: Capability,
    },

    /// Two factories were registered under the same identifier.
    #[error("duplicate {capability} plugin registered at '{location}'")]
    DuplicatePlugin {
        /// The contested identifier.
        location: String,
        /// Capability table the collision happened in.
        capability: Capability,
    },

    /// A unit failed during `initialize`.
    #[error("failed to initialize binding '{binding}': {source}")]
    PluginInit {
        /// Name of the binding being constructed.
        binding: String,
        /// Underlying unit error.
        #[source]
        source: PluginError,
    },

    /// Two bindings in one process category share a name.
    #[error("duplicate {capability} name '{name}' in process '{process}'")]
    DuplicateBinding {
        /// Process under construction.
        process: String,
        /// Rule or action namespace.
        capability: Capability,
        /// The repeated binding name.
        name: String,
    },

    /// A run referenced a process that is not configured.
    #[error("process not found: {0}")]
    UnknownProcess(String),

    /// The source location of a run does not exist or is not a directory.
    #[error("source directory not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// An action unit failed; artifact state may be partially modified.
    #[error("error executing action '{action}' on {}: {source}", display_paths(.paths))]
    ActionExecution {
        /// Name of the failing action binding.
        action: String,
        /// Working paths the action was invoked with.
        paths: Vec<PathBuf>,
        /// Underlying unit error.
        #[source]
        source: PluginError,
    },

    /// The batch was halted by the `stop_on_error` policy.
    #[error("run aborted while processing {}: {source}", .path.display())]
    RunAborted {
        /// File that was being processed.
        path: PathBuf,
        /// The error that stopped the run.
        #[source]
        source: Box<Error>,
    },

    /// Configuration was structurally invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new PluginNotFound error.
    pub fn plugin_not_found(location: impl Into<String>, capability: Capability) -> Self {
        Self::PluginNotFound {
            location: location.into(),
            capability,
        }
    }

    /// Create a new PluginInit error.
    pub fn plugin_init(binding: impl Into<String>, source: PluginError) -> Self {
        Self::PluginInit {
            binding: binding.into(),
            source,
        }
    }

    /// Create a new ActionExecution error.
    pub fn action_execution(
        action: impl Into<String>,
        paths: &[PathBuf],
        source: PluginError,
    ) -> Self {
        Self::ActionExecution {
            action: action.into(),
            paths: paths.to_vec(),
            source,
        }
    }

    /// Create a new Config error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error belongs to the load-time class (fatal before any
    /// file is touched).
    pub fn is_load_time(&self) -> bool {
        matches!(
            self,
            Error::PluginNotFound { .. }
                | Error::DuplicatePlugin { .. }
                | Error::PluginInit { .. }
                | Error::DuplicateBinding { .. }
                | Error::UnknownProcess(_)
                | Error::Config(_)
        )
    }
}

/// Result type alias using the engine Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Render a working set for diagnostics: `a.png, b.png` or `<none>`.
pub fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "<none>".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
