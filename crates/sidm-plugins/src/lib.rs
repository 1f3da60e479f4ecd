//! # sidm-plugins
//!
//! Built-in rule and action units, registered under stable identifiers.
//!
//! | Identifier | Kind |
//! |---|---|
//! | `rules/is_image`, `rules/is_png`, `io/rules/filetype` | extension rules |
//! | `rules/check_file_size`, `io/rules/filesize` | size rules |
//! | `rules/check_dimensions`, `rules/is_small_image` | dimension rules |
//! | `rules/check_creation_date` | age rule |
//! | `image/rules/is_image` | decodability rule |
//! | `actions/copy_file`, `actions/rename_file`, `actions/remove` | file actions |
//! | `io/actions/copy`, `io/actions/move` | bulk file actions |
//! | `actions/resize_image`, `actions/convert_to_jpeg`, `image/actions/convert`, `actions/adjust_brightness` | image transforms |
//! | `actions/extract_metadata` | sidecar writer |
//! | `actions/find_duplicates` | perceptual de-duplication |
//! | `generate/solid_color` | source action |
//!
//! ```
//! use sidm_common::{Capability, RunLog};
//!
//! let registry = sidm_plugins::default_registry().unwrap();
//! assert!(registry.ids(Capability::Rule).contains(&"rules/is_png"));
//! assert!(registry.resolve_action("actions/resize_image.py", &RunLog::new()).is_ok());
//! ```

pub mod actions;
mod imaging;
pub mod rules;

use sidm_common::Result;
use sidm_pipeline::PluginRegistry;

/// Register every built-in unit into `registry`.
///
/// # Errors
///
/// Fails if any built-in identifier is already taken.
pub fn register_all(registry: &mut PluginRegistry) -> Result<()> {
    rules::register(registry)?;
    actions::register(registry)?;
    Ok(())
}

/// A registry holding every built-in unit.
pub fn default_registry() -> Result<PluginRegistry> {
    let mut registry = PluginRegistry::new();
    register_all(&mut registry)?;
    Ok(registry)
}
