//! Built-in action units.
//!
//! Every transform applies itself to each path of the working set in order
//! and returns the resulting paths, so a single-file chain and a fanned-out
//! set behave the same way.

mod bulk;
mod duplicates;
mod files;
mod generate;
mod sidecar;
mod transform;

pub use bulk::{CopyFiles, MoveFiles};
pub use duplicates::FindDuplicates;
pub use files::{CopyFile, Remove, RenameFile};
pub use generate::SolidColor;
pub use sidecar::ExtractMetadata;
pub use transform::{AdjustBrightness, Convert, ConvertToJpeg, ResizeImage};

use sidm_common::Result;
use sidm_pipeline::PluginRegistry;

pub(crate) fn register(registry: &mut PluginRegistry) -> Result<()> {
    registry.register_action("actions/copy_file", CopyFile::new)?;
    registry.register_action("actions/rename_file", RenameFile::new)?;
    registry.register_action("actions/remove", Remove::new)?;
    registry.register_action("actions/resize_image", ResizeImage::new)?;
    registry.register_action("actions/convert_to_jpeg", ConvertToJpeg::new)?;
    registry.register_action("actions/adjust_brightness", AdjustBrightness::new)?;
    registry.register_action("actions/extract_metadata", ExtractMetadata::new)?;
    registry.register_action("actions/find_duplicates", FindDuplicates::new)?;
    registry.register_action("image/actions/convert", Convert::new)?;
    registry.register_action("io/actions/copy", CopyFiles::new)?;
    registry.register_action("io/actions/move", MoveFiles::new)?;
    registry.register_source_action("generate/solid_color", SolidColor::new)?;
    Ok(())
}
