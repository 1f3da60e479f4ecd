//! Built-in rule units.

mod age;
mod decode;
mod dimensions;
mod extension;
mod size;

pub use age::CheckCreationDate;
pub use decode::DecodableImage;
pub use dimensions::{CheckDimensions, IsSmallImage};
pub use extension::{FileType, IsImage, IsPng};
pub use size::{CheckFileSize, FileSize};

use sidm_common::Result;
use sidm_pipeline::PluginRegistry;

pub(crate) fn register(registry: &mut PluginRegistry) -> Result<()> {
    registry.register_rule("rules/is_image", IsImage::new)?;
    registry.register_rule("rules/is_png", IsPng::new)?;
    registry.register_rule("rules/check_file_size", CheckFileSize::new)?;
    registry.register_rule("rules/check_dimensions", CheckDimensions::new)?;
    registry.register_rule("rules/is_small_image", IsSmallImage::new)?;
    registry.register_rule("rules/check_creation_date", CheckCreationDate::new)?;
    registry.register_rule("image/rules/is_image", DecodableImage::new)?;
    registry.register_rule("io/rules/filetype", FileType::new)?;
    registry.register_rule("io/rules/filesize", FileSize::new)?;
    Ok(())
}
