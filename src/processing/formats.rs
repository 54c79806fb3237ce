//! Extension matching and output encoding

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageFormat, ImageOutputFormat};
use tracing::debug;

use crate::error::Result;

/// Whether `extension` looks like an image extension.
///
/// Matching is by substring on the lowercase extension, so `JPG`, `jpeg`
/// and `pngx` all qualify for the default fragments.
pub fn is_image_extension<S: AsRef<str>>(extension: &str, fragments: &[S]) -> bool {
    if extension.is_empty() {
        return false;
    }

    let extension = extension.to_lowercase();
    fragments.iter().any(|fragment| {
        let fragment = fragment.as_ref().trim();
        !fragment.is_empty() && extension.contains(&fragment.to_lowercase())
    })
}

/// Encode `image` in `format`, the format the source was decoded from
pub fn encode(image: &DynamicImage, format: ImageFormat, quality: u8) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();

    match format {
        ImageFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
            if image.color().has_alpha() {
                DynamicImage::ImageRgb8(image.to_rgb8()).write_with_encoder(encoder)?;
            } else {
                image.write_with_encoder(encoder)?;
            }
        }
        ImageFormat::Png => {
            image.write_with_encoder(PngEncoder::new(&mut buffer))?;
        }
        other => {
            debug!("Encoding {:?} with library defaults", other);
            image.write_to(&mut Cursor::new(&mut buffer), ImageOutputFormat::from(other))?;
        }
    }

    Ok(buffer)
}
