//! Fit-contain sizing and resampling

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::processing::Axis;

/// Available resize filters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    /// Nearest neighbor (fastest, lowest quality)
    Nearest,
    /// Triangle (linear interpolation)
    Triangle,
    /// Catmull-Rom cubic spline
    CatmullRom,
    /// Gaussian blur
    Gaussian,
    /// Lanczos with radius 3 (high quality, recommended)
    #[default]
    Lanczos3,
}

impl From<FilterType> for image::imageops::FilterType {
    fn from(filter: FilterType) -> Self {
        match filter {
            FilterType::Nearest => image::imageops::FilterType::Nearest,
            FilterType::Triangle => image::imageops::FilterType::Triangle,
            FilterType::CatmullRom => image::imageops::FilterType::CatmullRom,
            FilterType::Gaussian => image::imageops::FilterType::Gaussian,
            FilterType::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// Output size for an image whose `longest` side is capped at `target`.
///
/// Aspect ratio is kept, nothing is cropped and nothing is enlarged: an image
/// whose capped side is already within `target` keeps its size.
pub fn fit_contain(width: u32, height: u32, longest: Axis, target: u32) -> (u32, u32) {
    let (long, short) = match longest {
        Axis::Width => (width, height),
        Axis::Height => (height, width),
    };

    if long <= target || long == 0 {
        return (width, height);
    }

    let scaled_short = ((f64::from(short) * f64::from(target)) / f64::from(long)).round() as u32;
    let scaled_short = scaled_short.max(1);

    match longest {
        Axis::Width => (target, scaled_short),
        Axis::Height => (scaled_short, target),
    }
}

/// Resize `image` so its `longest` side becomes at most `target`
pub fn shrink(image: &DynamicImage, longest: Axis, target: u32, filter: FilterType) -> DynamicImage {
    let (target_width, target_height) = fit_contain(image.width(), image.height(), longest, target);

    if target_width == image.width() && target_height == image.height() {
        debug!("No resize needed, {}x{} already fits", target_width, target_height);
        return image.clone();
    }

    debug!(
        "Resizing {}x{} -> {}x{} using {:?}",
        image.width(),
        image.height(),
        target_width,
        target_height,
        filter
    );

    image.resize_exact(target_width, target_height, filter.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_contain_landscape() {
        assert_eq!(fit_contain(2400, 1600, Axis::Width, 1000), (1000, 667));
        assert_eq!(fit_contain(1201, 800, Axis::Width, 1000), (1000, 666));
    }

    #[test]
    fn test_fit_contain_portrait() {
        assert_eq!(fit_contain(1600, 2400, Axis::Height, 1000), (667, 1000));
    }

    #[test]
    fn test_fit_contain_square_uses_height() {
        assert_eq!(fit_contain(3000, 3000, Axis::Height, 1000), (1000, 1000));
    }

    #[test]
    fn test_fit_contain_never_enlarges() {
        assert_eq!(fit_contain(800, 600, Axis::Width, 1000), (800, 600));
        assert_eq!(fit_contain(1000, 400, Axis::Width, 1000), (1000, 400));
    }

    #[test]
    fn test_fit_contain_keeps_thin_side() {
        assert_eq!(fit_contain(5000, 1, Axis::Width, 1000), (1000, 1));
    }

    #[test]
    fn test_shrink_image() {
        let image = DynamicImage::new_rgb8(1500, 300);
        let resized = shrink(&image, Axis::Width, 1000, FilterType::Triangle);
        assert_eq!((resized.width(), resized.height()), (1000, 200));
    }

    #[test]
    fn test_filter_conversion() {
        let filter: image::imageops::FilterType = FilterType::default().into();
        assert_eq!(filter, image::imageops::FilterType::Lanczos3);
    }
}
