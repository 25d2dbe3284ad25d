//! Raster image re-encoding, rotation and grayscale copies.

use crate::{Error, Result};
use image::{DynamicImage, ImageFormat};
use std::path::Path;

/// Raster formats the image converter writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageTarget {
    Png,
    Jpeg,
    Bmp,
    Tiff,
    Webp,
}

impl ImageTarget {
    /// Get the `image` crate format for this target.
    pub fn image_format(&self) -> ImageFormat {
        match self {
            ImageTarget::Png => ImageFormat::Png,
            ImageTarget::Jpeg => ImageFormat::Jpeg,
            ImageTarget::Bmp => ImageFormat::Bmp,
            ImageTarget::Tiff => ImageFormat::Tiff,
            ImageTarget::Webp => ImageFormat::WebP,
        }
    }

    /// Canonical lower-case name, also used as the output extension.
    pub fn name(&self) -> &'static str {
        match self {
            ImageTarget::Png => "png",
            ImageTarget::Jpeg => "jpeg",
            ImageTarget::Bmp => "bmp",
            ImageTarget::Tiff => "tiff",
            ImageTarget::Webp => "webp",
        }
    }
}

impl std::str::FromStr for ImageTarget {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "png" => Ok(ImageTarget::Png),
            "jpg" | "jpeg" => Ok(ImageTarget::Jpeg),
            "bmp" => Ok(ImageTarget::Bmp),
            "tif" | "tiff" => Ok(ImageTarget::Tiff),
            "webp" => Ok(ImageTarget::Webp),
            _ => Err(Error::Unsupported(format!("image format: {}", s))),
        }
    }
}

/// Rotate counter-clockwise by `degrees` (a multiple of 90).
///
/// Other values leave the image untouched.
pub fn rotate_ccw(img: DynamicImage, degrees: u16) -> DynamicImage {
    match degrees % 360 {
        90 => img.rotate270(),
        180 => img.rotate180(),
        270 => img.rotate90(),
        _ => img,
    }
}

/// Open an image and apply a counter-clockwise rotation.
pub fn open_rotated(path: &Path, degrees: u16) -> Result<DynamicImage> {
    if !path.exists() {
        return Err(Error::file_not_found(path));
    }
    Ok(rotate_ccw(image::open(path)?, degrees))
}

/// Encode `img` as `target`. JPEG has no alpha channel, so it is flattened to RGB.
pub fn save_image(img: &DynamicImage, path: &Path, target: ImageTarget) -> Result<()> {
    match target {
        ImageTarget::Jpeg => {
            DynamicImage::ImageRgb8(img.to_rgb8()).save_with_format(path, target.image_format())?
        }
        ImageTarget::Webp => {
            DynamicImage::ImageRgba8(img.to_rgba8()).save_with_format(path, target.image_format())?
        }
        _ => img.save_with_format(path, target.image_format())?,
    }
    Ok(())
}

/// Decode `input` and re-encode it as `target` at `output`.
pub fn convert_image(input: &Path, output: &Path, target: ImageTarget) -> Result<()> {
    #[cfg(feature = "tracing")]
    tracing::info!("Converting image {:?} -> {:?} ({})", input, output, target.name());

    let img = open_rotated(input, 0)?;
    save_image(&img, output, target)
}

/// Write a grayscale copy of `source` to `destination` (format from its extension).
pub fn grayscale_copy(source: &Path, destination: &Path) -> Result<()> {
    let img = image::open(source)?;
    img.grayscale().save(destination)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb, RgbImage};
    use tempfile::tempdir;

    fn sample(width: u32, height: u32) -> DynamicImage {
        let mut img = RgbImage::new(width, height);
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_target_parse() {
        assert_eq!("JPG".parse::<ImageTarget>().unwrap(), ImageTarget::Jpeg);
        assert_eq!("tif".parse::<ImageTarget>().unwrap(), ImageTarget::Tiff);
        assert!("gif".parse::<ImageTarget>().is_err());
    }

    #[test]
    fn test_rotate_quarter_swaps_dimensions() {
        let rotated = rotate_ccw(sample(4, 2), 90);
        assert_eq!(rotated.dimensions(), (2, 4));
        let rotated = rotate_ccw(sample(4, 2), 180);
        assert_eq!(rotated.dimensions(), (4, 2));
    }

    #[test]
    fn test_rotate_ccw_moves_top_left_to_bottom_left() {
        let rotated = rotate_ccw(sample(4, 2), 90).to_rgb8();
        assert_eq!(rotated.get_pixel(0, 3), &Rgb([255, 0, 0]));
    }

    #[test]
    fn test_convert_png_to_jpeg() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.png");
        let output = dir.path().join("in_converted.jpeg");
        sample(8, 8).save(&input).unwrap();

        convert_image(&input, &output, ImageTarget::Jpeg).unwrap();

        assert_eq!(image::ImageFormat::from_path(&output).unwrap(), ImageFormat::Jpeg);
        assert_eq!(image::open(&output).unwrap().dimensions(), (8, 8));
    }

    #[test]
    fn test_convert_missing_input() {
        let dir = tempdir().unwrap();
        let err = convert_image(
            &dir.path().join("missing.png"),
            &dir.path().join("out.bmp"),
            ImageTarget::Bmp,
        )
        .unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_grayscale_copy() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("color.png");
        let output = dir.path().join("color_gray.png");
        sample(2, 2).save(&input).unwrap();

        grayscale_copy(&input, &output).unwrap();

        let gray = image::open(&output).unwrap();
        assert_eq!(gray.color(), image::ColorType::L8);
    }
}
