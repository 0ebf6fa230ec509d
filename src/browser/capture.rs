//! Captcha image capture.
//!
//! The challenge image cannot be downloaded directly (its URL is
//! single-use), so the flow screenshots the whole page and crops the
//! challenge out of it using the element's on-page geometry.

use std::path::Path;

use anyhow::{Context, Result};

use super::ElementGeometry;

/// Pixel crop box: left/top is the element position, right/bottom is
/// position plus size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropBox {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl CropBox {
    pub fn from_geometry(geometry: &ElementGeometry) -> Self {
        let left = geometry.x.max(0.0).round() as u32;
        let top = geometry.y.max(0.0).round() as u32;
        Self {
            left,
            top,
            right: (geometry.x.max(0.0) + geometry.width.max(0.0)).round() as u32,
            bottom: (geometry.y.max(0.0) + geometry.height.max(0.0)).round() as u32,
        }
    }

    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }
}

/// Crop the full-page screenshot down to the challenge image and persist
/// the crop next to it.
pub fn crop_screenshot(screenshot: &Path, output: &Path, crop: CropBox) -> Result<()> {
    let image = image::open(screenshot)
        .with_context(|| format!("Failed to open screenshot: {}", screenshot.display()))?;

    let cropped = image.crop_imm(crop.left, crop.top, crop.width(), crop.height());
    cropped
        .save(output)
        .with_context(|| format!("Failed to write captcha image: {}", output.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;
    use tempfile::TempDir;

    #[test]
    fn crop_box_is_position_plus_size() {
        let geometry = ElementGeometry {
            x: 740.0,
            y: 410.0,
            width: 100.0,
            height: 30.0,
        };
        let crop = CropBox::from_geometry(&geometry);
        assert_eq!(
            crop,
            CropBox {
                left: 740,
                top: 410,
                right: 840,
                bottom: 440,
            }
        );
        assert_eq!(crop.width(), 100);
        assert_eq!(crop.height(), 30);
    }

    #[test]
    fn crop_box_rounds_fractional_geometry() {
        let geometry = ElementGeometry {
            x: 10.4,
            y: 20.6,
            width: 99.5,
            height: 30.2,
        };
        let crop = CropBox::from_geometry(&geometry);
        assert_eq!(crop.left, 10);
        assert_eq!(crop.top, 21);
        assert_eq!(crop.right, 110);
        assert_eq!(crop.bottom, 51);
    }

    #[test]
    fn crop_box_clamps_negative_position() {
        let geometry = ElementGeometry {
            x: -5.0,
            y: -2.0,
            width: 40.0,
            height: 20.0,
        };
        let crop = CropBox::from_geometry(&geometry);
        assert_eq!(crop.left, 0);
        assert_eq!(crop.top, 0);
        assert_eq!(crop.width(), 40);
        assert_eq!(crop.height(), 20);
    }

    #[test]
    fn crops_screenshot_to_box_dimensions() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let screenshot = dir.path().join("screen_shot.png");
        let captcha = dir.path().join("captcha.png");

        RgbaImage::from_pixel(200, 150, image::Rgba([10, 20, 30, 255])).save(&screenshot)?;

        let crop = CropBox {
            left: 50,
            top: 40,
            right: 150,
            bottom: 70,
        };
        crop_screenshot(&screenshot, &captcha, crop)?;

        let cropped = image::open(&captcha)?.to_rgba8();
        assert_eq!(cropped.dimensions(), (100, 30));

        Ok(())
    }
}
