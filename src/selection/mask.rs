use crate::rig_error::RigError;
use image::{DynamicImage, RgbaImage};
use std::path::Path;

/// Rendered coverage of a selection polygon. Coverage is the alpha channel
/// scaled to [0, 1]. Row 0 is the top of the screen.
#[derive(Clone, Debug)]
pub struct SelectionMask {
    image: RgbaImage,
}

impl SelectionMask {
    #[must_use]
    pub const fn from_rgba(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Wraps tightly packed RGBA8 bytes read back from the GPU
    ///
    /// # Errors
    /// Returns `RigError::MaskSizeMismatch` if the byte count doesn't match
    /// the dimensions
    pub fn from_raw(
        width: u32,
        height: u32,
        bytes: Vec<u8>,
    ) -> Result<Self, RigError> {
        let expected = width as usize * height as usize * 4;
        let found = bytes.len();
        RgbaImage::from_raw(width, height, bytes)
            .map(Self::from_rgba)
            .ok_or(RigError::MaskSizeMismatch { expected, found })
    }

    #[must_use]
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self::from_rgba(image.into_rgba8())
    }

    /// # Errors
    /// May return `RigError`
    pub fn open(path: &Path) -> Result<Self, RigError> {
        Ok(Self::from_dynamic(image::open(path)?))
    }

    #[must_use]
    pub fn dimensions(&self) -> [u32; 2] {
        [self.image.width(), self.image.height()]
    }

    /// Smaller than 2x2 can't be sampled meaningfully
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.image.width() < 2 || self.image.height() < 2
    }

    /// Coverage at a pixel, 0 outside the image
    #[must_use]
    pub fn coverage(&self, x: u32, y: u32) -> f32 {
        if x >= self.image.width() || y >= self.image.height() {
            return 0.0;
        }
        f32::from(self.image.get_pixel(x, y).0[3]) / 255.0
    }

    #[must_use]
    pub fn is_inside(&self, x: u32, y: u32, threshold: f32) -> bool {
        self.coverage(x, y) > threshold
    }

    #[must_use]
    pub const fn image(&self) -> &RgbaImage {
        &self.image
    }
}
