//! Image Access
//!
//! RGB8 frame and foreground mask types the skin-tone sampler reads from:
//! - Construct frames from raw RGB/RGBA buffers
//! - Rectangular region averaging, optionally gated by a segmentation mask
//! - Decode from file or bytes when the `image-processing` feature is enabled

#[cfg(feature = "image-processing")]
use image::DynamicImage;

use crate::error::AnalysisError;

/// Decoded image with row-major RGB8 pixel data
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl Frame {
    /// Create a frame from raw RGB8 data
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Result<Self, AnalysisError> {
        if width == 0 || height == 0 {
            return Err(AnalysisError::InvalidDimensions { width, height });
        }
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(AnalysisError::FrameSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { data, width, height })
    }

    /// Create a frame from raw RGBA8 data (alpha dropped)
    pub fn from_rgba(rgba: &[u8], width: u32, height: u32) -> Result<Self, AnalysisError> {
        Self::new(rgba_to_rgb(rgba), width, height)
    }

    /// Frame of a single color
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Result<Self, AnalysisError> {
        let pixels = width as usize * height as usize;
        let data = rgb.iter().copied().cycle().take(pixels * 3).collect();
        Self::new(data, width, height)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get pixel at (x, y) as [R, G, B]
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 3] {
        if x >= self.width || y >= self.height {
            return [0, 0, 0];
        }
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        [self.data[idx], self.data[idx + 1], self.data[idx + 2]]
    }

    /// Set pixel at (x, y)
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        self.data[idx..idx + 3].copy_from_slice(&rgb);
    }

    /// Fill a rectangular region with one color (clipped to the frame)
    pub fn fill_region(&mut self, region: PixelRegion, rgb: [u8; 3]) {
        let region = region.clipped(self.width, self.height);
        for y in region.y0..region.y1 {
            for x in region.x0..region.x1 {
                self.set_pixel(x, y, rgb);
            }
        }
    }

    /// Sum RGB over a region (clipped to the frame)
    pub fn region_sum(&self, region: PixelRegion) -> ChannelSum {
        self.masked_region_sum(region, |_, _| true)
    }

    /// Sum RGB over the pixels of a region accepted by `keep`
    pub fn masked_region_sum<F>(&self, region: PixelRegion, keep: F) -> ChannelSum
    where
        F: Fn(u32, u32) -> bool,
    {
        let region = region.clipped(self.width, self.height);
        let mut acc = ChannelSum::default();
        for y in region.y0..region.y1 {
            for x in region.x0..region.x1 {
                if keep(x, y) {
                    acc.push(self.get_pixel(x, y));
                }
            }
        }
        acc
    }
}

// === Image crate integration (optional) ===

#[cfg(feature = "image-processing")]
impl Frame {
    /// Load frame from file path
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, image::ImageError> {
        let img = image::open(path)?;
        Ok(Self::from_dynamic_image(&img))
    }

    /// Load frame from bytes (JPEG/PNG)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, image::ImageError> {
        let img = image::load_from_memory(bytes)?;
        Ok(Self::from_dynamic_image(&img))
    }

    /// Convert from image crate DynamicImage
    pub fn from_dynamic_image(img: &DynamicImage) -> Self {
        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();
        Self {
            data: rgb.into_raw(),
            width,
            height,
        }
    }
}

/// Half-open pixel rectangle `[x0, x1) × [y0, y1)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelRegion {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl PixelRegion {
    pub const fn new(x0: u32, y0: u32, x1: u32, y1: u32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Upper third of the image, middle half horizontally
    pub fn upper_torso(width: u32, height: u32) -> Self {
        Self::new(width / 4, 0, 3 * width / 4, height / 3)
    }

    pub fn clipped(&self, width: u32, height: u32) -> Self {
        let x1 = self.x1.min(width);
        let y1 = self.y1.min(height);
        Self {
            x0: self.x0.min(x1),
            y0: self.y0.min(y1),
            x1,
            y1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.x1 <= self.x0 || self.y1 <= self.y0
    }

    pub fn area(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            (self.x1 - self.x0) as u64 * (self.y1 - self.y0) as u64
        }
    }
}

/// Running per-channel sum of RGB8 samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelSum {
    pub sum: [u64; 3],
    pub count: u64,
}

impl ChannelSum {
    #[inline]
    pub fn push(&mut self, rgb: [u8; 3]) {
        self.sum[0] += rgb[0] as u64;
        self.sum[1] += rgb[1] as u64;
        self.sum[2] += rgb[2] as u64;
        self.count += 1;
    }

    /// Mean RGB on the 0-255 scale, None when nothing was sampled
    pub fn mean(&self) -> Option<[f64; 3]> {
        if self.count == 0 {
            return None;
        }
        let n = self.count as f64;
        Some([
            self.sum[0] as f64 / n,
            self.sum[1] as f64 / n,
            self.sum[2] as f64 / n,
        ])
    }
}

/// Per-pixel foreground probability from the segmentation model
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentationMask {
    data: Vec<f32>,
    width: u32,
    height: u32,
}

impl SegmentationMask {
    /// Create a mask from row-major probabilities
    pub fn new(data: Vec<f32>, width: u32, height: u32) -> Result<Self, AnalysisError> {
        if width == 0 || height == 0 {
            return Err(AnalysisError::InvalidDimensions { width, height });
        }
        if data.len() != width as usize * height as usize {
            return Err(AnalysisError::MaskDimensionMismatch {
                mask_width: width,
                mask_height: height,
                width,
                height,
            });
        }
        Ok(Self { data, width, height })
    }

    /// Uniform mask, e.g. everything foreground
    pub fn filled(width: u32, height: u32, value: f32) -> Result<Self, AnalysisError> {
        Self::new(vec![value; width as usize * height as usize], width, height)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Probability at (x, y); 0.0 outside the mask
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> f32 {
        if x >= self.width || y >= self.height {
            return 0.0;
        }
        self.data[y as usize * self.width as usize + x as usize]
    }

    /// Set probability at (x, y)
    pub fn set(&mut self, x: u32, y: u32, value: f32) {
        if x < self.width && y < self.height {
            self.data[y as usize * self.width as usize + x as usize] = value;
        }
    }

    /// Check that the mask covers the same pixel grid as `frame`
    pub fn ensure_matches(&self, frame: &Frame) -> Result<(), AnalysisError> {
        if self.width != frame.width() || self.height != frame.height() {
            return Err(AnalysisError::MaskDimensionMismatch {
                mask_width: self.width,
                mask_height: self.height,
                width: frame.width(),
                height: frame.height(),
            });
        }
        Ok(())
    }
}

/// Convert RGBA to RGB (drop alpha channel)
pub fn rgba_to_rgb(rgba: &[u8]) -> Vec<u8> {
    rgba.chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect()
}
