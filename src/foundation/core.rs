use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::foundation::error::{BakeError, BakeResult};

pub use kurbo::{Affine, Point, Rect};

/// Image dimensions in pixels.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Size {
    /// Width in pixels.
    pub w: u32,
    /// Height in pixels.
    pub h: u32,
}

impl Size {
    /// Create a size.
    pub const fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }

    /// `true` when either dimension is zero.
    pub fn is_degenerate(self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Number of pixels.
    pub fn pixel_count(self) -> usize {
        self.w as usize * self.h as usize
    }

    /// Width over height, `0.0` for degenerate sizes.
    pub fn aspect(self) -> f64 {
        if self.is_degenerate() {
            0.0
        } else {
            f64::from(self.w) / f64::from(self.h)
        }
    }

    /// Divide both dimensions by `divisor` (integer division).
    pub fn scaled_down(self, divisor: u32) -> Self {
        let divisor = divisor.max(1);
        Self::new(self.w / divisor, self.h / divisor)
    }

    /// Swap width and height.
    pub fn transposed(self) -> Self {
        Self::new(self.h, self.w)
    }

    /// `true` when `other` fits inside `self` in both dimensions.
    pub fn contains(self, other: Size) -> bool {
        other.w <= self.w && other.h <= self.h
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.w, self.h)
    }
}

impl FromStr for Size {
    type Err = BakeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| BakeError::validation(format!("size '{s}' must look like WxH")))?;
        let w = w
            .trim()
            .parse::<u32>()
            .map_err(|e| BakeError::validation(format!("size '{s}' width: {e}")))?;
        let h = h
            .trim()
            .parse::<u32>()
            .map_err(|e| BakeError::validation(format!("size '{s}' height: {e}")))?;
        Ok(Self::new(w, h))
    }
}

/// Storage type of a single channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComponentType {
    /// 8-bit unsigned normalized.
    U8,
    /// 16-bit unsigned normalized.
    U16,
    /// 32-bit unsigned normalized.
    U32,
    /// IEEE half float.
    F16,
    /// IEEE single float.
    F32,
}

impl ComponentType {
    /// Bytes per channel.
    pub fn byte_size(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 | Self::F16 => 2,
            Self::U32 | Self::F32 => 4,
        }
    }
}

/// Pixel layout of an image.
///
/// Interleaved types carry one [`ComponentType`] per channel. `RGB_U10` is packed into 32 bits and
/// the `YUV_*` types are planar; neither has a direct transfer format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum PixelType {
    #[serde(rename = "L_U8")]
    LU8,
    #[serde(rename = "L_U16")]
    LU16,
    #[serde(rename = "L_U32")]
    LU32,
    #[serde(rename = "L_F16")]
    LF16,
    #[serde(rename = "L_F32")]
    LF32,
    #[serde(rename = "LA_U8")]
    LaU8,
    #[serde(rename = "LA_U16")]
    LaU16,
    #[serde(rename = "LA_U32")]
    LaU32,
    #[serde(rename = "LA_F16")]
    LaF16,
    #[serde(rename = "LA_F32")]
    LaF32,
    #[serde(rename = "RGB_U8")]
    RgbU8,
    #[serde(rename = "RGB_U10")]
    RgbU10,
    #[serde(rename = "RGB_U16")]
    RgbU16,
    #[serde(rename = "RGB_U32")]
    RgbU32,
    #[serde(rename = "RGB_F16")]
    RgbF16,
    #[serde(rename = "RGB_F32")]
    RgbF32,
    #[serde(rename = "RGBA_U8")]
    RgbaU8,
    #[serde(rename = "RGBA_U16")]
    RgbaU16,
    #[serde(rename = "RGBA_U32")]
    RgbaU32,
    #[serde(rename = "RGBA_F16")]
    RgbaF16,
    #[serde(rename = "RGBA_F32")]
    RgbaF32,
    #[serde(rename = "YUV_420P_U8")]
    Yuv420PU8,
    #[serde(rename = "YUV_422P_U8")]
    Yuv422PU8,
    #[serde(rename = "YUV_444P_U8")]
    Yuv444PU8,
}

impl PixelType {
    /// Every pixel type, in declaration order.
    pub const ALL: [PixelType; 24] = [
        Self::LU8,
        Self::LU16,
        Self::LU32,
        Self::LF16,
        Self::LF32,
        Self::LaU8,
        Self::LaU16,
        Self::LaU32,
        Self::LaF16,
        Self::LaF32,
        Self::RgbU8,
        Self::RgbU10,
        Self::RgbU16,
        Self::RgbU32,
        Self::RgbF16,
        Self::RgbF32,
        Self::RgbaU8,
        Self::RgbaU16,
        Self::RgbaU32,
        Self::RgbaF16,
        Self::RgbaF32,
        Self::Yuv420PU8,
        Self::Yuv422PU8,
        Self::Yuv444PU8,
    ];

    /// Number of channels.
    pub fn channel_count(self) -> usize {
        use PixelType::*;
        match self {
            LU8 | LU16 | LU32 | LF16 | LF32 => 1,
            LaU8 | LaU16 | LaU32 | LaF16 | LaF32 => 2,
            RgbaU8 | RgbaU16 | RgbaU32 | RgbaF16 | RgbaF32 => 4,
            _ => 3,
        }
    }

    /// Per-channel storage for interleaved types.
    pub fn component(self) -> Option<ComponentType> {
        use PixelType::*;
        match self {
            LU8 | LaU8 | RgbU8 | RgbaU8 => Some(ComponentType::U8),
            LU16 | LaU16 | RgbU16 | RgbaU16 => Some(ComponentType::U16),
            LU32 | LaU32 | RgbU32 | RgbaU32 => Some(ComponentType::U32),
            LF16 | LaF16 | RgbF16 | RgbaF16 => Some(ComponentType::F16),
            LF32 | LaF32 | RgbF32 | RgbaF32 => Some(ComponentType::F32),
            RgbU10 | Yuv420PU8 | Yuv422PU8 | Yuv444PU8 => None,
        }
    }

    /// Bytes per pixel for interleaved and packed types.
    pub fn bytes_per_pixel(self) -> Option<usize> {
        match self {
            Self::RgbU10 => Some(4),
            other => other
                .component()
                .map(|c| c.byte_size() * other.channel_count()),
        }
    }

    /// `true` for half and single float types.
    pub fn is_float(self) -> bool {
        matches!(
            self.component(),
            Some(ComponentType::F16 | ComponentType::F32)
        )
    }

    /// `true` for types with an alpha channel.
    pub fn has_alpha(self) -> bool {
        matches!(self.channel_count(), 2 | 4) && self.component().is_some()
    }

    /// Canonical label, e.g. `RGBA_F16`.
    pub fn label(self) -> &'static str {
        use PixelType::*;
        match self {
            LU8 => "L_U8",
            LU16 => "L_U16",
            LU32 => "L_U32",
            LF16 => "L_F16",
            LF32 => "L_F32",
            LaU8 => "LA_U8",
            LaU16 => "LA_U16",
            LaU32 => "LA_U32",
            LaF16 => "LA_F16",
            LaF32 => "LA_F32",
            RgbU8 => "RGB_U8",
            RgbU10 => "RGB_U10",
            RgbU16 => "RGB_U16",
            RgbU32 => "RGB_U32",
            RgbF16 => "RGB_F16",
            RgbF32 => "RGB_F32",
            RgbaU8 => "RGBA_U8",
            RgbaU16 => "RGBA_U16",
            RgbaU32 => "RGBA_U32",
            RgbaF16 => "RGBA_F16",
            RgbaF32 => "RGBA_F32",
            Yuv420PU8 => "YUV_420P_U8",
            Yuv422PU8 => "YUV_422P_U8",
            Yuv444PU8 => "YUV_444P_U8",
        }
    }
}

impl fmt::Display for PixelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PixelType {
    type Err = BakeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| BakeError::validation(format!("unknown pixel type '{s}'")))
    }
}

/// Byte order of multi-byte components.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endian {
    /// Most significant byte first.
    Msb,
    /// Least significant byte first.
    Lsb,
}

impl Endian {
    /// Byte order of the running machine.
    pub fn native() -> Self {
        if cfg!(target_endian = "big") {
            Self::Msb
        } else {
            Self::Lsb
        }
    }
}

/// Row alignment and byte order of image storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageLayout {
    /// Row stride is rounded up to a multiple of this many bytes.
    pub alignment: usize,
    /// Byte order of multi-byte components.
    pub endian: Endian,
}

impl Default for ImageLayout {
    fn default() -> Self {
        Self {
            alignment: 1,
            endian: Endian::native(),
        }
    }
}

/// Size, pixel type and layout of an image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageInfo {
    /// Dimensions.
    pub size: Size,
    /// Pixel layout.
    pub pixel_type: PixelType,
    /// Row alignment and byte order.
    pub layout: ImageLayout,
}

impl ImageInfo {
    /// Create an info with the default (tightly packed, native endian) layout.
    pub fn new(size: Size, pixel_type: PixelType) -> Self {
        Self {
            size,
            pixel_type,
            layout: ImageLayout::default(),
        }
    }

    /// Bytes per row for interleaved and packed types, including alignment padding.
    pub fn row_bytes(&self) -> Option<usize> {
        let bpp = self.pixel_type.bytes_per_pixel()?;
        let align = self.layout.alignment.max(1);
        let raw = self.size.w as usize * bpp;
        Some(raw.div_ceil(align) * align)
    }

    /// Total bytes of storage.
    pub fn byte_count(&self) -> usize {
        let w = self.size.w as usize;
        let h = self.size.h as usize;
        match self.pixel_type {
            PixelType::Yuv420PU8 => w * h + 2 * (w.div_ceil(2) * h.div_ceil(2)),
            PixelType::Yuv422PU8 => w * h + 2 * (w.div_ceil(2) * h),
            PixelType::Yuv444PU8 => 3 * w * h,
            _ => self.row_bytes().unwrap_or(0) * h,
        }
    }
}

impl fmt::Display for ImageInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.size, self.pixel_type)
    }
}

/// Owned image storage plus free-form metadata tags.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    info: ImageInfo,
    data: Vec<u8>,
    tags: BTreeMap<String, String>,
}

impl Image {
    /// Allocate a zeroed image.
    pub fn new(info: ImageInfo) -> Self {
        Self {
            data: vec![0u8; info.byte_count()],
            info,
            tags: BTreeMap::new(),
        }
    }

    /// Wrap existing bytes; the length must match `info.byte_count()`.
    pub fn from_bytes(info: ImageInfo, data: Vec<u8>) -> BakeResult<Self> {
        if data.len() != info.byte_count() {
            return Err(BakeError::validation(format!(
                "image data is {} bytes, expected {} for {}",
                data.len(),
                info.byte_count(),
                info
            )));
        }
        Ok(Self {
            info,
            data,
            tags: BTreeMap::new(),
        })
    }

    /// Image description.
    pub fn info(&self) -> &ImageInfo {
        &self.info
    }

    /// Dimensions.
    pub fn size(&self) -> Size {
        self.info.size
    }

    /// Pixel layout.
    pub fn pixel_type(&self) -> PixelType {
        self.info.pixel_type
    }

    /// Raw bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Raw bytes, mutable.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Metadata tags.
    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    /// Replace the metadata tags.
    pub fn set_tags(&mut self, tags: BTreeMap<String, String>) {
        self.tags = tags;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
