// Copyright 2019 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

// Permission is hereby granted, free of charge, to any person obtaining a copy of this
// software and associated documentation files (the "Software"), to deal in the Software
// without restriction, including without limitation the rights to use, copy, modify,
// merge, publish, distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so.

// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED,
// INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A
// PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT
// HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE
// SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
use core::fmt;
use std::convert::TryFrom;

/// Packs four characters into a little endian FourCC code.
pub const fn fourcc(a: u8, b: u8, c: u8, d: u8) -> u32 {
    ((d as u32) << 24) | ((c as u32) << 16) | ((b as u32) << 8) | (a as u32)
}

/// An enumeration of supported pixel formats.
///
/// Packed formats are named after their little endian 32 bit word, as FourCC
/// codes are: the first letter is the most significant byte. For instance
/// [`PixelFormat::Argb`] stores blue in the first byte of each pixel.
///
/// [`PixelFormat::Argb`]: ./enum.PixelFormat.html#variant.Argb
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(C)]
pub enum PixelFormat {
    /// Bytes in memory: B, G, R, A.
    ///
    /// 32 bits per pixel
    Argb,
    /// Bytes in memory: A, R, G, B.
    ///
    /// 32 bits per pixel
    Bgra,
    /// Bytes in memory: R, G, B, A.
    ///
    /// 32 bits per pixel
    Abgr,
    /// Bytes in memory: A, B, G, R.
    ///
    /// 32 bits per pixel
    Rgba,
    /// Bytes in memory: B, G, R.
    ///
    /// 24 bits per pixel
    Rgb24,
    /// Bytes in memory: R, G, B.
    ///
    /// 24 bits per pixel
    Raw,
    /// Little endian 16 bit word: 5 bits red (most significant), 6 bits green, 5 bits blue.
    ///
    /// 16 bits per pixel
    Rgb565,
    /// YUV with one luma plane Y then U chroma plane and last the V chroma plane.
    /// The two chroma planes are sub-sampled in both the horizontal and vertical dimensions by a factor of 2.
    ///
    /// 12 bits per pixel
    I420,
}

/// Number of packed formats served by the generic RGB row kernels.
pub(crate) const RGB_LAYOUT_COUNT: usize = 6;

impl PixelFormat {
    /// Returns the FourCC code of this format.
    pub const fn fourcc(self) -> u32 {
        match self {
            PixelFormat::Argb => fourcc(b'A', b'R', b'G', b'B'),
            PixelFormat::Bgra => fourcc(b'B', b'G', b'R', b'A'),
            PixelFormat::Abgr => fourcc(b'A', b'B', b'G', b'R'),
            PixelFormat::Rgba => fourcc(b'R', b'G', b'B', b'A'),
            PixelFormat::Rgb24 => fourcc(b'2', b'4', b'B', b'G'),
            PixelFormat::Raw => fourcc(b'r', b'a', b'w', b' '),
            PixelFormat::Rgb565 => fourcc(b'R', b'G', b'B', b'P'),
            PixelFormat::I420 => fourcc(b'I', b'4', b'2', b'0'),
        }
    }

    /// Maps a canonical FourCC code to a pixel format.
    ///
    /// Aliases (for instance `IYUV` for `I420`) are not resolved.
    pub fn from_fourcc(code: u32) -> Option<PixelFormat> {
        ALL_FORMATS.iter().copied().find(|pf| pf.fourcc() == code)
    }

    /// Bytes used by one pixel of a packed format, zero for planar formats.
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Argb | PixelFormat::Bgra | PixelFormat::Abgr | PixelFormat::Rgba => 4,
            PixelFormat::Rgb24 | PixelFormat::Raw => 3,
            PixelFormat::Rgb565 => 2,
            PixelFormat::I420 => 0,
        }
    }

    pub(crate) const fn is_planar(self) -> bool {
        matches!(self, PixelFormat::I420)
    }

    /// Byte offsets of red, green and blue inside a pixel, then bytes per pixel.
    #[cfg_attr(coverage_nightly, coverage(off))]
    pub(crate) const fn rgb_layout(self) -> Option<[usize; 4]> {
        match self {
            PixelFormat::Argb => Some(layout::ARGB),
            PixelFormat::Bgra => Some(layout::BGRA),
            PixelFormat::Abgr => Some(layout::ABGR),
            PixelFormat::Rgba => Some(layout::RGBA),
            PixelFormat::Rgb24 => Some(layout::RGB24),
            PixelFormat::Raw => Some(layout::RAW),
            PixelFormat::Rgb565 | PixelFormat::I420 => None,
        }
    }
}

/// Red, green and blue byte offsets followed by bytes per pixel, one entry
/// per packed layout the row kernels are instantiated for.
pub(crate) mod layout {
    pub const ARGB: [usize; 4] = [2, 1, 0, 4];
    pub const BGRA: [usize; 4] = [1, 2, 3, 4];
    pub const ABGR: [usize; 4] = [0, 1, 2, 4];
    pub const RGBA: [usize; 4] = [3, 2, 1, 4];
    pub const RGB24: [usize; 4] = [2, 1, 0, 3];
    pub const RAW: [usize; 4] = [0, 1, 2, 3];
}

const ALL_FORMATS: [PixelFormat; 8] = [
    PixelFormat::Argb,
    PixelFormat::Bgra,
    PixelFormat::Abgr,
    PixelFormat::Rgba,
    PixelFormat::Rgb24,
    PixelFormat::Raw,
    PixelFormat::Rgb565,
    PixelFormat::I420,
];

impl fmt::Display for PixelFormat {
    #[cfg_attr(coverage_nightly, coverage(off))]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PixelFormat::Argb => write!(f, "argb"),
            PixelFormat::Bgra => write!(f, "bgra"),
            PixelFormat::Abgr => write!(f, "abgr"),
            PixelFormat::Rgba => write!(f, "rgba"),
            PixelFormat::Rgb24 => write!(f, "rgb24"),
            PixelFormat::Raw => write!(f, "raw"),
            PixelFormat::Rgb565 => write!(f, "rgb565"),
            PixelFormat::I420 => write!(f, "i420"),
        }
    }
}

impl TryFrom<u32> for PixelFormat {
    type Error = ();

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        PixelFormat::from_fourcc(value).ok_or(())
    }
}

/// If a plane stride is assigned to this constant, the plane will be assumed to contain packed data
pub const STRIDE_AUTO: i32 = 0;

pub(crate) const I420_PLANES: usize = 3;

pub(crate) const DEFAULT_STRIDES: [i32; I420_PLANES] = [STRIDE_AUTO; I420_PLANES];

/// Chroma extent for a 4:2:0 plane of the given luma extent.
#[inline]
pub(crate) const fn half(x: usize) -> usize {
    (x + 1) >> 1
}

/// Resolves `STRIDE_AUTO` against the packed stride of a plane.
#[allow(clippy::cast_possible_wrap)]
pub(crate) fn resolve_stride(stride: i32, packed: usize) -> isize {
    if stride == STRIDE_AUTO {
        packed as isize
    } else {
        stride as isize
    }
}

/// Sizes in bytes of the three planes of an I420 image.
pub(crate) fn get_i420_sizes(
    width: usize,
    height: usize,
    strides: &[i32],
    sizes: &mut [usize; I420_PLANES],
) -> bool {
    if strides.len() < I420_PLANES {
        return false;
    }

    let widths = [width, half(width), half(width)];
    let heights = [height, half(height), half(height)];
    for plane in 0..I420_PLANES {
        let stride = resolve_stride(strides[plane], widths[plane]).unsigned_abs();
        if stride < widths[plane] {
            return false;
        }

        sizes[plane] = stride * heights[plane];
    }

    true
}
