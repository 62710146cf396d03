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

/// An enumeration of supported YCbCr color models.
///
/// Each model selects the fixed point coefficients used to derive luma and
/// chroma from gamma-corrected R'G'B' samples, and the output range.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(C)]
pub enum ColorSpace {
    /// YCbCr, ITU-R Recommendation BT.601 (standard video system)
    Bt601,
    /// YCbCr, ITU-R Recommendation BT.709 (CSC systems)
    Bt709,
    /// YCbCr, ITU-R Recommendation BT.2020 (UHDTV)
    Bt2020,
    /// YCbCr, BT.601 (full range, also known as JPEG)
    Bt601FR,
    /// YCbCr, BT.709 (full range)
    Bt709FR,
    /// YCbCr, BT.2020 (full range)
    Bt2020FR,
}

#[cfg(not(tarpaulin_include))]
impl std::fmt::Display for ColorSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ColorSpace::Bt601 => write!(f, "bt-601"),
            ColorSpace::Bt709 => write!(f, "bt-709"),
            ColorSpace::Bt2020 => write!(f, "bt-2020"),
            ColorSpace::Bt601FR => write!(f, "bt-601-fr"),
            ColorSpace::Bt709FR => write!(f, "bt-709-fr"),
            ColorSpace::Bt2020FR => write!(f, "bt-2020-fr"),
        }
    }
}

impl Default for ColorSpace {
    fn default() -> Self {
        ColorSpace::Bt601
    }
}

/// Which source pixels a chroma sample is computed from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(C)]
pub enum ChromaSiting {
    /// Chroma is taken from the top-left pixel of each 2x2 block
    TopLeft,
    /// Chroma is the pairwise average of each 2x2 block: the two horizontal
    /// pairs are averaged first, then the two results are averaged
    Average,
}

impl Default for ChromaSiting {
    fn default() -> Self {
        ChromaSiting::Average
    }
}

/// Fixed point (8 fractional bits) forward transform for one color model.
pub(crate) struct ColorspaceProfile {
    pub y_r: i32,
    pub y_g: i32,
    pub y_b: i32,
    /// Luma bias plus rounding, already scaled by 256
    pub y_offset: i32,
    pub u_r: i32,
    pub u_g: i32,
    pub u_b: i32,
    pub v_r: i32,
    pub v_g: i32,
    pub v_b: i32,
}

// Limited range luma: 16 << 8, plus half for rounding
const Y_OFFSET_LIMITED: i32 = 0x1080;
const Y_OFFSET_FULL: i32 = 0x0080;

/// Chroma bias: 128 << 8, with or without the rounding half.
#[cfg(not(feature = "bit_exact"))]
pub(crate) const UV_BIAS: i32 = 0x8000;
#[cfg(feature = "bit_exact")]
pub(crate) const UV_BIAS: i32 = 0x8080;

const BT601: ColorspaceProfile = ColorspaceProfile {
    y_r: 66,
    y_g: 129,
    y_b: 25,
    y_offset: Y_OFFSET_LIMITED,
    u_r: -38,
    u_g: -74,
    u_b: 112,
    v_r: 112,
    v_g: -94,
    v_b: -18,
};

const BT709: ColorspaceProfile = ColorspaceProfile {
    y_r: 47,
    y_g: 157,
    y_b: 16,
    y_offset: Y_OFFSET_LIMITED,
    u_r: -26,
    u_g: -86,
    u_b: 112,
    v_r: 112,
    v_g: -102,
    v_b: -10,
};

const BT2020: ColorspaceProfile = ColorspaceProfile {
    y_r: 58,
    y_g: 149,
    y_b: 13,
    y_offset: Y_OFFSET_LIMITED,
    u_r: -31,
    u_g: -81,
    u_b: 112,
    v_r: 112,
    v_g: -103,
    v_b: -9,
};

const BT601_FR: ColorspaceProfile = ColorspaceProfile {
    y_r: 77,
    y_g: 150,
    y_b: 29,
    y_offset: Y_OFFSET_FULL,
    u_r: -43,
    u_g: -84,
    u_b: 127,
    v_r: 127,
    v_g: -107,
    v_b: -20,
};

const BT709_FR: ColorspaceProfile = ColorspaceProfile {
    y_r: 54,
    y_g: 183,
    y_b: 19,
    y_offset: Y_OFFSET_FULL,
    u_r: -29,
    u_g: -98,
    u_b: 127,
    v_r: 127,
    v_g: -116,
    v_b: -11,
};

const BT2020_FR: ColorspaceProfile = ColorspaceProfile {
    y_r: 67,
    y_g: 174,
    y_b: 15,
    y_offset: Y_OFFSET_FULL,
    u_r: -35,
    u_g: -92,
    u_b: 127,
    v_r: 127,
    v_g: -117,
    v_b: -10,
};

impl ColorSpace {
    pub(crate) fn profile(self) -> &'static ColorspaceProfile {
        match self {
            ColorSpace::Bt601 => &BT601,
            ColorSpace::Bt709 => &BT709,
            ColorSpace::Bt2020 => &BT2020,
            ColorSpace::Bt601FR => &BT601_FR,
            ColorSpace::Bt709FR => &BT709_FR,
            ColorSpace::Bt2020FR => &BT2020_FR,
        }
    }

    /// Returns `true` when luma spans the whole byte range.
    pub fn is_full_range(self) -> bool {
        matches!(
            self,
            ColorSpace::Bt601FR | ColorSpace::Bt709FR | ColorSpace::Bt2020FR
        )
    }

    /// Converts a single R'G'B' pixel to Y'CbCr.
    ///
    /// Chroma uses the same bias as the conversion kernels, so the result
    /// matches what an image made of this pixel converts to.
    ///
    /// # Examples
    /// ```
    /// use capture_color_primitives::ColorSpace;
    /// let (y, u, v) = ColorSpace::Bt601.rgb_to_yuv(0, 0, 0);
    /// assert_eq!((y, u, v), (16, 128, 128));
    /// ```
    pub fn rgb_to_yuv(self, r: u8, g: u8, b: u8) -> (u8, u8, u8) {
        let p = self.profile();
        let (r, g, b) = (i32::from(r), i32::from(g), i32::from(b));
        (rgb_to_y(r, g, b, p), rgb_to_u(r, g, b, p), rgb_to_v(r, g, b, p))
    }
}

/// Negative values become zero.
#[inline(always)]
pub(crate) fn clamp0(v: i32) -> i32 {
    -i32::from(v >= 0) & v
}

/// Values above 255 saturate. Expects a non negative input.
#[inline(always)]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn clamp255(v: i32) -> u8 {
    ((-i32::from(v >= 255) | v) & 255) as u8
}

#[inline(always)]
pub(crate) fn clamp_u8(v: i32) -> u8 {
    clamp255(clamp0(v))
}

#[inline(always)]
pub(crate) fn rgb_to_y(r: i32, g: i32, b: i32, p: &ColorspaceProfile) -> u8 {
    clamp_u8((p.y_r * r + p.y_g * g + p.y_b * b + p.y_offset) >> 8)
}

#[inline(always)]
pub(crate) fn rgb_to_u(r: i32, g: i32, b: i32, p: &ColorspaceProfile) -> u8 {
    clamp_u8((p.u_r * r + p.u_g * g + p.u_b * b + UV_BIAS) >> 8)
}

#[inline(always)]
pub(crate) fn rgb_to_v(r: i32, g: i32, b: i32, p: &ColorspaceProfile) -> u8 {
    clamp_u8((p.v_r * r + p.v_g * g + p.v_b * b + UV_BIAS) >> 8)
}
