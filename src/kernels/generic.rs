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
//! Portable row kernels. Every accelerated kernel has a counterpart here and
//! must produce the same bytes.
use crate::color_space::{rgb_to_u, rgb_to_v, rgb_to_y, ColorspaceProfile};

/// Rounding average of two bytes.
#[inline(always)]
#[allow(clippy::cast_possible_truncation)]
pub fn avg_u8(a: u8, b: u8) -> u8 {
    ((u16::from(a) + u16::from(b) + 1) >> 1) as u8
}

/// Luma for `width` pixels of one packed row.
pub fn rgb_to_y_row<const R: usize, const G: usize, const B: usize, const BPP: usize>(
    src: &[u8],
    dst: &mut [u8],
    width: usize,
    profile: &ColorspaceProfile,
) {
    for (y, pixel) in dst[..width].iter_mut().zip(src.chunks_exact(BPP)) {
        *y = rgb_to_y(
            i32::from(pixel[R]),
            i32::from(pixel[G]),
            i32::from(pixel[B]),
            profile,
        );
    }
}

/// Chroma for `(width + 1) / 2` samples from two packed rows.
///
/// Each 2x2 block is reduced by averaging the horizontal pairs of each row,
/// then averaging the two rows. An odd trailing column pairs the last pixel
/// with itself.
pub fn rgb_to_uv_row<const R: usize, const G: usize, const B: usize, const BPP: usize>(
    src0: &[u8],
    src1: &[u8],
    dst_u: &mut [u8],
    dst_v: &mut [u8],
    width: usize,
    profile: &ColorspaceProfile,
) {
    let pairs = width / 2;
    for x in 0..pairs {
        let top = &src0[2 * x * BPP..];
        let bottom = &src1[2 * x * BPP..];
        let channel = |c: usize| {
            i32::from(avg_u8(
                avg_u8(top[c], top[BPP + c]),
                avg_u8(bottom[c], bottom[BPP + c]),
            ))
        };

        let (r, g, b) = (channel(R), channel(G), channel(B));
        dst_u[x] = rgb_to_u(r, g, b, profile);
        dst_v[x] = rgb_to_v(r, g, b, profile);
    }

    if width & 1 != 0 {
        let top = &src0[(width - 1) * BPP..];
        let bottom = &src1[(width - 1) * BPP..];
        let channel = |c: usize| i32::from(avg_u8(top[c], bottom[c]));

        let (r, g, b) = (channel(R), channel(G), channel(B));
        dst_u[pairs] = rgb_to_u(r, g, b, profile);
        dst_v[pairs] = rgb_to_v(r, g, b, profile);
    }
}

/// Chroma for `(width + 1) / 2` samples taken from the top-left pixel of
/// each block. The second row is not read.
pub fn rgb_to_uv_row_top_left<const R: usize, const G: usize, const B: usize, const BPP: usize>(
    src0: &[u8],
    _src1: &[u8],
    dst_u: &mut [u8],
    dst_v: &mut [u8],
    width: usize,
    profile: &ColorspaceProfile,
) {
    let samples = (width + 1) / 2;
    let pixels = src0.chunks(2 * BPP).take(samples);
    for ((u, v), pixel) in dst_u.iter_mut().zip(dst_v.iter_mut()).zip(pixels) {
        let (r, g, b) = (
            i32::from(pixel[R]),
            i32::from(pixel[G]),
            i32::from(pixel[B]),
        );
        *u = rgb_to_u(r, g, b, profile);
        *v = rgb_to_v(r, g, b, profile);
    }
}

/// Expands little endian RGB565 pixels to 4-byte B, G, R, A pixels.
pub fn rgb565_to_argb_row(src: &[u8], dst: &mut [u8], width: usize) {
    for (argb, rgb) in dst.chunks_exact_mut(4).zip(src.chunks_exact(2)).take(width) {
        let b = rgb[0] & 0x1F;
        let g = (rgb[0] >> 5) | ((rgb[1] & 0x07) << 3);
        let r = rgb[1] >> 3;
        argb[0] = (b << 3) | (b >> 2);
        argb[1] = (g << 2) | (g >> 4);
        argb[2] = (r << 3) | (r >> 2);
        argb[3] = 255;
    }
}

/// Writes `src` reversed into `dst`.
pub fn mirror_row<T: Copy>(src: &[T], dst: &mut [T]) {
    for (d, s) in dst.iter_mut().zip(src.iter().rev()) {
        *d = *s;
    }
}

/// `(a * (256 - f) + b * f + 128) >> 8` for every byte.
#[allow(clippy::cast_possible_truncation)]
pub fn blend_row(dst: &mut [u8], src0: &[u8], src1: &[u8], fraction: u32) {
    let f1 = fraction;
    let f0 = 256 - fraction;
    for ((d, &a), &b) in dst.iter_mut().zip(src0).zip(src1) {
        *d = ((u32::from(a) * f0 + u32::from(b) * f1 + 128) >> 8) as u8;
    }
}

/// `(a + b + 1) >> 1` for every byte.
pub fn average_row(dst: &mut [u8], src0: &[u8], src1: &[u8]) {
    for ((d, &a), &b) in dst.iter_mut().zip(src0).zip(src1) {
        *d = avg_u8(a, b);
    }
}
