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
//! SSE2 row kernels.
//!
//! Each kernel converts the block aligned prefix of the row with vector code
//! and hands the tail to the matching portable kernel, so the output does not
//! depend on the row width.
use crate::color_space::{ColorspaceProfile, UV_BIAS};
use crate::kernels::generic;

#[cfg(target_arch = "x86")]
use core::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;

const PIXELS_PER_ITERATION: usize = 8;
const LANE_COUNT: usize = 16;

const fn mm_shuffle(z: i32, y: i32, x: i32, w: i32) -> i32 {
    (z << 6) | (y << 4) | (x << 2) | w
}

macro_rules! zero {
    () => {
        _mm_setzero_si128()
    };
}

/// Weights laid out as two 4-byte pixels, zero on the unused channel.
#[allow(clippy::cast_possible_truncation)]
fn pixel_weights<const R: usize, const G: usize, const B: usize>(
    wr: i32,
    wg: i32,
    wb: i32,
) -> [i16; 8] {
    let mut weights = [0_i16; 8];
    for pixel in weights.chunks_exact_mut(4) {
        pixel[R] = wr as i16;
        pixel[G] = wg as i16;
        pixel[B] = wb as i16;
    }

    weights
}

unsafe fn load_weights(weights: &[i16; 8]) -> __m128i {
    _mm_loadu_si128(weights.as_ptr().cast())
}

/// Weighted channel sum of four 4-byte pixels.
///
/// pixels: p3 p2 p1 p0 (16 bytes)
/// return: s3 s2 s1 s0 (i32)
#[inline(always)]
unsafe fn dot_4x(pixels: __m128i, weights: __m128i) -> __m128i {
    let lo = _mm_madd_epi16(_mm_unpacklo_epi8(pixels, zero!()), weights);
    let hi = _mm_madd_epi16(_mm_unpackhi_epi8(pixels, zero!()), weights);
    let (lo, hi) = (_mm_castsi128_ps(lo), _mm_castsi128_ps(hi));
    _mm_add_epi32(
        _mm_castps_si128(_mm_shuffle_ps(lo, hi, mm_shuffle(2, 0, 2, 0))),
        _mm_castps_si128(_mm_shuffle_ps(lo, hi, mm_shuffle(3, 1, 3, 1))),
    )
}

/// Rounding average of horizontally adjacent 4-byte pixels (8 pixels in,
/// 4 pixels out).
#[inline(always)]
unsafe fn pair_average_4x(src: *const u8) -> __m128i {
    let a = _mm_castsi128_ps(_mm_loadu_si128(src.cast()));
    let b = _mm_castsi128_ps(_mm_loadu_si128(src.add(LANE_COUNT).cast()));
    _mm_avg_epu8(
        _mm_castps_si128(_mm_shuffle_ps(a, b, mm_shuffle(2, 0, 2, 0))),
        _mm_castps_si128(_mm_shuffle_ps(a, b, mm_shuffle(3, 1, 3, 1))),
    )
}

#[target_feature(enable = "sse2")]
unsafe fn rgb_to_y_8x<const R: usize, const G: usize, const B: usize>(
    src: &[u8],
    dst: &mut [u8],
    width: usize,
    profile: &ColorspaceProfile,
) -> usize {
    let weights = load_weights(&pixel_weights::<R, G, B>(
        profile.y_r,
        profile.y_g,
        profile.y_b,
    ));
    let offset = _mm_set1_epi32(profile.y_offset);
    let count = width & !(PIXELS_PER_ITERATION - 1);

    let src = src.as_ptr();
    let dst = dst.as_mut_ptr();
    let mut x = 0;
    while x < count {
        let rgb = src.add(4 * x);
        let y0 = dot_4x(_mm_loadu_si128(rgb.cast()), weights);
        let y1 = dot_4x(_mm_loadu_si128(rgb.add(LANE_COUNT).cast()), weights);
        let y0 = _mm_srai_epi32(_mm_add_epi32(y0, offset), 8);
        let y1 = _mm_srai_epi32(_mm_add_epi32(y1, offset), 8);

        let y = _mm_packs_epi32(y0, y1);
        _mm_storel_epi64(dst.add(x).cast(), _mm_packus_epi16(y, y));
        x += PIXELS_PER_ITERATION;
    }

    count
}

#[target_feature(enable = "sse2")]
unsafe fn rgb_to_uv_8x<const R: usize, const G: usize, const B: usize>(
    src0: &[u8],
    src1: &[u8],
    dst_u: &mut [u8],
    dst_v: &mut [u8],
    width: usize,
    profile: &ColorspaceProfile,
) -> usize {
    let u_weights = load_weights(&pixel_weights::<R, G, B>(
        profile.u_r,
        profile.u_g,
        profile.u_b,
    ));
    let v_weights = load_weights(&pixel_weights::<R, G, B>(
        profile.v_r,
        profile.v_g,
        profile.v_b,
    ));
    let bias = _mm_set1_epi32(UV_BIAS);
    let count = width & !(PIXELS_PER_ITERATION - 1);

    let mut x = 0;
    while x < count {
        let top = pair_average_4x(src0.as_ptr().add(4 * x));
        let bottom = pair_average_4x(src1.as_ptr().add(4 * x));
        let block = _mm_avg_epu8(top, bottom);

        let u = _mm_srai_epi32(_mm_add_epi32(dot_4x(block, u_weights), bias), 8);
        let v = _mm_srai_epi32(_mm_add_epi32(dot_4x(block, v_weights), bias), 8);
        let uv = _mm_packus_epi16(_mm_packs_epi32(u, v), zero!());

        let i = x / 2;
        dst_u[i..i + 4].copy_from_slice(&_mm_cvtsi128_si32(uv).to_le_bytes());
        dst_v[i..i + 4].copy_from_slice(&_mm_cvtsi128_si32(_mm_srli_si128(uv, 4)).to_le_bytes());
        x += PIXELS_PER_ITERATION;
    }

    count
}

pub fn rgb_to_y_row<const R: usize, const G: usize, const B: usize, const BPP: usize>(
    src: &[u8],
    dst: &mut [u8],
    width: usize,
    profile: &ColorspaceProfile,
) {
    let width = width.min(src.len() / BPP).min(dst.len());
    let done = if BPP == 4 {
        unsafe { rgb_to_y_8x::<R, G, B>(src, dst, width, profile) }
    } else {
        0
    };

    generic::rgb_to_y_row::<R, G, B, BPP>(
        &src[done * BPP..],
        &mut dst[done..],
        width - done,
        profile,
    );
}

pub fn rgb_to_uv_row<const R: usize, const G: usize, const B: usize, const BPP: usize>(
    src0: &[u8],
    src1: &[u8],
    dst_u: &mut [u8],
    dst_v: &mut [u8],
    width: usize,
    profile: &ColorspaceProfile,
) {
    let width = width
        .min(src0.len() / BPP)
        .min(src1.len() / BPP)
        .min(2 * dst_u.len())
        .min(2 * dst_v.len());
    let done = if BPP == 4 {
        unsafe { rgb_to_uv_8x::<R, G, B>(src0, src1, dst_u, dst_v, width, profile) }
    } else {
        0
    };

    generic::rgb_to_uv_row::<R, G, B, BPP>(
        &src0[done * BPP..],
        &src1[done * BPP..],
        &mut dst_u[done / 2..],
        &mut dst_v[done / 2..],
        width - done,
        profile,
    );
}

/// Reverses the 16 bytes of a register.
#[inline(always)]
unsafe fn reverse_16x(x: __m128i) -> __m128i {
    let x = _mm_shuffle_epi32(x, mm_shuffle(0, 1, 2, 3));
    let x = _mm_shufflelo_epi16(x, mm_shuffle(2, 3, 0, 1));
    let x = _mm_shufflehi_epi16(x, mm_shuffle(2, 3, 0, 1));
    _mm_or_si128(_mm_slli_epi16(x, 8), _mm_srli_epi16(x, 8))
}

#[target_feature(enable = "sse2")]
unsafe fn mirror_16x(src: &[u8], dst: &mut [u8], width: usize) -> usize {
    let count = width & !(LANE_COUNT - 1);
    let mut x = 0;
    while x < count {
        let block = _mm_loadu_si128(src.as_ptr().add(width - x - LANE_COUNT).cast());
        _mm_storeu_si128(dst.as_mut_ptr().add(x).cast(), reverse_16x(block));
        x += LANE_COUNT;
    }

    count
}

pub fn mirror_row(src: &[u8], dst: &mut [u8]) {
    let width = src.len().min(dst.len());
    let src = &src[..width];
    let done = unsafe { mirror_16x(src, dst, width) };
    generic::mirror_row(&src[..width - done], &mut dst[done..width]);
}

#[target_feature(enable = "sse2")]
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
unsafe fn blend_16x(dst: &mut [u8], src0: &[u8], src1: &[u8], width: usize, fraction: u32) -> usize {
    let f0 = _mm_set1_epi16((256 - fraction) as i16);
    let f1 = _mm_set1_epi16(fraction as i16);
    let round = _mm_set1_epi16(128);
    let count = width & !(LANE_COUNT - 1);

    let mut x = 0;
    while x < count {
        let a = _mm_loadu_si128(src0.as_ptr().add(x).cast());
        let b = _mm_loadu_si128(src1.as_ptr().add(x).cast());
        let lo = _mm_add_epi16(
            _mm_add_epi16(
                _mm_mullo_epi16(_mm_unpacklo_epi8(a, zero!()), f0),
                _mm_mullo_epi16(_mm_unpacklo_epi8(b, zero!()), f1),
            ),
            round,
        );
        let hi = _mm_add_epi16(
            _mm_add_epi16(
                _mm_mullo_epi16(_mm_unpackhi_epi8(a, zero!()), f0),
                _mm_mullo_epi16(_mm_unpackhi_epi8(b, zero!()), f1),
            ),
            round,
        );
        let blended = _mm_packus_epi16(_mm_srli_epi16(lo, 8), _mm_srli_epi16(hi, 8));
        _mm_storeu_si128(dst.as_mut_ptr().add(x).cast(), blended);
        x += LANE_COUNT;
    }

    count
}

pub fn blend_row(dst: &mut [u8], src0: &[u8], src1: &[u8], fraction: u32) {
    let width = dst.len().min(src0.len()).min(src1.len());
    let done = unsafe { blend_16x(dst, src0, src1, width, fraction) };
    generic::blend_row(&mut dst[done..width], &src0[done..], &src1[done..], fraction);
}

#[target_feature(enable = "sse2")]
unsafe fn average_16x(dst: &mut [u8], src0: &[u8], src1: &[u8], width: usize) -> usize {
    let count = width & !(LANE_COUNT - 1);
    let mut x = 0;
    while x < count {
        let a = _mm_loadu_si128(src0.as_ptr().add(x).cast());
        let b = _mm_loadu_si128(src1.as_ptr().add(x).cast());
        _mm_storeu_si128(dst.as_mut_ptr().add(x).cast(), _mm_avg_epu8(a, b));
        x += LANE_COUNT;
    }

    count
}

pub fn average_row(dst: &mut [u8], src0: &[u8], src1: &[u8]) {
    let width = dst.len().min(src0.len()).min(src1.len());
    let done = unsafe { average_16x(dst, src0, src1, width) };
    generic::average_row(&mut dst[done..width], &src0[done..], &src1[done..]);
}

#[target_feature(enable = "sse2")]
unsafe fn down2_box_8x(src0: &[u8], src1: &[u8], dst: &mut [u8], dst_width: usize) -> usize {
    let mask = _mm_set1_epi16(0x00FF);
    let two = _mm_set1_epi16(2);
    let count = dst_width & !(PIXELS_PER_ITERATION - 1);

    let mut x = 0;
    while x < count {
        let a = _mm_loadu_si128(src0.as_ptr().add(2 * x).cast());
        let b = _mm_loadu_si128(src1.as_ptr().add(2 * x).cast());
        let sa = _mm_add_epi16(_mm_and_si128(a, mask), _mm_srli_epi16(a, 8));
        let sb = _mm_add_epi16(_mm_and_si128(b, mask), _mm_srli_epi16(b, 8));
        let sum = _mm_srli_epi16(_mm_add_epi16(_mm_add_epi16(sa, sb), two), 2);
        _mm_storel_epi64(dst.as_mut_ptr().add(x).cast(), _mm_packus_epi16(sum, sum));
        x += PIXELS_PER_ITERATION;
    }

    count
}

pub fn scale_row_down2_box(src0: &[u8], src1: &[u8], dst: &mut [u8]) {
    let dst_width = dst.len().min(src0.len() / 2).min(src1.len() / 2);
    let done = unsafe { down2_box_8x(src0, src1, dst, dst_width) };
    crate::scale::row::scale_row_down2_box::<1>(
        &src0[2 * done..],
        &src1[2 * done..],
        &mut dst[done..dst_width],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color_space::ColorSpace;
    use rand::Rng;

    fn random_row(len: usize) -> Vec<u8> {
        let mut rng = rand::thread_rng();
        (0..len).map(|_| rng.gen()).collect()
    }

    fn sse2_available() -> bool {
        is_x86_feature_detected!("sse2")
    }

    #[test]
    fn luma_matches_generic() {
        if !sse2_available() {
            return;
        }

        for cs in &[ColorSpace::Bt601, ColorSpace::Bt709FR, ColorSpace::Bt2020] {
            let profile = cs.profile();
            for width in 0..41 {
                let src = random_row(4 * width);
                let mut expected = vec![0; width];
                let mut actual = vec![0; width];
                generic::rgb_to_y_row::<2, 1, 0, 4>(&src, &mut expected, width, profile);
                rgb_to_y_row::<2, 1, 0, 4>(&src, &mut actual, width, profile);
                assert_eq!(expected, actual, "{} width {}", cs, width);

                generic::rgb_to_y_row::<1, 2, 3, 4>(&src, &mut expected, width, profile);
                rgb_to_y_row::<1, 2, 3, 4>(&src, &mut actual, width, profile);
                assert_eq!(expected, actual, "{} width {}", cs, width);
            }
        }
    }

    #[test]
    fn chroma_matches_generic() {
        if !sse2_available() {
            return;
        }

        for cs in &[ColorSpace::Bt601, ColorSpace::Bt601FR, ColorSpace::Bt709] {
            let profile = cs.profile();
            for width in 1..41 {
                let src0 = random_row(4 * width);
                let src1 = random_row(4 * width);
                let half = (width + 1) / 2;
                let (mut eu, mut ev) = (vec![0; half], vec![0; half]);
                let (mut au, mut av) = (vec![0; half], vec![0; half]);
                generic::rgb_to_uv_row::<0, 1, 2, 4>(&src0, &src1, &mut eu, &mut ev, width, profile);
                rgb_to_uv_row::<0, 1, 2, 4>(&src0, &src1, &mut au, &mut av, width, profile);
                assert_eq!((eu, ev), (au, av), "{} width {}", cs, width);
            }
        }
    }

    #[test]
    fn row_helpers_match_generic() {
        if !sse2_available() {
            return;
        }

        for width in 0..70 {
            let a = random_row(width);
            let b = random_row(width);
            let mut expected = vec![0; width];
            let mut actual = vec![0; width];

            generic::mirror_row(&a, &mut expected);
            mirror_row(&a, &mut actual);
            assert_eq!(expected, actual);

            for &fraction in &[1, 64, 77, 128, 200, 255] {
                generic::blend_row(&mut expected, &a, &b, fraction);
                blend_row(&mut actual, &a, &b, fraction);
                assert_eq!(expected, actual);
            }

            generic::average_row(&mut expected, &a, &b);
            average_row(&mut actual, &a, &b);
            assert_eq!(expected, actual);

            let half = width / 2;
            let mut expected = vec![0; half];
            let mut actual = vec![0; half];
            crate::scale::row::scale_row_down2_box::<1>(&a, &b, &mut expected);
            scale_row_down2_box(&a, &b, &mut actual);
            assert_eq!(expected, actual);
        }
    }
}
