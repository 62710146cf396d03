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
//! Scaling row kernels.
//!
//! Kernels generic over `CH` operate on pixels made of `CH` interleaved
//! bytes (one for a plane, two for an interleaved chroma pair) and treat
//! every channel independently. The 3/4 and 3/8 kernels are single channel.
#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]

#[inline(always)]
fn sum(values: &[u8]) -> u32 {
    values.iter().map(|&v| u32::from(v)).sum()
}

/// Rounded integer mean of `count` samples.
#[inline(always)]
fn mean(total: u32, count: u32) -> u8 {
    ((total + count / 2) / count) as u8
}

/// Point samples the odd pixels.
pub fn scale_row_down2<const CH: usize>(src: &[u8], dst: &mut [u8]) {
    for (d, s) in dst.chunks_exact_mut(CH).zip(src.chunks_exact(2 * CH)) {
        d.copy_from_slice(&s[CH..]);
    }
}

/// Averages horizontal pairs.
pub fn scale_row_down2_linear<const CH: usize>(src: &[u8], dst: &mut [u8]) {
    for (d, s) in dst.chunks_exact_mut(CH).zip(src.chunks_exact(2 * CH)) {
        for c in 0..CH {
            d[c] = ((u32::from(s[c]) + u32::from(s[CH + c]) + 1) >> 1) as u8;
        }
    }
}

/// `(a + b + c + d + 2) >> 2` over each 2x2 block.
pub fn scale_row_down2_box<const CH: usize>(src0: &[u8], src1: &[u8], dst: &mut [u8]) {
    let blocks = src0.chunks_exact(2 * CH).zip(src1.chunks_exact(2 * CH));
    for (d, (s, t)) in dst.chunks_exact_mut(CH).zip(blocks) {
        for c in 0..CH {
            let total = u32::from(s[c]) + u32::from(s[CH + c]) + u32::from(t[c]) + u32::from(t[CH + c]);
            d[c] = ((total + 2) >> 2) as u8;
        }
    }
}

/// Point samples the third pixel of every four.
pub fn scale_row_down4<const CH: usize>(src: &[u8], dst: &mut [u8]) {
    for (d, s) in dst.chunks_exact_mut(CH).zip(src.chunks_exact(4 * CH)) {
        d.copy_from_slice(&s[2 * CH..3 * CH]);
    }
}

/// `(sum of 16 samples + 8) >> 4` over each 4x4 block.
pub fn scale_row_down4_box<const CH: usize>(rows: [&[u8]; 4], dst: &mut [u8]) {
    for (i, d) in dst.chunks_exact_mut(CH).enumerate() {
        for c in 0..CH {
            let mut total = 0;
            for row in &rows {
                for k in 0..4 {
                    total += u32::from(row[(4 * i + k) * CH + c]);
                }
            }
            d[c] = ((total + 8) >> 4) as u8;
        }
    }
}

/// Keeps pixels 0, 1 and 3 of every four.
pub fn scale_row_down34(src: &[u8], dst: &mut [u8]) {
    for (d, s) in dst.chunks_exact_mut(3).zip(src.chunks_exact(4)) {
        d[0] = s[0];
        d[1] = s[1];
        d[2] = s[3];
    }
}

/// Horizontal 3/4 filter of one row: taps (3, 1), (1, 1), (1, 3).
#[inline(always)]
fn down34_taps(s: &[u8]) -> [u32; 3] {
    let s: [u32; 4] = [s[0].into(), s[1].into(), s[2].into(), s[3].into()];
    [
        (s[0] * 3 + s[1] + 2) >> 2,
        (s[1] + s[2] + 1) >> 1,
        (s[2] + s[3] * 3 + 2) >> 2,
    ]
}

/// 3/4 filter, vertical weights 3:1 towards `src0`.
pub fn scale_row_down34_0_box(src0: &[u8], src1: &[u8], dst: &mut [u8]) {
    let blocks = src0.chunks_exact(4).zip(src1.chunks_exact(4));
    for (d, (s, t)) in dst.chunks_exact_mut(3).zip(blocks) {
        let (a, b) = (down34_taps(s), down34_taps(t));
        for k in 0..3 {
            d[k] = ((a[k] * 3 + b[k] + 2) >> 2) as u8;
        }
    }
}

/// 3/4 filter, vertical weights 1:1.
pub fn scale_row_down34_1_box(src0: &[u8], src1: &[u8], dst: &mut [u8]) {
    let blocks = src0.chunks_exact(4).zip(src1.chunks_exact(4));
    for (d, (s, t)) in dst.chunks_exact_mut(3).zip(blocks) {
        let (a, b) = (down34_taps(s), down34_taps(t));
        for k in 0..3 {
            d[k] = ((a[k] + b[k] + 1) >> 1) as u8;
        }
    }
}

/// Keeps pixels 0, 3 and 6 of every eight.
pub fn scale_row_down38(src: &[u8], dst: &mut [u8]) {
    for (d, s) in dst.chunks_exact_mut(3).zip(src.chunks_exact(8)) {
        d[0] = s[0];
        d[1] = s[3];
        d[2] = s[6];
    }
}

/// 3/8 box filter over `N` rows: columns are grouped 3, 3, 2.
pub fn scale_row_down38_box<const N: usize>(rows: [&[u8]; N], dst: &mut [u8]) {
    for (i, d) in dst.chunks_exact_mut(3).enumerate() {
        let base = 8 * i;
        let columns = |from: usize, to: usize| -> u32 {
            rows.iter().map(|row| sum(&row[base + from..base + to])).sum()
        };

        let n = N as u32;
        d[0] = mean(columns(0, 3), 3 * n);
        d[1] = mean(columns(3, 6), 3 * n);
        d[2] = mean(columns(6, 8), 2 * n);
    }
}

/// Nearest pixel for each destination pixel, 16.16 source position.
pub fn scale_cols<const CH: usize>(dst: &mut [u8], src: &[u8], x: i64, dx: i64) {
    let last = src.len() / CH - 1;
    let mut x = x;
    for d in dst.chunks_exact_mut(CH) {
        let xi = ((x >> 16) as usize).min(last);
        d.copy_from_slice(&src[xi * CH..(xi + 1) * CH]);
        x += dx;
    }
}

/// Every source pixel twice.
pub fn scale_cols_up2<const CH: usize>(dst: &mut [u8], src: &[u8]) {
    for (i, d) in dst.chunks_exact_mut(CH).enumerate() {
        let xi = i / 2;
        d.copy_from_slice(&src[xi * CH..(xi + 1) * CH]);
    }
}

/// Linear interpolation between the two source pixels around a 16.16
/// position: `a + ((f * (b - a) + 0x8000) >> 16)`. Positions left of the
/// first pixel read the first pixel.
pub fn scale_filter_cols<const CH: usize>(dst: &mut [u8], src: &[u8], x: i64, dx: i64) {
    let last = src.len() / CH - 1;
    let mut x = x;
    for d in dst.chunks_exact_mut(CH) {
        let at = x.max(0);
        let xi = ((at >> 16) as usize).min(last);
        let xn = (xi + 1).min(last);
        let f = at & 0xFFFF;
        for c in 0..CH {
            let a = i64::from(src[xi * CH + c]);
            let b = i64::from(src[xn * CH + c]);
            d[c] = (a + ((f * (b - a) + 0x8000) >> 16)) as u8;
        }
        x += dx;
    }
}

/// 2x horizontal upscale with taps (3, 1) and (1, 3). The first pixel is
/// copied and the last one comes from the last source pixel.
pub fn scale_row_up2_linear<const CH: usize>(src: &[u8], dst: &mut [u8]) {
    let dst_width = dst.len() / CH;
    if dst_width == 0 {
        return;
    }

    dst[..CH].copy_from_slice(&src[..CH]);
    let work = (dst_width - 1) & !1;
    for x in 0..work / 2 {
        for c in 0..CH {
            let a = u32::from(src[x * CH + c]);
            let b = u32::from(src[(x + 1) * CH + c]);
            dst[(1 + 2 * x) * CH + c] = ((a * 3 + b + 2) >> 2) as u8;
            dst[(2 + 2 * x) * CH + c] = ((a + b * 3 + 2) >> 2) as u8;
        }
    }

    let last = (dst_width - 1) / 2;
    dst[(dst_width - 1) * CH..].copy_from_slice(&src[last * CH..(last + 1) * CH]);
}

/// One destination row of the 2x2 upscale, source rows weighted 3:1
/// towards `near`.
pub fn scale_row_up2_bilinear<const CH: usize>(near: &[u8], far: &[u8], dst: &mut [u8]) {
    let dst_width = dst.len() / CH;
    if dst_width == 0 {
        return;
    }

    let edge = |x: usize, c: usize| -> u8 {
        let s = u32::from(near[x * CH + c]);
        let t = u32::from(far[x * CH + c]);
        ((s * 3 + t + 2) >> 2) as u8
    };

    for c in 0..CH {
        dst[c] = edge(0, c);
    }

    let work = (dst_width - 1) & !1;
    for x in 0..work / 2 {
        for c in 0..CH {
            let s0 = u32::from(near[x * CH + c]);
            let s1 = u32::from(near[(x + 1) * CH + c]);
            let t0 = u32::from(far[x * CH + c]);
            let t1 = u32::from(far[(x + 1) * CH + c]);
            dst[(1 + 2 * x) * CH + c] = ((s0 * 9 + s1 * 3 + t0 * 3 + t1 + 8) >> 4) as u8;
            dst[(2 + 2 * x) * CH + c] = ((s0 * 3 + s1 * 9 + t0 + t1 * 3 + 8) >> 4) as u8;
        }
    }

    let last = (dst_width - 1) / 2;
    for c in 0..CH {
        dst[(dst_width - 1) * CH + c] = edge(last, c);
    }
}

/// Accumulates one source row into per-sample sums.
pub fn scale_add_row(src: &[u8], acc: &mut [u32]) {
    for (a, &s) in acc.iter_mut().zip(src) {
        *a += u32::from(s);
    }
}

/// Normalises accumulated rows: each destination pixel is the rounded mean
/// of the box of source pixels mapped to it.
pub fn scale_add_cols<const CH: usize>(dst: &mut [u8], acc: &[u32], x: i64, dx: i64, box_height: usize) {
    let src_width = acc.len() / CH;
    let mut x = x;
    for d in dst.chunks_exact_mut(CH) {
        let ix = ((x >> 16) as usize).min(src_width - 1);
        x += dx;
        let box_width = ((x >> 16) as usize).saturating_sub(ix).max(1).min(src_width - ix);
        let area = (box_width * box_height) as u32;
        for c in 0..CH {
            let total: u32 = (ix..ix + box_width).map(|i| acc[i * CH + c]).sum();
            d[c] = mean(total, area);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn down2_variants() {
        let s = [10_u8, 20, 30, 41];
        let t = [50_u8, 60, 70, 80];
        let mut d = [0_u8; 2];

        scale_row_down2::<1>(&s, &mut d);
        assert_eq!(d, [20, 41]);

        scale_row_down2_linear::<1>(&s, &mut d);
        assert_eq!(d, [15, 36]);

        scale_row_down2_box::<1>(&s, &t, &mut d);
        assert_eq!(d, [35, 55]);

        let mut d = [0_u8; 2];
        scale_row_down2_box::<2>(&s, &t, &mut d);
        assert_eq!(d, [(10 + 30 + 50 + 70 + 2) / 4, (20 + 41 + 60 + 80 + 2) / 4]);
    }

    #[test]
    fn up2_linear_edges() {
        let src = [0_u8, 100, 200];
        let mut dst = [0_u8; 6];
        scale_row_up2_linear::<1>(&src, &mut dst);
        assert_eq!(dst, [0, 25, 75, 125, 175, 200]);

        let mut dst = [0_u8; 5];
        scale_row_up2_linear::<1>(&src, &mut dst);
        assert_eq!(dst, [0, 25, 75, 125, 200]);
    }

    #[test]
    fn up2_bilinear_flat_rows_match_linear() {
        let src = [3_u8, 90, 17, 255];
        let mut linear = [0_u8; 8];
        let mut bilinear = [0_u8; 8];
        scale_row_up2_linear::<1>(&src, &mut linear);
        scale_row_up2_bilinear::<1>(&src, &src, &mut bilinear);
        assert_eq!(linear, bilinear);
    }

    #[test]
    fn filter_cols_blend() {
        let src = [0_u8, 255];
        let mut dst = [0_u8; 3];
        scale_filter_cols::<1>(&mut dst, &src, 0, 0x8000);
        assert_eq!(dst, [0, 128, 255]);

        // Centre sampled doubling starts a quarter pixel left of the first
        // pixel and lands on the up2 taps.
        let src = [0_u8, 200];
        let mut cols = [0_u8; 4];
        let mut up2 = [0_u8; 4];
        scale_filter_cols::<1>(&mut cols, &src, -0x4000, 0x8000);
        scale_row_up2_linear::<1>(&src, &mut up2);
        assert_eq!(cols, [0, 50, 150, 200]);
        assert_eq!(cols, up2);
    }

    #[test]
    fn box_columns() {
        // Two accumulated rows, three source pixels per destination pixel.
        let acc = [2_u32, 4, 6, 200, 200, 201];
        let mut dst = [0_u8; 2];
        scale_add_cols::<1>(&mut dst, &acc, 0, 3 << 16, 2);
        assert_eq!(dst, [2, 100]);
    }

    #[test]
    fn three_eighths() {
        let row: Vec<u8> = (0..8).map(|x| x * 10).collect();
        let mut dst = [0_u8; 3];
        scale_row_down38(&row, &mut dst);
        assert_eq!(dst, [0, 30, 60]);

        scale_row_down38_box::<3>([&row, &row, &row], &mut dst);
        assert_eq!(dst, [10, 40, 65]);

        scale_row_down38_box::<2>([&row, &row], &mut dst);
        assert_eq!(dst, [10, 40, 65]);
    }
}
