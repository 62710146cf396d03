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
//! Plane scaling.
//!
//! Source positions are tracked in 16.16 fixed point. The path is chosen
//! from the size ratio and the (reduced) filter: exact ratios take
//! dedicated row kernels, everything else goes through the general
//! bilinear, box or point sampling loops.
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]

pub(crate) mod row;

use crate::kernels::KernelTable;
use crate::plane::{Plane, PlaneMut};
use crate::rotate::copy_plane;
use crate::scratch::AlignedBuffer;
use crate::ErrorKind;

use log::trace;

/// Resampling filter.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(C)]
pub enum FilterMode {
    /// Point sampling
    None = 0,
    /// Horizontal interpolation only
    Linear = 1,
    /// Horizontal and vertical interpolation
    Bilinear = 2,
    /// Area averaging on downscale, bilinear otherwise
    Box = 3,
}

impl Default for FilterMode {
    fn default() -> Self {
        FilterMode::Box
    }
}

#[cfg(not(tarpaulin_include))]
impl std::fmt::Display for FilterMode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            FilterMode::None => write!(f, "none"),
            FilterMode::Linear => write!(f, "linear"),
            FilterMode::Bilinear => write!(f, "bilinear"),
            FilterMode::Box => write!(f, "box"),
        }
    }
}

impl std::convert::TryFrom<i32> for FilterMode {
    type Error = ();

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(FilterMode::None),
            1 => Ok(FilterMode::Linear),
            2 => Ok(FilterMode::Bilinear),
            3 => Ok(FilterMode::Box),
            _ => Err(()),
        }
    }
}

/// Downgrades the filter when a cheaper one gives the same result.
pub(crate) fn reduce_filter(
    src_width: usize,
    src_height: usize,
    dst_width: usize,
    dst_height: usize,
    filter: FilterMode,
) -> FilterMode {
    let mut filter = filter;
    if filter == FilterMode::Box && (dst_width * 2 >= src_width || dst_height * 2 >= src_height) {
        filter = FilterMode::Bilinear;
    }

    if filter == FilterMode::Bilinear
        && (src_height == 1 || dst_height == src_height || dst_height * 3 == src_height)
    {
        filter = FilterMode::Linear;
    }

    if filter == FilterMode::Linear
        && (src_width == 1 || dst_width == src_width || dst_width * 3 == src_width)
    {
        filter = FilterMode::None;
    }

    filter
}

#[inline(always)]
fn fixed_div(num: usize, div: usize) -> i64 {
    ((num as i64) << 16) / div as i64
}

#[inline(always)]
fn center_start(step: i64, offset: i64) -> i64 {
    (step >> 1) + offset
}

/// Starting positions and steps, 16.16.
#[derive(Debug, PartialEq, Eq)]
struct Slope {
    x: i64,
    y: i64,
    dx: i64,
    dy: i64,
}

/// Destination pixel centres mapped onto source pixel centres. On upscale
/// the first positions are negative; readers clamp them to zero.
fn interpolating_axis(src: usize, dst: usize) -> (i64, i64) {
    let step = fixed_div(src, dst);
    (center_start(step, -32768), step)
}

fn slope(
    src_width: usize,
    src_height: usize,
    dst_width: usize,
    dst_height: usize,
    filter: FilterMode,
) -> Slope {
    match filter {
        FilterMode::Box => Slope {
            x: 0,
            y: 0,
            dx: fixed_div(src_width, dst_width),
            dy: fixed_div(src_height, dst_height),
        },
        FilterMode::Bilinear => {
            let (x, dx) = interpolating_axis(src_width, dst_width);
            let (y, dy) = interpolating_axis(src_height, dst_height);
            Slope { x, y, dx, dy }
        }
        FilterMode::Linear => {
            let (x, dx) = interpolating_axis(src_width, dst_width);
            let dy = fixed_div(src_height, dst_height);
            Slope { x, y: dy >> 1, dx, dy }
        }
        FilterMode::None => {
            let dx = fixed_div(src_width, dst_width);
            let dy = fixed_div(src_height, dst_height);
            Slope {
                x: center_start(dx, 0),
                y: center_start(dy, 0),
                dx,
                dy,
            }
        }
    }
}

/// Scales `src` into `dst`. Plane widths count bytes, pixels are `CH`
/// bytes wide.
pub(crate) fn scale_plane<const CH: usize>(
    kernels: &KernelTable,
    src: Plane<u8>,
    mut dst: PlaneMut<u8>,
    filter: FilterMode,
) -> Result<(), ErrorKind> {
    let (src_width, src_height) = (src.width() / CH, src.height());
    let (dst_width, dst_height) = (dst.width() / CH, dst.height());
    if src_width == 0 || src_height == 0 || dst_width == 0 || dst_height == 0 {
        return Ok(());
    }

    let filter = reduce_filter(src_width, src_height, dst_width, dst_height, filter);
    trace!(
        "scale {}x{} -> {}x{}, {} channel(s), filter {}",
        src_width,
        src_height,
        dst_width,
        dst_height,
        CH,
        filter
    );

    if dst_width == src_width && dst_height == src_height {
        copy_plane(&src, &mut dst);
        return Ok(());
    }

    if dst_width == src_width && filter != FilterMode::Box {
        scale_plane_vertical(kernels, &src, &mut dst, filter);
        return Ok(());
    }

    if dst_width <= src_width && dst_height <= src_height {
        if CH == 1 && 4 * dst_width == 3 * src_width && 4 * dst_height == 3 * src_height {
            scale_plane_down34(&src, &mut dst, filter);
            return Ok(());
        }

        if 2 * dst_width == src_width && 2 * dst_height == src_height {
            scale_plane_down2::<CH>(kernels, &src, &mut dst, filter);
            return Ok(());
        }

        if CH == 1 && 8 * dst_width == 3 * src_width && dst_height == (src_height * 3 + 7) / 8 {
            scale_plane_down38(&src, &mut dst, filter);
            return Ok(());
        }

        if 4 * dst_width == src_width
            && 4 * dst_height == src_height
            && (filter == FilterMode::Box || filter == FilterMode::None)
        {
            scale_plane_down4::<CH>(&src, &mut dst, filter);
            return Ok(());
        }
    }

    if filter == FilterMode::Box && dst_height * 2 < src_height {
        return scale_plane_box::<CH>(&src, &mut dst);
    }

    if dst_width == 2 * src_width && filter == FilterMode::Linear {
        scale_plane_up2_linear::<CH>(&src, &mut dst);
        return Ok(());
    }

    if dst_height == 2 * src_height
        && dst_width == 2 * src_width
        && (filter == FilterMode::Bilinear || filter == FilterMode::Box)
    {
        scale_plane_up2_bilinear::<CH>(&src, &mut dst);
        return Ok(());
    }

    if filter != FilterMode::None && dst_height > src_height {
        return scale_plane_bilinear_up::<CH>(kernels, &src, &mut dst, filter);
    }

    if filter != FilterMode::None {
        return scale_plane_bilinear_down::<CH>(kernels, &src, &mut dst, filter);
    }

    scale_plane_simple::<CH>(&src, &mut dst);
    Ok(())
}

/// Same width: only rows are resampled.
fn scale_plane_vertical(
    kernels: &KernelTable,
    src: &Plane<u8>,
    dst: &mut PlaneMut<u8>,
    filter: FilterMode,
) {
    let (src_height, dst_height) = (src.height(), dst.height());
    let width = src.width();
    let Slope { mut y, dy, .. } = slope(width, src_height, width, dst_height, filter);
    let max_y = ((src_height - 1) as i64) << 16;

    for j in 0..dst_height {
        let at = y.clamp(0, max_y);
        let yi = (at >> 16) as usize;
        let fraction = if filter == FilterMode::None {
            0
        } else {
            ((at >> 8) & 255) as u32
        };

        kernels.interpolate_row(dst.row_mut(j), src.row(yi), src.row_clamped(yi + 1), fraction);
        y += dy;
    }
}

fn scale_plane_down2<const CH: usize>(
    kernels: &KernelTable,
    src: &Plane<u8>,
    dst: &mut PlaneMut<u8>,
    filter: FilterMode,
) {
    for j in 0..dst.height() {
        let out = dst.row_mut(j);
        match filter {
            FilterMode::None => row::scale_row_down2::<CH>(src.row(2 * j + 1), out),
            FilterMode::Linear => row::scale_row_down2_linear::<CH>(src.row(2 * j), out),
            // Box is always reduced to bilinear at this ratio.
            _ => {
                let (top, bottom) = (src.row(2 * j), src.row(2 * j + 1));
                if CH == 1 {
                    (kernels.down2_box)(top, bottom, out);
                } else {
                    row::scale_row_down2_box::<CH>(top, bottom, out);
                }
            }
        }
    }
}

fn scale_plane_down4<const CH: usize>(src: &Plane<u8>, dst: &mut PlaneMut<u8>, filter: FilterMode) {
    for j in 0..dst.height() {
        let out = dst.row_mut(j);
        if filter == FilterMode::Box {
            let rows = [
                src.row(4 * j),
                src.row(4 * j + 1),
                src.row(4 * j + 2),
                src.row(4 * j + 3),
            ];
            row::scale_row_down4_box::<CH>(rows, out);
        } else {
            row::scale_row_down4::<CH>(src.row(4 * j + 2), out);
        }
    }
}

/// 3/4 in both directions. Every group of four source rows gives three
/// destination rows weighted 3:1, 1:1 and 1:3.
fn scale_plane_down34(src: &Plane<u8>, dst: &mut PlaneMut<u8>, filter: FilterMode) {
    let dst_height = dst.height();
    // Linear filtering ignores the second row of each pair.
    let pair = |y: usize, next: usize| {
        let first = src.row_clamped(y);
        if filter == FilterMode::Linear {
            (first, first)
        } else {
            (first, src.row_clamped(next))
        }
    };

    let mut j = 0;
    while j < dst_height {
        let y = j / 3 * 4;
        if filter == FilterMode::None {
            for (k, offset) in [0, 1, 3].iter().enumerate().take(dst_height - j) {
                row::scale_row_down34(src.row_clamped(y + offset), dst.row_mut(j + k));
            }
        } else {
            let (s, t) = pair(y, if j + 1 < dst_height { y + 1 } else { y });
            row::scale_row_down34_0_box(s, t, dst.row_mut(j));
            if j + 1 < dst_height {
                let next = if j + 2 < dst_height { y + 2 } else { y + 1 };
                let (s, t) = pair(y + 1, next);
                row::scale_row_down34_1_box(s, t, dst.row_mut(j + 1));
            }
            if j + 2 < dst_height {
                let (s, t) = pair(y + 3, y + 2);
                row::scale_row_down34_0_box(s, t, dst.row_mut(j + 2));
            }
        }

        j += 3;
    }
}

/// 3/8 in both directions. Each group of eight source rows is split 3, 3, 2.
fn scale_plane_down38(src: &Plane<u8>, dst: &mut PlaneMut<u8>, filter: FilterMode) {
    let dst_height = dst.height();
    let rows = |y: usize, count: usize| {
        let at = |k: usize| {
            if filter == FilterMode::Linear || k >= count {
                src.row_clamped(y)
            } else {
                src.row_clamped(y + k)
            }
        };
        [at(0), at(1), at(2)]
    };

    for j in 0..dst_height {
        let (y, count) = match j % 3 {
            0 => (j / 3 * 8, 3),
            1 => (j / 3 * 8 + 3, 3),
            _ => (j / 3 * 8 + 6, 2),
        };
        // The last row of a trailing partial group is filtered from a
        // single source row.
        let count = if j + 1 == dst_height && j >= dst_height / 3 * 3 {
            1
        } else {
            count
        };

        let out = dst.row_mut(j);
        if filter == FilterMode::None {
            row::scale_row_down38(src.row_clamped(y), out);
        } else if count == 2 {
            let [a, b, _] = rows(y, 2);
            row::scale_row_down38_box::<2>([a, b], out);
        } else {
            row::scale_row_down38_box::<3>(rows(y, count), out);
        }
    }
}

/// Area average for downscales beyond 2:1 vertically.
fn scale_plane_box<const CH: usize>(src: &Plane<u8>, dst: &mut PlaneMut<u8>) -> Result<(), ErrorKind> {
    let (src_width, src_height) = (src.width() / CH, src.height());
    let Slope { x, mut y, dx, dy } = slope(
        src_width,
        src_height,
        dst.width() / CH,
        dst.height(),
        FilterMode::Box,
    );
    let max_y = (src_height as i64) << 16;
    let mut acc = AlignedBuffer::<u32>::try_new(src_width * CH)?;

    for j in 0..dst.height() {
        let iy = (y >> 16) as usize;
        y = (y + dy).min(max_y);
        let box_height = ((y >> 16) as usize).saturating_sub(iy).max(1);

        acc.fill(0);
        for k in 0..box_height {
            row::scale_add_row(src.row_clamped(iy + k), &mut acc);
        }

        row::scale_add_cols::<CH>(dst.row_mut(j), &acc, x, dx, box_height);
    }

    Ok(())
}

/// 2x horizontal, any vertical ratio, linear filter. Rows are point
/// sampled like the general linear path does.
fn scale_plane_up2_linear<const CH: usize>(src: &Plane<u8>, dst: &mut PlaneMut<u8>) {
    let Slope { mut y, dy, .. } = slope(
        src.width() / CH,
        src.height(),
        dst.width() / CH,
        dst.height(),
        FilterMode::Linear,
    );
    for j in 0..dst.height() {
        row::scale_row_up2_linear::<CH>(src.row_clamped((y >> 16) as usize), dst.row_mut(j));
        y += dy;
    }
}

/// 2x in both directions with 9:3:3:1 weights.
fn scale_plane_up2_bilinear<const CH: usize>(src: &Plane<u8>, dst: &mut PlaneMut<u8>) {
    let (src_height, dst_height) = (src.height(), dst.height());
    let first = src.row(0);
    row::scale_row_up2_bilinear::<CH>(first, first, dst.row_mut(0));

    for y in 0..src_height - 1 {
        let (near, far) = (src.row(y), src.row(y + 1));
        let (upper, lower) = dst.row_pair_mut(1 + 2 * y, 2 + 2 * y);
        row::scale_row_up2_bilinear::<CH>(near, far, upper);
        row::scale_row_up2_bilinear::<CH>(far, near, lower);
    }

    if dst_height % 2 == 0 {
        let last = src.row(src_height - 1);
        row::scale_row_up2_bilinear::<CH>(last, last, dst.row_mut(dst_height - 1));
    }
}

/// Vertical upscale: two horizontally scaled rows are kept and blended.
fn scale_plane_bilinear_up<const CH: usize>(
    kernels: &KernelTable,
    src: &Plane<u8>,
    dst: &mut PlaneMut<u8>,
    filter: FilterMode,
) -> Result<(), ErrorKind> {
    let (src_width, src_height) = (src.width() / CH, src.height());
    let dst_row_size = dst.width();
    let Slope { x, mut y, dx, dy } = slope(
        src_width,
        src_height,
        dst_row_size / CH,
        dst.height(),
        filter,
    );
    let max_y = ((src_height - 1) as i64) << 16;
    let columns = row::scale_filter_cols::<CH>;

    let mut upper = AlignedBuffer::<u8>::try_new(dst_row_size)?;
    let mut lower = AlignedBuffer::<u8>::try_new(dst_row_size)?;
    let mut cached: Option<usize> = None;

    for j in 0..dst.height() {
        let at = y.clamp(0, max_y);
        let yi = (at >> 16) as usize;
        match cached {
            Some(previous) if previous == yi => {}
            Some(previous) if previous + 1 == yi => {
                std::mem::swap(&mut upper, &mut lower);
                columns(&mut lower, src.row_clamped(yi + 1), x, dx);
            }
            _ => {
                columns(&mut upper, src.row(yi), x, dx);
                columns(&mut lower, src.row_clamped(yi + 1), x, dx);
            }
        }
        cached = Some(yi);

        let fraction = if filter == FilterMode::Linear {
            0
        } else {
            ((at >> 8) & 255) as u32
        };
        kernels.interpolate_row(dst.row_mut(j), &upper, &lower, fraction);
        y += dy;
    }

    Ok(())
}

/// Vertical downscale: rows are blended first, then scaled horizontally.
fn scale_plane_bilinear_down<const CH: usize>(
    kernels: &KernelTable,
    src: &Plane<u8>,
    dst: &mut PlaneMut<u8>,
    filter: FilterMode,
) -> Result<(), ErrorKind> {
    let (src_width, src_height) = (src.width() / CH, src.height());
    let Slope { x, mut y, dx, dy } = slope(
        src_width,
        src_height,
        dst.width() / CH,
        dst.height(),
        filter,
    );
    let max_y = ((src_height - 1) as i64) << 16;
    let mut blended = AlignedBuffer::<u8>::try_new(src.width())?;

    for j in 0..dst.height() {
        y = y.min(max_y);
        let yi = (y >> 16) as usize;
        let out = dst.row_mut(j);
        if filter == FilterMode::Linear {
            row::scale_filter_cols::<CH>(out, src.row(yi), x, dx);
        } else {
            let fraction = ((y >> 8) & 255) as u32;
            kernels.interpolate_row(&mut blended, src.row(yi), src.row_clamped(yi + 1), fraction);
            row::scale_filter_cols::<CH>(out, &blended, x, dx);
        }
        y += dy;
    }

    Ok(())
}

/// Point sampling.
fn scale_plane_simple<const CH: usize>(src: &Plane<u8>, dst: &mut PlaneMut<u8>) {
    let (src_width, src_height) = (src.width() / CH, src.height());
    let dst_width = dst.width() / CH;
    let Slope { x, mut y, dx, dy } = slope(
        src_width,
        src_height,
        dst_width,
        dst.height(),
        FilterMode::None,
    );
    let doubling = src_width * 2 == dst_width && x < 0x8000;

    for j in 0..dst.height() {
        let source = src.row_clamped((y >> 16) as usize);
        if doubling {
            row::scale_cols_up2::<CH>(dst.row_mut(j), source);
        } else {
            row::scale_cols::<CH>(dst.row_mut(j), source, x, dx);
        }
        y += dy;
    }
}
