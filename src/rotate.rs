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
use crate::plane::{Plane, PlaneMut};
use std::convert::TryFrom;

/// Rotation applied clockwise to an image.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(C)]
pub enum RotationMode {
    /// No rotation
    Rotate0 = 0,
    /// Rotate 90 degrees clockwise
    Rotate90 = 90,
    /// Rotate 180 degrees
    Rotate180 = 180,
    /// Rotate 270 degrees clockwise
    Rotate270 = 270,
}

impl RotationMode {
    /// Maps an angle in degrees to a rotation mode, only right angles are
    /// accepted.
    pub fn from_degrees(degrees: i32) -> Option<RotationMode> {
        match degrees {
            0 => Some(RotationMode::Rotate0),
            90 => Some(RotationMode::Rotate90),
            180 => Some(RotationMode::Rotate180),
            270 => Some(RotationMode::Rotate270),
            _ => None,
        }
    }

    /// Returns `true` when the output has width and height exchanged.
    pub fn swaps_dimensions(self) -> bool {
        matches!(self, RotationMode::Rotate90 | RotationMode::Rotate270)
    }

    /// Output dimensions for an input of the given size.
    pub fn rotated_size(self, width: usize, height: usize) -> (usize, usize) {
        if self.swaps_dimensions() {
            (height, width)
        } else {
            (width, height)
        }
    }
}

impl Default for RotationMode {
    fn default() -> Self {
        RotationMode::Rotate0
    }
}

impl TryFrom<i32> for RotationMode {
    type Error = ();

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        RotationMode::from_degrees(value).ok_or(())
    }
}

const BAND_HEIGHT: usize = 8;

pub(crate) fn copy_plane<T: Copy>(src: &Plane<T>, dst: &mut PlaneMut<T>) {
    for y in 0..src.height() {
        dst.row_mut(y).copy_from_slice(src.row(y));
    }
}

pub(crate) fn mirror_plane<T: Copy>(
    src: &Plane<T>,
    dst: &mut PlaneMut<T>,
    mirror_row: fn(&[T], &mut [T]),
) {
    for y in 0..src.height() {
        mirror_row(src.row(y), dst.row_mut(y));
    }
}

/// Eight source rows become eight columns of the destination.
fn transpose_wx8<T: Copy>(src: &Plane<T>, dst: &mut PlaneMut<T>, y0: usize) {
    let rows: [&[T]; BAND_HEIGHT] = core::array::from_fn(|i| src.row(y0 + i));
    for x in 0..src.width() {
        let column = &mut dst.row_mut(x)[y0..y0 + BAND_HEIGHT];
        for (sample, row) in column.iter_mut().zip(rows.iter()) {
            *sample = row[x];
        }
    }
}

/// Remaining rows when the height is not a multiple of the band height.
fn transpose_wxh<T: Copy>(src: &Plane<T>, dst: &mut PlaneMut<T>, y0: usize) {
    for y in y0..src.height() {
        for (x, &sample) in src.row(y).iter().enumerate() {
            dst.row_mut(x)[y] = sample;
        }
    }
}

/// `dst[x][y] = src[y][x]`; `dst` is `src.height()` wide and `src.width()` high.
pub(crate) fn transpose_plane<T: Copy>(src: &Plane<T>, dst: &mut PlaneMut<T>) {
    let mut y = 0;
    while y + BAND_HEIGHT <= src.height() {
        transpose_wx8(src, dst, y);
        y += BAND_HEIGHT;
    }

    if y < src.height() {
        transpose_wxh(src, dst, y);
    }
}

pub(crate) fn rotate_plane_90<T: Copy>(src: Plane<T>, dst: &mut PlaneMut<T>) {
    transpose_plane(&src.flipped(), dst);
}

pub(crate) fn rotate_plane_270<T: Copy>(src: Plane<T>, dst: PlaneMut<T>) {
    transpose_plane(&src, &mut dst.flipped());
}

/// Top and bottom rows are exchanged pairwise, each one mirrored. With an
/// odd height the middle row is mirrored onto itself.
pub(crate) fn rotate_plane_180<T: Copy>(
    src: &Plane<T>,
    dst: &mut PlaneMut<T>,
    mirror_row: fn(&[T], &mut [T]),
) {
    let height = src.height();
    for top in 0..(height + 1) / 2 {
        let bottom = height - 1 - top;
        mirror_row(src.row(bottom), dst.row_mut(top));
        mirror_row(src.row(top), dst.row_mut(bottom));
    }
}

/// Rotates `src` into `dst`, whose dimensions already account for the
/// rotation.
pub(crate) fn rotate_plane<T: Copy>(
    src: Plane<T>,
    mut dst: PlaneMut<T>,
    mode: RotationMode,
    mirror_row: fn(&[T], &mut [T]),
) {
    debug_assert_eq!(
        mode.rotated_size(src.width(), src.height()),
        (dst.width(), dst.height())
    );

    match mode {
        RotationMode::Rotate0 => copy_plane(&src, &mut dst),
        RotationMode::Rotate90 => rotate_plane_90(src, &mut dst),
        RotationMode::Rotate180 => rotate_plane_180(&src, &mut dst, mirror_row),
        RotationMode::Rotate270 => rotate_plane_270(src, dst),
    }
}
