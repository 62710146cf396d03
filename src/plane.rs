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
//! Strided views over caller owned planes.
//!
//! A plane is described by its samples, a signed stride (in samples), a width
//! and a height. A negative stride stores rows bottom-up: the slice begins
//! with the last row and the first row sits at `(height - 1) * |stride|`.
use crate::ErrorKind;

/// Validates a plane geometry against the length of its storage and returns
/// the index of the first sample of row zero.
fn locate(len: usize, stride: isize, width: usize, height: usize) -> Result<usize, ErrorKind> {
    if width == 0 || height == 0 {
        return Ok(0);
    }

    let pitch = stride.unsigned_abs();
    if height > 1 && pitch < width {
        return Err(ErrorKind::InvalidValue);
    }

    let last_row = pitch
        .checked_mul(height - 1)
        .ok_or(ErrorKind::InvalidValue)?;
    let required = last_row.checked_add(width).ok_or(ErrorKind::InvalidValue)?;
    if len < required {
        return Err(ErrorKind::NotEnoughData);
    }

    Ok(if stride < 0 { last_row } else { 0 })
}

#[inline(always)]
fn row_start(origin: usize, stride: isize, y: usize) -> usize {
    let offset = stride.unsigned_abs() * y;
    if stride < 0 {
        origin - offset
    } else {
        origin + offset
    }
}

/// Read-only strided plane.
#[derive(Clone, Copy)]
pub(crate) struct Plane<'a, T> {
    data: &'a [T],
    origin: usize,
    stride: isize,
    width: usize,
    height: usize,
}

impl<'a, T> Plane<'a, T> {
    pub fn new(data: &'a [T], stride: isize, width: usize, height: usize) -> Result<Self, ErrorKind> {
        let origin = locate(data.len(), stride, width, height)?;
        Ok(Plane {
            data,
            origin,
            stride,
            width,
            height,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline(always)]
    pub fn row(&self, y: usize) -> &'a [T] {
        let start = row_start(self.origin, self.stride, y);
        &self.data[start..start + self.width]
    }

    /// Row `y`, clamped to the last row.
    #[inline(always)]
    pub fn row_clamped(&self, y: usize) -> &'a [T] {
        self.row(y.min(self.height - 1))
    }

    /// Same samples, rows visited bottom-up.
    pub fn flipped(self) -> Self {
        if self.height == 0 {
            return self;
        }

        Plane {
            origin: row_start(self.origin, self.stride, self.height - 1),
            stride: -self.stride,
            ..self
        }
    }

    /// Sub-rectangle; the caller guarantees it lies inside the plane.
    pub fn crop(self, x: usize, y: usize, width: usize, height: usize) -> Self {
        debug_assert!(x + width <= self.width && y + height <= self.height);
        Plane {
            origin: row_start(self.origin, self.stride, y) + x,
            width,
            height,
            ..self
        }
    }

    /// Reinterprets the width, keeping storage and stride. The caller
    /// guarantees every row still fits.
    pub fn with_width(self, width: usize) -> Self {
        Plane { width, ..self }
    }
}

/// Writable strided plane.
pub(crate) struct PlaneMut<'a, T> {
    data: &'a mut [T],
    origin: usize,
    stride: isize,
    width: usize,
    height: usize,
}

impl<'a, T> PlaneMut<'a, T> {
    pub fn new(
        data: &'a mut [T],
        stride: isize,
        width: usize,
        height: usize,
    ) -> Result<Self, ErrorKind> {
        let origin = locate(data.len(), stride, width, height)?;
        Ok(PlaneMut {
            data,
            origin,
            stride,
            width,
            height,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline(always)]
    pub fn row_mut(&mut self, y: usize) -> &mut [T] {
        let start = row_start(self.origin, self.stride, y);
        &mut self.data[start..start + self.width]
    }

    /// Two distinct rows at once.
    pub fn row_pair_mut(&mut self, y0: usize, y1: usize) -> (&mut [T], &mut [T]) {
        debug_assert_ne!(y0, y1);
        let width = self.width;
        let a = row_start(self.origin, self.stride, y0);
        let b = row_start(self.origin, self.stride, y1);
        if a < b {
            let (lo, hi) = self.data.split_at_mut(b);
            (&mut lo[a..a + width], &mut hi[..width])
        } else {
            let (lo, hi) = self.data.split_at_mut(a);
            (&mut hi[..width], &mut lo[b..b + width])
        }
    }

    pub fn reborrow(&mut self) -> PlaneMut<'_, T> {
        PlaneMut {
            data: &mut *self.data,
            origin: self.origin,
            stride: self.stride,
            width: self.width,
            height: self.height,
        }
    }

    pub fn as_plane(&self) -> Plane<'_, T> {
        Plane {
            data: &*self.data,
            origin: self.origin,
            stride: self.stride,
            width: self.width,
            height: self.height,
        }
    }

    /// Same samples, rows visited bottom-up.
    pub fn flipped(self) -> Self {
        if self.height == 0 {
            return self;
        }

        PlaneMut {
            origin: row_start(self.origin, self.stride, self.height - 1),
            stride: -self.stride,
            ..self
        }
    }
}
