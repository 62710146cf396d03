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
//! Three-plane 4:2:0 images: borrowed views over caller buffers and an
//! owned, aligned image used as conversion scratch.
use crate::pixel_format::{half, resolve_stride, I420_PLANES};
use crate::plane::{Plane, PlaneMut};
use crate::scratch::AlignedBuffer;
use crate::ErrorKind;

use std::convert::TryFrom;

fn plane_extents(width: usize, height: usize) -> [(usize, usize); I420_PLANES] {
    let chroma = (half(width), half(height));
    [(width, height), chroma, chroma]
}

/// Read-only Y, U and V planes.
#[derive(Clone, Copy)]
pub(crate) struct I420Planes<'a> {
    pub y: Plane<'a, u8>,
    pub u: Plane<'a, u8>,
    pub v: Plane<'a, u8>,
}

impl<'a> I420Planes<'a> {
    pub fn new(
        width: usize,
        height: usize,
        strides: &[i32],
        buffers: &[&'a [u8]],
    ) -> Result<Self, ErrorKind> {
        if strides.len() < I420_PLANES || buffers.len() < I420_PLANES {
            return Err(ErrorKind::InvalidValue);
        }

        let [luma, chroma, _] = plane_extents(width, height);
        let plane = |i: usize, (w, h): (usize, usize)| {
            Plane::new(buffers[i], resolve_stride(strides[i], w), w, h)
        };

        Ok(I420Planes {
            y: plane(0, luma)?,
            u: plane(1, chroma)?,
            v: plane(2, chroma)?,
        })
    }

    /// Planes stored back to back, Y first, each one tightly packed.
    pub fn packed(data: &'a [u8], width: usize, height: usize) -> Result<Self, ErrorKind> {
        let [luma, chroma, _] = plane_extents(width, height);
        let luma_size = luma.0 * luma.1;
        let chroma_size = chroma.0 * chroma.1;
        if data.len() < luma_size + 2 * chroma_size {
            return Err(ErrorKind::NotEnoughData);
        }

        let (y, rest) = data.split_at(luma_size);
        let (u, v) = rest.split_at(chroma_size);
        Self::new(width, height, &[0; I420_PLANES], &[y, u, v])
    }

    pub fn width(&self) -> usize {
        self.y.width()
    }

    pub fn height(&self) -> usize {
        self.y.height()
    }

    pub fn flipped(self) -> Self {
        I420Planes {
            y: self.y.flipped(),
            u: self.u.flipped(),
            v: self.v.flipped(),
        }
    }

    /// Chroma is cropped from the 2x2 block containing `(x, y)`.
    pub fn crop(self, x: usize, y: usize, width: usize, height: usize) -> Self {
        I420Planes {
            y: self.y.crop(x, y, width, height),
            u: self.u.crop(x / 2, y / 2, half(width), half(height)),
            v: self.v.crop(x / 2, y / 2, half(width), half(height)),
        }
    }

    pub fn into_array(self) -> [Plane<'a, u8>; I420_PLANES] {
        [self.y, self.u, self.v]
    }
}

/// Writable Y, U and V planes.
pub(crate) struct I420PlanesMut<'a> {
    pub y: PlaneMut<'a, u8>,
    pub u: PlaneMut<'a, u8>,
    pub v: PlaneMut<'a, u8>,
}

impl<'a> I420PlanesMut<'a> {
    pub fn new(
        width: usize,
        height: usize,
        strides: &[i32],
        buffers: &'a mut [&mut [u8]],
    ) -> Result<Self, ErrorKind> {
        if strides.len() < I420_PLANES {
            return Err(ErrorKind::InvalidValue);
        }

        let [luma, chroma, _] = plane_extents(width, height);
        match buffers {
            [y, u, v, ..] => Ok(I420PlanesMut {
                y: PlaneMut::new(y, resolve_stride(strides[0], luma.0), luma.0, luma.1)?,
                u: PlaneMut::new(u, resolve_stride(strides[1], chroma.0), chroma.0, chroma.1)?,
                v: PlaneMut::new(v, resolve_stride(strides[2], chroma.0), chroma.0, chroma.1)?,
            }),
            _ => Err(ErrorKind::InvalidValue),
        }
    }

    /// Planes stored back to back, Y first, each one tightly packed.
    pub fn packed(data: &'a mut [u8], width: usize, height: usize) -> Result<Self, ErrorKind> {
        let [luma, chroma, _] = plane_extents(width, height);
        let luma_size = luma.0 * luma.1;
        let chroma_size = chroma.0 * chroma.1;
        if data.len() < luma_size + 2 * chroma_size {
            return Err(ErrorKind::NotEnoughData);
        }

        let (y, rest) = data.split_at_mut(luma_size);
        let (u, v) = rest.split_at_mut(chroma_size);
        #[allow(clippy::cast_possible_wrap)]
        Ok(I420PlanesMut {
            y: PlaneMut::new(y, luma.0 as isize, luma.0, luma.1)?,
            u: PlaneMut::new(u, chroma.0 as isize, chroma.0, chroma.1)?,
            v: PlaneMut::new(v, chroma.0 as isize, chroma.0, chroma.1)?,
        })
    }

    pub fn width(&self) -> usize {
        self.y.width()
    }

    pub fn height(&self) -> usize {
        self.y.height()
    }

    pub fn into_array(self) -> [PlaneMut<'a, u8>; I420_PLANES] {
        [self.y, self.u, self.v]
    }
}

/// An owned I420 image with tightly packed, 64-byte aligned planes.
///
/// # Examples
/// ```
/// use capture_color_primitives::I420Buffer;
/// let image = I420Buffer::new(5, 3).unwrap();
/// assert_eq!(image.strides(), [5, 3, 3]);
/// let [y, u, v] = image.planes();
/// assert_eq!((y.len(), u.len(), v.len()), (15, 6, 6));
/// ```
pub struct I420Buffer {
    width: usize,
    height: usize,
    data: AlignedBuffer<u8>,
}

impl I420Buffer {
    /// Allocates a zeroed image.
    ///
    /// # Errors
    ///
    /// * [`InvalidValue`] if either dimension is zero or does not fit an `i32`
    /// * [`OutOfMemory`] if the allocation fails
    ///
    /// [`InvalidValue`]: ./enum.ErrorKind.html#variant.InvalidValue
    /// [`OutOfMemory`]: ./enum.ErrorKind.html#variant.OutOfMemory
    pub fn new(width: u32, height: u32) -> Result<Self, ErrorKind> {
        if width == 0 || height == 0 || i32::try_from(width).is_err() || i32::try_from(height).is_err() {
            return Err(ErrorKind::InvalidValue);
        }

        Self::with_size(width as usize, height as usize)
    }

    pub(crate) fn with_size(width: usize, height: usize) -> Result<Self, ErrorKind> {
        let [luma, chroma, _] = plane_extents(width, height);
        let size = luma
            .0
            .checked_mul(luma.1)
            .and_then(|l| chroma.0.checked_mul(chroma.1)?.checked_mul(2)?.checked_add(l))
            .ok_or(ErrorKind::InvalidValue)?;

        Ok(I420Buffer {
            width,
            height,
            data: AlignedBuffer::try_new(size)?,
        })
    }

    /// Width in pixels.
    #[allow(clippy::cast_possible_truncation)]
    pub fn width(&self) -> u32 {
        self.width as u32
    }

    /// Height in pixels.
    #[allow(clippy::cast_possible_truncation)]
    pub fn height(&self) -> u32 {
        self.height as u32
    }

    /// Row strides of the Y, U and V planes.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn strides(&self) -> [i32; I420_PLANES] {
        let chroma = half(self.width) as i32;
        [self.width as i32, chroma, chroma]
    }

    fn sizes(&self) -> (usize, usize) {
        (self.width * self.height, half(self.width) * half(self.height))
    }

    /// Y, U and V samples.
    pub fn planes(&self) -> [&[u8]; I420_PLANES] {
        let (luma, chroma) = self.sizes();
        let (y, rest) = self.data.split_at(luma);
        let (u, v) = rest.split_at(chroma);
        [y, u, v]
    }

    /// Mutable Y, U and V samples.
    pub fn planes_mut(&mut self) -> [&mut [u8]; I420_PLANES] {
        let (luma, chroma) = self.sizes();
        let (y, rest) = self.data.split_at_mut(luma);
        let (u, v) = rest.split_at_mut(chroma);
        [y, u, v]
    }

    /// The three planes back to back.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn views(&self) -> Result<I420Planes<'_>, ErrorKind> {
        I420Planes::packed(&self.data, self.width, self.height)
    }

    pub(crate) fn views_mut(&mut self) -> Result<I420PlanesMut<'_>, ErrorKind> {
        I420PlanesMut::packed(&mut self.data, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn odd_sizes_round_chroma_up() {
        let mut image = I420Buffer::with_size(7, 5).unwrap();
        assert_eq!(image.as_bytes().len(), 35 + 2 * 12);
        let views = image.views_mut().unwrap();
        assert_eq!((views.u.width(), views.u.height()), (4, 3));
    }

    #[test]
    fn chroma_crop_follows_luma_blocks() {
        let data: Vec<u8> = (0..(8 * 4 + 2 * 4 * 2) as u8).collect();
        let planes = I420Planes::packed(&data, 8, 4).unwrap();
        let cropped = planes.crop(3, 1, 4, 2);
        assert_eq!(cropped.y.row(0), &[11, 12, 13, 14]);
        assert_eq!(cropped.u.row(0), &[33, 34]);
        assert_eq!(cropped.v.row(0), &[41, 42]);
    }

    #[test]
    fn missing_planes() {
        let a = [0_u8; 16];
        assert_eq!(
            I420Planes::new(4, 4, &[0; 3], &[&a[..], &a[..]]).err(),
            Some(ErrorKind::InvalidValue)
        );
        let mut b = [0_u8; 3];
        let mut c = [0_u8; 4];
        let mut d = [0_u8; 4];
        let mut buffers = [&mut b[..], &mut c[..], &mut d[..]];
        assert_eq!(
            I420PlanesMut::new(4, 4, &[0; 3], &mut buffers).err(),
            Some(ErrorKind::NotEnoughData)
        );
    }
}
