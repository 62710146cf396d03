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
//! Whole-frame conversion: crop, flip, convert to I420 and rotate.
//!
//! Rotated packed input and in-place conversion go through an intermediate
//! I420 image; I420 input is cropped and rotated plane by plane.
use crate::convert::{packed_to_i420, ConvertOptions};
use crate::kernels::KernelTable;
use crate::pixel_format::{half, PixelFormat};
use crate::plane::Plane;
use crate::planar::{I420Buffer, I420Planes, I420PlanesMut};
use crate::rotate::{copy_plane, rotate_plane, RotationMode};
use crate::ErrorKind;

use log::debug;
use std::convert::TryFrom;

/// Region of the source frame to convert, in stored (not flipped) pixel
/// coordinates.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[repr(C)]
pub struct CropRegion {
    /// First column
    pub x: i32,
    /// First row
    pub y: i32,
    /// Columns to convert
    pub width: i32,
    /// Rows to convert
    pub height: i32,
}

impl CropRegion {
    /// The whole frame.
    #[allow(clippy::cast_possible_wrap)]
    pub fn full(width: u32, height: u32) -> Self {
        CropRegion {
            x: 0,
            y: 0,
            width: width as i32,
            height: height as i32,
        }
    }
}

/// A validated source frame and crop.
#[derive(Debug)]
pub(crate) struct FrameGeometry {
    pub format: PixelFormat,
    pub width: usize,
    pub height: usize,
    pub flipped: bool,
    pub crop_x: usize,
    pub crop_y: usize,
    pub crop_width: usize,
    pub crop_height: usize,
}

impl FrameGeometry {
    pub fn new(
        format: PixelFormat,
        width: u32,
        height: i32,
        crop: &CropRegion,
    ) -> Result<Self, ErrorKind> {
        let width = i32::try_from(width).map_err(|_| ErrorKind::InvalidValue)?;
        if width <= 0 || height == 0 {
            return Err(ErrorKind::InvalidValue);
        }

        let rows = height.checked_abs().ok_or(ErrorKind::InvalidValue)?;
        let fits = |offset: i32, extent: i32, limit: i32| {
            offset >= 0 && extent > 0 && offset.checked_add(extent).map_or(false, |end| end <= limit)
        };
        if !fits(crop.x, crop.width, width) || !fits(crop.y, crop.height, rows) {
            return Err(ErrorKind::InvalidValue);
        }

        let to_usize = |v: i32| usize::try_from(v).map_err(|_| ErrorKind::InvalidValue);
        Ok(FrameGeometry {
            format,
            width: to_usize(width)?,
            height: to_usize(rows)?,
            flipped: height < 0,
            crop_x: to_usize(crop.x)?,
            crop_y: to_usize(crop.y)?,
            crop_width: to_usize(crop.width)?,
            crop_height: to_usize(crop.height)?,
        })
    }

    /// Bytes the sample must hold.
    pub fn sample_size(&self) -> usize {
        if self.format.is_planar() {
            self.width * self.height + 2 * half(self.width) * half(self.height)
        } else {
            self.width * self.format.bytes_per_pixel() * self.height
        }
    }

    /// Output dimensions once rotated.
    pub fn output_size(&self, rotation: RotationMode) -> (usize, usize) {
        rotation.rotated_size(self.crop_width, self.crop_height)
    }
}

/// Packed input needs an intermediate image to be rotated. Any input does
/// when the output overwrites it.
pub(crate) fn needs_intermediate(format: PixelFormat, rotation: RotationMode, aliased: bool) -> bool {
    aliased || (!format.is_planar() && rotation != RotationMode::Rotate0)
}

enum Source<'a> {
    Packed(Plane<'a, u8>),
    Planar(I420Planes<'a>),
}

fn source<'a>(sample: &'a [u8], geometry: &FrameGeometry) -> Result<Source<'a>, ErrorKind> {
    let g = geometry;
    if g.format.is_planar() {
        let planes = I420Planes::packed(sample, g.width, g.height)?.crop(
            g.crop_x,
            g.crop_y,
            g.crop_width,
            g.crop_height,
        );
        return Ok(Source::Planar(if g.flipped { planes.flipped() } else { planes }));
    }

    let bpp = g.format.bytes_per_pixel();
    let row_size = g.width * bpp;
    #[allow(clippy::cast_possible_wrap)]
    let plane = Plane::new(sample, row_size as isize, row_size, g.height)?.crop(
        g.crop_x * bpp,
        g.crop_y,
        g.crop_width * bpp,
        g.crop_height,
    );
    Ok(Source::Packed(if g.flipped { plane.flipped() } else { plane }))
}

/// Converts without rotating: `dst` has the crop dimensions.
fn convert_unrotated(
    kernels: &KernelTable,
    source: &Source,
    geometry: &FrameGeometry,
    options: &ConvertOptions,
    dst: &mut I420PlanesMut,
) -> Result<(), ErrorKind> {
    match source {
        Source::Packed(plane) => packed_to_i420(
            kernels,
            geometry.format,
            plane,
            geometry.crop_width,
            options,
            dst,
        ),
        Source::Planar(planes) => {
            copy_plane(&planes.y, &mut dst.y);
            copy_plane(&planes.u, &mut dst.u);
            copy_plane(&planes.v, &mut dst.v);
            Ok(())
        }
    }
}

/// Rotates the three planes of `src` into `dst`.
pub(crate) fn rotate_planes(
    kernels: &KernelTable,
    src: I420Planes,
    dst: I420PlanesMut,
    rotation: RotationMode,
) {
    let [sy, su, sv] = src.into_array();
    let [dy, du, dv] = dst.into_array();
    rotate_plane(sy, dy, rotation, kernels.mirror);
    rotate_plane(su, du, rotation, kernels.mirror);
    rotate_plane(sv, dv, rotation, kernels.mirror);
}

/// Converts the cropped frame into a fresh, unrotated I420 image.
pub(crate) fn convert_to_intermediate(
    kernels: &KernelTable,
    sample: &[u8],
    geometry: &FrameGeometry,
    options: &ConvertOptions,
) -> Result<I420Buffer, ErrorKind> {
    let source = source(sample, geometry)?;
    debug!(
        "converting {} {}x{} through an intermediate image",
        geometry.format, geometry.crop_width, geometry.crop_height
    );

    let mut image = I420Buffer::with_size(geometry.crop_width, geometry.crop_height)?;
    convert_unrotated(kernels, &source, geometry, options, &mut image.views_mut()?)?;
    Ok(image)
}

fn check_output(
    geometry: &FrameGeometry,
    rotation: RotationMode,
    dst: &I420PlanesMut,
) -> Result<(), ErrorKind> {
    if geometry.output_size(rotation) == (dst.width(), dst.height()) {
        Ok(())
    } else {
        Err(ErrorKind::InvalidValue)
    }
}

/// Converts into caller planes that do not overlap the sample.
pub(crate) fn convert_to_i420(
    kernels: &KernelTable,
    sample: &[u8],
    geometry: &FrameGeometry,
    rotation: RotationMode,
    options: &ConvertOptions,
    mut dst: I420PlanesMut,
) -> Result<(), ErrorKind> {
    check_output(geometry, rotation, &dst)?;
    if sample.len() < geometry.sample_size() {
        return Err(ErrorKind::NotEnoughData);
    }

    if needs_intermediate(geometry.format, rotation, false) {
        let image = convert_to_intermediate(kernels, sample, geometry, options)?;
        rotate_planes(kernels, image.views()?, dst, rotation);
        return Ok(());
    }

    match source(sample, geometry)? {
        Source::Planar(planes) => {
            rotate_planes(kernels, planes, dst, rotation);
            Ok(())
        }
        packed => convert_unrotated(kernels, &packed, geometry, options, &mut dst),
    }
}

/// Converts a sample stored at the start of `buffer` into tightly packed
/// I420 written over it.
pub(crate) fn convert_to_i420_in_place(
    kernels: &KernelTable,
    buffer: &mut [u8],
    geometry: &FrameGeometry,
    rotation: RotationMode,
    options: &ConvertOptions,
) -> Result<(), ErrorKind> {
    let (width, height) = geometry.output_size(rotation);
    let output_size = width * height + 2 * half(width) * half(height);
    if buffer.len() < geometry.sample_size().max(output_size) {
        return Err(ErrorKind::NotEnoughData);
    }

    debug_assert!(needs_intermediate(geometry.format, rotation, true));
    let image = convert_to_intermediate(kernels, buffer, geometry, options)?;
    let dst = I420PlanesMut::packed(buffer, width, height)?;
    rotate_planes(kernels, image.views()?, dst, rotation);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intermediate_decision() {
        use RotationMode::{Rotate0, Rotate90};
        assert!(!needs_intermediate(PixelFormat::Argb, Rotate0, false));
        assert!(needs_intermediate(PixelFormat::Argb, Rotate90, false));
        assert!(!needs_intermediate(PixelFormat::I420, Rotate90, false));
        assert!(needs_intermediate(PixelFormat::I420, Rotate0, true));
        assert!(needs_intermediate(PixelFormat::Rgb565, Rotate0, true));
    }

    #[test]
    fn crop_validation() {
        let full = CropRegion::full(8, 6);
        assert!(FrameGeometry::new(PixelFormat::Argb, 8, 6, &full).is_ok());
        assert!(FrameGeometry::new(PixelFormat::Argb, 8, -6, &full).is_ok());

        for crop in &[
            CropRegion { x: 1, ..full },
            CropRegion { y: -1, height: 2, ..full },
            CropRegion { width: 0, ..full },
            CropRegion { height: -6, ..full },
            CropRegion { x: i32::MAX, width: 1, ..full },
        ] {
            assert_eq!(
                FrameGeometry::new(PixelFormat::Argb, 8, 6, crop).err(),
                Some(ErrorKind::InvalidValue),
                "{:?}",
                crop
            );
        }

        assert!(FrameGeometry::new(PixelFormat::Argb, 0, 6, &full).is_err());
        assert!(FrameGeometry::new(PixelFormat::Argb, 8, 0, &full).is_err());
    }

    #[test]
    fn sample_sizes() {
        let crop = CropRegion::full(5, 3);
        let g = FrameGeometry::new(PixelFormat::Rgb24, 5, 3, &crop).unwrap();
        assert_eq!(g.sample_size(), 45);
        let g = FrameGeometry::new(PixelFormat::I420, 5, 3, &crop).unwrap();
        assert_eq!(g.sample_size(), 15 + 2 * 6);
        assert_eq!(g.output_size(RotationMode::Rotate270), (3, 5));
    }
}
