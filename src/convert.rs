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
//! Packed RGB to I420.
//!
//! Rows are consumed in pairs: each pair yields one row of U and V and two
//! rows of Y. A trailing odd row is paired with itself for chroma.
use crate::color_space::{ChromaSiting, ColorSpace};
use crate::kernels::{ChromaRow, KernelTable, LumaRow};
use crate::pixel_format::PixelFormat;
use crate::plane::Plane;
use crate::planar::I420PlanesMut;
use crate::scratch::AlignedBuffer;
use crate::ErrorKind;

use log::trace;

/// How RGB samples are turned into I420.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[repr(C)]
pub struct ConvertOptions {
    /// Color model and range of the output
    pub color_space: ColorSpace,
    /// Which pixels of each 2x2 block feed its chroma sample
    pub chroma_siting: ChromaSiting,
}

/// Converts `width` x `src.height()` pixels of `format` into `dst`.
///
/// The source plane is addressed in bytes and may be flipped or cropped.
/// RGB565 is expanded row by row into aligned scratch storage first.
pub(crate) fn packed_to_i420(
    kernels: &KernelTable,
    format: PixelFormat,
    src: &Plane<u8>,
    width: usize,
    options: &ConvertOptions,
    dst: &mut I420PlanesMut,
) -> Result<(), ErrorKind> {
    let top_left = options.chroma_siting == ChromaSiting::TopLeft;
    trace!(
        "{} {}x{} to i420 ({}, top left chroma: {})",
        format,
        width,
        src.height(),
        options.color_space,
        top_left
    );

    if format == PixelFormat::Rgb565 {
        let rows = kernels
            .rgb_rows(PixelFormat::Argb, top_left)
            .ok_or(ErrorKind::InvalidOperation)?;
        return rgb565_to_i420(kernels, rows, src, width, options.color_space, dst);
    }

    let (luma, chroma) = kernels
        .rgb_rows(format, top_left)
        .ok_or(ErrorKind::InvalidOperation)?;
    let profile = options.color_space.profile();
    let height = src.height();

    let mut y = 0;
    while y + 1 < height {
        let (row0, row1) = (src.row(y), src.row(y + 1));
        chroma(row0, row1, dst.u.row_mut(y / 2), dst.v.row_mut(y / 2), width, profile);
        luma(row0, dst.y.row_mut(y), width, profile);
        luma(row1, dst.y.row_mut(y + 1), width, profile);
        y += 2;
    }

    if y < height {
        let row = src.row(y);
        chroma(row, row, dst.u.row_mut(y / 2), dst.v.row_mut(y / 2), width, profile);
        luma(row, dst.y.row_mut(y), width, profile);
    }

    Ok(())
}

fn rgb565_to_i420(
    kernels: &KernelTable,
    (luma, chroma): (LumaRow, ChromaRow),
    src: &Plane<u8>,
    width: usize,
    color_space: ColorSpace,
    dst: &mut I420PlanesMut,
) -> Result<(), ErrorKind> {
    let profile = color_space.profile();
    let unpack = kernels.rgb565_to_argb;
    let height = src.height();

    // Two expanded rows, each starting on a 32-byte boundary.
    let row_size = (4 * width + 31) & !31;
    let mut scratch = AlignedBuffer::<u8>::try_new(2 * row_size)?;
    let (argb0, argb1) = scratch.split_at_mut(row_size);

    let mut y = 0;
    while y + 1 < height {
        unpack(src.row(y), argb0, width);
        unpack(src.row(y + 1), argb1, width);
        chroma(argb0, argb1, dst.u.row_mut(y / 2), dst.v.row_mut(y / 2), width, profile);
        luma(argb0, dst.y.row_mut(y), width, profile);
        luma(argb1, dst.y.row_mut(y + 1), width, profile);
        y += 2;
    }

    if y < height {
        unpack(src.row(y), argb0, width);
        chroma(argb0, argb0, dst.u.row_mut(y / 2), dst.v.row_mut(y / 2), width, profile);
        luma(argb0, dst.y.row_mut(y), width, profile);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel_format::half;

    fn convert(format: PixelFormat, pixels: &[u8], width: usize, height: usize) -> Vec<u8> {
        let kernels = KernelTable::generic();
        let bpp = format.bytes_per_pixel();
        let src = Plane::new(pixels, (width * bpp) as isize, width * bpp, height).unwrap();
        let (cw, ch) = (half(width), half(height));
        let mut out = vec![0_u8; width * height + 2 * cw * ch];
        let mut dst = I420PlanesMut::packed(&mut out, width, height).unwrap();
        packed_to_i420(&kernels, format, &src, width, &ConvertOptions::default(), &mut dst).unwrap();
        out
    }

    #[test]
    fn rgb565_matches_expanded_argb() {
        let (width, height) = (5, 3);
        let rgb565: Vec<u8> = (0..width * height * 2).map(|i| (i * 73 % 256) as u8).collect();
        let mut argb = vec![0_u8; width * height * 4];
        crate::kernels::generic::rgb565_to_argb_row(&rgb565, &mut argb, width * height);

        assert_eq!(
            convert(PixelFormat::Rgb565, &rgb565, width, height),
            convert(PixelFormat::Argb, &argb, width, height)
        );
    }

    #[test]
    fn odd_last_row_pairs_with_itself() {
        // A single row is its own vertical neighbour.
        let white = [255_u8; 2 * 3];
        let out = convert(PixelFormat::Raw, &white, 2, 1);
        assert_eq!(out, vec![235, 235, 128, 128]);
    }

    #[test]
    fn planar_source_is_rejected() {
        let kernels = KernelTable::generic();
        let pixels = [0_u8; 6];
        let src = Plane::new(&pixels[..], 2, 2, 3).unwrap();
        let mut out = vec![0_u8; 6];
        let mut dst = I420PlanesMut::packed(&mut out, 2, 2).unwrap();
        assert_eq!(
            packed_to_i420(&kernels, PixelFormat::I420, &src, 2, &ConvertOptions::default(), &mut dst),
            Err(ErrorKind::InvalidOperation)
        );
    }
}
