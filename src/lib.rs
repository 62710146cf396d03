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
#![warn(missing_docs)]
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]
#![deny(unstable_features)]
#![deny(unused_import_braces)]
#![deny(
    clippy::complexity,
    clippy::correctness,
    clippy::perf,
    clippy::style,
    clippy::pedantic
)]
#![allow(
    clippy::too_many_arguments, // API design
    clippy::missing_safety_doc, // Until we add them...
    clippy::similar_names, // This requires effort to ensure
    // Row kernels are tiny and called once per row
    clippy::inline_always,
    // Yield false positives
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
)]

//! Capture color primitives converts captured frames to I420 and provides
//! the plane operations a video capture pipeline needs around it.
//!
//! It is able to convert the following pixel formats to I420:
//!
//! | Source pixel format | FourCC | Bytes per pixel | Memory order |
//! | ------------------- | ------ | --------------- | ------------ |
//! | ARGB                | `ARGB` | 4               | B, G, R, A   |
//! | BGRA                | `BGRA` | 4               | A, R, G, B   |
//! | ABGR                | `ABGR` | 4               | R, G, B, A   |
//! | RGBA                | `RGBA` | 4               | A, B, G, R   |
//! | RGB24               | `24BG` | 3               | B, G, R      |
//! | RAW                 | `raw ` | 3               | R, G, B      |
//! | RGB565              | `RGBP` | 2               | little endian `rrrrrggggggbbbbb` |
//!
//! The supported color models are:
//! * ycbcr, ITU-R Recommendation BT.601 (standard video system)
//! * ycbcr, ITU-R Recommendation BT.709 (CSC systems)
//! * ycbcr, ITU-R Recommendation BT.2020 (UHDTV)
//!
//! Both standard range (16-235) and full range (0-255) are supported.
//!
//! I420 planes can then be copied, mirrored, rotated by right angles and
//! scaled with point, linear, bilinear or box filtering.
//!
//! Plane strides are signed and count samples. A negative stride describes
//! a plane stored bottom-up, in which case the slice starts with the last
//! row. A negative height on a source asks for a vertical flip.
//!
//! # Examples
//!
//! Convert a 640x480 BGRA capture to I420 using BT.709:
//! ```
//! use capture_color_primitives as ccp;
//! use ccp::{packed_to_i420, ColorSpace, ConvertOptions, PixelFormat};
//! use std::error;
//!
//! fn convert() -> Result<(), Box<dyn error::Error>> {
//!     const WIDTH: u32 = 640;
//!     const HEIGHT: u32 = 480;
//!
//!     let src = vec![0u8; 4 * (WIDTH as usize) * (HEIGHT as usize)];
//!     let mut y = vec![0u8; (WIDTH as usize) * (HEIGHT as usize)];
//!     let mut u = vec![0u8; (WIDTH as usize) * (HEIGHT as usize) / 4];
//!     let mut v = vec![0u8; (WIDTH as usize) * (HEIGHT as usize) / 4];
//!
//!     let options = ConvertOptions {
//!         color_space: ColorSpace::Bt709,
//!         ..ConvertOptions::default()
//!     };
//!
//!     packed_to_i420(
//!         WIDTH,
//!         HEIGHT as i32,
//!         PixelFormat::Bgra,
//!         ccp::STRIDE_AUTO,
//!         &src,
//!         &options,
//!         None,
//!         &mut [&mut y[..], &mut u[..], &mut v[..]],
//!     )?;
//!
//!     Ok(())
//! }
//! # convert().unwrap();
//! ```
//!
//! Crop and rotate a bottom-up RGB24 frame while converting it:
//! ```
//! use capture_color_primitives as ccp;
//! use ccp::{convert_to_i420, ConvertOptions, CropRegion, I420Buffer, PixelFormat, RotationMode};
//! use std::error;
//!
//! fn capture() -> Result<I420Buffer, Box<dyn error::Error>> {
//!     let frame = vec![0u8; 3 * 320 * 240];
//!     let crop = CropRegion { x: 16, y: 8, width: 288, height: 224 };
//!
//!     // Rotated by 90 degrees the output is 224x288
//!     let mut image = I420Buffer::new(224, 288)?;
//!     let strides = image.strides();
//!     convert_to_i420(
//!         &frame,
//!         PixelFormat::Rgb24,
//!         320,
//!         -240,
//!         &crop,
//!         RotationMode::Rotate90,
//!         &ConvertOptions::default(),
//!         Some(&strides),
//!         &mut image.planes_mut(),
//!     )?;
//!
//!     Ok(image)
//! }
//! # capture().unwrap();
//! ```
//!
//! Handle errors:
//! ```
//! use capture_color_primitives as ccp;
//! use ccp::{i420_scale, ErrorKind, FilterMode};
//!
//! let y = [0u8; 16];
//! let uv = [0u8; 4];
//! let mut out = [0u8; 4];
//! let status = i420_scale(
//!     4,
//!     4,
//!     None,
//!     &[&y[..], &uv[..]],
//!     2,
//!     2,
//!     None,
//!     &mut [&mut out[..]],
//!     FilterMode::Box,
//! );
//!
//! // A plane is missing
//! assert_eq!(status, Err(ErrorKind::InvalidValue));
//! assert_eq!(ErrorKind::InvalidValue.status(), -1);
//! ```
mod color_space;
mod convert;
mod cpu_info;
mod dispatcher;
mod frame;
mod kernels;
mod pixel_format;
mod planar;
mod plane;
mod rotate;
mod scale;
mod scratch;

use dispatcher::Context;
use frame::FrameGeometry;
use pixel_format::{resolve_stride, DEFAULT_STRIDES, I420_PLANES};
use planar::{I420Planes, I420PlanesMut};
use plane::{Plane, PlaneMut};
use std::convert::TryFrom;
use std::error;
use std::fmt;

pub use color_space::{ChromaSiting, ColorSpace};
pub use convert::ConvertOptions;
pub use frame::CropRegion;
pub use pixel_format::{fourcc, PixelFormat, STRIDE_AUTO};
pub use planar::I420Buffer;
pub use rotate::RotationMode;
pub use scale::FilterMode;

/// Largest width or height accepted by the scaling functions.
pub const MAX_SCALE_DIMENSION: u32 = 32768;

/// An enumeration of errors.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(C)]
pub enum ErrorKind {
    /// One or more parameters have invalid values for the called function
    InvalidValue,
    /// The combination of parameters is unsupported for the called function
    InvalidOperation,
    /// Not enough data was provided to the called function. Typically, provided
    /// arrays are not correctly sized
    NotEnoughData,
    /// A temporary buffer could not be allocated
    OutOfMemory,
}

impl ErrorKind {
    /// Integer status reported through the C interface: `-1` for invalid
    /// arguments and unsupported operations, `1` for allocation failures.
    /// Success is `0`.
    pub fn status(self) -> i32 {
        match self {
            ErrorKind::InvalidValue | ErrorKind::InvalidOperation | ErrorKind::NotEnoughData => -1,
            ErrorKind::OutOfMemory => 1,
        }
    }
}

#[cfg(not(tarpaulin_include))]
impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ErrorKind::InvalidValue => write!(
                f,
                "One or more parameters have not legal values for the command"
            ),
            ErrorKind::InvalidOperation => write!(
                f,
                "The combination of parameters is not legal for the command"
            ),
            ErrorKind::NotEnoughData => write!(f, "Not enough data provided"),
            ErrorKind::OutOfMemory => write!(f, "Unable to allocate a temporary buffer"),
        }
    }
}

#[cfg(not(tarpaulin_include))]
impl error::Error for ErrorKind {
    fn cause(&self) -> Option<&dyn error::Error> {
        None
    }
}

/// Returns a description of the algorithms that are best for the running cpu and
/// available instruction sets
///
/// # Examples
/// ```
/// use capture_color_primitives as ccp;
/// println!("{}", ccp::describe_acceleration());
/// // => {cpu-manufacturer:Intel,instruction-set:Sse2}
/// ```
pub fn describe_acceleration() -> String {
    let state = Context::global();

    format!(
        "{{cpu-manufacturer:{:?},instruction-set:{:?}}}",
        state.manufacturer, state.set
    )
}

/// Validates a plane width and a signed height.
///
/// Returns the absolute dimensions and whether the source is flipped.
fn dimensions(width: u32, height: i32) -> Result<(usize, usize, bool), ErrorKind> {
    if width == 0 || height == 0 || i32::try_from(width).is_err() {
        return Err(ErrorKind::InvalidValue);
    }

    let rows = height.checked_abs().ok_or(ErrorKind::InvalidValue)?;
    Ok((width as usize, rows as usize, height < 0))
}

fn unsigned_dimensions(width: u32, height: u32) -> Result<(usize, usize), ErrorKind> {
    let height = i32::try_from(height).map_err(|_| ErrorKind::InvalidValue)?;
    let (width, height, _) = dimensions(width, height)?;
    Ok((width, height))
}

fn source_plane<T>(
    data: &[T],
    stride: i32,
    width: usize,
    height: usize,
    flipped: bool,
) -> Result<Plane<'_, T>, ErrorKind> {
    let plane = Plane::new(data, resolve_stride(stride, width), width, height)?;
    Ok(if flipped { plane.flipped() } else { plane })
}

fn destination_plane<T>(
    data: &mut [T],
    stride: i32,
    width: usize,
    height: usize,
) -> Result<PlaneMut<'_, T>, ErrorKind> {
    PlaneMut::new(data, resolve_stride(stride, width), width, height)
}

fn source_planes<'a>(
    width: usize,
    height: usize,
    flipped: bool,
    strides: Option<&[i32]>,
    buffers: &[&'a [u8]],
) -> Result<I420Planes<'a>, ErrorKind> {
    let planes = I420Planes::new(width, height, strides.unwrap_or(&DEFAULT_STRIDES), buffers)?;
    Ok(if flipped { planes.flipped() } else { planes })
}

/// Compute number of bytes required to store an I420 image given its
/// dimensions and optionally its strides
///
/// # Arguments
/// * `width` - Width of the image in pixels
/// * `height` - Height of the image in pixels
/// * `strides` - Distances in samples between starts of consecutive rows of the
///               Y, U and V planes
/// * `buffers_size` - Receives the minimum number of bytes of each plane
///
/// # Examples
/// ```
/// use capture_color_primitives as ccp;
/// use ccp::{i420_buffers_size, STRIDE_AUTO};
///
/// let sizes = &mut [0usize; 3];
/// i420_buffers_size(641, 481, None, sizes).unwrap();
/// assert_eq!(sizes, &[641 * 481, 321 * 241, 321 * 241]);
///
/// i420_buffers_size(640, 480, Some(&[704, STRIDE_AUTO, 352]), sizes).unwrap();
/// assert_eq!(sizes, &[704 * 480, 320 * 240, 352 * 240]);
/// ```
///
/// # Errors
///
/// * [`InvalidValue`] if `width` or `height` is zero
///
/// * [`InvalidValue`] if a stride is narrower than its plane
///
/// * [`NotEnoughData`] if `strides` or `buffers_size` hold fewer than three values
///
/// [`InvalidValue`]: ./enum.ErrorKind.html#variant.InvalidValue
/// [`NotEnoughData`]: ./enum.ErrorKind.html#variant.NotEnoughData
pub fn i420_buffers_size(
    width: u32,
    height: u32,
    strides: Option<&[i32]>,
    buffers_size: &mut [usize],
) -> Result<(), ErrorKind> {
    let (width, height) = unsigned_dimensions(width, height)?;
    let strides = strides.unwrap_or(&DEFAULT_STRIDES);
    if strides.len() < I420_PLANES || buffers_size.len() < I420_PLANES {
        return Err(ErrorKind::NotEnoughData);
    }

    let mut sizes = [0; I420_PLANES];
    if !pixel_format::get_i420_sizes(width, height, strides, &mut sizes) {
        return Err(ErrorKind::InvalidValue);
    }

    buffers_size[..I420_PLANES].copy_from_slice(&sizes);
    Ok(())
}

/// Copies a plane, honoring independent strides. A negative `height` flips
/// the image vertically.
///
/// # Errors
///
/// * [`InvalidValue`] if `width` or `height` is zero, or a stride is narrower
///   than `width`
///
/// * [`NotEnoughData`] if a buffer is too small for the described plane
///
/// [`InvalidValue`]: ./enum.ErrorKind.html#variant.InvalidValue
/// [`NotEnoughData`]: ./enum.ErrorKind.html#variant.NotEnoughData
pub fn copy_plane(
    width: u32,
    height: i32,
    src_stride: i32,
    src_buffer: &[u8],
    dst_stride: i32,
    dst_buffer: &mut [u8],
) -> Result<(), ErrorKind> {
    copy_plane_generic(width, height, src_stride, src_buffer, dst_stride, dst_buffer)
}

/// Same as [`copy_plane`] for 16-bit samples. Strides count samples.
///
/// # Errors
///
/// See [`copy_plane`].
///
/// [`copy_plane`]: ./fn.copy_plane.html
pub fn copy_plane_16(
    width: u32,
    height: i32,
    src_stride: i32,
    src_buffer: &[u16],
    dst_stride: i32,
    dst_buffer: &mut [u16],
) -> Result<(), ErrorKind> {
    copy_plane_generic(width, height, src_stride, src_buffer, dst_stride, dst_buffer)
}

fn copy_plane_generic<T: Copy>(
    width: u32,
    height: i32,
    src_stride: i32,
    src_buffer: &[T],
    dst_stride: i32,
    dst_buffer: &mut [T],
) -> Result<(), ErrorKind> {
    let (width, height, flipped) = dimensions(width, height)?;
    let src = source_plane(src_buffer, src_stride, width, height, flipped)?;
    let mut dst = destination_plane(dst_buffer, dst_stride, width, height)?;
    rotate::copy_plane(&src, &mut dst);
    Ok(())
}

/// Mirrors a plane horizontally. A negative `height` also flips it
/// vertically.
///
/// # Examples
/// ```
/// use capture_color_primitives::mirror_plane;
///
/// let src = [1u8, 2, 3, 4, 5, 6];
/// let mut dst = [0u8; 6];
/// mirror_plane(3, 2, 3, &src, 3, &mut dst).unwrap();
/// assert_eq!(dst, [3, 2, 1, 6, 5, 4]);
/// ```
///
/// # Errors
///
/// See [`copy_plane`].
///
/// [`copy_plane`]: ./fn.copy_plane.html
pub fn mirror_plane(
    width: u32,
    height: i32,
    src_stride: i32,
    src_buffer: &[u8],
    dst_stride: i32,
    dst_buffer: &mut [u8],
) -> Result<(), ErrorKind> {
    let (width, height, flipped) = dimensions(width, height)?;
    let src = source_plane(src_buffer, src_stride, width, height, flipped)?;
    let mut dst = destination_plane(dst_buffer, dst_stride, width, height)?;
    rotate::mirror_plane(&src, &mut dst, dispatcher::kernels().mirror);
    Ok(())
}

/// Transposes a `width` x `height` plane into a `height` x `width` one.
///
/// # Errors
///
/// See [`copy_plane`].
///
/// [`copy_plane`]: ./fn.copy_plane.html
pub fn transpose_plane(
    width: u32,
    height: i32,
    src_stride: i32,
    src_buffer: &[u8],
    dst_stride: i32,
    dst_buffer: &mut [u8],
) -> Result<(), ErrorKind> {
    let (width, height, flipped) = dimensions(width, height)?;
    let src = source_plane(src_buffer, src_stride, width, height, flipped)?;
    let mut dst = destination_plane(dst_buffer, dst_stride, height, width)?;
    rotate::transpose_plane(&src, &mut dst);
    Ok(())
}

/// Rotates a plane clockwise. `width` and `height` describe the source, the
/// destination is `height` x `width` for quarter turns.
///
/// # Examples
/// ```
/// use capture_color_primitives::{rotate_plane, RotationMode};
///
/// // 0 1 2        3 0
/// // 3 4 5   ->   4 1
/// //              5 2
/// let src = [0u8, 1, 2, 3, 4, 5];
/// let mut dst = [0u8; 6];
/// rotate_plane(3, 2, 3, &src, 2, &mut dst, RotationMode::Rotate90).unwrap();
/// assert_eq!(dst, [3, 0, 4, 1, 5, 2]);
/// ```
///
/// # Errors
///
/// See [`copy_plane`].
///
/// [`copy_plane`]: ./fn.copy_plane.html
pub fn rotate_plane(
    width: u32,
    height: i32,
    src_stride: i32,
    src_buffer: &[u8],
    dst_stride: i32,
    dst_buffer: &mut [u8],
    mode: RotationMode,
) -> Result<(), ErrorKind> {
    rotate_plane_generic(
        width,
        height,
        src_stride,
        src_buffer,
        dst_stride,
        dst_buffer,
        mode,
        dispatcher::kernels().mirror,
    )
}

/// Same as [`rotate_plane`] for 16-bit samples. Strides count samples.
///
/// # Errors
///
/// See [`copy_plane`].
///
/// [`copy_plane`]: ./fn.copy_plane.html
/// [`rotate_plane`]: ./fn.rotate_plane.html
pub fn rotate_plane_16(
    width: u32,
    height: i32,
    src_stride: i32,
    src_buffer: &[u16],
    dst_stride: i32,
    dst_buffer: &mut [u16],
    mode: RotationMode,
) -> Result<(), ErrorKind> {
    rotate_plane_generic(
        width,
        height,
        src_stride,
        src_buffer,
        dst_stride,
        dst_buffer,
        mode,
        kernels::generic::mirror_row::<u16>,
    )
}

fn rotate_plane_generic<T: Copy>(
    width: u32,
    height: i32,
    src_stride: i32,
    src_buffer: &[T],
    dst_stride: i32,
    dst_buffer: &mut [T],
    mode: RotationMode,
    mirror_row: fn(&[T], &mut [T]),
) -> Result<(), ErrorKind> {
    let (width, height, flipped) = dimensions(width, height)?;
    let src = source_plane(src_buffer, src_stride, width, height, flipped)?;
    let (dst_width, dst_height) = mode.rotated_size(width, height);
    let dst = destination_plane(dst_buffer, dst_stride, dst_width, dst_height)?;
    rotate::rotate_plane(src, dst, mode, mirror_row);
    Ok(())
}

/// Copies an I420 image. A negative `height` flips it vertically.
///
/// # Errors
///
/// * [`InvalidValue`] if `width` or `height` is zero
///
/// * [`InvalidValue`] if fewer than three planes or strides are given, or a
///   stride is narrower than its plane
///
/// * [`NotEnoughData`] if a buffer is too small for its plane
///
/// [`InvalidValue`]: ./enum.ErrorKind.html#variant.InvalidValue
/// [`NotEnoughData`]: ./enum.ErrorKind.html#variant.NotEnoughData
pub fn i420_copy(
    width: u32,
    height: i32,
    src_strides: Option<&[i32]>,
    src_buffers: &[&[u8]],
    dst_strides: Option<&[i32]>,
    dst_buffers: &mut [&mut [u8]],
) -> Result<(), ErrorKind> {
    i420_rotate(
        width,
        height,
        src_strides,
        src_buffers,
        dst_strides,
        dst_buffers,
        RotationMode::Rotate0,
    )
}

/// Rotates an I420 image clockwise. `width` and `height` describe the
/// source; for quarter turns the destination is `height` x `width`.
///
/// # Errors
///
/// See [`i420_copy`].
///
/// [`i420_copy`]: ./fn.i420_copy.html
pub fn i420_rotate(
    width: u32,
    height: i32,
    src_strides: Option<&[i32]>,
    src_buffers: &[&[u8]],
    dst_strides: Option<&[i32]>,
    dst_buffers: &mut [&mut [u8]],
    mode: RotationMode,
) -> Result<(), ErrorKind> {
    let (width, height, flipped) = dimensions(width, height)?;
    let src = source_planes(width, height, flipped, src_strides, src_buffers)?;
    let (dst_width, dst_height) = mode.rotated_size(width, height);
    let dst = I420PlanesMut::new(
        dst_width,
        dst_height,
        dst_strides.unwrap_or(&DEFAULT_STRIDES),
        dst_buffers,
    )?;

    frame::rotate_planes(dispatcher::kernels(), src, dst, mode);
    Ok(())
}

fn scale_dimensions(width: u32, height: u32) -> Result<(usize, usize), ErrorKind> {
    if width > MAX_SCALE_DIMENSION || height > MAX_SCALE_DIMENSION {
        return Err(ErrorKind::InvalidValue);
    }

    unsigned_dimensions(width, height)
}

fn scale_source(width: u32, height: i32) -> Result<(usize, usize, bool), ErrorKind> {
    if height.unsigned_abs() > MAX_SCALE_DIMENSION {
        return Err(ErrorKind::InvalidValue);
    }

    let (width, _) = scale_dimensions(width, 1)?;
    let (_, rows, flipped) = dimensions(1, height)?;
    Ok((width, rows, flipped))
}

/// Scales an I420 image. A negative `src_height` flips it vertically.
///
/// Chroma planes are scaled from `((src_width + 1) / 2, (src_height + 1) / 2)`
/// to `((dst_width + 1) / 2, (dst_height + 1) / 2)` with the same filter.
///
/// # Examples
/// ```
/// use capture_color_primitives::{i420_scale, FilterMode, I420Buffer};
///
/// let src = I420Buffer::new(64, 48).unwrap();
/// let mut dst = I420Buffer::new(40, 30).unwrap();
/// let (src_strides, dst_strides) = (src.strides(), dst.strides());
/// i420_scale(
///     64,
///     48,
///     Some(&src_strides),
///     &src.planes(),
///     40,
///     30,
///     Some(&dst_strides),
///     &mut dst.planes_mut(),
///     FilterMode::Bilinear,
/// )
/// .unwrap();
/// ```
///
/// # Errors
///
/// * [`InvalidValue`] if a dimension is zero or larger than [`MAX_SCALE_DIMENSION`]
///
/// * [`InvalidValue`] if fewer than three planes or strides are given, or a
///   stride is narrower than its plane
///
/// * [`NotEnoughData`] if a buffer is too small for its plane
///
/// * [`OutOfMemory`] if a row buffer cannot be allocated
///
/// [`InvalidValue`]: ./enum.ErrorKind.html#variant.InvalidValue
/// [`NotEnoughData`]: ./enum.ErrorKind.html#variant.NotEnoughData
/// [`OutOfMemory`]: ./enum.ErrorKind.html#variant.OutOfMemory
/// [`MAX_SCALE_DIMENSION`]: ./constant.MAX_SCALE_DIMENSION.html
pub fn i420_scale(
    src_width: u32,
    src_height: i32,
    src_strides: Option<&[i32]>,
    src_buffers: &[&[u8]],
    dst_width: u32,
    dst_height: u32,
    dst_strides: Option<&[i32]>,
    dst_buffers: &mut [&mut [u8]],
    filter: FilterMode,
) -> Result<(), ErrorKind> {
    let (src_width, src_height, flipped) = scale_source(src_width, src_height)?;
    let (dst_width, dst_height) = scale_dimensions(dst_width, dst_height)?;
    let src = source_planes(src_width, src_height, flipped, src_strides, src_buffers)?;
    let dst = I420PlanesMut::new(
        dst_width,
        dst_height,
        dst_strides.unwrap_or(&DEFAULT_STRIDES),
        dst_buffers,
    )?;

    let kernels = dispatcher::kernels();
    let [sy, su, sv] = src.into_array();
    let [dy, du, dv] = dst.into_array();
    scale::scale_plane::<1>(kernels, sy, dy, filter)?;
    scale::scale_plane::<1>(kernels, su, du, filter)?;
    scale::scale_plane::<1>(kernels, sv, dv, filter)
}

/// Scales a single plane. A negative `src_height` flips it vertically.
///
/// # Errors
///
/// * [`InvalidValue`] if a dimension is zero or larger than [`MAX_SCALE_DIMENSION`]
///
/// * [`InvalidValue`] if a stride is narrower than its plane
///
/// * [`NotEnoughData`] if a buffer is too small for its plane
///
/// * [`OutOfMemory`] if a row buffer cannot be allocated
///
/// [`InvalidValue`]: ./enum.ErrorKind.html#variant.InvalidValue
/// [`NotEnoughData`]: ./enum.ErrorKind.html#variant.NotEnoughData
/// [`OutOfMemory`]: ./enum.ErrorKind.html#variant.OutOfMemory
/// [`MAX_SCALE_DIMENSION`]: ./constant.MAX_SCALE_DIMENSION.html
pub fn scale_plane(
    src_width: u32,
    src_height: i32,
    src_stride: i32,
    src_buffer: &[u8],
    dst_width: u32,
    dst_height: u32,
    dst_stride: i32,
    dst_buffer: &mut [u8],
    filter: FilterMode,
) -> Result<(), ErrorKind> {
    scale_interleaved::<1>(
        src_width, src_height, src_stride, src_buffer, dst_width, dst_height, dst_stride,
        dst_buffer, filter,
    )
}

/// Scales an interleaved U/V plane, as found in NV12. Widths count sample
/// pairs, strides count bytes.
///
/// # Errors
///
/// See [`scale_plane`].
///
/// [`scale_plane`]: ./fn.scale_plane.html
pub fn scale_uv_plane(
    src_width: u32,
    src_height: i32,
    src_stride: i32,
    src_buffer: &[u8],
    dst_width: u32,
    dst_height: u32,
    dst_stride: i32,
    dst_buffer: &mut [u8],
    filter: FilterMode,
) -> Result<(), ErrorKind> {
    scale_interleaved::<2>(
        src_width, src_height, src_stride, src_buffer, dst_width, dst_height, dst_stride,
        dst_buffer, filter,
    )
}

fn scale_interleaved<const CH: usize>(
    src_width: u32,
    src_height: i32,
    src_stride: i32,
    src_buffer: &[u8],
    dst_width: u32,
    dst_height: u32,
    dst_stride: i32,
    dst_buffer: &mut [u8],
    filter: FilterMode,
) -> Result<(), ErrorKind> {
    let (src_width, src_height, flipped) = scale_source(src_width, src_height)?;
    let (dst_width, dst_height) = scale_dimensions(dst_width, dst_height)?;
    let src = source_plane(src_buffer, src_stride, CH * src_width, src_height, flipped)?;
    let dst = destination_plane(dst_buffer, dst_stride, CH * dst_width, dst_height)?;
    scale::scale_plane::<CH>(dispatcher::kernels(), src, dst, filter)
}

/// Converts a packed RGB image to I420. A negative `height` flips the
/// image vertically.
///
/// `src_stride` counts bytes; [`STRIDE_AUTO`] means tightly packed rows.
///
/// # Errors
///
/// * [`InvalidValue`] if `width` or `height` is zero, or a stride is narrower
///   than its row
///
/// * [`InvalidValue`] if fewer than three destination planes or strides are given
///
/// * [`InvalidOperation`] if `src_format` is not a packed RGB format
///
/// * [`NotEnoughData`] if a buffer is too small for its plane
///
/// * [`OutOfMemory`] if the RGB565 row buffer cannot be allocated
///
/// [`STRIDE_AUTO`]: ./constant.STRIDE_AUTO.html
/// [`InvalidValue`]: ./enum.ErrorKind.html#variant.InvalidValue
/// [`InvalidOperation`]: ./enum.ErrorKind.html#variant.InvalidOperation
/// [`NotEnoughData`]: ./enum.ErrorKind.html#variant.NotEnoughData
/// [`OutOfMemory`]: ./enum.ErrorKind.html#variant.OutOfMemory
pub fn packed_to_i420(
    width: u32,
    height: i32,
    src_format: PixelFormat,
    src_stride: i32,
    src_buffer: &[u8],
    options: &ConvertOptions,
    dst_strides: Option<&[i32]>,
    dst_buffers: &mut [&mut [u8]],
) -> Result<(), ErrorKind> {
    let (width, height, flipped) = dimensions(width, height)?;
    if src_format.is_planar() {
        return Err(ErrorKind::InvalidOperation);
    }

    let row_size = width
        .checked_mul(src_format.bytes_per_pixel())
        .ok_or(ErrorKind::InvalidValue)?;
    let src = source_plane(src_buffer, src_stride, row_size, height, flipped)?;
    let mut dst = I420PlanesMut::new(
        width,
        height,
        dst_strides.unwrap_or(&DEFAULT_STRIDES),
        dst_buffers,
    )?;

    convert::packed_to_i420(dispatcher::kernels(), src_format, &src, width, options, &mut dst)
}

/// Crops, converts and rotates a captured frame into I420.
///
/// The sample holds `src_width` x `|src_height|` tightly packed pixels of
/// `src_format`; I420 samples hold their three planes back to back. A
/// negative `src_height` means the frame is stored bottom-up. The crop is
/// expressed in stored coordinates and is applied before the flip.
///
/// The destination has the crop dimensions, swapped for quarter turns.
/// Packed formats are staged through an intermediate I420 image when a
/// rotation is requested; I420 input is rotated directly.
///
/// # Errors
///
/// * [`InvalidValue`] if a dimension is zero or the crop does not lie inside the frame
///
/// * [`InvalidValue`] if fewer than three destination planes or strides are given
///
/// * [`NotEnoughData`] if the sample or a destination buffer is too small
///
/// * [`OutOfMemory`] if the intermediate image cannot be allocated, in
///   which case the destination is left untouched
///
/// [`InvalidValue`]: ./enum.ErrorKind.html#variant.InvalidValue
/// [`NotEnoughData`]: ./enum.ErrorKind.html#variant.NotEnoughData
/// [`OutOfMemory`]: ./enum.ErrorKind.html#variant.OutOfMemory
pub fn convert_to_i420(
    sample: &[u8],
    src_format: PixelFormat,
    src_width: u32,
    src_height: i32,
    crop: &CropRegion,
    rotation: RotationMode,
    options: &ConvertOptions,
    dst_strides: Option<&[i32]>,
    dst_buffers: &mut [&mut [u8]],
) -> Result<(), ErrorKind> {
    let geometry = FrameGeometry::new(src_format, src_width, src_height, crop)?;
    let (width, height) = geometry.output_size(rotation);
    let dst = I420PlanesMut::new(
        width,
        height,
        dst_strides.unwrap_or(&DEFAULT_STRIDES),
        dst_buffers,
    )?;

    frame::convert_to_i420(dispatcher::kernels(), sample, &geometry, rotation, options, dst)
}

/// Same as [`convert_to_i420`], for a sample stored at the start of
/// `buffer` and converted over itself.
///
/// The result is a tightly packed I420 image at the start of `buffer`: the
/// Y plane, then U, then V, with the crop dimensions swapped for quarter
/// turns. `buffer` must be large enough for both the sample and the result.
///
/// # Examples
/// ```
/// use capture_color_primitives as ccp;
/// use ccp::{ConvertOptions, CropRegion, PixelFormat, RotationMode};
///
/// // 4x2 ARGB frame, converted and rotated in place
/// let mut buffer = vec![255u8; 4 * 4 * 2];
/// ccp::convert_to_i420_in_place(
///     &mut buffer,
///     PixelFormat::Argb,
///     4,
///     2,
///     &CropRegion::full(4, 2),
///     RotationMode::Rotate90,
///     &ConvertOptions::default(),
/// )
/// .unwrap();
///
/// // 2x4 white image: 8 luma samples, then 1x2 U and V
/// assert_eq!(&buffer[..8], &[235; 8]);
/// assert_eq!(&buffer[8..12], &[128; 4]);
/// ```
///
/// # Errors
///
/// See [`convert_to_i420`].
///
/// [`convert_to_i420`]: ./fn.convert_to_i420.html
pub fn convert_to_i420_in_place(
    buffer: &mut [u8],
    src_format: PixelFormat,
    src_width: u32,
    src_height: i32,
    crop: &CropRegion,
    rotation: RotationMode,
    options: &ConvertOptions,
) -> Result<(), ErrorKind> {
    let geometry = FrameGeometry::new(src_format, src_width, src_height, crop)?;
    frame::convert_to_i420_in_place(dispatcher::kernels(), buffer, &geometry, rotation, options)
}

/// This is for internal use only
#[cfg(feature = "test_instruction_sets")]
pub fn initialize_with_instruction_set(instruction_set: &str) {
    dispatcher::set_test_instruction_set(instruction_set);
}

#[doc(hidden)]
#[cfg(not(tarpaulin_include))]
pub mod c_api {
    #![allow(clippy::wildcard_imports)]
    use super::*; // We are importing everything
    use super::frame::FrameGeometry;
    use super::pixel_format::half;
    use super::planar::I420PlanesMut;
    use std::convert::TryFrom;
    use std::ffi::CString;
    use std::os::raw::c_char;
    use std::ops::Range;
    use std::ptr;
    use std::slice;

    fn status(result: Result<(), ErrorKind>) -> i32 {
        match result {
            Ok(()) => 0,
            Err(error_kind) => error_kind.status(),
        }
    }

    /// Byte range covered by a C plane whose pointer addresses its first
    /// row, whatever the stride sign.
    fn plane_range(ptr: usize, stride: i32, width: usize, height: usize) -> Option<Range<usize>> {
        let pitch = stride.unsigned_abs() as usize;
        let span = pitch.checked_mul(height.checked_sub(1)?)?;
        let start = if stride < 0 { ptr.checked_sub(span)? } else { ptr };
        Some(start..start.checked_add(span)?.checked_add(width)?)
    }

    unsafe fn c_plane<'a>(ptr: *const u8, stride: i32, width: usize, height: usize) -> Option<&'a [u8]> {
        if ptr.is_null() {
            return None;
        }

        let range = plane_range(ptr as usize, stride, width, height)?;
        Some(slice::from_raw_parts(range.start as *const u8, range.len()))
    }

    unsafe fn c_plane_mut<'a>(ptr: *mut u8, stride: i32, width: usize, height: usize) -> Option<&'a mut [u8]> {
        if ptr.is_null() {
            return None;
        }

        let range = plane_range(ptr as usize, stride, width, height)?;
        Some(slice::from_raw_parts_mut(range.start as *mut u8, range.len()))
    }

    fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
        a.start < b.end && b.start < a.end
    }

    /// Effective strides for planes of the given widths.
    fn strides(strides: [i32; 3], widths: [usize; 3]) -> [i32; 3] {
        let mut out = strides;
        for (stride, width) in out.iter_mut().zip(&widths) {
            if *stride == STRIDE_AUTO {
                *stride = i32::try_from(*width).unwrap_or(i32::MAX);
            }
        }

        out
    }

    /// I420 planes of a `width` x `height` image from C pointers.
    unsafe fn c_planes<'a>(
        ptrs: [*const u8; 3],
        strides: [i32; 3],
        width: usize,
        height: usize,
    ) -> Option<[&'a [u8]; 3]> {
        let (cw, ch) = (half(width), half(height));
        Some([
            c_plane(ptrs[0], strides[0], width, height)?,
            c_plane(ptrs[1], strides[1], cw, ch)?,
            c_plane(ptrs[2], strides[2], cw, ch)?,
        ])
    }

    unsafe fn c_planes_mut<'a>(
        ptrs: [*mut u8; 3],
        strides: [i32; 3],
        width: usize,
        height: usize,
    ) -> Option<[&'a mut [u8]; 3]> {
        let (cw, ch) = (half(width), half(height));
        Some([
            c_plane_mut(ptrs[0], strides[0], width, height)?,
            c_plane_mut(ptrs[1], strides[1], cw, ch)?,
            c_plane_mut(ptrs[2], strides[2], cw, ch)?,
        ])
    }

    #[no_mangle]
    pub extern "C" fn ccp_describe_acceleration() -> *mut c_char {
        let acc = describe_acceleration();
        if let Ok(s) = CString::new(acc) {
            s.into_raw()
        } else {
            let p: *const c_char = ptr::null();
            p as *mut c_char
        }
    }

    #[no_mangle]
    pub unsafe extern "C" fn ccp_unref_string(string: *mut c_char) {
        if !string.is_null() {
            let _unused = CString::from_raw(string);
        }
    }

    /// Returns 0 on success, -1 on invalid arguments, 1 when the
    /// intermediate image cannot be allocated.
    #[no_mangle]
    pub unsafe extern "C" fn ccp_convert_to_i420(
        sample: *const u8,
        sample_size: usize,
        dst_y: *mut u8,
        dst_stride_y: i32,
        dst_u: *mut u8,
        dst_stride_u: i32,
        dst_v: *mut u8,
        dst_stride_v: i32,
        crop_x: i32,
        crop_y: i32,
        src_width: i32,
        src_height: i32,
        crop_width: i32,
        crop_height: i32,
        rotation: i32,
        fourcc: u32,
    ) -> i32 {
        // Protect from C null pointers
        if sample.is_null() || dst_y.is_null() || dst_u.is_null() || dst_v.is_null() {
            return ErrorKind::InvalidValue.status();
        }

        // C enums are untrusted, they arrive as plain integers
        let (format, rotation) = match (
            PixelFormat::from_fourcc(fourcc),
            RotationMode::from_degrees(rotation),
        ) {
            (Some(format), Some(rotation)) => (format, rotation),
            _ => return ErrorKind::InvalidValue.status(),
        };

        let crop = CropRegion {
            x: crop_x,
            y: crop_y,
            width: crop_width,
            height: crop_height,
        };
        let src_width = match u32::try_from(src_width) {
            Ok(width) => width,
            Err(_) => return ErrorKind::InvalidValue.status(),
        };
        let geometry = match FrameGeometry::new(format, src_width, src_height, &crop) {
            Ok(geometry) => geometry,
            Err(error_kind) => return error_kind.status(),
        };

        let sample_size = if sample_size == 0 {
            geometry.sample_size()
        } else {
            sample_size
        };
        let sample_range = (sample as usize)..(sample as usize).saturating_add(sample_size);

        let (width, height) = geometry.output_size(rotation);
        let (cw, ch) = (half(width), half(height));
        let dst_strides = strides([dst_stride_y, dst_stride_u, dst_stride_v], [width, cw, cw]);
        let dst_ptrs = [dst_y, dst_u, dst_v];
        let extents = [(width, height), (cw, ch), (cw, ch)];
        let mut aliased = false;
        for ((&ptr, &stride), &(w, h)) in dst_ptrs.iter().zip(&dst_strides).zip(&extents) {
            match plane_range(ptr as usize, stride, w, h) {
                Some(range) => aliased |= overlaps(&range, &sample_range),
                None => return ErrorKind::InvalidValue.status(),
            }
        }

        let kernels = dispatcher::kernels();
        if frame::needs_intermediate(format, rotation, aliased) {
            // The sample is fully read before the destination is borrowed.
            let image = {
                let sample = slice::from_raw_parts(sample, sample_size);
                match frame::convert_to_intermediate(kernels, sample, &geometry, &ConvertOptions::default()) {
                    Ok(image) => image,
                    Err(error_kind) => return error_kind.status(),
                }
            };

            let dst = match c_planes_mut(dst_ptrs, dst_strides, width, height) {
                Some(mut buffers) => I420PlanesMut::new(width, height, &dst_strides, &mut buffers)
                    .and_then(|dst| {
                        frame::rotate_planes(kernels, image.views()?, dst, rotation);
                        Ok(())
                    }),
                None => Err(ErrorKind::InvalidValue),
            };
            return status(dst);
        }

        let sample = slice::from_raw_parts(sample, sample_size);
        status(match c_planes_mut(dst_ptrs, dst_strides, width, height) {
            Some(mut buffers) => I420PlanesMut::new(width, height, &dst_strides, &mut buffers)
                .and_then(|dst| {
                    frame::convert_to_i420(
                        kernels,
                        sample,
                        &geometry,
                        rotation,
                        &ConvertOptions::default(),
                        dst,
                    )
                }),
            None => Err(ErrorKind::InvalidValue),
        })
    }

    #[no_mangle]
    pub unsafe extern "C" fn ccp_i420_scale(
        src_y: *const u8,
        src_stride_y: i32,
        src_u: *const u8,
        src_stride_u: i32,
        src_v: *const u8,
        src_stride_v: i32,
        src_width: i32,
        src_height: i32,
        dst_y: *mut u8,
        dst_stride_y: i32,
        dst_u: *mut u8,
        dst_stride_u: i32,
        dst_v: *mut u8,
        dst_stride_v: i32,
        dst_width: i32,
        dst_height: i32,
        filtering: i32,
    ) -> i32 {
        let filter = match FilterMode::try_from(filtering) {
            Ok(filter) => filter,
            Err(_) => return ErrorKind::InvalidValue.status(),
        };

        let dims = (
            u32::try_from(src_width),
            u32::try_from(dst_width),
            u32::try_from(dst_height),
        );
        let (src_w, dst_w, dst_h) = match dims {
            (Ok(a), Ok(b), Ok(c)) if a > 0 && b > 0 && c > 0 && src_height != 0 => (a, b, c),
            _ => return ErrorKind::InvalidValue.status(),
        };

        let (sw, sh) = (src_w as usize, src_height.unsigned_abs() as usize);
        let (dw, dh) = (dst_w as usize, dst_h as usize);
        let src_strides = strides([src_stride_y, src_stride_u, src_stride_v], [sw, half(sw), half(sw)]);
        let dst_strides = strides([dst_stride_y, dst_stride_u, dst_stride_v], [dw, half(dw), half(dw)]);

        let src = c_planes([src_y, src_u, src_v], src_strides, sw, sh);
        let dst = c_planes_mut([dst_y, dst_u, dst_v], dst_strides, dw, dh);
        status(match (src, dst) {
            (Some(src), Some(mut dst)) => i420_scale(
                src_w,
                src_height,
                Some(&src_strides),
                &src,
                dst_w,
                dst_h,
                Some(&dst_strides),
                &mut dst,
                filter,
            ),
            _ => Err(ErrorKind::InvalidValue),
        })
    }

    #[no_mangle]
    pub unsafe extern "C" fn ccp_i420_rotate(
        src_y: *const u8,
        src_stride_y: i32,
        src_u: *const u8,
        src_stride_u: i32,
        src_v: *const u8,
        src_stride_v: i32,
        dst_y: *mut u8,
        dst_stride_y: i32,
        dst_u: *mut u8,
        dst_stride_u: i32,
        dst_v: *mut u8,
        dst_stride_v: i32,
        width: i32,
        height: i32,
        rotation: i32,
    ) -> i32 {
        let (mode, src_w) = match (RotationMode::from_degrees(rotation), u32::try_from(width)) {
            (Some(mode), Ok(w)) if w > 0 && height != 0 => (mode, w),
            _ => return ErrorKind::InvalidValue.status(),
        };

        let (sw, sh) = (src_w as usize, height.unsigned_abs() as usize);
        let (dw, dh) = mode.rotated_size(sw, sh);
        let src_strides = strides([src_stride_y, src_stride_u, src_stride_v], [sw, half(sw), half(sw)]);
        let dst_strides = strides([dst_stride_y, dst_stride_u, dst_stride_v], [dw, half(dw), half(dw)]);

        let src = c_planes([src_y, src_u, src_v], src_strides, sw, sh);
        let dst = c_planes_mut([dst_y, dst_u, dst_v], dst_strides, dw, dh);
        status(match (src, dst) {
            (Some(src), Some(mut dst)) => i420_rotate(
                src_w,
                height,
                Some(&src_strides),
                &src,
                Some(&dst_strides),
                &mut dst,
                mode,
            ),
            _ => Err(ErrorKind::InvalidValue),
        })
    }
}
