#![warn(unused)]
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]
#![deny(unsafe_code)]
#![deny(unstable_features)]
#![deny(unused_import_braces)]
#![deny(
    clippy::complexity,
    clippy::correctness,
    clippy::perf,
    clippy::style,
    clippy::pedantic
)]
#![allow(clippy::too_many_lines)] // This requires effort to handle
#![allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]

mod common;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen_test::wasm_bindgen_test as test;

use capture_color_primitives as ccp;
use ccp::{
    describe_acceleration, fourcc, i420_buffers_size, ErrorKind, FilterMode, I420Buffer,
    PixelFormat, RotationMode, STRIDE_AUTO,
};
use common::check_err;
use itertools::iproduct;
use std::convert::TryFrom;

const ALL_FORMATS: &[PixelFormat; 8] = &[
    PixelFormat::Argb,
    PixelFormat::Bgra,
    PixelFormat::Abgr,
    PixelFormat::Rgba,
    PixelFormat::Rgb24,
    PixelFormat::Raw,
    PixelFormat::Rgb565,
    PixelFormat::I420,
];

#[test]
fn bootstrap() {
    let description = describe_acceleration();
    println!("{}", description);
    assert!(description.starts_with("{cpu-manufacturer:"));
    assert!(description.contains("instruction-set:"));
}

#[test]
fn fourcc_codes() {
    assert_eq!(fourcc(b'A', b'R', b'G', b'B'), 0x4247_5241);
    assert_eq!(PixelFormat::I420.fourcc(), fourcc(b'I', b'4', b'2', b'0'));
    assert_eq!(PixelFormat::Rgb24.fourcc(), fourcc(b'2', b'4', b'B', b'G'));
    assert_eq!(PixelFormat::Raw.fourcc(), fourcc(b'r', b'a', b'w', b' '));
    assert_eq!(PixelFormat::Rgb565.fourcc(), fourcc(b'R', b'G', b'B', b'P'));

    for format in ALL_FORMATS {
        assert_eq!(PixelFormat::from_fourcc(format.fourcc()), Some(*format));
        assert_eq!(PixelFormat::try_from(format.fourcc()), Ok(*format));
    }

    assert_eq!(PixelFormat::from_fourcc(fourcc(b'N', b'V', b'1', b'2')), None);
    assert!(PixelFormat::try_from(0).is_err());
}

#[test]
fn bytes_per_pixel() {
    let expected = [4, 4, 4, 4, 3, 3, 2];
    for (format, bpp) in ALL_FORMATS.iter().zip(&expected) {
        assert_eq!(format.bytes_per_pixel(), *bpp, "{}", format);
    }
}

#[test]
fn rotation_modes() {
    for (degrees, mode) in &[
        (0, RotationMode::Rotate0),
        (90, RotationMode::Rotate90),
        (180, RotationMode::Rotate180),
        (270, RotationMode::Rotate270),
    ] {
        assert_eq!(RotationMode::from_degrees(*degrees), Some(*mode));
        assert_eq!(RotationMode::try_from(*degrees), Ok(*mode));
    }

    for degrees in &[-90, 45, 360, 1] {
        assert_eq!(RotationMode::from_degrees(*degrees), None);
    }

    assert_eq!(RotationMode::Rotate90.rotated_size(640, 480), (480, 640));
    assert_eq!(RotationMode::Rotate180.rotated_size(640, 480), (640, 480));
    assert_eq!(RotationMode::Rotate270.rotated_size(3, 5), (5, 3));
}

#[test]
fn filter_modes() {
    assert_eq!(FilterMode::default(), FilterMode::Box);
    for (value, mode) in &[
        (0, FilterMode::None),
        (1, FilterMode::Linear),
        (2, FilterMode::Bilinear),
        (3, FilterMode::Box),
    ] {
        assert_eq!(FilterMode::try_from(*value), Ok(*mode));
    }

    assert!(FilterMode::try_from(4).is_err());
    assert!(FilterMode::try_from(-1).is_err());
}

#[test]
fn error_status() {
    assert_eq!(ErrorKind::InvalidValue.status(), -1);
    assert_eq!(ErrorKind::InvalidOperation.status(), -1);
    assert_eq!(ErrorKind::NotEnoughData.status(), -1);
    assert_eq!(ErrorKind::OutOfMemory.status(), 1);
}

#[test]
fn buffers_size() {
    const WIDTH: u32 = 4098;
    const HEIGHT: u32 = 258;
    let buffers_size = &mut [0_usize; 3];

    for (width, height) in iproduct!(&[1, 2, 3, WIDTH, WIDTH + 1], &[1, 2, 7, HEIGHT]) {
        let (w, h) = (*width as usize, *height as usize);
        let (cw, ch) = ((w + 1) / 2, (h + 1) / 2);

        assert!(i420_buffers_size(*width, *height, None, buffers_size).is_ok());
        assert_eq!(buffers_size, &[w * h, cw * ch, cw * ch]);

        let strides = [*width as i32 + 32, STRIDE_AUTO, cw as i32 + 1];
        assert!(i420_buffers_size(*width, *height, Some(&strides), buffers_size).is_ok());
        assert_eq!(buffers_size, &[(w + 32) * h, cw * ch, (cw + 1) * ch]);
    }

    check_err(
        i420_buffers_size(0, HEIGHT, None, buffers_size),
        ErrorKind::InvalidValue,
    );
    check_err(
        i420_buffers_size(WIDTH, 0, None, buffers_size),
        ErrorKind::InvalidValue,
    );
    check_err(
        i420_buffers_size(WIDTH, HEIGHT, Some(&[WIDTH as i32 - 1, 0, 0]), buffers_size),
        ErrorKind::InvalidValue,
    );
    check_err(
        i420_buffers_size(WIDTH, HEIGHT, Some(&[0, 0]), buffers_size),
        ErrorKind::NotEnoughData,
    );
    check_err(
        i420_buffers_size(WIDTH, HEIGHT, None, &mut buffers_size[..2]),
        ErrorKind::NotEnoughData,
    );
}

#[test]
fn i420_buffer_layout() {
    for (width, height) in iproduct!(&[1_u32, 2, 5, 64], &[1_u32, 3, 8]) {
        let image = I420Buffer::new(*width, *height).unwrap();
        let (w, h) = (*width as usize, *height as usize);
        let (cw, ch) = ((w + 1) / 2, (h + 1) / 2);

        assert_eq!(image.width(), *width);
        assert_eq!(image.height(), *height);
        assert_eq!(image.strides(), [w as i32, cw as i32, cw as i32]);
        assert_eq!(image.as_bytes().len(), w * h + 2 * cw * ch);

        let [y, u, v] = image.planes();
        assert_eq!((y.len(), u.len(), v.len()), (w * h, cw * ch, cw * ch));
    }

    check_err(I420Buffer::new(0, 4), ErrorKind::InvalidValue);
    check_err(I420Buffer::new(4, 0), ErrorKind::InvalidValue);
}
