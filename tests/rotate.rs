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
    copy_plane, copy_plane_16, i420_copy, i420_rotate, mirror_plane, rotate_plane,
    rotate_plane_16, transpose_plane, ErrorKind, RotationMode,
};
use common::{check_err, random_bytes, rotate_reference, unpad};
use itertools::iproduct;
use rand::Rng;

const MODES: &[(RotationMode, u32); 4] = &[
    (RotationMode::Rotate0, 0),
    (RotationMode::Rotate90, 90),
    (RotationMode::Rotate180, 180),
    (RotationMode::Rotate270, 270),
];

const SIZES: &[(usize, usize); 8] = &[
    (1, 1),
    (2, 3),
    (3, 2),
    (5, 7),
    (8, 8),
    (16, 3),
    (31, 17),
    (64, 9),
];

#[test]
fn quarter_turns() {
    // 0 1        4 2 0
    // 2 3   ->   5 3 1
    // 4 5
    let src = [0_u8, 1, 2, 3, 4, 5];
    let mut dst = [0_u8; 6];

    assert!(rotate_plane(2, 3, 2, &src, 3, &mut dst, RotationMode::Rotate90).is_ok());
    assert_eq!(dst, [4, 2, 0, 5, 3, 1]);

    assert!(rotate_plane(2, 3, 2, &src, 3, &mut dst, RotationMode::Rotate270).is_ok());
    assert_eq!(dst, [1, 3, 5, 0, 2, 4]);

    assert!(rotate_plane(2, 3, 2, &src, 2, &mut dst, RotationMode::Rotate180).is_ok());
    assert_eq!(dst, [5, 4, 3, 2, 1, 0]);

    assert!(rotate_plane(2, 3, 2, &src, 2, &mut dst, RotationMode::Rotate0).is_ok());
    assert_eq!(dst, src);
}

#[test]
fn rotate_matches_reference() {
    for ((width, height), (mode, degrees)) in iproduct!(SIZES, MODES) {
        let (w, h) = (*width, *height);
        let src = random_bytes(w * h);
        let (dw, dh) = mode.rotated_size(w, h);

        // Padded destination rows
        let dst_stride = dw + 3;
        let mut dst = vec![0_u8; dst_stride * dh];
        assert!(rotate_plane(
            w as u32,
            h as i32,
            w as i32,
            &src,
            dst_stride as i32,
            &mut dst,
            *mode,
        )
        .is_ok());

        assert_eq!(
            unpad(&dst, dw, dh, dst_stride),
            rotate_reference(&src, w, h, *degrees),
            "{}x{} rotated by {}",
            w,
            h,
            degrees
        );
    }
}

#[test]
fn rotations_compose() {
    for (width, height) in SIZES {
        let (w, h) = (*width, *height);
        let src = random_bytes(w * h);
        let mut once = vec![0_u8; w * h];
        let mut twice = vec![0_u8; w * h];

        // 90 then 270
        assert!(rotate_plane(w as u32, h as i32, 0, &src, 0, &mut once, RotationMode::Rotate90).is_ok());
        assert!(rotate_plane(h as u32, w as i32, 0, &once, 0, &mut twice, RotationMode::Rotate270).is_ok());
        assert_eq!(twice, src);

        // 180 twice
        assert!(rotate_plane(w as u32, h as i32, 0, &src, 0, &mut once, RotationMode::Rotate180).is_ok());
        assert!(rotate_plane(w as u32, h as i32, 0, &once, 0, &mut twice, RotationMode::Rotate180).is_ok());
        assert_eq!(twice, src);

        // 90 twice is 180
        let mut half_turn = vec![0_u8; w * h];
        assert!(rotate_plane(w as u32, h as i32, 0, &src, 0, &mut half_turn, RotationMode::Rotate180).is_ok());
        assert!(rotate_plane(w as u32, h as i32, 0, &src, 0, &mut once, RotationMode::Rotate90).is_ok());
        assert!(rotate_plane(h as u32, w as i32, 0, &once, 0, &mut twice, RotationMode::Rotate90).is_ok());
        assert_eq!(twice, half_turn);
    }
}

#[test]
fn rotate_16() {
    let mut rng = rand::thread_rng();
    for ((width, height), (mode, degrees)) in iproduct!(SIZES, MODES) {
        let (w, h) = (*width, *height);
        let src: Vec<u16> = (0..w * h).map(|_| rng.gen()).collect();
        let mut dst = vec![0_u16; w * h];

        assert!(rotate_plane_16(w as u32, h as i32, 0, &src, 0, &mut dst, *mode).is_ok());
        assert_eq!(dst, rotate_reference(&src, w, h, *degrees));
    }
}

#[test]
fn copy_and_flip() {
    for (width, height) in SIZES {
        let (w, h) = (*width, *height);
        let src = random_bytes(w * h);
        let mut dst = vec![0_u8; w * h];

        assert!(copy_plane(w as u32, h as i32, 0, &src, 0, &mut dst).is_ok());
        assert_eq!(dst, src);

        let flipped: Vec<u8> = src.chunks(w).rev().flatten().copied().collect();
        assert!(copy_plane(w as u32, -(h as i32), 0, &src, 0, &mut dst).is_ok());
        assert_eq!(dst, flipped);

        // A negative stride on a top-down buffer reads it bottom-up
        assert!(copy_plane(w as u32, h as i32, -(w as i32), &src, 0, &mut dst).is_ok());
        assert_eq!(dst, flipped);

        let wide: Vec<u16> = src.iter().map(|&s| (u16::from(s) << 8) | 1).collect();
        let mut wide_dst = vec![0_u16; w * h];
        assert!(copy_plane_16(w as u32, -(h as i32), 0, &wide, 0, &mut wide_dst).is_ok());
        let expected: Vec<u16> = flipped.iter().map(|&s| (u16::from(s) << 8) | 1).collect();
        assert_eq!(wide_dst, expected);
    }
}

#[test]
fn mirror_and_transpose() {
    for (width, height) in SIZES {
        let (w, h) = (*width, *height);
        let src = random_bytes(w * h);
        let mut once = vec![0_u8; w * h];
        let mut twice = vec![0_u8; w * h];

        assert!(mirror_plane(w as u32, h as i32, 0, &src, 0, &mut once).is_ok());
        for (out, row) in once.chunks(w).zip(src.chunks(w)) {
            assert!(out.iter().eq(row.iter().rev()));
        }

        assert!(mirror_plane(w as u32, h as i32, 0, &once, 0, &mut twice).is_ok());
        assert_eq!(twice, src);

        assert!(transpose_plane(w as u32, h as i32, 0, &src, 0, &mut once).is_ok());
        for (x, y) in iproduct!(0..w, 0..h) {
            assert_eq!(once[x * h + y], src[y * w + x]);
        }

        assert!(transpose_plane(h as u32, w as i32, 0, &once, 0, &mut twice).is_ok());
        assert_eq!(twice, src);
    }
}

#[test]
fn i420_round_trip() {
    for ((width, height), (mode, degrees)) in iproduct!(SIZES, MODES) {
        let (w, h) = (*width, *height);
        let (cw, ch) = ((w + 1) / 2, (h + 1) / 2);
        let y = random_bytes(w * h);
        let u = random_bytes(cw * ch);
        let v = random_bytes(cw * ch);

        let (dw, dh) = mode.rotated_size(w, h);
        let (dcw, dch) = ((dw + 1) / 2, (dh + 1) / 2);
        let mut ry = vec![0_u8; dw * dh];
        let mut ru = vec![0_u8; dcw * dch];
        let mut rv = vec![0_u8; dcw * dch];

        assert!(i420_rotate(
            w as u32,
            h as i32,
            None,
            &[&y[..], &u[..], &v[..]],
            None,
            &mut [&mut ry[..], &mut ru[..], &mut rv[..]],
            *mode,
        )
        .is_ok());

        assert_eq!(ry, rotate_reference(&y, w, h, *degrees));
        assert_eq!(ru, rotate_reference(&u, cw, ch, *degrees));
        assert_eq!(rv, rotate_reference(&v, cw, ch, *degrees));

        let inverse = match mode {
            RotationMode::Rotate90 => RotationMode::Rotate270,
            RotationMode::Rotate270 => RotationMode::Rotate90,
            other => *other,
        };

        let mut by = vec![0_u8; w * h];
        let mut bu = vec![0_u8; cw * ch];
        let mut bv = vec![0_u8; cw * ch];
        assert!(i420_rotate(
            dw as u32,
            dh as i32,
            None,
            &[&ry[..], &ru[..], &rv[..]],
            None,
            &mut [&mut by[..], &mut bu[..], &mut bv[..]],
            inverse,
        )
        .is_ok());

        assert_eq!(by, y);
        assert_eq!(bu, u);
        assert_eq!(bv, v);
    }
}

#[test]
fn i420_copy_flips() {
    let (w, h) = (6, 4);
    let y = random_bytes(w * h);
    let u = random_bytes(9);
    let v = random_bytes(9);
    let mut cy = vec![0_u8; w * h];
    let mut cu = vec![0_u8; 9];
    let mut cv = vec![0_u8; 9];

    // Chroma strides wider than the plane
    assert!(i420_copy(
        w as u32,
        -(h as i32),
        Some(&[0, 0, 0]),
        &[&y, &u[..6], &v[..6]],
        Some(&[0, 4, 5]),
        &mut [&mut cy[..], &mut cu[..], &mut cv[..]],
    )
    .is_ok());

    let flipped: Vec<u8> = y.chunks(w).rev().flatten().copied().collect();
    assert_eq!(cy, flipped);
    assert_eq!(&cu[..3], &u[3..6]);
    assert_eq!(&cu[4..7], &u[..3]);
    assert_eq!(&cv[..3], &v[3..6]);
    assert_eq!(&cv[5..8], &v[..3]);
}

#[test]
fn errors() {
    let src = [0_u8; 16];
    let mut dst = [0_u8; 16];

    check_err(
        rotate_plane(0, 4, 0, &src, 0, &mut dst, RotationMode::Rotate90),
        ErrorKind::InvalidValue,
    );
    check_err(
        rotate_plane(4, 0, 0, &src, 0, &mut dst, RotationMode::Rotate90),
        ErrorKind::InvalidValue,
    );
    check_err(
        rotate_plane(4, 4, 3, &src, 0, &mut dst, RotationMode::Rotate90),
        ErrorKind::InvalidValue,
    );
    check_err(
        rotate_plane(4, 4, 0, &src[..15], 0, &mut dst, RotationMode::Rotate90),
        ErrorKind::NotEnoughData,
    );
    check_err(
        rotate_plane(4, 4, 0, &src, 0, &mut dst[..15], RotationMode::Rotate180),
        ErrorKind::NotEnoughData,
    );
    check_err(
        copy_plane(4, i32::MIN, 0, &src, 0, &mut dst),
        ErrorKind::InvalidValue,
    );
    check_err(
        i420_rotate(
            4,
            4,
            None,
            &[&src[..], &src[..4]],
            None,
            &mut [&mut dst[..]],
            RotationMode::Rotate90,
        ),
        ErrorKind::InvalidValue,
    );
}
