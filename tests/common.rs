#![allow(dead_code)]

use capture_color_primitives as ccp;
use ccp::{ChromaSiting, ColorSpace, ErrorKind, PixelFormat};
use rand::Rng;

pub type Rgb = (u8, u8, u8);

pub const PACKED_FORMATS: &[PixelFormat; 7] = &[
    PixelFormat::Argb,
    PixelFormat::Bgra,
    PixelFormat::Abgr,
    PixelFormat::Rgba,
    PixelFormat::Rgb24,
    PixelFormat::Raw,
    PixelFormat::Rgb565,
];

pub const COLOR_SPACES: &[ColorSpace; 6] = &[
    ColorSpace::Bt601,
    ColorSpace::Bt709,
    ColorSpace::Bt2020,
    ColorSpace::Bt601FR,
    ColorSpace::Bt709FR,
    ColorSpace::Bt2020FR,
];

pub const SITINGS: &[ChromaSiting; 2] = &[ChromaSiting::Average, ChromaSiting::TopLeft];

pub fn check_err<T>(result: Result<T, ErrorKind>, err: ErrorKind) {
    match result {
        Ok(_) => panic!("expected {:?}, got Ok", err),
        Err(kind) => assert_eq!(kind, err),
    }
}

pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..len).map(|_| rng.gen()).collect()
}

pub fn random_rgb(count: usize) -> Vec<Rgb> {
    let mut rng = rand::thread_rng();
    (0..count).map(|_| (rng.gen(), rng.gen(), rng.gen())).collect()
}

fn expand5(v: u8) -> u8 {
    (v << 3) | (v >> 2)
}

fn expand6(v: u8) -> u8 {
    (v << 2) | (v >> 4)
}

/// The color a pixel has once stored in `format`.
pub fn stored_rgb(format: PixelFormat, (r, g, b): Rgb) -> Rgb {
    if format == PixelFormat::Rgb565 {
        (expand5(r >> 3), expand6(g >> 2), expand5(b >> 3))
    } else {
        (r, g, b)
    }
}

/// Writes one pixel in the memory order of `format`.
pub fn store_pixel(format: PixelFormat, (r, g, b): Rgb, out: &mut [u8]) {
    match format {
        PixelFormat::Argb => out[..4].copy_from_slice(&[b, g, r, 255]),
        PixelFormat::Bgra => out[..4].copy_from_slice(&[255, r, g, b]),
        PixelFormat::Abgr => out[..4].copy_from_slice(&[r, g, b, 255]),
        PixelFormat::Rgba => out[..4].copy_from_slice(&[255, b, g, r]),
        PixelFormat::Rgb24 => out[..3].copy_from_slice(&[b, g, r]),
        PixelFormat::Raw => out[..3].copy_from_slice(&[r, g, b]),
        PixelFormat::Rgb565 => {
            let word = (u16::from(r >> 3) << 11) | (u16::from(g >> 2) << 5) | u16::from(b >> 3);
            out[..2].copy_from_slice(&word.to_le_bytes());
        }
        PixelFormat::I420 => panic!("not a packed format"),
    }
}

/// Packs `width` x `height` pixels with `stride` bytes per row.
pub fn pack(format: PixelFormat, pixels: &[Rgb], width: usize, height: usize, stride: usize) -> Vec<u8> {
    let bpp = format.bytes_per_pixel();
    let mut out = vec![0_u8; stride * height];
    for y in 0..height {
        for x in 0..width {
            store_pixel(format, pixels[y * width + x], &mut out[y * stride + x * bpp..]);
        }
    }

    out
}

fn avg(a: u8, b: u8) -> u8 {
    ((u16::from(a) + u16::from(b) + 1) >> 1) as u8
}

fn avg_rgb(a: Rgb, b: Rgb) -> Rgb {
    (avg(a.0, b.0), avg(a.1, b.1), avg(a.2, b.2))
}

/// Y, U and V planes, tightly packed.
pub struct Reference {
    pub y: Vec<u8>,
    pub u: Vec<u8>,
    pub v: Vec<u8>,
}

/// Expected I420 for `pixels`, built from the per pixel transform.
pub fn reference_i420(
    pixels: &[Rgb],
    width: usize,
    height: usize,
    color_space: ColorSpace,
    siting: ChromaSiting,
) -> Reference {
    let at = |x: usize, y: usize| {
        let (r, g, b) = pixels[y.min(height - 1) * width + x.min(width - 1)];
        (r, g, b)
    };

    let y_plane = pixels
        .iter()
        .map(|&(r, g, b)| color_space.rgb_to_yuv(r, g, b).0)
        .collect();

    let (cw, ch) = ((width + 1) / 2, (height + 1) / 2);
    let mut u = Vec::with_capacity(cw * ch);
    let mut v = Vec::with_capacity(cw * ch);
    for y in 0..ch {
        for x in 0..cw {
            let (r, g, b) = match siting {
                ChromaSiting::TopLeft => at(2 * x, 2 * y),
                ChromaSiting::Average => avg_rgb(
                    avg_rgb(at(2 * x, 2 * y), at(2 * x + 1, 2 * y)),
                    avg_rgb(at(2 * x, 2 * y + 1), at(2 * x + 1, 2 * y + 1)),
                ),
            };
            let (_, cu, cv) = color_space.rgb_to_yuv(r, g, b);
            u.push(cu);
            v.push(cv);
        }
    }

    Reference { y: y_plane, u, v }
}

/// Copies `width` samples of every row out of a strided plane.
pub fn unpad(plane: &[u8], width: usize, height: usize, stride: usize) -> Vec<u8> {
    (0..height)
        .flat_map(|y| plane[y * stride..y * stride + width].iter().copied())
        .collect()
}

/// Row-major rotation of a tightly packed plane, clockwise.
pub fn rotate_reference<T: Copy>(src: &[T], width: usize, height: usize, degrees: u32) -> Vec<T> {
    let mut out = Vec::with_capacity(src.len());
    match degrees {
        90 => {
            for x in 0..width {
                for y in (0..height).rev() {
                    out.push(src[y * width + x]);
                }
            }
        }
        180 => out.extend(src.iter().rev()),
        270 => {
            for x in (0..width).rev() {
                for y in 0..height {
                    out.push(src[y * width + x]);
                }
            }
        }
        _ => out.extend_from_slice(src),
    }

    out
}
