use criterion::*;
use std::error;
use std::time::Duration;
use std::time::Instant;

use capture_color_primitives as ccp;
use ccp::*;

const WIDTH: u32 = 1920;
const HEIGHT: u32 = 1080;
const SAMPLE_SIZE: usize = 22;
const PAGE_SIZE: usize = 4096;

type BenchmarkResult<T> = std::result::Result<T, Box<dyn error::Error>>;

/// Deterministic gradient with some high frequency content.
fn synthetic_frame(format: PixelFormat, width: u32, height: u32) -> Vec<u8> {
    let (w, h) = (width as usize, height as usize);
    let bpp = format.bytes_per_pixel();
    let mut frame = vec![0_u8; w * h * bpp];
    for (y, row) in frame.chunks_mut(w * bpp).enumerate() {
        for (x, pixel) in row.chunks_mut(bpp).enumerate() {
            for (c, sample) in pixel.iter_mut().enumerate() {
                *sample = ((x * (c + 1) + y * 3 + (x ^ y)) & 0xFF) as u8;
            }
        }
    }

    frame
}

fn touch(buffer: &mut [u8]) {
    for i in (0..buffer.len()).step_by(PAGE_SIZE) {
        buffer[i] = 0;
    }
}

fn packed_i420(frame: &[u8], format: PixelFormat, image: &mut I420Buffer) -> BenchmarkResult<Duration> {
    let strides = image.strides();
    let start = Instant::now();
    packed_to_i420(
        WIDTH,
        HEIGHT as i32,
        format,
        STRIDE_AUTO,
        frame,
        &ConvertOptions::default(),
        Some(&strides),
        &mut image.planes_mut(),
    )?;

    Ok(start.elapsed())
}

fn capture_rotate(frame: &[u8], format: PixelFormat, image: &mut I420Buffer) -> BenchmarkResult<Duration> {
    let strides = image.strides();
    let start = Instant::now();
    convert_to_i420(
        frame,
        format,
        WIDTH,
        -(HEIGHT as i32),
        &CropRegion::full(WIDTH, HEIGHT),
        RotationMode::Rotate90,
        &ConvertOptions::default(),
        Some(&strides),
        &mut image.planes_mut(),
    )?;

    Ok(start.elapsed())
}

fn rotate(src: &I420Buffer, dst: &mut I420Buffer, mode: RotationMode) -> BenchmarkResult<Duration> {
    let (src_strides, dst_strides) = (src.strides(), dst.strides());
    let start = Instant::now();
    i420_rotate(
        src.width(),
        src.height() as i32,
        Some(&src_strides),
        &src.planes(),
        Some(&dst_strides),
        &mut dst.planes_mut(),
        mode,
    )?;

    Ok(start.elapsed())
}

fn scale(src: &I420Buffer, dst: &mut I420Buffer, filter: FilterMode) -> BenchmarkResult<Duration> {
    let (src_strides, dst_strides) = (src.strides(), dst.strides());
    let (dst_width, dst_height) = (dst.width(), dst.height());
    let start = Instant::now();
    i420_scale(
        src.width(),
        src.height() as i32,
        Some(&src_strides),
        &src.planes(),
        dst_width,
        dst_height,
        Some(&dst_strides),
        &mut dst.planes_mut(),
        filter,
    )?;

    Ok(start.elapsed())
}

fn source_i420() -> I420Buffer {
    let frame = synthetic_frame(PixelFormat::Bgra, WIDTH, HEIGHT);
    let mut image = I420Buffer::new(WIDTH, HEIGHT).expect("Unable to allocate benchmark image");
    packed_i420(&frame, PixelFormat::Bgra, &mut image).expect("Unable to prepare benchmark input");
    image
}

fn bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("capture-color-primitives");
    group.sample_size(SAMPLE_SIZE);
    group.throughput(Throughput::Elements(u64::from(WIDTH) * u64::from(HEIGHT)));

    for (name, format) in &[
        ("bgra>i420", PixelFormat::Bgra),
        ("argb>i420", PixelFormat::Argb),
        ("rgb24>i420", PixelFormat::Rgb24),
        ("rgb565>i420", PixelFormat::Rgb565),
    ] {
        let frame = synthetic_frame(*format, WIDTH, HEIGHT);
        let mut image = I420Buffer::new(WIDTH, HEIGHT).expect("Unable to allocate benchmark image");
        touch(&mut image.planes_mut()[0]);
        group.bench_function(*name, |b| {
            b.iter_custom(|iters| {
                let mut total = Duration::new(0, 0);
                for _i in 0..iters {
                    total += packed_i420(&frame, *format, &mut image)
                        .expect("Benchmark iteration failed");
                }

                total
            });
        });
    }

    {
        let frame = synthetic_frame(PixelFormat::Rgb24, WIDTH, HEIGHT);
        let mut image = I420Buffer::new(HEIGHT, WIDTH).expect("Unable to allocate benchmark image");
        group.bench_function("rgb24>i420-bottom-up-rot90", |b| {
            b.iter_custom(|iters| {
                let mut total = Duration::new(0, 0);
                for _i in 0..iters {
                    total += capture_rotate(&frame, PixelFormat::Rgb24, &mut image)
                        .expect("Benchmark iteration failed");
                }

                total
            });
        });
    }

    let src = source_i420();
    for (name, mode) in &[
        ("i420-rot90", RotationMode::Rotate90),
        ("i420-rot180", RotationMode::Rotate180),
        ("i420-rot270", RotationMode::Rotate270),
    ] {
        let (w, h) = mode.rotated_size(WIDTH as usize, HEIGHT as usize);
        let mut dst = I420Buffer::new(w as u32, h as u32).expect("Unable to allocate benchmark image");
        group.bench_function(*name, |b| {
            b.iter_custom(|iters| {
                let mut total = Duration::new(0, 0);
                for _i in 0..iters {
                    total += rotate(&src, &mut dst, *mode).expect("Benchmark iteration failed");
                }

                total
            });
        });
    }

    for (name, (w, h), filter) in &[
        ("i420-scale-half-box", (960, 540), FilterMode::Box),
        ("i420-scale-720p-bilinear", (1280, 720), FilterMode::Bilinear),
        ("i420-scale-360p-box", (640, 360), FilterMode::Box),
        ("i420-scale-4k-bilinear", (3840, 2160), FilterMode::Bilinear),
        ("i420-scale-720p-point", (1280, 720), FilterMode::None),
    ] {
        let mut dst = I420Buffer::new(*w, *h).expect("Unable to allocate benchmark image");
        group.bench_function(*name, |b| {
            b.iter_custom(|iters| {
                let mut total = Duration::new(0, 0);
                for _i in 0..iters {
                    total += scale(&src, &mut dst, *filter).expect("Benchmark iteration failed");
                }

                total
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench);
criterion_main!(benches);
