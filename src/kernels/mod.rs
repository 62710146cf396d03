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
//! Row kernel registry.
//!
//! A [`KernelTable`] holds one implementation of every row operation. One
//! table exists per instruction set; the best one for the running cpu is
//! picked once when the library context is created.
use crate::color_space::ColorspaceProfile;
use crate::cpu_info::InstructionSet;
use crate::pixel_format::{layout, PixelFormat, RGB_LAYOUT_COUNT};
use crate::scale;
use paste::paste;

pub(crate) mod generic;
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub(crate) mod sse2;

/// `(src, dst_y, width, profile)`
pub(crate) type LumaRow = fn(&[u8], &mut [u8], usize, &ColorspaceProfile);
/// `(src0, src1, dst_u, dst_v, width, profile)`
pub(crate) type ChromaRow = fn(&[u8], &[u8], &mut [u8], &mut [u8], usize, &ColorspaceProfile);
/// `(src, dst, width)`
pub(crate) type UnpackRow = fn(&[u8], &mut [u8], usize);
pub(crate) type MirrorRow = fn(&[u8], &mut [u8]);
/// `(dst, src0, src1, fraction)`
pub(crate) type BlendRow = fn(&mut [u8], &[u8], &[u8], u32);
/// `(dst, src0, src1)`
pub(crate) type AverageRow = fn(&mut [u8], &[u8], &[u8]);
/// `(src0, src1, dst)`
pub(crate) type Down2Row = fn(&[u8], &[u8], &mut [u8]);

pub(crate) struct KernelTable {
    pub luma: [LumaRow; RGB_LAYOUT_COUNT],
    pub chroma: [ChromaRow; RGB_LAYOUT_COUNT],
    pub chroma_top_left: [ChromaRow; RGB_LAYOUT_COUNT],
    pub rgb565_to_argb: UnpackRow,
    pub mirror: MirrorRow,
    pub blend: BlendRow,
    pub average: AverageRow,
    pub down2_box: Down2Row,
}

macro_rules! rgb_row {
    ($set:ident, $kernel:ident, $layout:ident) => {
        paste! {
            $set::$kernel::<
                { layout::[<$layout:upper>][0] },
                { layout::[<$layout:upper>][1] },
                { layout::[<$layout:upper>][2] },
                { layout::[<$layout:upper>][3] },
            >
        }
    };
}

macro_rules! rgb_rows {
    ($set:ident, $kernel:ident) => {
        [
            rgb_row!($set, $kernel, Argb),
            rgb_row!($set, $kernel, Bgra),
            rgb_row!($set, $kernel, Abgr),
            rgb_row!($set, $kernel, Rgba),
            rgb_row!($set, $kernel, Rgb24),
            rgb_row!($set, $kernel, Raw),
        ]
    };
}

impl KernelTable {
    pub fn generic() -> Self {
        KernelTable {
            luma: rgb_rows!(generic, rgb_to_y_row),
            chroma: rgb_rows!(generic, rgb_to_uv_row),
            chroma_top_left: rgb_rows!(generic, rgb_to_uv_row_top_left),
            rgb565_to_argb: generic::rgb565_to_argb_row,
            mirror: generic::mirror_row::<u8>,
            blend: generic::blend_row,
            average: generic::average_row,
            down2_box: scale::row::scale_row_down2_box::<1>,
        }
    }

    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    pub fn sse2() -> Self {
        KernelTable {
            luma: rgb_rows!(sse2, rgb_to_y_row),
            chroma: rgb_rows!(sse2, rgb_to_uv_row),
            mirror: sse2::mirror_row,
            blend: sse2::blend_row,
            average: sse2::average_row,
            down2_box: sse2::scale_row_down2_box,
            ..KernelTable::generic()
        }
    }

    pub fn for_instruction_set(set: InstructionSet) -> Self {
        match set {
            InstructionSet::Generic => KernelTable::generic(),
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            InstructionSet::Sse2 => KernelTable::sse2(),
        }
    }

    /// Luma and chroma kernels for a packed RGB layout.
    pub fn rgb_rows(
        &self,
        format: PixelFormat,
        top_left: bool,
    ) -> Option<(LumaRow, ChromaRow)> {
        format.rgb_layout()?;
        let index = format as usize;
        let chroma = if top_left {
            self.chroma_top_left[index]
        } else {
            self.chroma[index]
        };

        Some((self.luma[index], chroma))
    }

    /// Vertical blend of two rows, `fraction` in 1/256 units of `src1`.
    pub fn interpolate_row(&self, dst: &mut [u8], src0: &[u8], src1: &[u8], fraction: u32) {
        match fraction {
            0 => dst.copy_from_slice(&src0[..dst.len()]),
            128 => (self.average)(dst, src0, src1),
            _ => (self.blend)(dst, src0, src1, fraction),
        }
    }
}
