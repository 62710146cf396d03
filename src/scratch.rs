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
use crate::ErrorKind;
use log::warn;
use std::mem;
use std::ops::{Deref, DerefMut};

const ALIGNMENT: usize = 64;

/// Zero-initialised temporary storage whose first element is 64-byte aligned.
///
/// Allocation failures are reported instead of aborting. Memory is released
/// when the buffer goes out of scope, whatever path the caller takes.
pub(crate) struct AlignedBuffer<T> {
    storage: Vec<T>,
    offset: usize,
    len: usize,
}

impl<T: Copy + Default> AlignedBuffer<T> {
    pub fn try_new(len: usize) -> Result<Self, ErrorKind> {
        let pad = ALIGNMENT / mem::size_of::<T>().max(1);
        let capacity = len.checked_add(pad).ok_or(ErrorKind::OutOfMemory)?;

        let mut storage = Vec::new();
        if storage.try_reserve_exact(capacity).is_err() {
            warn!("unable to allocate {} scratch elements", capacity);
            return Err(ErrorKind::OutOfMemory);
        }

        storage.resize(capacity, T::default());
        let offset = storage.as_ptr().align_offset(ALIGNMENT).min(pad);
        Ok(AlignedBuffer {
            storage,
            offset,
            len,
        })
    }
}

impl<T> Deref for AlignedBuffer<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.storage[self.offset..self.offset + self.len]
    }
}

impl<T> DerefMut for AlignedBuffer<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.storage[self.offset..self.offset + self.len]
    }
}
