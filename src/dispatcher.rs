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
use crate::cpu_info::{self, CpuManufacturer, InstructionSet};
use crate::kernels::KernelTable;
use log::debug;
#[cfg(feature = "test_instruction_sets")]
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::OnceLock;

#[cfg(feature = "test_instruction_sets")]
static TEST_SET: AtomicI32 = AtomicI32::new(-1);

/// Immutable after creation: cpu description and the selected kernels.
pub(crate) struct Context {
    pub manufacturer: CpuManufacturer,
    pub set: InstructionSet,
    kernels: KernelTable,
    #[cfg(feature = "test_instruction_sets")]
    generic_kernels: KernelTable,
}

impl Context {
    pub fn global() -> &'static Context {
        static INSTANCE: OnceLock<Context> = OnceLock::new();
        INSTANCE.get_or_init(Context::new)
    }

    fn new() -> Self {
        let (manufacturer, set) = cpu_info::get();
        debug!(
            "kernel context: manufacturer {:?}, instruction set {:?}",
            manufacturer, set
        );

        Context {
            manufacturer,
            set,
            kernels: KernelTable::for_instruction_set(set),
            #[cfg(feature = "test_instruction_sets")]
            generic_kernels: KernelTable::generic(),
        }
    }

    #[cfg(not(feature = "test_instruction_sets"))]
    pub fn kernels(&self) -> &KernelTable {
        &self.kernels
    }

    #[cfg(feature = "test_instruction_sets")]
    pub fn kernels(&self) -> &KernelTable {
        if TEST_SET.load(Ordering::SeqCst) == 0 {
            &self.generic_kernels
        } else {
            &self.kernels
        }
    }
}

/// Shortcut for the kernels of the global context.
pub(crate) fn kernels() -> &'static KernelTable {
    Context::global().kernels()
}

#[cfg(feature = "test_instruction_sets")]
pub(crate) fn set_test_instruction_set(instruction_set: &str) {
    match instruction_set {
        "generic" => TEST_SET.store(0, Ordering::SeqCst),
        _ => TEST_SET.store(1, Ordering::SeqCst),
    };
}
