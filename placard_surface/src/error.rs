// Copyright 2025 the Placard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::io;

/// Errors produced while scheduling or rasterizing frames.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The worker pool no longer accepts jobs.
    #[error("worker pool is closed")]
    PoolClosed,
    /// A worker thread could not be started.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] io::Error),
    /// A pixmap of the requested size could not be allocated.
    #[error("cannot allocate a {width}x{height} pixmap")]
    PixmapAllocation {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },
}
