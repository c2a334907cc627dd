//! # Obscura
//!
//! Lossless compression for 8-bit pixel frames that have been run through a
//! face-obscuring step. Two schemes are available, selected per call:
//!
//! - **Run-length encoding**: (symbol, run-length) tokens over the flattened
//!   pixel stream; effective on the large flat regions obscuring produces
//! - **Huffman coding**: a per-frame prefix code built from symbol
//!   frequencies, bit-packed with an explicit padding header
//!
//! Neither scheme guarantees compression; size and ratio accounting is part
//! of the output so callers can report (or reject) the result. Codebooks are
//! rebuilt for every frame; nothing persists across frames.
//!
//! Face detection itself is out of scope: the pipeline accepts any
//! [`frame::Obscurer`] as a pure frame transform at the boundary.
//!
//! ## Quick Start
//!
//! ```rust
//! use obscura::{compress_frame, decompress_frame, Config, Frame, Shape};
//!
//! let frame = Frame::new(Shape::new(2, 2, 1), vec![7, 7, 7, 9]).unwrap();
//! let config = Config::default();
//!
//! let compressed = compress_frame(&frame, &config).unwrap();
//! let restored = decompress_frame(&compressed).unwrap();
//! assert_eq!(restored, frame);
//! ```
//!
//! ## Choosing a method
//!
//! ```rust
//! use obscura::{compress_frame, Config, Frame, Method, Shape};
//!
//! let frame = Frame::new(Shape::new(1, 8, 1), vec![5; 8]).unwrap();
//!
//! let rle = compress_frame(&frame, &Config::default().with_method(Method::Rle)).unwrap();
//! let huffman = compress_frame(&frame, &Config::default().with_method(Method::Huffman)).unwrap();
//! assert!(!rle.is_empty() && !huffman.is_empty());
//! ```
//!
//! ## Working with frame batches
//!
//! ```rust
//! use obscura::{pipeline, Config, Frame, Shape};
//!
//! let frames: Vec<Frame> = (0..3)
//!     .map(|i| Frame::new(Shape::new(2, 2, 1), vec![i as u8; 4]).unwrap())
//!     .collect();
//!
//! let mut container = Vec::new();
//! let stats = pipeline::compress_frames(frames.clone(), &mut container, &Config::default(), None).unwrap();
//! assert_eq!(stats.frames_processed, 3);
//!
//! let restored = pipeline::decompress_frames(&mut std::io::Cursor::new(container), 1).unwrap();
//! assert_eq!(restored, frames);
//! ```

pub mod cli;
pub mod codec;
pub mod config;
pub mod container;
pub mod error;
pub mod frame;
pub mod pipeline;
pub mod stats;

// Re-export commonly used types for convenience
pub use config::{ChecksumType, Config, Method};
pub use error::{ObscuraError, Result};
pub use frame::{Frame, Obscurer, Shape};
pub use pipeline::{compress_frame, decompress_frame, CompressionStats};
pub use stats::{ratio_percent, CompressionReport};

/// Compress a frame and return only its size report, without keeping the
/// compressed bytes. Useful for deciding whether a method is worthwhile.
pub fn frame_report(frame: &Frame, config: &Config) -> Result<CompressionReport> {
    let (_, report) = container::encode_frame(frame, config)?;
    Ok(report)
}

/// Verify that container data decompresses cleanly, checksums included.
pub fn validate(data: &[u8]) -> Result<bool> {
    let (frames, _) = container::read_container(&mut std::io::Cursor::new(data))?;
    for frame in &frames {
        frame.decompress()?;
    }
    Ok(true)
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
