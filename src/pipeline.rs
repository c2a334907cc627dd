use crate::config::Config;
use crate::container::{encode_frame, read_container, write_container, CompressedFrame};
use crate::error::{ObscuraError, Result};
use crate::frame::{Frame, Obscurer};
use crate::stats::BatchTotals;
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use rayon::prelude::*;
use std::io::{Cursor, Read, Write};

#[derive(Debug)]
pub struct CompressionStats {
	/// Summed raw-frame size estimate, in bytes.
	pub original_size: u64,
	/// Summed compressed-representation estimate, in bytes.
	pub compressed_size: u64,
	/// Percentage reduction over the whole batch; negative on expansion.
	pub ratio_percent: f64,
	pub frames_processed: u64,
	/// Actual container bytes written, headers included.
	pub container_bytes: u64,
}

/// One-shot in-memory compression of a single frame into container bytes.
pub fn compress_frame(frame: &Frame, config: &Config) -> Result<Vec<u8>> {
	let (compressed, _) = encode_frame(frame, config)?;
	let mut out = Vec::new();
	write_container(&mut out, &[compressed], config)?;
	Ok(out)
}

/// Inverse of [`compress_frame`]; the container must hold exactly one frame.
pub fn decompress_frame(data: &[u8]) -> Result<Frame> {
	let (frames, _) = read_container(&mut Cursor::new(data))?;
	match frames.as_slice() {
		[frame] => frame.decompress(),
		_ => Err(ObscuraError::InvalidFormat(format!(
			"expected a single-frame container, found {} frames",
			frames.len()
		))),
	}
}

/// Compress a sequence of frames into one container. Frames are mutually
/// data-independent (each rebuilds its tables from scratch), so they are
/// compressed in parallel; container order still follows input order. An
/// obscurer, when given, runs on each frame before compression.
pub fn compress_frames<W: Write>(
	frames: Vec<Frame>,
	writer: &mut W,
	config: &Config,
	obscurer: Option<&dyn Obscurer>,
) -> Result<CompressionStats> {
	let pb = ProgressBar::new(frames.len() as u64);
	pb.set_style(ProgressStyle::default_bar()
		.template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] Frames {pos}/{len} ({eta})")
		.unwrap()
		.progress_chars("#>-")
	);

	let _ = rayon::ThreadPoolBuilder::new()
		.num_threads(config.threads)
		.build_global();

	let mut compressed: Vec<(CompressedFrame, crate::stats::CompressionReport)> = frames
		.into_par_iter()
		.enumerate()
		.map(|(id, frame)| {
			let frame = match obscurer {
				Some(o) => o.obscure(frame),
				None => frame,
			};
			let (mut compressed_frame, report) = encode_frame(&frame, config)?;
			compressed_frame.id = id;
			pb.inc(1);
			Ok::<_, ObscuraError>((compressed_frame, report))
		})
		.collect::<Result<Vec<_>>>()?;

	pb.finish_with_message("Compression finished");

	compressed.sort_by_key(|(frame, _)| frame.id);

	let mut totals = BatchTotals::new();
	for (frame, report) in &compressed {
		debug!(
			"frame {}: {} -> {} bytes ({:.2}%)",
			frame.id,
			report.original_bytes,
			report.compressed_bytes,
			report.ratio_percent()
		);
		totals.add(report);
	}

	let ordered: Vec<CompressedFrame> = compressed.into_iter().map(|(frame, _)| frame).collect();
	let container_bytes = write_container(writer, &ordered, config)?;

	Ok(CompressionStats {
		original_size: totals.original_bytes,
		compressed_size: totals.compressed_bytes,
		ratio_percent: totals.ratio_percent(),
		frames_processed: totals.frames,
		container_bytes,
	})
}

/// Read a container back into frames, restoring the original frame order.
pub fn decompress_frames<R: Read>(reader: &mut R, num_threads: usize) -> Result<Vec<Frame>> {
	let (compressed, _config) = read_container(reader)?;

	let _ = rayon::ThreadPoolBuilder::new()
		.num_threads(num_threads)
		.build_global();

	let pb = ProgressBar::new(compressed.len() as u64);
	pb.set_style(ProgressStyle::default_bar()
		.template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] Frames {pos}/{len} ({eta})")
		.unwrap()
		.progress_chars("#>-")
	);

	let mut decoded: Vec<(usize, Frame)> = compressed
		.into_par_iter()
		.map(|frame| {
			let id = frame.id;
			let decoded_frame = frame.decompress()?;
			pb.inc(1);
			Ok::<_, ObscuraError>((id, decoded_frame))
		})
		.collect::<Result<Vec<_>>>()?;

	pb.finish_with_message("Decompression finished");

	decoded.sort_by_key(|(id, _)| *id);
	Ok(decoded.into_iter().map(|(_, frame)| frame).collect())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::Method;
	use crate::frame::{Identity, Shape};

	fn frames() -> Vec<Frame> {
		(0..4u8)
			.map(|i| {
				let data: Vec<u8> = (0..60).map(|p| (p as u8).wrapping_mul(i + 1)).collect();
				Frame::new(Shape::new(4, 5, 3), data).unwrap()
			})
			.collect()
	}

	#[test]
	fn test_single_frame_round_trip() {
		let frame = frames().remove(0);
		for method in [Method::Rle, Method::Huffman] {
			let config = Config::default().with_method(method);
			let bytes = compress_frame(&frame, &config).unwrap();
			assert_eq!(decompress_frame(&bytes).unwrap(), frame);
		}
	}

	#[test]
	fn test_batch_round_trip_preserves_order() {
		let input = frames();
		let config = Config::default();
		let mut container = Vec::new();
		let stats =
			compress_frames(input.clone(), &mut container, &config, Some(&Identity)).unwrap();
		assert_eq!(stats.frames_processed, 4);
		assert_eq!(stats.original_size, 4 * 60);
		assert_eq!(stats.container_bytes, container.len() as u64);

		let restored = decompress_frames(&mut Cursor::new(container), config.threads).unwrap();
		assert_eq!(restored, input);
	}

	#[test]
	fn test_decompress_frame_rejects_multi_frame_container() {
		let input = frames();
		let config = Config::default();
		let mut container = Vec::new();
		compress_frames(input, &mut container, &config, None).unwrap();
		assert!(matches!(
			decompress_frame(&container),
			Err(ObscuraError::InvalidFormat(_))
		));
	}
}
