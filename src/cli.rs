use crate::config::{ChecksumType, Config, Method};
use crate::container::{self, MethodFlags};
use crate::error::{ObscuraError, Result};
use crate::frame::{Frame, Shape};
use crate::pipeline;
use crate::stats;
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(author, version, about, long_about = "Obscura: lossless pixel-frame compression (RLE / Huffman)")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compresses a raw 8-bit frame file
    Compress {
        /// Input file of raw frames (height * width * channels bytes each)
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Output container file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Frame height in pixels
        #[arg(long)]
        height: u32,

        /// Frame width in pixels
        #[arg(long)]
        width: u32,

        /// Channels per pixel
        #[arg(short, long, default_value_t = 3)]
        channels: u8,

        /// Compression method [rle, huffman]
        #[arg(short, long, default_value = "huffman")]
        method: Method,

        /// Checksum type [crc32, sha256]
        #[arg(long, default_value = "crc32")]
        checksum: ChecksumType,

        /// Number of threads to use (default: all available cores)
        #[arg(short, long)]
        threads: Option<usize>,
    },
    /// Decompresses a container back to raw frames
    Decompress {
        /// Input container file
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Output file for the concatenated raw frames
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Number of threads to use (default: all available cores)
        #[arg(short, long)]
        threads: Option<usize>,
    },
    /// Shows per-frame details of a container
    Info {
        /// Input container file
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,
    },
}

/// Split a raw byte blob into frames of the given shape.
fn frames_from_raw(data: Vec<u8>, shape: Shape) -> Result<Vec<Frame>> {
    let volume = shape.volume();
    if volume == 0 {
        return Err(ObscuraError::ConfigError("frame shape has zero volume".to_string()));
    }
    if data.is_empty() || data.len() % volume != 0 {
        return Err(ObscuraError::InvalidFormat(format!(
            "input length {} is not a whole number of {}-byte frames",
            data.len(),
            volume
        )));
    }
    data.chunks_exact(volume)
        .map(|chunk| Frame::new(shape, chunk.to_vec()))
        .collect()
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Compress { input, output, height, width, channels, method, checksum, threads } => {
            println!("Compressing {} to {}...", input.display(), output.display());
            let config = Config {
                method: *method,
                checksum: *checksum,
                threads: threads.unwrap_or_else(num_cpus::get),
            };

            let shape = Shape::new(*height, *width, *channels);
            let frames = frames_from_raw(std::fs::read(input)?, shape)?;
            let mut out_file = BufWriter::new(File::create(output)?);

            let start = Instant::now();
            let stats = pipeline::compress_frames(frames, &mut out_file, &config, None)?;
            out_file.flush()?;
            let duration = start.elapsed();

            println!("Compression successful!");
            println!("  Frames:           {}", stats.frames_processed);
            println!("  Original Size:    {} bytes", stats.original_size);
            println!("  Compressed Size:  {} bytes (estimated)", stats.compressed_size);
            println!("  Container Size:   {} bytes", stats.container_bytes);
            println!("  Ratio:            {:.2}%", stats.ratio_percent);
            println!("  Elapsed Time:     {:.2?}", duration);
        }
        Commands::Decompress { input, output, threads } => {
            println!("Decompressing {} to {}...", input.display(), output.display());
            let num_threads = threads.unwrap_or_else(num_cpus::get);

            let mut in_file = BufReader::new(File::open(input)?);
            let mut out_file = BufWriter::new(File::create(output)?);

            let start = Instant::now();
            let frames = pipeline::decompress_frames(&mut in_file, num_threads)?;
            for frame in &frames {
                out_file.write_all(frame.symbols())?;
            }
            out_file.flush()?;
            let duration = start.elapsed();

            println!("Decompression successful!");
            println!("  Frames:       {}", frames.len());
            println!("  Elapsed Time: {:.2?}", duration);
        }
        Commands::Info { input } => {
            let mut in_file = BufReader::new(File::open(input)?);
            let (frames, config) = container::read_container(&mut in_file)?;

            println!("Container: {} ({} frames, {:?} checksum)", input.display(), frames.len(), config.checksum);
            for frame in &frames {
                let method = if frame.flags.contains(MethodFlags::RLE) {
                    "RLE"
                } else if frame.flags.contains(MethodFlags::HUFFMAN) {
                    "Huffman"
                } else {
                    "unknown"
                };
                let raw = frame.shape.volume() as u64;
                let payload = frame.data.len() as u64;
                println!(
                    "  frame {:>4}: {:<7} {}x{}x{}  {} -> {} bytes ({:.2}%)",
                    frame.id,
                    method,
                    frame.shape.height,
                    frame.shape.width,
                    frame.shape.channels,
                    raw,
                    payload,
                    stats::ratio_percent(raw, payload)
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_from_raw_splits_exactly() {
        let shape = Shape::new(2, 2, 1);
        let frames = frames_from_raw(vec![0u8; 12], shape).unwrap();
        assert_eq!(frames.len(), 3);
    }

    #[test]
    fn test_frames_from_raw_rejects_partial_frame() {
        let shape = Shape::new(2, 2, 1);
        assert!(frames_from_raw(vec![0u8; 10], shape).is_err());
        assert!(frames_from_raw(Vec::new(), shape).is_err());
    }

    #[test]
    fn test_frames_from_raw_rejects_zero_volume() {
        let shape = Shape::new(0, 10, 3);
        assert!(matches!(
            frames_from_raw(vec![0u8; 4], shape),
            Err(ObscuraError::ConfigError(_))
        ));
    }
}
