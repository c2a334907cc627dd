use crate::codec::huffman::{Code, CodeTable, HuffmanBlock};
use crate::codec::rle::RunToken;
use crate::codec::{huffman, rle};
use crate::config::{ChecksumType, Config};
use crate::error::{ObscuraError, Result};
use crate::frame::{Frame, Shape};
use crate::stats::{self, CompressionReport};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use sha2::{Digest, Sha256};
use std::io::{Cursor, Read, Write};

const MAGIC_NUMBER: &[u8; 4] = b"OBC1";
const VERSION: u8 = 1;

bitflags::bitflags! {
	#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
	pub struct MethodFlags: u8 {
		const RLE     = 0b00000001;
		const HUFFMAN = 0b00000010;
	}
}

pub fn calculate_checksum(data: &[u8], kind: ChecksumType) -> u64 {
	match kind {
		ChecksumType::Crc32 => crc32fast::hash(data) as u64,
		ChecksumType::Sha256 => {
			let digest = Sha256::digest(data);
			u64::from_le_bytes(digest[..8].try_into().unwrap())
		}
	}
}

/// One frame's compressed form plus the metadata needed to reverse it.
#[derive(Debug)]
pub struct CompressedFrame {
	pub id: usize,
	pub flags: MethodFlags,
	pub checksum: u64,
	pub checksum_type: ChecksumType,
	pub shape: Shape,
	pub data: Vec<u8>,
}

impl CompressedFrame {
	pub fn decompress(&self) -> Result<Frame> {
		let expected_len = self.shape.volume();
		let symbols = if self.flags.contains(MethodFlags::RLE) {
			let tokens = decode_rle_payload(&self.data)?;
			rle::decode(&tokens, expected_len)?
		} else if self.flags.contains(MethodFlags::HUFFMAN) {
			let (table, packed) = decode_huffman_payload(&self.data)?;
			huffman::decode(&packed, &table, expected_len)?
		} else {
			return Err(ObscuraError::InvalidFormat("Unknown compression method".to_string()));
		};

		let checksum = calculate_checksum(&symbols, self.checksum_type);
		if checksum != self.checksum {
			return Err(ObscuraError::ChecksumMismatch);
		}

		Frame::new(self.shape, symbols)
	}
}

/// Compress one frame into its container form, alongside the size report
/// computed from the representation-kind estimates (not the container bytes).
pub fn encode_frame(frame: &Frame, config: &Config) -> Result<(CompressedFrame, CompressionReport)> {
	let checksum = calculate_checksum(frame.symbols(), config.checksum);
	let original = stats::raw_size(frame);

	let (flags, data, compressed) = match config.method {
		crate::config::Method::Rle => {
			let tokens = rle::encode(frame.symbols())?;
			let estimate = stats::rle_size(&tokens);
			(MethodFlags::RLE, encode_rle_payload(&tokens), estimate)
		}
		crate::config::Method::Huffman => {
			let block = huffman::encode(frame.symbols())?;
			let estimate = stats::huffman_size(&block);
			(MethodFlags::HUFFMAN, encode_huffman_payload(&block)?, estimate)
		}
	};

	Ok((
		CompressedFrame {
			id: 0,
			flags,
			checksum,
			checksum_type: config.checksum,
			shape: frame.shape,
			data,
		},
		CompressionReport::new(original, compressed),
	))
}

// RLE payload: u32 token count, then 5-byte records (u8 symbol, u32 LE run).
fn encode_rle_payload(tokens: &[RunToken]) -> Vec<u8> {
	let mut payload = Vec::with_capacity(4 + tokens.len() * 5);
	payload.extend_from_slice(&(tokens.len() as u32).to_le_bytes());
	for token in tokens {
		payload.push(token.symbol);
		payload.extend_from_slice(&token.run.to_le_bytes());
	}
	payload
}

fn decode_rle_payload(payload: &[u8]) -> Result<Vec<RunToken>> {
	let mut cursor = Cursor::new(payload);
	let count = cursor.read_u32::<LittleEndian>()?;
	let mut tokens = Vec::with_capacity(count as usize);
	for _ in 0..count {
		let symbol = cursor.read_u8()?;
		let run = cursor.read_u32::<LittleEndian>()?;
		if run == 0 {
			return Err(ObscuraError::InvalidFormat("zero-length run".to_string()));
		}
		tokens.push(RunToken { symbol, run });
	}
	Ok(tokens)
}

// Huffman payload: u8 padding (redundant with the packed header byte),
// u16 code count, entries (u8 symbol, u8 code length, MSB-first left-aligned
// code bytes), u32 packed length, packed bytes.
fn encode_huffman_payload(block: &HuffmanBlock) -> Result<Vec<u8>> {
	let mut payload = Vec::new();
	payload.write_u8(block.padding)?;
	payload.write_u16::<LittleEndian>(block.table.len() as u16)?;
	for (symbol, code) in block.table.entries() {
		payload.write_u8(symbol)?;
		payload.write_u8(code.len)?;
		let n = (code.len as usize + 7) / 8;
		let aligned = code.bits << (n * 8 - code.len as usize);
		for i in (0..n).rev() {
			payload.write_u8(((aligned >> (i * 8)) & 0xFF) as u8)?;
		}
	}
	payload.write_u32::<LittleEndian>(block.data.len() as u32)?;
	payload.extend_from_slice(&block.data);
	Ok(payload)
}

fn decode_huffman_payload(payload: &[u8]) -> Result<(CodeTable, Vec<u8>)> {
	let mut cursor = Cursor::new(payload);
	let padding = cursor.read_u8()?;
	let count = cursor.read_u16::<LittleEndian>()?;

	let mut table = CodeTable::empty();
	for _ in 0..count {
		let symbol = cursor.read_u8()?;
		let len = cursor.read_u8()?;
		if len == 0 || len > 96 {
			return Err(ObscuraError::InvalidFormat(format!("code length {} out of range", len)));
		}
		let n = (len as usize + 7) / 8;
		let mut aligned: u128 = 0;
		for _ in 0..n {
			aligned = (aligned << 8) | cursor.read_u8()? as u128;
		}
		let bits = aligned >> (n * 8 - len as usize);
		table.insert(symbol, Code { bits, len });
	}

	let packed_len = cursor.read_u32::<LittleEndian>()? as usize;
	let mut packed = vec![0u8; packed_len];
	cursor.read_exact(&mut packed)?;
	if packed.first() != Some(&padding) {
		return Err(ObscuraError::InvalidFormat(
			"padding field disagrees with the packed header byte".to_string(),
		));
	}
	Ok((table, packed))
}

pub fn write_container<W: Write>(
	writer: &mut W,
	frames: &[CompressedFrame],
	config: &Config,
) -> Result<u64> {
	let mut total_bytes_written = 0u64;

	writer.write_all(MAGIC_NUMBER)?;
	writer.write_u8(VERSION)?;
	let checksum_id = match config.checksum { ChecksumType::Crc32 => 0, ChecksumType::Sha256 => 1 };
	writer.write_u8(checksum_id)?;
	total_bytes_written += 6;

	for frame in frames {
		writer.write_u8(frame.flags.bits())?;
		writer.write_u32::<LittleEndian>(frame.shape.height)?;
		writer.write_u32::<LittleEndian>(frame.shape.width)?;
		writer.write_u8(frame.shape.channels)?;
		writer.write_u64::<LittleEndian>(frame.checksum)?;
		writer.write_u32::<LittleEndian>(frame.data.len() as u32)?;
		writer.write_all(&frame.data)?;
		total_bytes_written += (1 + 4 + 4 + 1 + 8 + 4) + frame.data.len() as u64;
	}
	Ok(total_bytes_written)
}

pub fn read_container<R: Read>(reader: &mut R) -> Result<(Vec<CompressedFrame>, Config)> {
	let mut magic = [0u8; 4];
	reader.read_exact(&mut magic)?;
	if magic != *MAGIC_NUMBER {
		return Err(ObscuraError::InvalidFormat("Invalid magic number".to_string()));
	}

	let version = reader.read_u8()?;
	if version != VERSION {
		return Err(ObscuraError::InvalidFormat(format!("Unsupported version: {}", version)));
	}

	let checksum_id = reader.read_u8()?;
	let checksum_type = match checksum_id {
		0 => ChecksumType::Crc32,
		1 => ChecksumType::Sha256,
		_ => return Err(ObscuraError::InvalidFormat("Unknown checksum type".to_string())),
	};

	let config = Config { checksum: checksum_type, ..Default::default() };
	let mut frames = Vec::new();
	let mut id_counter = 0;

	loop {
		match reader.read_u8() {
			Ok(flags_byte) => {
				let flags = MethodFlags::from_bits_truncate(flags_byte);
				let height = reader.read_u32::<LittleEndian>()?;
				let width = reader.read_u32::<LittleEndian>()?;
				let channels = reader.read_u8()?;
				let checksum = reader.read_u64::<LittleEndian>()?;
				let payload_len = reader.read_u32::<LittleEndian>()?;
				let mut data = vec![0; payload_len as usize];
				reader.read_exact(&mut data)?;
				frames.push(CompressedFrame {
					id: id_counter,
					flags,
					checksum,
					checksum_type,
					shape: Shape::new(height, width, channels),
					data,
				});
				id_counter += 1;
			}
			Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => { break; }
			Err(e) => return Err(e.into()),
		}
	}
	Ok((frames, config))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::Method;

	fn frame_4x4() -> Frame {
		let data: Vec<u8> = (0..16u8).flat_map(|i| [i * 8, i * 8, 255 - i]).collect();
		Frame::new(Shape::new(4, 4, 3), data).unwrap()
	}

	#[test]
	fn test_rle_frame_round_trip() {
		let frame = frame_4x4();
		let config = Config::default().with_method(Method::Rle);
		let (compressed, report) = encode_frame(&frame, &config).unwrap();
		assert_eq!(report.original_bytes, 48);
		assert_eq!(compressed.decompress().unwrap(), frame);
	}

	#[test]
	fn test_huffman_frame_round_trip() {
		let frame = frame_4x4();
		let config = Config::default().with_method(Method::Huffman);
		let (compressed, _) = encode_frame(&frame, &config).unwrap();
		assert_eq!(compressed.decompress().unwrap(), frame);
	}

	#[test]
	fn test_container_round_trip_both_methods() {
		let frame = frame_4x4();
		for method in [Method::Rle, Method::Huffman] {
			let config = Config::default().with_method(method);
			let (compressed, _) = encode_frame(&frame, &config).unwrap();

			let mut buffer = Vec::new();
			let written = write_container(&mut buffer, &[compressed], &config).unwrap();
			assert_eq!(written, buffer.len() as u64);

			let (read_back, _) = read_container(&mut Cursor::new(buffer)).unwrap();
			assert_eq!(read_back.len(), 1);
			assert_eq!(read_back[0].shape, frame.shape);
			assert_eq!(read_back[0].decompress().unwrap(), frame);
		}
	}

	#[test]
	fn test_sha256_checksum_round_trip() {
		let frame = frame_4x4();
		let config = Config::default().with_checksum(ChecksumType::Sha256);
		let (compressed, _) = encode_frame(&frame, &config).unwrap();
		assert_eq!(compressed.decompress().unwrap(), frame);
	}

	#[test]
	fn test_corrupted_payload_detected() {
		let frame = Frame::new(Shape::new(1, 8, 1), vec![1, 1, 2, 2, 3, 3, 4, 4]).unwrap();
		let config = Config::default().with_method(Method::Huffman);
		let (mut compressed, _) = encode_frame(&frame, &config).unwrap();
		// second-to-last byte: the final payload byte can be all padding
		let target = compressed.data.len() - 2;
		compressed.data[target] ^= 0xFF;
		assert!(compressed.decompress().is_err());
	}

	#[test]
	fn test_bad_magic_rejected() {
		let mut cursor = Cursor::new(b"NOPE\x01\x00".to_vec());
		assert!(matches!(
			read_container(&mut cursor),
			Err(ObscuraError::InvalidFormat(_))
		));
	}

	#[test]
	fn test_rle_payload_zero_run_rejected() {
		let mut payload = Vec::new();
		payload.extend_from_slice(&1u32.to_le_bytes());
		payload.push(42);
		payload.extend_from_slice(&0u32.to_le_bytes());
		assert!(decode_rle_payload(&payload).is_err());
	}
}
