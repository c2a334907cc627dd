use thiserror::Error;

#[derive(Error, Debug)]
pub enum ObscuraError {
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("input contains no symbols")]
	EmptyInput,

	#[error("decode mismatch: {0}")]
	DecodeMismatch(String),

	#[error("Data integrity check failed: checksum mismatch")]
	ChecksumMismatch,

	#[error("Invalid container format: {0}")]
	InvalidFormat(String),

	#[error("Configuration error: {0}")]
	ConfigError(String),
}

pub type Result<T> = std::result::Result<T, ObscuraError>;
