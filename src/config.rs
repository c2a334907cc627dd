use crate::error::ObscuraError;
use std::str::FromStr;

/// Which lossless scheme to apply to a frame's flattened pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Rle,
    Huffman,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumType {
    Crc32,
    Sha256,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub method: Method,
    pub checksum: ChecksumType,
    pub threads: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            method: Method::Huffman,
            checksum: ChecksumType::Crc32,
            threads: num_cpus::get(),
        }
    }
}

impl Config {
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_checksum(mut self, checksum: ChecksumType) -> Self {
        self.checksum = checksum;
        self
    }
}

impl FromStr for Method {
    type Err = ObscuraError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rle" => Ok(Method::Rle),
            "huffman" => Ok(Method::Huffman),
            _ => Err(ObscuraError::ConfigError(format!("Invalid method: {}", s))),
        }
    }
}

impl FromStr for ChecksumType {
    type Err = ObscuraError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "crc32" => Ok(ChecksumType::Crc32),
            "sha256" => Ok(ChecksumType::Sha256),
            _ => Err(ObscuraError::ConfigError(format!("Invalid checksum: {}", s))),
        }
    }
}
