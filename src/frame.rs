use crate::error::{ObscuraError, Result};

/// Dimensions of one frame: height x width x interleaved channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    pub height: u32,
    pub width: u32,
    pub channels: u8,
}

impl Shape {
    pub fn new(height: u32, width: u32, channels: u8) -> Self {
        Self { height, width, channels }
    }

    /// Total symbol count of the flattened frame.
    pub fn volume(&self) -> usize {
        self.height as usize * self.width as usize * self.channels as usize
    }
}

/// One 8-bit frame. `data` is the row-major, channel-interleaved flattening
/// of the (height, width, channels) grid; the compression engine only ever
/// sees this flattened view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub shape: Shape,
    pub data: Vec<u8>,
}

impl Frame {
    pub fn new(shape: Shape, data: Vec<u8>) -> Result<Self> {
        if data.len() != shape.volume() {
            return Err(ObscuraError::InvalidFormat(format!(
                "frame data length {} does not match shape volume {}",
                data.len(),
                shape.volume()
            )));
        }
        Ok(Self { shape, data })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The flattened symbol stream the codecs operate on.
    pub fn symbols(&self) -> &[u8] {
        &self.data
    }
}

/// Boundary to the external face-obscuring collaborator. Modeled as a pure
/// frame transform; no detector state crosses into the compression core.
pub trait Obscurer: Sync {
    fn obscure(&self, frame: Frame) -> Frame;
}

/// Pass-through obscurer for callers that feed pre-obscured frames.
pub struct Identity;

impl Obscurer for Identity {
    fn obscure(&self, frame: Frame) -> Frame {
        frame
    }
}
