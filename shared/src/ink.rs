//! Codec for freehand drawings. Surfaces store drawings as opaque bytes;
//! only ink capture and rendering look inside.

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::surface_format::{frame, split_frame};
use crate::Point;

pub const INK_MAGIC: [u8; 4] = *b"DBIK";
pub const INK_VERSION: u32 = 1;

/// One pen stroke. Points are normalized to the container.
#[derive(Serialize, Deserialize, Encode, Decode, Clone, Debug, PartialEq)]
pub struct InkStroke {
    pub color: String,
    pub size: f32,
    pub points: Vec<Point>,
}

#[derive(Serialize, Deserialize, Encode, Decode, Clone, Debug, Default, PartialEq)]
pub struct InkDrawing {
    pub strokes: Vec<InkStroke>,
}

impl InkDrawing {
    pub fn is_empty(&self) -> bool {
        self.strokes.iter().all(|stroke| stroke.points.is_empty())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InkDecodeError {
    #[error("unsupported ink version {0}")]
    UnsupportedVersion(u32),
    #[error("invalid ink data")]
    InvalidData,
}

pub fn encode_ink(drawing: &InkDrawing) -> Vec<u8> {
    let body = bincode::encode_to_vec(drawing, bincode::config::standard()).unwrap_or_default();
    frame(INK_MAGIC, INK_VERSION, &body)
}

pub fn decode_ink(payload: &[u8]) -> Result<InkDrawing, InkDecodeError> {
    let (version, body) = split_frame(INK_MAGIC, payload).ok_or(InkDecodeError::InvalidData)?;
    match version {
        1 => bincode::decode_from_slice(body, bincode::config::standard())
            .map(|(drawing, _)| drawing)
            .map_err(|_| InkDecodeError::InvalidData),
        _ => Err(InkDecodeError::UnsupportedVersion(version)),
    }
}
