use thiserror::Error;

use crate::SurfaceRecord;

pub const SURFACE_FILE_MAGIC: [u8; 4] = *b"DBSF";
pub const SURFACE_FILE_VERSION: u32 = 1;
const HEADER_LEN: usize = 4 + std::mem::size_of::<u32>();

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SurfaceFileDecodeError {
    #[error("unsupported surface file version {0}")]
    UnsupportedVersion(u32),
    #[error("invalid surface file data")]
    InvalidData,
}

pub fn encode_surface_file(data: &SurfaceRecord) -> Vec<u8> {
    let body = bincode::encode_to_vec(data, bincode::config::standard()).unwrap_or_default();
    frame(SURFACE_FILE_MAGIC, SURFACE_FILE_VERSION, &body)
}

pub fn decode_surface_file(payload: &[u8]) -> Result<SurfaceRecord, SurfaceFileDecodeError> {
    let (version, body) =
        split_frame(SURFACE_FILE_MAGIC, payload).ok_or(SurfaceFileDecodeError::InvalidData)?;
    match version {
        1 => bincode::decode_from_slice(body, bincode::config::standard())
            .map(|(data, _)| data)
            .map_err(|_| SurfaceFileDecodeError::InvalidData),
        _ => Err(SurfaceFileDecodeError::UnsupportedVersion(version)),
    }
}

/// Magic, little-endian version, body.
pub(crate) fn frame(magic: [u8; 4], version: u32, body: &[u8]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(HEADER_LEN + body.len());
    payload.extend_from_slice(&magic);
    payload.extend_from_slice(&version.to_le_bytes());
    payload.extend_from_slice(body);
    payload
}

pub(crate) fn split_frame(magic: [u8; 4], payload: &[u8]) -> Option<(u32, &[u8])> {
    if !(payload.len() >= HEADER_LEN && payload.starts_with(&magic)) {
        return None;
    }
    let version = u32::from_le_bytes(payload[magic.len()..HEADER_LEN].try_into().ok()?);
    Some((version, &payload[HEADER_LEN..]))
}
