//! ADTS (Audio Data Transport Stream) framing.
//!
//! Elementary AAC streams often arrive with a 7 or 9 byte ADTS header in front
//! of every access unit. The engine decodes raw `raw_data_block()` payloads, so
//! the header is parsed, checked against the unit, and stripped before decode.
//!
//! Header layout (ISO/IEC 13818-7 / 14496-3):
//! ```text
//! syncword 12 | id 1 | layer 2 | protection_absent 1
//! profile 2 | sampling_frequency_index 4 | private 1 | channel_configuration 3
//! original 1 | home 1 | copyright_id_bit 1 | copyright_id_start 1
//! frame_length 13 | buffer_fullness 11 | raw_data_blocks - 1 : 2
//! [crc 16 when protection_absent == 0]
//! ```

use super::asc::sample_rate_from_index;
use super::engine::EngineError;

pub const ADTS_HEADER_LEN: usize = 7;
pub const ADTS_HEADER_LEN_CRC: usize = 9;

/// Parsed ADTS header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdtsHeader {
    /// MPEG-4 audio object type (profile + 1), 2 = AAC-LC
    pub object_type: u8,
    pub sample_rate_index: u8,
    pub sample_rate: u32,
    pub channel_config: u8,
    /// Whole frame length in bytes, header included
    pub frame_length: usize,
    pub header_length: usize,
    pub raw_data_blocks: u8,
}

impl AdtsHeader {
    pub fn payload_length(&self) -> usize {
        self.frame_length - self.header_length
    }
}

/// True if `data` starts with the ADTS syncword.
pub fn has_sync(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0xFF && (data[1] & 0xF0) == 0xF0
}

/// Parse the header at the start of `data`.
pub fn parse_header(data: &[u8]) -> Result<AdtsHeader, EngineError> {
    if data.len() < ADTS_HEADER_LEN {
        return Err(EngineError::InvalidData(format!(
            "adts: header truncated ({} bytes)",
            data.len()
        )));
    }
    if !has_sync(data) {
        return Err(EngineError::InvalidData("adts: missing syncword".into()));
    }

    let layer = (data[1] >> 1) & 0x03;
    if layer != 0 {
        return Err(EngineError::InvalidData(format!("adts: invalid layer {}", layer)));
    }
    let protection_absent = data[1] & 0x01 == 1;

    let object_type = ((data[2] >> 6) & 0x03) + 1;
    let sample_rate_index = (data[2] >> 2) & 0x0F;
    let sample_rate = sample_rate_from_index(sample_rate_index).ok_or_else(|| {
        EngineError::InvalidData(format!(
            "adts: reserved sampling frequency index {}",
            sample_rate_index
        ))
    })?;
    let channel_config = ((data[2] & 0x01) << 2) | ((data[3] >> 6) & 0x03);

    let frame_length = (((data[3] & 0x03) as usize) << 11)
        | ((data[4] as usize) << 3)
        | ((data[5] as usize) >> 5);
    let raw_data_blocks = (data[6] & 0x03) + 1;

    let header_length = if protection_absent {
        ADTS_HEADER_LEN
    } else {
        ADTS_HEADER_LEN_CRC
    };
    if frame_length < header_length {
        return Err(EngineError::InvalidData(format!(
            "adts: frame length {} shorter than header",
            frame_length
        )));
    }

    Ok(AdtsHeader {
        object_type,
        sample_rate_index,
        sample_rate,
        channel_config,
        frame_length,
        header_length,
        raw_data_blocks,
    })
}

/// Strip an ADTS header from a single access unit.
///
/// Units without a syncword are returned unchanged (raw AAC). The header must
/// describe exactly one raw data block that fits inside `unit`.
pub fn strip_header(unit: &[u8]) -> Result<(Option<AdtsHeader>, &[u8]), EngineError> {
    if !has_sync(unit) {
        return Ok((None, unit));
    }

    let header = parse_header(unit)?;
    if header.raw_data_blocks != 1 {
        return Err(EngineError::Unsupported(format!(
            "adts: {} raw data blocks per frame",
            header.raw_data_blocks
        )));
    }
    if header.frame_length > unit.len() {
        return Err(EngineError::InvalidData(format!(
            "adts: frame length {} exceeds unit size {}",
            header.frame_length,
            unit.len()
        )));
    }

    Ok((Some(header), &unit[header.header_length..header.frame_length]))
}
