// Copyright (c) 2026 frymon contributors
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/frymon/frymon

//! Modbus frame construction and decoding
//!
//! Pure functions shared by both protocol variants: RTU (binary, CRC-16)
//! and ASCII (colon-framed hex, LRC). The sensor register map:
//!
//! - 0x0000..0x0005: X, Y, Z acceleration (big-endian f32, 2 registers each)
//! - 0x0006..0x0007: temperature (f32)
//! - 0x0008..0x0009: dominant frequency (f32)

use super::TransportError;

/// Read-holding-registers function code.
pub const FN_READ_HOLDING: u8 = 0x03;

/// Start register for the three acceleration axes.
pub const REG_ACCEL: u16 = 0x0000;
/// Register count for the three acceleration axes (3 x f32).
pub const REG_ACCEL_COUNT: u16 = 6;
/// Start register for sensor temperature.
pub const REG_TEMPERATURE: u16 = 0x0006;
/// Start register for dominant frequency.
pub const REG_FREQUENCY: u16 = 0x0008;
/// Register count for a single f32 value.
pub const REG_F32_COUNT: u16 = 2;

/// Modbus CRC-16 (polynomial 0xA001, initial value 0xFFFF).
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &byte in data {
        crc ^= byte as u16;
        for _ in 0..8 {
            if crc & 0x0001 != 0 {
                crc = (crc >> 1) ^ 0xA001;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}

/// Modbus LRC: two's complement of the byte sum.
pub fn lrc(data: &[u8]) -> u8 {
    let sum = data.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    sum.wrapping_neg()
}

/// Build a Modbus RTU read-holding-registers request.
///
/// Layout: `[slave][0x03][addr_hi][addr_lo][count_hi][count_lo][crc_lo][crc_hi]`
pub fn build_rtu_request(slave: u8, start: u16, count: u16) -> Vec<u8> {
    let mut frame = Vec::with_capacity(8);
    frame.push(slave);
    frame.push(FN_READ_HOLDING);
    frame.extend_from_slice(&start.to_be_bytes());
    frame.extend_from_slice(&count.to_be_bytes());
    let crc = crc16(&frame);
    frame.extend_from_slice(&crc.to_le_bytes());
    frame
}

/// Parse a Modbus RTU response, returning the register data bytes.
///
/// Layout: `[slave][func][byte_count][data...][crc_lo][crc_hi]`
pub fn parse_rtu_response(slave: u8, count: u16, frame: &[u8]) -> Result<Vec<u8>, TransportError> {
    if frame.len() < 5 {
        return Err(TransportError::Decode(format!(
            "short frame: {} bytes",
            frame.len()
        )));
    }

    let (body, tail) = frame.split_at(frame.len() - 2);
    let received = u16::from_le_bytes([tail[0], tail[1]]);
    let computed = crc16(body);
    if received != computed {
        return Err(TransportError::Decode(format!(
            "CRC mismatch: got {:#06x}, computed {:#06x}",
            received, computed
        )));
    }

    parse_response_body(slave, count, body)
}

/// Build a Modbus ASCII request: `:` + hex payload + hex LRC + CRLF.
pub fn build_ascii_request(slave: u8, start: u16, count: u16) -> Vec<u8> {
    let mut payload = Vec::with_capacity(6);
    payload.push(slave);
    payload.push(FN_READ_HOLDING);
    payload.extend_from_slice(&start.to_be_bytes());
    payload.extend_from_slice(&count.to_be_bytes());
    payload.push(lrc(&payload));

    let mut frame = Vec::with_capacity(3 + payload.len() * 2);
    frame.push(b':');
    for byte in payload {
        frame.extend_from_slice(format!("{:02X}", byte).as_bytes());
    }
    frame.extend_from_slice(b"\r\n");
    frame
}

/// Parse a Modbus ASCII response, returning the register data bytes.
pub fn parse_ascii_response(
    slave: u8,
    count: u16,
    frame: &[u8],
) -> Result<Vec<u8>, TransportError> {
    if frame.first() != Some(&b':') {
        return Err(TransportError::Decode("missing ':' frame start".into()));
    }
    let hex = frame[1..]
        .strip_suffix(b"\r\n")
        .or_else(|| frame[1..].strip_suffix(b"\n"))
        .unwrap_or(&frame[1..]);
    if hex.len() < 2 || hex.len() % 2 != 0 {
        return Err(TransportError::Decode(format!(
            "odd or empty hex payload: {} chars",
            hex.len()
        )));
    }

    let mut raw = Vec::with_capacity(hex.len() / 2);
    for pair in hex.chunks_exact(2) {
        let text = std::str::from_utf8(pair)
            .map_err(|_| TransportError::Decode("non-ASCII byte in hex payload".into()))?;
        let byte = u8::from_str_radix(text, 16)
            .map_err(|_| TransportError::Decode(format!("invalid hex pair {:?}", text)))?;
        raw.push(byte);
    }

    // A valid frame's bytes, LRC included, sum to zero.
    let sum = raw.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    if sum != 0 {
        return Err(TransportError::Decode("LRC mismatch".into()));
    }

    parse_response_body(slave, count, &raw[..raw.len() - 1])
}

/// Shared body validation: `[slave][func][byte_count][data...]`.
fn parse_response_body(slave: u8, count: u16, body: &[u8]) -> Result<Vec<u8>, TransportError> {
    if body.len() < 3 {
        return Err(TransportError::Decode(format!(
            "short body: {} bytes",
            body.len()
        )));
    }
    if body[0] != slave {
        return Err(TransportError::Decode(format!(
            "unexpected slave address {} (expected {})",
            body[0], slave
        )));
    }
    if body[1] & 0x80 != 0 {
        return Err(TransportError::Decode(format!(
            "Modbus exception code {:#04x}",
            body.get(2).copied().unwrap_or(0)
        )));
    }
    if body[1] != FN_READ_HOLDING {
        return Err(TransportError::Decode(format!(
            "unexpected function code {:#04x}",
            body[1]
        )));
    }

    let byte_count = body[2] as usize;
    if byte_count != count as usize * 2 || body.len() != 3 + byte_count {
        return Err(TransportError::Decode(format!(
            "bad byte count: {} (expected {})",
            byte_count,
            count * 2
        )));
    }

    Ok(body[3..].to_vec())
}

/// Decode big-endian f32 values from register data bytes.
pub fn decode_registers_f32(data: &[u8]) -> Result<Vec<f32>, TransportError> {
    if data.len() % 4 != 0 {
        return Err(TransportError::Decode(format!(
            "register data not f32-aligned: {} bytes",
            data.len()
        )));
    }
    Ok(data
        .chunks_exact(4)
        .map(|c| f32::from_be_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}
