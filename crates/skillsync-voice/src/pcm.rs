//! PCM sample conversion between platform float frames and the 16-bit wire
//! format.
//!
//! Frames are directional: microphone frames are only ever encoded
//! (float → int16 LE) and agent speech buffers only ever decoded
//! (int16 LE → float). Nothing reinterprets bytes across that boundary.

/// Byte length of the silent frame sent to trigger the agent's greeting.
pub const GREETING_TRIGGER_BYTES: usize = 1024;

/// Encode normalized float samples to 16-bit signed little-endian PCM.
/// Samples are clamped to [-1, 1] before scaling, so 1.0 encodes to 32767
/// rather than overflowing.
pub fn encode_frame(samples: &[f32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        let value = (sample.clamp(-1.0, 1.0) * 32767.0).round() as i16;
        out.extend_from_slice(&value.to_le_bytes());
    }
    out
}

/// Decode 16-bit signed little-endian PCM to normalized float samples.
/// A trailing odd byte is ignored.
pub fn decode_frame(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32768.0)
        .collect()
}

/// A zeroed PCM byte frame of the given length.
pub fn silent_frame(len: usize) -> Vec<u8> {
    vec![0u8; len]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silence_encodes_to_zero_bytes() {
        let encoded = encode_frame(&[0.0; 16]);
        assert_eq!(encoded, vec![0u8; 32]);
    }

    #[test]
    fn full_scale_clamps_to_i16_extremes() {
        let encoded = encode_frame(&[1.0, -1.0, 2.5, -2.5]);
        let values: Vec<i16> = encoded
            .chunks_exact(2)
            .map(|p| i16::from_le_bytes([p[0], p[1]]))
            .collect();
        assert_eq!(values, vec![32767, -32767, 32767, -32767]);
    }

    #[test]
    fn decode_normalizes_to_unit_range() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&i16::MIN.to_le_bytes());
        bytes.extend_from_slice(&0i16.to_le_bytes());
        bytes.extend_from_slice(&16384i16.to_le_bytes());
        let samples = decode_frame(&bytes);
        assert_eq!(samples, vec![-1.0, 0.0, 0.5]);
    }

    #[test]
    fn decode_ignores_trailing_odd_byte() {
        let samples = decode_frame(&[0, 0, 7]);
        assert_eq!(samples.len(), 1);
    }

    #[test]
    fn encode_then_decode_stays_close() {
        let original = [0.25f32, -0.5, 0.75];
        let decoded = decode_frame(&encode_frame(&original));
        for (a, b) in original.iter().zip(decoded.iter()) {
            assert!((a - b).abs() < 1.0 / 32000.0);
        }
    }

    #[test]
    fn silent_frame_is_zeroed() {
        let frame = silent_frame(GREETING_TRIGGER_BYTES);
        assert_eq!(frame.len(), GREETING_TRIGGER_BYTES);
        assert!(frame.iter().all(|&b| b == 0));
    }
}
