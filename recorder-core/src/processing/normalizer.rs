//! Sample normalization into the canonical 16-bit signed PCM format.
//!
//! Conversions are pure and deterministic. The batch variants extend a
//! caller-owned buffer so a delivered hardware chunk costs one amortized
//! reserve, with no per-sample dispatch in the hot path.

/// Convert an unsigned 16-bit sample by shifting the midpoint to zero.
#[inline]
pub fn u16_to_i16(sample: u16) -> i16 {
    (sample as i32 - 32768) as i16
}

/// Convert a float sample in `[-1.0, 1.0]` by clamping then scaling.
///
/// Out-of-range input is clamped, so `2.0` maps to `i16::MAX` rather than
/// wrapping.
#[inline]
pub fn f32_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16
}

/// Append an i16 chunk unchanged (canonical input is a passthrough).
pub fn extend_from_i16(buffer: &mut Vec<i16>, chunk: &[i16]) {
    buffer.extend_from_slice(chunk);
}

/// Normalize and append a u16 chunk.
pub fn extend_from_u16(buffer: &mut Vec<i16>, chunk: &[u16]) {
    buffer.reserve(chunk.len());
    buffer.extend(chunk.iter().map(|&s| u16_to_i16(s)));
}

/// Normalize and append an f32 chunk.
pub fn extend_from_f32(buffer: &mut Vec<i16>, chunk: &[f32]) {
    buffer.reserve(chunk.len());
    buffer.extend(chunk.iter().map(|&s| f32_to_i16(s)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u16_midpoint_maps_to_zero() {
        assert_eq!(u16_to_i16(32768), 0);
    }

    #[test]
    fn u16_extremes() {
        assert_eq!(u16_to_i16(0), i16::MIN);
        assert_eq!(u16_to_i16(u16::MAX), i16::MAX);
    }

    #[test]
    fn f32_extremes_within_one_lsb() {
        assert_eq!(f32_to_i16(0.0), 0);
        assert_eq!(f32_to_i16(1.0), 32767);
        // -1.0 scales to -32767, within 1 LSB of full-scale negative.
        let negative_full_scale = f32_to_i16(-1.0);
        assert!((negative_full_scale as i32 - i16::MIN as i32).abs() <= 1);
    }

    #[test]
    fn f32_clamps_out_of_range() {
        assert_eq!(f32_to_i16(2.0), i16::MAX);
        assert_eq!(f32_to_i16(-3.0), -i16::MAX);
    }

    #[test]
    fn f32_rounds_rather_than_truncates() {
        // 0.5 * 32767 = 16383.5, rounds to 16384
        assert_eq!(f32_to_i16(0.5), 16384);
    }

    #[test]
    fn i16_passthrough_is_identity() {
        let mut buffer = Vec::new();
        extend_from_i16(&mut buffer, &[-32768, -1, 0, 1, 32767]);
        assert_eq!(buffer, vec![-32768, -1, 0, 1, 32767]);
    }

    #[test]
    fn batch_u16_matches_scalar() {
        let chunk = [0u16, 16384, 32768, 49152, 65535];
        let mut buffer = Vec::new();
        extend_from_u16(&mut buffer, &chunk);
        let expected: Vec<i16> = chunk.iter().map(|&s| u16_to_i16(s)).collect();
        assert_eq!(buffer, expected);
    }

    #[test]
    fn batch_f32_appends_after_existing_samples() {
        let mut buffer = vec![7i16];
        extend_from_f32(&mut buffer, &[0.0, 1.0]);
        assert_eq!(buffer, vec![7, 0, 32767]);
    }

    #[test]
    fn cleared_buffer_reuse_holds_only_latest_chunk() {
        let mut scratch = Vec::new();
        extend_from_f32(&mut scratch, &[1.0, -1.0, 0.25]);
        scratch.clear();
        extend_from_u16(&mut scratch, &[32768, 65535]);
        assert_eq!(scratch, vec![0, 32767]);
    }

    #[test]
    fn normalization_round_trip_within_one_lsb() {
        for &value in &[-1.0f32, -0.5, 0.0, 0.5, 1.0] {
            let normalized = f32_to_i16(value);
            let back = normalized as f32 / i16::MAX as f32;
            let again = f32_to_i16(back);
            assert!((normalized as i32 - again as i32).abs() <= 1);
        }
    }
}
