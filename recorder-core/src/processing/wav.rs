//! WAV container encode and decode.
//!
//! Generates standard 44-byte RIFF headers for integer PCM and parses them
//! back for playback. Little-endian throughout.
//!
//! Header layout:
//! ```text
//! [0-3]    "RIFF"
//! [4-7]    file size - 8 (36 + data_size)
//! [8-11]   "WAVE"
//! [12-15]  "fmt "
//! [16-19]  16 (PCM format chunk size)
//! [20-21]  1 (PCM format code)
//! [22-23]  channels
//! [24-27]  sample_rate
//! [28-31]  byte_rate = sample_rate * channels * bit_depth / 8
//! [32-33]  block_align = channels * bit_depth / 8
//! [34-35]  bit_depth
//! [36-39]  "data"
//! [40-43]  data_size
//! ```

use crate::models::error::RecorderError;

/// Size of the standard WAV RIFF header in bytes.
pub const WAV_HEADER_SIZE: usize = 44;

const PCM_FORMAT_TAG: u16 = 1;

/// Format description recovered from a WAV header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavInfo {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    /// Length of the data chunk in bytes.
    pub data_len: usize,
}

impl WavInfo {
    /// Samples in the data chunk (frames × channels).
    pub fn sample_count(&self) -> usize {
        self.data_len / 2
    }

    /// Frames in the data chunk.
    pub fn frame_count(&self) -> usize {
        self.sample_count() / self.channels.max(1) as usize
    }
}

/// Generate a 44-byte WAV header for 16-bit integer PCM.
///
/// `data_size` may be a placeholder; the streaming writer patches the size
/// fields on finalize.
pub fn generate_header(sample_rate: u32, channels: u16, data_size: u32) -> [u8; WAV_HEADER_SIZE] {
    let bit_depth: u16 = 16;
    let byte_rate = sample_rate * channels as u32 * bit_depth as u32 / 8;
    let block_align = channels * bit_depth / 8;
    let chunk_size = 36 + data_size;

    let mut header = [0u8; WAV_HEADER_SIZE];

    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&chunk_size.to_le_bytes());
    header[8..12].copy_from_slice(b"WAVE");

    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&16u32.to_le_bytes());
    header[20..22].copy_from_slice(&PCM_FORMAT_TAG.to_le_bytes());
    header[22..24].copy_from_slice(&channels.to_le_bytes());
    header[24..28].copy_from_slice(&sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&byte_rate.to_le_bytes());
    header[32..34].copy_from_slice(&block_align.to_le_bytes());
    header[34..36].copy_from_slice(&bit_depth.to_le_bytes());

    header[36..40].copy_from_slice(b"data");
    header[40..44].copy_from_slice(&data_size.to_le_bytes());

    header
}

/// Encode a full sample buffer into an in-memory WAV file.
pub fn encode_to_vec(samples: &[i16], sample_rate: u32, channels: u16) -> Vec<u8> {
    let data_size = (samples.len() * 2) as u32;
    let mut out = Vec::with_capacity(WAV_HEADER_SIZE + samples.len() * 2);
    out.extend_from_slice(&generate_header(sample_rate, channels, data_size));
    for &sample in samples {
        out.extend_from_slice(&sample.to_le_bytes());
    }
    out
}

/// Parse a WAV file and return its format plus the decoded i16 samples.
///
/// Walks RIFF chunks so files carrying extra chunks (LIST, fact, ...) still
/// decode; only `fmt ` and `data` are interpreted. Fails with `Decode` on
/// anything malformed, truncated, or not 16-bit integer PCM.
pub fn decode(bytes: &[u8]) -> Result<(WavInfo, Vec<i16>), RecorderError> {
    if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return Err(RecorderError::Decode("not a RIFF/WAVE file".into()));
    }

    let mut fmt: Option<(u16, u16, u32, u16)> = None; // tag, channels, rate, bits
    let mut data: Option<&[u8]> = None;

    let mut offset = 12;
    while offset + 8 <= bytes.len() {
        let id = &bytes[offset..offset + 4];
        let size = u32::from_le_bytes([
            bytes[offset + 4],
            bytes[offset + 5],
            bytes[offset + 6],
            bytes[offset + 7],
        ]) as usize;
        let body_start = offset + 8;
        let body_end = body_start
            .checked_add(size)
            .ok_or_else(|| RecorderError::Decode("chunk size overflow".into()))?;
        if body_end > bytes.len() {
            return Err(RecorderError::Decode(format!(
                "truncated chunk '{}'",
                String::from_utf8_lossy(id)
            )));
        }
        let body = &bytes[body_start..body_end];

        match id {
            b"fmt " => {
                if body.len() < 16 {
                    return Err(RecorderError::Decode("fmt chunk too short".into()));
                }
                let tag = u16::from_le_bytes([body[0], body[1]]);
                let channels = u16::from_le_bytes([body[2], body[3]]);
                let sample_rate = u32::from_le_bytes([body[4], body[5], body[6], body[7]]);
                let bits = u16::from_le_bytes([body[14], body[15]]);
                fmt = Some((tag, channels, sample_rate, bits));
            }
            b"data" => data = Some(body),
            _ => {}
        }

        // Chunks are word-aligned; odd sizes carry a pad byte.
        offset = body_end + (size & 1);
    }

    let (tag, channels, sample_rate, bits) =
        fmt.ok_or_else(|| RecorderError::Decode("missing fmt chunk".into()))?;
    let data = data.ok_or_else(|| RecorderError::Decode("missing data chunk".into()))?;

    if tag != PCM_FORMAT_TAG {
        return Err(RecorderError::Decode(format!(
            "unsupported format tag: {}",
            tag
        )));
    }
    if bits != 16 {
        return Err(RecorderError::Decode(format!(
            "unsupported bit depth: {}",
            bits
        )));
    }
    if channels == 0 || sample_rate == 0 {
        return Err(RecorderError::Decode("degenerate fmt chunk".into()));
    }
    if data.len() % 2 != 0 {
        return Err(RecorderError::Decode("odd data chunk length".into()));
    }

    let samples: Vec<i16> = data
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect();

    let info = WavInfo {
        channels,
        sample_rate,
        bits_per_sample: bits,
        data_len: data.len(),
    };
    Ok((info, samples))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_size_is_44_bytes() {
        let header = generate_header(48000, 2, 0);
        assert_eq!(header.len(), 44);
    }

    #[test]
    fn header_riff_magic() {
        let header = generate_header(48000, 2, 0);
        assert_eq!(&header[0..4], b"RIFF");
        assert_eq!(&header[8..12], b"WAVE");
        assert_eq!(&header[12..16], b"fmt ");
        assert_eq!(&header[36..40], b"data");
    }

    #[test]
    fn header_44100_stereo_fields() {
        let header = generate_header(44100, 2, 9600);

        assert_eq!(u16::from_le_bytes([header[20], header[21]]), 1);
        assert_eq!(u16::from_le_bytes([header[22], header[23]]), 2);
        assert_eq!(
            u32::from_le_bytes([header[24], header[25], header[26], header[27]]),
            44100
        );
        // byte_rate = 44100 * 2 * 2
        assert_eq!(
            u32::from_le_bytes([header[28], header[29], header[30], header[31]]),
            176400
        );
        assert_eq!(u16::from_le_bytes([header[32], header[33]]), 4);
        assert_eq!(u16::from_le_bytes([header[34], header[35]]), 16);
        assert_eq!(
            u32::from_le_bytes([header[40], header[41], header[42], header[43]]),
            9600
        );
        assert_eq!(
            u32::from_le_bytes([header[4], header[5], header[6], header[7]]),
            36 + 9600
        );
    }

    #[test]
    fn encode_decode_round_trip() {
        let samples: Vec<i16> = vec![-32768, -1, 0, 1, 32767, 12345];
        let bytes = encode_to_vec(&samples, 16000, 2);

        let (info, decoded) = decode(&bytes).unwrap();
        assert_eq!(info.channels, 2);
        assert_eq!(info.sample_rate, 16000);
        assert_eq!(info.bits_per_sample, 16);
        assert_eq!(info.frame_count(), 3);
        assert_eq!(decoded, samples);
    }

    #[test]
    fn decode_rejects_garbage() {
        let err = decode(b"definitely not audio").unwrap_err();
        assert!(matches!(err, RecorderError::Decode(_)));
    }

    #[test]
    fn decode_rejects_truncated_data_chunk() {
        let samples = vec![0i16; 100];
        let mut bytes = encode_to_vec(&samples, 44100, 1);
        bytes.truncate(bytes.len() - 10);
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, RecorderError::Decode(_)));
    }

    #[test]
    fn decode_rejects_missing_data_chunk() {
        let bytes = encode_to_vec(&[1, 2, 3], 44100, 1);
        let header_only = &bytes[..36];
        let mut riff = header_only.to_vec();
        // Fix the RIFF size so only the truncated fmt remains plausible.
        let riff_size = (riff.len() - 8) as u32;
        riff[4..8].copy_from_slice(&riff_size.to_le_bytes());
        let err = decode(&riff).unwrap_err();
        assert!(matches!(err, RecorderError::Decode(_)));
    }

    #[test]
    fn decode_rejects_non_pcm_format_tag() {
        let mut bytes = encode_to_vec(&[0, 0], 8000, 1);
        bytes[20..22].copy_from_slice(&3u16.to_le_bytes()); // IEEE float tag
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, RecorderError::Decode(_)));
    }

    #[test]
    fn decode_skips_unknown_chunks() {
        let samples = vec![5i16, -5, 10, -10];
        let canonical = encode_to_vec(&samples, 22050, 1);

        // Rebuild with a LIST chunk between fmt and data.
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&canonical[..36]); // RIFF + fmt
        bytes.extend_from_slice(b"LIST");
        bytes.extend_from_slice(&4u32.to_le_bytes());
        bytes.extend_from_slice(b"INFO");
        bytes.extend_from_slice(&canonical[36..]); // data chunk
        let riff_size = (bytes.len() - 8) as u32;
        bytes[4..8].copy_from_slice(&riff_size.to_le_bytes());

        let (info, decoded) = decode(&bytes).unwrap();
        assert_eq!(info.sample_rate, 22050);
        assert_eq!(decoded, samples);
    }
}
