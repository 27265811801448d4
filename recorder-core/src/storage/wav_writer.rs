use std::fs::{self, File};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::models::error::RecorderError;
use crate::processing::wav;

/// Streaming WAV file writer.
///
/// Writes a placeholder 44-byte header on open, raw little-endian i16
/// frames as they arrive, and patches the RIFF/data size fields on
/// finalize. Until `finalize()` runs, the header reports a zero-length
/// data chunk, so an interrupted write never yields a file that decodes
/// with phantom content.
pub struct WavFileWriter {
    file_path: PathBuf,
    file: Option<File>,
    total_bytes_written: u64,
    is_open: bool,
}

impl WavFileWriter {
    pub fn new(file_path: PathBuf) -> Self {
        Self {
            file_path,
            file: None,
            total_bytes_written: 0,
            is_open: false,
        }
    }

    /// Create the file (overwriting any existing one) and write the
    /// placeholder header. Destination directory creation is idempotent.
    pub fn open(&mut self, sample_rate: u32, channels: u16) -> Result<(), RecorderError> {
        if self.is_open {
            return Ok(());
        }

        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| RecorderError::io("failed to create output directory", e))?;
        }

        let file = File::create(&self.file_path)
            .map_err(|e| RecorderError::io("failed to create file", e))?;
        self.file = Some(file);

        let header = wav::generate_header(sample_rate, channels, 0);
        self.write_raw(&header)?;
        self.is_open = true;
        Ok(())
    }

    /// Append a chunk of interleaved samples.
    pub fn write_samples(&mut self, samples: &[i16]) -> Result<(), RecorderError> {
        if !self.is_open {
            return Err(RecorderError::Io("file is not open for writing".into()));
        }

        let mut bytes = Vec::with_capacity(samples.len() * 2);
        for &sample in samples {
            bytes.extend_from_slice(&sample.to_le_bytes());
        }
        self.write_raw(&bytes)
    }

    /// Patch the size fields, flush, and close the file.
    pub fn finalize(&mut self) -> Result<(), RecorderError> {
        if !self.is_open {
            return Err(RecorderError::Io("file is not open".into()));
        }

        let file = self.file.as_mut().expect("open writer has a file");
        let data_size = (self.total_bytes_written - wav::WAV_HEADER_SIZE as u64) as u32;

        // RIFF chunk size at offset 4
        file.seek(SeekFrom::Start(4))
            .map_err(|e| RecorderError::io("seek failed", e))?;
        let riff_size = (self.total_bytes_written - 8) as u32;
        file.write_all(&riff_size.to_le_bytes())
            .map_err(|e| RecorderError::io("header patch failed", e))?;

        // data chunk size at offset 40
        file.seek(SeekFrom::Start(40))
            .map_err(|e| RecorderError::io("seek failed", e))?;
        file.write_all(&data_size.to_le_bytes())
            .map_err(|e| RecorderError::io("header patch failed", e))?;

        file.flush()
            .map_err(|e| RecorderError::io("flush failed", e))?;
        self.file = None;
        self.is_open = false;
        Ok(())
    }

    /// Total bytes written so far, header included.
    pub fn bytes_written(&self) -> u64 {
        self.total_bytes_written
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    fn write_raw(&mut self, data: &[u8]) -> Result<(), RecorderError> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| RecorderError::Io("file is not open".into()))?;
        file.write_all(data)
            .map_err(|e| RecorderError::io("write failed", e))?;
        self.total_bytes_written += data.len() as u64;
        Ok(())
    }
}

/// Write a complete sample buffer to `path` in one call.
pub fn write_wav_file(
    path: &Path,
    samples: &[i16],
    sample_rate: u32,
    channels: u16,
) -> Result<(), RecorderError> {
    let mut writer = WavFileWriter::new(path.to_path_buf());
    writer.open(sample_rate, channels)?;
    writer.write_samples(samples)?;
    writer.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::wav;
    use tempfile::tempdir;

    #[test]
    fn written_file_decodes_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("take.wav");
        let samples: Vec<i16> = (0..100).map(|i| i * 100).collect();

        write_wav_file(&path, &samples, 44100, 2).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let (info, decoded) = wav::decode(&bytes).unwrap();
        assert_eq!(info.sample_rate, 44100);
        assert_eq!(info.channels, 2);
        assert_eq!(info.frame_count(), 50);
        assert_eq!(decoded, samples);
    }

    #[test]
    fn finalize_patches_sizes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sizes.wav");

        let mut writer = WavFileWriter::new(path.clone());
        writer.open(48000, 1).unwrap();
        writer.write_samples(&[0i16; 8]).unwrap();
        writer.finalize().unwrap();

        let data = std::fs::read(&path).unwrap();
        assert_eq!(data.len(), 44 + 16);
        let riff_size = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
        assert_eq!(riff_size, 36 + 16);
        let data_size = u32::from_le_bytes([data[40], data[41], data[42], data[43]]);
        assert_eq!(data_size, 16);
    }

    #[test]
    fn unfinalized_file_reports_empty_data() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.wav");

        let mut writer = WavFileWriter::new(path.clone());
        writer.open(48000, 1).unwrap();
        writer.write_samples(&[42i16; 1000]).unwrap();
        drop(writer); // no finalize

        let data = std::fs::read(&path).unwrap();
        let data_size = u32::from_le_bytes([data[40], data[41], data[42], data[43]]);
        assert_eq!(data_size, 0);
    }

    #[test]
    fn creates_missing_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("take.wav");
        write_wav_file(&path, &[1, 2, 3], 16000, 1).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn write_before_open_fails() {
        let mut writer = WavFileWriter::new(PathBuf::from("nowhere.wav"));
        assert!(matches!(
            writer.write_samples(&[0]),
            Err(RecorderError::Io(_))
        ));
    }

    #[test]
    fn overwrites_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("take.wav");
        write_wav_file(&path, &[9i16; 500], 44100, 1).unwrap();
        write_wav_file(&path, &[1, 2], 8000, 1).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let (info, decoded) = wav::decode(&bytes).unwrap();
        assert_eq!(info.sample_rate, 8000);
        assert_eq!(decoded, vec![1, 2]);
    }
}
