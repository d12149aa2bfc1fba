//! Track descriptor
//!
//! Beat detection happens upstream; the host is handed a TOML descriptor
//! with the detected tempo and the path of the audio file:
//!
//! ```toml
//! [track]
//! audio = "june.wav"
//! sample_rate = 22050
//! tempo_bpm = 120.0
//! duration_sec = 180.0
//! ```

use anyhow::{Context, Result};
use beatswirl_core::BeatTimeline;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct TrackFile {
    track: TrackInfo,
}

/// Analysis results for one track
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrackInfo {
    /// Audio file, relative to the descriptor
    pub audio: PathBuf,
    pub sample_rate: u32,
    pub tempo_bpm: f64,
    pub duration_sec: f64,
}

/// A loaded track: analysis plus the raw audio bytes
#[derive(Debug, Clone)]
pub struct Track {
    pub info: TrackInfo,
    pub audio: Vec<u8>,
}

impl TrackInfo {
    pub fn from_toml(content: &str) -> Result<Self> {
        let file: TrackFile = toml::from_str(content)?;
        Ok(file.track)
    }

    /// Beat grid for this track. Fails on a non-positive tempo.
    pub fn timeline(&self) -> Result<BeatTimeline> {
        BeatTimeline::build(self.tempo_bpm, self.duration_sec)
            .with_context(|| format!("Cannot build beat timeline for {:?}", self.audio))
    }
}

impl Track {
    /// Read a descriptor and the audio file it points at
    pub fn load(descriptor: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(descriptor)
            .with_context(|| format!("Failed to read track descriptor: {:?}", descriptor))?;
        let mut info = TrackInfo::from_toml(&content)
            .with_context(|| format!("Failed to parse track descriptor: {:?}", descriptor))?;

        if info.audio.is_relative() {
            if let Some(dir) = descriptor.parent() {
                info.audio = dir.join(&info.audio);
            }
        }

        let audio = std::fs::read(&info.audio)
            .with_context(|| format!("Failed to read audio file: {:?}", info.audio))?;
        tracing::info!(
            "Loaded track {:?}: {} bytes, {} Hz, {} BPM, {:.1}s",
            info.audio,
            audio.len(),
            info.sample_rate,
            info.tempo_bpm,
            info.duration_sec
        );

        Ok(Self { info, audio })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beatswirl_core::CoreError;
    use tempfile::tempdir;

    const DESCRIPTOR: &str = r#"
        [track]
        audio = "june.wav"
        sample_rate = 22050
        tempo_bpm = 120.0
        duration_sec = 10.0
    "#;

    #[test]
    fn test_load_resolves_audio_next_to_descriptor() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("june.wav"), b"RIFFdata").unwrap();
        let descriptor = dir.path().join("june.toml");
        std::fs::write(&descriptor, DESCRIPTOR).unwrap();

        let track = Track::load(&descriptor).unwrap();
        assert_eq!(track.audio, b"RIFFdata");
        assert_eq!(track.info.audio, dir.path().join("june.wav"));
        assert_eq!(track.info.sample_rate, 22050);
        assert_eq!(track.info.timeline().unwrap().len(), 21);
    }

    #[test]
    fn test_missing_audio_is_error() {
        let dir = tempdir().unwrap();
        let descriptor = dir.path().join("june.toml");
        std::fs::write(&descriptor, DESCRIPTOR).unwrap();
        assert!(Track::load(&descriptor).is_err());
    }

    #[test]
    fn test_zero_tempo_is_fatal() {
        let info = TrackInfo::from_toml(&DESCRIPTOR.replace("120.0", "0.0")).unwrap();
        let err = info.timeline().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::InvalidTempo(_))
        ));
    }
}
