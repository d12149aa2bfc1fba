//! Beat Timeline
//!
//! Evenly spaced beat offsets derived from a detected tempo.

use crate::{CoreError, Result};

/// Beat offsets in seconds from track start, strictly increasing
#[derive(Debug, Clone, PartialEq)]
pub struct BeatTimeline {
    tempo_bpm: f64,
    duration_sec: f64,
    beat_duration: f64,
    beats: Vec<f64>,
}

/// Most beats a timeline may hold
pub const MAX_BEATS: usize = 1_000_000;

impl BeatTimeline {
    /// Build the timeline `0, d, 2d, ...` up to and including the last beat
    /// at or before `duration_sec`, where `d = 60 / tempo_bpm`.
    pub fn build(tempo_bpm: f64, duration_sec: f64) -> Result<Self> {
        if !tempo_bpm.is_finite() || tempo_bpm <= 0.0 {
            return Err(CoreError::InvalidTempo(tempo_bpm));
        }
        if !duration_sec.is_finite() || duration_sec < 0.0 {
            return Err(CoreError::InvalidParameter(format!(
                "track duration must be >= 0 seconds, got {}",
                duration_sec
            )));
        }

        let beat_duration = 60.0 / tempo_bpm;
        let beat_count = (duration_sec / beat_duration).floor() + 1.0;
        if beat_count > MAX_BEATS as f64 {
            return Err(CoreError::InvalidParameter(format!(
                "{} BPM over {} seconds gives more than {} beats",
                tempo_bpm, duration_sec, MAX_BEATS
            )));
        }
        let last = beat_count as usize - 1;
        // Rounding in `i * beat_duration` must not push the last beat past the end
        let beats = (0..=last)
            .map(|i| i as f64 * beat_duration)
            .take_while(|&beat| beat <= duration_sec)
            .collect();

        Ok(Self {
            tempo_bpm,
            duration_sec,
            beat_duration,
            beats,
        })
    }

    /// Beat offsets in seconds
    pub fn beats(&self) -> &[f64] {
        &self.beats
    }

    /// Seconds per beat at the detected tempo
    pub fn beat_duration(&self) -> f64 {
        self.beat_duration
    }

    /// Detected tempo
    pub fn tempo_bpm(&self) -> f64 {
        self.tempo_bpm
    }

    /// Track duration the timeline spans
    pub fn duration(&self) -> f64 {
        self.duration_sec
    }

    /// Number of beats
    pub fn len(&self) -> usize {
        self.beats.len()
    }

    /// Never true for a built timeline (beat 0 is always present)
    pub fn is_empty(&self) -> bool {
        self.beats.is_empty()
    }
}
