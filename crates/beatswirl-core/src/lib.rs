//! BeatSwirl Core - Beat-synchronized animation state
//!
//! This crate contains the pure logic layer of BeatSwirl:
//! - Deterministic palette generation from audio content
//! - Beat timeline construction from a detected tempo
//! - The animation clock that gates color changes on beats
//! - Live parameter state and named presets (built-in and user slots)
//!
//! Rendering, audio playback and beat detection live in the host.

#![warn(missing_docs)]

use thiserror::Error;

pub mod clock;
pub mod color;
pub mod logging;
pub mod palette;
pub mod params;
pub mod presets;
pub mod timeline;

// --- Re-exports grouped by category ---

// Colors & Palettes
pub use color::Color;
pub use palette::{generate, seed_from_fingerprint, Palette, MAX_PALETTE_SIZE};

// Timing
pub use clock::{
    select_color_index, AnimationClock, ClockOutcome, ClockState, ColorSelection, RenderCommand,
    RotationIntegrator,
};
pub use timeline::{BeatTimeline, MAX_BEATS};

// Parameters & Presets
pub use params::{builtin_preset, ParameterState, Preset, BUILTIN_PRESETS};
pub use presets::{PresetStore, SlotKey};

// Logging
pub use logging::LogConfig;

/// Core error types
#[derive(Error, Debug)]
pub enum CoreError {
    /// Tempo must be a positive, finite BPM value
    #[error("Invalid tempo: {0} BPM")]
    InvalidTempo(f64),

    /// A tunable was set outside of its valid range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Key is not part of the preset slot alphabet
    #[error("Invalid preset slot: {0:?}")]
    InvalidSlot(String),

    /// I/O error while persisting presets
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::InvalidTempo(-4.0);
        assert_eq!(err.to_string(), "Invalid tempo: -4 BPM");

        let err = CoreError::InvalidSlot("p".to_string());
        assert_eq!(err.to_string(), "Invalid preset slot: \"p\"");
    }
}
