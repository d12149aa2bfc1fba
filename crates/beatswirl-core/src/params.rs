//! Parameter State and Presets
//!
//! `ParameterState` holds the live tunables together with the palette they
//! imply. The palette size and the palette itself only change together,
//! so every mutation goes through a method that regenerates the palette.

use crate::palette::{generate, Palette, MAX_PALETTE_SIZE};
use crate::{CoreError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Snapshot of the tunables. The palette is never stored, it is rebuilt
/// from the current audio when a preset is applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    /// Degrees of rotation added per frame
    pub rotation_speed: f64,
    /// Beat rate scale, must be > 0
    pub beat_multiplier: f64,
    /// Number of palette colors, `1..=MAX_PALETTE_SIZE`
    #[serde(rename = "num_colors")]
    pub palette_size: usize,
}

impl Preset {
    /// Create a preset
    pub const fn new(rotation_speed: f64, beat_multiplier: f64, palette_size: usize) -> Self {
        Self {
            rotation_speed,
            beat_multiplier,
            palette_size,
        }
    }

    /// Check that the preset can be applied without breaking state invariants
    pub fn validate(&self) -> Result<()> {
        if !self.rotation_speed.is_finite() {
            return Err(CoreError::InvalidParameter(format!(
                "rotation speed must be finite, got {}",
                self.rotation_speed
            )));
        }
        validate_beat_multiplier(self.beat_multiplier)?;
        if !(1..=MAX_PALETTE_SIZE).contains(&self.palette_size) {
            return Err(CoreError::InvalidParameter(format!(
                "palette size must be in 1..={}, got {}",
                MAX_PALETTE_SIZE, self.palette_size
            )));
        }
        Ok(())
    }
}

impl Default for Preset {
    fn default() -> Self {
        BUILTIN_PRESETS[2]
    }
}

/// Compiled-in presets, addressed by index
pub const BUILTIN_PRESETS: [Preset; 3] = [
    // Strobe: very fast spin, eight color changes per beat
    Preset::new(235_929.6, 8.0, 60),
    // Slightly faster spin than the defaults
    Preset::new(1.1, 1.0, 6),
    // Defaults
    Preset::new(0.9, 1.0, 6),
];

/// Look up a built-in preset
pub fn builtin_preset(index: usize) -> Result<Preset> {
    BUILTIN_PRESETS.get(index).copied().ok_or_else(|| {
        CoreError::InvalidParameter(format!(
            "no built-in preset {} (have {})",
            index,
            BUILTIN_PRESETS.len()
        ))
    })
}

fn validate_beat_multiplier(value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(CoreError::InvalidParameter(format!(
            "beat multiplier must be > 0, got {}",
            value
        )))
    }
}

/// Live tunables plus the derived palette
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterState {
    rotation_speed: f64,
    beat_multiplier: f64,
    palette_size: usize,
    palette: Palette,
}

impl ParameterState {
    /// Build state from a preset, generating the palette from `fingerprint`
    pub fn new(fingerprint: &[u8], preset: &Preset) -> Result<Self> {
        preset.validate()?;
        Ok(Self {
            rotation_speed: preset.rotation_speed,
            beat_multiplier: preset.beat_multiplier,
            palette_size: preset.palette_size,
            palette: generate(fingerprint, preset.palette_size)?,
        })
    }

    /// Degrees of rotation per frame
    pub fn rotation_speed(&self) -> f64 {
        self.rotation_speed
    }

    /// Beat rate scale
    pub fn beat_multiplier(&self) -> f64 {
        self.beat_multiplier
    }

    /// Number of palette colors
    pub fn palette_size(&self) -> usize {
        self.palette_size
    }

    /// Current palette, always `palette_size` long
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Multiply the rotation speed. Rejects results that are not finite.
    pub fn scale_rotation_speed(&mut self, factor: f64) -> Result<f64> {
        let next = self.rotation_speed * factor;
        if !next.is_finite() {
            return Err(CoreError::InvalidParameter(format!(
                "rotation speed would become {}",
                next
            )));
        }
        self.rotation_speed = next;
        debug!("Rotation speed -> {}", next);
        Ok(next)
    }

    /// Multiply the beat multiplier. Rejects results that are not > 0.
    pub fn scale_beat_multiplier(&mut self, factor: f64) -> Result<f64> {
        let next = self.beat_multiplier * factor;
        validate_beat_multiplier(next)?;
        self.beat_multiplier = next;
        debug!("Beat multiplier -> {}", next);
        Ok(next)
    }

    /// Grow or shrink the palette by `delta`, clamping the size to
    /// `1..=MAX_PALETTE_SIZE`, and regenerate it. Returns the new size.
    pub fn resize_palette(&mut self, fingerprint: &[u8], delta: isize) -> Result<usize> {
        let next = self
            .palette_size
            .saturating_add_signed(delta)
            .clamp(1, MAX_PALETTE_SIZE);
        self.set_palette_size(fingerprint, next)?;
        Ok(next)
    }

    /// Set the palette size and regenerate the palette
    pub fn set_palette_size(&mut self, fingerprint: &[u8], size: usize) -> Result<()> {
        // Generate first so a failure leaves the old size and palette in place
        let palette = generate(fingerprint, size)?;
        self.palette_size = size;
        self.palette = palette;
        debug!("Palette size -> {}", size);
        Ok(())
    }

    /// Replace all tunables with a preset and regenerate the palette
    pub fn apply_preset(&mut self, fingerprint: &[u8], preset: &Preset) -> Result<()> {
        *self = Self::new(fingerprint, preset)?;
        Ok(())
    }

    /// Current tunables as a preset
    pub fn snapshot(&self) -> Preset {
        Preset::new(self.rotation_speed, self.beat_multiplier, self.palette_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const AUDIO: &[u8] = b"RIFF....WAVEfmt ";

    #[test]
    fn test_default_preset_is_builtin_defaults() {
        let preset = Preset::default();
        assert_eq!(preset, Preset::new(0.9, 1.0, 6));
    }

    #[test]
    fn test_builtin_lookup() {
        assert_eq!(builtin_preset(0).unwrap().palette_size, 60);
        assert!(builtin_preset(3).is_err());
    }

    #[test]
    fn test_new_state_palette_matches_size() {
        let state = ParameterState::new(AUDIO, &Preset::default()).unwrap();
        assert_eq!(state.palette().len(), state.palette_size());
        assert_eq!(state.palette(), &generate(AUDIO, 6).unwrap());
    }

    #[test]
    fn test_scale_beat_multiplier_rejects_zero() {
        let mut state = ParameterState::new(AUDIO, &Preset::default()).unwrap();
        assert!(state.scale_beat_multiplier(0.0).is_err());
        assert_eq!(state.beat_multiplier(), 1.0);
        assert_eq!(state.scale_beat_multiplier(2.0).unwrap(), 2.0);
    }

    #[test]
    fn test_scale_rotation_rejects_overflow() {
        let mut state = ParameterState::new(AUDIO, &Preset::new(f64::MAX, 1.0, 1)).unwrap();
        assert!(state.scale_rotation_speed(2.0).is_err());
        assert_eq!(state.rotation_speed(), f64::MAX);
    }

    #[test]
    fn test_resize_clamps_to_one() {
        let mut state = ParameterState::new(AUDIO, &Preset::default()).unwrap();
        assert_eq!(state.resize_palette(AUDIO, -6).unwrap(), 1);
        assert_eq!(state.resize_palette(AUDIO, -6).unwrap(), 1);
        assert_eq!(state.palette().len(), 1);
        assert_eq!(state.resize_palette(AUDIO, 6).unwrap(), 7);
        assert_eq!(state.palette().len(), 7);
    }

    #[test]
    fn test_resize_clamps_to_max() {
        let mut state = ParameterState::new(AUDIO, &Preset::default()).unwrap();
        assert_eq!(state.resize_palette(AUDIO, isize::MAX).unwrap(), MAX_PALETTE_SIZE);
        assert_eq!(state.palette().len(), MAX_PALETTE_SIZE);
        assert_eq!(state.resize_palette(AUDIO, 6).unwrap(), MAX_PALETTE_SIZE);
    }

    #[test]
    fn test_oversized_preset_rejected() {
        let huge = Preset::new(1.0, 1.0, 4_000_000_000_000_000_000);
        assert!(matches!(huge.validate(), Err(CoreError::InvalidParameter(_))));
        assert!(ParameterState::new(AUDIO, &huge).is_err());

        let mut state = ParameterState::new(AUDIO, &Preset::default()).unwrap();
        let before = state.clone();
        assert!(state.apply_preset(AUDIO, &huge).is_err());
        assert_eq!(state, before);
        assert!(Preset::new(1.0, 1.0, MAX_PALETTE_SIZE).validate().is_ok());
    }

    #[test]
    fn test_apply_invalid_preset_keeps_state() {
        let mut state = ParameterState::new(AUDIO, &Preset::default()).unwrap();
        let before = state.clone();
        assert!(state.apply_preset(AUDIO, &Preset::new(1.0, -1.0, 6)).is_err());
        assert!(state.apply_preset(AUDIO, &Preset::new(1.0, 1.0, 0)).is_err());
        assert_eq!(state, before);
    }

    #[test]
    fn test_preset_json_field_names() {
        let json = serde_json::to_string(&Preset::new(2.0, 4.0, 12)).unwrap();
        assert!(json.contains("\"rotation_speed\":2.0"));
        assert!(json.contains("\"beat_multiplier\":4.0"));
        assert!(json.contains("\"num_colors\":12"));
    }

    proptest! {
        #[test]
        fn prop_palette_size_invariant(deltas in proptest::collection::vec(-13isize..13, 0..40)) {
            let mut state = ParameterState::new(AUDIO, &Preset::default()).unwrap();
            for delta in deltas {
                state.resize_palette(AUDIO, delta).unwrap();
                prop_assert!(state.palette_size() >= 1);
                prop_assert_eq!(state.palette().len(), state.palette_size());
            }
        }
    }
}
