//! Palette Generator
//!
//! Derives an ordered list of colors from the raw bytes of an audio file.
//! The SHA-256 digest of the bytes seeds a `StdRng`, which then draws one
//! RGB triple per palette entry. Identical bytes always give identical
//! palettes for a given `rand` release.
//!
//! Resizing a palette regenerates it from scratch: a palette of 12 is not
//! an extension of the palette of 6 for the same track.

use crate::color::Color;
use crate::{CoreError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sha2::{Digest, Sha256};

/// Ordered colors plus their element-wise complements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Color>,
    inverted: Vec<Color>,
}

impl Palette {
    /// Build a palette from explicit colors. Fails on an empty list.
    pub fn from_colors(colors: Vec<Color>) -> Result<Self> {
        if colors.is_empty() {
            return Err(CoreError::InvalidParameter(
                "palette needs at least one color".to_string(),
            ));
        }
        let inverted = colors.iter().map(|c| c.invert()).collect();
        Ok(Self { colors, inverted })
    }

    /// Number of entries (never zero)
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always false, a palette holds at least one color
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Colors in draw order
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Inverted colors, same order as [`Palette::colors`]
    pub fn inverted(&self) -> &[Color] {
        &self.inverted
    }

    /// Color for the primary display region
    pub fn primary(&self, index: usize) -> Option<Color> {
        self.colors.get(index).copied()
    }

    /// Color for the secondary display region
    pub fn secondary(&self, index: usize) -> Option<Color> {
        self.inverted.get(index).copied()
    }

    /// `#rrggbb` strings, for diagnostics
    pub fn hex_colors(&self) -> Vec<String> {
        self.colors.iter().map(|c| c.to_hex()).collect()
    }
}

/// Largest palette `generate` will build
pub const MAX_PALETTE_SIZE: usize = 4096;

/// Seed derived from the first 8 bytes (big-endian) of the SHA-256 digest
pub fn seed_from_fingerprint(fingerprint: &[u8]) -> u64 {
    let digest = Sha256::digest(fingerprint);
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(prefix)
}

/// Generate a palette of `size` colors from audio bytes
pub fn generate(fingerprint: &[u8], size: usize) -> Result<Palette> {
    if size == 0 {
        return Err(CoreError::InvalidParameter(
            "palette size must be at least 1".to_string(),
        ));
    }
    if size > MAX_PALETTE_SIZE {
        return Err(CoreError::InvalidParameter(format!(
            "palette size must be at most {}, got {}",
            MAX_PALETTE_SIZE, size
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed_from_fingerprint(fingerprint));
    let colors = (0..size)
        .map(|_| {
            let r: u8 = rng.random();
            let g: u8 = rng.random();
            let b: u8 = rng.random();
            Color::new(r, g, b)
        })
        .collect();

    Palette::from_colors(colors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_generate_size() {
        let palette = generate(b"june.wav contents", 6).unwrap();
        assert_eq!(palette.len(), 6);
        assert_eq!(palette.inverted().len(), 6);
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(matches!(
            generate(b"abc", 0),
            Err(CoreError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_oversized_palette_rejected() {
        assert_eq!(generate(b"abc", MAX_PALETTE_SIZE).unwrap().len(), MAX_PALETTE_SIZE);
        assert!(matches!(
            generate(b"abc", MAX_PALETTE_SIZE + 1),
            Err(CoreError::InvalidParameter(_))
        ));
        assert!(generate(b"abc", usize::MAX).is_err());
    }

    #[test]
    fn test_hex_colors_follow_palette() {
        let palette = generate(b"june.wav contents", 3).unwrap();
        let hex = palette.hex_colors();
        assert_eq!(hex.len(), 3);
        assert_eq!(hex[0], palette.colors()[0].to_hex());
        assert!(hex.iter().all(|h| h.len() == 7 && h.starts_with('#')));
    }

    #[test]
    fn test_different_audio_different_seed() {
        assert_ne!(seed_from_fingerprint(b"a"), seed_from_fingerprint(b"b"));
    }

    #[test]
    fn test_inverse_matches_colors() {
        let palette = generate(&[7u8; 64], 10).unwrap();
        for (c, inv) in palette.colors().iter().zip(palette.inverted()) {
            assert_eq!(c.invert(), *inv);
            assert_eq!(inv.r, 255 - c.r);
            assert_eq!(inv.g, 255 - c.g);
            assert_eq!(inv.b, 255 - c.b);
        }
    }

    proptest! {
        #[test]
        fn prop_generate_is_deterministic(
            bytes in proptest::collection::vec(any::<u8>(), 0..256),
            size in 1usize..64,
        ) {
            let a = generate(&bytes, size).unwrap();
            let b = generate(&bytes, size).unwrap();
            prop_assert_eq!(a, b);
        }

        #[test]
        fn prop_inversion_is_involution(
            bytes in proptest::collection::vec(any::<u8>(), 0..64),
            size in 1usize..32,
        ) {
            let palette = generate(&bytes, size).unwrap();
            for c in palette.colors() {
                prop_assert_eq!(c.invert().invert(), *c);
            }
        }
    }
}
