//! Command Interpreter
//!
//! Every change to the live parameters or the user presets goes through
//! [`CommandInterpreter::handle_event`]. Rejected changes leave the session
//! untouched.

use crate::error::Result;
use crate::persistence::{DirectPersistence, PresetPersistence};
use crate::shortcuts::{Action, HeldKeys, Key, KeyBindings};
use beatswirl_core::{
    builtin_preset, ParameterState, Preset, PresetStore, SlotKey, MAX_PALETTE_SIZE,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Default palette growth per grow/shrink command
pub const DEFAULT_PALETTE_STEP: usize = 6;

/// State owned by one run: the audio fingerprint, live parameters and user presets
#[derive(Debug, Clone)]
pub struct Session {
    fingerprint: Arc<[u8]>,
    params: ParameterState,
    store: PresetStore,
}

impl Session {
    /// Start a session from raw audio bytes and an initial preset
    pub fn new(
        fingerprint: impl Into<Arc<[u8]>>,
        initial: &Preset,
        store: PresetStore,
    ) -> Result<Self> {
        let fingerprint = fingerprint.into();
        let params = ParameterState::new(&fingerprint, initial)?;
        Ok(Self {
            fingerprint,
            params,
            store,
        })
    }

    /// Raw audio bytes the palette is derived from
    pub fn fingerprint(&self) -> &[u8] {
        &self.fingerprint
    }

    /// Live parameters
    pub fn params(&self) -> &ParameterState {
        &self.params
    }

    /// User presets
    pub fn store(&self) -> &PresetStore {
        &self.store
    }

    fn load_preset(&mut self, preset: &Preset) -> Result<()> {
        info!("Loading preset: {:?}", preset);
        self.params.apply_preset(&self.fingerprint, preset)?;
        info!(
            "Loaded preset: rotation_speed={}, beat_multiplier={}, num_colors={}",
            self.params.rotation_speed(),
            self.params.beat_multiplier(),
            self.params.palette_size()
        );
        Ok(())
    }
}

/// Where a loaded preset came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetSource {
    Builtin(usize),
    Slot(SlotKey),
}

/// Current tunables, for the status command
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub rotation_speed: f64,
    pub beat_multiplier: f64,
    pub palette_size: usize,
    pub user_presets: usize,
    /// Palette as `#rrggbb`
    pub colors: Vec<String>,
}

/// What an event did
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Unbound key, hold-only key, or nothing to do
    Ignored,
    RotationSpeed(f64),
    BeatMultiplier(f64),
    PaletteSize(usize),
    PresetLoaded {
        source: PresetSource,
        preset: Preset,
    },
    /// The slot has no preset bound
    SlotEmpty(SlotKey),
    /// Current parameters stored into these slots
    Saved {
        slots: Vec<SlotKey>,
    },
    Status(StatusReport),
}

/// Maps input events to session changes
pub struct CommandInterpreter {
    bindings: KeyBindings,
    palette_step: usize,
    persistence: Box<dyn PresetPersistence>,
}

impl CommandInterpreter {
    /// Default bindings, synchronous preset saving
    pub fn new() -> Self {
        Self::with_persistence(KeyBindings::new(), Box::new(DirectPersistence))
    }

    /// Custom bindings and persistence strategy
    pub fn with_persistence(
        bindings: KeyBindings,
        persistence: Box<dyn PresetPersistence>,
    ) -> Self {
        Self {
            bindings,
            palette_step: DEFAULT_PALETTE_STEP,
            persistence,
        }
    }

    /// Change how many colors grow/shrink add or remove, clamped to
    /// `1..=MAX_PALETTE_SIZE`
    pub fn set_palette_step(&mut self, step: usize) {
        self.palette_step = step.clamp(1, MAX_PALETTE_SIZE);
    }

    pub fn palette_step(&self) -> usize {
        self.palette_step
    }

    /// True while a rotation-suspend key is held
    pub fn rotation_suspended(&self, held: &HeldKeys) -> bool {
        self.bindings.is_action_held(Action::SuspendRotation, held)
    }

    /// Results of background preset writes finished since the last call
    pub fn poll_persistence(&mut self) -> Vec<Result<()>> {
        self.persistence.poll()
    }

    /// Handle a key press. `held` is the set of keys down at the time of the
    /// press and decides the targets of a save.
    pub fn handle_event(
        &mut self,
        key: Key,
        held: &HeldKeys,
        session: &mut Session,
    ) -> Result<Outcome> {
        let Some(action) = self.bindings.find_action(key) else {
            debug!("Ignoring unbound key {}", key);
            return Ok(Outcome::Ignored);
        };
        self.apply(action, held, session)
    }

    /// Run an action directly
    pub fn apply(
        &mut self,
        action: Action,
        held: &HeldKeys,
        session: &mut Session,
    ) -> Result<Outcome> {
        let step = isize::try_from(self.palette_step).unwrap_or(isize::MAX);
        let outcome = match action {
            Action::DoubleRotationSpeed => {
                Outcome::RotationSpeed(session.params.scale_rotation_speed(2.0)?)
            }
            Action::HalveRotationSpeed => {
                Outcome::RotationSpeed(session.params.scale_rotation_speed(0.5)?)
            }
            Action::DoubleBeatMultiplier => {
                Outcome::BeatMultiplier(session.params.scale_beat_multiplier(2.0)?)
            }
            Action::HalveBeatMultiplier => {
                Outcome::BeatMultiplier(session.params.scale_beat_multiplier(0.5)?)
            }
            Action::GrowPalette => {
                Outcome::PaletteSize(session.params.resize_palette(&session.fingerprint, step)?)
            }
            Action::ShrinkPalette => {
                Outcome::PaletteSize(session.params.resize_palette(&session.fingerprint, -step)?)
            }
            Action::LoadBuiltinPreset(index) => {
                info!("Switching to preset {}", index);
                let preset = builtin_preset(index)?;
                session.load_preset(&preset)?;
                Outcome::PresetLoaded {
                    source: PresetSource::Builtin(index),
                    preset,
                }
            }
            Action::LoadUserPreset(slot) => match session.store.get(slot).copied() {
                Some(preset) => {
                    info!("Switching to JSON preset {}", slot);
                    session.load_preset(&preset)?;
                    Outcome::PresetLoaded {
                        source: PresetSource::Slot(slot),
                        preset,
                    }
                }
                None => Outcome::SlotEmpty(slot),
            },
            Action::SaveToHeldSlots => {
                let slots = held.held_slots();
                if slots.is_empty() {
                    return Ok(Outcome::Ignored);
                }
                let snapshot = session.params.snapshot();
                for &slot in &slots {
                    session.store.set(slot, snapshot);
                    info!(
                        "Saved {}= Beat Multiplier: {}, Rotation Speed: {}, Number of Colors: {}",
                        slot,
                        snapshot.beat_multiplier,
                        snapshot.rotation_speed,
                        snapshot.palette_size
                    );
                }
                // The in-memory store keeps the new slots even if this fails
                self.persistence.persist(&session.store)?;
                Outcome::Saved { slots }
            }
            Action::ShowStatus => {
                let report = StatusReport {
                    rotation_speed: session.params.rotation_speed(),
                    beat_multiplier: session.params.beat_multiplier(),
                    palette_size: session.params.palette_size(),
                    user_presets: session.store.len(),
                    colors: session.params.palette().hex_colors(),
                };
                info!("Beat Multiplier: {}", report.beat_multiplier);
                info!("Rotation Speed: {}", report.rotation_speed);
                info!("Number of Colors: {}", report.palette_size);
                debug!("Colors: {}", report.colors.join(" "));
                Outcome::Status(report)
            }
            Action::SuspendRotation => Outcome::Ignored,
        };
        Ok(outcome)
    }
}

impl Default for CommandInterpreter {
    fn default() -> Self {
        Self::new()
    }
}
