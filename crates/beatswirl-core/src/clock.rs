//! Animation Clock and Rotation Integrator
//!
//! The host calls [`AnimationClock::tick`] once per rendered frame. The clock
//! maps playback time onto the beat timeline and decides whether a new color
//! is shown this frame. Rotation advances independently of the beat gate.

use crate::color::Color;
use crate::params::ParameterState;
use crate::timeline::BeatTimeline;
use std::time::{Duration, Instant};

/// Start of the run. Immutable once the animation begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockState {
    start: Instant,
    start_delay: Duration,
}

impl ClockState {
    /// Clock started at `start`, animating after `start_delay`
    pub fn new(start: Instant, start_delay: Duration) -> Self {
        Self { start, start_delay }
    }

    /// Clock started now
    pub fn starting_now(start_delay: Duration) -> Self {
        Self::new(Instant::now(), start_delay)
    }

    /// Instant the run began
    pub fn start(&self) -> Instant {
        self.start
    }

    /// Delay before the animation begins
    pub fn start_delay(&self) -> Duration {
        self.start_delay
    }

    /// Seconds since the animation began. Negative before the delay has passed.
    pub fn elapsed(&self, now: Instant) -> f64 {
        let since_start = match now.checked_duration_since(self.start) {
            Some(d) => d.as_secs_f64(),
            None => -self.start.duration_since(now).as_secs_f64(),
        };
        since_start - self.start_delay.as_secs_f64()
    }
}

/// Result of evaluating the clock for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockOutcome {
    /// Playback has not started yet
    NoOp,
    /// No beat within tolerance, the previous color stays
    Hold,
    /// A beat is within tolerance, show this palette index
    Beat {
        /// Index into the palette and inverse palette
        color_index: usize,
    },
}

/// Decide the color for `elapsed` seconds of playback.
///
/// The first beat `b` in timeline order with `|elapsed - b| < adjusted`
/// gates the change, where `adjusted = beat_duration / beat_multiplier`.
/// The index itself comes from `floor(elapsed / adjusted) mod palette_size`
/// and does not depend on which beat matched.
pub fn select_color_index(
    timeline: &BeatTimeline,
    elapsed: f64,
    beat_multiplier: f64,
    palette_size: usize,
) -> ClockOutcome {
    if elapsed < 0.0 {
        return ClockOutcome::NoOp;
    }

    let adjusted = timeline.beat_duration() / beat_multiplier;
    let beats = timeline.beats();

    // Beats at or before `elapsed - adjusted` can never match; skip them.
    let first_candidate = beats.partition_point(|&b| elapsed - b >= adjusted);
    let matched = beats[first_candidate..]
        .iter()
        .take_while(|&&b| b - elapsed < adjusted)
        .any(|&b| (elapsed - b).abs() < adjusted);

    if !matched || palette_size == 0 {
        return ClockOutcome::Hold;
    }

    let step = (elapsed / adjusted).floor() as usize;
    ClockOutcome::Beat {
        color_index: step % palette_size,
    }
}

/// Colors shown on the two display regions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorSelection {
    /// Palette index (same for both regions)
    pub index: usize,
    /// `palette[index]`
    pub primary: Color,
    /// `inverse_palette[index]`
    pub secondary: Color,
}

/// What the host should apply this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderCommand {
    /// Clock decision for this frame
    pub outcome: ClockOutcome,
    /// Colors to display, `None` until the first beat has been shown
    pub color: Option<ColorSelection>,
    /// Total rotation in degrees
    pub rotation: f64,
    /// Rotation added this frame
    pub rotation_delta: f64,
}

impl RenderCommand {
    /// True when this frame switched to a new color selection
    pub fn color_changed(&self) -> bool {
        matches!(self.outcome, ClockOutcome::Beat { .. })
    }
}

/// Accumulates rotation once per frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RotationIntegrator {
    rotation: f64,
}

impl RotationIntegrator {
    /// Start at zero rotation
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `speed` unless `suspended`. Returns the delta applied.
    pub fn advance(&mut self, speed: f64, suspended: bool) -> f64 {
        if suspended {
            return 0.0;
        }
        self.rotation += speed;
        speed
    }

    /// Total rotation in degrees
    pub fn rotation(&self) -> f64 {
        self.rotation
    }
}

/// Per-run animation clock: beat gating plus rotation
#[derive(Debug, Clone)]
pub struct AnimationClock {
    state: ClockState,
    timeline: BeatTimeline,
    rotation: RotationIntegrator,
    last_color: Option<ColorSelection>,
}

impl AnimationClock {
    /// Create a clock for a run
    pub fn new(state: ClockState, timeline: BeatTimeline) -> Self {
        Self {
            state,
            timeline,
            rotation: RotationIntegrator::new(),
            last_color: None,
        }
    }

    /// Run start and delay
    pub fn state(&self) -> &ClockState {
        &self.state
    }

    /// Beat timeline for the track
    pub fn timeline(&self) -> &BeatTimeline {
        &self.timeline
    }

    /// Last color selection emitted
    pub fn last_color(&self) -> Option<ColorSelection> {
        self.last_color
    }

    /// Advance one frame.
    ///
    /// `rotation_suspended` is the state of the hold input; it only freezes
    /// rotation and never affects colors.
    pub fn tick(
        &mut self,
        now: Instant,
        params: &ParameterState,
        rotation_suspended: bool,
    ) -> RenderCommand {
        let elapsed = self.state.elapsed(now);
        let outcome = select_color_index(
            &self.timeline,
            elapsed,
            params.beat_multiplier(),
            params.palette_size(),
        );

        if let ClockOutcome::Beat { color_index } = outcome {
            let palette = params.palette();
            if let (Some(primary), Some(secondary)) =
                (palette.primary(color_index), palette.secondary(color_index))
            {
                self.last_color = Some(ColorSelection {
                    index: color_index,
                    primary,
                    secondary,
                });
            }
        }

        let rotation_delta = self
            .rotation
            .advance(params.rotation_speed(), rotation_suspended);

        RenderCommand {
            outcome,
            color: self.last_color,
            rotation: self.rotation.rotation(),
            rotation_delta,
        }
    }
}
