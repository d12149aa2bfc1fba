//! Fixed-rate frame loop driven by a scripted input timeline
//!
//! Stands in for a windowing host: frames are stepped at `start + n * dt`
//! and key events are replayed from a script instead of a keyboard.
//!
//! Script format, one event per line, times in seconds from launch:
//!
//! ```text
//! # time  action  key
//! 1.25    press   q
//! 1.30    press   =
//! 1.35    release =
//! 1.40    release q
//! ```

use anyhow::{bail, Context, Result};
use beatswirl_control::{CommandInterpreter, HeldKeys, Key, Outcome, Session};
use beatswirl_core::{AnimationClock, RenderCommand};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Press,
    Release,
}

/// One scripted key transition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScriptEvent {
    pub at_secs: f64,
    pub action: KeyAction,
    pub key: Key,
}

/// Parse a script. Keys the host does not know are skipped with a warning;
/// malformed lines are errors. Events come back ordered by time.
pub fn parse_script(content: &str) -> Result<Vec<ScriptEvent>> {
    let mut events = Vec::new();

    for (line_no, line) in content.lines().enumerate() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        let [time, action, key] = fields.as_slice() else {
            bail!("line {}: expected `<seconds> press|release <key>`", line_no + 1);
        };

        let at_secs: f64 = time
            .parse()
            .with_context(|| format!("line {}: bad time {:?}", line_no + 1, time))?;
        if !(at_secs.is_finite() && at_secs >= 0.0) {
            bail!("line {}: time must be >= 0, got {}", line_no + 1, at_secs);
        }

        let action = match action.to_ascii_lowercase().as_str() {
            "press" | "down" => KeyAction::Press,
            "release" | "up" => KeyAction::Release,
            other => bail!("line {}: unknown action {:?}", line_no + 1, other),
        };

        let Some(key) = Key::parse(key) else {
            warn!("line {}: ignoring unknown key {:?}", line_no + 1, key);
            continue;
        };

        events.push(ScriptEvent {
            at_secs,
            action,
            key,
        });
    }

    events.sort_by(|a, b| a.at_secs.total_cmp(&b.at_secs));
    Ok(events)
}

/// Totals reported at the end of a run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub color_changes: u64,
    pub events_handled: usize,
    pub events_rejected: usize,
    pub final_rotation: f64,
    /// Escape was pressed before the track ended
    pub stopped_early: bool,
}

/// Owns everything one run touches
pub struct Host {
    clock: AnimationClock,
    session: Session,
    interpreter: CommandInterpreter,
    held: HeldKeys,
    frame: Duration,
}

impl Host {
    pub fn new(
        clock: AnimationClock,
        session: Session,
        interpreter: CommandInterpreter,
        frame: Duration,
    ) -> Self {
        Self {
            clock,
            session,
            interpreter,
            held: HeldKeys::new(),
            frame,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Deliver one key transition. Rejected commands are logged and leave
    /// the session as it was.
    pub fn handle_key(&mut self, action: KeyAction, key: Key) -> Result<Option<Outcome>> {
        match action {
            KeyAction::Release => {
                self.held.release(key);
                Ok(None)
            }
            KeyAction::Press => {
                self.held.press(key);
                let outcome = self
                    .interpreter
                    .handle_event(key, &self.held, &mut self.session)?;
                match &outcome {
                    Outcome::Ignored => {}
                    Outcome::SlotEmpty(slot) => debug!("No preset in slot {}", slot),
                    other => debug!("{} -> {:?}", key, other),
                }
                Ok(Some(outcome))
            }
        }
    }

    /// Advance one frame
    pub fn tick(&mut self, now: Instant) -> RenderCommand {
        let suspended = self.interpreter.rotation_suspended(&self.held);
        let command = self.clock.tick(now, self.session.params(), suspended);

        for result in self.interpreter.poll_persistence() {
            if let Err(e) = result {
                warn!("Preset save failed: {}", e);
            }
        }
        command
    }

    /// Step frames from `start` until the track and start delay have passed,
    /// replaying `script` on the way.
    pub fn run(&mut self, script: &[ScriptEvent], start: Instant) -> RunSummary {
        let end =
            self.clock.state().start_delay().as_secs_f64() + self.clock.timeline().duration();
        let dt = self.frame.as_secs_f64();
        let mut summary = RunSummary::default();
        let mut pending = script.iter().peekable();

        loop {
            let t = summary.frames as f64 * dt;
            if t > end {
                break;
            }

            while let Some(event) = pending.next_if(|e| e.at_secs <= t) {
                if event.action == KeyAction::Press && event.key == Key::Escape {
                    info!("Escape pressed at {:.2}s", t);
                    summary.stopped_early = true;
                    return summary;
                }
                match self.handle_key(event.action, event.key) {
                    Ok(Some(_)) => summary.events_handled += 1,
                    Ok(None) => {}
                    Err(e) => {
                        warn!("Rejected {} at {:.2}s: {}", event.key, t, e);
                        summary.events_rejected += 1;
                    }
                }
            }

            let command = self.tick(start + self.frame.mul_f64(summary.frames as f64));
            if command.color_changed() {
                summary.color_changes += 1;
                if let Some(color) = command.color {
                    debug!(
                        "{:.3}s color {} primary {} secondary {}",
                        t, color.index, color.primary, color.secondary
                    );
                }
            }
            summary.final_rotation = command.rotation;
            summary.frames += 1;
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beatswirl_control::{DirectPersistence, KeyBindings};
    use beatswirl_core::{BeatTimeline, ClockState, Preset, PresetStore, SlotKey};
    use tempfile::tempdir;

    fn host(store: PresetStore) -> (Host, Instant) {
        let start = Instant::now();
        let clock = AnimationClock::new(
            ClockState::new(start, Duration::from_millis(500)),
            BeatTimeline::build(120.0, 2.0).unwrap(),
        );
        let session = Session::new(&b"host track"[..], &Preset::default(), store).unwrap();
        let interpreter =
            CommandInterpreter::with_persistence(KeyBindings::new(), Box::new(DirectPersistence));
        (
            Host::new(clock, session, interpreter, Duration::from_millis(10)),
            start,
        )
    }

    #[test]
    fn test_parse_script() {
        let events = parse_script(
            "# comment\n\
             1.0 press q\n\
             0.5 press z   # faster\n\
             \n\
             1.5 release q\n\
             2.0 press shift\n",
        )
        .unwrap();

        assert_eq!(events.len(), 3);
        assert_eq!(events[0].key, Key::Char('z'));
        assert_eq!(events[1].key, Key::Slot(SlotKey::Q));
        assert_eq!(events[2].action, KeyAction::Release);
    }

    #[test]
    fn test_parse_script_errors() {
        assert!(parse_script("1.0 press").is_err());
        assert!(parse_script("soon press q").is_err());
        assert!(parse_script("1.0 tap q").is_err());
        assert!(parse_script("-1 press q").is_err());
    }

    #[test]
    fn test_run_covers_delay_and_track() {
        let (mut host, start) = host(PresetStore::in_memory());
        let summary = host.run(&[], start);

        // 2.5s at 10ms per frame, inclusive of both ends
        assert!((250..=251).contains(&summary.frames));
        assert!(summary.color_changes > 0);
        assert!((summary.final_rotation - 0.9 * summary.frames as f64).abs() < 1e-6);
        assert!(!summary.stopped_early);
    }

    #[test]
    fn test_scripted_save_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("json_presets.json");
        let (mut host, start) = host(PresetStore::load(&path));

        let script = parse_script(
            "0.1 press x\n\
             0.2 press w\n\
             0.3 press =\n\
             0.4 release =\n\
             0.5 release w\n\
             0.6 press 0\n",
        )
        .unwrap();
        let summary = host.run(&script, start);

        assert_eq!(summary.events_rejected, 0);
        assert_eq!(host.session().params().palette_size(), 6);
        assert_eq!(
            PresetStore::load(&path).get(SlotKey::W),
            Some(&Preset::new(0.9, 1.0, 12))
        );
    }

    #[test]
    fn test_space_freezes_rotation() {
        let (mut host, start) = host(PresetStore::in_memory());
        let script = parse_script("0.0 press space\n").unwrap();
        let summary = host.run(&script, start);
        assert_eq!(summary.final_rotation, 0.0);
    }

    #[test]
    fn test_escape_stops_run() {
        let (mut host, start) = host(PresetStore::in_memory());
        let script = parse_script("0.2 press escape\n").unwrap();
        let summary = host.run(&script, start);
        assert!(summary.stopped_early);
        assert!(summary.frames <= 21);
    }
}
