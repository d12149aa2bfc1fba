use beatswirl_core::{
    select_color_index, AnimationClock, BeatTimeline, ClockOutcome, ClockState, ParameterState,
    Preset,
};
use std::time::{Duration, Instant};

#[test]
fn test_timeline_coverage_120_bpm() {
    let timeline = BeatTimeline::build(120.0, 10.0).unwrap();
    let expected: Vec<f64> = (0..=20).map(|i| i as f64 * 0.5).collect();
    assert_eq!(timeline.beats(), expected.as_slice());
    assert!(*timeline.beats().last().unwrap() <= 10.0);
}

#[test]
fn test_gating_around_start() {
    let timeline = BeatTimeline::build(120.0, 10.0).unwrap();
    assert_eq!(
        select_color_index(&timeline, -0.01, 1.0, 6),
        ClockOutcome::NoOp
    );
    assert!(matches!(
        select_color_index(&timeline, 0.0, 1.0, 6),
        ClockOutcome::Beat { color_index: 0 }
    ));
}

#[test]
fn test_first_beat_in_order_wins() {
    // With multiplier 0.25 the window is 2s and several beats qualify;
    // the index still comes from elapsed time alone.
    let timeline = BeatTimeline::build(120.0, 10.0).unwrap();
    assert_eq!(
        select_color_index(&timeline, 3.3, 0.25, 6),
        ClockOutcome::Beat { color_index: 1 }
    );
}

#[test]
fn test_frame_loop_over_a_track() {
    let start = Instant::now();
    let timeline = BeatTimeline::build(120.0, 4.0).unwrap();
    let params = ParameterState::new(b"loop track", &Preset::new(1.5, 1.0, 4)).unwrap();
    let mut clock = AnimationClock::new(
        ClockState::new(start, Duration::from_millis(500)),
        timeline,
    );

    let frame = Duration::from_secs_f64(1.0 / 60.0);
    let mut changes = 0;
    let mut last = None;
    for i in 0..(60 * 5) {
        let cmd = clock.tick(start + frame * i, &params, false);
        if cmd.color_changed() {
            changes += 1;
        }
        if let Some(selection) = cmd.color {
            assert!(selection.index < 4);
            assert_eq!(selection.secondary, selection.primary.invert());
            last = Some(selection);
        }
        assert!((cmd.rotation - 1.5 * (i + 1) as f64).abs() < 1e-9);
    }

    assert!(changes > 0);
    assert_eq!(clock.last_color(), last);
}
