mod trace;

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{info, warn};
use multitouch::{
    EventRecorder, FingerSample, GestureConfig, GestureEngine, GestureEvent, IterSource, PumpStats,
};

#[derive(Debug, Parser)]
#[command(name = "touch_replay")]
#[command(about = "Replay a recorded finger trace through the gesture engine")]
struct Cli {
    /// CSV capture with `finger_trace` rows.
    trace: PathBuf,
    /// File with one expected event kind per line.
    #[arg(long)]
    expect: Option<PathBuf>,
    /// Gesture config TOML overriding the built-in defaults.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    run(Cli::parse())
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GestureConfig::default(),
    };
    let samples = trace::parse_trace_file(&cli.trace)?;
    info!("replaying {} samples from {}", samples.len(), cli.trace.display());

    let (events, stats) = replay(samples, config)?;
    if stats.rejected > 0 {
        warn!("{} samples rejected by the engine", stats.rejected);
    }

    println!("event,index,kind,a,b,c");
    for (index, event) in events.iter().enumerate() {
        let [a, b, c] = event_columns(event);
        println!("event,{index},{},{a},{b},{c}", event.kind_label());
    }

    if let Some(expect_path) = &cli.expect {
        let expected = trace::parse_expected_file(expect_path)?;
        let actual: Vec<&'static str> = events.iter().map(GestureEvent::kind_label).collect();
        if actual != expected {
            eprintln!("expected kinds: {}", expected.join(","));
            eprintln!("actual kinds:   {}", actual.join(","));
            bail!("event sequence mismatch");
        }
        info!("{} events match {}", actual.len(), expect_path.display());
    }

    Ok(())
}

fn load_config(path: &Path) -> Result<GestureConfig> {
    let file = gesture_config_compiler::parse_config_file(path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    gesture_config_compiler::validate_config(&file)
        .with_context(|| format!("rejected {}", path.display()))?;

    let config = GestureConfig::default()
        .with_max_slots(file.slots.max_slots as usize)
        .with_pressed_frames_threshold(file.slots.pressed_frames_threshold)
        .with_motion_threshold(file.thresholds.motion)
        .with_drag_threshold(file.thresholds.drag)
        .with_pinch_threshold(file.thresholds.pinch)
        .with_rotate_threshold(file.thresholds.rotate);
    config.validate()?;
    Ok(config)
}

/// Runs `samples` through a fresh engine listening on every category.
fn replay(
    samples: Vec<FingerSample>,
    config: GestureConfig,
) -> Result<(Vec<GestureEvent>, PumpStats)> {
    let engine = GestureEngine::with_config(config)?;
    let recorder = Arc::new(EventRecorder::new());
    engine.add_state_listener(recorder.clone());
    engine.add_motion_listener(recorder.clone());
    engine.add_two_fingers_listener(recorder.clone());

    let stats = engine.pump(&mut IterSource::new(samples));
    Ok((recorder.take(), stats))
}

/// State events carry slot and position, motion carries slot and deltas.
fn event_columns(event: &GestureEvent) -> [String; 3] {
    match *event {
        GestureEvent::Pressed(finger)
        | GestureEvent::Released(finger)
        | GestureEvent::Hover(finger) => [
            finger.slot_id.to_string(),
            finger.position.x.to_string(),
            finger.position.y.to_string(),
        ],
        GestureEvent::Moved { finger, dx, dy } => {
            [finger.slot_id.to_string(), dx.to_string(), dy.to_string()]
        }
        GestureEvent::Drag { direction, delta } => [
            direction.x.to_string(),
            direction.y.to_string(),
            delta.to_string(),
        ],
        GestureEvent::Pinch { delta } => [delta.to_string(), String::new(), String::new()],
        GestureEvent::Rotate { angle } => [angle.to_string(), String::new(), String::new()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("traces")
            .join(name)
    }

    fn replay_fixture(trace: &str, expected: &str, config: GestureConfig) {
        let samples = trace::parse_trace_file(&fixture(trace)).expect("fixture trace parses");
        let expected = trace::parse_expected_file(&fixture(expected)).expect("fixture kinds parse");
        let (events, stats) = replay(samples, config).expect("valid config");
        assert_eq!(stats.rejected, 0);
        let kinds: Vec<&str> = events.iter().map(GestureEvent::kind_label).collect();
        assert_eq!(kinds, expected);
    }

    #[test]
    fn drag_trace_matches_expected_kinds() {
        replay_fixture(
            "two_finger_drag.csv",
            "two_finger_drag.expected",
            GestureConfig::default(),
        );
    }

    #[test]
    fn pinch_trace_matches_expected_kinds() {
        replay_fixture("pinch_out.csv", "pinch_out.expected", GestureConfig::default());
    }

    #[test]
    fn tighter_capacity_rejects_high_slots() {
        let samples = trace::parse_trace_file(&fixture("two_finger_drag.csv")).expect("parses");
        let (events, stats) =
            replay(samples, GestureConfig::default().with_max_slots(1)).expect("valid config");
        assert_eq!(stats.rejected, 9);
        assert!(events
            .iter()
            .all(|e| !matches!(e, GestureEvent::Drag { .. })));
    }

    #[test]
    fn shipped_config_loads() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../config/gestures.toml");
        let config = load_config(&path).expect("shipped config is valid");
        assert_eq!(config, GestureConfig::default());
    }

    #[test]
    fn pinch_columns_leave_unused_fields_empty() {
        let [a, b, c] = event_columns(&GestureEvent::Pinch { delta: -0.02 });
        assert_eq!(a, "-0.02");
        assert!(b.is_empty() && c.is_empty());
    }
}
