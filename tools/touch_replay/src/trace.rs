use std::{fmt::Display, fs, path::Path, str::FromStr};

use anyhow::{anyhow, bail, Context, Result};
use multitouch::{FingerSample, FingerState};

const TRACE_TAG: &str = "finger_trace";
const TRACE_HEADER: &str =
    "finger_trace,frame,timestamp,id,state,size,x,y,dx,dy,angle,major_axis,minor_axis";
const TRACE_COLUMNS: usize = 13;

/// Every label `GestureEvent::kind_label` can produce.
const EVENT_KINDS: [&str; 7] = [
    "pressed", "released", "hover", "moved", "drag", "pinch", "rotate",
];

pub fn parse_trace_file(path: &Path) -> Result<Vec<FingerSample>> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_trace(&source, &path.display().to_string())
}

pub fn parse_expected_file(path: &Path) -> Result<Vec<&'static str>> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_expected_kinds(&source, &path.display().to_string())
}

/// Parses `finger_trace` rows; lines with any other tag are ignored so
/// mixed serial captures can be replayed as-is.
pub fn parse_trace(source: &str, origin: &str) -> Result<Vec<FingerSample>> {
    let mut out = Vec::new();
    for (line_no, line) in source.lines().enumerate() {
        let line_no = line_no + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed == TRACE_HEADER {
            continue;
        }

        let parts: Vec<&str> = trimmed.split(',').map(str::trim).collect();
        if parts[0] != TRACE_TAG {
            continue;
        }
        if parts.len() < TRACE_COLUMNS {
            bail!(
                "{origin}:{line_no} invalid trace line, expected {TRACE_COLUMNS} columns, got {}",
                parts.len()
            );
        }

        let at = |idx: usize, name: &str| Field {
            raw: parts[idx],
            name: name.to_owned(),
            origin,
            line_no,
        };
        let state = parse_state(parts[4])
            .ok_or_else(|| anyhow!("{origin}:{line_no} invalid state '{}'", parts[4]))?;

        let sample = FingerSample::from_sensor(
            at(1, "frame").parse()?,
            at(2, "timestamp").parse()?,
            at(3, "id").parse()?,
            0,
            at(5, "size").parse()?,
            at(6, "x").parse()?,
            at(7, "y").parse()?,
            at(8, "dx").parse()?,
            at(9, "dy").parse()?,
            at(10, "angle").parse()?,
            at(11, "major_axis").parse()?,
            at(12, "minor_axis").parse()?,
        )
        .map(|sample| FingerSample { state, ..sample })
        .with_context(|| format!("{origin}:{line_no} rejected sample"))?;
        out.push(sample);
    }
    Ok(out)
}

pub fn parse_expected_kinds(source: &str, origin: &str) -> Result<Vec<&'static str>> {
    let mut kinds = Vec::new();
    for (line_no, line) in source.lines().enumerate() {
        let token = line.trim();
        if token.is_empty() || token.starts_with('#') {
            continue;
        }
        let lowered = token.to_ascii_lowercase();
        let kind = EVENT_KINDS
            .iter()
            .copied()
            .find(|kind| *kind == lowered)
            .ok_or_else(|| {
                anyhow!(
                    "{origin}:{} invalid expected event kind: {token}",
                    line_no + 1
                )
            })?;
        kinds.push(kind);
    }
    Ok(kinds)
}

/// Accepts the driver's integer code or a state name.
fn parse_state(raw: &str) -> Option<FingerState> {
    match raw.parse::<i32>() {
        Ok(code) => Some(FingerState::from_raw(code)),
        Err(_) => FingerState::from_label(raw),
    }
}

struct Field<'a> {
    raw: &'a str,
    name: String,
    origin: &'a str,
    line_no: usize,
}

impl Field<'_> {
    fn parse<T>(&self) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.raw.parse::<T>().map_err(|e| {
            anyhow!(
                "{}:{} invalid {} '{}': {e}",
                self.origin,
                self.line_no,
                self.name,
                self.raw
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_codes_labels_and_skips_noise() {
        let source = "\
# captured on the bench
finger_trace,frame,timestamp,id,state,size,x,y,dx,dy,angle,major_axis,minor_axis

touch_trace,1,0,0,0,0,0
finger_trace,1,0.016,1,4,0.9,0.25,0.5,0.01,0.0,1.57,9.5,8.1
finger_trace,2,0.033,3,Hover,0.1,0.30,0.4,0.0,0.0,0.0,0.0,0.0
";
        let samples = parse_trace(source, "inline").expect("trace parses");
        assert_eq!(samples.len(), 2);

        assert_eq!(samples[0].slot_id, 0);
        assert_eq!(samples[0].frame, 1);
        assert_eq!(samples[0].state, FingerState::Pressed);
        assert!((samples[0].velocity.x - 0.01).abs() < 1e-6);
        assert!((samples[0].major_axis - 9.5).abs() < 1e-6);

        assert_eq!(samples[1].slot_id, 2);
        assert_eq!(samples[1].state, FingerState::Hover);
    }

    #[test]
    fn unknown_codes_map_to_unrecognized() {
        let samples = parse_trace("finger_trace,1,0,1,1,0,0,0,0,0,0,0,0", "inline")
            .expect("trace parses");
        assert_eq!(samples[0].state, FingerState::Unrecognized);
    }

    #[test]
    fn reports_line_and_field_on_bad_numbers() {
        let err = parse_trace("\n\nfinger_trace,1,0,1,4,0,abc,0,0,0,0,0,0", "t.csv")
            .expect_err("x is not a number");
        let msg = err.to_string();
        assert!(msg.contains("t.csv:3"), "{msg}");
        assert!(msg.contains("invalid x 'abc'"), "{msg}");
    }

    #[test]
    fn rejects_short_lines_unknown_states_and_zero_ids() {
        assert!(parse_trace("finger_trace,1,0,1,4", "t").is_err());
        assert!(parse_trace("finger_trace,1,0,1,wiggle,0,0,0,0,0,0,0,0", "t").is_err());
        let err = parse_trace("finger_trace,1,0,0,4,0,0,0,0,0,0,0,0", "t")
            .expect_err("sensor ids start at 1");
        assert!(format!("{err:#}").contains("invalid sensor finger id 0"));
    }

    #[test]
    fn expected_kinds_are_normalised() {
        let kinds = parse_expected_kinds("# header\nMoved\n\n drag \nrotate\n", "e")
            .expect("kinds parse");
        assert_eq!(kinds, vec!["moved", "drag", "rotate"]);
        assert!(parse_expected_kinds("swipe_left\n", "e").is_err());
    }
}
