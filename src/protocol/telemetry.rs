//! src/protocol/telemetry.rs
//!
//! Decoder for the 22-field `LIVE:` payload.
//!
//! Field order (channel 0 first wherever a pair is listed):
//!
//! | idx    | field                 | type |
//! |--------|-----------------------|------|
//! | 0, 1   | frequency             | f64  |
//! | 2, 3   | detector state        | int  |
//! | 4, 5   | baseline              | f64  |
//! | 6, 7   | standard deviation    | f64  |
//! | 8, 9   | jump                  | f64  |
//! | 10, 11 | open circuit          | f64  |
//! | 12, 13 | short circuit         | f64  |
//! | 14, 15 | calibration flag      | int  |
//! | 16, 17 | sensitivity           | int  |
//! | 18     | boost flag            | int  |
//! | 19     | frequency-change flag | int  |
//! | 20     | loop-2 event flag     | int  |
//! | 21     | detect mode           | int  |
//!
//! A field that fails to parse is `None`; only the field count can reject
//! the whole line.

use crate::error::{MonitorError, Result};

pub const TELEMETRY_FIELDS: usize = 22;

/// Parsed-or-absent view of one telemetry line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetryFrame {
    pub frequency: [Option<f64>; 2],
    pub state: [Option<i32>; 2],
    pub baseline: [Option<f64>; 2],
    pub std_dev: [Option<f64>; 2],
    pub jump: [Option<f64>; 2],
    pub open_circuit: [Option<f64>; 2],
    pub short_circuit: [Option<f64>; 2],
    pub calibration: [Option<i32>; 2],
    pub sensitivity: [Option<i32>; 2],
    pub boost: Option<i32>,
    pub freq_change: Option<i32>,
    pub loop2_event: Option<i32>,
    pub detect_mode: Option<i32>,
}

fn float(field: &str) -> Option<f64> {
    field.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn int(field: &str) -> Option<i32> {
    field.trim().parse::<i32>().ok()
}

impl TelemetryFrame {
    /// Decode the body following `LIVE:`.
    pub fn decode(body: &str) -> Result<Self> {
        let f: Vec<&str> = body.split(',').collect();
        if f.len() != TELEMETRY_FIELDS {
            return Err(MonitorError::MalformedTelemetry { fields: f.len() });
        }
        let pair_f = |i: usize| [float(f[i]), float(f[i + 1])];
        let pair_i = |i: usize| [int(f[i]), int(f[i + 1])];
        Ok(Self {
            frequency: pair_f(0),
            state: pair_i(2),
            baseline: pair_f(4),
            std_dev: pair_f(6),
            jump: pair_f(8),
            open_circuit: pair_f(10),
            short_circuit: pair_f(12),
            calibration: pair_i(14),
            sensitivity: pair_i(16),
            boost: int(f[18]),
            freq_change: int(f[19]),
            loop2_event: int(f[20]),
            detect_mode: int(f[21]),
        })
    }

    /// Number of fields that failed to parse.
    pub fn missing_fields(&self) -> usize {
        let floats = [
            self.frequency,
            self.baseline,
            self.std_dev,
            self.jump,
            self.open_circuit,
            self.short_circuit,
        ];
        let ints = [self.state, self.calibration, self.sensitivity];
        let singles = [self.boost, self.freq_change, self.loop2_event, self.detect_mode];
        floats.iter().flatten().filter(|v| v.is_none()).count()
            + ints.iter().flatten().filter(|v| v.is_none()).count()
            + singles.iter().filter(|v| v.is_none()).count()
    }

    /// Two status lines: per-loop diagnostics, then the global flags.
    pub fn summary_lines(&self) -> [String; 2] {
        fn f1(v: Option<f64>) -> String {
            v.map(|v| format!("{:.1}", v)).unwrap_or_else(|| "--".into())
        }
        fn i(v: Option<i32>) -> String {
            v.map(|v| v.to_string()).unwrap_or_else(|| "--".into())
        }
        let first = format!(
            "S0:{}  S1:{}  B0:{}  B1:{}  STD0:{}  STD1:{}  J0:{}  J1:{}  O0:{}  O1:{}  SH0:{}  SH1:{}  C0:{}  C1:{}",
            i(self.state[0]),
            i(self.state[1]),
            f1(self.baseline[0]),
            f1(self.baseline[1]),
            f1(self.std_dev[0]),
            f1(self.std_dev[1]),
            f1(self.jump[0]),
            f1(self.jump[1]),
            f1(self.open_circuit[0]),
            f1(self.open_circuit[1]),
            f1(self.short_circuit[0]),
            f1(self.short_circuit[1]),
            i(self.calibration[0]),
            i(self.calibration[1]),
        );
        let second = format!(
            "SENS1:{}  SENS2:{}  B:{}  FC:{}  L2:{}  M:{}",
            i(self.sensitivity[0]),
            i(self.sensitivity[1]),
            i(self.boost),
            i(self.freq_change),
            i(self.loop2_event),
            i(self.detect_mode),
        );
        [first, second]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD: &str =
        "1000.5,2000.25,1,0,999.0,1999.0,0.5,0.75,1.0,2.0,0.0,0.0,0.0,0.0,1,0,3,4,1,0,1,2";

    #[test]
    fn decodes_all_fields_in_order() {
        let f = TelemetryFrame::decode(GOOD).unwrap();
        assert_eq!(f.frequency, [Some(1000.5), Some(2000.25)]);
        assert_eq!(f.state, [Some(1), Some(0)]);
        assert_eq!(f.baseline, [Some(999.0), Some(1999.0)]);
        assert_eq!(f.std_dev, [Some(0.5), Some(0.75)]);
        assert_eq!(f.jump, [Some(1.0), Some(2.0)]);
        assert_eq!(f.calibration, [Some(1), Some(0)]);
        assert_eq!(f.sensitivity, [Some(3), Some(4)]);
        assert_eq!(f.boost, Some(1));
        assert_eq!(f.freq_change, Some(0));
        assert_eq!(f.loop2_event, Some(1));
        assert_eq!(f.detect_mode, Some(2));
        assert_eq!(f.missing_fields(), 0);
    }

    #[test]
    fn wrong_arity_is_rejected() {
        let err = TelemetryFrame::decode("1,2,3").unwrap_err();
        assert!(matches!(err, MonitorError::MalformedTelemetry { fields: 3 }));

        let long = format!("{},7", GOOD);
        assert!(TelemetryFrame::decode(&long).is_err());
    }

    #[test]
    fn empty_fields_are_kept_and_absent() {
        let mut fields = vec![""; TELEMETRY_FIELDS];
        fields[1] = "2000";
        let f = TelemetryFrame::decode(&fields.join(",")).unwrap();
        assert_eq!(f.frequency, [None, Some(2000.0)]);
        assert_eq!(f.detect_mode, None);
        assert_eq!(f.missing_fields(), 21);
    }

    #[test]
    fn bad_field_does_not_poison_siblings() {
        let body = GOOD.replacen("1000.5", "abc", 1).replacen(",3,4,", ",x,4,", 1);
        let f = TelemetryFrame::decode(&body).unwrap();
        assert_eq!(f.frequency, [None, Some(2000.25)]);
        assert_eq!(f.sensitivity, [None, Some(4)]);
        assert_eq!(f.missing_fields(), 2);
    }

    #[test]
    fn non_finite_frequency_is_absent() {
        let body = GOOD.replacen("1000.5", "inf", 1);
        let f = TelemetryFrame::decode(&body).unwrap();
        assert_eq!(f.frequency[0], None);
    }

    #[test]
    fn summary_marks_absent_fields() {
        let f = TelemetryFrame::decode(&",".repeat(TELEMETRY_FIELDS - 1)).unwrap();
        let [first, second] = f.summary_lines();
        assert!(first.starts_with("S0:--"));
        assert!(second.ends_with("M:--"));
    }
}
