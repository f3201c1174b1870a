//! Shared helpers for the integration tests.

#![allow(dead_code)]

use loopmon::config::AppConfig;
use loopmon::protocol::telemetry::TELEMETRY_FIELDS;
use loopmon::Session;

/// A `LIVE:` line whose field `i` is `i + 1`, with the two frequencies
/// overridden.
pub fn live_line(f0: &str, f1: &str) -> String {
    let mut fields: Vec<String> = (1..=TELEMETRY_FIELDS).map(|i| i.to_string()).collect();
    fields[0] = f0.to_string();
    fields[1] = f1.to_string();
    format!("LIVE:{}", fields.join(","))
}

/// A `PARAMETERS:` line setting every register to `value`.
pub fn snapshot_line(value: i32, registers: usize) -> String {
    let body = vec![value.to_string(); registers].join(",");
    format!("PARAMETERS:{}", body)
}

pub fn session() -> Session {
    Session::new(&AppConfig::default())
}

pub fn assert_float_eq(a: f64, b: f64, epsilon: f64) {
    assert!(
        (a - b).abs() < epsilon,
        "expected {} to be within {} of {}",
        a,
        epsilon,
        b
    );
}
