//! src/protocol/router.rs
//!
//! Prefix-based classification of trimmed inbound lines.

pub const LIVE_MARKER: &str = "LIVE:";
pub const PARAMETERS_MARKER: &str = "PARAMETERS:";
pub const EEPROM_MARKER: &str = "0x";

/// One classified inbound line borrowing the part its decoder needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inbound<'a> {
    /// Body after `LIVE:`.
    Telemetry(&'a str),
    /// Body after `PARAMETERS:`.
    ParametersSnapshot(&'a str),
    /// The whole line, address token included.
    EepromRow(&'a str),
    Unrecognized(&'a str),
}

/// Classify a line. Lines that match no prefix are `Unrecognized` and are
/// expected to be dropped by the caller.
pub fn route(line: &str) -> Inbound<'_> {
    if let Some(body) = line.strip_prefix(LIVE_MARKER) {
        Inbound::Telemetry(body)
    } else if let Some(body) = line.strip_prefix(PARAMETERS_MARKER) {
        Inbound::ParametersSnapshot(body)
    } else if line.starts_with(EEPROM_MARKER) {
        Inbound::EepromRow(line)
    } else {
        Inbound::Unrecognized(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_prefix() {
        assert_eq!(route("LIVE:1,2"), Inbound::Telemetry("1,2"));
        assert_eq!(route("PARAMETERS:0,1"), Inbound::ParametersSnapshot("0,1"));
        assert_eq!(route("0x0000 00 11"), Inbound::EepromRow("0x0000 00 11"));
        assert_eq!(route("boot ok"), Inbound::Unrecognized("boot ok"));
    }

    #[test]
    fn prefix_is_case_sensitive() {
        assert_eq!(route("live:1"), Inbound::Unrecognized("live:1"));
        assert_eq!(route("0X10 00"), Inbound::Unrecognized("0X10 00"));
    }

    #[test]
    fn empty_body_is_still_telemetry() {
        assert_eq!(route("LIVE:"), Inbound::Telemetry(""));
    }
}
