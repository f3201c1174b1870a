//! src/protocol/command.rs
//!
//! Outbound command set and its wire encoding.

use std::fmt;
use std::str::FromStr;

use crate::error::MonitorError;

/// A command for the device. Rendered lower-case and CRLF terminated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Request one `LIVE:` line.
    Live,
    /// Request the EEPROM dump.
    Eeprom,
    /// Request a `PARAMETERS:` snapshot.
    Param,
    /// Restore stored parameters on the device.
    Load,
    /// Persist current parameters on the device.
    Save,
    Reset,
    LedTest,
    Format,
    Cal1,
    Cal2,
    /// `<name>=<value>`
    Set { name: String, value: i32 },
}

impl Command {
    pub fn set(name: &str, value: i32) -> Self {
        Command::Set {
            name: name.to_ascii_lowercase(),
            value,
        }
    }

    /// Bytes written to the port.
    pub fn to_wire(&self) -> String {
        format!("{}\r\n", self)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let word = match self {
            Command::Live => "live",
            Command::Eeprom => "eeprom",
            Command::Param => "param",
            Command::Load => "load",
            Command::Save => "save",
            Command::Reset => "reset",
            Command::LedTest => "led_test",
            Command::Format => "format",
            Command::Cal1 => "cal1",
            Command::Cal2 => "cal2",
            Command::Set { name, value } => {
                return write!(f, "{}={}", name.to_ascii_lowercase(), value);
            }
        };
        f.write_str(word)
    }
}

impl FromStr for Command {
    type Err = MonitorError;

    /// Case-insensitive. `name=value` is accepted for any name; checking it
    /// against the register schema is the parameter table's job.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().to_ascii_lowercase();
        if let Some((name, value)) = text.split_once('=') {
            let value = value
                .trim()
                .parse::<i32>()
                .map_err(|_| MonitorError::NumericParse {
                    field: "command value",
                    text: value.to_string(),
                })?;
            return Ok(Command::set(name.trim(), value));
        }
        Ok(match text.as_str() {
            "live" => Command::Live,
            "eeprom" => Command::Eeprom,
            "param" => Command::Param,
            "load" => Command::Load,
            "save" => Command::Save,
            "reset" => Command::Reset,
            "led_test" => Command::LedTest,
            "format" => Command::Format,
            "cal1" => Command::Cal1,
            "cal2" => Command::Cal2,
            _ => return Err(MonitorError::UnknownCommand(s.trim().to_string())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_format_is_lowercase_crlf() {
        assert_eq!(Command::LedTest.to_wire(), "led_test\r\n");
        assert_eq!(Command::set("Sens1_Low", 120).to_wire(), "sens1_low=120\r\n");
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("LIVE".parse::<Command>().unwrap(), Command::Live);
        assert_eq!(" Cal2 ".parse::<Command>().unwrap(), Command::Cal2);
        assert_eq!(
            "MODE3=1".parse::<Command>().unwrap(),
            Command::set("mode3", 1)
        );
    }

    #[test]
    fn rejects_unknown_and_bad_values() {
        assert!(matches!(
            "blink".parse::<Command>(),
            Err(MonitorError::UnknownCommand(_))
        ));
        assert!(matches!(
            "pulse_time=abc".parse::<Command>(),
            Err(MonitorError::NumericParse { .. })
        ));
    }
}
