//! src/protocol/eeprom.rs
//!
//! EEPROM dump lines (`0x0010 01 02 ... 10`) and the sparse 128x16 dump
//! snapshot they fill.

use tracing::trace;

use super::router::EEPROM_MARKER;

pub const ROW_BYTES: usize = 16;
pub const ROWS: usize = 128;
pub const PLACEHOLDER: &str = "--";

/// One decoded line: target row plus its 16 cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EepromRow {
    pub row: usize,
    /// Address token exactly as received, `0x` included.
    pub address: String,
    pub bytes: [String; ROW_BYTES],
}

impl EepromRow {
    /// Decode one line. Returns `None` for anything that is not a dump row;
    /// dump rows share the wire with every other line.
    pub fn decode(line: &str) -> Option<Self> {
        if !line.starts_with(EEPROM_MARKER) {
            return None;
        }
        let mut tokens = line.split_whitespace();
        let addr_token = tokens.next()?;
        let addr = usize::from_str_radix(&addr_token[EEPROM_MARKER.len()..], 16).ok()?;
        let row = addr / ROW_BYTES;
        if row >= ROWS {
            trace!(addr, "eeprom address out of range");
            return None;
        }
        let supplied: Vec<&str> = tokens.take(ROW_BYTES).collect();
        if supplied.is_empty() {
            return None;
        }
        let bytes = std::array::from_fn(|i| {
            supplied
                .get(i)
                .map(|s| s.to_string())
                .unwrap_or_else(|| PLACEHOLDER.to_string())
        });
        Some(Self {
            row,
            address: addr_token.to_string(),
            bytes,
        })
    }
}

/// Whole-device dump. Rows not yet received are `None`.
#[derive(Debug, Clone)]
pub struct EepromDump {
    rows: Vec<Option<EepromRow>>,
}

impl Default for EepromDump {
    fn default() -> Self {
        Self {
            rows: vec![None; ROWS],
        }
    }
}

impl EepromDump {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every row; done before each new dump request.
    pub fn clear(&mut self) {
        self.rows.iter_mut().for_each(|r| *r = None);
    }

    /// Overwrite one row. Other rows are left alone.
    pub fn apply(&mut self, row: EepromRow) {
        let idx = row.row;
        self.rows[idx] = Some(row);
    }

    /// Decode and apply, returning whether the line was a dump row.
    pub fn apply_line(&mut self, line: &str) -> bool {
        match EepromRow::decode(line) {
            Some(row) => {
                self.apply(row);
                true
            }
            None => false,
        }
    }

    pub fn row(&self, idx: usize) -> Option<&EepromRow> {
        self.rows.get(idx).and_then(|r| r.as_ref())
    }

    pub fn rows(&self) -> &[Option<EepromRow>] {
        &self.rows
    }

    pub fn filled_rows(&self) -> usize {
        self.rows.iter().filter(|r| r.is_some()).count()
    }

    /// Text of a single cell; unseen cells read as the placeholder.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.row(row)
            .and_then(|r| r.bytes.get(col))
            .map(String::as_str)
            .unwrap_or(PLACEHOLDER)
    }
}
