//! src/params/table.rs
//!
//! Fixed schema of named, bounded integer registers.
//!
//! Each register carries three views of its value: the confirmed value last
//! reported by the device (or optimistically committed), the text currently
//! on display, and the rollback anchor restored when an edit is rejected.
//! The presentation layer reads [`ParameterTable::rows`] and sends edits in
//! as intents; it never writes cells directly.

use tracing::{debug, warn};

use crate::error::{MonitorError, Result};

/// Name and inclusive upper bound of one register. The lower bound is 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterSpec {
    pub name: String,
    pub high: i32,
}

impl RegisterSpec {
    pub fn new(name: &str, high: i32) -> Self {
        Self {
            name: name.to_string(),
            high,
        }
    }
}

/// The detector's register layout, in `PARAMETERS:` field order.
pub fn reference_schema() -> Vec<RegisterSpec> {
    const WORD: i32 = 65535;
    const FLAG: i32 = 1;
    [
        ("sens1_low", WORD),
        ("sens1_medium", WORD),
        ("sens1_high", WORD),
        ("sens2_low", WORD),
        ("sens2_medium", WORD),
        ("sens2_high", WORD),
        ("open_loop1", WORD),
        ("open_loop2", WORD),
        ("short_loop1", WORD),
        ("short_loop2", WORD),
        ("boost_loop1", WORD),
        ("boost_loop2", WORD),
        ("output_polarity_auf1", FLAG),
        ("output_polarity_auf2", FLAG),
        ("output_polarity_zu", FLAG),
        ("blanking_time", WORD),
        ("pulse_time", WORD),
        ("out_error_polarity", FLAG),
        ("rnd_recal_enable", FLAG),
        ("seq_reset_enable", FLAG),
        ("seq_timeout_ms", WORD),
        ("mode3", FLAG),
    ]
    .into_iter()
    .map(|(name, high)| RegisterSpec::new(name, high))
    .collect()
}

/// Where a register is in the edit round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    #[default]
    Idle,
    /// Validated locally, command not yet written.
    PendingSend,
    /// Command written, waiting for the next snapshot.
    AwaitingReconcile,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterRegister {
    pub spec: RegisterSpec,
    pub value: i32,
    pub display: String,
    pub last_confirmed_text: String,
    pub state: SyncState,
}

impl ParameterRegister {
    fn new(spec: RegisterSpec) -> Self {
        Self {
            spec,
            value: 0,
            display: "0".into(),
            last_confirmed_text: "0".into(),
            state: SyncState::Idle,
        }
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn high(&self) -> i32 {
        self.spec.high
    }

    fn set_confirmed(&mut self, value: i32) {
        self.value = value;
        self.display = value.to_string();
        self.last_confirmed_text = self.display.clone();
    }
}

#[derive(Debug, Clone)]
pub struct ParameterTable {
    registers: Vec<ParameterRegister>,
    snapshots_applied: u64,
}

impl Default for ParameterTable {
    fn default() -> Self {
        Self::new(reference_schema())
    }
}

impl ParameterTable {
    pub fn new(schema: Vec<RegisterSpec>) -> Self {
        Self {
            registers: schema.into_iter().map(ParameterRegister::new).collect(),
            snapshots_applied: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.registers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }

    pub fn rows(&self) -> &[ParameterRegister] {
        &self.registers
    }

    pub fn register(&self, row: usize) -> Option<&ParameterRegister> {
        self.registers.get(row)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.registers
            .iter()
            .position(|r| r.name().eq_ignore_ascii_case(name))
    }

    /// Number of snapshots accepted so far.
    pub fn snapshots_applied(&self) -> u64 {
        self.snapshots_applied
    }

    pub fn has_outstanding_edits(&self) -> bool {
        self.registers.iter().any(|r| r.state != SyncState::Idle)
    }

    /// Apply a `PARAMETERS:` body. The field count must equal the schema
    /// size and every field must be an integer, otherwise the table is left
    /// untouched. Values outside a register's range are clamped into it. A valid snapshot always wins over pending
    /// local edits.
    pub fn apply_snapshot(&mut self, body: &str) -> Result<()> {
        let fields: Vec<&str> = body
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .collect();
        if fields.len() != self.registers.len() {
            return Err(MonitorError::MalformedSnapshot(format!(
                "expected {} values, got {}",
                self.registers.len(),
                fields.len()
            )));
        }
        let mut values = Vec::with_capacity(fields.len());
        for (reg, text) in self.registers.iter().zip(&fields) {
            let Ok(raw) = text.parse::<i64>() else {
                return Err(MonitorError::MalformedSnapshot(format!(
                    "{} = {:?} is not an integer",
                    reg.name(),
                    text
                )));
            };
            let v = raw.clamp(0, reg.high() as i64) as i32;
            if v as i64 != raw {
                warn!(name = reg.name(), device = raw, shown = v, "snapshot value out of range");
            }
            values.push(v);
        }
        for (reg, v) in self.registers.iter_mut().zip(values) {
            if reg.state != SyncState::Idle && reg.value != v {
                debug!(name = reg.name(), local = reg.value, device = v, "snapshot overrides edit");
            }
            reg.set_confirmed(v);
            reg.state = SyncState::Idle;
        }
        self.snapshots_applied += 1;
        Ok(())
    }

    /// Check an edit without changing anything.
    pub fn validate(&self, row: usize, text: &str) -> Result<i32> {
        let reg = self
            .registers
            .get(row)
            .ok_or(MonitorError::UnknownRegister(row))?;
        match text.trim().parse::<i64>() {
            Ok(v) if v >= 0 && v <= reg.high() as i64 => Ok(v as i32),
            _ => Err(MonitorError::ValidationRejected {
                name: reg.name().to_string(),
                text: text.to_string(),
                high: reg.high(),
            }),
        }
    }

    /// Put the last confirmed text back on display.
    pub fn rollback(&mut self, row: usize) {
        if let Some(reg) = self.registers.get_mut(row) {
            if reg.display != reg.last_confirmed_text {
                warn!(name = reg.name(), display = %reg.display, "edit rolled back");
            }
            reg.display = reg.last_confirmed_text.clone();
        }
    }

    /// Show in-progress text for a row (before it is submitted).
    pub fn set_display(&mut self, row: usize, text: &str) {
        if let Some(reg) = self.registers.get_mut(row) {
            reg.display = text.to_string();
        }
    }

    /// Adopt a validated edit optimistically; it becomes the new rollback
    /// anchor until the device says otherwise.
    pub(crate) fn commit(&mut self, row: usize, value: i32) {
        if let Some(reg) = self.registers.get_mut(row) {
            reg.set_confirmed(value);
            reg.state = SyncState::PendingSend;
        }
    }

    pub(crate) fn mark_sent(&mut self, row: usize) {
        if let Some(reg) = self.registers.get_mut(row) {
            reg.state = SyncState::AwaitingReconcile;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_of(values: &[i32]) -> String {
        values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    #[test]
    fn reference_schema_has_22_registers() {
        let t = ParameterTable::default();
        assert_eq!(t.len(), 22);
        assert_eq!(t.rows()[0].name(), "sens1_low");
        assert_eq!(t.rows()[21].name(), "mode3");
        assert_eq!(t.rows()[12].high(), 1);
        assert_eq!(t.position("SEQ_TIMEOUT_MS"), Some(20));
    }

    #[test]
    fn snapshot_overwrites_every_register() {
        let mut t = ParameterTable::default();
        let mut values = vec![7; 22];
        values[21] = 1;
        t.apply_snapshot(&snapshot_of(&values)).unwrap();
        assert!(t.rows()[..21].iter().all(|r| r.value == 7 && r.display == "7"));
        assert_eq!(t.rows()[21].last_confirmed_text, "1");
        assert_eq!(t.snapshots_applied(), 1);
    }

    #[test]
    fn snapshot_with_wrong_count_is_discarded() {
        let mut t = ParameterTable::default();
        assert!(t.apply_snapshot("1,2,3").is_err());
        assert!(t.apply_snapshot(&snapshot_of(&[0; 23])).is_err());
        assert!(t.rows().iter().all(|r| r.value == 0));
        assert_eq!(t.snapshots_applied(), 0);
    }

    #[test]
    fn out_of_range_snapshot_values_are_clamped() {
        let mut t = ParameterTable::default();
        let mut values = vec![3; 22];
        values[13] = 5; // flag register
        values[0] = 70000;
        values[1] = -4;
        t.apply_snapshot(&snapshot_of(&values)).unwrap();
        assert_eq!(t.rows()[13].value, 1);
        assert_eq!(t.rows()[0].value, 65535);
        assert_eq!(t.rows()[0].display, "65535");
        assert_eq!(t.rows()[1].value, 0);
        assert_eq!(t.rows()[2].value, 3);
        assert_eq!(t.snapshots_applied(), 1);
    }

    #[test]
    fn snapshot_with_non_numeric_field_is_discarded_whole() {
        let mut t = ParameterTable::default();
        let mut fields = vec!["3"; 22];
        fields[5] = "x";
        assert!(t.apply_snapshot(&fields.join(",")).is_err());
        assert!(t.rows().iter().all(|r| r.value == 0));
        assert_eq!(t.snapshots_applied(), 0);
    }

    #[test]
    fn empty_fields_are_skipped() {
        let mut t = ParameterTable::new(vec![RegisterSpec::new("a", 9), RegisterSpec::new("b", 9)]);
        t.apply_snapshot("4,,5,").unwrap();
        assert_eq!(t.rows()[0].value, 4);
        assert_eq!(t.rows()[1].value, 5);
    }

    #[test]
    fn validation_bounds() {
        let t = ParameterTable::default();
        assert_eq!(t.validate(0, "65535").unwrap(), 65535);
        assert_eq!(t.validate(0, " 12 ").unwrap(), 12);
        assert!(matches!(
            t.validate(0, "70000"),
            Err(MonitorError::ValidationRejected { high: 65535, .. })
        ));
        assert!(t.validate(0, "-1").is_err());
        assert!(t.validate(0, "abc").is_err());
        assert!(t.validate(12, "2").is_err());
        assert!(matches!(t.validate(99, "1"), Err(MonitorError::UnknownRegister(99))));
    }

    #[test]
    fn rollback_restores_last_confirmed() {
        let mut t = ParameterTable::default();
        t.commit(3, 44);
        t.set_display(3, "9999999");
        t.rollback(3);
        assert_eq!(t.rows()[3].display, "44");
        assert_eq!(t.rows()[3].state, SyncState::PendingSend);
        t.mark_sent(3);
        assert!(t.has_outstanding_edits());
    }
}
