//! src/params/sync.rs
//!
//! Edit -> validate -> send -> debounce -> refetch -> reconcile.
//!
//! Requests and replies are not correlated. After any send the controller
//! asks for a fresh snapshot once the link has been quiet for the debounce
//! period, and whatever snapshot arrives next is taken as the device's
//! truth, even if something else triggered it.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::table::ParameterTable;
use crate::error::{MonitorError, Result};
use crate::link::CommandSink;
use crate::protocol::Command;

#[derive(Debug, Clone)]
pub struct ParamSyncController {
    table: ParameterTable,
    debounce: Duration,
    load_delay: Duration,
    /// When the next `param` refetch is due.
    refetch_at: Option<Instant>,
}

impl ParamSyncController {
    pub fn new(table: ParameterTable, debounce: Duration, load_delay: Duration) -> Self {
        Self {
            table,
            debounce,
            load_delay,
            refetch_at: None,
        }
    }

    pub fn table(&self) -> &ParameterTable {
        &self.table
    }

    /// Show in-progress text on a row. Not validated until submitted.
    pub fn preview_edit(&mut self, row: usize, text: &str) {
        self.table.set_display(row, text);
    }

    /// Drop an in-progress edit.
    pub fn cancel_edit(&mut self, row: usize) {
        self.table.rollback(row);
    }

    /// Validate and send a local edit.
    ///
    /// On rejection, or when the write fails, the row shows its last
    /// confirmed text again and nothing is armed. On success `name=value` goes out immediately and a refetch
    /// is (re)armed `debounce` after `now`.
    pub fn submit_edit(
        &mut self,
        row: usize,
        text: &str,
        now: Instant,
        sink: &mut dyn CommandSink,
    ) -> Result<()> {
        let value = match self.table.validate(row, text) {
            Ok(v) => v,
            Err(e) => {
                warn!("edit rejected: {}", e);
                self.table.rollback(row);
                return Err(e);
            }
        };
        if !sink.is_open() {
            self.table.rollback(row);
            return Err(MonitorError::IoUnavailable);
        }
        // validate() guarantees the row exists
        let name = self.table.rows()[row].name().to_string();
        if let Err(e) = sink.send(&Command::set(&name, value)) {
            warn!(name, value, "edit not sent: {}", e);
            self.table.rollback(row);
            return Err(e);
        }
        self.table.commit(row, value);
        self.table.mark_sent(row);
        self.refetch_at = Some(now + self.debounce);
        debug!(name, value, "edit sent");
        Ok(())
    }

    /// Apply a `PARAMETERS:` body. Malformed snapshots are dropped.
    pub fn on_snapshot(&mut self, body: &str) -> Result<()> {
        self.table.apply_snapshot(body).inspect_err(|e| {
            warn!("parameter snapshot discarded: {}", e);
        })
    }

    /// Ask for a fresh snapshot now.
    pub fn refresh(&mut self, sink: &mut dyn CommandSink) -> Result<()> {
        sink.send(&Command::Param)
    }

    /// Restore the stored configuration on the device and read it back
    /// after `load_delay`.
    pub fn load_from_device(&mut self, now: Instant, sink: &mut dyn CommandSink) -> Result<()> {
        sink.send(&Command::Load)?;
        self.refetch_at = Some(now + self.load_delay);
        info!("device load requested");
        Ok(())
    }

    pub fn save_to_device(&mut self, sink: &mut dyn CommandSink) -> Result<()> {
        sink.send(&Command::Save)?;
        info!("device save requested");
        Ok(())
    }

    pub fn refetch_deadline(&self) -> Option<Instant> {
        self.refetch_at
    }

    /// True once the armed refetch is due.
    pub fn refetch_due(&self, now: Instant) -> bool {
        self.refetch_at.is_some_and(|t| now >= t)
    }

    /// Debounce elapsed: disarm and request the snapshot.
    pub fn on_debounce_elapsed(&mut self, sink: &mut dyn CommandSink) -> Result<()> {
        if self.refetch_at.take().is_none() {
            return Ok(());
        }
        self.refresh(sink)
    }
}
