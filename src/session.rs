//! src/session.rs
//!
//! Single-threaded state machine behind the monitor.
//!
//! Everything enters as an [`Event`]: one inbound line, one user intent or
//! one timer expiry. Timers are plain deadlines; the event loop asks
//! [`Session::due_events`] what has expired and feeds those events back in,
//! so there is no callback reentrancy and no locking.
//!
//! Auto-follow is a single flag shared by both channels. It is on exactly
//! while live mode is on.

use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{debug, info, trace, warn};

use crate::config::AppConfig;
use crate::error::{MonitorError, Result};
use crate::graph::{Channel, ChannelId, GraphConfig, Zoom, snapshot};
use crate::link::CommandSink;
use crate::params::{ParamSyncController, ParameterTable};
use crate::protocol::{Command, EepromDump, Inbound, TelemetryFrame, route};

/// Viewport gestures for one channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewAction {
    /// Zoom about the window centre.
    Zoom(Zoom),
    /// Zoom about a data-space x.
    ZoomAt(Zoom, f64),
    /// Drag by `(dx, dy)` over a plot area of `plot` (same units).
    Pan { dx: f64, dy: f64, plot: (f64, f64) },
    ScrollTo(usize),
    ScrollBy(isize),
    /// Back to `[0, window]`.
    ResetView,
    /// Clear the channel's samples.
    Clear,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    LineReceived(String),
    EditIntent { row: usize, text: String },
    PollTick,
    DebounceElapsed,
    SetLive(bool),
    View(ChannelId, ViewAction),
    Device(Command),
}

/// Counters shown in the status area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineStats {
    pub received: u64,
    pub telemetry: u64,
    pub malformed: u64,
    pub unrecognized: u64,
}

pub struct Session {
    channels: [Channel; 2],
    status: Option<TelemetryFrame>,
    eeprom: EepromDump,
    params: ParamSyncController,
    live: bool,
    auto_follow: bool,
    poll_interval: Duration,
    poll_at: Option<Instant>,
    stats: LineStats,
}

impl Session {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_table(config, ParameterTable::default())
    }

    pub fn with_table(config: &AppConfig, table: ParameterTable) -> Self {
        let graph: &GraphConfig = &config.graph;
        Self {
            channels: ChannelId::ALL.map(|id| Channel::new(id, graph.clone())),
            status: None,
            eeprom: EepromDump::new(),
            params: ParamSyncController::new(
                table,
                config.timing.edit_debounce(),
                config.timing.load_refetch(),
            ),
            live: false,
            auto_follow: false,
            poll_interval: config.timing.poll_interval(),
            poll_at: None,
            stats: LineStats::default(),
        }
    }

    pub fn channel(&self, id: ChannelId) -> &Channel {
        &self.channels[id.index()]
    }

    fn channel_mut(&mut self, id: ChannelId) -> &mut Channel {
        &mut self.channels[id.index()]
    }

    /// Last decoded telemetry line, if any.
    pub fn status(&self) -> Option<&TelemetryFrame> {
        self.status.as_ref()
    }

    pub fn eeprom(&self) -> &EepromDump {
        &self.eeprom
    }

    pub fn params(&self) -> &ParamSyncController {
        &self.params
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    pub fn auto_follow(&self) -> bool {
        self.auto_follow
    }

    pub fn stats(&self) -> LineStats {
        self.stats
    }

    /// Process one event.
    pub fn handle(&mut self, event: Event, now: Instant, sink: &mut dyn CommandSink) -> Result<()> {
        match event {
            Event::LineReceived(line) => {
                self.handle_line(&line);
                Ok(())
            }
            Event::EditIntent { row, text } => self.params.submit_edit(row, &text, now, sink),
            Event::PollTick => self.on_poll_tick(now, sink),
            Event::DebounceElapsed => self.params.on_debounce_elapsed(sink),
            Event::SetLive(on) => self.set_live(on, now, sink),
            Event::View(id, action) => {
                self.view(id, action);
                Ok(())
            }
            Event::Device(cmd) => self.device(cmd, now, sink),
        }
    }

    /// Route and apply one inbound line. Malformed or unknown lines are
    /// logged and dropped.
    pub fn handle_line(&mut self, line: &str) {
        self.stats.received += 1;
        match route(line) {
            Inbound::Telemetry(body) => match TelemetryFrame::decode(body) {
                Ok(frame) => self.apply_telemetry(frame),
                Err(e) => {
                    self.stats.malformed += 1;
                    debug!(line, "telemetry dropped: {}", e);
                }
            },
            Inbound::ParametersSnapshot(body) => {
                if self.params.on_snapshot(body).is_err() {
                    self.stats.malformed += 1;
                }
            }
            Inbound::EepromRow(row) => {
                if !self.eeprom.apply_line(row) {
                    trace!(line, "not an eeprom row");
                }
            }
            Inbound::Unrecognized(line) => {
                self.stats.unrecognized += 1;
                trace!(line, "unrecognized line");
            }
        }
    }

    fn apply_telemetry(&mut self, frame: TelemetryFrame) {
        self.stats.telemetry += 1;
        let follow = self.auto_follow;
        for id in ChannelId::ALL {
            if let Some(freq) = frame.frequency[id.index()] {
                self.channel_mut(id).append(freq, follow);
            }
        }
        let missing = frame.missing_fields();
        if missing > 0 {
            debug!(missing, "telemetry fields absent");
        }
        self.status = Some(frame);
    }

    /// Turn live polling on or off. Turning it off does not cancel an armed
    /// parameter refetch.
    pub fn set_live(&mut self, on: bool, now: Instant, sink: &mut dyn CommandSink) -> Result<()> {
        if on == self.live {
            return Ok(());
        }
        if on {
            if !sink.is_open() {
                return Err(MonitorError::IoUnavailable);
            }
            self.live = true;
            self.auto_follow = true;
            self.poll_at = Some(now + self.poll_interval);
            for ch in &mut self.channels {
                ch.set_scroll_enabled(false);
            }
            info!("live mode on");
        } else {
            self.stop_live();
        }
        Ok(())
    }

    fn stop_live(&mut self) {
        if !self.live {
            return;
        }
        self.live = false;
        self.auto_follow = false;
        self.poll_at = None;
        for ch in &mut self.channels {
            ch.set_scroll_enabled(true);
        }
        info!("live mode off");
    }

    /// The transport went away.
    pub fn on_disconnect(&mut self) {
        self.stop_live();
    }

    fn on_poll_tick(&mut self, now: Instant, sink: &mut dyn CommandSink) -> Result<()> {
        if !self.live {
            return Ok(());
        }
        self.poll_at = Some(now + self.poll_interval);
        sink.send(&Command::Live)
    }

    /// Timer events whose deadline has passed, in a fixed order.
    pub fn due_events(&self, now: Instant) -> Vec<Event> {
        let mut due = Vec::new();
        if self.live && self.poll_at.is_some_and(|t| now >= t) {
            due.push(Event::PollTick);
        }
        if self.params.refetch_due(now) {
            due.push(Event::DebounceElapsed);
        }
        due
    }

    /// Earliest armed timer.
    pub fn next_deadline(&self) -> Option<Instant> {
        let poll = if self.live { self.poll_at } else { None };
        match (poll, self.params.refetch_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn view(&mut self, id: ChannelId, action: ViewAction) {
        let ch = self.channel_mut(id);
        match action {
            ViewAction::Zoom(z) => ch.zoom(z),
            ViewAction::ZoomAt(z, anchor) => ch.zoom_at(z, anchor),
            ViewAction::Pan { dx, dy, plot } => ch.pan(dx, dy, plot),
            ViewAction::ScrollTo(v) => ch.scroll_to(v),
            ViewAction::ScrollBy(d) => ch.scroll_by(d),
            ViewAction::ResetView => ch.reset_view(),
            ViewAction::Clear => {
                ch.reset();
                info!(channel = ?id, "channel cleared");
            }
        }
    }

    /// User-issued device command.
    pub fn device(&mut self, cmd: Command, now: Instant, sink: &mut dyn CommandSink) -> Result<()> {
        match cmd {
            Command::Reset | Command::LedTest | Command::Format => {
                if self.live {
                    return Err(MonitorError::LiveActive);
                }
                sink.send(&cmd)
            }
            Command::Param => self.params.refresh(sink),
            Command::Load => self.params.load_from_device(now, sink),
            Command::Save => self.params.save_to_device(sink),
            Command::Eeprom => self.request_eeprom(sink),
            Command::Set { name, value } => {
                let row = self
                    .params
                    .table()
                    .position(&name)
                    .ok_or(MonitorError::UnknownCommand(name))?;
                self.params.submit_edit(row, &value.to_string(), now, sink)
            }
            Command::Live | Command::Cal1 | Command::Cal2 => sink.send(&cmd),
        }
    }

    /// Start a fresh dump: forget the old one and ask for a new one.
    pub fn request_eeprom(&mut self, sink: &mut dyn CommandSink) -> Result<()> {
        self.eeprom.clear();
        sink.send(&Command::Eeprom)
    }

    pub fn preview_edit(&mut self, row: usize, text: &str) {
        self.params.preview_edit(row, text);
    }

    pub fn cancel_edit(&mut self, row: usize) {
        self.params.cancel_edit(row);
    }

    /// Write a channel to disk. Not while live data is still arriving.
    pub fn save_series(&self, id: ChannelId, path: &Path) -> Result<()> {
        if self.live {
            return Err(MonitorError::LiveActive);
        }
        snapshot::save(path, id, &self.channel(id).store)
    }

    /// Replace a channel from disk. Only while disconnected, so loaded data
    /// never interleaves with live samples.
    pub fn load_series(&mut self, id: ChannelId, path: &Path, connected: bool) -> Result<usize> {
        if connected {
            return Err(MonitorError::Connected);
        }
        let values = snapshot::load(path, id).inspect_err(|e| {
            warn!(?path, "series load failed: {}", e);
        })?;
        let live = self.live;
        let ch = self.channel_mut(id);
        ch.replace(values);
        ch.set_scroll_enabled(!live);
        Ok(ch.sample_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::RecordingSink;

    fn live_line(f0: &str, f1: &str) -> String {
        format!("LIVE:{},{},1,0,1,1,1,1,1,1,1,1,1,1,0,0,1,1,0,0,0,1", f0, f1)
    }

    #[test]
    fn telemetry_appends_to_both_channels() {
        let mut s = Session::new(&AppConfig::default());
        s.handle_line(&live_line("10.5", "20.5"));
        s.handle_line(&live_line("11.5", "21.5"));
        assert_eq!(s.channel(ChannelId::Loop1).sample_count(), 2);
        assert_eq!(s.channel(ChannelId::Loop2).store.samples()[1].value, 21.5);
        assert_eq!(s.stats().telemetry, 2);
    }

    #[test]
    fn bad_frequency_skips_only_its_channel() {
        let mut s = Session::new(&AppConfig::default());
        s.handle_line(&live_line("x", "20"));
        assert_eq!(s.channel(ChannelId::Loop1).sample_count(), 0);
        assert_eq!(s.channel(ChannelId::Loop2).sample_count(), 1);
        assert_eq!(s.status().unwrap().frequency, [None, Some(20.0)]);
    }

    #[test]
    fn malformed_and_unknown_lines_change_nothing() {
        let mut s = Session::new(&AppConfig::default());
        s.handle_line("LIVE:1,2,3");
        s.handle_line("hello");
        s.handle_line("PARAMETERS:1,2");
        assert_eq!(s.channel(ChannelId::Loop1).sample_count(), 0);
        assert!(s.status().is_none());
        assert_eq!(
            s.stats(),
            LineStats {
                received: 3,
                telemetry: 0,
                malformed: 2,
                unrecognized: 1
            }
        );
    }

    #[test]
    fn live_requires_link_and_polls() {
        let mut s = Session::new(&AppConfig::default());
        let t0 = Instant::now();
        let mut closed = RecordingSink::disconnected();
        assert!(matches!(
            s.set_live(true, t0, &mut closed),
            Err(MonitorError::IoUnavailable)
        ));

        let mut sink = RecordingSink::connected();
        s.set_live(true, t0, &mut sink).unwrap();
        assert!(s.auto_follow());
        assert!(s.due_events(t0).is_empty());
        let t1 = t0 + Duration::from_millis(100);
        assert_eq!(s.due_events(t1), vec![Event::PollTick]);
        s.handle(Event::PollTick, t1, &mut sink).unwrap();
        assert_eq!(sink.wire(), vec!["live"]);
        assert_eq!(s.next_deadline(), Some(t1 + Duration::from_millis(100)));

        s.set_live(false, t1, &mut sink).unwrap();
        assert!(!s.auto_follow());
        assert!(s.due_events(t1 + Duration::from_secs(1)).is_empty());
    }

    #[test]
    fn hardware_commands_refused_while_live() {
        let mut s = Session::new(&AppConfig::default());
        let mut sink = RecordingSink::connected();
        let now = Instant::now();
        s.set_live(true, now, &mut sink).unwrap();
        assert!(matches!(
            s.device(Command::Reset, now, &mut sink),
            Err(MonitorError::LiveActive)
        ));
        s.device(Command::Cal1, now, &mut sink).unwrap();
        s.set_live(false, now, &mut sink).unwrap();
        s.device(Command::Format, now, &mut sink).unwrap();
        assert_eq!(sink.wire(), vec!["cal1", "format"]);
    }

    #[test]
    fn eeprom_request_clears_previous_dump() {
        let mut s = Session::new(&AppConfig::default());
        let mut sink = RecordingSink::connected();
        s.handle_line("0x0000 01 02");
        assert_eq!(s.eeprom().filled_rows(), 1);
        s.device(Command::Eeprom, Instant::now(), &mut sink).unwrap();
        assert_eq!(s.eeprom().filled_rows(), 0);
        assert_eq!(sink.wire(), vec!["eeprom"]);
    }

    #[test]
    fn set_command_goes_through_validation() {
        let mut s = Session::new(&AppConfig::default());
        let mut sink = RecordingSink::connected();
        let now = Instant::now();
        s.device(Command::set("mode3", 1), now, &mut sink).unwrap();
        assert!(s.device(Command::set("mode3", 2), now, &mut sink).is_err());
        assert!(matches!(
            s.device(Command::set("nope", 1), now, &mut sink),
            Err(MonitorError::UnknownCommand(_))
        ));
        assert_eq!(sink.wire(), vec!["mode3=1"]);
    }
}
