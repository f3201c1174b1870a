//! src/link.rs
//!
//! Serial transport: opens the port, frames inbound bytes into trimmed lines
//! on a reader thread, and writes outbound commands.
//!
//! The reader thread never touches session state. It forwards lines over a
//! channel in arrival order and the UI loop feeds them to the session one
//! at a time.

use std::io::{BufRead, BufReader, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, unbounded};
use serialport::SerialPort;
use tracing::{debug, error, info, warn};

use crate::error::{MonitorError, Result};
use crate::protocol::Command;

/// Outbound seam. Sends are fire-and-forget: replies, if any, arrive later
/// as ordinary inbound lines.
pub trait CommandSink {
    fn is_open(&self) -> bool;
    fn send(&mut self, cmd: &Command) -> Result<()>;
}

/// What the reader thread reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    Line(String),
    Closed(String),
}

/// Ports the OS knows about, as (name, description).
pub fn list_ports() -> Result<Vec<(String, String)>> {
    let ports = serialport::available_ports()?;
    Ok(ports
        .into_iter()
        .map(|p| {
            let desc = match &p.port_type {
                serialport::SerialPortType::UsbPort(usb) => usb
                    .product
                    .clone()
                    .unwrap_or_else(|| format!("USB {:04x}:{:04x}", usb.vid, usb.pid)),
                serialport::SerialPortType::PciPort => "PCI".into(),
                serialport::SerialPortType::BluetoothPort => "Bluetooth".into(),
                serialport::SerialPortType::Unknown => String::new(),
            };
            (p.port_name, desc)
        })
        .collect())
}

/// Writer half of an open port plus the receiving end of its reader.
pub struct SerialLink {
    port_name: Option<String>,
    writer: Option<Box<dyn SerialPort>>,
    running: Arc<AtomicBool>,
    events_tx: Sender<LinkEvent>,
    events_rx: Receiver<LinkEvent>,
}

impl Default for SerialLink {
    fn default() -> Self {
        Self::new()
    }
}

impl SerialLink {
    pub fn new() -> Self {
        let (events_tx, events_rx) = unbounded();
        Self {
            port_name: None,
            writer: None,
            running: Arc::new(AtomicBool::new(false)),
            events_tx,
            events_rx,
        }
    }

    pub fn port_name(&self) -> Option<&str> {
        self.port_name.as_deref()
    }

    /// Inbound lines and close notifications.
    pub fn events(&self) -> &Receiver<LinkEvent> {
        &self.events_rx
    }

    /// Open `port_name` and spawn its reader thread. An already open port is
    /// closed first.
    pub fn open(&mut self, port_name: &str, baud_rate: u32) -> Result<()> {
        self.close();
        info!(port = port_name, baud_rate, "opening serial port");
        let port = serialport::new(port_name, baud_rate)
            .timeout(Duration::from_millis(100))
            .open()?;
        let reader = port.try_clone()?;
        self.running = Arc::new(AtomicBool::new(true));
        spawn_reader(
            port_name.to_string(),
            reader,
            self.events_tx.clone(),
            self.running.clone(),
        );
        self.writer = Some(port);
        self.port_name = Some(port_name.to_string());
        Ok(())
    }

    /// Drop the writer and stop the reader thread.
    pub fn close(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(name) = self.port_name.take() {
            info!(port = %name, "serial port closed");
        }
        self.writer = None;
    }
}

impl CommandSink for SerialLink {
    fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    fn send(&mut self, cmd: &Command) -> Result<()> {
        let Some(port) = self.writer.as_mut() else {
            debug!(%cmd, "send dropped: port not open");
            return Err(MonitorError::IoUnavailable);
        };
        port.write_all(cmd.to_wire().as_bytes())?;
        debug!(%cmd, "sent");
        Ok(())
    }
}

fn spawn_reader(
    port_name: String,
    port: Box<dyn SerialPort>,
    tx: Sender<LinkEvent>,
    running: Arc<AtomicBool>,
) {
    thread::spawn(move || {
        let mut reader = BufReader::new(port);
        let mut buf = Vec::new();
        while running.load(Ordering::Relaxed) {
            // a timeout keeps the partial line in `buf`
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => {
                    let _ = tx.send(LinkEvent::Closed("end of stream".into()));
                    break;
                }
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf).trim().to_string();
                    buf.clear();
                    if line.is_empty() {
                        continue;
                    }
                    if tx.send(LinkEvent::Line(line)).is_err() {
                        break;
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => continue,
                Err(e) => {
                    error!(port = %port_name, "serial read failed: {}", e);
                    let _ = tx.send(LinkEvent::Closed(e.to_string()));
                    break;
                }
            }
        }
        warn!(port = %port_name, "serial reader exiting");
    });
}

/// Sink that records what would have been written.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub open: bool,
    pub sent: Vec<Command>,
}

impl RecordingSink {
    pub fn connected() -> Self {
        Self {
            open: true,
            sent: Vec::new(),
        }
    }

    pub fn disconnected() -> Self {
        Self::default()
    }

    /// Wire text of everything sent so far.
    pub fn wire(&self) -> Vec<String> {
        self.sent.iter().map(|c| c.to_string()).collect()
    }
}

impl CommandSink for RecordingSink {
    fn is_open(&self) -> bool {
        self.open
    }

    fn send(&mut self, cmd: &Command) -> Result<()> {
        if !self.open {
            return Err(MonitorError::IoUnavailable);
        }
        self.sent.push(cmd.clone());
        Ok(())
    }
}
