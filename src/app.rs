//! src/app.rs
//!
//! Terminal front end for the detector monitor.
//!
//! Owns the serial link and the [`Session`], turns key and mouse input into
//! session events, drains inbound lines from the reader thread and fires
//! due timers, then redraws. All session mutation happens on this thread.
//!
//! # Screens
//!
//! - **1** Charts: both loops plus the last status frame.
//! - **2** Parameters: the register table.
//! - **3** EEPROM: the hex dump.
//!
//! # Keys (all screens)
//!
//! - **q** quit, **c** connect, **d** disconnect, **l** toggle live mode
//! - **:** command prompt (any device command, e.g. `sens1_low=120`)
//!
//! # Keys (charts)
//!
//! - **Tab** focus the other loop
//! - **+ / -** zoom in / out, **0** reset view
//! - **arrows** pan, **PgUp / PgDn / Home / End** scroll
//! - **x** clear the loop, **w** save it, **o** load it (disconnected only)
//! - **k** calibrate the focused loop
//! - **r** reset MCU, **t** LED test, **F** format EEPROM (asks first)
//!
//! The mouse works on the charts too: wheel zooms about the pointer, left
//! drag pans, middle click resets the view.
//!
//! # Keys (parameters)
//!
//! - **Up / Down** select, **Enter** edit / submit, **Esc** cancel
//! - **g** refresh, **L** load from device EEPROM, **S** save to it
//!
//! # Keys (EEPROM)
//!
//! - **g** refresh, **Up / Down / PgUp / PgDn** scroll

use std::cell::Cell;
use std::io::stdout;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event as TermEvent, KeyCode, KeyEvent,
    KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use ratatui::layout::{Constraint, Direction, Position, Rect};
use ratatui::style::{Color, Style};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::{MonitorError, Result};
use crate::graph::{ChannelId, Zoom, snapshot};
use crate::link::{CommandSink, LinkEvent, SerialLink, list_ports};
use crate::panels::{
    EepromPanel, GraphPanel, ParagraphPanel, ParamsPanel, StatusPanel, TitlePanel,
};
use crate::protocol::Command;
use crate::protocol::eeprom::ROWS;
use crate::session::{Event, Session, ViewAction};
use crate::ui::{Node, group, leaf};

const FRAME_TIME: Duration = Duration::from_millis(50);
const PAN_CELLS: f64 = 5.0;
const MESSAGE_TTL: Duration = Duration::from_secs(5);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Screen {
    Charts,
    Parameters,
    Eeprom,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Input {
    Normal,
    /// Typing a value into the selected parameter row.
    EditValue(String),
    /// Typing a free-form device command.
    Prompt(String),
    ConfirmFormat,
}

struct App {
    config: AppConfig,
    session: Session,
    link: SerialLink,
    screen: Screen,
    input: Input,
    focused: ChannelId,
    selected_row: usize,
    eeprom_top: usize,
    plot_areas: [Cell<Rect>; 2],
    drag_from: Option<(u16, u16)>,
    message: Option<(String, bool, Instant)>,
    running: bool,
}

impl App {
    fn new(config: AppConfig) -> Self {
        let session = Session::new(&config);
        Self {
            config,
            session,
            link: SerialLink::new(),
            screen: Screen::Charts,
            input: Input::Normal,
            focused: ChannelId::Loop1,
            selected_row: 0,
            eeprom_top: 0,
            plot_areas: [Cell::new(Rect::default()), Cell::new(Rect::default())],
            drag_from: None,
            message: None,
            running: true,
        }
    }

    fn info(&mut self, text: impl Into<String>) {
        self.message = Some((text.into(), false, Instant::now()));
    }

    fn error(&mut self, err: &MonitorError) {
        warn!("{}", err);
        self.message = Some((err.to_string(), true, Instant::now()));
    }

    fn report(&mut self, res: Result<()>, ok: &str) {
        match res {
            Ok(()) => {
                if !ok.is_empty() {
                    self.info(ok);
                }
            }
            Err(e) => self.error(&e),
        }
    }

    /// Feed one event to the session with the link as sink.
    fn dispatch(&mut self, event: Event) -> Result<()> {
        self.session.handle(event, Instant::now(), &mut self.link)
    }

    fn connect(&mut self) {
        if self.link.is_open() {
            return;
        }
        let port = match self.config.serial.port.clone() {
            Some(p) => p,
            None => match list_ports() {
                Ok(ports) if !ports.is_empty() => ports[0].0.clone(),
                Ok(_) => {
                    self.info("No serial port found");
                    return;
                }
                Err(e) => {
                    self.error(&e);
                    return;
                }
            },
        };
        match self.link.open(&port, self.config.serial.baud_rate) {
            Ok(()) => self.info(format!("Connected to {}", port)),
            Err(e) => self.error(&e),
        }
    }

    fn disconnect(&mut self) {
        self.session.on_disconnect();
        self.link.close();
        self.info("Disconnected");
    }

    /// Drain the reader thread, then fire due timers.
    fn pump(&mut self) {
        while let Ok(ev) = self.link.events().try_recv() {
            match ev {
                LinkEvent::Line(line) => self.session.handle_line(&line),
                LinkEvent::Closed(reason) => {
                    warn!(%reason, "link closed");
                    self.session.on_disconnect();
                    self.link.close();
                    self.info(format!("Link closed: {}", reason));
                }
            }
        }
        let now = Instant::now();
        for ev in self.session.due_events(now) {
            if let Err(e) = self.session.handle(ev, now, &mut self.link) {
                self.error(&e);
            }
        }
        if self
            .message
            .as_ref()
            .is_some_and(|(_, _, at)| at.elapsed() > MESSAGE_TTL)
        {
            self.message = None;
        }
    }

    fn series_path(&self, id: ChannelId) -> std::path::PathBuf {
        snapshot::default_path(&self.config.paths.series_dir, id)
    }

    fn on_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        match std::mem::replace(&mut self.input, Input::Normal) {
            Input::Normal => self.on_normal_key(key.code),
            Input::EditValue(text) => self.on_edit_key(key.code, text),
            Input::Prompt(text) => self.on_prompt_key(key.code, text),
            Input::ConfirmFormat => {
                if matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
                    let res = self.dispatch(Event::Device(Command::Format));
                    self.report(res, "EEPROM format sent");
                } else {
                    self.info("Format cancelled");
                }
            }
        }
    }

    fn on_normal_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') => self.running = false,
            KeyCode::Char('1') => self.screen = Screen::Charts,
            KeyCode::Char('2') => {
                self.screen = Screen::Parameters;
                if self.link.is_open() {
                    let res = self.dispatch(Event::Device(Command::Param));
                    self.report(res, "");
                }
            }
            KeyCode::Char('3') => {
                self.screen = Screen::Eeprom;
                if self.link.is_open() {
                    let res = self.dispatch(Event::Device(Command::Eeprom));
                    self.report(res, "");
                }
            }
            KeyCode::Char('c') => self.connect(),
            KeyCode::Char('d') => self.disconnect(),
            KeyCode::Char('l') => {
                let on = !self.session.is_live();
                let res = self.dispatch(Event::SetLive(on));
                self.report(res, if on { "Live: ON" } else { "Live: OFF" });
            }
            KeyCode::Char(':') => self.input = Input::Prompt(String::new()),
            _ => match self.screen {
                Screen::Charts => self.on_chart_key(code),
                Screen::Parameters => self.on_params_key(code),
                Screen::Eeprom => self.on_eeprom_key(code),
            },
        }
    }

    fn view(&mut self, action: ViewAction) {
        self.session.view(self.focused, action);
    }

    fn plot_size(&self, id: ChannelId) -> (f64, f64) {
        let r = self.plot_areas[id.index()].get();
        (r.width as f64, r.height as f64)
    }

    fn on_chart_key(&mut self, code: KeyCode) {
        let window = self.config.graph.window_width as isize;
        let plot = self.plot_size(self.focused);
        match code {
            KeyCode::Tab => self.focused = self.focused.other(),
            KeyCode::Char('+') | KeyCode::Char('=') => self.view(ViewAction::Zoom(Zoom::In)),
            KeyCode::Char('-') => self.view(ViewAction::Zoom(Zoom::Out)),
            KeyCode::Char('0') => self.view(ViewAction::ResetView),
            KeyCode::Left => self.view(ViewAction::Pan { dx: PAN_CELLS, dy: 0.0, plot }),
            KeyCode::Right => self.view(ViewAction::Pan { dx: -PAN_CELLS, dy: 0.0, plot }),
            KeyCode::Up => self.view(ViewAction::Pan { dx: 0.0, dy: 1.0, plot }),
            KeyCode::Down => self.view(ViewAction::Pan { dx: 0.0, dy: -1.0, plot }),
            KeyCode::PageUp | KeyCode::PageDown | KeyCode::Home | KeyCode::End => {
                if !self.session.channel(self.focused).scroll.enabled {
                    self.info("Scrolling is available with live mode off and more than one window of data");
                    return;
                }
                let action = match code {
                    KeyCode::PageUp => ViewAction::ScrollBy(-window),
                    KeyCode::PageDown => ViewAction::ScrollBy(window),
                    KeyCode::Home => ViewAction::ScrollTo(0),
                    _ => ViewAction::ScrollTo(usize::MAX),
                };
                self.view(action);
            }
            KeyCode::Char('x') => {
                self.view(ViewAction::Clear);
                self.info(format!("Loop {} cleared", self.focused.number()));
            }
            KeyCode::Char('w') => {
                let path = self.series_path(self.focused);
                let res = self.session.save_series(self.focused, &path);
                self.report(res, &format!("Saved {}", path.display()));
            }
            KeyCode::Char('o') => {
                let path = self.series_path(self.focused);
                match self
                    .session
                    .load_series(self.focused, &path, self.link.is_open())
                {
                    Ok(n) => self.info(format!(
                        "Loop {} loaded: {} samples",
                        self.focused.number(),
                        n
                    )),
                    Err(e) => self.error(&e),
                }
            }
            KeyCode::Char('k') => {
                let cmd = match self.focused {
                    ChannelId::Loop1 => Command::Cal1,
                    ChannelId::Loop2 => Command::Cal2,
                };
                let res = self.dispatch(Event::Device(cmd));
                self.report(res, "Calibration requested");
            }
            KeyCode::Char('r') => {
                let res = self.dispatch(Event::Device(Command::Reset));
                self.report(res, "Reset sent");
            }
            KeyCode::Char('t') => {
                let res = self.dispatch(Event::Device(Command::LedTest));
                self.report(res, "LED test sent");
            }
            KeyCode::Char('F') => {
                if self.session.is_live() {
                    self.error(&MonitorError::LiveActive);
                } else {
                    self.input = Input::ConfirmFormat;
                }
            }
            _ => {}
        }
    }

    fn on_params_key(&mut self, code: KeyCode) {
        let rows = self.session.params().table().len();
        match code {
            KeyCode::Up => self.selected_row = self.selected_row.saturating_sub(1),
            KeyCode::Down => {
                self.selected_row = (self.selected_row + 1).min(rows.saturating_sub(1))
            }
            // typing replaces the value rather than appending to it
            KeyCode::Enter => self.input = Input::EditValue(String::new()),
            KeyCode::Char('g') => {
                let res = self.dispatch(Event::Device(Command::Param));
                self.report(res, "Parameters requested");
            }
            KeyCode::Char('L') => {
                let res = self.dispatch(Event::Device(Command::Load));
                self.report(res, "Loading stored parameters");
            }
            KeyCode::Char('S') => {
                let res = self.dispatch(Event::Device(Command::Save));
                self.report(res, "Parameters saved on device");
            }
            _ => {}
        }
    }

    fn on_edit_key(&mut self, code: KeyCode, mut text: String) {
        let row = self.selected_row;
        match code {
            KeyCode::Esc => self.session.cancel_edit(row),
            KeyCode::Enter => {
                let res = self.dispatch(Event::EditIntent {
                    row,
                    text: text.clone(),
                });
                self.report(res, "");
            }
            KeyCode::Backspace => {
                text.pop();
                self.session.preview_edit(row, &text);
                self.input = Input::EditValue(text);
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '-' => {
                text.push(c);
                self.session.preview_edit(row, &text);
                self.input = Input::EditValue(text);
            }
            _ => self.input = Input::EditValue(text),
        }
    }

    fn on_prompt_key(&mut self, code: KeyCode, mut text: String) {
        match code {
            KeyCode::Esc => {}
            KeyCode::Enter => match text.parse::<Command>() {
                Ok(cmd) => {
                    let shown = cmd.to_string();
                    let res = self.dispatch(Event::Device(cmd));
                    self.report(res, &format!("Sent {}", shown));
                }
                Err(e) => self.error(&e),
            },
            KeyCode::Backspace => {
                text.pop();
                self.input = Input::Prompt(text);
            }
            KeyCode::Char(c) => {
                text.push(c);
                self.input = Input::Prompt(text);
            }
            _ => self.input = Input::Prompt(text),
        }
    }

    fn on_eeprom_key(&mut self, code: KeyCode) {
        let last = ROWS.saturating_sub(1);
        match code {
            KeyCode::Up => self.eeprom_top = self.eeprom_top.saturating_sub(1),
            KeyCode::Down => self.eeprom_top = (self.eeprom_top + 1).min(last),
            KeyCode::PageUp => self.eeprom_top = self.eeprom_top.saturating_sub(16),
            KeyCode::PageDown => self.eeprom_top = (self.eeprom_top + 16).min(last),
            KeyCode::Char('g') => {
                let res = self.dispatch(Event::Device(Command::Eeprom));
                self.report(res, "EEPROM requested");
            }
            _ => {}
        }
    }

    /// Chart under a terminal cell, with the cell's offset inside the plot.
    fn chart_at(&self, column: u16, row: u16) -> Option<(ChannelId, Rect)> {
        ChannelId::ALL.into_iter().find_map(|id| {
            let r = self.plot_areas[id.index()].get();
            r.contains(Position::new(column, row)).then_some((id, r))
        })
    }

    fn on_mouse(&mut self, m: MouseEvent) {
        if self.screen != Screen::Charts {
            return;
        }
        match m.kind {
            MouseEventKind::ScrollUp | MouseEventKind::ScrollDown => {
                let Some((id, rect)) = self.chart_at(m.column, m.row) else {
                    return;
                };
                let vp = self.session.channel(id).viewport;
                let frac = (m.column - rect.x) as f64 / rect.width.max(1) as f64;
                let anchor = vp.min + frac * vp.span();
                let zoom = if m.kind == MouseEventKind::ScrollUp {
                    Zoom::In
                } else {
                    Zoom::Out
                };
                self.focused = id;
                self.session.view(id, ViewAction::ZoomAt(zoom, anchor));
            }
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some((id, _)) = self.chart_at(m.column, m.row) {
                    self.focused = id;
                    self.drag_from = Some((m.column, m.row));
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some((x0, y0)) = self.drag_from {
                    let dx = m.column as f64 - x0 as f64;
                    let dy = m.row as f64 - y0 as f64;
                    self.drag_from = Some((m.column, m.row));
                    let plot = self.plot_size(self.focused);
                    self.view(ViewAction::Pan { dx, dy, plot });
                }
            }
            MouseEventKind::Up(MouseButton::Left) => self.drag_from = None,
            MouseEventKind::Down(MouseButton::Middle) => {
                if let Some((id, _)) = self.chart_at(m.column, m.row) {
                    self.focused = id;
                    self.session.view(id, ViewAction::ResetView);
                }
            }
            _ => {}
        }
    }

    fn help_text(&self) -> String {
        match (&self.input, self.screen) {
            (Input::Prompt(text), _) => format!(":{}_", text),
            (Input::ConfirmFormat, _) => {
                "This will erase all EEPROM data. Press y to confirm, any other key to cancel."
                    .to_string()
            }
            (Input::EditValue(_), _) => "Enter=Submit  Esc=Cancel".to_string(),
            (Input::Normal, Screen::Charts) => "1/2/3=Screen  C=Connect  D=Disconnect  L=Live  TAB=Focus  +/-=Zoom  0=Reset view  Arrows=Pan  PgUp/PgDn=Scroll  X=Clear  W=Save  O=Load  K=Cal  R=Reset  T=LED  F=Format  :=Command  Q=Quit".to_string(),
            (Input::Normal, Screen::Parameters) => "Up/Down=Select  Enter=Edit  G=Refresh  Shift-L=Load  Shift-S=Save  1/2/3=Screen  Q=Quit".to_string(),
            (Input::Normal, Screen::Eeprom) => "Up/Down/PgUp/PgDn=Scroll  G=Refresh  1/2/3=Screen  Q=Quit".to_string(),
        }
    }

    fn layout(&self) -> Node<'_> {
        let body = match self.screen {
            Screen::Charts => {
                let charts = ChannelId::ALL
                    .into_iter()
                    .map(|id| {
                        leaf(GraphPanel::new(
                            self.session.channel(id),
                            id == self.focused,
                            &self.plot_areas[id.index()],
                        ))
                    })
                    .collect();
                group(
                    Direction::Vertical,
                    vec![
                        Constraint::Percentage(40),
                        Constraint::Percentage(40),
                        Constraint::Min(5),
                    ],
                    {
                        let mut children: Vec<Node> = charts;
                        children.push(leaf(StatusPanel::new(
                            self.session.status(),
                            self.session.stats(),
                        )));
                        children
                    },
                )
            }
            Screen::Parameters => {
                let editing = match &self.input {
                    Input::EditValue(text) => Some(text.as_str()),
                    _ => None,
                };
                leaf(ParamsPanel::new(
                    self.session.params().table(),
                    self.selected_row,
                    editing,
                ))
            }
            Screen::Eeprom => leaf(EepromPanel::new(self.session.eeprom(), self.eeprom_top)),
        };

        let (msg, msg_style) = match &self.message {
            Some((text, true, _)) => (text.clone(), Style::default().fg(Color::Red)),
            Some((text, false, _)) => (text.clone(), Style::default().fg(Color::Green)),
            None => (String::new(), Style::default()),
        };

        group(
            Direction::Vertical,
            vec![
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(3),
                Constraint::Length(4),
            ],
            vec![
                leaf(TitlePanel::new(
                    "Loop Detector Monitor",
                    self.link.port_name(),
                    self.session.is_live(),
                )),
                body,
                leaf(ParagraphPanel::new(msg, "Message").styled(msg_style)),
                leaf(ParagraphPanel::new(self.help_text(), "Controls")),
            ],
        )
    }
}

pub fn run(config: AppConfig) -> Result<()> {
    let mut app = App::new(config);
    if app.config.serial.port.is_some() {
        app.connect();
    }

    let mut terminal = ratatui::init();
    execute!(stdout(), EnableMouseCapture)?;
    info!("ui started");

    let result = ui_loop(&mut app, &mut terminal);

    let _ = execute!(stdout(), DisableMouseCapture);
    ratatui::restore();
    app.link.close();
    info!("ui stopped");
    result
}

fn ui_loop(app: &mut App, terminal: &mut ratatui::DefaultTerminal) -> Result<()> {
    while app.running {
        let frame_start = Instant::now();

        app.pump();
        terminal.draw(|f| app.layout().draw(f, f.area()))?;

        // wake early for the next timer so polls and refetches stay on time
        let deadline = app
            .session
            .next_deadline()
            .map(|t| t.saturating_duration_since(Instant::now()))
            .unwrap_or(FRAME_TIME)
            .min(FRAME_TIME);
        let mut timeout = deadline;
        while event::poll(timeout)? {
            match event::read()? {
                TermEvent::Key(key) => app.on_key(key),
                TermEvent::Mouse(m) => app.on_mouse(m),
                _ => {}
            }
            timeout = Duration::ZERO;
        }

        let elapsed = frame_start.elapsed();
        if elapsed < Duration::from_millis(5) {
            std::thread::sleep(Duration::from_millis(5) - elapsed);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn press(app: &mut App, code: KeyCode) {
        app.on_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn params_app() -> App {
        let mut app = App::new(AppConfig::default());
        app.screen = Screen::Parameters;
        app
    }

    #[test]
    fn typed_value_replaces_current_one() {
        let mut app = params_app();
        app.session.handle_line(&format!("PARAMETERS:{}", vec!["1200"; 22].join(",")));

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.input, Input::EditValue(String::new()));
        assert_eq!(app.session.params().table().rows()[0].display, "1200");

        press(&mut app, KeyCode::Char('5'));
        assert_eq!(app.input, Input::EditValue("5".into()));
        assert_eq!(app.session.params().table().rows()[0].display, "5");
    }

    #[test]
    fn escape_restores_confirmed_value() {
        let mut app = params_app();
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('4'));
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.session.params().table().rows()[1].display, "42");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.input, Input::Normal);
        assert_eq!(app.session.params().table().rows()[1].display, "0");
    }

    #[test]
    fn submit_without_link_reports_and_rolls_back() {
        let mut app = params_app();
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('7'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.input, Input::Normal);
        assert_eq!(app.session.params().table().rows()[0].value, 0);
        assert_eq!(app.session.params().table().rows()[0].display, "0");
        assert!(app.message.as_ref().is_some_and(|(_, is_error, _)| *is_error));
    }
}
