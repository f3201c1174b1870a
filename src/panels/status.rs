//! src/panels/status.rs
//!
//! Last telemetry frame and line counters.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::protocol::TelemetryFrame;
use crate::session::LineStats;

pub struct StatusPanel<'a> {
    pub frame: Option<&'a TelemetryFrame>,
    pub stats: LineStats,
}

impl<'a> StatusPanel<'a> {
    pub fn new(frame: Option<&'a TelemetryFrame>, stats: LineStats) -> Self {
        Self { frame, stats }
    }
}

impl crate::ui::Panel for StatusPanel<'_> {
    fn draw(&self, f: &mut Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = match self.frame {
            Some(frame) => frame.summary_lines().into_iter().map(Line::from).collect(),
            None => vec![Line::styled(
                "no telemetry yet",
                Style::default().fg(Color::DarkGray),
            )],
        };
        let s = self.stats;
        lines.push(Line::styled(
            format!(
                "lines {}  live {}  malformed {}  other {}",
                s.received, s.telemetry, s.malformed, s.unrecognized
            ),
            Style::default().fg(Color::DarkGray),
        ));
        let p = Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(Block::default().title("Status").borders(Borders::ALL));
        f.render_widget(p, area);
    }
}
