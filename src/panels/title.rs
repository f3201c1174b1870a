//! src/panels/title.rs
//!
//! Header line: connection and live-mode state.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

pub struct TitlePanel<'a> {
    pub title: &'a str,
    pub port: Option<&'a str>,
    pub live: bool,
}

impl<'a> TitlePanel<'a> {
    pub fn new(title: &'a str, port: Option<&'a str>, live: bool) -> Self {
        Self { title, port, live }
    }
}

impl crate::ui::Panel for TitlePanel<'_> {
    fn draw(&self, f: &mut Frame<'_>, area: Rect) {
        let conn = match self.port {
            Some(p) => Span::styled(format!("Connected: {}", p), Style::default().fg(Color::Green)),
            None => Span::styled("Disconnected", Style::default().fg(Color::DarkGray)),
        };
        let live = if self.live {
            Span::styled(
                "LIVE: ON",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )
        } else {
            Span::raw("LIVE: OFF")
        };
        let line = Line::from(vec![
            Span::styled(self.title, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("   "),
            conn,
            Span::raw("   "),
            live,
        ]);
        f.render_widget(
            Paragraph::new(line).block(Block::default().borders(Borders::ALL)),
            area,
        );
    }
}
