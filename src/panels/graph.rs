//! src/panels/graph.rs
//!
//! Chart for one loop: a stats row above the visible window of samples.
//! The scroll position is shown in the chart title.
//!
//! Rendering only. The visible X range and Y range come straight from the
//! channel; nothing here recomputes bounds.

use std::cell::Cell;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
};

use crate::graph::{Channel, ChannelId};

pub fn channel_color(id: ChannelId) -> Color {
    match id {
        ChannelId::Loop1 => Color::Red,
        ChannelId::Loop2 => Color::Blue,
    }
}

pub struct GraphPanel<'a> {
    pub channel: &'a Channel,
    pub focused: bool,
    /// Where the chart ended up, for mapping mouse input back to data.
    pub plot_area: &'a Cell<Rect>,
}

impl<'a> GraphPanel<'a> {
    pub fn new(channel: &'a Channel, focused: bool, plot_area: &'a Cell<Rect>) -> Self {
        Self {
            channel,
            focused,
            plot_area,
        }
    }

    fn title(&self) -> String {
        let ch = self.channel;
        let scroll = if ch.scroll.enabled {
            format!("  scroll {}/{}", ch.scroll.value, ch.scroll.max)
        } else {
            String::new()
        };
        format!(
            "Loop {}  [{:.1} .. {:.1}] of {}{}",
            ch.id.number(),
            ch.viewport.min,
            ch.viewport.max,
            ch.sample_count(),
            scroll
        )
    }
}

impl crate::ui::Panel for GraphPanel<'_> {
    fn draw(&self, f: &mut Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let ch = self.channel;
        let stats_text = match ch.stats() {
            Some((mn, mx, last)) => {
                format!("Min: {:.3}  Max: {:.3}  Last: {:.3}", mn, mx, last)
            }
            None => "no samples in view".to_string(),
        };
        let stats = Paragraph::new(stats_text)
            .block(Block::default().title("Stats").borders(Borders::ALL));
        f.render_widget(stats, chunks[0]);

        let points = ch.visible_points();
        let dataset = Dataset::default()
            .name(format!("Loop {}", ch.id.number()))
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(channel_color(ch.id)))
            .data(points.as_slice());

        let (ymin, ymax) = ch.y_range;
        // a flat range still needs some height to draw into
        let (ylo, yhi) = if (ymax - ymin).abs() < f64::EPSILON {
            let pad = ymin.abs().max(1.0) * 0.1;
            (ymin - pad, ymax + pad)
        } else {
            (ymin, ymax)
        };
        let y_labels: Vec<String> = (0..5)
            .map(|i| format!("{:.1}", ylo + (yhi - ylo) * i as f64 / 4.0))
            .collect();
        let (xmin, xmax) = (ch.viewport.min, ch.viewport.max);
        let x_labels = vec![format!("{:.0}", xmin), format!("{:.0}", xmax)];

        let mut block = Block::default().title(self.title()).borders(Borders::ALL);
        if self.focused {
            block = block.border_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );
        }
        self.plot_area.set(block.inner(chunks[1]));

        let chart = Chart::new(vec![dataset])
            .block(block)
            .x_axis(
                Axis::default()
                    .title("Sample")
                    .bounds([xmin, xmax.max(xmin + 1.0)])
                    .labels(x_labels),
            )
            .y_axis(
                Axis::default()
                    .title("Hz")
                    .bounds([ylo, yhi])
                    .labels(y_labels),
            );
        f.render_widget(chart, chunks[1]);
    }
}
