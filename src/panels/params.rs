//! src/panels/params.rs
//!
//! Parameter register table with the row being edited highlighted.

use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
};

use crate::params::{ParameterTable, SyncState};

pub struct ParamsPanel<'a> {
    pub table: &'a ParameterTable,
    pub selected: usize,
    /// Text being typed into the selected row, if editing.
    pub editing: Option<&'a str>,
}

impl<'a> ParamsPanel<'a> {
    pub fn new(table: &'a ParameterTable, selected: usize, editing: Option<&'a str>) -> Self {
        Self {
            table,
            selected,
            editing,
        }
    }
}

fn state_label(state: SyncState) -> (&'static str, Color) {
    match state {
        SyncState::Idle => ("", Color::Reset),
        SyncState::PendingSend => ("sending", Color::Yellow),
        SyncState::AwaitingReconcile => ("pending", Color::Cyan),
    }
}

impl crate::ui::Panel for ParamsPanel<'_> {
    fn draw(&self, f: &mut Frame<'_>, area: Rect) {
        let rows: Vec<Row> = self
            .table
            .rows()
            .iter()
            .enumerate()
            .map(|(i, reg)| {
                let value = match self.editing {
                    Some("") if i == self.selected => format!("_ (was {})", reg.display),
                    Some(text) if i == self.selected => format!("{}_", text),
                    _ => reg.display.clone(),
                };
                let (label, color) = state_label(reg.state);
                Row::new(vec![
                    Cell::from(reg.name().to_string()),
                    Cell::from(value),
                    Cell::from(format!("0..={}", reg.high())),
                    Cell::from(label).style(Style::default().fg(color)),
                ])
            })
            .collect();

        let title = format!(
            "Parameters ({} snapshots)",
            self.table.snapshots_applied()
        );
        let table = Table::new(
            rows,
            [
                Constraint::Percentage(45),
                Constraint::Percentage(20),
                Constraint::Percentage(20),
                Constraint::Percentage(15),
            ],
        )
        .header(
            Row::new(vec!["Parameter", "Value", "Range", ""])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .row_highlight_style(Style::default().fg(Color::Black).bg(Color::Yellow))
        .block(Block::default().title(title).borders(Borders::ALL));

        let mut state = TableState::default().with_selected(Some(self.selected));
        f.render_stateful_widget(table, area, &mut state);
    }
}
