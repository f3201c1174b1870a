//! src/panels/eeprom.rs
//!
//! Hex grid of the EEPROM dump: address column plus 16 byte columns.

use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
};

use crate::protocol::EepromDump;
use crate::protocol::eeprom::{PLACEHOLDER, ROW_BYTES};

pub struct EepromPanel<'a> {
    pub dump: &'a EepromDump,
    pub top_row: usize,
}

impl<'a> EepromPanel<'a> {
    pub fn new(dump: &'a EepromDump, top_row: usize) -> Self {
        Self { dump, top_row }
    }
}

impl crate::ui::Panel for EepromPanel<'_> {
    fn draw(&self, f: &mut Frame<'_>, area: Rect) {
        let mut header = vec!["Addr".to_string()];
        header.extend((0..ROW_BYTES).map(|i| format!("{:02X}", i)));

        let rows: Vec<Row> = self
            .dump
            .rows()
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let addr = row
                    .as_ref()
                    .map(|r| r.address.clone())
                    .unwrap_or_else(|| format!("0x{:04X}", i * ROW_BYTES));
                let mut cells = vec![Cell::from(addr).style(Style::default().fg(Color::Yellow))];
                cells.extend((0..ROW_BYTES).map(|col| {
                    let text = self.dump.cell(i, col);
                    let style = if text == PLACEHOLDER {
                        Style::default().fg(Color::DarkGray)
                    } else {
                        Style::default()
                    };
                    Cell::from(text.to_string()).style(style)
                }));
                Row::new(cells)
            })
            .collect();

        let mut widths = vec![Constraint::Length(8)];
        widths.extend(std::iter::repeat_n(Constraint::Length(3), ROW_BYTES));

        let title = format!("EEPROM ({} / 128 rows)", self.dump.filled_rows());
        let table = Table::new(rows, widths)
            .header(Row::new(header).style(Style::default().add_modifier(Modifier::BOLD)))
            .block(Block::default().title(title).borders(Borders::ALL));

        let mut state = TableState::default().with_offset(self.top_row);
        f.render_stateful_widget(table, area, &mut state);
    }
}
