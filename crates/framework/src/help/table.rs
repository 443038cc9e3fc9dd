//! Terminal tables that drop optional columns on narrow terminals.

use comfy_table::presets::{NOTHING, UTF8_BORDERS_ONLY, UTF8_FULL};
use comfy_table::{Cell, CellAlignment, Color, Table, TableComponent};
use indexmap::IndexMap;
use std::collections::HashMap;

/// Below this many columns only the mandatory columns are rendered.
pub const NARROW_TERMINAL_COLUMNS: usize = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColumnAlignment {
    #[default]
    Left,
    Center,
    Right,
}

impl From<ColumnAlignment> for CellAlignment {
    fn from(value: ColumnAlignment) -> Self {
        match value {
            ColumnAlignment::Left => CellAlignment::Left,
            ColumnAlignment::Center => CellAlignment::Center,
            ColumnAlignment::Right => CellAlignment::Right,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TableStyle {
    /// Box drawing around every cell.
    #[default]
    Full,
    /// Outer border and header rule only.
    Compact,
    /// Borderless, with a rule under the header.
    Console,
}

#[derive(Debug, Clone)]
pub struct ResponsiveTable {
    all_columns: Vec<String>,
    mandatory_columns: Vec<String>,
    alignments: HashMap<String, ColumnAlignment>,
    rows: Vec<IndexMap<String, String>>,
}

impl ResponsiveTable {
    /// `mandatory_columns` should carry enough context to be read alone in
    /// an 80 column terminal.
    pub fn new<A, M, S, T>(all_columns: A, mandatory_columns: M) -> Self
    where
        A: IntoIterator<Item = S>,
        M: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            all_columns: all_columns.into_iter().map(Into::into).collect(),
            mandatory_columns: mandatory_columns.into_iter().map(Into::into).collect(),
            alignments: HashMap::new(),
            rows: Vec::new(),
        }
    }

    pub fn align(mut self, column: impl Into<String>, alignment: ColumnAlignment) -> Self {
        self.alignments.insert(column.into(), alignment);
        self
    }

    /// Cells for columns that are not declared are ignored; missing cells
    /// render empty.
    pub fn push_row<I, K, V>(&mut self, cells: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.rows.push(
            cells
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn visible_columns(&self, terminal_columns: usize) -> &[String] {
        if terminal_columns < NARROW_TERMINAL_COLUMNS {
            &self.mandatory_columns
        } else {
            &self.all_columns
        }
    }

    pub fn render(&self, style: TableStyle, terminal_columns: usize) -> String {
        let columns = self.visible_columns(terminal_columns);
        if columns.is_empty() {
            return String::new();
        }

        let mut table = Table::new();
        match style {
            TableStyle::Full => {
                table.load_preset(UTF8_FULL);
            }
            TableStyle::Compact => {
                table
                    .load_preset(UTF8_BORDERS_ONLY)
                    .set_style(TableComponent::HeaderLines, '─')
                    .set_style(TableComponent::LeftHeaderIntersection, '├')
                    .set_style(TableComponent::RightHeaderIntersection, '┤');
            }
            TableStyle::Console => {
                table
                    .load_preset(NOTHING)
                    .set_style(TableComponent::HeaderLines, '─');
            }
        }
        if console::colors_enabled() {
            table.enforce_styling();
        } else {
            table.force_no_tty();
        }

        table.set_header(columns.iter().map(|c| {
            Cell::new(c)
                .fg(Color::Cyan)
                .set_alignment(CellAlignment::Left)
        }));
        for row in &self.rows {
            table.add_row(
                columns
                    .iter()
                    .map(|c| Cell::new(row.get(c).map(String::as_str).unwrap_or_default())),
            );
        }
        for (i, c) in columns.iter().enumerate() {
            let alignment = self.alignments.get(c).copied().unwrap_or_default();
            if let Some(column) = table.column_mut(i) {
                column.set_cell_alignment(alignment.into());
            }
        }

        table.to_string()
    }
}
