// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{borrow::Cow, fmt};

use colored::{Color, Colorize};
use unicode_width::UnicodeWidthStr;

pub trait TableColumn<T> {
    fn name(&self) -> Cow<'_, str>;

    fn format<'a>(&self, data: &'a T) -> Cow<'a, str>;

    fn padding_direction(&self) -> PaddingDirection {
        PaddingDirection::Left
    }

    fn get_color(&self, _data: &T) -> Option<Color> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaddingDirection {
    Left,
    Right,
}

/// A plain text table, one row per item.
#[derive(Debug)]
pub struct Table<'a, T, C: TableColumn<T>> {
    columns: &'a [C],
    data: &'a [T],
    separator: &'a str,
    header: bool,
}

impl<'a, T, C: TableColumn<T>> Table<'a, T, C> {
    pub fn new(columns: &'a [C], data: &'a [T]) -> Self {
        Self {
            columns,
            data,
            separator: " ",
            header: false,
        }
    }

    pub fn with_header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }

    pub fn with_separator(mut self, separator: &'a str) -> Self {
        self.separator = separator;
        self
    }

    fn widths(&self, rows: &[Vec<Cow<'_, str>>]) -> Vec<usize> {
        let mut widths: Vec<usize> = match self.header {
            true => self.columns.iter().map(|c| c.name().width()).collect(),
            false => vec![0; self.columns.len()],
        };
        for row in rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.width());
            }
        }
        widths
    }

    fn write_row<'c>(
        &self,
        f: &mut fmt::Formatter<'_>,
        widths: &[usize],
        cells: impl Iterator<Item = (Cow<'c, str>, Option<Color>)>,
        bold: bool,
    ) -> fmt::Result {
        let last = self.columns.len().saturating_sub(1);
        let columns = self.columns.iter().zip(widths);
        for (i, ((col, width), (text, color))) in columns.zip(cells).enumerate() {
            let padded = match col.padding_direction() {
                // the last left-aligned column needs no trailing spaces
                PaddingDirection::Left if i == last => text.into_owned(),
                PaddingDirection::Left => pad_left(&text, *width),
                PaddingDirection::Right => pad_right(&text, *width),
            };

            let mut styled = padded.as_str().normal();
            if let Some(color) = color {
                styled = styled.color(color);
            }
            if bold {
                styled = styled.bold();
            }
            write!(f, "{styled}")?;

            if i < last {
                write!(f, "{}", self.separator)?;
            }
        }
        Ok(())
    }
}

impl<T, C: TableColumn<T>> fmt::Display for Table<'_, T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: Vec<Vec<Cow<'_, str>>> = self
            .data
            .iter()
            .map(|item| self.columns.iter().map(|col| col.format(item)).collect())
            .collect();
        let widths = self.widths(&rows);

        let mut first = true;
        if self.header {
            let names = self.columns.iter().map(|c| (c.name(), None));
            self.write_row(f, &widths, names, true)?;
            first = false;
        }

        for (row, item) in rows.into_iter().zip(self.data) {
            if !first {
                writeln!(f)?;
            }
            first = false;

            let cells = row
                .into_iter()
                .zip(self.columns)
                .map(|(cell, col)| (cell, col.get_color(item)));
            self.write_row(f, &widths, cells, false)?;
        }
        Ok(())
    }
}

fn pad_left(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(s.width());
    format!("{s}{}", " ".repeat(fill))
}

fn pad_right(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(s.width());
    format!("{}{s}", " ".repeat(fill))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Name;

    impl TableColumn<(&'static str, u32)> for Name {
        fn name(&self) -> Cow<'_, str> {
            "Name".into()
        }

        fn format<'a>(&self, data: &'a (&'static str, u32)) -> Cow<'a, str> {
            data.0.into()
        }
    }

    struct Count;

    impl TableColumn<(&'static str, u32)> for Count {
        fn name(&self) -> Cow<'_, str> {
            "Count".into()
        }

        fn format<'a>(&self, data: &'a (&'static str, u32)) -> Cow<'a, str> {
            data.1.to_string().into()
        }

        fn padding_direction(&self) -> PaddingDirection {
            PaddingDirection::Right
        }
    }

    enum Col {
        Name(Name),
        Count(Count),
    }

    impl TableColumn<(&'static str, u32)> for Col {
        fn name(&self) -> Cow<'_, str> {
            match self {
                Col::Name(a) => a.name(),
                Col::Count(a) => a.name(),
            }
        }

        fn format<'a>(&self, data: &'a (&'static str, u32)) -> Cow<'a, str> {
            match self {
                Col::Name(a) => a.format(data),
                Col::Count(a) => a.format(data),
            }
        }

        fn padding_direction(&self) -> PaddingDirection {
            match self {
                Col::Name(a) => a.padding_direction(),
                Col::Count(a) => a.padding_direction(),
            }
        }
    }

    #[test]
    fn test_pads_by_display_width() {
        colored::control::set_override(false);
        let columns = [Col::Count(Count), Col::Name(Name)];
        let data = [("Apple", 2), ("寿司", 10)];
        let out = Table::new(&columns, &data).to_string();
        assert_eq!(out, " 2 Apple\n10 寿司");

        let columns = [Col::Name(Name), Col::Count(Count)];
        let out = Table::new(&columns, &data).with_separator(" | ").to_string();
        assert_eq!(out, "Apple |  2\n寿司  | 10");
    }

    #[test]
    fn test_empty_table() {
        let columns = [Col::Name(Name)];
        let data: [(&'static str, u32); 0] = [];
        assert_eq!(Table::new(&columns, &data).to_string(), "");
    }
}
