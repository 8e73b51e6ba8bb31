use crate::config::FilterConfig;
use crate::display::{self, Console};
use crate::github::scanner::PullRequestRecord;
use comfy_table::{Attribute, Cell, Color, Table};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Number,
    Title,
    Branch,
    Author,
    Url,
}

impl Column {
    pub fn header(self) -> &'static str {
        match self {
            Column::Number => "No.",
            Column::Title => "Title",
            Column::Branch => "Branch",
            Column::Author => "Author",
            Column::Url => "Url",
        }
    }

    fn cell(self, record: &PullRequestRecord) -> Cell {
        match self {
            Column::Number => Cell::new(format!("#{}", record.number)).fg(Color::Green),
            Column::Title => Cell::new(&record.title),
            Column::Branch => Cell::new(&record.branch).fg(Color::Cyan),
            Column::Author => Cell::new(&record.author),
            Column::Url => Cell::new(record.url.as_deref().unwrap_or_default()).fg(Color::Blue),
        }
    }
}

/// Column layout shared by every repository in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    pub columns: Vec<Column>,
    pub show_headers: bool,
}

impl TableSpec {
    pub fn from_config(config: &FilterConfig) -> TableSpec {
        let mut columns = vec![Column::Number, Column::Title];
        if config.show_branch {
            columns.push(Column::Branch);
        }
        if config.show_author {
            columns.push(Column::Author);
        }
        if config.show_urls {
            columns.push(Column::Url);
        }
        TableSpec {
            columns,
            show_headers: config.show_headers,
        }
    }

    pub fn build_table(&self, records: &[PullRequestRecord]) -> Table {
        let mut table = display::new_table();
        if self.show_headers {
            table.set_header(self.columns.iter().map(|c| {
                Cell::new(c.header())
                    .fg(Color::Magenta)
                    .add_attribute(Attribute::Bold)
            }));
        }
        for record in records {
            table.add_row(self.columns.iter().map(|c| c.cell(record)));
        }
        table
    }
}

pub fn summary_line(count: usize, path: &Path) -> String {
    let inflection = if count == 1 { "result" } else { "results" };
    format!("Found {count} {inflection} for {}", path.display())
}

/// Prints the summary line, then the table when there is anything to show.
pub fn render(
    console: &mut dyn Console,
    path: &Path,
    records: &[PullRequestRecord],
    spec: &TableSpec,
) {
    console.print(&summary_line(records.len(), path));
    if records.is_empty() {
        console.print("");
        return;
    }
    console.print(&spec.build_table(records).to_string());
}
