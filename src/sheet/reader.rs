use crate::sheet::{Row, SheetFormat, TabularDocument};
use crate::utils::{BloomTranslateError, Result};
use calamine::{open_workbook_auto, Data, Reader};
use std::io::Read;
use std::path::{Path, PathBuf};

pub struct SheetReader {
    path: PathBuf,
    sheet_name: String,
}

impl SheetReader {
    pub fn new(path: impl Into<PathBuf>, sheet_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            sheet_name: sheet_name.into(),
        }
    }

    pub fn read(&self) -> Result<TabularDocument> {
        if !file_exists(&self.path) {
            return Err(BloomTranslateError::FileNotFound(
                self.path.display().to_string(),
            ));
        }

        let document = match SheetFormat::from_path(&self.path) {
            SheetFormat::Csv => read_csv(std::fs::File::open(&self.path)?)?,
            SheetFormat::Workbook => self.read_workbook()?,
        };

        tracing::debug!(
            path = %self.path.display(),
            columns = document.headers.len(),
            rows = document.rows.len(),
            "Loaded sheet"
        );
        Ok(document)
    }

    fn read_workbook(&self) -> Result<TabularDocument> {
        let mut workbook = open_workbook_auto(&self.path)?;

        let names = workbook.sheet_names();
        if !names.iter().any(|n| n == &self.sheet_name) {
            return Err(BloomTranslateError::SheetNotFound {
                sheet: self.sheet_name.clone(),
                available: names.join(", "),
            });
        }

        let range = workbook.worksheet_range(&self.sheet_name)?;
        let mut records = range
            .rows()
            .map(|cells| cells.iter().map(cell_text).collect::<Vec<_>>());

        let header_cells = records.next().unwrap_or_default();
        Ok(assemble(header_cells, records))
    }
}

pub(crate) fn read_csv(source: impl Read) -> Result<TabularDocument> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(source);

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        records.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    let mut records = records.into_iter();
    let header_cells = records.next().unwrap_or_default();
    Ok(assemble(header_cells, records))
}

/// Maps positional records onto the header row. Blank header cells name no
/// column, a repeated header keeps its first position, and fully blank
/// records are dropped.
fn assemble(
    header_cells: Vec<String>,
    records: impl Iterator<Item = Vec<String>>,
) -> TabularDocument {
    let mut headers: Vec<String> = Vec::new();
    let mut positions: Vec<Option<usize>> = Vec::with_capacity(header_cells.len());

    for cell in header_cells {
        let name = cell.trim().to_string();
        if name.is_empty() || headers.contains(&name) {
            if !name.is_empty() {
                tracing::warn!(header = %name, "Ignoring repeated column header");
            }
            positions.push(None);
        } else {
            positions.push(Some(headers.len()));
            headers.push(name);
        }
    }

    let rows = records
        .filter(|fields| fields.iter().any(|f| !f.is_empty()))
        .map(|fields| {
            fields
                .into_iter()
                .enumerate()
                .filter(|(_, value)| !value.is_empty())
                .filter_map(|(i, value)| {
                    positions
                        .get(i)
                        .copied()
                        .flatten()
                        .map(|h| (headers[h].clone(), value))
                })
                .collect::<Row>()
        })
        .collect();

    TabularDocument { headers, rows }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
            format!("{}", *f as i64)
        }
        other => other.to_string(),
    }
}

pub fn file_exists(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_lines_and_blank_records() {
        let doc = TabularDocument::from_csv_str(
            "[row type],[en],[fr]\n\
             Row type,English,French\n\
             [page content],Two\n\
             ,,\n\
             [page content],,Quatre",
        )
        .unwrap();

        assert_eq!(doc.headers, vec!["[row type]", "[en]", "[fr]"]);
        assert_eq!(doc.rows.len(), 3);
        assert_eq!(doc.rows[1].text("[en]"), Some("Two"));
        assert_eq!(doc.rows[1].get("[fr]"), None);
        assert!(doc.rows[2].is_empty_at("[en]"));
        assert_eq!(doc.rows[2].text("[fr]"), Some("Quatre"));
    }

    #[test]
    fn blank_and_repeated_headers_do_not_become_columns() {
        let doc = TabularDocument::from_csv_str("[en],,[en],[fr]\nA,B,C,D").unwrap();
        assert_eq!(doc.headers, vec!["[en]", "[fr]"]);
        assert_eq!(doc.rows[0].text("[en]"), Some("A"));
        assert_eq!(doc.rows[0].text("[fr]"), Some("D"));
    }

    #[test]
    fn whole_floats_lose_their_fraction() {
        assert_eq!(cell_text(&Data::Float(3.0)), "3");
        assert_eq!(cell_text(&Data::Float(2.5)), "2.5");
        assert_eq!(cell_text(&Data::Empty), "");
    }

    #[test]
    fn missing_input_is_reported() {
        let err = SheetReader::new("/no/such/book.xlsx", "BloomBook")
            .read()
            .unwrap_err();
        assert!(matches!(err, BloomTranslateError::FileNotFound(_)));
    }
}
