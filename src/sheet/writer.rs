use crate::sheet::{SheetFormat, TabularDocument};
use crate::utils::{BloomTranslateError, Result};
use rust_xlsxwriter::Workbook;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

pub struct SheetWriter {
    path: PathBuf,
    sheet_name: String,
}

impl SheetWriter {
    pub fn new(path: impl Into<PathBuf>, sheet_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            sheet_name: sheet_name.into(),
        }
    }

    /// Writes the document with its headers in committed order. Any file
    /// already at the path is replaced.
    pub fn write(&self, document: &TabularDocument) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path).map_err(|e| self.not_writable(e))?;
        }

        match SheetFormat::from_path(&self.path) {
            SheetFormat::Csv => self.write_csv(document)?,
            SheetFormat::Workbook => self.write_workbook(document)?,
        }

        tracing::debug!(
            path = %self.path.display(),
            rows = document.rows.len(),
            "Wrote sheet"
        );
        Ok(())
    }

    fn write_csv(&self, document: &TabularDocument) -> Result<()> {
        let file = File::create(&self.path).map_err(|e| self.not_writable(e))?;
        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(&document.headers)?;

        for row in &document.rows {
            writer.write_record(
                document
                    .headers
                    .iter()
                    .map(|h| row.get(h).unwrap_or_default()),
            )?;
        }

        writer.flush()?;
        Ok(())
    }

    fn write_workbook(&self, document: &TabularDocument) -> Result<()> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&self.sheet_name)?;

        for (col, header) in document.headers.iter().enumerate() {
            worksheet.write_string(0, col as u16, header)?;
        }

        for (i, row) in document.rows.iter().enumerate() {
            let excel_row = (i + 1) as u32;
            for (col, header) in document.headers.iter().enumerate() {
                if let Some(value) = row.text(header) {
                    worksheet.write_string(excel_row, col as u16, value)?;
                }
            }
        }

        workbook.save(&self.path)?;
        Ok(())
    }

    fn not_writable(&self, e: std::io::Error) -> BloomTranslateError {
        BloomTranslateError::OutputNotWritable {
            path: self.path.clone(),
            reason: e.to_string(),
        }
    }
}

/// Confirms the output path can be opened for writing, then removes
/// whatever is there so no stale output outlives a failed run. When the
/// output is the input itself, it is only checked and left in place.
pub fn prepare_output(path: &Path, input: &Path) -> Result<()> {
    let not_writable = |e: std::io::Error| BloomTranslateError::OutputNotWritable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    if same_file(path, input) {
        drop(OpenOptions::new().write(true).open(path).map_err(not_writable)?);
        return Ok(());
    }

    drop(
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(not_writable)?,
    );
    std::fs::remove_file(path).map_err(not_writable)?;
    Ok(())
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// `<stem>-<target>.<ext>` (or `<stem>-translated.<ext>`) in `dir`. Workbooks
/// are always written as xlsx, whatever format they were read from.
pub fn default_output_path(input: &Path, target: Option<&str>, dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("spreadsheet");
    let extension = match SheetFormat::from_path(input) {
        SheetFormat::Csv => "csv",
        SheetFormat::Workbook => "xlsx",
    };
    let suffix = target.unwrap_or("translated");

    dir.join(format!("{stem}-{suffix}.{extension}"))
}
