use crate::columns::tag::{language_column, parse_tag, ColumnTag, Model};
use crate::sheet::TabularDocument;
use crate::utils::{BloomTranslateError, Result};
use serde::Serialize;

/// An AI column found in the sheet, recomputed on every run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslatableColumn {
    pub column_name: String,
    pub language_code: String,
    pub model: Model,
    pub has_missing_translations: bool,
}

impl TranslatableColumn {
    pub fn target_tag(&self) -> String {
        ColumnTag::new(self.language_code.as_str(), self.model).target_tag()
    }
}

/// The `[<lang>]` column text is translated from. Its absence is a
/// configuration error.
pub fn require_source_column(document: &TabularDocument, source_lang: &str) -> Result<String> {
    let source_column = language_column(source_lang);
    if !document.has_column(&source_column) {
        return Err(BloomTranslateError::config(format!(
            "source column {source_column} not found"
        )));
    }
    Ok(source_column)
}

/// Lists the AI columns in header order.
///
/// A column has missing translations when some row after row 0 has source
/// text but no text in that column. Row 0 carries language display names and
/// never counts, whatever it holds.
pub fn scan(document: &TabularDocument, source_lang: &str) -> Result<Vec<TranslatableColumn>> {
    let source_column = require_source_column(document, source_lang)?;

    let columns = document
        .headers
        .iter()
        .filter_map(|header| {
            let tag = parse_tag(header)?;
            Some(TranslatableColumn {
                column_name: header.clone(),
                language_code: tag.language_code,
                model: tag.model,
                has_missing_translations: has_missing_translations(document, &source_column, header),
            })
        })
        .collect();

    Ok(columns)
}

/// True when some row after row 0 has text in `source_column` but none in
/// `column`. An absent column is missing everywhere.
pub fn has_missing_translations(document: &TabularDocument, source_column: &str, column: &str) -> bool {
    document
        .rows
        .iter()
        .skip(1)
        .any(|row| !row.is_empty_at(source_column) && row.is_empty_at(column))
}

/// Columns a scan-driven run should work on: the incomplete ones, or all of
/// them when retranslating. Order is preserved.
pub fn select_columns_to_translate(
    columns: &[TranslatableColumn],
    retranslate: bool,
) -> Vec<TranslatableColumn> {
    columns
        .iter()
        .filter(|c| retranslate || c.has_missing_translations)
        .cloned()
        .collect()
}
