//! Filling one language column from the source column.
//!
//! Translation happens before anything in the document changes. The result
//! is staged as a [`ColumnPatch`] and committed in one step, so a failed
//! backend call leaves headers and rows exactly as they were.

use crate::columns::tag::language_column;
use crate::sheet::{Row, TabularDocument};
use crate::translation::Dispatcher;
use crate::utils::config::SheetConfig;
use crate::utils::{BloomTranslateError, Result};
use tracing::{debug, info};

/// Which rows carry end-user text. When the sheet has a row-type column,
/// only rows whose type is listed are translated; a sheet without that
/// column is unrestricted, so row 0 is translated too if it has source text.
#[derive(Debug, Clone)]
pub struct RowTypePolicy {
    column: String,
    translatable: Vec<String>,
}

impl RowTypePolicy {
    pub fn new(column: impl Into<String>, translatable: Vec<String>) -> Self {
        Self {
            column: column.into(),
            translatable: translatable.iter().map(|t| t.trim().to_lowercase()).collect(),
        }
    }

    pub fn from_config(sheet: &SheetConfig) -> Self {
        Self::new(&sheet.row_type_column, sheet.translatable_row_types.clone())
    }

    fn admits(&self, restricted: bool, row: &Row) -> bool {
        if !restricted {
            return true;
        }
        row.text(&self.column)
            .map(|t| self.translatable.contains(&t.trim().to_lowercase()))
            .unwrap_or(false)
    }
}

impl Default for RowTypePolicy {
    fn default() -> Self {
        Self::from_config(&SheetConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Translated {
        column: String,
        rows: usize,
        inserted: bool,
    },
    NothingToDo,
}

impl SyncOutcome {
    pub fn changed(&self) -> bool {
        matches!(self, SyncOutcome::Translated { .. })
    }
}

/// The complete change for one column, computed before it is applied.
#[derive(Debug, Clone)]
pub struct ColumnPatch {
    column: String,
    insert_at: Option<usize>,
    writes: Vec<(usize, String)>,
}

impl ColumnPatch {
    fn apply(self, document: &mut TabularDocument) -> SyncOutcome {
        let inserted = self.insert_at.is_some();
        if let Some(at) = self.insert_at {
            document.headers.insert(at, self.column.clone());
        }

        let rows = self.writes.len();
        for (index, value) in self.writes {
            document.rows[index].set(self.column.clone(), value);
        }

        SyncOutcome::Translated {
            column: self.column,
            rows,
            inserted,
        }
    }
}

pub struct ColumnSynchronizer<'a> {
    dispatcher: &'a Dispatcher,
    policy: RowTypePolicy,
}

impl<'a> ColumnSynchronizer<'a> {
    pub fn new(dispatcher: &'a Dispatcher, policy: RowTypePolicy) -> Self {
        Self { dispatcher, policy }
    }

    pub fn dispatcher(&self) -> &'a Dispatcher {
        self.dispatcher
    }

    /// Translates every candidate row's source text into `target_column`.
    ///
    /// A new column goes immediately after the source column. Rows that are
    /// not candidates keep whatever they had. Returns `NothingToDo` without
    /// touching the document when no row has source text to send.
    pub async fn sync(
        &self,
        document: &mut TabularDocument,
        target_column: &str,
        target_tag: &str,
        source_lang: &str,
    ) -> Result<SyncOutcome> {
        let source_column = language_column(source_lang);
        let source_index = document.column_index(&source_column).ok_or_else(|| {
            BloomTranslateError::config(format!("source column {source_column} not found"))
        })?;
        if target_column == source_column {
            return Err(BloomTranslateError::ConfigError(format!(
                "{target_column} is the source column and cannot be a translation target"
            )));
        }

        let restricted = document.has_column(&self.policy.column);
        let candidates: Vec<(usize, String)> = document
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| self.policy.admits(restricted, row))
            .filter_map(|(i, row)| row.text(&source_column).map(|t| (i, t.to_string())))
            .collect();

        if candidates.is_empty() {
            debug!(column = %target_column, "No source text to translate");
            return Ok(SyncOutcome::NothingToDo);
        }

        let texts: Vec<String> = candidates.iter().map(|(_, t)| t.clone()).collect();
        let translations = self
            .dispatcher
            .translate(&texts, target_tag, source_lang)
            .await?;

        let patch = ColumnPatch {
            column: target_column.to_string(),
            insert_at: (!document.has_column(target_column)).then_some(source_index + 1),
            writes: candidates
                .into_iter()
                .map(|(i, _)| i)
                .zip(translations)
                .collect(),
        };

        let outcome = patch.apply(document);
        if let SyncOutcome::Translated { rows, inserted, .. } = &outcome {
            info!(column = %target_column, rows, inserted, "Column updated");
        }
        Ok(outcome)
    }
}
