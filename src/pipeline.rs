//! One command-line run: read the sheet, fill the requested AI columns and
//! write the result once at the end.

use crate::columns::{
    has_missing_translations, language_column, require_source_column, scan,
    select_columns_to_translate, ColumnSynchronizer, RowTypePolicy, TranslatableColumn,
};
use crate::sheet::{default_output_path, prepare_output, SheetReader, SheetWriter, TabularDocument};
use crate::translation::Dispatcher;
use crate::utils::{AppConfig, Result};
use std::path::PathBuf;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    /// `fr-x-ai-google`; when absent the sheet's own AI columns are used.
    pub target: Option<String>,
    pub source_lang: String,
    pub retranslate: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Translated,
    NothingToDo,
    NothingTranslated,
}

impl RunStatus {
    pub fn exit_code(self) -> u8 {
        match self {
            RunStatus::Translated | RunStatus::NothingToDo => 0,
            RunStatus::NothingTranslated => 2,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub translated: Vec<String>,
    /// Column name and the reason it was skipped.
    pub failed: Vec<(String, String)>,
    /// Set only when the output file was written.
    pub output: Option<PathBuf>,
}

impl RunReport {
    pub fn status(&self) -> RunStatus {
        if !self.translated.is_empty() {
            RunStatus::Translated
        } else if self.failed.is_empty() {
            RunStatus::NothingToDo
        } else {
            RunStatus::NothingTranslated
        }
    }
}

pub async fn run(options: &RunOptions, config: &AppConfig, dispatcher: &Dispatcher) -> Result<RunReport> {
    debug!(input = %options.input.display(), "Reading spreadsheet");
    let mut document = SheetReader::new(&options.input, &config.sheet.name).read()?;
    debug!(headers = ?document.headers, "Column headers");

    let target = options
        .target
        .as_deref()
        .map(|t| t.trim().trim_start_matches('[').trim_end_matches(']').to_string());

    let output = match &options.output {
        Some(path) => path.clone(),
        None => default_output_path(&options.input, target.as_deref(), &std::env::current_dir()?),
    };
    prepare_output(&output, &options.input)?;

    let synchronizer = ColumnSynchronizer::new(dispatcher, RowTypePolicy::from_config(&config.sheet));
    let mut report = match target {
        Some(tag) => translate_target(&mut document, &tag, options, &synchronizer).await?,
        None => translate_scanned(&mut document, options, &synchronizer).await?,
    };

    if report.translated.is_empty() {
        info!("No columns changed; nothing written");
        return Ok(report);
    }

    SheetWriter::new(&output, &config.sheet.name).write(&document)?;
    info!("Translated spreadsheet saved to {}", output.display());
    report.output = Some(output);
    Ok(report)
}

/// An explicitly named column. Every failure here ends the run.
async fn translate_target(
    document: &mut TabularDocument,
    tag: &str,
    options: &RunOptions,
    synchronizer: &ColumnSynchronizer<'_>,
) -> Result<RunReport> {
    let column = language_column(tag);
    let source_column = require_source_column(document, &options.source_lang)?;
    synchronizer.dispatcher().ensure_ready(tag)?;

    let mut report = RunReport::default();
    if document.has_column(&column)
        && !options.retranslate
        && !has_missing_translations(document, &source_column, &column)
    {
        info!("{column} has no missing translations; use --retranslate to translate it again");
        return Ok(report);
    }

    let outcome = synchronizer
        .sync(document, &column, tag, &options.source_lang)
        .await?;
    if outcome.changed() {
        report.translated.push(column);
    }
    Ok(report)
}

/// Every AI column already in the sheet. Each selected column's backend is
/// checked before any translation starts. A backend failure on one column is
/// logged and skipped; configuration errors end the run.
async fn translate_scanned(
    document: &mut TabularDocument,
    options: &RunOptions,
    synchronizer: &ColumnSynchronizer<'_>,
) -> Result<RunReport> {
    let columns = scan(document, &options.source_lang)?;
    report_columns(&columns, options.retranslate);

    let selected = select_columns_to_translate(&columns, options.retranslate);
    for column in &selected {
        synchronizer.dispatcher().ensure_ready(&column.target_tag())?;
    }

    let mut report = RunReport::default();
    for column in selected {
        let tag = column.target_tag();
        match synchronizer
            .sync(document, &column.column_name, &tag, &options.source_lang)
            .await
        {
            Ok(outcome) if outcome.changed() => report.translated.push(column.column_name),
            Ok(_) => debug!(column = %column.column_name, "Nothing to translate"),
            Err(e) if e.is_fatal_for_run() || !e.is_recoverable() => return Err(e),
            Err(e) => {
                warn!(column = %column.column_name, error = %e, "Skipping column");
                report.failed.push((column.column_name, e.to_string()));
            }
        }
    }
    Ok(report)
}

fn report_columns(columns: &[TranslatableColumn], retranslate: bool) {
    if columns.is_empty() {
        info!("No ai columns found");
        return;
    }

    info!("Found ai columns:");
    for column in columns {
        let state = if column.has_missing_translations {
            "has empty cells"
        } else {
            "has no missing translations"
        };
        let suffix = if retranslate { " (will retranslate)" } else { "" };
        info!("  {} {}{}", column.column_name, state, suffix);
    }
}
