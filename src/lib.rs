pub mod columns;
pub mod pipeline;
pub mod sheet;
pub mod translation;
pub mod utils;

pub use columns::{parse_tag, scan, ColumnSynchronizer, ColumnTag, Model, SyncOutcome, TranslatableColumn};
pub use pipeline::{run, RunOptions, RunReport, RunStatus};
pub use sheet::{SheetReader, SheetWriter, TabularDocument};
pub use translation::{Dispatcher, Translator};
pub use utils::{AppConfig, BackendCredentials, BloomTranslateError, Result};
