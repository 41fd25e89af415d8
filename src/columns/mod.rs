pub mod scanner;
pub mod sync;
pub mod tag;

pub use scanner::{
    has_missing_translations, require_source_column, scan, select_columns_to_translate,
    TranslatableColumn,
};
pub use sync::{ColumnPatch, ColumnSynchronizer, RowTypePolicy, SyncOutcome};
pub use tag::{language_column, parse_tag, ColumnTag, Model};
