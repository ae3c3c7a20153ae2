//! The host side of the rule engine: a line buffer with file I/O and
//! standalone editing passes.

mod backup;
mod processor;
mod range;
mod replace;
mod unescape;

pub use backup::{backup_path, expand_extension};
pub use processor::{LineChange, RunSummary, TextProcessor, VariableChange};
pub use range::{DEFAULT_DELIMITER, DEFAULT_MIN_LENGTH, RangeOptions, RangeReport, replace_range};
pub use replace::ReplaceOptions;
pub use unescape::unescape;
