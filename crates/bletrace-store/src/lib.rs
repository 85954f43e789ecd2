pub mod error;
pub mod sink;
pub mod writer;

pub use error::{Error, Result};
pub use sink::RecordSink;
pub use writer::{CsvStore, RowSchema};
