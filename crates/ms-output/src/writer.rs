//! The `OutputWriter` trait the study driver writes results through.

use crate::{OutputResult, ResultRow};

pub trait OutputWriter {
    /// Append one result row.  Implementations make the row durable before
    /// returning.
    fn write_result(&mut self, row: &ResultRow) -> OutputResult<()>;

    /// Flush and close.  Safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
