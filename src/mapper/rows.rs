use crate::{mapper::MapError, value::SqlValue};

/// Writable slots for one row, one per column.
pub trait ScanDest {
    fn width(&self) -> usize;

    fn put(&mut self, column: usize, value: SqlValue) -> Result<(), MapError>;
}

/// A result cursor owned by the caller.
///
/// `scan` hands the current row's values to the destination; it must not be
/// interleaved with `next` on the same cursor.
pub trait Rows {
    fn columns(&self) -> Result<Vec<String>, MapError>;

    /// Advances to the next row; `false` when exhausted or failed.
    fn next(&mut self) -> bool;

    fn scan(&mut self, dest: &mut dyn ScanDest) -> Result<(), MapError>;

    /// The error that stopped iteration, if any.
    fn err(&self) -> Option<MapError>;

    fn close(&mut self) -> Result<(), MapError>;
}

/// Hands a full row of values to `dest`, checking the width first.
pub fn scan_values(dest: &mut dyn ScanDest, values: Vec<SqlValue>) -> Result<(), MapError> {
    if values.len() != dest.width() {
        return Err(MapError::Cursor(format!(
            "expected {} destination arguments in scan, got {}",
            dest.width(),
            values.len()
        )));
    }
    for (column, value) in values.into_iter().enumerate() {
        dest.put(column, value)?;
    }
    Ok(())
}
