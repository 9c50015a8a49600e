//! Row decoding into records.

use crate::error::{CqlxError, Result};
use crate::mapper::{mapping_for, Mapping, Record};
use crate::types::Row;

/// Writes every column of `row` into the mapped field of `dest`.
///
/// Fields whose column is absent from the row keep their current value. On
/// error `dest` is left untouched.
///
/// # Errors
///
/// Returns an error if:
/// - The record type cannot be mapped (`MappingCollision`)
/// - A value does not convert to its field type (`TypeMismatch`)
/// - `strict` is set and a column has no field (`UnmappedColumn`)
pub fn decode_row<T: Record + Default>(row: Row, dest: &mut T, strict: bool) -> Result<()> {
    let mapping = mapping_for::<T>()?;
    decode_with(&mapping, row, dest, strict)
}

/// Decodes `row` into `dest`, first decoding a copy into a scratch record so
/// a failing column leaves `dest` as it was.
pub(crate) fn decode_with<T: Record + Default>(
    mapping: &Mapping,
    row: Row,
    dest: &mut T,
    strict: bool,
) -> Result<()> {
    decode_new::<T>(mapping, row.clone(), strict)?;
    write_columns(mapping, row, dest)
}

/// Decodes `row` into a fresh default record.
pub(crate) fn decode_new<T: Record + Default>(mapping: &Mapping, row: Row, strict: bool) -> Result<T> {
    if strict {
        if let Some(column) = row.columns().iter().find(|c| !mapping.contains(c)) {
            return Err(CqlxError::UnmappedColumn {
                record: mapping.record(),
                column: column.clone(),
            });
        }
    }
    let mut record = T::default();
    write_columns(mapping, row, &mut record)?;
    Ok(record)
}

fn write_columns<T: Record>(mapping: &Mapping, row: Row, dest: &mut T) -> Result<()> {
    for (column, value) in row.into_iter_owned() {
        mapping.write(dest, &column, value)?;
    }
    Ok(())
}
