use ormlink_core::{
    data::DataValue,
    err::{Context, Result},
};
use ormlink_logging::debug;

use crate::interface::{Connection, Dialect};

use super::{query::Query, scope::Scope};

/// Set on the scope once key values have been assigned by the hook, so the
/// insert includes the primary key columns.
pub const SEQUENCE_INSERT_ON: &str = "sequence_insert_on";

/// Assigns values to blank auto-increment primary keys before the insert.
///
/// Keys tagged with the `AUTO_INCREMENT` placeholder draw from the dialect's
/// pseudo sequence allocator. Any other tag value is taken as the name of a
/// native sequence. Keys which already hold a value are left untouched.
pub fn set_identity_insert(scope: &mut Scope<'_>) -> Result<()> {
    let dialect = scope.dialect();
    let allocator = match dialect.sequence_allocator() {
        Some(allocator) => allocator,
        None => return Ok(()),
    };

    let table = scope.quoted_table_name();
    let targets = scope
        .record()
        .primary_fields()
        .filter(|f| f.is_blank())
        .filter_map(|f| {
            f.schema
                .auto_increment()
                .map(|marker| (f.schema.name.clone(), marker.to_string()))
        })
        .collect::<Vec<_>>();

    for (column, marker) in targets {
        let value = match allocator.allocate_next(dialect, scope.con(), &marker, &table)? {
            Some(value) => value,
            None => next_sequence_value(dialect, scope.con(), &marker)?,
        };

        debug!("Assigning {} to {}.{}", value, table, column);
        scope.set_column(&column, DataValue::UInt64(value))?;
        scope.instance_set(SEQUENCE_INSERT_ON, true);
    }

    Ok(())
}

/// Reads the next value of a native database sequence
pub fn next_sequence_value(
    dialect: &dyn Dialect,
    con: &mut dyn Connection,
    sequence: &str,
) -> Result<u64> {
    let row = con
        .query_row(Query::sql(dialect.sequence_next_value_sql(sequence)))
        .with_context(|| format!("Failed to read next value of sequence {}", sequence))?;

    row.and_then(|r| r.into_iter().next())
        .with_context(|| format!("Sequence {} returned no value", sequence))?
        .try_into_u64()
        .with_context(|| format!("Sequence {} returned an invalid value", sequence))
}
