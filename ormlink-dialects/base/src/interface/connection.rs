use ormlink_core::{
    data::DataValue,
    err::{Context, Result},
};
use ormlink_logging::warn;

use crate::common::query::Query;

/// Opens connections to the target database
pub trait ConnectionPool: Clone + Sized + Send + Sync + 'static {
    type TConnection: Connection;

    /// Acquires a connection to the target database
    fn acquire(&mut self) -> Result<Self::TConnection>;
}

/// An open connection to a database
///
/// Connections are used by a single caller at a time, concurrent callers
/// are expected to acquire their own connection from the pool.
pub trait Connection {
    /// Executes the supplied statement, returning the number of affected rows
    fn execute(&mut self, query: Query) -> Result<u64>;

    /// Runs the supplied query, returning the first row of the result, if any
    fn query_row(&mut self, query: Query) -> Result<Option<Vec<DataValue>>>;

    /// Gets the transaction manager if transactions are supported for this database
    fn transaction_manager(&mut self) -> Option<&mut dyn TransactionManager>;
}

/// Manages transaction state for a connection
pub trait TransactionManager {
    /// Checks if the current connection is in a transaction
    fn is_in_transaction(&mut self) -> Result<bool>;

    /// Starts a transaction
    fn begin_transaction(&mut self) -> Result<()>;

    /// Rolls back the current transaction
    fn rollback_transaction(&mut self) -> Result<()>;

    /// Commits the current transaction
    fn commit_transaction(&mut self) -> Result<()>;
}

/// Runs the supplied closure inside a transaction.
///
/// If the connection is already in a transaction it is reused and left open
/// for the caller to complete. Otherwise a new transaction is started and
/// committed on success, or rolled back if the closure fails.
pub fn with_transaction<T>(
    con: &mut dyn Connection,
    f: impl FnOnce(&mut dyn Connection) -> Result<T>,
) -> Result<T> {
    let owned = match con.transaction_manager() {
        Some(tm) => {
            if tm.is_in_transaction()? {
                false
            } else {
                tm.begin_transaction()
                    .context("Failed to begin transaction")?;
                true
            }
        }
        None => false,
    };

    let res = f(&mut *con);

    if !owned {
        return res;
    }

    let tm = con
        .transaction_manager()
        .context("Transaction manager is no longer available")?;

    match res {
        Ok(val) => {
            tm.commit_transaction()
                .context("Failed to commit transaction")?;
            Ok(val)
        }
        Err(err) => {
            if let Err(rollback_err) = tm.rollback_transaction() {
                warn!("Failed to rollback transaction: {:?}", rollback_err);
            }
            Err(err)
        }
    }
}
