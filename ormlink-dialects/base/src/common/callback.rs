use itertools::Itertools;
use ormlink_core::err::{bail, Context, Result};
use ormlink_logging::{debug, trace, warn};

use crate::interface::{Connection, Dialect};

use super::{identity::SEQUENCE_INSERT_ON, query::Query, record::Record, scope::Scope};

pub const BEGIN_TRANSACTION: &str = "orm:begin_transaction";
pub const CREATE: &str = "orm:create";
pub const COMMIT_OR_ROLLBACK_TRANSACTION: &str = "orm:commit_or_rollback_transaction";

/// A step of a write operation
pub type CallbackFn = fn(&mut Scope<'_>) -> Result<()>;

#[derive(Clone)]
struct Processor {
    name: String,
    func: CallbackFn,
}

/// The ordered list of steps run when creating a record
#[derive(Clone)]
pub struct Callbacks {
    create: Vec<Processor>,
}

impl Callbacks {
    /// A pipeline without any steps
    pub fn empty() -> Self {
        Self { create: vec![] }
    }

    /// The default pipeline with the dialect's own steps registered
    pub fn for_dialect(dialect: &dyn Dialect) -> Result<Self> {
        let mut callbacks = Self::default();
        dialect
            .register_callbacks(&mut callbacks)
            .with_context(|| format!("Failed to register callbacks for dialect {}", dialect.name()))?;

        Ok(callbacks)
    }

    /// Appends a step to the end of the pipeline
    pub fn register(&mut self, name: &str, func: CallbackFn) -> Result<()> {
        self.ensure_unique(name)?;
        self.create.push(Processor {
            name: name.into(),
            func,
        });
        Ok(())
    }

    /// Inserts a step directly after an existing step
    pub fn register_after(&mut self, after: &str, name: &str, func: CallbackFn) -> Result<()> {
        self.ensure_unique(name)?;
        let idx = match self.create.iter().position(|p| p.name == after) {
            Some(idx) => idx,
            None => bail!("Cannot register callback {} after unknown callback {}", name, after),
        };

        self.create.insert(
            idx + 1,
            Processor {
                name: name.into(),
                func,
            },
        );
        Ok(())
    }

    pub fn names(&self) -> Vec<&str> {
        self.create.iter().map(|p| p.name.as_str()).collect()
    }

    /// Runs the create pipeline for the supplied record.
    ///
    /// If any step fails, a transaction started by the pipeline is rolled back
    /// and the error of the failing step is returned.
    pub fn create(
        &self,
        dialect: &dyn Dialect,
        con: &mut dyn Connection,
        record: &mut Record,
    ) -> Result<u64> {
        let mut scope = Scope::new(dialect, con, record);

        for processor in self.create.iter() {
            trace!("Running callback {}", processor.name);

            if let Err(err) = (processor.func)(&mut scope) {
                if scope.began_transaction() {
                    rollback(&mut scope);
                }

                return Err(err).with_context(|| format!("Callback {} failed", processor.name));
            }
        }

        Ok(scope.rows_affected().unwrap_or(0))
    }

    fn ensure_unique(&self, name: &str) -> Result<()> {
        if self.create.iter().any(|p| p.name == name) {
            bail!("Callback {} is already registered", name);
        }

        Ok(())
    }
}

impl Default for Callbacks {
    fn default() -> Self {
        Self {
            create: vec![
                Processor {
                    name: BEGIN_TRANSACTION.into(),
                    func: begin_transaction,
                },
                Processor {
                    name: CREATE.into(),
                    func: create,
                },
                Processor {
                    name: COMMIT_OR_ROLLBACK_TRANSACTION.into(),
                    func: commit_or_rollback_transaction,
                },
            ],
        }
    }
}

fn begin_transaction(scope: &mut Scope<'_>) -> Result<()> {
    let began = match scope.con().transaction_manager() {
        Some(tm) => {
            if tm.is_in_transaction()? {
                false
            } else {
                tm.begin_transaction()?;
                true
            }
        }
        None => false,
    };

    scope.began_transaction = began;
    Ok(())
}

fn create(scope: &mut Scope<'_>) -> Result<()> {
    let dialect = scope.dialect();
    let table = scope.quoted_table_name();
    let identity_inserted = scope.instance_flag(SEQUENCE_INSERT_ON);

    let (columns, params): (Vec<_>, Vec<_>) = scope
        .record()
        .fields
        .iter()
        // blank auto-increment keys are left for the database to fill
        .filter(|f| {
            identity_inserted
                || !(f.schema.is_primary_key() && f.schema.auto_increment().is_some() && f.is_blank())
        })
        .map(|f| (dialect.quote(&f.schema.name), f.value.clone()))
        .unzip();

    if columns.is_empty() {
        bail!("No columns to insert into table {}", table);
    }

    let primary_key = scope
        .record()
        .primary_fields()
        .next()
        .map(|f| dialect.quote(&f.schema.name))
        .unwrap_or_default();

    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({}){}",
        table,
        columns.join(", "),
        (1..=params.len()).map(|i| dialect.bind_var(i)).join(", "),
        dialect.last_insert_id_returning_suffix(&table, &primary_key)
    );
    debug!("Inserting into {}: {}", table, sql);

    let affected = scope
        .con()
        .execute(Query::new(sql, params))
        .with_context(|| format!("Failed to insert into table {}", table))?;
    scope.set_rows_affected(affected);

    Ok(())
}

fn commit_or_rollback_transaction(scope: &mut Scope<'_>) -> Result<()> {
    if !scope.began_transaction() {
        return Ok(());
    }

    if let Some(tm) = scope.con().transaction_manager() {
        tm.commit_transaction()?;
    }

    scope.began_transaction = false;
    Ok(())
}

fn rollback(scope: &mut Scope<'_>) {
    if let Some(tm) = scope.con().transaction_manager() {
        if let Err(err) = tm.rollback_transaction() {
            warn!("Failed to rollback transaction: {:?}", err);
        }
    }

    scope.began_transaction = false;
}
