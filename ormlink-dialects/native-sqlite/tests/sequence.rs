use std::{collections::HashSet, sync::Arc, thread, time::Duration};

use ormlink_core::data::DataValue;
use ormlink_dialects_base::{
    common::{query::Query, sequence::PseudoSequenceAllocator},
    interface::{Connection, Dialect, TransactionManager},
};
use ormlink_dialects_native_sqlite::SqliteDialect;
use pretty_assertions::assert_eq;
use serial_test::serial;

mod common;

fn allocator(dialect: &SqliteDialect) -> &PseudoSequenceAllocator {
    dialect.sequence_allocator().unwrap()
}

fn next(dialect: &SqliteDialect, con: &mut dyn Connection, table: &str) -> u64 {
    allocator(dialect)
        .allocate_next(dialect, con, "AUTO_INCREMENT", table)
        .unwrap()
        .unwrap()
}

#[test]
fn test_sqlite_pseudo_sequence_sequential() {
    let db = common::TestDb::new();
    let mut con = db.connect();
    let dialect = common::sequenced_dialect();

    assert_eq!(next(&dialect, &mut con, "\"orders\""), 1);
    assert_eq!(next(&dialect, &mut con, "\"orders\""), 2);
    assert_eq!(next(&dialect, &mut con, "\"orders\""), 3);

    assert!(dialect.has_table(&mut con, "SEQUENCE_STORES").unwrap());
    assert_eq!(
        allocator(&dialect)
            .current_value(&dialect, &mut con, "\"orders\"")
            .unwrap(),
        Some(3)
    );
}

#[test]
fn test_sqlite_pseudo_sequence_tables_are_independent() {
    let db = common::TestDb::new();
    let mut con = db.connect();
    let dialect = common::sequenced_dialect();

    assert_eq!(next(&dialect, &mut con, "\"orders\""), 1);
    assert_eq!(next(&dialect, &mut con, "\"orders\""), 2);
    assert_eq!(next(&dialect, &mut con, "\"customers\""), 1);
    assert_eq!(next(&dialect, &mut con, "\"orders\""), 3);

    assert_eq!(
        common::count(&mut con, "SELECT count(*) FROM SEQUENCE_STORES"),
        2
    );
}

#[test]
fn test_sqlite_pseudo_sequence_persists_across_restarts() {
    let db = common::TestDb::new();

    {
        let mut con = db.connect();
        let dialect = common::sequenced_dialect();

        for _ in 0..3 {
            next(&dialect, &mut con, "\"orders\"");
        }
    }

    let mut con = db.connect();
    let dialect = common::sequenced_dialect();

    assert_eq!(next(&dialect, &mut con, "\"orders\""), 4);
}

#[test]
fn test_sqlite_pseudo_sequence_native_marker_is_declined() {
    let db = common::TestDb::new();
    let mut con = db.connect();
    let dialect = common::sequenced_dialect();

    assert_eq!(
        allocator(&dialect)
            .allocate_next(&dialect, &mut con, "orders_seq", "\"orders\"")
            .unwrap(),
        None
    );
    assert!(!dialect.has_table(&mut con, "SEQUENCE_STORES").unwrap());
}

#[test]
fn test_sqlite_pseudo_sequence_uses_existing_store() {
    let db = common::TestDb::new();
    let mut con = db.connect();
    let dialect = common::sequenced_dialect();

    con.execute(Query::sql(
        "CREATE TABLE SEQUENCE_STORES (TABLE_NAME varchar(255) PRIMARY KEY, SEQUENCE bigint NOT NULL)",
    ))
    .unwrap();
    con.execute(Query::new(
        "INSERT INTO SEQUENCE_STORES VALUES (?1, ?2)",
        vec!["\"orders\"".into(), DataValue::Int64(41)],
    ))
    .unwrap();

    assert_eq!(next(&dialect, &mut con, "\"orders\""), 42);
}

#[test]
fn test_sqlite_pseudo_sequence_rolls_back_with_caller() {
    let db = common::TestDb::new();
    let mut con = db.connect();
    let dialect = common::sequenced_dialect();

    assert_eq!(next(&dialect, &mut con, "\"orders\""), 1);

    con.begin_transaction().unwrap();
    assert_eq!(next(&dialect, &mut con, "\"orders\""), 2);
    con.rollback_transaction().unwrap();

    assert_eq!(next(&dialect, &mut con, "\"orders\""), 2);
}

#[test]
#[serial]
fn test_sqlite_pseudo_sequence_concurrent_allocations() {
    let db = common::TestDb::new();
    let dialect = Arc::new(common::sequenced_dialect());
    let threads = 8;
    let per_thread = 20;

    let handles = (0..threads)
        .map(|_| {
            let dialect = Arc::clone(&dialect);
            let mut con = db.connect();

            thread::spawn(move || {
                (0..per_thread)
                    .map(|_| next(&dialect, &mut con, "\"orders\""))
                    .collect::<Vec<_>>()
            })
        })
        .collect::<Vec<_>>();

    let mut values = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect::<Vec<_>>();
    values.sort_unstable();

    assert_eq!(values, (1..=(threads * per_thread) as u64).collect::<Vec<_>>());
}

#[test]
#[serial]
fn test_sqlite_pseudo_sequence_concurrent_processes() {
    // separate dialects share nothing in memory, like separate processes
    let db = common::TestDb::new();
    let threads = 4;
    let per_thread = 10;

    let handles = (0..threads)
        .map(|_| {
            let mut con = db.connect();

            thread::spawn(move || {
                let dialect = common::sequenced_dialect();

                (0..per_thread)
                    .map(|_| next(&dialect, &mut con, "\"orders\""))
                    .collect::<Vec<_>>()
            })
        })
        .collect::<Vec<_>>();

    let values = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect::<Vec<_>>();
    let unique = values.iter().copied().collect::<HashSet<_>>();

    assert_eq!(values.len(), threads * per_thread);
    assert_eq!(unique.len(), threads * per_thread);
    assert_eq!(unique.iter().max().copied(), Some((threads * per_thread) as u64));
}

#[test]
#[serial]
fn test_sqlite_pseudo_sequence_concurrent_store_creation() {
    let db = common::TestDb::new();
    let threads = 6;

    let handles = (0..threads)
        .map(|_| {
            let mut con = db.connect();

            thread::spawn(move || {
                let dialect = common::sequenced_dialect();
                allocator(&dialect).ensure_store(&dialect, &mut con)
            })
        })
        .collect::<Vec<_>>();

    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    let mut con = db.connect();
    assert_eq!(
        common::count(
            &mut con,
            "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = 'SEQUENCE_STORES'"
        ),
        1
    );
}

#[test]
#[serial]
fn test_sqlite_pseudo_sequence_store_creation_waits_for_open_transaction() {
    let db = common::TestDb::new();
    let dialect = Arc::new(common::sequenced_dialect());
    let mut holder = db.connect();

    // takes the write lock before the store exists
    holder.begin_transaction().unwrap();

    let waiter = {
        let dialect = Arc::clone(&dialect);
        let mut con = db.connect();

        thread::spawn(move || {
            allocator(&dialect).allocate_next(&*dialect, &mut con, "AUTO_INCREMENT", "\"orders\"")
        })
    };

    thread::sleep(Duration::from_millis(300));
    assert_eq!(next(&dialect, &mut holder, "\"orders\""), 1);
    holder.commit_transaction().unwrap();

    assert_eq!(waiter.join().unwrap().unwrap(), Some(2));
}
