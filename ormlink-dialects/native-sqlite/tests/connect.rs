use ormlink_core::data::DataValue;
use ormlink_dialects_base::{
    common::query::Query,
    interface::{Connection, ConnectionPool, TransactionManager},
};
use pretty_assertions::assert_eq;

mod common;

#[test]
fn test_sqlite_open_connection_and_query_row() {
    let mut con = common::connect_to_memory();

    let row = con
        .query_row(Query::sql("SELECT 1, 'abc', NULL, 1.5, x'0102'"))
        .unwrap();

    assert_eq!(
        row,
        Some(vec![
            DataValue::Int64(1),
            DataValue::from("abc"),
            DataValue::Null,
            DataValue::Float64(1.5),
            DataValue::Binary(vec![1, 2]),
        ])
    );
}

#[test]
fn test_sqlite_query_row_no_rows() {
    let mut con = common::connect_to_memory();

    let row = con
        .query_row(Query::sql("SELECT 1 WHERE 1 = 0"))
        .unwrap();

    assert_eq!(row, None);
}

#[test]
fn test_sqlite_execute_with_params() {
    let mut con = common::connect_to_memory();

    con.execute(Query::sql("CREATE TABLE t (a INTEGER, b TEXT)"))
        .unwrap();

    let affected = con
        .execute(Query::new(
            "INSERT INTO t (a, b) VALUES (?1, ?2), (?1, ?2)",
            vec![DataValue::UInt64(5), DataValue::from("x")],
        ))
        .unwrap();
    assert_eq!(affected, 2);

    let row = con
        .query_row(Query::new(
            "SELECT count(*), max(b) FROM t WHERE a = ?1",
            vec![DataValue::Int32(5)],
        ))
        .unwrap();
    assert_eq!(row, Some(vec![DataValue::Int64(2), DataValue::from("x")]));
}

#[test]
fn test_sqlite_colon_numbered_params() {
    let mut con = common::connect_to_memory();

    let row = con
        .query_row(Query::new(
            "SELECT :1 || :2",
            vec![DataValue::from("a"), DataValue::from("b")],
        ))
        .unwrap();

    assert_eq!(row, Some(vec![DataValue::from("ab")]));
}

#[test]
fn test_sqlite_param_count_mismatch() {
    let mut con = common::connect_to_memory();

    con.query_row(Query::new("SELECT ?1", vec![])).unwrap_err();
}

#[test]
fn test_sqlite_invalid_sql() {
    let mut con = common::connect_to_memory();

    con.execute(Query::sql("INSERT INTO missing VALUES (1)"))
        .unwrap_err();
}

#[test]
fn test_sqlite_transaction_rollback() {
    let mut con = common::connect_to_memory();
    con.execute(Query::sql("CREATE TABLE t (a INTEGER)")).unwrap();

    assert!(!con.is_in_transaction().unwrap());
    con.begin_transaction().unwrap();
    assert!(con.is_in_transaction().unwrap());

    con.execute(Query::sql("INSERT INTO t VALUES (1)")).unwrap();
    con.rollback_transaction().unwrap();

    assert!(!con.is_in_transaction().unwrap());
    assert_eq!(common::count(&mut con, "SELECT count(*) FROM t"), 0);
}

#[test]
fn test_sqlite_transaction_commit() {
    let db = common::TestDb::new();
    let mut con = db.connect();
    con.execute(Query::sql("CREATE TABLE t (a INTEGER)")).unwrap();

    con.begin_transaction().unwrap();
    con.execute(Query::sql("INSERT INTO t VALUES (1)")).unwrap();
    con.commit_transaction().unwrap();

    let mut other = db.pool().acquire().unwrap();
    assert_eq!(common::count(&mut other, "SELECT count(*) FROM t"), 1);
}
