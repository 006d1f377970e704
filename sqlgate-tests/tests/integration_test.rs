//! Integration tests for sqlgate with a MySQL testcontainer
//!
//! These tests run the full stack against a real server: statement caching,
//! result shaping, read-only mode, batched inserts and type conversions.
//! They need Docker and are ignored by default:
//!
//! ```text
//! cargo test -p sqlgate-tests -- --ignored
//! ```
//!
//! A single container is shared across all tests. It is started by the first
//! test that asks for it and lives in its own thread with its own runtime.
//! Tests run sequentially with `serial_test` and clean up tables first.
//!
//! Container cleanup:
//! - The `watchdog` feature handles cleanup on CTRL+C or SIGTERM signals
//! - For normal process exit, `shutdown_hooks` signals the container thread to stop

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serial_test::serial;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;
use std::thread;
use std::time::Duration;
use testcontainers::{runners::AsyncRunner, ContainerAsync};
use testcontainers_modules::mysql::Mysql;

use sqlgate::{
    Error, FromRow, InsertLimits, InsertResult, InsertSpec, InsertTarget, MySqlConnection, Query,
    QueryMode, ResultKind, Row, Settings, ToRow, Value,
};

// Holds the connection URL (container lives in the thread)
static DB_URL: OnceLock<String> = OnceLock::new();
// Flag to signal the container thread to exit
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

const SCHEMA: &str = include_str!("../schema.sql");
const ALL_TABLES: &[&str] = &["events", "users"];

/// Called on process exit; signals the container thread to stop.
extern "C" fn cleanup_on_exit() {
    SHUTDOWN.store(true, Ordering::SeqCst);
    std::thread::sleep(Duration::from_millis(500));
}

fn start_container() -> String {
    shutdown_hooks::add_shutdown_hook(cleanup_on_exit);

    let (ready_tx, ready_rx) = std::sync::mpsc::channel();

    thread::spawn(move || {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let container: ContainerAsync<Mysql> = Mysql::default().start().await.unwrap();
            let port = container.get_host_port_ipv4(3306).await.unwrap();
            let url = format!("mysql://root@127.0.0.1:{}/test", port);

            let mut conn = sqlgate::mysql::connect(&Settings::from_url(url.clone()))
                .await
                .unwrap();
            for stmt in SCHEMA.split(';').map(str::trim).filter(|s| !s.is_empty()) {
                conn.exec(stmt, vec![]).await.unwrap();
            }
            conn.disconnect().await.unwrap();

            ready_tx.send(url).unwrap();

            // Container is dropped when this loop exits
            while !SHUTDOWN.load(Ordering::Relaxed) {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        });
    });

    ready_rx.recv().unwrap()
}

fn db_url() -> &'static str {
    DB_URL.get_or_init(start_container)
}

async fn connect() -> MySqlConnection {
    let mut conn = sqlgate::mysql::connect(&Settings::from_url(db_url()))
        .await
        .unwrap();
    for table in ALL_TABLES {
        conn.exec(&format!("DELETE FROM `{}`", table), vec![])
            .await
            .unwrap();
    }
    conn
}

#[derive(Debug, PartialEq, FromRow, ToRow)]
struct User {
    #[sqlgate(skip_insert)]
    id: i64,
    username: String,
    email: Option<String>,
    active: bool,
}

fn user(name: &str) -> User {
    User {
        id: 0,
        username: name.to_string(),
        email: Some(format!("{}@example.com", name)),
        active: true,
    }
}

// ============ Query Execution ============

#[tokio::test]
#[serial]
#[ignore = "requires Docker"]
async fn test_insert_and_query_shapes() {
    let mut conn = connect().await;

    let rows = vec![
        Row::named([("username", Value::from("a")), ("active", Value::Bool(true))]),
        Row::named([("username", Value::from("b")), ("active", Value::Bool(false))]),
    ];
    assert_eq!(conn.insert_rows("users", rows).await.unwrap(), 2);

    let named = conn
        .query("SELECT username, active FROM users ORDER BY username", vec![])
        .await
        .unwrap();
    assert_eq!(named.len(), 2);
    assert_eq!(named[1].get::<String>("username").unwrap(), "b");
    assert!(!named[1].get::<bool>("active").unwrap());

    let numbered = conn
        .query_numbered(
            "SELECT username FROM users WHERE active = ?",
            vec![Value::Bool(true)],
        )
        .await
        .unwrap();
    assert_eq!(numbered, vec![Row::Positional(vec![Value::from("a")])]);

    let missing = conn
        .query_row("SELECT * FROM users WHERE username = ?", vec![Value::from("zz")])
        .await
        .unwrap();
    assert!(missing.is_none());

    let count: i64 = conn
        .fetch_scalar(
            "SELECT COUNT(*) FROM users WHERE active = ?",
            vec![Value::Int(1)],
        )
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker"]
async fn test_exec_and_insert_id() {
    let mut conn = connect().await;

    let id = conn
        .exec_insert_id(
            "INSERT INTO users (username) VALUES (?)",
            vec![Value::from("first")],
        )
        .await
        .unwrap();
    assert!(id > 0);

    let changed = conn
        .exec("UPDATE users SET active = 0 WHERE id = ?", vec![Value::from(id)])
        .await
        .unwrap();
    assert_eq!(changed, 1);
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker"]
async fn test_statement_cache() {
    let mut conn = connect().await;
    let sql = "SELECT COUNT(*) FROM users";
    let mode = QueryMode::new(ResultKind::SingleScalar).cached();

    conn.execute(sql, vec![], mode).await.unwrap();
    conn.execute(sql, vec![], mode).await.unwrap();
    assert_eq!(conn.statement_cache().len(), 1);

    // parameterized without the flag is prepared but not kept
    conn.query("SELECT * FROM users WHERE id = ?", vec![Value::Int(1)])
        .await
        .unwrap();
    assert_eq!(conn.statement_cache().len(), 1);
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker"]
async fn test_server_errors() {
    let mut conn = connect().await;

    let err = conn.query("SELECT * FROM nope", vec![]).await.unwrap_err();
    assert_eq!(err.code(), 1146);
    assert_eq!(conn.error_state().code(), 1146);

    let err = conn.exec("SELEC 1", vec![]).await.unwrap_err();
    assert_eq!(err.code(), 1064);

    conn.query("SELECT 1", vec![]).await.unwrap();
    assert!(!conn.error_state().is_error());
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker"]
async fn test_read_only_connection() {
    connect().await;
    let settings = Settings {
        read_only: true,
        encoding: Some("utf8mb4".into()),
        ..Settings::from_url(db_url())
    };
    let mut conn = sqlgate::mysql::connect(&settings).await.unwrap();
    assert!(conn.is_read_only());

    let err = conn.exec("DELETE FROM users", vec![]).await.unwrap_err();
    assert!(matches!(err, Error::ReadOnly));
    assert_eq!(conn.error_state().code(), -1);

    conn.query("SHOW TABLES", vec![]).await.unwrap();
    conn.set_preferred_encoding("utf8mb4").await.unwrap();
    let err = conn
        .exec("SET autocommit = 0", vec![])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ReadOnly));
}

// ============ Batch Inserts ============

#[tokio::test]
#[serial]
#[ignore = "requires Docker"]
async fn test_batch_insert_across_statements() {
    let mut conn = connect().await;
    conn.set_insert_limits(InsertLimits {
        max_rows: 3,
        max_statement_len: 300_000,
    });

    let rows = (0..10)
        .map(|i| Row::positional([Value::from(format!("kind{}", i)), Value::Int(i)]))
        .collect();
    let spec = InsertSpec::new("events")
        .fields(["kind", "amount"])
        .rows(rows);
    assert_eq!(conn.insert(spec.into()).await.unwrap(), 10);

    let count: i64 = conn
        .fetch_scalar("SELECT COUNT(*) FROM events", vec![])
        .await
        .unwrap();
    assert_eq!(count, 10);
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker"]
async fn test_batch_insert_last_id() {
    let mut conn = connect().await;
    let spec = InsertSpec::new("users")
        .row(Row::named([("username", Value::from("solo"))]))
        .result(InsertResult::LastId);
    let id = conn.insert(spec.into()).await.unwrap();

    let name: String = conn
        .fetch_scalar("SELECT username FROM users WHERE id = ?", vec![Value::from(id)])
        .await
        .unwrap();
    assert_eq!(name, "solo");
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker"]
async fn test_batch_insert_duplicate_key() {
    let mut conn = connect().await;
    let rows = vec![
        Row::named([("username", Value::from("dup"))]),
        Row::named([("username", Value::from("dup"))]),
    ];
    let err = conn
        .insert(InsertTarget::simple("users", rows))
        .await
        .unwrap_err();
    assert_eq!(err.code(), 1062);
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker"]
async fn test_insert_entities_and_fetch() {
    let mut conn = connect().await;
    let users = vec![user("ann"), user("bo"), user("cy")];
    assert_eq!(conn.insert_entities("users", &users).await.unwrap(), 3);

    let fetched: Vec<User> = Query::new("SELECT * FROM users ORDER BY username")
        .fetch_all(&mut conn)
        .await
        .unwrap();
    assert_eq!(fetched.len(), 3);
    assert_eq!(fetched[0].username, "ann");
    assert_eq!(fetched[0].email.as_deref(), Some("ann@example.com"));
    assert!(fetched[0].id > 0);

    let bo: User = Query::new("SELECT * FROM users WHERE username = ?")
        .bind("bo")
        .cached()
        .fetch_one(&mut conn)
        .await
        .unwrap();
    assert_eq!(bo.username, "bo");
}

// ============ Types ============

#[tokio::test]
#[serial]
#[ignore = "requires Docker"]
async fn test_value_round_trip() {
    let mut conn = connect().await;
    let at = NaiveDate::from_ymd_opt(2024, 2, 29)
        .unwrap()
        .and_hms_opt(23, 59, 1)
        .unwrap();
    let amount = Decimal::new(1999, 2);

    conn.insert_rows(
        "events",
        vec![Row::named([
            ("kind", Value::from("it's \"quoted\"\n")),
            ("amount", Value::Decimal(amount)),
            ("happened_at", Value::DateTime(at)),
            ("payload", Value::Bytes(vec![0, 159, 255])),
        ])],
    )
    .await
    .unwrap();

    let row = conn
        .query_row(
            "SELECT kind, amount, happened_at, payload FROM events WHERE kind LIKE ?",
            vec![Value::from("it%")],
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.get::<String>("kind").unwrap(), "it's \"quoted\"\n");
    assert_eq!(row.get::<Decimal>("amount").unwrap(), amount);
    assert_eq!(row.get::<chrono::NaiveDateTime>("happened_at").unwrap(), at);
    assert_eq!(row.get::<Vec<u8>>("payload").unwrap(), vec![0, 159, 255]);
}

#[tokio::test]
#[serial]
#[ignore = "requires Docker"]
async fn test_schema_helpers() {
    let mut conn = connect().await;
    assert!(conn.table_exists("users").await.unwrap());
    assert!(!conn.table_exists("nope").await.unwrap());
    assert!(conn.column_exists("users", "email").await.unwrap());
    assert!(!conn.column_exists("users", "phone").await.unwrap());
}
