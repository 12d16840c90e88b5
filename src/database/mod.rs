// Copyright 2023 Remi Bernotavicius

use diesel::connection::SimpleConnection as _;
use diesel::prelude::Connection as _;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::error::Error;
use std::path::Path;

pub mod models;
pub mod schema;
pub mod violation;

pub type Connection = diesel::sqlite::SqliteConnection;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Opens the database at `path` (`":memory:"` works too), turns on foreign key
/// enforcement and brings the schema up to date.
pub fn establish_connection(
    path: impl AsRef<Path>,
) -> Result<Connection, Box<dyn Error + Send + Sync + 'static>> {
    let path = path.as_ref();
    let url = path
        .to_str()
        .ok_or_else(|| format!("database path {path:?} is not valid UTF-8"))?;
    let mut connection = Connection::establish(url)?;
    connection.batch_execute("PRAGMA foreign_keys = ON;")?;
    connection.run_pending_migrations(MIGRATIONS)?;
    log::debug!("opened database at {url}");
    Ok(connection)
}

/// A fresh in-memory database holding the rows from `test_fixture.sql`.
#[cfg(test)]
pub fn test_connection() -> Connection {
    let mut conn = establish_connection(":memory:").unwrap();
    conn.batch_execute(include_str!("test_fixture.sql")).unwrap();
    conn
}

#[test]
fn migrations() {
    use diesel::QueryDsl as _;
    use diesel::RunQueryDsl as _;

    let mut conn = establish_connection(":memory:").unwrap();
    let reverted = conn.revert_all_migrations(MIGRATIONS).unwrap();
    assert_eq!(reverted.len(), 1);
    assert!(conn.has_pending_migration(MIGRATIONS).unwrap());

    conn.run_pending_migrations(MIGRATIONS).unwrap();
    assert!(!conn.has_pending_migration(MIGRATIONS).unwrap());

    let count: i64 = schema::recipe_contents::table
        .count()
        .get_result(&mut conn)
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn foreign_keys_are_enforced() {
    use diesel::RunQueryDsl as _;

    let mut conn = establish_connection(":memory:").unwrap();
    let enabled: Vec<ForeignKeys> = diesel::sql_query("PRAGMA foreign_keys;")
        .load(&mut conn)
        .unwrap();
    assert_eq!(enabled.len(), 1);
    assert_eq!(enabled[0].foreign_keys, 1);
}

#[cfg(test)]
#[derive(diesel::QueryableByName)]
struct ForeignKeys {
    #[diesel(sql_type = diesel::sql_types::Integer)]
    foreign_keys: i32,
}
