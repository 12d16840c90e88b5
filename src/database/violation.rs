// Copyright 2023 Remi Bernotavicius

//! Classification of failed writes into the constraint classes the stores
//! know how to report. Anything that does not classify is a bug in the
//! caller or the schema and should be propagated untouched.

use diesel::result::{DatabaseErrorKind, Error as DieselError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    Unique,
    ForeignKey,
    /// Carries the offending column name.
    NotNull(String),
}

pub fn violation(error: &DieselError) -> Option<Violation> {
    let DieselError::DatabaseError(kind, info) = error else {
        return None;
    };
    log::debug!("write failed with {kind:?}: {}", info.message());

    match kind {
        DatabaseErrorKind::UniqueViolation => Some(Violation::Unique),
        DatabaseErrorKind::ForeignKeyViolation => Some(Violation::ForeignKey),
        DatabaseErrorKind::NotNullViolation => {
            let column = info
                .column_name()
                .map(str::to_owned)
                .unwrap_or_else(|| not_null_column(info.message()).to_owned());
            Some(Violation::NotNull(column))
        }
        _ => None,
    }
}

/// SQLite reports `NOT NULL constraint failed: table.column` and never fills in
/// the column name itself.
fn not_null_column(message: &str) -> &str {
    let qualified = message.rsplit(": ").next().unwrap_or(message);
    qualified
        .split_once('.')
        .map_or(qualified, |(_, column)| column)
}

#[test]
fn classifies_synthetic_errors() {
    let unique = DieselError::DatabaseError(
        DatabaseErrorKind::UniqueViolation,
        Box::new("UNIQUE constraint failed: recipes.name".to_string()),
    );
    assert_eq!(violation(&unique), Some(Violation::Unique));

    let foreign_key = DieselError::DatabaseError(
        DatabaseErrorKind::ForeignKeyViolation,
        Box::new("FOREIGN KEY constraint failed".to_string()),
    );
    assert_eq!(violation(&foreign_key), Some(Violation::ForeignKey));

    let not_null = DieselError::DatabaseError(
        DatabaseErrorKind::NotNullViolation,
        Box::new("NOT NULL constraint failed: recipes.instructions".to_string()),
    );
    assert_eq!(
        violation(&not_null),
        Some(Violation::NotNull("instructions".into()))
    );

    let check = DieselError::DatabaseError(
        DatabaseErrorKind::CheckViolation,
        Box::new("CHECK constraint failed: amount > 0".to_string()),
    );
    assert_eq!(violation(&check), None);
    assert_eq!(violation(&DieselError::NotFound), None);
}

#[test]
fn classifies_sqlite_errors() {
    use diesel::RunQueryDsl as _;

    let mut conn = crate::database::test_connection();

    let error = diesel::sql_query("INSERT INTO categories (name) VALUES ('test category 1')")
        .execute(&mut conn)
        .unwrap_err();
    assert_eq!(violation(&error), Some(Violation::Unique));

    let error = diesel::sql_query("INSERT INTO categories (name) VALUES (NULL)")
        .execute(&mut conn)
        .unwrap_err();
    assert_eq!(violation(&error), Some(Violation::NotNull("name".into())));

    let error = diesel::sql_query(
        "INSERT INTO recipes (name, category, instructions) VALUES ('x', 99, 'y')",
    )
    .execute(&mut conn)
    .unwrap_err();
    assert_eq!(violation(&error), Some(Violation::ForeignKey));

    let error = diesel::sql_query("DELETE FROM ingredients WHERE id = 1")
        .execute(&mut conn)
        .unwrap_err();
    assert_eq!(violation(&error), Some(Violation::ForeignKey));

    let error = diesel::sql_query("SELECT * FROM no_such_table")
        .execute(&mut conn)
        .unwrap_err();
    assert_eq!(violation(&error), None);
}
