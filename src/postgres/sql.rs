use std::sync::LazyLock;

use regex::Regex;

use crate::reconciler::DatabaseOptions;

/// Names Postgres accepts unquoted and folds to themselves.
static PLAIN_IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z_][a-z0-9_$]*$").expect("identifier pattern is valid")
});

/// Render `name` as an identifier.
///
/// Plain lowercase names are emitted bare so they behave exactly as if typed
/// into psql. Anything else is double-quoted with embedded quotes doubled.
///
/// ```rust
/// use pg_provision::postgres::sql::quote_ident;
///
/// assert_eq!(quote_ident("app_user"), "app_user");
/// assert_eq!(quote_ident("App User"), "\"App User\"");
/// ```
#[must_use]
pub fn quote_ident(name: &str) -> String {
    if PLAIN_IDENTIFIER.is_match(name) {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}

/// Render `value` as a standard-conforming string literal.
#[must_use]
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

pub const ROLE_EXISTS: &str = "SELECT 1 FROM pg_roles WHERE rolname = $1";

#[must_use]
pub fn create_user(name: &str, password: &str) -> String {
    format!(
        "CREATE USER {} WITH PASSWORD {};",
        quote_ident(name),
        quote_literal(password)
    )
}

#[must_use]
pub fn alter_user_password(name: &str, password: &str) -> String {
    format!(
        "ALTER USER {} WITH PASSWORD {};",
        quote_ident(name),
        quote_literal(password)
    )
}

/// `CREATE DATABASE` with each option appended as a literal `key value` pair.
#[must_use]
pub fn create_database(name: &str, options: &DatabaseOptions) -> String {
    let mut sql = format!("CREATE DATABASE {}", quote_ident(name));
    for (key, value) in options.iter() {
        sql.push(' ');
        sql.push_str(key);
        sql.push(' ');
        sql.push_str(value);
    }
    sql.push(';');
    sql
}
