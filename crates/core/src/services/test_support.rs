//! Helpers for reading back what a service wrote to the mock database.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use sea_orm::{DatabaseConnection, Statement, Value};

/// Every statement the connection executed, in order.
///
/// All services holding the connection must be dropped first.
pub fn executed(db: Arc<DatabaseConnection>) -> Vec<Statement> {
    Arc::try_unwrap(db)
        .ok()
        .unwrap()
        .into_transaction_log()
        .iter()
        .flat_map(|txn| txn.statements().to_vec())
        .collect()
}

/// The first statement starting with `verb` (`INSERT`, `UPDATE`, ...).
pub fn first<'a>(statements: &'a [Statement], verb: &str) -> &'a Statement {
    statements
        .iter()
        .find(|stmt| stmt.sql.starts_with(verb))
        .unwrap()
}

/// Value bound to `column` by an INSERT column list or an UPDATE `SET` clause.
pub fn bound(stmt: &Statement, column: &str) -> Value {
    let values = &stmt.values.as_ref().unwrap().0;
    let quoted = format!("\"{column}\"");

    if stmt.sql.starts_with("INSERT") {
        let columns = stmt.sql.split_once('(').unwrap().1.split_once(')').unwrap().0;
        let index = columns.split(", ").position(|c| c == quoted).unwrap();
        return values[index].clone();
    }

    let needle = format!("{quoted} = $");
    let start = stmt.sql.find(&needle).unwrap() + needle.len();
    let position: usize = stmt.sql[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .unwrap();
    values[position - 1].clone()
}

/// Whether `column` was written as SQL NULL.
pub fn is_null(stmt: &Statement, column: &str) -> bool {
    bound(stmt, column).to_string() == "NULL"
}
