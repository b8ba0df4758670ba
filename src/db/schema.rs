//! # Esquema de la tabla `books`
//! src/db/schema.rs

use super::DbResult;
use rusqlite::Connection;

/// `AUTOINCREMENT` garantiza que un id nunca se reutiliza tras un DELETE.
const CREATE_BOOKS_SQL: &str = "CREATE TABLE IF NOT EXISTS books (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    author TEXT NOT NULL,
    year INTEGER NOT NULL
);";

/// Crea la tabla `books` si no existe
pub fn ensure_schema(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(CREATE_BOOKS_SQL)?;
    Ok(())
}

/// Verifica si la tabla `books` existe
pub fn books_table_exists(conn: &Connection) -> DbResult<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'books';",
        [],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}
