//! # Store sobre SQLite
//! src/store/sqlite.rs
//!
//! Una sola conexión protegida por un `Mutex`: todas las sentencias quedan
//! serializadas, lo que alcanza para el modelo de un solo escritor.

use super::{Book, BookId, BookPatch, BookStore, NewBook, StoreError, StoreResult};
use crate::db::{self, DbResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Mutex, MutexGuard};

const BOOK_SELECT_SQL: &str = "SELECT id, title, author, year FROM books";

/// Store de libros respaldado por SQLite
pub struct SqliteBookStore {
    conn: Mutex<Connection>,
}

impl SqliteBookStore {
    /// Envuelve una conexión ya abierta
    ///
    /// La conexión debe venir de `db::open_*`, que garantiza el esquema.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Abre la base de datos en `path` (`":memory:"` para memoria)
    pub fn open(path: &str) -> DbResult<Self> {
        Ok(Self::new(db::open_from_path(path)?))
    }

    /// Store en memoria, útil para tests
    pub fn in_memory() -> DbResult<Self> {
        Ok(Self::new(db::open_db_in_memory()?))
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|err| StoreError::Unavailable(err.to_string()))
    }
}

fn find_book(conn: &Connection, id: BookId) -> StoreResult<Book> {
    conn.query_row(
        &format!("{BOOK_SELECT_SQL} WHERE id = ?1;"),
        [id],
        parse_book_row,
    )
    .optional()?
    .ok_or(StoreError::NotFound(id))
}

impl BookStore for SqliteBookStore {
    fn list(&self, author: Option<&str>) -> StoreResult<Vec<Book>> {
        let conn = self.lock()?;

        let books = match author {
            Some(author) => {
                let mut stmt =
                    conn.prepare(&format!("{BOOK_SELECT_SQL} WHERE author = ?1 ORDER BY id ASC;"))?;
                let books = stmt
                    .query_map([author], parse_book_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                books
            }
            None => {
                let mut stmt = conn.prepare(&format!("{BOOK_SELECT_SQL} ORDER BY id ASC;"))?;
                let books = stmt
                    .query_map([], parse_book_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                books
            }
        };

        Ok(books)
    }

    fn create(&self, new_book: &NewBook) -> StoreResult<Book> {
        new_book.validate()?;

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO books (title, author, year) VALUES (?1, ?2, ?3);",
            params![new_book.title, new_book.author, new_book.year],
        )?;

        Ok(Book {
            id: conn.last_insert_rowid(),
            title: new_book.title.clone(),
            author: new_book.author.clone(),
            year: new_book.year,
        })
    }

    fn get(&self, id: BookId) -> StoreResult<Book> {
        let conn = self.lock()?;
        find_book(&conn, id)
    }

    fn update(&self, id: BookId, patch: &BookPatch) -> StoreResult<Book> {
        patch.validate()?;

        let conn = self.lock()?;
        if patch.is_empty() {
            return find_book(&conn, id);
        }

        let changed = conn.execute(
            "UPDATE books
             SET
                title = COALESCE(?1, title),
                author = COALESCE(?2, author),
                year = COALESCE(?3, year)
             WHERE id = ?4;",
            params![patch.title, patch.author, patch.year, id],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }

        find_book(&conn, id)
    }

    fn delete(&self, id: BookId) -> StoreResult<()> {
        let conn = self.lock()?;
        let changed = conn.execute("DELETE FROM books WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }

        Ok(())
    }
}

fn parse_book_row(row: &Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        id: row.get("id")?,
        title: row.get("title")?,
        author: row.get("author")?,
        year: row.get("year")?,
    })
}
