//! # Record Store
//! src/store/mod.rs
//!
//! Contrato de persistencia para libros y su implementación sobre SQLite.
//!
//! ## Invariantes
//!
//! - Las escrituras validan la entrada (`NewBook::validate`,
//!   `BookPatch::validate`) antes de tocar la base de datos.
//! - Un id inexistente se reporta como `StoreError::NotFound`, nunca como
//!   un `Option` vacío: el mapeo a 404 se hace en los handlers.

pub mod book;
pub mod sqlite;

pub use book::{Book, BookField, BookId, BookPatch, NewBook, ValidationError};
pub use sqlite::SqliteBookStore;

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Errores del store
#[derive(Debug)]
pub enum StoreError {
    /// No existe un libro con ese id
    NotFound(BookId),

    /// La entrada viola alguna invariante del modelo
    InvalidInput(ValidationError),

    /// Falla de SQLite
    Db(DbError),

    /// La conexión quedó inutilizable (mutex envenenado)
    Unavailable(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "Book not found: {id}"),
            Self::InvalidInput(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "database error: {err}"),
            Self::Unavailable(message) => write!(f, "store unavailable: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidInput(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::Unavailable(_) => None,
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::InvalidInput(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Operaciones CRUD sobre libros
///
/// Se comparte entre los threads del servidor detrás de un `Arc`.
pub trait BookStore: Send + Sync {
    /// Lista todos los libros, o solo los de `author` (coincidencia exacta)
    fn list(&self, author: Option<&str>) -> StoreResult<Vec<Book>>;

    /// Inserta un libro y lo retorna con su id nuevo
    fn create(&self, new_book: &NewBook) -> StoreResult<Book>;

    /// Obtiene un libro por id
    fn get(&self, id: BookId) -> StoreResult<Book>;

    /// Aplica los campos presentes en `patch` y retorna el libro actualizado
    fn update(&self, id: BookId, patch: &BookPatch) -> StoreResult<Book>;

    /// Elimina un libro
    fn delete(&self, id: BookId) -> StoreResult<()>;
}
