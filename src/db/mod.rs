//! # Base de Datos SQLite
//! src/db/mod.rs
//!
//! Apertura de conexiones y creación del esquema.
//!
//! ## Invariantes
//!
//! - Ninguna conexión se entrega antes de que exista la tabla `books`.
//! - La creación del esquema es idempotente (`CREATE TABLE IF NOT EXISTS`).
//!   No hay migraciones: si la tabla ya existe se usa tal cual.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;
pub mod schema;

pub use open::{open_db, open_db_in_memory, open_from_path};

/// Ruta especial que abre una base de datos en memoria
pub const IN_MEMORY_PATH: &str = ":memory:";

pub type DbResult<T> = Result<T, DbError>;

/// Error de la capa de base de datos
#[derive(Debug)]
pub enum DbError {
    /// Error reportado por SQLite
    Sqlite(rusqlite::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
