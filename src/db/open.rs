//! Apertura de conexiones SQLite.
//!
//! Cada función deja la conexión lista para usar: `busy_timeout` configurado
//! y el esquema creado. Emite eventos `db_open` con duración y estado.

use super::schema::ensure_schema;
use super::{DbResult, IN_MEMORY_PATH};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Abre la base de datos indicada en la configuración
///
/// `":memory:"` abre una base en memoria; cualquier otra ruta, un archivo.
pub fn open_from_path(path: &str) -> DbResult<Connection> {
    if path == IN_MEMORY_PATH {
        open_db_in_memory()
    } else {
        open_db(path)
    }
}

/// Abre (o crea) un archivo SQLite y asegura el esquema
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    bootstrap("file", || Connection::open(path))
}

/// Abre una base de datos SQLite en memoria y asegura el esquema
pub fn open_db_in_memory() -> DbResult<Connection> {
    bootstrap("memory", Connection::open_in_memory)
}

fn bootstrap(
    mode: &str,
    open: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={}", mode);

    let conn = match open() {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_open_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match configure(&conn) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={} duration_ms={}",
                mode,
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_bootstrap_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn configure(conn: &Connection) -> DbResult<()> {
    conn.busy_timeout(Duration::from_secs(5))?;
    ensure_schema(conn)?;
    info!("event=schema_ready module=db status=ok table=books");
    Ok(())
}
