//! # Books Server - Entry Point
//! src/main.rs
//!
//! Punto de entrada del servicio de libros.
//!
//! Códigos de salida: 2 si la configuración es inválida, 1 si falla la
//! base de datos o el bind.

use books_server::config::Config;
use books_server::logging::init_logging;
use books_server::server::Server;
use books_server::store::{BookStore, SqliteBookStore};
use log::error;
use std::process;
use std::sync::Arc;

fn main() {
    let config = Config::new();

    if let Err(e) = config.validate() {
        eprintln!("❌ Configuración inválida: {}", e);
        process::exit(2);
    }

    if let Err(e) = init_logging(&config) {
        eprintln!("❌ No se pudo iniciar el logging: {}", e);
        process::exit(2);
    }

    config.print_summary();

    let store: Arc<dyn BookStore> = match SqliteBookStore::open(&config.db_path) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            error!(
                "event=startup module=main status=error stage=db_open path={} error={}",
                config.db_path, e
            );
            eprintln!("💥 Error abriendo la base de datos: {}", e);
            process::exit(1);
        }
    };

    let mut server = match Server::new(config, store) {
        Ok(server) => server,
        Err(e) => {
            error!("event=startup module=main status=error stage=router error={}", e);
            eprintln!("💥 Error fatal: {}", e);
            process::exit(1);
        }
    };

    // Bloquea el thread principal
    if let Err(e) = server.run() {
        error!("event=startup module=main status=error stage=bind error={}", e);
        eprintln!("💥 Error fatal: {}", e);
        process::exit(1);
    }
}
