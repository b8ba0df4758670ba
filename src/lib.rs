//! # Books Server
//! src/lib.rs
//!
//! Servicio HTTP/1.0 que expone un catálogo de libros persistido en SQLite,
//! con operaciones de listar (con filtro por autor), crear, obtener,
//! actualizar parcialmente y eliminar.
//!
//! ## Arquitectura
//!
//! El servidor está dividido en módulos especializados:
//! - `http`: Parsing y manejo del protocolo HTTP/1.0, ETag y gzip
//! - `server`: Lógica del servidor TCP y manejo de conexiones
//! - `router`: Enrutamiento de peticiones a handlers
//! - `handlers`: Endpoints del catálogo
//! - `store`: Modelo de libro, validación y persistencia
//! - `db`: Apertura de SQLite y esquema
//! - `config` / `logging`: Configuración CLI/env y logging
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use books_server::config::Config;
//! use books_server::server::Server;
//! use books_server::store::{BookStore, SqliteBookStore};
//! use std::sync::Arc;
//!
//! let config = Config::default();
//! let store: Arc<dyn BookStore> = Arc::new(SqliteBookStore::open(&config.db_path).unwrap());
//! let mut server = Server::new(config, store).unwrap();
//! server.run().expect("Error al iniciar servidor");
//! ```

pub mod config;
pub mod db;
pub mod handlers;
pub mod http;
pub mod logging;
pub mod router;
pub mod server;
pub mod store;
