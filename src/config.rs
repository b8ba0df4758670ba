//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración del servicio de libros con soporte para argumentos CLI y
//! variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./books_server --port 5000 --db-path ./books.db --log-level debug
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=8080 BOOKS_DB_PATH=/var/lib/books.db ./books_server
//! ```

use clap::Parser;

/// Niveles de log aceptados por `--log-level`
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Configuración del servidor de libros
#[derive(Debug, Clone, Parser)]
#[command(name = "books_server")]
#[command(about = "Servicio HTTP/1.0 CRUD para un catálogo de libros")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value = "5000", env = "HTTP_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "127.0.0.1", env = "HTTP_HOST")]
    pub host: String,

    // === Storage ===
    /// Archivo SQLite (":memory:" para una base en memoria)
    #[arg(long = "db-path", default_value = "./books.db", env = "BOOKS_DB_PATH")]
    pub db_path: String,

    // === Logging ===
    /// Nivel de log (trace, debug, info, warn, error)
    #[arg(long = "log-level", default_value = "info", env = "LOG_LEVEL")]
    pub log_level: String,

    /// Directorio para logs rotativos; sin él se loguea a stderr
    #[arg(long = "log-dir", env = "LOG_DIR")]
    pub log_dir: Option<String>,

    // === Límites ===
    /// Tamaño máximo del body de un request en bytes
    #[arg(long = "max-body-bytes", default_value = "1048576", env = "MAX_BODY_BYTES")]
    pub max_body_bytes: usize,

    /// Tamaño mínimo de body para comprimir con gzip (0 = nunca)
    #[arg(long = "gzip-min-bytes", default_value = "1024", env = "GZIP_MIN_BYTES")]
    pub gzip_min_bytes: usize,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use books_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "127.0.0.1:5000");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Valida la configuración
    ///
    /// Retorna errores si hay valores inválidos
    pub fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("Port must be >= 1".to_string());
        }
        if self.host.trim().is_empty() {
            return Err("Host must not be empty".to_string());
        }
        if self.db_path.trim().is_empty() {
            return Err("DB path must not be empty".to_string());
        }

        let level = self.log_level.trim().to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) && level != "warning" {
            return Err(format!(
                "Log level `{}` not supported; expected {}",
                self.log_level,
                LOG_LEVELS.join("|")
            ));
        }

        if self.max_body_bytes == 0 {
            return Err("Max body bytes must be >= 1".to_string());
        }

        Ok(())
    }

    /// Imprime un resumen de la configuración
    pub fn print_summary(&self) {
        println!("╔══════════════════════════════════════════════════════════════╗");
        println!("║              Books HTTP/1.0 Server Configuration             ║");
        println!("╚══════════════════════════════════════════════════════════════╝");
        println!();
        println!("🌐 Network:");
        println!("   Address:      {}", self.address());
        println!("   Max body:     {} bytes", self.max_body_bytes);

        if self.gzip_min_bytes > 0 {
            println!("   Gzip:         bodies >= {} bytes", self.gzip_min_bytes);
        } else {
            println!("   Gzip:         disabled");
        }

        println!();
        println!("🗄️  Storage:");
        println!("   Database:     {}", self.db_path);
        println!();
        println!("📝 Logging:");
        println!("   Level:        {}", self.log_level);
        match &self.log_dir {
            Some(dir) => println!("   Output:       {} (rotating files)", dir),
            None => println!("   Output:       stderr"),
        }
        println!();
        println!("═══════════════════════════════════════════════════════════════");
        println!();
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            port: 5000,
            host: "127.0.0.1".to_string(),
            db_path: "./books.db".to_string(),
            log_level: "info".to_string(),
            log_dir: None,
            max_body_bytes: 1024 * 1024,
            gzip_min_bytes: 1024,
        }
    }
}
