//! # Servidor TCP
//! src/server/tcp.rs
//!
//! Acepta conexiones y procesa cada una en su propio thread. Cada conexión
//! lleva exactamente un request: se lee, se enruta, se responde y se cierra.
//!
//! El store se comparte entre threads detrás de un `Arc`; la serialización
//! de escrituras la hace el propio store.

use crate::config::Config;
use crate::handlers;
use crate::http::encoding::{apply_etag, apply_gzip};
use crate::http::request::{content_length, find_body_start};
use crate::http::{Method, Request, Response, StatusCode};
use crate::router::{RouteError, Router};
use crate::store::BookStore;
use log::{debug, error, info, warn};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Máximo de bytes permitidos para la request line + headers
const MAX_HEADER_BYTES: usize = 16 * 1024;

/// Tamaño del buffer de lectura
const READ_CHUNK_BYTES: usize = 8192;

/// Máximo de bytes que se descartan tras rechazar un request demasiado grande
const MAX_DRAIN_BYTES: usize = 8 * 1024 * 1024;

/// Espera máxima por cada lectura mientras se descarta la entrada
const DRAIN_READ_TIMEOUT: Duration = Duration::from_secs(1);

static REQUEST_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Estado compartido por todos los threads de conexión
struct ConnectionContext {
    router: Router<dyn BookStore>,
    store: Arc<dyn BookStore>,
    max_body_bytes: usize,
    gzip_min_bytes: usize,
}

/// Errores al leer un request del socket
#[derive(Debug)]
enum ReadError {
    Io(io::Error),

    /// El request supera el límite; `pending` son los bytes declarados que
    /// el cliente todavía no envió (`None` si no se conocen)
    TooLarge { pending: Option<usize> },
}

impl From<io::Error> for ReadError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// Servidor HTTP/1.0 del catálogo de libros
pub struct Server {
    config: Config,
    context: Arc<ConnectionContext>,
    listener: Option<TcpListener>,
}

impl Server {
    /// Crea el servidor con el store inyectado
    ///
    /// Falla solo si alguna plantilla de ruta es inválida.
    pub fn new(config: Config, store: Arc<dyn BookStore>) -> Result<Self, RouteError> {
        let router = handlers::build_router()?;

        let context = ConnectionContext {
            router,
            store,
            max_body_bytes: config.max_body_bytes,
            gzip_min_bytes: config.gzip_min_bytes,
        };

        Ok(Self {
            config,
            context: Arc::new(context),
            listener: None,
        })
    }

    /// Hace bind a `host:port` y retorna la dirección efectiva
    ///
    /// Con puerto 0 el sistema operativo asigna uno libre.
    pub fn bind(&mut self) -> io::Result<SocketAddr> {
        if let Some(listener) = &self.listener {
            return listener.local_addr();
        }

        let address = self.config.address();
        let listener = TcpListener::bind(&address)?;
        let local_addr = listener.local_addr()?;
        info!(
            "event=server_listen module=server status=ok address={}",
            local_addr
        );

        self.listener = Some(listener);
        Ok(local_addr)
    }

    /// Dirección en la que escucha el servidor, si ya hizo bind
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener
            .as_ref()
            .and_then(|listener| listener.local_addr().ok())
    }

    /// Acepta conexiones indefinidamente (un thread por conexión)
    pub fn run(&mut self) -> io::Result<()> {
        self.bind()?;
        let Some(listener) = self.listener.as_ref() else {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "listener not bound"));
        };

        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    let context = Arc::clone(&self.context);

                    let peer_addr = stream
                        .peer_addr()
                        .map(|addr| addr.to_string())
                        .unwrap_or_else(|_| "unknown".to_string());
                    debug!("event=accept module=server status=ok peer={}", peer_addr);

                    thread::spawn(move || {
                        if let Err(e) = Self::handle_connection_static(stream, context) {
                            warn!("event=connection module=server status=error error={}", e);
                        }
                    });
                }
                Err(e) => {
                    error!("event=accept module=server status=error error={}", e);
                }
            }
        }

        Ok(())
    }

    fn handle_connection_static(
        mut stream: TcpStream,
        context: Arc<ConnectionContext>,
    ) -> io::Result<()> {
        let start = Instant::now();
        let request_id = next_request_id();

        let raw = match read_request(&mut stream, context.max_body_bytes) {
            Ok(raw) => raw,
            Err(ReadError::TooLarge { pending }) => {
                let response = Self::connection_error(
                    StatusCode::PayloadTooLarge,
                    &format!("Request exceeds {} bytes", context.max_body_bytes),
                    &request_id,
                );
                stream.write_all(&response.to_bytes())?;
                stream.flush()?;
                log_request("-", "-", "-", response.status(), start, &request_id);

                // Cerrar con datos sin leer provoca un RST que puede
                // descartar la respuesta en el cliente
                stream.shutdown(Shutdown::Write)?;
                stream.set_read_timeout(Some(DRAIN_READ_TIMEOUT))?;
                let limit = pending.map_or(MAX_DRAIN_BYTES, |n| n.min(MAX_DRAIN_BYTES));
                let drained = drain_input(&mut stream, limit);
                debug!(
                    "event=drain module=server status=ok bytes={} request_id={}",
                    drained, request_id
                );
                return Ok(());
            }
            Err(ReadError::Io(e)) => return Err(e),
        };

        if raw.is_empty() {
            debug!("event=connection module=server status=closed request_id={}", request_id);
            return Ok(());
        }

        let (bytes, method, version, path, status) = match Request::parse(&raw) {
            Ok(request) => {
                let mut response = context.router.route(&request, context.store.as_ref());
                apply_etag(&request, &mut response);
                apply_gzip(&request, &mut response, context.gzip_min_bytes);
                response.add_header("X-Request-Id", &request_id);

                let bytes = if request.method() == Method::HEAD {
                    response.head_bytes()
                } else {
                    response.to_bytes()
                };
                (
                    bytes,
                    request.method().as_str(),
                    request.version().to_string(),
                    request.path().to_string(),
                    response.status(),
                )
            }
            Err(e) => {
                let response = Self::connection_error(
                    StatusCode::BadRequest,
                    &format!("Invalid request: {}", e),
                    &request_id,
                );
                (
                    response.to_bytes(),
                    "-",
                    "-".to_string(),
                    "-".to_string(),
                    response.status(),
                )
            }
        };

        stream.write_all(&bytes)?;
        stream.flush()?;

        log_request(method, &version, &path, status, start, &request_id);
        Ok(())
    }

    /// Respuesta para errores anteriores al routing (parseo, tamaño)
    fn connection_error(status: StatusCode, message: &str, request_id: &str) -> Response {
        Response::error(status, message)
            .with_header("Server", "BooksServer/0.1")
            .with_header("Connection", "close")
            .with_header("X-Request-Id", request_id)
    }
}

/// Lee un request completo del socket
///
/// Lee hasta tener los headers y, si hay `Content-Length`, el body
/// completo. Un cliente que cierra sin enviar nada produce un buffer vacío.
fn read_request(stream: &mut impl Read, max_body_bytes: usize) -> Result<Vec<u8>, ReadError> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; READ_CHUNK_BYTES];
    let mut expected_len: Option<usize> = None;

    loop {
        if let Some(expected) = expected_len {
            if buffer.len() >= expected {
                break;
            }
        }

        let bytes_read = stream.read(&mut chunk)?;
        if bytes_read == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..bytes_read]);

        if expected_len.is_none() {
            match find_body_start(&buffer) {
                Some(body_start) => {
                    let body_len = content_length(&buffer[..body_start]).unwrap_or(0);
                    if body_len > max_body_bytes {
                        let expected = body_start + body_len;
                        return Err(ReadError::TooLarge {
                            pending: Some(expected.saturating_sub(buffer.len())),
                        });
                    }
                    expected_len = Some(body_start + body_len);
                }
                None if buffer.len() > MAX_HEADER_BYTES => {
                    return Err(ReadError::TooLarge { pending: None })
                }
                None => {}
            }
        }
    }

    Ok(buffer)
}

/// Lee y descarta hasta `limit` bytes; se detiene en EOF, timeout o error
///
/// Retorna cuántos bytes se descartaron.
fn drain_input(stream: &mut impl Read, limit: usize) -> usize {
    let mut chunk = [0u8; READ_CHUNK_BYTES];
    let mut drained = 0;

    while drained < limit {
        let wanted = (limit - drained).min(READ_CHUNK_BYTES);
        match stream.read(&mut chunk[..wanted]) {
            Ok(0) | Err(_) => break,
            Ok(n) => drained += n,
        }
    }

    drained
}

/// Genera un id único por request (16 dígitos hex)
fn next_request_id() -> String {
    let sequence = REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed);

    let mut hasher = DefaultHasher::new();
    sequence.hash(&mut hasher);
    std::process::id().hash(&mut hasher);
    thread::current().id().hash(&mut hasher);
    std::time::SystemTime::now().hash(&mut hasher);

    format!("{:016x}", hasher.finish())
}

fn log_request(
    method: &str,
    version: &str,
    path: &str,
    status: StatusCode,
    start: Instant,
    request_id: &str,
) {
    info!(
        "event=request module=server method={} version={} path={} status={} duration_ms={:.2} request_id={}",
        method,
        version,
        path,
        status.as_u16(),
        start.elapsed().as_secs_f64() * 1000.0,
        request_id
    );
}
