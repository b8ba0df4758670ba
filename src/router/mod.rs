//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Este módulo implementa el router que mapea método + path a handlers.
//!
//! ## Arquitectura
//!
//! ```text
//! Request → Router → Handler(request, params, state) → Response
//! ```
//!
//! Los paths se registran como plantillas:
//!
//! - `/books` - literal
//! - `/books/{id}` - captura un segmento cualquiera
//! - `/books/{id:int}` - captura solo dígitos
//!
//! Cada plantilla se compila a una regex anclada. Si ninguna ruta coincide
//! con el path se responde 404; si el path existe pero no con ese método,
//! 405 con el header `Allow`.
//!
//! `HEAD` se despacha al handler de `GET`; el servidor descarta el body.

use crate::http::{Method, Request, Response, StatusCode};
use regex::Regex;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Tipo de función handler
///
/// Recibe el request, los parámetros capturados del path y el estado
/// compartido (por ejemplo el store de libros).
pub type Handler<S> = fn(&Request, &RouteParams, &S) -> Response;

/// Parámetros capturados del path (ej: `{id}` → "7")
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams {
    values: HashMap<String, String>,
}

impl RouteParams {
    /// Obtiene un parámetro como string
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(|s| s.as_str())
    }

    /// Obtiene un parámetro como entero
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(|value| value.parse().ok())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RouteParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

/// Errores al registrar una ruta
#[derive(Debug)]
pub enum RouteError {
    /// La plantilla tiene un placeholder mal formado
    InvalidTemplate(String),

    /// La regex generada no compila
    Regex(regex::Error),
}

impl Display for RouteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTemplate(template) => write!(f, "Invalid route template: {}", template),
            Self::Regex(err) => write!(f, "Invalid route pattern: {}", err),
        }
    }
}

impl Error for RouteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Regex(err) => Some(err),
            Self::InvalidTemplate(_) => None,
        }
    }
}

impl From<regex::Error> for RouteError {
    fn from(value: regex::Error) -> Self {
        Self::Regex(value)
    }
}

/// Ruta registrada
struct Route<S: ?Sized> {
    method: Method,
    template: String,
    pattern: Regex,
    param_names: Vec<String>,
    handler: Handler<S>,
}

/// Router que mapea (método, plantilla) a handlers
pub struct Router<S: ?Sized> {
    routes: Vec<Route<S>>,
}

impl<S: ?Sized> Router<S> {
    /// Crea un nuevo router vacío
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Registra una ruta con su handler
    ///
    /// # Ejemplo
    /// ```
    /// use books_server::router::{RouteParams, Router};
    /// use books_server::http::{Request, Response};
    ///
    /// fn hello_handler(_req: &Request, _params: &RouteParams, _state: &()) -> Response {
    ///     Response::json(r#"{"message": "Hello"}"#)
    /// }
    ///
    /// let mut router: Router<()> = Router::new();
    /// router.register(books_server::http::Method::GET, "/hello", hello_handler).unwrap();
    /// ```
    pub fn register(
        &mut self,
        method: Method,
        template: &str,
        handler: Handler<S>,
    ) -> Result<(), RouteError> {
        let (pattern, param_names) = compile_template(template)?;
        self.routes.push(Route {
            method,
            template: template.to_string(),
            pattern,
            param_names,
            handler,
        });
        Ok(())
    }

    /// Encuentra y ejecuta el handler apropiado para un request
    ///
    /// Si ninguna ruta coincide con el path retorna 404; si coincide el
    /// path pero no el método, 405.
    pub fn route(&self, request: &Request, state: &S) -> Response {
        let path = request.path();
        let method = match request.method() {
            Method::HEAD => Method::GET,
            other => other,
        };

        let mut allowed: Vec<&'static str> = Vec::new();

        for route in &self.routes {
            let Some(captures) = route.pattern.captures(path) else {
                continue;
            };

            if route.method != method {
                if !allowed.contains(&route.method.as_str()) {
                    allowed.push(route.method.as_str());
                }
                continue;
            }

            let mut params = RouteParams::default();
            for name in &route.param_names {
                if let Some(value) = captures.name(name) {
                    params.values.insert(name.clone(), value.as_str().to_string());
                }
            }

            let mut response = (route.handler)(request, &params, state);
            self.add_common_headers(&mut response);
            return response;
        }

        let mut response = if allowed.is_empty() {
            Response::error(StatusCode::NotFound, &format!("Route not found: {}", path))
        } else {
            if allowed.contains(&"GET") {
                allowed.push("HEAD");
            }
            Response::error(
                StatusCode::MethodNotAllowed,
                &format!("Method {} not allowed for {}", request.method().as_str(), path),
            )
            .with_header("Allow", &allowed.join(", "))
        };
        self.add_common_headers(&mut response);
        response
    }

    /// Plantillas registradas, en orden de registro
    pub fn templates(&self) -> impl Iterator<Item = (Method, &str)> {
        self.routes
            .iter()
            .map(|route| (route.method, route.template.as_str()))
    }

    /// Agrega headers comunes a todas las respuestas
    fn add_common_headers(&self, response: &mut Response) {
        response.add_header("Server", "BooksServer/0.1");
        response.add_header("Connection", "close");
    }
}

impl<S: ?Sized> Default for Router<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Compila una plantilla de ruta a una regex anclada
///
/// Retorna la regex y los nombres de los parámetros en orden.
fn compile_template(template: &str) -> Result<(Regex, Vec<String>), RouteError> {
    if !template.starts_with('/') {
        return Err(RouteError::InvalidTemplate(template.to_string()));
    }

    let mut pattern = String::from("^");
    let mut names = Vec::new();

    if template == "/" {
        pattern.push('/');
    }

    for segment in template.split('/').skip(1).filter(|s| !s.is_empty()) {
        pattern.push('/');

        match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(placeholder) => {
                let (name, kind) = placeholder.split_once(':').unwrap_or((placeholder, "str"));
                let is_identifier = !name.is_empty()
                    && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
                let class = match kind {
                    "str" => "[^/]+",
                    "int" => "[0-9]+",
                    _ => return Err(RouteError::InvalidTemplate(template.to_string())),
                };
                if !is_identifier {
                    return Err(RouteError::InvalidTemplate(template.to_string()));
                }
                pattern.push_str(&format!("(?P<{}>{})", name, class));
                names.push(name.to_string());
            }
            None => pattern.push_str(&regex::escape(segment)),
        }
    }

    pattern.push('$');
    Ok((Regex::new(&pattern)?, names))
}
