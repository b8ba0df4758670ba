//! # Respuestas HTTP
//! src/http/response.rs
//!
//! Builder de respuestas HTTP/1.0. Todas las respuestas del servicio son
//! JSON salvo la redirección de `/`, que va sin body.
//!
//! ## Ejemplo en el cable
//!
//! ```text
//! HTTP/1.0 201 Created\r\n
//! Content-Type: application/json\r\n
//! Content-Length: 53\r\n
//! X-Request-Id: abc123\r\n
//! \r\n
//! {"id":1,"title":"Dune","author":"Herbert","year":1965}
//! ```
//!
//! ```
//! use books_server::http::{Response, StatusCode};
//!
//! let response = Response::message(StatusCode::Ok, "Book deleted");
//! assert!(response.to_bytes().starts_with(b"HTTP/1.0 200 OK\r\n"));
//! ```

use super::StatusCode;
use serde::Serialize;
use std::collections::HashMap;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Respuesta HTTP/1.0: status, headers únicos por nombre y body binario
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

impl Response {
    /// Respuesta sin headers ni body
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Agrega un header a la respuesta
    ///
    /// Si el header ya existe, se sobrescribe.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.add_header(name, value);
        self
    }

    /// Agrega un header a una respuesta existente (versión mutable)
    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.insert(name.to_string(), value.to_string());
    }

    /// Establece el cuerpo de la respuesta desde un string
    ///
    /// Automáticamente calcula y agrega el header `Content-Length`.
    pub fn with_body(self, body: &str) -> Self {
        self.with_body_bytes(body.as_bytes().to_vec())
    }

    /// Establece el cuerpo de la respuesta desde bytes
    ///
    /// Útil cuando el body ya viene codificado (gzip).
    pub fn with_body_bytes(mut self, body: Vec<u8>) -> Self {
        self.set_body_bytes(body);
        self
    }

    /// Elimina un header si existe
    pub fn remove_header(&mut self, name: &str) {
        self.headers.remove(name);
    }

    /// Reemplaza el body de una respuesta existente y actualiza `Content-Length`
    pub fn set_body_bytes(&mut self, body: Vec<u8>) {
        self.body = body;
        self.headers.insert(
            "Content-Length".to_string(),
            self.body.len().to_string(),
        );
    }

    /// Crea una respuesta JSON exitosa (200 OK) desde un string ya serializado
    ///
    /// # Ejemplo
    /// ```
    /// use books_server::http::Response;
    ///
    /// let response = Response::json(r#"{"status": "ok"}"#);
    /// ```
    pub fn json(body: &str) -> Self {
        Self::json_bytes(StatusCode::Ok, body.as_bytes().to_vec())
    }

    fn json_bytes(status: StatusCode, body: Vec<u8>) -> Self {
        Self::new(status)
            .with_header("Content-Type", JSON_CONTENT_TYPE)
            .with_body_bytes(body)
    }

    /// Serializa `value` a JSON con el código indicado
    ///
    /// Si la serialización falla se responde 500 en vez de un body a medias.
    ///
    /// # Ejemplo
    /// ```
    /// use books_server::http::{Response, StatusCode};
    ///
    /// let response = Response::json_value(StatusCode::Created, &vec![1, 2, 3]);
    /// assert_eq!(response.status(), StatusCode::Created);
    /// assert_eq!(response.body(), b"[1,2,3]");
    /// ```
    pub fn json_value<T: Serialize + ?Sized>(status: StatusCode, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => Self::json_bytes(status, body),
            Err(err) => Self::error(
                StatusCode::InternalServerError,
                &format!("Failed to serialize response: {}", err),
            ),
        }
    }

    /// Crea una respuesta de error con mensaje JSON
    ///
    /// Formato del JSON: `{"error": "mensaje"}`
    ///
    /// # Ejemplo
    /// ```
    /// use books_server::http::{Response, StatusCode};
    ///
    /// let response = Response::error(StatusCode::BadRequest, "Year must be an integer");
    /// assert_eq!(response.body(), br#"{"error":"Year must be an integer"}"#);
    /// ```
    pub fn error(status: StatusCode, message: &str) -> Self {
        Self::json_bytes(status, serde_json::json!({ "error": message }).to_string().into_bytes())
    }

    /// Crea una respuesta con mensaje informativo `{"message": "..."}`
    pub fn message(status: StatusCode, message: &str) -> Self {
        Self::json_bytes(status, serde_json::json!({ "message": message }).to_string().into_bytes())
    }

    /// Crea una redirección 302 hacia `location`
    pub fn redirect(location: &str) -> Self {
        Self::new(StatusCode::Found)
            .with_header("Location", location)
            .with_body("")
    }

    /// Serializa status line, headers, línea vacía y body
    ///
    /// Los headers salen ordenados por nombre para que la salida sea estable.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = self.head_bytes();
        bytes.extend_from_slice(&self.body);
        bytes
    }

    /// Igual que `to_bytes` pero sin body (respuestas a HEAD)
    ///
    /// `Content-Length` se mantiene: describe el body que habría enviado un GET.
    pub fn head_bytes(&self) -> Vec<u8> {
        let mut names: Vec<&String> = self.headers.keys().collect();
        names.sort();

        let mut head = format!("HTTP/1.0 {}\r\n", self.status);
        for name in names {
            head.push_str(name);
            head.push_str(": ");
            head.push_str(&self.headers[name]);
            head.push_str("\r\n");
        }
        head.push_str("\r\n");

        let mut bytes = Vec::with_capacity(head.len() + self.body.len());
        bytes.extend_from_slice(head.as_bytes());
        bytes
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Cambia el código de estado de la respuesta
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Header por nombre exacto
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(|s| s.as_str())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}
