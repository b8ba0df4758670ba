//! # Post-procesamiento de Respuestas
//! src/http/encoding.rs
//!
//! Se aplica a cada respuesta justo antes de escribirla al socket:
//!
//! 1. **ETag**: hash SHA256 del body para GET/HEAD exitosos. Si el cliente
//!    manda `If-None-Match` con el mismo valor se responde 304 sin body.
//! 2. **gzip**: si el cliente acepta `gzip` y el body es suficientemente
//!    grande, se comprime con flate2.
//!
//! El ETag se calcula sobre el body sin comprimir, así no depende del
//! `Accept-Encoding` del cliente.

use super::{Method, Request, Response, StatusCode};
use flate2::write::GzEncoder;
use flate2::Compression;
use sha2::{Digest, Sha256};
use std::io::Write;

/// Bytes del digest que se usan en el ETag (32 caracteres hex)
const ETAG_DIGEST_BYTES: usize = 16;

/// Calcula el ETag fuerte de un body
///
/// # Ejemplo
/// ```
/// use books_server::http::encoding::etag_for;
///
/// let tag = etag_for(b"[]");
/// assert!(tag.starts_with('"') && tag.ends_with('"'));
/// assert_eq!(tag.len(), 34);
/// ```
pub fn etag_for(body: &[u8]) -> String {
    let digest = Sha256::digest(body);
    let hex: String = digest[..ETAG_DIGEST_BYTES]
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect();
    format!("\"{}\"", hex)
}

/// Agrega el ETag y resuelve `If-None-Match`
///
/// Solo aplica a respuestas 200 de GET y HEAD.
pub fn apply_etag(request: &Request, response: &mut Response) {
    if !matches!(request.method(), Method::GET | Method::HEAD) || response.status() != StatusCode::Ok {
        return;
    }

    let tag = etag_for(response.body());
    response.add_header("ETag", &tag);

    let matches = request
        .header("If-None-Match")
        .map(|value| value.split(',').any(|candidate| {
            let candidate = candidate.trim();
            candidate == "*" || candidate == tag
        }))
        .unwrap_or(false);

    if matches {
        response.set_status(StatusCode::NotModified);
        response.set_body_bytes(Vec::new());
        response.remove_header("Content-Type");
    }
}

/// Comprime el body con gzip si el cliente lo acepta
///
/// `min_bytes == 0` deshabilita la compresión. Si falla la compresión se
/// deja el body original.
pub fn apply_gzip(request: &Request, response: &mut Response, min_bytes: usize) {
    if min_bytes == 0 || response.body().len() < min_bytes || !accepts_gzip(request) {
        return;
    }

    match gzip(response.body()) {
        Ok(compressed) => {
            response.set_body_bytes(compressed);
            response.add_header("Content-Encoding", "gzip");
            response.add_header("Vary", "Accept-Encoding");
        }
        Err(err) => {
            log::warn!(
                "event=gzip module=http status=error error={}",
                err
            );
        }
    }
}

/// Verifica si `Accept-Encoding` incluye gzip (con q distinto de 0)
fn accepts_gzip(request: &Request) -> bool {
    let Some(header) = request.header("Accept-Encoding") else {
        return false;
    };

    header.split(',').any(|item| {
        let mut parts = item.split(';').map(str::trim);
        let coding = parts.next().unwrap_or("");
        let disabled = parts.any(|param| {
            param
                .strip_prefix("q=")
                .and_then(|q| q.parse::<f32>().ok())
                .map(|q| q == 0.0)
                .unwrap_or(false)
        });
        (coding.eq_ignore_ascii_case("gzip") || coding == "*") && !disabled
    })
}

fn gzip(body: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(body)?;
    encoder.finish()
}
