//! # Handlers de Libros
//! src/handlers/books.rs
//!
//! Implementa los endpoints del catálogo:
//! - GET /            → redirección a /books
//! - GET /books       → listar (filtro opcional `?author=`)
//! - POST /books      → crear
//! - GET /books/{id}  → obtener
//! - PUT /books/{id}  → actualizar parcialmente
//! - DELETE /books/{id} → eliminar
//!
//! Los errores del store se traducen aquí a códigos HTTP:
//! `InvalidInput` → 400, `NotFound` → 404, el resto → 500.

use crate::http::{Request, Response, StatusCode};
use crate::router::RouteParams;
use crate::store::{BookId, BookPatch, BookStore, NewBook, StoreError};
use log::error;

/// Handler para GET /
///
/// Redirige al listado de libros.
pub fn home_handler(_req: &Request, _params: &RouteParams, _store: &dyn BookStore) -> Response {
    Response::redirect("/books")
}

/// Handler para GET /books?author=AUTOR
///
/// # Query parameters
/// - `author`: filtra por autor exacto (opcional; vacío = sin filtro)
///
/// # Ejemplo de response
/// ```json
/// [{"id": 1, "title": "Dune", "author": "Herbert", "year": 1965}]
/// ```
pub fn list_handler(req: &Request, _params: &RouteParams, store: &dyn BookStore) -> Response {
    let author = req.query_param("author").filter(|author| !author.is_empty());

    match store.list(author) {
        Ok(books) => Response::json_value(StatusCode::Ok, &books),
        Err(err) => store_error_response(err),
    }
}

/// Handler para POST /books
///
/// # Body
/// ```json
/// {"title": "Dune", "author": "Herbert", "year": 1965}
/// ```
///
/// Retorna 201 con el libro creado (incluye su `id`).
pub fn create_handler(req: &Request, _params: &RouteParams, store: &dyn BookStore) -> Response {
    let new_book = match NewBook::from_json(req.body()) {
        Ok(new_book) => new_book,
        Err(err) => return Response::error(StatusCode::BadRequest, &err.to_string()),
    };

    match store.create(&new_book) {
        Ok(book) => Response::json_value(StatusCode::Created, &book)
            .with_header("Location", &format!("/books/{}", book.id)),
        Err(err) => store_error_response(err),
    }
}

/// Handler para GET /books/{id}
pub fn get_handler(_req: &Request, params: &RouteParams, store: &dyn BookStore) -> Response {
    let id = match book_id(params) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match store.get(id) {
        Ok(book) => Response::json_value(StatusCode::Ok, &book),
        Err(err) => store_error_response(err),
    }
}

/// Handler para PUT /books/{id}
///
/// Solo se modifican los campos presentes en el body. Un id desconocido
/// responde 404 aunque el body sea inválido.
///
/// # Ejemplo de body
/// ```json
/// {"year": 1966}
/// ```
pub fn update_handler(req: &Request, params: &RouteParams, store: &dyn BookStore) -> Response {
    let id = match book_id(params) {
        Ok(id) => id,
        Err(response) => return response,
    };

    if let Err(err) = store.get(id) {
        return store_error_response(err);
    }

    let patch = match BookPatch::from_json(req.body()) {
        Ok(patch) => patch,
        Err(err) => return Response::error(StatusCode::BadRequest, &err.to_string()),
    };

    match store.update(id, &patch) {
        Ok(book) => Response::json_value(StatusCode::Ok, &book),
        Err(err) => store_error_response(err),
    }
}

/// Handler para DELETE /books/{id}
///
/// # Ejemplo de response
/// ```json
/// {"message": "Book deleted"}
/// ```
pub fn delete_handler(_req: &Request, params: &RouteParams, store: &dyn BookStore) -> Response {
    let id = match book_id(params) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match store.delete(id) {
        Ok(()) => Response::message(StatusCode::Ok, "Book deleted"),
        Err(err) => store_error_response(err),
    }
}

/// Extrae el id del path
///
/// La ruta ya garantiza dígitos; solo falla si no cabe en un i64, y en ese
/// caso el libro no puede existir.
fn book_id(params: &RouteParams) -> Result<BookId, Response> {
    params.get_i64("id").ok_or_else(|| {
        Response::error(
            StatusCode::NotFound,
            &format!("Book not found: {}", params.get("id").unwrap_or("")),
        )
    })
}

/// Traduce un error del store a una respuesta HTTP
fn store_error_response(err: StoreError) -> Response {
    match err {
        StoreError::InvalidInput(err) => Response::error(StatusCode::BadRequest, &err.to_string()),
        StoreError::NotFound(id) => {
            Response::error(StatusCode::NotFound, &format!("Book not found: {}", id))
        }
        StoreError::Db(_) | StoreError::Unavailable(_) => {
            error!("event=store_error module=handlers status=error error={}", err);
            Response::error(StatusCode::InternalServerError, "Internal server error")
        }
    }
}
