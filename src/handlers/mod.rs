//! # Handlers HTTP
//!
//! Este módulo contiene los endpoints del servicio y la tabla de rutas.
//!
//! Cada handler recibe el `Request`, los parámetros del path y el store
//! inyectado (`&dyn BookStore`), y retorna una `Response`.

pub mod books;

pub use books::*;

use crate::http::Method;
use crate::router::{RouteError, Router};
use crate::store::BookStore;

/// Construye el router con todas las rutas del servicio
pub fn build_router() -> Result<Router<dyn BookStore>, RouteError> {
    let mut router: Router<dyn BookStore> = Router::new();

    router.register(Method::GET, "/", books::home_handler)?;
    router.register(Method::GET, "/books", books::list_handler)?;
    router.register(Method::POST, "/books", books::create_handler)?;
    router.register(Method::GET, "/books/{id:int}", books::get_handler)?;
    router.register(Method::PUT, "/books/{id:int}", books::update_handler)?;
    router.register(Method::DELETE, "/books/{id:int}", books::delete_handler)?;

    Ok(router)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_router_registers_all_routes() {
        let router = build_router().unwrap();
        let templates: Vec<(Method, &str)> = router.templates().collect();

        assert_eq!(templates.len(), 6);
        assert!(templates.contains(&(Method::GET, "/")));
        assert!(templates.contains(&(Method::PUT, "/books/{id:int}")));
    }
}
