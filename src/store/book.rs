//! # Modelo de Libro
//! src/store/book.rs
//!
//! Tipos del dominio y validación de la entrada JSON:
//!
//! - `Book`: registro persistido, es lo que se serializa en las respuestas
//! - `NewBook`: datos validados para crear un libro
//! - `BookPatch`: actualización parcial; `None` significa "sin cambios"
//!
//! ## Reglas de `year`
//!
//! Se acepta un entero JSON (`1965`) o un string que parsee como entero
//! (`"1965"`). Floats, booleanos y cualquier otro tipo se rechazan.

use serde::Serialize;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Identificador asignado por la base de datos
pub type BookId = i64;

/// Libro persistido
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub year: i64,
}

/// Campos editables de un libro
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookField {
    Title,
    Author,
    Year,
}

impl BookField {
    /// Nombre de la clave en el JSON
    pub fn key(&self) -> &'static str {
        match self {
            BookField::Title => "title",
            BookField::Author => "author",
            BookField::Year => "year",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            BookField::Title => "Title",
            BookField::Author => "Author",
            BookField::Year => "Year",
        }
    }
}

/// Errores de validación de la entrada
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// No hay body o no es JSON válido
    MissingBody,

    /// El JSON no es un objeto
    BodyNotObject,

    /// Falta un campo requerido (o es null)
    MissingField(BookField),

    /// Campo de texto vacío (o null en una actualización)
    EmptyField(BookField),

    /// Campo de texto con otro tipo JSON
    FieldNotString(BookField),

    /// `year` no es un entero
    YearNotInteger,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingBody => write!(f, "Missing JSON body"),
            Self::BodyNotObject => write!(f, "JSON body must be an object"),
            Self::MissingField(field) => write!(f, "{} is required", field.label()),
            Self::EmptyField(field) => write!(f, "{} must not be empty", field.label()),
            Self::FieldNotString(field) => write!(f, "{} must be a string", field.label()),
            Self::YearNotInteger => write!(f, "Year must be an integer"),
        }
    }
}

impl Error for ValidationError {}

/// Datos validados para crear un libro
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub year: i64,
}

impl NewBook {
    pub fn new(title: impl Into<String>, author: impl Into<String>, year: i64) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            year,
        }
    }

    /// Decodifica el body de un POST
    ///
    /// Los campos se revisan en orden title, author, year y se reporta el
    /// primer error encontrado.
    ///
    /// # Ejemplo
    /// ```
    /// use books_server::store::NewBook;
    ///
    /// let new_book = NewBook::from_json(br#"{"title":"Dune","author":"Herbert","year":"1965"}"#).unwrap();
    /// assert_eq!(new_book.year, 1965);
    /// ```
    pub fn from_json(body: &[u8]) -> Result<Self, ValidationError> {
        let object = parse_object(body)?;

        let title = required_text(&object, BookField::Title)?;
        let author = required_text(&object, BookField::Author)?;
        let year = match object.get(BookField::Year.key()) {
            None | Some(Value::Null) => return Err(ValidationError::MissingField(BookField::Year)),
            Some(value) => parse_year(value)?,
        };

        Ok(Self { title, author, year })
    }

    /// Verifica las invariantes antes de persistir
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_not_empty(&self.title, BookField::Title)?;
        check_not_empty(&self.author, BookField::Author)
    }
}

/// Actualización parcial de un libro
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub year: Option<i64>,
}

impl BookPatch {
    /// Decodifica el body de un PUT
    ///
    /// Solo se toman en cuenta las claves presentes. Un `null` explícito es
    /// un error porque ningún campo del libro admite null.
    ///
    /// # Ejemplo
    /// ```
    /// use books_server::store::BookPatch;
    ///
    /// let patch = BookPatch::from_json(br#"{"year":1966}"#).unwrap();
    /// assert_eq!(patch.year, Some(1966));
    /// assert_eq!(patch.title, None);
    /// ```
    pub fn from_json(body: &[u8]) -> Result<Self, ValidationError> {
        let object = parse_object(body)?;

        let title = optional_text(&object, BookField::Title)?;
        let author = optional_text(&object, BookField::Author)?;
        let year = match object.get(BookField::Year.key()) {
            None => None,
            Some(value) => Some(parse_year(value)?),
        };

        Ok(Self { title, author, year })
    }

    /// Verifica las invariantes antes de persistir
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(title) = &self.title {
            check_not_empty(title, BookField::Title)?;
        }
        if let Some(author) = &self.author {
            check_not_empty(author, BookField::Author)?;
        }
        Ok(())
    }

    /// Verifica si el patch no cambia nada
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none() && self.year.is_none()
    }
}

fn parse_object(body: &[u8]) -> Result<Map<String, Value>, ValidationError> {
    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(ValidationError::MissingBody);
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(_) => Err(ValidationError::BodyNotObject),
        Err(_) => Err(ValidationError::MissingBody),
    }
}

fn required_text(object: &Map<String, Value>, field: BookField) -> Result<String, ValidationError> {
    match object.get(field.key()) {
        None | Some(Value::Null) => Err(ValidationError::MissingField(field)),
        Some(value) => text_value(value, field),
    }
}

fn optional_text(
    object: &Map<String, Value>,
    field: BookField,
) -> Result<Option<String>, ValidationError> {
    match object.get(field.key()) {
        None => Ok(None),
        Some(Value::Null) => Err(ValidationError::EmptyField(field)),
        Some(value) => text_value(value, field).map(Some),
    }
}

fn text_value(value: &Value, field: BookField) -> Result<String, ValidationError> {
    let text = value
        .as_str()
        .ok_or(ValidationError::FieldNotString(field))?;
    check_not_empty(text, field)?;
    Ok(text.to_string())
}

fn check_not_empty(text: &str, field: BookField) -> Result<(), ValidationError> {
    if text.is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(())
}

fn parse_year(value: &Value) -> Result<i64, ValidationError> {
    match value {
        Value::Number(number) => number.as_i64().ok_or(ValidationError::YearNotInteger),
        Value::String(text) => text
            .trim()
            .parse::<i64>()
            .map_err(|_| ValidationError::YearNotInteger),
        _ => Err(ValidationError::YearNotInteger),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_serializes_with_expected_keys() {
        let book = Book {
            id: 1,
            title: "Dune".to_string(),
            author: "Herbert".to_string(),
            year: 1965,
        };

        let json = serde_json::to_string(&book).unwrap();
        assert_eq!(json, r#"{"id":1,"title":"Dune","author":"Herbert","year":1965}"#);
    }

    #[test]
    fn test_new_book_from_json() {
        let new_book =
            NewBook::from_json(br#"{"title":"Dune","author":"Herbert","year":1965,"extra":true}"#)
                .unwrap();
        assert_eq!(new_book, NewBook::new("Dune", "Herbert", 1965));
    }

    #[test]
    fn test_new_book_year_as_string() {
        let new_book =
            NewBook::from_json(br#"{"title":"Dune","author":"Herbert","year":" 1965 "}"#).unwrap();
        assert_eq!(new_book.year, 1965);
    }

    #[test]
    fn test_new_book_missing_fields() {
        assert_eq!(
            NewBook::from_json(br#"{"author":"Herbert","year":1965}"#),
            Err(ValidationError::MissingField(BookField::Title))
        );
        assert_eq!(
            NewBook::from_json(br#"{"title":"Dune","year":1965}"#),
            Err(ValidationError::MissingField(BookField::Author))
        );
        assert_eq!(
            NewBook::from_json(br#"{"title":"Dune","author":"Herbert"}"#),
            Err(ValidationError::MissingField(BookField::Year))
        );
        assert_eq!(
            NewBook::from_json(br#"{"title":null,"author":"Herbert","year":1965}"#),
            Err(ValidationError::MissingField(BookField::Title))
        );
    }

    #[test]
    fn test_new_book_empty_title() {
        assert_eq!(
            NewBook::from_json(br#"{"title":"","author":"Herbert","year":1965}"#),
            Err(ValidationError::EmptyField(BookField::Title))
        );
    }

    #[test]
    fn test_new_book_non_string_author() {
        assert_eq!(
            NewBook::from_json(br#"{"title":"Dune","author":42,"year":1965}"#),
            Err(ValidationError::FieldNotString(BookField::Author))
        );
    }

    #[test]
    fn test_year_rejections() {
        for body in [
            br#"{"title":"Dune","author":"Herbert","year":"nineteen"}"#.as_slice(),
            br#"{"title":"Dune","author":"Herbert","year":1965.5}"#.as_slice(),
            br#"{"title":"Dune","author":"Herbert","year":true}"#.as_slice(),
            br#"{"title":"Dune","author":"Herbert","year":[1965]}"#.as_slice(),
        ] {
            assert_eq!(NewBook::from_json(body), Err(ValidationError::YearNotInteger));
        }
    }

    #[test]
    fn test_body_errors() {
        assert_eq!(NewBook::from_json(b""), Err(ValidationError::MissingBody));
        assert_eq!(NewBook::from_json(b"not json"), Err(ValidationError::MissingBody));
        assert_eq!(NewBook::from_json(b"[1,2]"), Err(ValidationError::BodyNotObject));
        assert_eq!(BookPatch::from_json(b"  "), Err(ValidationError::MissingBody));
    }

    #[test]
    fn test_patch_only_present_fields() {
        let patch = BookPatch::from_json(br#"{"author":"Frank Herbert"}"#).unwrap();
        assert_eq!(patch.title, None);
        assert_eq!(patch.author.as_deref(), Some("Frank Herbert"));
        assert_eq!(patch.year, None);
        assert!(!patch.is_empty());

        assert!(BookPatch::from_json(b"{}").unwrap().is_empty());
    }

    #[test]
    fn test_patch_rejects_null_and_bad_year() {
        assert_eq!(
            BookPatch::from_json(br#"{"title":null}"#),
            Err(ValidationError::EmptyField(BookField::Title))
        );
        assert_eq!(
            BookPatch::from_json(br#"{"year":null}"#),
            Err(ValidationError::YearNotInteger)
        );
        assert_eq!(
            BookPatch::from_json(br#"{"year":"abc"}"#),
            Err(ValidationError::YearNotInteger)
        );
    }

    #[test]
    fn test_validate() {
        assert!(NewBook::new("Dune", "Herbert", 1965).validate().is_ok());
        assert_eq!(
            NewBook::new("Dune", "", 1965).validate(),
            Err(ValidationError::EmptyField(BookField::Author))
        );

        let patch = BookPatch {
            title: Some(String::new()),
            ..BookPatch::default()
        };
        assert_eq!(patch.validate(), Err(ValidationError::EmptyField(BookField::Title)));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(ValidationError::MissingField(BookField::Title).to_string(), "Title is required");
        assert_eq!(ValidationError::YearNotInteger.to_string(), "Year must be an integer");
        assert_eq!(ValidationError::MissingBody.to_string(), "Missing JSON body");
    }
}
