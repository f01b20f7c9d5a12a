#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::perf,
    clippy::style,
    clippy::missing_safety_doc,
    clippy::missing_const_for_fn
)]
#![warn(missing_docs, rust_2018_idioms)]
#![allow(clippy::module_name_repetitions)]

//! # bookseek
//!
//! bookseek is a library supporting a book lending shelf. It converts between ISBN-10 and ISBN-13
//! (see [`isbn`]), looks up the title and authors of a book from select bibliographic APIs with a
//! fixed fallback order (see [`Resolver`]) and keeps track of the books and rentals of a
//! [`shelf::Shelf`].
//!
//! ```no_run
//! use bookseek::{Config, Resolver};
//!
//! fn main() -> Result<(), bookseek::Error> {
//!     let resolver = Resolver::from_config(&Config::default())?;
//!
//!     match resolver.fetch_book_info("9780735619678") {
//!         Some(book) => println!("{} by {}", book.title, book.authors.join(", ")),
//!         None => println!("Book information not found"),
//!     }
//!     Ok(())
//! }
//! ```

mod api;
mod config;
mod error;
pub mod isbn;
mod resolver;
pub mod shelf;
pub mod source;

pub use api::Client;
pub use config::{Config, DEFAULT_TIMEOUT};
pub use error::{Error, ErrorKind};
pub use resolver::Resolver;
pub use source::BookMetadata;

use log::trace;

/// Search book information by `isbn` using the sources described by `config`.
///
/// The `isbn` may be an ISBN-10 or ISBN-13 and may contain hyphens or spaces.
///
/// # Errors
///
/// An `Err` with [`ErrorKind::InvalidIsbn`] is returned when `isbn` is not a valid ISBN.
/// An `Err` with [`ErrorKind::NoValue`] is returned when no source has information for the book.
/// An `Err` with [`ErrorKind::IO`] is returned when the HTTP client cannot be created.
pub fn book_info_by_isbn(isbn: &str, config: &Config) -> Result<BookMetadata, Error> {
    trace!("Search book information by ISBN of '{isbn}'");
    let isbn13 = isbn::as_isbn13(isbn).ok_or_else(|| {
        Error::new(
            ErrorKind::InvalidIsbn,
            format!("'{isbn}' is not a valid ISBN-10 or ISBN-13"),
        )
    })?;

    Resolver::from_config(config)?.try_fetch_book_info(&isbn13)
}

#[test]
fn invalid_isbn_is_rejected_before_any_request() {
    let config = Config {
        google_books_url: "http://127.0.0.1:9/unreachable".to_owned(),
        openbd_url: "http://127.0.0.1:9/unreachable".to_owned(),
        ..Config::default()
    };
    let err = book_info_by_isbn("978-0-7356-1967-0", &config).unwrap_err();

    assert_eq!(ErrorKind::InvalidIsbn, err.kind());
}
