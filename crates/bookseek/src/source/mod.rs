//! Bibliographic services that can describe a book from its ISBN-13.
//!
//! Each source speaks its own response schema and normalizes it into [`BookMetadata`]. Sources
//! are combined in priority order by a [`Resolver`](crate::Resolver).

use serde::{Deserialize, Serialize};

use crate::Error;

mod google_books;
mod openbd;

pub use google_books::{GoogleBooks, GOOGLE_BOOKS_URL};
pub use openbd::{OpenBd, OPENBD_URL};

/// Normalized information about a book returned by a [`MetadataSource`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookMetadata {
    /// Title, including the subtitle when the source has one.
    pub title: String,
    /// Display names of the authors, in the order given by the source. May be empty.
    pub authors: Vec<String>,
    /// Longer description or summary of the book.
    pub description: Option<String>,
    /// URL of a cover image.
    pub cover: Option<String>,
}

/// A service that can be asked for the [`BookMetadata`] of an ISBN-13.
pub trait MetadataSource {
    /// Human readable name of the service, used for logging.
    fn name(&self) -> &'static str;

    /// Looks up a book by its ISBN-13.
    ///
    /// # Errors
    ///
    /// An [`ErrorKind::NoValue`](crate::ErrorKind::NoValue) error when the source has no usable
    /// result for the ISBN. Network and parse failures are returned with their own kinds.
    fn lookup(&self, isbn13: &str) -> Result<BookMetadata, Error>;
}

/// Empty strings are treated the same as missing values.
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}
