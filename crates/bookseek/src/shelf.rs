//! In-memory model of a lending shelf.
//!
//! A [`Shelf`] holds the registered books and every rental made of them. It is serializable so
//! that whatever store the caller uses can persist it, the shelf itself does no IO.

use log::{info, trace};
use serde::{Deserialize, Serialize};

use crate::{source::BookMetadata, Error, ErrorKind};

/// Number of books shown per page of a listing.
pub const PAGE_SIZE: usize = 10;

/// A book registered on the shelf.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Identifier of the book on the shelf, the ISBN-13.
    pub id: String,
    /// ISBN-13 of the book.
    pub isbn13: String,
    /// Title of the book.
    pub title: String,
    /// Authors of the book, may be empty.
    #[serde(default)]
    pub authors: Vec<String>,
    /// Description of the book, may be empty.
    #[serde(default)]
    pub description: String,
    /// URL or path of a cover image, may be empty.
    #[serde(default)]
    pub cover: String,
}

impl Book {
    /// Creates a book from looked up or manually entered metadata.
    #[must_use]
    pub fn from_metadata(isbn13: String, metadata: BookMetadata) -> Self {
        let BookMetadata {
            title,
            authors,
            description,
            cover,
        } = metadata;

        Self {
            id: isbn13.clone(),
            isbn13,
            title,
            authors,
            description: description.unwrap_or_default(),
            cover: cover.unwrap_or_default(),
        }
    }

    fn matches(&self, term: &str) -> bool {
        let contains = |s: &str| s.to_lowercase().contains(term);
        contains(&self.title)
            || self.authors.iter().any(|a| contains(a.as_str()))
            || contains(&self.isbn13)
    }
}

/// A single lending of a book.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rental {
    /// Identifier of the rental.
    pub id: String,
    /// Identifier of the lent book.
    pub book_id: String,
    /// Name of the person who borrowed the book.
    pub borrower: String,
    /// Whether the book has been brought back.
    pub returned: bool,
    /// Seconds since the Unix epoch when the book was lent.
    pub lent_at: u64,
    /// Seconds since the Unix epoch when the book was returned.
    pub returned_at: Option<u64>,
}

/// The registered books and their rentals.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shelf {
    #[serde(default)]
    books: Vec<Book>,
    #[serde(default)]
    rentals: Vec<Rental>,
    #[serde(skip)]
    dirty: bool,
}

impl Shelf {
    /// Creates an empty shelf.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the shelf has been changed since it was created or deserialized.
    #[must_use]
    pub const fn dirty(&self) -> bool {
        self.dirty
    }

    /// All registered books, in registration order.
    #[must_use]
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    /// All rentals, in the order they were made.
    #[must_use]
    pub fn rentals(&self) -> &[Rental] {
        &self.rentals
    }

    /// Returns the book with the `id`.
    #[must_use]
    pub fn book(&self, id: &str) -> Option<&Book> {
        self.books.iter().find(|book| book.id == id)
    }

    /// Adds a book to the shelf.
    ///
    /// # Errors
    ///
    /// An [`ErrorKind::Duplicate`] error when a book with the same ISBN-13 is already registered.
    pub fn register(&mut self, book: Book) -> Result<(), Error> {
        trace!("Checking shelf for possible duplicate ISBN of '{}'", book.isbn13);
        if self.books.iter().any(|b| b.isbn13 == book.isbn13) {
            return Err(Error::new(
                ErrorKind::Duplicate,
                format!("A book with the ISBN of '{}' is already registered", book.isbn13),
            ));
        }

        info!("Registering '{}'", book.title);
        self.books.push(book);
        self.dirty = true;
        Ok(())
    }

    /// Removes a book and its rental history, returns `false` when no book has the `id`.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.books.len();
        self.books.retain(|book| book.id != id);

        if self.books.len() == before {
            false
        } else {
            self.rentals.retain(|rental| rental.book_id != id);
            self.dirty = true;
            true
        }
    }

    /// Returns `true` when the book has never been lent or every rental of it was returned.
    #[must_use]
    pub fn is_available(&self, book_id: &str) -> bool {
        self.open_rental(book_id).is_none()
    }

    /// Returns the rental of the book which has not been returned yet.
    #[must_use]
    pub fn open_rental(&self, book_id: &str) -> Option<&Rental> {
        self.rentals
            .iter()
            .find(|rental| rental.book_id == book_id && !rental.returned)
    }

    /// Lends the book to `borrower` at `now` (seconds since the Unix epoch).
    ///
    /// # Errors
    ///
    /// An [`ErrorKind::NoValue`] error when no book has the `book_id`.
    /// An [`ErrorKind::Unavailable`] error when the book is already lent out.
    pub fn lend<S: Into<String>>(
        &mut self,
        book_id: &str,
        borrower: S,
        now: u64,
    ) -> Result<&Rental, Error> {
        if self.book(book_id).is_none() {
            return Err(Error::new(
                ErrorKind::NoValue,
                format!("No book found with the id of '{book_id}'"),
            ));
        }

        if let Some(rental) = self.open_rental(book_id) {
            return Err(Error::new(
                ErrorKind::Unavailable,
                format!("'{book_id}' is already lent to {}", rental.borrower),
            ));
        }

        let count = self
            .rentals
            .iter()
            .filter(|rental| rental.book_id == book_id)
            .count();

        let rental = Rental {
            id: format!("{book_id}-{}", count + 1),
            book_id: book_id.to_owned(),
            borrower: borrower.into(),
            returned: false,
            lent_at: now,
            returned_at: None,
        };
        info!("Lending '{book_id}' to {}", rental.borrower);

        let index = self.rentals.len();
        self.rentals.push(rental);
        self.dirty = true;
        Ok(&self.rentals[index])
    }

    /// Marks the open rental of the book as returned at `now` (seconds since the Unix epoch).
    ///
    /// # Errors
    ///
    /// An [`ErrorKind::NoValue`] error when the book is not lent out.
    pub fn return_book(&mut self, book_id: &str, now: u64) -> Result<&Rental, Error> {
        let rental = self
            .rentals
            .iter_mut()
            .find(|rental| rental.book_id == book_id && !rental.returned)
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::NoValue,
                    format!("'{book_id}' is not currently lent out"),
                )
            })?;

        info!("'{book_id}' returned by {}", rental.borrower);
        rental.returned = true;
        rental.returned_at = Some(now);
        self.dirty = true;
        Ok(rental)
    }

    /// Books whose title, one of the authors or ISBN-13 contains `term`, ignoring case.
    ///
    /// An empty `term` matches every book.
    #[must_use]
    pub fn search(&self, term: &str) -> Vec<&Book> {
        let term = term.trim().to_lowercase();
        self.books.iter().filter(|book| book.matches(&term)).collect()
    }

    /// Number of pages of [`PAGE_SIZE`] books, an empty shelf still has one page.
    #[must_use]
    pub fn total_pages(&self) -> usize {
        self.books.len().div_ceil(PAGE_SIZE).max(1)
    }

    /// Books on the page `number`, counting from 1. Pages past the end are empty.
    #[must_use]
    pub fn page(&self, number: usize) -> &[Book] {
        let start = number.saturating_sub(1).saturating_mul(PAGE_SIZE);
        match self.books.get(start..) {
            Some(rest) => &rest[..rest.len().min(PAGE_SIZE)],
            None => &[],
        }
    }
}
