use bookseek::{isbn, shelf::Shelf, BookMetadata, Config, ErrorKind};
use eyre::{eyre, Context};
use log::{info, trace};

use crate::interact::{user_confirm, user_enter_metadata};

/// Reads a typed or scanned ISBN-10/ISBN-13 as an ISBN-13.
pub fn parse_isbn13(raw: &str) -> eyre::Result<String> {
    isbn::as_isbn13(raw).ok_or_else(|| eyre!("'{raw}' is not a valid ISBN-10 or ISBN-13"))
}

/// Finds the information of the book to register.
///
/// Looked up information is confirmed by the user in interact mode, when it cannot be found the
/// user is asked to enter it. `Ok(None)` means the user declined to register the book.
pub fn resolve_metadata(
    isbn13: &str,
    config: &Config,
    interact: bool,
) -> eyre::Result<Option<BookMetadata>> {
    match bookseek::book_info_by_isbn(isbn13, config) {
        Ok(book) if interact => {
            let prompt = format!("Register '{}' by {}?", book.title, display_authors(&book.authors));
            Ok(user_confirm(prompt)?.then_some(book))
        }
        Ok(book) => {
            info!("Using book information found for '{isbn13}'");
            Ok(Some(book))
        }
        Err(err) if err.kind() == ErrorKind::NoValue && interact => {
            user_enter_metadata(isbn13).map(Some)
        }
        Err(err) if err.kind() == ErrorKind::NoValue => Err(eyre!(
            "Book information not found for ISBN '{isbn13}' - use --title to enter it manually or --interact"
        )),
        Err(err) => Err(err).wrap_err("Cannot look up book information"),
    }
}

pub fn check_isbn_duplication(shelf: &Shelf, isbn13: &str) -> eyre::Result<()> {
    trace!("Checking current shelf for possible duplicate ISBN of '{isbn13}'");
    if shelf.book(isbn13).is_some() {
        Err(eyre!("A book already exists with the ISBN of '{isbn13}'."))
    } else {
        trace!("No duplicate found!");
        Ok(())
    }
}

pub fn display_authors(authors: &[String]) -> String {
    if authors.is_empty() {
        "unknown author".to_owned()
    } else {
        authors.join(", ")
    }
}

#[test]
fn duplicate_isbn_is_found() {
    use bookseek::shelf::Book;

    let mut shelf = Shelf::new();
    let isbn13 = "9780735619678";

    assert!(check_isbn_duplication(&shelf, isbn13).is_ok());

    let book = Book::from_metadata(
        isbn13.to_owned(),
        BookMetadata {
            title: "test".to_owned(),
            ..BookMetadata::default()
        },
    );
    shelf.register(book).unwrap();

    assert!(check_isbn_duplication(&shelf, isbn13).is_err());
}

#[test]
fn isbn10_input_is_read_as_isbn13() {
    assert_eq!("9780735619678", parse_isbn13("0-7356-1967-0").unwrap());
    assert!(parse_isbn13("12345").is_err());
}

#[test]
fn missing_authors_are_displayed_as_unknown() {
    assert_eq!("unknown author", display_authors(&[]));
    assert_eq!("A, B", display_authors(&["A".to_owned(), "B".to_owned()]));
}
