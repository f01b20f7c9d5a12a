use std::time::{SystemTime, UNIX_EPOCH};

use crate::app::{check_isbn_duplication, display_authors, parse_isbn13, resolve_metadata};

use bookseek::{
    isbn,
    shelf::{Book, Shelf},
    BookMetadata, Config, ErrorKind,
};

use clap::Subcommand;
use eyre::Context;
use log::trace;

#[derive(Subcommand)]
#[non_exhaustive]
pub enum Commands {
    /// Convert an ISBN-13 into an ISBN-10
    ///
    /// Only ISBN-13 values starting with 978 have an ISBN-10.
    #[clap(arg_required_else_help = true)]
    Isbn10 {
        /// The ISBN-13 to convert
        isbn13: String,
    },

    /// Convert an ISBN-10 into an ISBN-13
    #[clap(arg_required_else_help = true)]
    Isbn13 {
        /// The ISBN-10 to convert
        isbn10: String,
    },

    /// Search for book information by ISBN
    ///
    /// Google Books is searched first and OpenBD when Google Books has no result.
    #[clap(arg_required_else_help = true)]
    Lookup {
        /// The ISBN-10 or ISBN-13 to search for
        isbn: String,
    },

    /// Register a book on the shelf
    ///
    /// The book information is searched for by ISBN unless a title is given.
    #[clap(arg_required_else_help = true)]
    Add {
        /// The ISBN-10 or ISBN-13 of the book
        isbn: String,

        /// Title of the book, skips searching for the book information
        #[clap(long)]
        title: Option<String>,

        /// Author of the book, may be used more than once
        #[clap(short, long = "author", requires = "title")]
        authors: Vec<String>,

        /// Description of the book
        #[clap(short, long, requires = "title")]
        description: Option<String>,
    },

    /// Lend a book on the shelf
    #[clap(arg_required_else_help = true)]
    Lend {
        /// The ISBN of the book to lend
        isbn: String,
        /// Who is borrowing the book
        borrower: String,
    },

    /// Return a lent book to the shelf
    #[clap(arg_required_else_help = true)]
    Return {
        /// The ISBN of the book being returned
        isbn: String,
    },

    /// Search the shelf by title, author or ISBN
    Search {
        /// Text to search for, every book is shown when not given
        term: Option<String>,
    },

    /// List the books on the shelf with their availability
    List {
        /// The page to show, counting from 1
        #[clap(short, long, default_value_t = 1)]
        page: usize,
    },

    /// Remove a book and its rental history from the shelf
    #[clap(arg_required_else_help = true)]
    Rm {
        /// The ISBN of the book to remove
        isbn: String,
    },
}

impl Commands {
    /// Returns `true` when the command reads or changes the shelf file.
    pub const fn uses_shelf(&self) -> bool {
        !matches!(
            self,
            Commands::Isbn10 { .. } | Commands::Isbn13 { .. } | Commands::Lookup { .. }
        )
    }

    pub fn execute(
        self,
        shelf: &mut Shelf,
        config: &Config,
        interact: bool,
    ) -> eyre::Result<String> {
        match self {
            Commands::Isbn10 { isbn13 } => isbn::try_to_isbn10(&isbn::normalize(&isbn13))
                .wrap_err_with(|| format!("Cannot convert '{isbn13}' to an ISBN-10")),
            Commands::Isbn13 { isbn10 } => isbn::try_to_isbn13(&isbn::normalize(&isbn10))
                .wrap_err_with(|| format!("Cannot convert '{isbn10}' to an ISBN-13")),
            Commands::Lookup { isbn } => {
                let isbn13 = parse_isbn13(&isbn)?;
                match bookseek::book_info_by_isbn(&isbn13, config) {
                    Ok(book) => Ok(describe_metadata(&isbn13, &book)),
                    Err(err) if err.kind() == ErrorKind::NoValue => {
                        Ok(format!("Book information not found for ISBN {isbn13}"))
                    }
                    Err(err) => Err(err).wrap_err("Cannot look up book information"),
                }
            }
            Commands::Add {
                isbn,
                title,
                authors,
                description,
            } => {
                let isbn13 = parse_isbn13(&isbn)?;
                check_isbn_duplication(shelf, &isbn13)?;

                let metadata = if let Some(title) = title {
                    trace!("'title' option used - skipping the book information search");
                    Some(BookMetadata {
                        title,
                        authors,
                        description,
                        cover: None,
                    })
                } else {
                    resolve_metadata(&isbn13, config, interact)?
                };

                match metadata {
                    Some(metadata) => {
                        let book = Book::from_metadata(isbn13, metadata);
                        let message = format!(
                            "Registered '{}' by {}",
                            book.title,
                            display_authors(&book.authors)
                        );
                        shelf.register(book)?;
                        Ok(message)
                    }
                    None => Ok("Book was not registered".to_owned()),
                }
            }
            Commands::Lend { isbn, borrower } => {
                let isbn13 = parse_isbn13(&isbn)?;
                let rental = shelf.lend(&isbn13, borrower, now())?;
                Ok(format!("Lent {} to {}", rental.book_id, rental.borrower))
            }
            Commands::Return { isbn } => {
                let isbn13 = parse_isbn13(&isbn)?;
                let rental = shelf.return_book(&isbn13, now())?;
                Ok(format!("{} returned by {}", rental.book_id, rental.borrower))
            }
            Commands::Search { term } => {
                let shelf = &*shelf;
                let term = term.unwrap_or_default();
                let books = shelf.search(&term);
                if books.is_empty() {
                    Ok(format!("No books found matching '{term}'"))
                } else {
                    Ok(books
                        .into_iter()
                        .map(|book| describe_book(shelf, book))
                        .collect::<Vec<_>>()
                        .join("\n"))
                }
            }
            Commands::List { page } => {
                let shelf = &*shelf;
                if shelf.books().is_empty() {
                    return Ok("The shelf is empty".to_owned());
                }

                // page 0 shows the first page
                let page = page.max(1);
                let mut lines = vec![format!("Page {page} of {}", shelf.total_pages())];
                lines.extend(shelf.page(page).iter().map(|book| describe_book(shelf, book)));
                Ok(lines.join("\n"))
            }
            Commands::Rm { isbn } => {
                let isbn13 = parse_isbn13(&isbn)?;
                trace!("Checking current shelf for book with this ISBN..");
                if shelf.remove(&isbn13) {
                    Ok("Book removed from shelf".to_owned())
                } else {
                    Ok(format!("No book found with the ISBN of '{isbn13}'"))
                }
            }
        }
    }
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

fn describe_metadata(isbn13: &str, book: &BookMetadata) -> String {
    let mut lines = vec![
        format!("Title: {}", book.title),
        format!("Authors: {}", display_authors(&book.authors)),
        format!("ISBN-13: {isbn13}"),
    ];

    if let Some(isbn10) = isbn::to_isbn10(isbn13) {
        lines.push(format!("ISBN-10: {isbn10}"));
    }
    if let Some(description) = &book.description {
        lines.push(format!("Description: {description}"));
    }
    if let Some(cover) = &book.cover {
        lines.push(format!("Cover: {cover}"));
    }

    lines.join("\n")
}

fn describe_book(shelf: &Shelf, book: &Book) -> String {
    let status = shelf
        .open_rental(&book.id)
        .map_or_else(|| "available".to_owned(), |r| format!("lent to {}", r.borrower));

    format!(
        "{}  {} - {} [{status}]",
        book.isbn13,
        book.title,
        display_authors(&book.authors)
    )
}
