use log::{info, trace, warn};

use crate::{
    source::{BookMetadata, GoogleBooks, MetadataSource, OpenBd},
    Config, Error, ErrorKind,
};

/// Looks up book metadata by trying each source in order.
///
/// A source that fails for any reason (no result, network error, unexpected response) is
/// skipped and the next one is asked. Only when every source has been tried is the book reported
/// as not found.
pub struct Resolver {
    sources: Vec<Box<dyn MetadataSource>>,
}

impl Resolver {
    /// Creates a resolver that asks `sources` in the order given.
    #[must_use]
    pub const fn new(sources: Vec<Box<dyn MetadataSource>>) -> Self {
        Self { sources }
    }

    /// Creates the default resolver: Google Books first, then OpenBD.
    ///
    /// # Errors
    ///
    /// An [`ErrorKind::IO`] error when the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let client = config.http_client()?;
        let sources: Vec<Box<dyn MetadataSource>> = vec![
            Box::new(GoogleBooks::new(client.clone(), &*config.google_books_url)),
            Box::new(OpenBd::new(client, &*config.openbd_url)),
        ];
        Ok(Self::new(sources))
    }

    /// Returns the metadata of the first source with a usable result, or [`None`] when the book
    /// cannot be found.
    #[must_use]
    pub fn fetch_book_info(&self, isbn13: &str) -> Option<BookMetadata> {
        self.try_fetch_book_info(isbn13).ok()
    }

    /// Same as [`Resolver::fetch_book_info`] but reports "not found" as an error.
    ///
    /// # Errors
    ///
    /// An [`ErrorKind::NoValue`] error when no source has a usable result.
    pub fn try_fetch_book_info(&self, isbn13: &str) -> Result<BookMetadata, Error> {
        trace!("Resolving ISBN '{isbn13}' using {} sources", self.sources.len());

        for source in &self.sources {
            match source.lookup(isbn13) {
                Ok(book) => {
                    info!("Found '{}' using {}", book.title, source.name());
                    return Ok(book);
                }
                Err(err) if err.kind() == ErrorKind::NoValue => {
                    info!("{} has no result for ISBN '{isbn13}': {err}", source.name());
                }
                Err(err) => warn!("{} lookup failed for ISBN '{isbn13}': {err}", source.name()),
            }
        }

        Err(Error::new(
            ErrorKind::NoValue,
            format!("Book information not found for ISBN '{isbn13}'"),
        ))
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.sources.iter().map(|source| source.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::Resolver;
    use crate::{
        api::{impl_text_producer, requested_urls, MockClient, NetworkErrorProducer, Producer},
        source::{BookMetadata, GoogleBooks, MetadataSource, OpenBd},
        ErrorKind,
    };

    impl_text_producer! {
        GoogleHitProducer => Ok(
            r#"{ "items": [{ "volumeInfo": { "title": "Foo", "subtitle": "Bar", "authors": ["A", "B"] } }] }"#.to_owned()
        ),
        GoogleEmptyProducer => Ok(r#"{ "totalItems": 0, "items": [] }"#.to_owned()),
        OpenBdHitProducer => Ok(
            r#"[{
                "summary": { "title": "Baz" },
                "onix": { "DescriptiveDetail": { "Contributor": [
                    { "PersonName": { "content": "Yamada, Taro, 1950-2020" } }
                ] } }
            }]"#.to_owned()
        ),
        OpenBdUnknownProducer => Ok("[null]".to_owned()),
        HtmlProducer => Ok("<html>Service Unavailable</html>".to_owned()),
    }

    fn resolver<G, O>() -> Resolver
    where
        G: Producer<String> + 'static,
        O: Producer<String> + 'static,
    {
        let sources: Vec<Box<dyn MetadataSource>> = vec![
            Box::new(GoogleBooks::<MockClient<G>>::default()),
            Box::new(OpenBd::<MockClient<O>>::default()),
        ];
        Resolver::new(sources)
    }

    #[test]
    fn first_source_hit_does_not_contact_second() {
        let book = resolver::<GoogleHitProducer, OpenBdHitProducer>()
            .fetch_book_info("9784000000000")
            .expect("Google Books has a result");

        assert_eq!("Foo: Bar", book.title);
        assert_eq!(vec!["A".to_owned(), "B".to_owned()], book.authors);
        assert_eq!(
            vec!["https://www.googleapis.com/books/v1/volumes?q=isbn:9784000000000".to_owned()],
            requested_urls()
        );
    }

    #[test]
    fn empty_first_source_falls_back_to_second() {
        let book = resolver::<GoogleEmptyProducer, OpenBdHitProducer>()
            .fetch_book_info("9784000000000")
            .expect("OpenBD has a result");

        assert_eq!(
            BookMetadata {
                title: "Baz".to_owned(),
                authors: vec!["Yamada Taro".to_owned()],
                description: None,
                cover: None,
            },
            book
        );
        assert_eq!(
            vec![
                "https://www.googleapis.com/books/v1/volumes?q=isbn:9784000000000".to_owned(),
                "https://api.openbd.jp/v1/get?isbn=9784000000000".to_owned(),
            ],
            requested_urls()
        );
    }

    #[test]
    fn failing_first_source_falls_back_to_second() {
        let book = resolver::<NetworkErrorProducer, OpenBdHitProducer>()
            .fetch_book_info("9784000000000");
        assert_eq!(Some("Baz"), book.as_ref().map(|b| b.title.as_str()));

        let book = resolver::<HtmlProducer, OpenBdHitProducer>().fetch_book_info("9784000000000");
        assert_eq!(Some("Baz"), book.as_ref().map(|b| b.title.as_str()));
    }

    #[test]
    fn both_sources_failing_is_not_found() {
        assert_eq!(
            None,
            resolver::<NetworkErrorProducer, NetworkErrorProducer>()
                .fetch_book_info("9784000000000")
        );
        assert_eq!(
            None,
            resolver::<GoogleEmptyProducer, OpenBdUnknownProducer>()
                .fetch_book_info("9784000000000")
        );
        assert_eq!(
            None,
            resolver::<HtmlProducer, HtmlProducer>().fetch_book_info("9784000000000")
        );
    }

    #[test]
    fn not_found_error_is_no_value() {
        let err = resolver::<GoogleEmptyProducer, NetworkErrorProducer>()
            .try_fetch_book_info("9784000000000")
            .unwrap_err();

        assert_eq!(ErrorKind::NoValue, err.kind());
        assert!(err.to_string().contains("9784000000000"), "{err}");
    }

    #[test]
    fn resolver_without_sources_finds_nothing() {
        assert_eq!(None, Resolver::new(Vec::new()).fetch_book_info("9784000000000"));
    }

    #[test]
    fn debug_lists_sources_in_order() {
        let resolver = resolver::<GoogleEmptyProducer, OpenBdUnknownProducer>();
        assert_eq!(r#"["Google Books", "OpenBD"]"#, format!("{resolver:?}"));
    }

    mod http {
        use std::{
            io::{BufRead, BufReader, Write},
            net::TcpListener,
            thread,
            time::Duration,
        };

        use crate::{Config, Resolver};

        const OPENBD_RECORD: &str = r#"[{ "summary": { "title": "Baz" } }]"#;

        /// Serves `google` and `openbd` as (status, body) on a local port until the test ends.
        fn serve(google: (u16, &'static str), openbd: (u16, &'static str)) -> Config {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            let addr = listener.local_addr().unwrap();

            thread::spawn(move || {
                for stream in listener.incoming() {
                    let Ok(stream) = stream else { break };
                    let mut reader = BufReader::new(&stream);

                    let mut request_line = String::new();
                    reader.read_line(&mut request_line).unwrap();
                    let mut header = String::new();
                    while reader.read_line(&mut header).unwrap_or(0) > 2 {
                        header.clear();
                    }

                    let (status, body) = if request_line.contains(" /google") {
                        google
                    } else {
                        openbd
                    };
                    let reason = if status == 200 { "OK" } else { "Internal Server Error" };
                    let response = format!(
                        "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    (&stream).write_all(response.as_bytes()).unwrap();
                }
            });

            Config {
                google_books_url: format!("http://{addr}/google"),
                openbd_url: format!("http://{addr}/openbd"),
                timeout: Duration::from_secs(5),
            }
        }

        #[test]
        fn server_error_falls_back_to_next_source() {
            let config = serve((500, "{}"), (200, OPENBD_RECORD));

            let book = Resolver::from_config(&config)
                .unwrap()
                .fetch_book_info("9784000000000");

            assert_eq!(Some("Baz"), book.as_ref().map(|b| b.title.as_str()));
        }

        #[test]
        fn server_errors_from_every_source_is_not_found() {
            let config = serve((500, "{}"), (500, OPENBD_RECORD));

            let book = Resolver::from_config(&config)
                .unwrap()
                .fetch_book_info("9784000000000");

            assert_eq!(None, book);
        }
    }
}
