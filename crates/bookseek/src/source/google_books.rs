use log::{info, trace};
use serde::Deserialize;

use crate::{api::Client, Error, ErrorKind};

use super::{non_empty, BookMetadata, MetadataSource};

/// Default endpoint of the Google Books volumes API.
pub const GOOGLE_BOOKS_URL: &str = "https://www.googleapis.com/books/v1/volumes";

/// Source backed by the Google Books volumes API.
#[derive(Debug)]
pub struct GoogleBooks<C> {
    client: C,
    url: String,
}

impl<C: Client> GoogleBooks<C> {
    /// Creates a source that queries the volumes endpoint at `url`.
    pub fn new<S: Into<String>>(client: C, url: S) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

impl<C: Client + Default> Default for GoogleBooks<C> {
    fn default() -> Self {
        Self::new(C::default(), GOOGLE_BOOKS_URL)
    }
}

impl<C: Client> MetadataSource for GoogleBooks<C> {
    fn name(&self) -> &'static str {
        "Google Books"
    }

    fn lookup(&self, isbn13: &str) -> Result<BookMetadata, Error> {
        info!("Searching for ISBN '{isbn13}' using Google Books API");
        let url = format!("{}?q=isbn:{isbn13}", self.url);

        let GoogleModel { items } = self.client.get_json(&url)?;

        trace!("Request was successful");

        items
            .unwrap_or_default()
            .into_iter()
            .next()
            .flatten()
            .and_then(|item| item.volume_info)
            .ok_or_else(|| Error::new(ErrorKind::NoValue, "No books found!"))
            .and_then(BookMetadata::try_from)
    }
}

#[derive(Deserialize)]
#[cfg_attr(test, derive(Debug))]
struct GoogleModel {
    // absent when there are no matches
    #[serde(default)]
    items: Option<Vec<Option<Item>>>,
}

#[derive(Deserialize)]
#[cfg_attr(test, derive(Debug))]
struct Item {
    #[serde(rename = "volumeInfo")]
    volume_info: Option<VolumeInfo>,
}

/// Volume information from the Google Book API
#[derive(Deserialize)]
#[cfg_attr(test, derive(Debug))]
struct VolumeInfo {
    title: Option<String>,
    subtitle: Option<String>,
    #[serde(default)]
    authors: Option<Vec<String>>,
    description: Option<String>,
    #[serde(rename = "imageLinks")]
    image_links: Option<ImageLinks>,
}

#[derive(Deserialize)]
#[cfg_attr(test, derive(Debug))]
struct ImageLinks {
    thumbnail: Option<String>,
    #[serde(rename = "smallThumbnail")]
    small_thumbnail: Option<String>,
}

impl TryFrom<VolumeInfo> for BookMetadata {
    type Error = Error;

    fn try_from(volume_info: VolumeInfo) -> Result<Self, Error> {
        // Deconstruct to take ownership of fields (avoids cloning).
        let VolumeInfo {
            title,
            subtitle,
            authors,
            description,
            image_links,
        } = volume_info;

        let mut title = non_empty(title)
            .ok_or_else(|| Error::new(ErrorKind::NoValue, "Volume has no title"))?;

        if let Some(subtitle) = non_empty(subtitle) {
            title = format!("{title}: {subtitle}");
        }

        let mut authors = authors.unwrap_or_default();
        authors.retain(|author| !author.trim().is_empty());

        let cover = image_links.and_then(|links| {
            non_empty(links.thumbnail).or_else(|| non_empty(links.small_thumbnail))
        });

        Ok(Self {
            title,
            authors,
            description: non_empty(description),
            cover,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{GoogleBooks, GoogleModel};
    use crate::{
        api::{assert_url, impl_text_producer, Client, MockClient, NetworkErrorProducer},
        source::{BookMetadata, MetadataSource},
        Error, ErrorKind,
    };

    const GOOGLE_BOOK_JSON: &str = include_str!("../../tests/data/google_book.json");

    impl_text_producer! {
        ValidJsonProducer => Ok(GOOGLE_BOOK_JSON.to_owned()),
        EmptyBookProducer => Ok(
            r#"{
                "kind": "books#volumes",
                "totalItems": 0,
                "items": []
            }"#.to_owned()
        ),
        NoItemsProducer => Ok(r#"{ "kind": "books#volumes", "totalItems": 0 }"#.to_owned()),
        NoVolumeInfoProducer => Ok(r#"{ "items": [{ "id": "abc" }] }"#.to_owned()),
        NullAuthorsProducer => Ok(
            r#"{ "items": [{ "volumeInfo": { "title": "Foo", "subtitle": "", "authors": null } }] }"#.to_owned()
        ),
        MalformedJsonProducer => Ok(r#"{ "items": [ "#.to_owned()),
    }

    fn lookup<C>(isbn13: &str) -> Result<BookMetadata, Error>
    where
        C: Client + Default,
    {
        GoogleBooks::<C>::default().lookup(isbn13)
    }

    #[test]
    fn url_queries_by_isbn() {
        assert!(lookup::<MockClient<ValidJsonProducer>>("9780735619678").is_ok());
        assert_url!("https://www.googleapis.com/books/v1/volumes?q=isbn:9780735619678");
    }

    #[test]
    fn configured_url_is_used() {
        let source = GoogleBooks::new(
            MockClient::<ValidJsonProducer>::default(),
            "http://localhost:8080/volumes",
        );
        assert!(source.lookup("9780735619678").is_ok());
        assert_url!("http://localhost:8080/volumes?q=isbn:9780735619678");
    }

    #[test]
    fn valid_json_produces_title_with_subtitle() {
        let book = lookup::<MockClient<ValidJsonProducer>>("9780735619678")
            .expect("ValidJsonProducer always produces a valid book");

        assert_eq!(
            "Code Complete: A Practical Handbook of Software Construction",
            book.title
        );
        assert_eq!(vec!["Steve McConnell".to_owned()], book.authors);
        assert!(book
            .description
            .as_deref()
            .is_some_and(|d| d.starts_with("Widely considered")));
        assert_eq!(
            Some("http://books.google.com/books/content?id=LpVCAwAAQBAJ&printsec=frontcover&img=1&zoom=1"),
            book.cover.as_deref()
        );
    }

    #[test]
    fn empty_items_is_no_value() {
        let err = lookup::<MockClient<EmptyBookProducer>>("9780735619678").unwrap_err();
        assert_eq!(ErrorKind::NoValue, err.kind(), "{err}");
    }

    #[test]
    fn missing_items_is_no_value() {
        let err = lookup::<MockClient<NoItemsProducer>>("9780735619678").unwrap_err();
        assert_eq!(ErrorKind::NoValue, err.kind(), "{err}");
    }

    #[test]
    fn item_without_volume_info_is_no_value() {
        let err = lookup::<MockClient<NoVolumeInfoProducer>>("9780735619678").unwrap_err();
        assert_eq!(ErrorKind::NoValue, err.kind(), "{err}");
    }

    #[test]
    fn null_authors_and_empty_subtitle_are_tolerated() {
        let book = lookup::<MockClient<NullAuthorsProducer>>("9780735619678").unwrap();

        assert_eq!("Foo", book.title);
        assert!(book.authors.is_empty());
        assert_eq!(None, book.cover);
    }

    #[test]
    fn malformed_json_is_deserialize_error() {
        let err = lookup::<MockClient<MalformedJsonProducer>>("9780735619678").unwrap_err();
        assert_eq!(ErrorKind::Deserialize, err.kind());
    }

    #[test]
    fn network_error_is_passed_on() {
        let err = lookup::<MockClient<NetworkErrorProducer>>("9780735619678").unwrap_err();
        assert_eq!(ErrorKind::IO, err.kind());
    }

    #[test]
    fn volume_info_can_be_derived_from_json() {
        let model: GoogleModel = serde_json::from_str(GOOGLE_BOOK_JSON).unwrap();
        let volume_info = model
            .items
            .and_then(|mut items| items.remove(0))
            .and_then(|item| item.volume_info)
            .unwrap();

        assert_eq!(Some("Code Complete"), volume_info.title.as_deref());
        assert_eq!("Steve McConnell", volume_info.authors.unwrap()[0]);
    }
}
