use std::sync::OnceLock;

use log::{info, trace};
use regex::Regex;
use serde::Deserialize;

use crate::{api::Client, Error, ErrorKind};

use super::{non_empty, BookMetadata, MetadataSource};

/// Default endpoint of the OpenBD API.
pub const OPENBD_URL: &str = "https://api.openbd.jp/v1/get";

/// ONIX text type of the long description.
const TEXT_TYPE_DESCRIPTION: &str = "03";
/// ONIX text type of the short description.
const TEXT_TYPE_SHORT_DESCRIPTION: &str = "02";

/// Source backed by the OpenBD API, which covers books published in Japan.
#[derive(Debug)]
pub struct OpenBd<C> {
    client: C,
    url: String,
}

impl<C: Client> OpenBd<C> {
    /// Creates a source that queries the OpenBD endpoint at `url`.
    pub fn new<S: Into<String>>(client: C, url: S) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

impl<C: Client + Default> Default for OpenBd<C> {
    fn default() -> Self {
        Self::new(C::default(), OPENBD_URL)
    }
}

impl<C: Client> MetadataSource for OpenBd<C> {
    fn name(&self) -> &'static str {
        "OpenBD"
    }

    fn lookup(&self, isbn13: &str) -> Result<BookMetadata, Error> {
        info!("Searching for ISBN '{isbn13}' using OpenBD API");
        let url = format!("{}?isbn={isbn13}", self.url);

        // one element per requested ISBN, `null` when it is unknown
        let records: Vec<Option<Record>> = self.client.get_json(&url)?;

        trace!("Request was successful");

        records
            .into_iter()
            .next()
            .flatten()
            .ok_or_else(|| Error::new(ErrorKind::NoValue, "No books found!"))
            .and_then(BookMetadata::try_from)
    }
}

#[derive(Deserialize)]
#[cfg_attr(test, derive(Debug))]
struct Record {
    summary: Summary,
    onix: Option<Onix>,
}

#[derive(Deserialize)]
#[cfg_attr(test, derive(Debug))]
struct Summary {
    title: Option<String>,
    cover: Option<String>,
}

#[derive(Deserialize)]
#[cfg_attr(test, derive(Debug))]
#[serde(rename_all = "PascalCase")]
struct Onix {
    descriptive_detail: Option<DescriptiveDetail>,
    collateral_detail: Option<CollateralDetail>,
}

#[derive(Deserialize)]
#[cfg_attr(test, derive(Debug))]
struct DescriptiveDetail {
    #[serde(rename = "Contributor", default)]
    contributors: Vec<Contributor>,
}

#[derive(Deserialize)]
#[cfg_attr(test, derive(Debug))]
struct Contributor {
    #[serde(rename = "PersonName")]
    person_name: Option<PersonName>,
}

#[derive(Deserialize)]
#[cfg_attr(test, derive(Debug))]
struct PersonName {
    content: Option<String>,
}

#[derive(Deserialize)]
#[cfg_attr(test, derive(Debug))]
struct CollateralDetail {
    #[serde(rename = "TextContent", default)]
    text_content: Vec<TextContent>,
}

#[derive(Deserialize)]
#[cfg_attr(test, derive(Debug))]
#[serde(rename_all = "PascalCase")]
struct TextContent {
    text_type: Option<String>,
    text: Option<String>,
}

impl TryFrom<Record> for BookMetadata {
    type Error = Error;

    fn try_from(record: Record) -> Result<Self, Error> {
        let Record {
            summary: Summary { title, cover },
            onix,
        } = record;

        let title = non_empty(title)
            .ok_or_else(|| Error::new(ErrorKind::NoValue, "Record has no title"))?;

        let (descriptive_detail, collateral_detail) = onix
            .map(|onix| (onix.descriptive_detail, onix.collateral_detail))
            .unwrap_or_default();

        let authors = descriptive_detail
            .map(|detail| detail.contributors)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|contributor| contributor.person_name?.content)
            .filter_map(|content| display_name(&content))
            .collect();

        let description = collateral_detail.and_then(|detail| {
            let text_of = |text_type: &str| {
                detail
                    .text_content
                    .iter()
                    .filter(|content| content.text_type.as_deref() == Some(text_type))
                    .find_map(|content| non_empty(content.text.clone()))
            };
            text_of(TEXT_TYPE_DESCRIPTION).or_else(|| text_of(TEXT_TYPE_SHORT_DESCRIPTION))
        });

        Ok(Self {
            title,
            authors,
            description,
            cover: non_empty(cover),
        })
    }
}

/// Matches a trailing life years annotation such as `1950`, `1950-` or `1950-2020`.
fn life_years() -> &'static Regex {
    static LIFE_YEARS: OnceLock<Regex> = OnceLock::new();
    LIFE_YEARS.get_or_init(|| {
        Regex::new(r"^\d{4}(-(\d{4})?)?$").expect("Life years pattern should always be valid")
    })
}

/// Turns an ONIX person name such as `Yamada, Taro, 1950-2020` into `Yamada Taro`.
///
/// Returns [`None`] when nothing but the life years annotation is left.
fn display_name(content: &str) -> Option<String> {
    let mut parts: Vec<&str> = content.split(',').map(str::trim).collect();

    if parts.last().is_some_and(|last| life_years().is_match(last)) {
        parts.pop();
    }
    parts.retain(|part| !part.is_empty());

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}
