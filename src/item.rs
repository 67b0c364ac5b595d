use url::Url;

use crate::{
    cover::{Cover, CoverFetcher},
    fetch::Fetch,
    rules::{self, Rule},
};

pub const DEFAULT_PUBLISHER: &str = "Bertrand";
pub const DEFAULT_LANGUAGE: &str = "Portugues";
pub const COUNTRY: &str = "PT";

/// One book as it will appear in the Tellico collection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemRecord {
    pub title: String,
    pub pub_year: String,
    pub country: String,
    pub publisher: String,
    pub language: String,
    pub authors: Vec<String>,
    pub genres: Option<Vec<String>>,
    pub comments: Vec<String>,
    pub pages: Option<String>,
    pub isbn: Option<String>,
    pub cover: Option<Cover>,
    /// Detail page the record was scraped from.
    pub url: String,
}

impl ItemRecord {
    pub fn new(url: &str) -> Self {
        ItemRecord {
            title: String::new(),
            pub_year: String::new(),
            country: COUNTRY.to_string(),
            publisher: DEFAULT_PUBLISHER.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            authors: Vec::new(),
            genres: None,
            comments: Vec::new(),
            pages: None,
            isbn: None,
            cover: None,
            url: url.to_string(),
        }
    }

    /// Comments as a single text block.
    pub fn comments_text(&self) -> String {
        self.comments.join("\n\n")
    }
}

/// Fields pulled from a detail page, before any network side effect.
#[derive(Debug, Default)]
struct Scraped {
    title: Option<String>,
    authors: Option<(Vec<String>, String)>,
    publisher: Option<String>,
    pub_date: Option<String>,
    isbn: Option<String>,
    pages: Option<String>,
    language: Option<String>,
    genres: Option<Vec<String>>,
    description: Option<String>,
    image: Option<String>,
}

fn scrape(html: &str) -> Scraped {
    let mut s = Scraped::default();
    for rule in Rule::ALL {
        let text = || rule.find(html).map(rules::clean_text);
        match rule {
            Rule::Title => s.title = text(),
            Rule::Publisher => s.publisher = text(),
            Rule::PubDate => s.pub_date = text(),
            Rule::Isbn => s.isbn = text(),
            Rule::Pages => s.pages = text(),
            Rule::Language => s.language = text(),
            Rule::Author => {
                s.authors = rule.find(html).map(|raw| {
                    let listed = rules::clean_text(&rules::strip_anchors(raw));
                    (rules::split_names(raw), listed)
                });
            }
            Rule::Genre => s.genres = rule.find(html).map(rules::split_names),
            Rule::Image => s.image = rule.find(html).map(rules::clean_text),
            // Several synopsis blocks may exist; the longest is the real one,
            // the first of them on a tie.
            Rule::Description => {
                s.description = rule
                    .find_all(html)
                    .into_iter()
                    .rev()
                    .map(rules::strip_tags)
                    .filter(|d| !d.is_empty())
                    .max_by_key(|d| d.chars().count());
            }
        }
    }
    s
}

/// Build the record for one detail page. A cover, if the page has one, is
/// downloaded on the spot; failing that only costs the record its cover.
pub fn from_page(html: &str, page_url: &Url, fetcher: &dyn Fetch, covers: &CoverFetcher) -> ItemRecord {
    let s = scrape(html);
    let mut item = ItemRecord::new(page_url.as_str());

    if let Some(title) = s.title {
        item.title = title;
    }
    if let Some((authors, listed)) = s.authors {
        item.authors = authors;
        item.comments.push(format!("Lista de autores: {listed}"));
    }
    if let Some(date) = s.pub_date {
        item.pub_year = rules::pub_year(&date);
        item.comments.push(format!("Pub. Date: {date}"));
    }
    item.comments.push(format!("Bertrand URL: {page_url}"));
    if let Some(desc) = s.description {
        item.comments.push(desc);
    }

    if let Some(p) = s.publisher.filter(|p| !p.is_empty()) {
        item.publisher = p;
    }
    if let Some(l) = s.language.filter(|l| !l.is_empty()) {
        item.language = l;
    }
    item.isbn = s.isbn;
    item.pages = s.pages;
    item.genres = s.genres;

    if let Some(src) = s.image.filter(|i| !i.is_empty()) {
        match page_url.join(&src) {
            Ok(img_url) => match covers.fetch(fetcher, &img_url) {
                Ok(cover) => item.cover = Some(cover),
                Err(e) => log::warn!("no cover for {page_url}: {e:#}"),
            },
            Err(e) => log::warn!("bad cover URL {src:?} on {page_url}: {e}"),
        }
    }

    item
}
