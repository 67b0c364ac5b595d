//! Tellico XML (syntax version 9) output.
//!
//! Element and field names are Tellico's import schema and must not change.

use quick_xml::{
    Writer,
    events::{BytesEnd, BytesStart, BytesText, Event},
};

use crate::item::ItemRecord;

pub const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
pub const DOCTYPE: &str = r#"<!DOCTYPE tellico PUBLIC "-//Robby Stephenson/DTD Tellico V9.0//EN" "http://periapsis.org/tellico/dtd/v9/tellico.dtd">"#;

const NAMESPACE: &str = "http://periapsis.org/tellico/";
/// Tellico's collection type for books.
const BOOK_COLLECTION: &str = "2";
/// Custom field carrying the source page URL.
const LINK_FIELD: &str = "bertrand";

/// A record that has been placed in the collection.
#[derive(Debug)]
pub struct Entry {
    pub id: usize,
    pub record: ItemRecord,
}

/// The collection being assembled. Entries are numbered from 0 in the
/// order they are added.
#[derive(Debug, Default)]
pub struct TellicoDocument {
    entries: Vec<Entry>,
}

impl TellicoDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entry(&mut self, record: ItemRecord) -> &Entry {
        let id = self.entries.len();
        log::debug!("entry {id}: {:?}", record.title);
        self.entries.push(Entry { id, record });
        &self.entries[id]
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the whole document, header and doctype included.
    pub fn to_xml(&self) -> anyhow::Result<String> {
        let mut w = Writer::new(Vec::new());

        w.write_event(Event::Start(
            BytesStart::new("tellico").with_attributes([("xmlns", NAMESPACE), ("syntaxVersion", "9")]),
        ))?;
        w.write_event(Event::Start(
            BytesStart::new("collection").with_attributes([("title", "My Books"), ("type", BOOK_COLLECTION)]),
        ))?;

        w.write_event(Event::Start(BytesStart::new("fields")))?;
        w.write_event(Event::Empty(BytesStart::new("field").with_attributes([("name", "_default")])))?;
        w.write_event(Event::Empty(BytesStart::new("field").with_attributes([
            ("name", LINK_FIELD),
            ("title", "Bertrand Link"),
            ("flags", "0"),
            ("category", "General"),
            ("format", "4"),
            // 7 = URL
            ("type", "7"),
            ("i18n", "true"),
        ])))?;
        w.write_event(Event::End(BytesEnd::new("fields")))?;

        for entry in &self.entries {
            write_entry(&mut w, entry)?;
        }

        w.write_event(Event::Start(BytesStart::new("images")))?;
        for cover in self.entries.iter().filter_map(|e| e.record.cover.as_ref()) {
            w.create_element("image")
                .with_attributes([("format", "JPEG"), ("id", cover.id.as_str())])
                .write_text_content(BytesText::new(&cover.data))?;
        }
        w.write_event(Event::End(BytesEnd::new("images")))?;

        w.write_event(Event::End(BytesEnd::new("collection")))?;
        w.write_event(Event::End(BytesEnd::new("tellico")))?;

        let body = String::from_utf8(w.into_inner())?;
        Ok(format!("{XML_HEADER}\n{DOCTYPE}\n{body}\n"))
    }
}

fn text_element(w: &mut Writer<Vec<u8>>, name: &str, text: &str) -> anyhow::Result<()> {
    w.create_element(name).write_text_content(BytesText::new(text))?;
    Ok(())
}

fn list_element(w: &mut Writer<Vec<u8>>, outer: &str, inner: &str, values: &[String]) -> anyhow::Result<()> {
    w.write_event(Event::Start(BytesStart::new(outer)))?;
    for v in values {
        text_element(w, inner, v)?;
    }
    w.write_event(Event::End(BytesEnd::new(outer)))?;
    Ok(())
}

fn write_entry(w: &mut Writer<Vec<u8>>, entry: &Entry) -> anyhow::Result<()> {
    let r = &entry.record;
    let id = entry.id.to_string();
    w.write_event(Event::Start(BytesStart::new("entry").with_attributes([("id", id.as_str())])))?;

    text_element(w, "title", &r.title)?;
    text_element(w, "pub_year", &r.pub_year)?;
    text_element(w, "country", &r.country)?;
    text_element(w, "publisher", &r.publisher)?;
    text_element(w, "language", &r.language)?;
    if !r.authors.is_empty() {
        list_element(w, "authors", "author", &r.authors)?;
    }
    if let Some(genres) = &r.genres {
        list_element(w, "genres", "genre", genres)?;
    }
    text_element(w, "comments", &r.comments_text())?;
    if let Some(pages) = &r.pages {
        text_element(w, "pages", pages)?;
    }
    if let Some(isbn) = &r.isbn {
        text_element(w, "isbn", isbn)?;
    }
    if let Some(cover) = &r.cover {
        text_element(w, "cover", &cover.id)?;
    }
    text_element(w, LINK_FIELD, &r.url)?;

    w.write_event(Event::End(BytesEnd::new("entry")))?;
    Ok(())
}
