use anyhow::Context;
use indicatif::ProgressBar;
use url::Url;

use crate::{cover::CoverFetcher, fetch::Fetch, item, links, tellico::TellicoDocument};

pub const BASE_URL: &str = "https://www.bertrand.pt";
const SEARCH_PATH: &str = "/pesquisando/";

/// Results can span many pages; anything past this is not fetched.
pub const MAX_SEARCH_PAGES: u32 = 5;

/// Drives a title search: results pages, then each detail page.
pub struct Search<'f> {
    fetcher: &'f dyn Fetch,
    covers: CoverFetcher,
    base: Url,
    max_pages: u32,
    progress: ProgressBar,
}

impl<'f> Search<'f> {
    pub fn new(fetcher: &'f dyn Fetch, base: Url, covers: CoverFetcher) -> Self {
        Search {
            fetcher,
            covers,
            base,
            max_pages: MAX_SEARCH_PAGES,
            progress: ProgressBar::hidden(),
        }
    }

    pub fn max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    fn results_page(&self, title: &str, page: u32) -> anyhow::Result<String> {
        let url = self.base.join(SEARCH_PATH)?;
        let page = page.to_string();
        self.fetcher
            .post_form(&url, &[("pagina", page.as_str()), ("palavra", title)])
    }

    /// Search for `title` and add every record found to `doc`. Returns how
    /// many records were added. Any failed request aborts the search.
    pub fn run(&self, title: &str, doc: &mut TellicoDocument) -> anyhow::Result<usize> {
        let title = title.trim();
        if title.is_empty() {
            return Ok(0);
        }

        let mut added = 0;
        for page in 1..=self.max_pages {
            self.progress.set_message(format!("results page {page}"));
            let html = self
                .results_page(title, page)
                .with_context(|| format!("search for {title:?} failed on page {page}"))?;

            let Some(found) = links::extract_links(&html) else {
                log::debug!("page {page}: no results, stopping");
                break;
            };
            log::info!("page {page}: {} result(s)", found.len());

            for link in found {
                let url = self
                    .base
                    .join(&link)
                    .with_context(|| format!("bad result link {link:?}"))?;
                self.progress.set_message(url.to_string());
                let html = self.fetcher.get_text(&url)?;
                let record = item::from_page(&html, &url, self.fetcher, &self.covers);
                doc.add_entry(record);
                added += 1;
            }
        }
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{fetch::fake::FakeFetcher, item::tests::DETAIL};

    fn results(paths: &[&str]) -> String {
        paths
            .iter()
            .map(|p| format!(r#"<a class="title-lnk track" href="{p}">livro</a>"#))
            .collect()
    }

    fn base() -> Url {
        Url::parse(BASE_URL).unwrap()
    }

    #[test]
    fn stops_at_first_empty_page() {
        let fake = FakeFetcher::default()
            .search(1, &results(&["/livro/a/1", "/livro/b/2", "/livro/a/1"]))
            .search(2, &results(&["/livro/c/3"]))
            .search(3, "<p>Sem resultados</p>")
            .search(4, &results(&["/livro/never/4"]))
            .page("https://www.bertrand.pt/livro/a/1", DETAIL)
            .page("https://www.bertrand.pt/livro/b/2", "<html></html>")
            .page("https://www.bertrand.pt/livro/c/3", "<html></html>");
        let dir = tempfile::tempdir().unwrap();
        let search = Search::new(&fake, base(), CoverFetcher::new(dir.path(), false));

        let mut doc = TellicoDocument::new();
        assert_eq!(search.run("asterix", &mut doc).unwrap(), 3);
        let urls: Vec<&str> = doc.entries().iter().map(|e| e.record.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://www.bertrand.pt/livro/a/1",
                "https://www.bertrand.pt/livro/b/2",
                "https://www.bertrand.pt/livro/c/3",
            ]
        );
    }

    #[test]
    fn page_cap_is_honoured() {
        let mut fake = FakeFetcher::default();
        for page in 1..=10u32 {
            let path = format!("/livro/p/{page}");
            fake = fake
                .search(page, &results(&[&path]))
                .page(&format!("https://www.bertrand.pt{path}"), "<html></html>");
        }
        let search = Search::new(&fake, base(), CoverFetcher::default()).max_pages(2);

        let mut doc = TellicoDocument::new();
        assert_eq!(search.run("x", &mut doc).unwrap(), 2);

        let search = Search::new(&fake, base(), CoverFetcher::default());
        let mut doc = TellicoDocument::new();
        assert_eq!(search.run("x", &mut doc).unwrap(), MAX_SEARCH_PAGES as usize);
    }

    #[test]
    fn blank_title_does_nothing() {
        let fake = FakeFetcher::default().search(1, &results(&["/livro/a/1"]));
        let search = Search::new(&fake, base(), CoverFetcher::default());
        let mut doc = TellicoDocument::new();
        assert_eq!(search.run("   ", &mut doc).unwrap(), 0);
        assert!(doc.is_empty());
    }

    #[test]
    fn missing_detail_page_is_fatal() {
        let fake = FakeFetcher::default().search(1, &results(&["/livro/gone/1"]));
        let search = Search::new(&fake, base(), CoverFetcher::default());
        let mut doc = TellicoDocument::new();
        assert!(search.run("x", &mut doc).is_err());
    }

    #[test]
    fn no_results_gives_empty_collection() {
        let fake = FakeFetcher::default();
        let search = Search::new(&fake, base(), CoverFetcher::default());
        let mut doc = TellicoDocument::new();
        assert_eq!(search.run("zzzz", &mut doc).unwrap(), 0);
        let xml = doc.to_xml().unwrap();
        assert!(!xml.contains("<entry"));
        assert!(xml.contains("<images></images>"));
    }

    #[test]
    fn search_form_is_posted_per_page() {
        let fake = FakeFetcher::default()
            .search(1, &results(&["/livro/a/1"]))
            .page("https://www.bertrand.pt/livro/a/1", "<html></html>");
        let search = Search::new(&fake, base(), CoverFetcher::default());
        let mut doc = TellicoDocument::new();
        search.run("  Astérix ", &mut doc).unwrap();

        let posted = fake.posted.borrow();
        let form = |page: &str| {
            vec![
                ("pagina".to_string(), page.to_string()),
                ("palavra".to_string(), "Astérix".to_string()),
            ]
        };
        assert_eq!(
            *posted,
            vec![
                ("https://www.bertrand.pt/pesquisando/".to_string(), form("1")),
                ("https://www.bertrand.pt/pesquisando/".to_string(), form("2")),
            ]
        );
    }
}
