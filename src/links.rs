use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

static RESULT_LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<a class="title-lnk track" href="(?P<page>.*?)">.*?</a>"#).unwrap()
});

/// Collect the detail-page links of one search results page.
///
/// Returns `None` when the page has no result anchors at all, which the
/// pagination driver reads as "no more results".
pub fn extract_links(html: &str) -> Option<BTreeSet<String>> {
    let links: BTreeSet<String> = RESULT_LINK_RE
        .captures_iter(html)
        .filter_map(|c| c.name("page"))
        .map(|m| html_escape::decode_html_entities(m.as_str().trim()).into_owned())
        .filter(|p| !p.is_empty())
        .collect();
    if links.is_empty() { None } else { Some(links) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor(path: &str) -> String {
        format!(r#"<li><a class="title-lnk track" href="{path}">Some <b>title</b></a></li>"#)
    }

    #[test]
    fn no_anchors_is_none() {
        assert!(extract_links("<html><body>Sem resultados</body></html>").is_none());
        // Anchors with a different class do not count
        assert!(extract_links(r#"<a class="other" href="/livro/x/1">x</a>"#).is_none());
    }

    #[test]
    fn href_entities_are_decoded() {
        let links = extract_links(&anchor("/livro/x/1?a=1&amp;b=2")).unwrap();
        assert!(links.contains("/livro/x/1?a=1&b=2"));
    }

    #[test]
    fn duplicates_collapse() {
        let html = [
            anchor("/livro/asterix/1"),
            anchor("/livro/tintim/2"),
            anchor("/livro/asterix/1"),
        ]
        .concat();
        let links = extract_links(&html).unwrap();
        assert_eq!(links.len(), 2);
        assert!(links.contains("/livro/asterix/1"));
        assert!(links.contains("/livro/tintim/2"));
    }

    #[test]
    fn distinct_anchors_are_all_found() {
        proptest::proptest!(|(
            paths in proptest::collection::btree_set("/livro/[a-z-]{1,12}/[0-9]{1,8}", 1..16),
            repeats in 1usize..4,
        )| {
            let mut html = String::from("<ul>");
            for _ in 0..repeats {
                for p in &paths {
                    html.push_str(&anchor(p));
                }
            }
            html.push_str("</ul>");
            let links = extract_links(&html).expect("links");
            proptest::prop_assert_eq!(links, paths);
        })
    }
}
