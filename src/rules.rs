use once_cell::sync::Lazy;
use regex::Regex;

/// The fields scraped from a Bertrand detail page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rule {
    Title,
    Author,
    Publisher,
    PubDate,
    Isbn,
    Pages,
    Language,
    Genre,
    Description,
    Image,
}

impl Rule {
    pub const ALL: [Rule; 10] = [
        Rule::Title,
        Rule::Author,
        Rule::Publisher,
        Rule::PubDate,
        Rule::Isbn,
        Rule::Pages,
        Rule::Language,
        Rule::Genre,
        Rule::Description,
        Rule::Image,
    ];

    fn regex(self) -> &'static Lazy<Regex> {
        match self {
            Rule::Title => &TITLE_RE,
            Rule::Author => &AUTHOR_RE,
            Rule::Publisher => &PUBLISHER_RE,
            Rule::PubDate => &PUB_DATE_RE,
            Rule::Isbn => &ISBN_RE,
            Rule::Pages => &PAGES_RE,
            Rule::Language => &LANGUAGE_RE,
            Rule::Genre => &GENRE_RE,
            Rule::Description => &DESCRIPTION_RE,
            Rule::Image => &IMAGE_RE,
        }
    }

    /// First match of this rule, untrimmed.
    pub fn find<'h>(self, html: &'h str) -> Option<&'h str> {
        self.regex()
            .captures(html)
            .and_then(|c| c.name("v"))
            .map(|m| m.as_str())
    }

    /// Every match of this rule, in page order.
    pub fn find_all<'h>(self, html: &'h str) -> Vec<&'h str> {
        self.regex()
            .captures_iter(html)
            .filter_map(|c| c.name("v"))
            .map(|m| m.as_str())
            .collect()
    }
}

static TITLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<div class="right-title-details" id="productPageSectionDetails-collapseDetalhes-content-title">(?P<v>.*?)</div>"#).unwrap()
});
static AUTHOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<div class="right-author" id="productPageSectionDetails-collapseDetalhes-content-author">(?:de )?(?P<v>.*?)(?:&nbsp;)?</div>"#).unwrap()
});
static PUBLISHER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)<span itemprop="name" class="info">(?P<v>.*?)</span>"#).unwrap());
static PUB_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<span itemprop="datePublished" class="info">(?P<v>.*?)</span>"#).unwrap()
});
static ISBN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)<span itemprop="isbn" class="info">(?P<v>.*?)</span>"#).unwrap());
static PAGES_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<span itemprop="numberOfPages" class="info">(?P<v>.*?)</span>"#).unwrap()
});
static LANGUAGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<span itemprop="inLanguage" class="info">(?P<v>.*?)</span>"#).unwrap()
});
static GENRE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)<span itemprop="genre" class="info">(?P<v>.*?)</span>"#).unwrap());
static DESCRIPTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<div[^>]*id="productPageSectionAboutBook-sinopse"[^>]*>(?P<v>.*?)</div>"#)
        .unwrap()
});
static IMAGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<img itemprop="image".*?src="(?P<v>.*?)".*?class="img-responsive ">"#)
        .unwrap()
});

static ANCHOR_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)</?a.*?>").unwrap());
static ANY_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());
static LINK_TEXT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<a[^>]*>([^<]*)</a>").unwrap());
static NAME_SEP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?: e )|(?: and )|,").unwrap());

/// Trim and decode HTML entities of a single-valued field.
pub fn clean_text(raw: &str) -> String {
    html_escape::decode_html_entities(raw.trim()).trim().to_string()
}

/// Drop `<a ...>` and `</a>` tags, keeping their text.
pub fn strip_anchors(raw: &str) -> String {
    ANCHOR_TAG_RE.replace_all(raw, "").into_owned()
}

/// Drop every tag and collapse runs of whitespace.
pub fn strip_tags(raw: &str) -> String {
    let text = ANY_TAG_RE.replace_all(raw, " ");
    let text = html_escape::decode_html_entities(&text);
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Year of a publication date: its last four characters.
pub fn pub_year(date: &str) -> String {
    let date = date.trim();
    let n = date.chars().count();
    date.chars().skip(n.saturating_sub(4)).collect()
}

/// Split a list of names.
///
/// The site is not consistent: names are sometimes separated by `;`,
/// sometimes by `,` or " e ", and sometimes each name is its own link.
/// Linked names win when there is more than one link.
pub fn split_names(raw: &str) -> Vec<String> {
    let linked: Vec<&str> = LINK_TEXT_RE
        .captures_iter(raw)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .collect();
    if linked.len() > 1 {
        return tidy(linked);
    }

    let unsplit = strip_anchors(raw);
    let parts: Vec<&str> = unsplit.split(';').collect();
    if parts.len() >= 2 {
        return tidy(parts);
    }
    tidy(NAME_SEP_RE.split(&unsplit).collect())
}

fn tidy(parts: Vec<&str>) -> Vec<String> {
    parts
        .into_iter()
        .map(clean_text)
        .filter(|p| !p.is_empty())
        .collect()
}
