use std::path::PathBuf;

use clap::Parser;
use url::Url;

use crate::search::{BASE_URL, MAX_SEARCH_PAGES};

/// Search the Bertrand bookstore and print the matches as a Tellico collection.
///
/// Meant to be registered in Tellico as an external data source: collection
/// type "Books", result type "Tellico", argument `%1`.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Title to search for
    #[arg(value_name = "TITLE", allow_hyphen_values = true)]
    pub title: Option<String>,

    /// Stop after this many results pages
    #[arg(long, value_name = "N", default_value_t = MAX_SEARCH_PAGES)]
    pub max_pages: u32,

    /// Site to query
    #[arg(long, value_name = "URL", default_value = BASE_URL)]
    pub base_url: Url,

    /// Per-request timeout, in seconds
    #[arg(long, value_name = "SECS", default_value_t = 15)]
    pub timeout: u64,

    /// Where cover images are staged while being encoded
    #[arg(long, value_name = "DIR")]
    pub tmp_dir: Option<PathBuf>,

    /// Leave the staged cover images on disk
    #[arg(long)]
    pub keep_covers: bool,
}

pub fn usage() -> String {
    format!("Usage: {} <TITLE>", env!("CARGO_PKG_NAME"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["bertrand", "Astérix"]).expect("parse");
        assert_eq!(cli.title.as_deref(), Some("Astérix"));
        assert_eq!(cli.max_pages, MAX_SEARCH_PAGES);
        assert_eq!(cli.base_url.as_str(), "https://www.bertrand.pt/");
        assert_eq!(cli.timeout, 15);
        assert!(cli.tmp_dir.is_none());
        assert!(!cli.keep_covers);
    }

    #[test]
    fn title_is_optional_for_the_parser() {
        let cli = Cli::try_parse_from(["bertrand"]).expect("parse");
        assert!(cli.title.is_none());
    }

    #[test]
    fn options() {
        let cli = Cli::try_parse_from([
            "bertrand",
            "--max-pages",
            "2",
            "--base-url",
            "http://localhost:8080",
            "--tmp-dir",
            "/var/tmp",
            "--keep-covers",
            "Tintim",
        ])
        .expect("parse");
        assert_eq!(cli.max_pages, 2);
        assert_eq!(cli.base_url.host_str(), Some("localhost"));
        assert_eq!(cli.tmp_dir, Some(PathBuf::from("/var/tmp")));
        assert!(cli.keep_covers);
    }

    #[test]
    fn leading_hyphen_is_part_of_the_title() {
        let cli = Cli::try_parse_from(["bertrand", "-30- Crónicas"]).expect("parse");
        assert_eq!(cli.title.as_deref(), Some("-30- Crónicas"));

        let cli = Cli::try_parse_from(["bertrand", "--max-pages", "1", "-x"]).expect("parse");
        assert_eq!(cli.max_pages, 1);
        assert_eq!(cli.title.as_deref(), Some("-x"));
    }

    #[test]
    fn any_title_is_accepted_verbatim() {
        // No "--" escape and no -h/-V as the second character
        proptest::proptest!(|(title in "-?[0-9 çãéA-U][A-Za-zçãé0-9 -]{0,30}")| {
            let cli = Cli::try_parse_from(["bertrand", title.as_str()]).expect("parse");
            proptest::prop_assert_eq!(cli.title, Some(title));
        })
    }
}
