use std::time::Duration;

use anyhow::Context;
use url::Url;

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.10 Safari/605.1.1";

/// Everything the scraper needs from the network.
///
/// Pages are returned already decoded; see [`decode`].
pub trait Fetch {
    fn get_text(&self, url: &Url) -> anyhow::Result<String>;
    fn get_bytes(&self, url: &Url) -> anyhow::Result<Vec<u8>>;
    fn post_form(&self, url: &Url, form: &[(&str, &str)]) -> anyhow::Result<String>;
}

/// Blocking fetcher backed by a single `ureq` agent.
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        let cfg = ureq::Agent::config_builder()
            .timeout_connect(Some(Duration::from_secs(5).min(timeout)))
            .timeout_global(Some(timeout))
            .build();
        HttpFetcher {
            agent: ureq::Agent::new_with_config(cfg),
        }
    }
}

impl Fetch for HttpFetcher {
    fn get_text(&self, url: &Url) -> anyhow::Result<String> {
        let bytes = self.get_bytes(url)?;
        Ok(decode(&bytes))
    }

    fn get_bytes(&self, url: &Url) -> anyhow::Result<Vec<u8>> {
        log::debug!("GET {url}");
        self.agent
            .get(url.as_str())
            .header("User-Agent", USER_AGENT)
            .call()
            .with_context(|| format!("failed request for URL {url}"))?
            .into_body()
            .read_to_vec()
            .with_context(|| format!("failed to read response body from {url}"))
    }

    fn post_form(&self, url: &Url, form: &[(&str, &str)]) -> anyhow::Result<String> {
        log::debug!("POST {url} {form:?}");
        let bytes = self
            .agent
            .post(url.as_str())
            .header("User-Agent", USER_AGENT)
            .send_form(form.iter().copied())
            .with_context(|| format!("failed search request to {url}"))?
            .into_body()
            .read_to_vec()
            .with_context(|| format!("failed to read search response from {url}"))?;
        Ok(decode(&bytes))
    }
}

/// The site serves UTF-8. Bytes are decoded exactly once, here; invalid
/// sequences become U+FFFD instead of aborting the run.
pub fn decode(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
