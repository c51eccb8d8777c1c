use std::sync::{Arc, OnceLock};

use engine_logging::{engine_debug, engine_trace};
use favicon_core::{reconcile_uri, DownloadFailure, FailureKind};
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use crate::decode::decode_html;
use crate::{FetchedDocument, Fetcher};

/// Follows HTTP redirects (inside the fetcher) and HTML meta-refresh redirects
/// until a page without a refresh target is reached.
pub struct RedirectResolver {
    fetcher: Arc<dyn Fetcher>,
    max_hops: usize,
}

impl RedirectResolver {
    pub fn new(fetcher: Arc<dyn Fetcher>, max_hops: usize) -> Self {
        Self { fetcher, max_hops }
    }

    pub async fn resolve(&self, start: &Url) -> Result<FetchedDocument, DownloadFailure> {
        let mut current = start.clone();

        for hop in 0..=self.max_hops {
            let output = self.fetcher.fetch(&current).await?;
            let effective_url = output.metadata.final_url;
            let tld = effective_url
                .domain()
                .and_then(|domain| domain.rsplit('.').next());
            let html = match decode_html(&output.bytes, output.metadata.content_type.as_deref(), tld)
            {
                Ok(decoded) => decoded.html,
                Err(err) => {
                    engine_debug!("{}: {}; using lossy text", effective_url, err);
                    err.into_lossy()
                }
            };

            match meta_refresh_target(&html, &effective_url) {
                Some(next) if next != effective_url => {
                    engine_debug!("meta refresh hop {}: {} -> {}", hop + 1, effective_url, next);
                    current = next;
                }
                _ => {
                    return Ok(FetchedDocument {
                        html,
                        effective_url,
                        hops: hop,
                    });
                }
            }
        }

        Err(DownloadFailure::new(
            FailureKind::RedirectLoop,
            format!(
                "Gave up on {start} after {} meta refresh redirects",
                self.max_hops
            ),
        ))
    }
}

/// Target of a `<meta http-equiv="refresh|location" content="...url=...">` in the
/// document head, resolved against `base`. The last matching element wins.
pub fn meta_refresh_target(html: &str, base: &Url) -> Option<Url> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("head > meta").ok()?;

    let mut redirect = None;
    for meta in document.select(&selector) {
        let Some(http_equiv) = meta.value().attr("http-equiv") else {
            continue;
        };
        let http_equiv = http_equiv.trim().to_ascii_lowercase();
        if http_equiv != "refresh" && http_equiv != "location" {
            continue;
        }
        let Some(content) = meta.value().attr("content") else {
            engine_trace!("meta {} without content skipped", http_equiv);
            continue;
        };
        if let Some(target) = extract_refresh_url(content) {
            redirect = Some(target);
        }
    }

    let redirect = redirect?;
    match reconcile_uri(base, Some(&redirect)) {
        Ok(url) => Some(url),
        Err(err) => {
            engine_debug!("ignoring unusable meta refresh target: {}", err);
            None
        }
    }
}

fn extract_refresh_url(content: &str) -> Option<String> {
    static REFRESH_URL_RE: OnceLock<Regex> = OnceLock::new();
    let re = REFRESH_URL_RE.get_or_init(|| {
        Regex::new(r"(?i)url[\s=]*(\S+)").expect("meta refresh pattern is valid")
    });
    let raw = re.captures(content)?.get(1)?.as_str();
    let target = raw.trim_matches(['\'', '"', ';']);
    (!target.is_empty()).then(|| target.to_string())
}

#[cfg(test)]
mod tests {
    use super::{extract_refresh_url, meta_refresh_target};
    use url::Url;

    fn base() -> Url {
        Url::parse("http://origin.example/start").unwrap()
    }

    #[test]
    fn refresh_url_keeps_original_case() {
        assert_eq!(
            extract_refresh_url("5; URL=http://example.com/Next").as_deref(),
            Some("http://example.com/Next")
        );
        assert_eq!(
            extract_refresh_url("0;url='/landing'").as_deref(),
            Some("/landing")
        );
        assert_eq!(extract_refresh_url("30"), None);
    }

    #[test]
    fn refresh_meta_is_resolved_against_base() {
        let html = r#"<html><head><meta http-equiv="Refresh" content="0; url=/next"></head></html>"#;
        let target = meta_refresh_target(html, &base()).unwrap();
        assert_eq!(target.as_str(), "http://origin.example/next");
    }

    #[test]
    fn location_meta_is_accepted() {
        let html = r#"<html><head><meta http-equiv="LOCATION" content="url=http://other.example/"></head></html>"#;
        let target = meta_refresh_target(html, &base()).unwrap();
        assert_eq!(target.as_str(), "http://other.example/");
    }

    #[test]
    fn unrelated_metas_are_ignored() {
        let html = r#"<html><head>
            <meta charset="utf-8">
            <meta name="viewport" content="width=device-width">
            <meta http-equiv="content-type" content="text/html; url=nope">
            <meta http-equiv="refresh">
        </head><body></body></html>"#;
        assert_eq!(meta_refresh_target(html, &base()), None);
    }

    #[test]
    fn last_matching_meta_wins() {
        let html = r#"<html><head>
            <meta http-equiv="refresh" content="0; url=/first">
            <meta http-equiv="refresh" content="0; url=/second">
        </head></html>"#;
        let target = meta_refresh_target(html, &base()).unwrap();
        assert_eq!(target.path(), "/second");
    }
}
