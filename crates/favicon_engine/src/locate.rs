use engine_logging::engine_trace;
use favicon_core::{reconcile_uri, DownloadFailure, FailureKind};
use scraper::{Html, Selector};
use url::Url;

use crate::FetchedDocument;

/// `href` of the first `<head><link>` whose `rel` is `icon` or `shortcut icon`.
///
/// Links without `rel` or with an empty/missing `href` are skipped.
pub fn find_icon_href(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("head > link").ok()?;

    document.select(&selector).find_map(|link| {
        let rel = link.value().attr("rel")?.trim().to_lowercase();
        if rel != "icon" && rel != "shortcut icon" {
            return None;
        }
        match link.value().attr("href").map(str::trim) {
            Some(href) if !href.is_empty() => Some(href.to_string()),
            _ => {
                engine_trace!("icon link without usable href skipped");
                None
            }
        }
    })
}

/// Absolute URL of the icon the document declares explicitly.
pub fn locate_favicon(document: &FetchedDocument) -> Result<Url, DownloadFailure> {
    let href = find_icon_href(&document.html).ok_or_else(|| {
        DownloadFailure::new(
            FailureKind::NotFound,
            format!("No icon link in {}", document.effective_url),
        )
    })?;
    reconcile_uri(&document.effective_url, Some(&href))
}

#[cfg(test)]
mod tests {
    use super::{find_icon_href, locate_favicon};
    use crate::FetchedDocument;
    use favicon_core::FailureKind;
    use url::Url;

    fn document(html: &str) -> FetchedDocument {
        FetchedDocument {
            html: html.to_string(),
            effective_url: Url::parse("https://www.example.com/home/").unwrap(),
            hops: 0,
        }
    }

    #[test]
    fn shortcut_icon_is_found_and_stylesheet_ignored() {
        let html = r#"<html><head>
            <link rel="stylesheet" href="s.css">
            <link rel="shortcut icon" href="/f.ico">
        </head><body></body></html>"#;
        assert_eq!(find_icon_href(html).as_deref(), Some("/f.ico"));
    }

    #[test]
    fn rel_comparison_ignores_case() {
        let html = r#"<html><head><link rel="ICON" href="favicon.png"></head></html>"#;
        assert_eq!(find_icon_href(html).as_deref(), Some("favicon.png"));
    }

    #[test]
    fn first_icon_link_in_document_order_wins() {
        let html = r#"<html><head>
            <link rel="icon" href="/first.ico">
            <link rel="shortcut icon" href="/second.ico">
        </head></html>"#;
        assert_eq!(find_icon_href(html).as_deref(), Some("/first.ico"));
    }

    #[test]
    fn malformed_links_are_skipped() {
        let html = r#"<html><head>
            <link href="/no-rel.ico">
            <link rel="icon">
            <link rel="icon" href="  ">
            <link rel="icon" href="/good.ico">
        </head></html>"#;
        assert_eq!(find_icon_href(html).as_deref(), Some("/good.ico"));
    }

    #[test]
    fn other_icon_flavours_do_not_match() {
        let html = r#"<html><head>
            <link rel="apple-touch-icon" href="/apple.png">
            <link rel="mask-icon" href="/mask.svg">
        </head></html>"#;
        assert_eq!(find_icon_href(html), None);
    }

    #[test]
    fn no_links_is_not_found() {
        let failure = locate_favicon(&document("<html><head><title>x</title></head></html>"))
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::NotFound);
    }

    #[test]
    fn href_is_reconciled_against_effective_url() {
        let doc = document(r#"<html><head><link rel="icon" href="//cdn.example.net/i.ico"></head></html>"#);
        assert_eq!(locate_favicon(&doc).unwrap().as_str(), "https://cdn.example.net/i.ico");

        let doc = document(r#"<html><head><link rel="icon" href="img/i.ico"></head></html>"#);
        assert_eq!(
            locate_favicon(&doc).unwrap().as_str(),
            "https://www.example.com/home/img/i.ico"
        );
    }
}
