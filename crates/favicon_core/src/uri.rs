use url::Url;

use crate::{DownloadFailure, FailureKind};

/// Parse a loosely written address, prepending `http://` when it carries no `scheme://` prefix.
pub fn normalize_url(input: &str) -> Result<Url, DownloadFailure> {
    let trimmed = input.trim();
    let candidate = if has_scheme_prefix(trimmed) {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };
    Url::parse(&candidate).map_err(|err| {
        DownloadFailure::new(
            FailureKind::MalformedUrl,
            format!("Malformed url '{input}': {err}"),
        )
    })
}

fn has_scheme_prefix(input: &str) -> bool {
    let Some((scheme, _)) = input.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}

/// Resolve `reference` against `base`.
///
/// Order matters: empty references yield the base, `//host/path` borrows the
/// base scheme, anything that parses on its own is returned as is, and only
/// then is the reference joined as a relative URL.
pub fn reconcile_uri(base: &Url, reference: Option<&str>) -> Result<Url, DownloadFailure> {
    let reference = match reference.map(str::trim) {
        None | Some("") => return Ok(base.clone()),
        Some(reference) => reference,
    };

    let reference = if reference.starts_with("//") {
        format!("{}:{}", base.scheme(), reference)
    } else {
        reference.to_string()
    };

    if let Ok(absolute) = Url::parse(&reference) {
        return Ok(absolute);
    }

    base.join(&reference).map_err(|err| {
        DownloadFailure::new(
            FailureKind::MalformedUrl,
            format!("Cannot resolve '{reference}' against {base}: {err}"),
        )
    })
}
