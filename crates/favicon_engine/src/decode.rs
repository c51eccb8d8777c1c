use chardetng::EncodingDetector;
use encoding_rs::Encoding;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedHtml {
    pub html: String,
    pub encoding_label: String,
}

/// Page text could only be decoded with replacement characters.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("page is not valid {encoding}")]
pub struct DecodeError {
    pub encoding: &'static str,
    lossy: String,
}

impl DecodeError {
    /// The page text with U+FFFD in place of malformed sequences.
    pub fn into_lossy(self) -> String {
        self.lossy
    }
}

/// Decode page bytes to UTF-8: BOM, then the Content-Type charset, then a
/// chardetng guess hinted by the page's top-level domain.
pub fn decode_html(
    bytes: &[u8],
    content_type: Option<&str>,
    tld: Option<&str>,
) -> Result<DecodedHtml, DecodeError> {
    let encoding = Encoding::for_bom(bytes)
        .map(|(encoding, _)| encoding)
        .or_else(|| {
            content_type
                .and_then(extract_charset)
                .and_then(|label| Encoding::for_label(label.as_bytes()))
        })
        .unwrap_or_else(|| {
            let mut detector = EncodingDetector::new();
            detector.feed(bytes, true);
            detector.guess(tld.map(str::as_bytes), true)
        });

    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(DecodeError {
            encoding: encoding.name(),
            lossy: text.into_owned(),
        });
    }
    Ok(DecodedHtml {
        html: text.into_owned(),
        encoding_label: encoding.name().to_string(),
    })
}

fn extract_charset(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|part| {
        let (key, value) = part.trim().split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim_matches([' ', '"', '\'']).to_string())
    })
}
