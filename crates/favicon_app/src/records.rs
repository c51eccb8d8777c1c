use favicon_core::{EntryRecord, InputRecord};

/// Parse an entry list: one entry per line, `url<TAB>title`, title optional.
///
/// Blank lines and lines starting with `#` are skipped.
pub fn parse_entries(text: &str) -> Vec<EntryRecord> {
    text.lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .map(|line| match line.split_once('\t') {
            Some((url, title)) => EntryRecord::new(url.trim(), title.trim()),
            None => EntryRecord::new(line.trim(), ""),
        })
        .collect()
}

/// Manifest key for an entry: its URL, or its title when the URL is blank.
pub fn entry_key<R: InputRecord + ?Sized>(record: &R) -> String {
    let url = record.url().trim();
    if url.is_empty() {
        record.title().trim().to_string()
    } else {
        url.to_string()
    }
}
