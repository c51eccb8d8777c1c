/// Result of comparing a fresh icon against the host's stored set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconMatch {
    /// Index of the first stored icon with identical bytes.
    Existing(usize),
    New,
}

/// Exact byte comparison against each stored icon, in order.
pub fn find_existing_icon<'a, I>(candidate: &[u8], stored: I) -> IconMatch
where
    I: IntoIterator<Item = &'a [u8]>,
{
    stored
        .into_iter()
        .position(|existing| existing == candidate)
        .map_or(IconMatch::New, IconMatch::Existing)
}
