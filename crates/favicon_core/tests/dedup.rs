use favicon_core::{find_existing_icon, IconMatch};

#[test]
fn identical_bytes_match_first_stored_icon() {
    let stored: Vec<Vec<u8>> = vec![vec![9, 9, 9], vec![1, 2, 3, 4], vec![1, 2, 3, 4]];
    let found = find_existing_icon(&[1, 2, 3, 4], stored.iter().map(Vec::as_slice));
    assert_eq!(found, IconMatch::Existing(1));
}

#[test]
fn single_byte_difference_is_a_new_icon() {
    let stored: Vec<Vec<u8>> = vec![vec![1, 2, 3, 4]];
    let found = find_existing_icon(&[1, 2, 3, 5], stored.iter().map(Vec::as_slice));
    assert_eq!(found, IconMatch::New);
}

#[test]
fn prefix_is_not_a_match() {
    let stored: Vec<Vec<u8>> = vec![vec![1, 2, 3]];
    let found = find_existing_icon(&[1, 2, 3, 4], stored.iter().map(Vec::as_slice));
    assert_eq!(found, IconMatch::New);
}

#[test]
fn empty_store_yields_new_icon() {
    let found = find_existing_icon(&[1], std::iter::empty());
    assert_eq!(found, IconMatch::New);
}
