use std::fmt::Write;

use sha2::{Digest, Sha256};

/// Content-addressed name for a stored icon: `{short_hash(bytes)}.png`.
pub fn icon_filename(bytes: &[u8]) -> String {
    format!("{}.png", short_hash(bytes))
}

fn short_hash(input: &[u8]) -> String {
    let digest = Sha256::digest(input);
    let mut hex = String::with_capacity(16);
    for byte in digest.iter().take(8) {
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}
