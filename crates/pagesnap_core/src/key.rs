use sha2::{Digest, Sha256};

/// Number of hex digits of the URL digest appended to every key.
pub const KEY_HASH_LEN: usize = 16;

/// Upper bound on the readable, sanitized part of a key.
pub const MAX_SANITIZED_LEN: usize = 96;

const HASH_SEPARATOR: &str = "--";

/// Deterministic, filesystem-safe archive key: `{sanitized_url}--{short_hash(url)}`.
///
/// The sanitized part replaces every non ASCII-alphanumeric character with `_`
/// and is lossy: `https://a.b/c` and `https://a-b/c` sanitize identically. The
/// hash over the untouched URL keeps such URLs apart; two URLs still share a
/// key only on a 64-bit digest prefix collision.
pub fn archive_key(url: &str) -> String {
    let mut sanitized: String = url
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    sanitized.truncate(MAX_SANITIZED_LEN);
    // No-op on the `[A-Za-z0-9_]` alphabet; keeps the key path-safe if the
    // sanitizer is ever loosened.
    let escaped = urlencoding::encode(&sanitized);
    format!("{escaped}{HASH_SEPARATOR}{}", short_hash(url))
}

/// True when `key` has the shape produced by [`archive_key`].
///
/// Used to reject path traversal and foreign directories before touching storage.
pub fn is_valid_key(key: &str) -> bool {
    let Some((sanitized, hash)) = key.rsplit_once(HASH_SEPARATOR) else {
        return false;
    };
    sanitized.len() <= MAX_SANITIZED_LEN
        && sanitized
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        && hash.len() == KEY_HASH_LEN
        && hash
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
}

fn short_hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(KEY_HASH_LEN);
    for byte in digest.iter().take(KEY_HASH_LEN / 2) {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}
