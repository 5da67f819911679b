/// Word filter applied to post bodies before they are stored.

const BANNED_WORDS: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];
const REPLACEMENT: &str = "****";

/// Mask banned words.
///
/// Words are split on whitespace and compared case-insensitively; a word
/// with punctuation attached (`fornax!`) is left alone. The result is
/// re-joined with single spaces.
pub fn clean_body(body: &str) -> String {
    body.split_whitespace()
        .map(|word| {
            let lowered = word.to_lowercase();
            if BANNED_WORDS.contains(&lowered.as_str()) {
                REPLACEMENT
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
