//! Text normalization and tokenization.
//!
//! [`tokenize`] is the single text-to-token contract shared by training,
//! prediction, and corpus statistics. It is pure and total. Stages, in order:
//!
//! 1. lowercase
//! 2. line breaks become spaces
//! 3. URL-like substrings (`http://`, `https://`, bare `://`) become a space
//! 4. `£`, `$`, `€` become the token `price`
//! 5. every run of ASCII digits becomes the token `number`
//! 6. anything else that is not `a-z` becomes a space
//! 7. split on whitespace, dropping one-letter words and [`STOP_WORDS`]

use std::sync::LazyLock;

use regex::Regex;

/// Words too common to carry signal.
pub const STOP_WORDS: [&str; 7] = ["the", "is", "at", "and", "a", "in", "it"];

static RE_URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?:https?)?://[^\s\x{FEFF}]+").unwrap());

/// Split `text` into normalized tokens.
///
/// Every returned token is at least two ASCII lowercase letters long and is
/// never a stop word.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let without_urls = RE_URL.replace_all(&lowered, " ");

    let mut cleaned = String::with_capacity(without_urls.len() + 16);
    let mut in_digits = false;
    for ch in without_urls.chars() {
        if ch.is_ascii_digit() {
            if !in_digits {
                cleaned.push_str(" number ");
                in_digits = true;
            }
            continue;
        }
        in_digits = false;
        match ch {
            'a'..='z' => cleaned.push(ch),
            '£' | '$' | '€' => cleaned.push_str(" price "),
            _ => cleaned.push(' '),
        }
    }

    cleaned
        .split_whitespace()
        .filter(|word| word.len() > 1 && !is_stop_word(word))
        .map(str::to_owned)
        .collect()
}

/// Whether `word` is in [`STOP_WORDS`].
pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}
