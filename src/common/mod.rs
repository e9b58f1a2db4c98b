//! Commonly used code.

pub mod error;

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};

/// Commonly used command line arguments.
#[derive(Parser, Debug)]
pub struct Args {
    /// Verbosity of the program
    #[clap(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}

/// Truncate `text` to at most `max_chars` characters, respecting UTF-8 boundaries.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod test {
    #[rstest::rstest]
    #[case("", 5, "")]
    #[case("abc", 5, "abc")]
    #[case("abcdef", 3, "abc")]
    #[case("äöüß", 2, "äö")]
    fn truncate_chars(#[case] text: &str, #[case] max_chars: usize, #[case] expected: &str) {
        assert_eq!(super::truncate_chars(text, max_chars), expected);
    }
}
