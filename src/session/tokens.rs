// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Approximate token counting for context budgeting.
//!
//! External agent CLIs do not report token usage, so the session store keeps
//! its own estimate. The estimate only has to be stable and roughly
//! proportional to real tokenizer output; it is never sent anywhere.

/// Weight per ASCII-alphabetic word run.
const WORD_RUN_WEIGHT: f64 = 1.3;
/// Weight per CJK character run (hanzi/kana/hangul).
const CJK_RUN_WEIGHT: f64 = 2.0;
/// Weight per digit, punctuation, or symbol character.
const SYMBOL_CHAR_WEIGHT: f64 = 0.4;
/// Weight per whitespace run.
const WHITESPACE_RUN_WEIGHT: f64 = 0.25;

/// Character classes used by the estimator. Non-overlapping by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Word,
    Cjk,
    Symbol,
    Whitespace,
}

fn classify(c: char) -> CharClass {
    if c.is_ascii_alphabetic() {
        CharClass::Word
    } else if is_cjk(c) {
        CharClass::Cjk
    } else if c.is_whitespace() {
        CharClass::Whitespace
    } else {
        CharClass::Symbol
    }
}

/// Check whether a character falls in the CJK ranges we weight separately.
fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}'   // CJK Unified Ideographs
        | '\u{3400}'..='\u{4DBF}' // CJK Extension A
        | '\u{3040}'..='\u{30FF}' // Hiragana + Katakana
        | '\u{AC00}'..='\u{D7AF}' // Hangul Syllables
        | '\u{F900}'..='\u{FAFF}' // CJK Compatibility Ideographs
    )
}

/// Estimate the token count of arbitrary text.
///
/// Counts maximal runs of word/CJK/whitespace characters and individual
/// digit/punctuation/symbol characters, weights each class, and truncates
/// the sum. Empty input yields 0; any non-empty input yields at least 1.
/// Pure and deterministic: the same text always produces the same estimate.
pub fn estimate_tokens(text: &str) -> u64 {
    if text.is_empty() {
        return 0;
    }

    let mut word_runs = 0u64;
    let mut cjk_runs = 0u64;
    let mut symbol_chars = 0u64;
    let mut whitespace_runs = 0u64;

    let mut prev: Option<CharClass> = None;
    for c in text.chars() {
        let class = classify(c);
        match class {
            CharClass::Word => {
                if prev != Some(CharClass::Word) {
                    word_runs += 1;
                }
            }
            CharClass::Cjk => {
                if prev != Some(CharClass::Cjk) {
                    cjk_runs += 1;
                }
            }
            CharClass::Symbol => symbol_chars += 1,
            CharClass::Whitespace => {
                if prev != Some(CharClass::Whitespace) {
                    whitespace_runs += 1;
                }
            }
        }
        prev = Some(class);
    }

    let estimate = word_runs as f64 * WORD_RUN_WEIGHT
        + cjk_runs as f64 * CJK_RUN_WEIGHT
        + symbol_chars as f64 * SYMBOL_CHAR_WEIGHT
        + whitespace_runs as f64 * WHITESPACE_RUN_WEIGHT;

    (estimate as u64).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(estimate_tokens(""), 0);
    }

    #[test]
    fn test_nonempty_is_at_least_one() {
        assert!(estimate_tokens(".") >= 1);
        assert!(estimate_tokens(" ") >= 1);
        assert!(estimate_tokens("a") >= 1);
    }

    #[test]
    fn test_deterministic() {
        let text = "fn main() { println!(\"hello\"); }";
        assert_eq!(estimate_tokens(text), estimate_tokens(text));
    }

    #[test]
    fn test_scales_with_words() {
        let short = estimate_tokens("one two three");
        let long = estimate_tokens("one two three four five six seven eight nine ten");
        assert!(long > short);
    }

    #[test]
    fn test_cjk_counted() {
        assert!(estimate_tokens("세션 컨텍스트") >= 1);
        assert!(estimate_tokens("日本語のテキスト") >= 1);
    }

    #[test]
    fn test_symbols_counted_per_char() {
        // Ten symbol chars at 0.4 each should beat one word run at 1.3.
        assert!(estimate_tokens("!!!!!!!!!!") > estimate_tokens("word"));
    }
}
