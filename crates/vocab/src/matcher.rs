//! Whole-word keyword matching.
//!
//! Matching is deliberately simple: lowercase the input, scan keywords in
//! declaration order, first whole-word hit wins. No multi-keyword scoring.

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// True when `word` occurs in `text` bounded by non-word characters on both
/// sides. Both arguments are expected lowercase.
pub fn contains_word(text: &str, word: &str) -> bool {
    if word.is_empty() {
        return false;
    }
    let mut search_from = 0;
    while let Some(rel) = text[search_from..].find(word) {
        let at = search_from + rel;
        let end = at + word.len();
        let before_ok = text[..at].chars().next_back().map_or(true, |c| !is_word_char(c));
        let after_ok = text[end..].chars().next().map_or(true, |c| !is_word_char(c));
        if before_ok && after_ok {
            return true;
        }
        // Advance one character, not one byte
        match text[at..].chars().next() {
            Some(c) => search_from = at + c.len_utf8(),
            None => break,
        }
    }
    false
}

/// First keyword of `keywords` that whole-word matches `text_lower`, if any.
pub fn first_keyword_hit<'a>(text_lower: &str, keywords: &'a [String]) -> Option<&'a str> {
    keywords
        .iter()
        .find(|kw| contains_word(text_lower, kw))
        .map(|kw| kw.as_str())
}
