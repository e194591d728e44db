//! Fuzzy keyword suggestions for encode misses.

use strsim::levenshtein;

/// Rank every known keyword by its best Levenshtein distance to any
/// whitespace-separated word of `text`, and return the `n` closest.
///
/// Keywords are ranked in insertion order, so ties resolve to the earlier
/// keyword. Duplicate keyword strings across glyphs collapse to their first
/// occurrence.
pub fn suggest<'a, I>(text: &str, keywords: I, n: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let words: Vec<String> = text
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect();
    if words.is_empty() || n == 0 {
        return Vec::new();
    }

    let mut ranked: Vec<(String, usize)> = Vec::new();
    for kw in keywords {
        if ranked.iter().any(|(seen, _)| seen.as_str() == kw) {
            continue;
        }
        let best = words
            .iter()
            .map(|w| levenshtein(w, kw))
            .min()
            .unwrap_or(usize::MAX);
        ranked.push((kw.to_string(), best));
    }

    // Stable sort keeps insertion order among equal distances
    ranked.sort_by_key(|(_, d)| *d);
    ranked.into_iter().take(n).map(|(kw, _)| kw).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_typo_ranks_first() {
        let kws = ["swap", "stake", "query", "price"];
        let got = suggest("quary database", kws, 3);
        assert_eq!(got[0], "query");
    }

    #[test]
    fn test_ties_break_by_insertion_order() {
        // "swxp" is distance 1 from both "swap" and "swop"
        let kws = ["swop", "swap"];
        let got = suggest("swxp", kws, 2);
        assert_eq!(got, vec!["swop".to_string(), "swap".to_string()]);
    }

    #[test]
    fn test_duplicates_collapse() {
        let kws = ["swap", "swap", "trade"];
        let got = suggest("swap", kws, 3);
        assert_eq!(got.iter().filter(|k| k.as_str() == "swap").count(), 1);
    }

    #[test]
    fn test_empty_text_yields_nothing() {
        let kws = ["swap"];
        assert!(suggest("   ", kws, 3).is_empty());
    }

    #[test]
    fn test_best_over_all_input_words() {
        let kws = ["stake", "unrelated"];
        // second word is the near miss
        let got = suggest("zzzzzz stke", kws, 1);
        assert_eq!(got, vec!["stake".to_string()]);
    }
}
