use crate::goal::GoalUnit;
use crate::language::{classify, CountingFamily, LanguageTag};
use crate::util::ceil_div;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Counts derived from a piece of text. Always recomputed from the full text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextMetrics {
    pub word_count: usize,
    pub char_count: usize,
    pub paragraph_count: usize,
    pub reading_minutes: u64,
}

impl TextMetrics {
    pub fn empty() -> Self {
        Self {
            word_count: 0,
            char_count: 0,
            paragraph_count: 0,
            reading_minutes: 1,
        }
    }

    /// The count a goal measured in `unit` is compared against
    pub fn count_for(&self, unit: GoalUnit) -> usize {
        match unit {
            GoalUnit::Words => self.word_count,
            GoalUnit::Chars => self.char_count,
        }
    }
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self::empty()
    }
}

/// Compute every metric for `text` under the rules of `tag`'s counting family.
///
/// The family comes from the configured tag only; the script of the content is
/// never inspected, so Latin words inside a `zh` document are counted by the
/// CJK rule.
pub fn compute_metrics(text: &str, tag: LanguageTag) -> TextMetrics {
    compute_metrics_for_family(text, tag.family())
}

/// Like [`compute_metrics`] for an arbitrary tag string; unknown tags count as Latin-like
pub fn compute_metrics_for_tag(text: &str, tag: &str) -> TextMetrics {
    compute_metrics_for_family(text, classify(tag))
}

pub fn compute_metrics_for_family(text: &str, family: CountingFamily) -> TextMetrics {
    let word_count = count_words(text, family);
    let char_count = count_chars(text);
    let basis = match family {
        CountingFamily::Cjk => char_count,
        CountingFamily::LatinLike => word_count,
    };

    TextMetrics {
        word_count,
        char_count,
        paragraph_count: count_paragraphs(text),
        reading_minutes: reading_minutes(basis, family),
    }
}

/// Words for Latin-like text; significant characters for CJK text
pub fn count_words(text: &str, family: CountingFamily) -> usize {
    if is_blank(text) {
        return 0;
    }

    match family {
        CountingFamily::Cjk => text
            .chars()
            .filter(|c| !is_text_whitespace(*c) && !is_cjk_punctuation(*c))
            .count(),
        CountingFamily::LatinLike => text
            .split(|c: char| !is_word_constituent(c))
            .filter(|run| !run.is_empty())
            .count(),
    }
}

/// Raw length in characters, nothing stripped
pub fn count_chars(text: &str) -> usize {
    text.chars().count()
}

/// Groups of non-blank lines separated by at least one blank line
pub fn count_paragraphs(text: &str) -> usize {
    if is_blank(text) {
        return 0;
    }

    text.split('\n')
        .chunk_by(|line| is_blank(line))
        .into_iter()
        .filter(|(blank, _)| !blank)
        .count()
}

/// Minutes needed to read `basis` units, never less than one
pub fn reading_minutes(basis: usize, family: CountingFamily) -> u64 {
    ceil_div(basis as u64, u64::from(family.reading_speed())).max(1)
}

/// ASCII alphanumerics, underscore, Latin-1 Supplement through Latin Extended-B,
/// and Latin Extended Additional
pub fn is_word_constituent(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || c == '_'
        || ('\u{00C0}'..='\u{024F}').contains(&c)
        || ('\u{1E00}'..='\u{1EFF}').contains(&c)
}

/// Punctuation dropped before counting CJK characters
pub fn is_cjk_punctuation(c: char) -> bool {
    matches!(
        c,
        '，' | '。'
            | '！'
            | '？'
            | '、'
            | '；'
            | '：'
            | '“'
            | '”'
            | '‘'
            | '’'
            | '"'
            | '\''
            | '（'
            | '）'
            | '【'
            | '】'
    )
}

/// Unicode whitespace plus the byte-order mark, which editors and files
/// routinely leave at the start of text
pub fn is_text_whitespace(c: char) -> bool {
    c.is_whitespace() || c == '\u{FEFF}'
}

fn is_blank(text: &str) -> bool {
    text.chars().all(is_text_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latin_word_count_ignores_punctuation() {
        assert_eq!(count_words("hello, world!", CountingFamily::LatinLike), 2);
        assert_eq!(count_words("  one   two\tthree\n", CountingFamily::LatinLike), 3);
    }

    #[test]
    fn test_latin_word_count_splits_on_apostrophes_and_hyphens() {
        assert_eq!(count_words("don't", CountingFamily::LatinLike), 2);
        assert_eq!(count_words("well-known", CountingFamily::LatinLike), 2);
    }

    #[test]
    fn test_latin_word_count_keeps_underscores_and_digits() {
        assert_eq!(count_words("snake_case 42 v2", CountingFamily::LatinLike), 3);
    }

    #[test]
    fn test_latin_word_count_accented_letters() {
        assert_eq!(count_words("¿Qué tal, señor?", CountingFamily::LatinLike), 3);
        assert_eq!(count_words("Tiếng Việt", CountingFamily::LatinLike), 2);
    }

    #[test]
    fn test_latin_word_count_non_latin_scripts_separate() {
        // Cyrillic is outside the word-constituent ranges
        assert_eq!(count_words("привет", CountingFamily::LatinLike), 0);
        assert_eq!(count_words("a你b", CountingFamily::LatinLike), 2);
    }

    #[test]
    fn test_cjk_word_count_strips_punctuation() {
        assert_eq!(count_words("你好，世界！", CountingFamily::Cjk), 4);
        assert_eq!(count_words("【注意】“小心”", CountingFamily::Cjk), 4);
    }

    #[test]
    fn test_cjk_word_count_strips_whitespace() {
        assert_eq!(count_words("你 好\n世\t界", CountingFamily::Cjk), 4);
    }

    #[test]
    fn test_cjk_word_count_counts_latin_characters() {
        // mixed-script text follows the configured family
        assert_eq!(count_words("我爱Rust", CountingFamily::Cjk), 6);
        let metrics = compute_metrics("I love Rust", LanguageTag::Zh);
        assert_eq!(metrics.word_count, 9);
    }

    #[test]
    fn test_empty_and_blank_text() {
        for text in ["", " ", "\n\n", " \t\r\n "] {
            for tag in LanguageTag::ALL {
                let metrics = compute_metrics(text, tag);
                assert_eq!(metrics.word_count, 0, "{text:?} {tag}");
                assert_eq!(metrics.paragraph_count, 0, "{text:?} {tag}");
                assert_eq!(metrics.reading_minutes, 1);
            }
        }
    }

    #[test]
    fn test_char_count_is_raw_length() {
        assert_eq!(count_chars(""), 0);
        assert_eq!(count_chars("  "), 2);
        assert_eq!(count_chars("你好，世界！"), 6);
        assert_eq!(count_chars("a\nb"), 3);
    }

    #[test]
    fn test_paragraph_count() {
        assert_eq!(count_paragraphs("a\n\nb\n\n\nc"), 3);
        assert_eq!(count_paragraphs("single line"), 1);
        assert_eq!(count_paragraphs("line one\nline two"), 1);
    }

    #[test]
    fn test_paragraph_count_whitespace_only_separator_lines() {
        assert_eq!(count_paragraphs("a\n   \nb"), 2);
        assert_eq!(count_paragraphs("a\r\n\r\nb"), 2);
        assert_eq!(count_paragraphs("\n\na\n\n"), 1);
    }

    #[test]
    fn test_reading_minutes_basis_switch() {
        // 401 CJK chars -> 2 minutes at 400/min
        let cjk = "字".repeat(401);
        assert_eq!(compute_metrics(&cjk, LanguageTag::Zh).reading_minutes, 2);

        // 201 words -> 2 minutes at 200/min
        let latin = "word ".repeat(201);
        assert_eq!(compute_metrics(&latin, LanguageTag::En).reading_minutes, 2);

        // CJK uses chars, not significant characters: punctuation still counts
        let punctuated = "，".repeat(401);
        let metrics = compute_metrics(&punctuated, LanguageTag::Ja);
        assert_eq!(metrics.word_count, 0);
        assert_eq!(metrics.reading_minutes, 2);
    }

    #[test]
    fn test_reading_minutes_floor() {
        assert_eq!(reading_minutes(0, CountingFamily::LatinLike), 1);
        assert_eq!(reading_minutes(1, CountingFamily::LatinLike), 1);
        assert_eq!(reading_minutes(1, CountingFamily::Cjk), 1);
        assert_eq!(reading_minutes(200, CountingFamily::LatinLike), 1);
        assert_eq!(reading_minutes(800, CountingFamily::Cjk), 2);
    }

    #[test]
    fn test_unknown_tag_counts_as_latin_like() {
        let metrics = compute_metrics_for_tag("bonjour le monde", "fr");
        assert_eq!(metrics, compute_metrics("bonjour le monde", LanguageTag::En));
        assert_eq!(metrics.word_count, 3);

        let cjk = compute_metrics_for_tag("你好，世界！", "zh-TW");
        assert_eq!(cjk.word_count, 4);
    }

    #[test]
    fn test_count_for_unit() {
        let metrics = compute_metrics("hello world", LanguageTag::En);
        assert_eq!(metrics.count_for(GoalUnit::Words), 2);
        assert_eq!(metrics.count_for(GoalUnit::Chars), 11);
    }

    #[test]
    fn test_predicates() {
        assert!(is_word_constituent('a'));
        assert!(is_word_constituent('Z'));
        assert!(is_word_constituent('9'));
        assert!(is_word_constituent('_'));
        assert!(is_word_constituent('é'));
        assert!(is_word_constituent('ạ'));
        assert!(!is_word_constituent('-'));
        assert!(!is_word_constituent('中'));

        assert!(is_cjk_punctuation('，'));
        assert!(is_cjk_punctuation('】'));
        assert!(!is_cjk_punctuation(','));
        assert!(!is_cjk_punctuation('字'));

        assert!(is_text_whitespace('\u{3000}'));
        assert!(is_text_whitespace('\u{FEFF}'));
        assert!(!is_text_whitespace('字'));
    }

    #[test]
    fn test_byte_order_mark_is_blank() {
        let metrics = compute_metrics("\u{FEFF}", LanguageTag::Zh);
        assert_eq!(metrics.word_count, 0);
        assert_eq!(metrics.paragraph_count, 0);
        assert_eq!(metrics.char_count, 1);

        let metrics = compute_metrics("\u{FEFF}\n\n\u{FEFF}", LanguageTag::En);
        assert_eq!(metrics.paragraph_count, 0);
    }

    #[test]
    fn test_leading_byte_order_mark_not_counted() {
        let metrics = compute_metrics("\u{FEFF}你好", LanguageTag::Zh);
        assert_eq!(metrics.word_count, 2);
        assert_eq!(metrics.paragraph_count, 1);

        let metrics = compute_metrics("\u{FEFF}hello world", LanguageTag::En);
        assert_eq!(metrics.word_count, 2);
    }
}
