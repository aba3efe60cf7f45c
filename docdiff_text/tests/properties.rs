use docdiff_text::{NormalizeOptions, TokenChunker, Tokenizer, normalize, normalize_text};
use proptest::prelude::*;

struct WordTokenizer;

impl Tokenizer for WordTokenizer {
    fn count(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }

    fn truncate(&self, text: &str, max_tokens: usize) -> String {
        text.split_whitespace()
            .take(max_tokens)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn text_strategy() -> impl Strategy<Value = String> {
    let line = prop::string::string_regex("[ -~\t]{0,40}").expect("valid regex");
    prop::collection::vec(line, 0..30).prop_map(|lines| lines.join("\n"))
}

fn options_strategy() -> impl Strategy<Value = NormalizeOptions> {
    (any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(ignore_case, ignore_punctuation, de_hyphenate)| NormalizeOptions {
            ignore_case,
            ignore_punctuation,
            de_hyphenate,
        },
    )
}

fn prose_strategy() -> impl Strategy<Value = String> {
    let word = prop::string::string_regex("[a-z]{1,8}[.!?]?").expect("valid regex");
    let sep = prop::sample::select(vec![" ", " ", " ", "\n", "\n\n", ". "]);
    prop::collection::vec((word, sep), 0..1500).prop_map(|pieces| {
        pieces
            .into_iter()
            .map(|(word, sep)| format!("{word}{sep}"))
            .collect::<String>()
    })
}

proptest! {
    #[test]
    fn normalization_is_idempotent(input in text_strategy(), options in options_strategy()) {
        let once = normalize(&input, &options);
        let twice = normalize(&normalize_text(&input, &options), &options);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn normalized_lines_are_trimmed_and_non_empty(input in text_strategy(), options in options_strategy()) {
        for line in normalize(&input, &options) {
            prop_assert!(!line.is_empty());
            prop_assert_eq!(line.trim(), line.as_str());
            prop_assert!(!line.contains("  "));
        }
    }

    #[test]
    fn chunks_preserve_words_and_respect_budget(input in prose_strategy()) {
        let chunker = TokenChunker::new(&WordTokenizer, 500);
        let chunks = chunker.chunk(&input);

        for chunk in &chunks {
            prop_assert!(!chunk.trim().is_empty());
            prop_assert!(WordTokenizer.count(chunk) <= 500);
        }

        let rebuilt = chunks.join("\n\n");
        let rebuilt_words = rebuilt.split_whitespace().collect::<Vec<_>>();
        let input_words = input.split_whitespace().collect::<Vec<_>>();
        prop_assert_eq!(rebuilt_words, input_words);
    }

    #[test]
    fn chunking_is_deterministic(input in prose_strategy()) {
        let chunker = TokenChunker::new(&WordTokenizer, 500);
        prop_assert_eq!(chunker.chunk(&input), chunker.chunk(&input));
    }
}
