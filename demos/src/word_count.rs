use ferrum_stream::{Context, Mapper, Reducer, Values};
use once_cell::sync::Lazy;
use regex::Regex;

pub const COUNTER_GROUP: &str = "WordCount";

/// Runs of whitespace or Unicode punctuation (general category `P`).
/// Symbols such as `+`, `$` or `|` stay inside words.
static WORD_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s\p{P}]+").expect("Invalid regex pattern"));

/// Emits `(word, 1)` for every word of the input value.
#[derive(Debug, Default, Clone)]
pub struct WordCountMapper;

impl Mapper for WordCountMapper {
    type KeyOut = String;
    type ValueOut = u64;

    fn map(&mut self, _key: &str, value: &str, ctx: &mut Context<'_, String, u64>) {
        let line = value.trim();
        if line.is_empty() {
            return;
        }

        let lowered = line.to_lowercase();
        let words = WORD_SEPARATOR
            .split(&lowered)
            .filter(|word| !word.is_empty());

        for word in words {
            ctx.emit(word.to_string(), 1);
            ctx.increment(COUNTER_GROUP, "words_processed");
        }

        ctx.increment(COUNTER_GROUP, "lines_processed");
    }
}

/// Sums the counts of each word.
#[derive(Debug, Default, Clone)]
pub struct WordCountReducer;

impl Reducer for WordCountReducer {
    type KeyIn = String;
    type ValueIn = u64;
    type KeyOut = String;
    type ValueOut = u64;

    fn reduce(&mut self, key: String, values: Values<u64>, ctx: &mut Context<'_, String, u64>) {
        let total: u64 = values.sum();
        ctx.emit(key, total);
        ctx.increment(COUNTER_GROUP, "words_reduced");
    }
}
