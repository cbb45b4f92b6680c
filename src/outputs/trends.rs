//! Word frequencies and a short trend summary over collected headlines.
//!
//! Tokens are lowercase runs of Unicode letters and digits. Function words
//! of the languages the registry covers (Spanish, Portuguese, Italian, French,
//! English), tokens shorter than three characters, and bare numbers are
//! dropped.

use crate::models::ResultTable;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::fmt::Write;

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{L}\p{N}]+").unwrap());

static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // es
        "del", "las", "los", "que", "por", "para", "con", "una", "uno", "unos", "unas", "sus",
        "como", "más", "mas", "pero", "fue", "este", "esta", "estos", "estas", "ese", "esa",
        "eso", "esto", "porque", "son", "entre", "cuando", "muy", "sin", "sobre", "ser",
        "tiene", "también", "hasta", "hay", "donde", "han", "quien", "quién", "desde", "todo",
        "todos", "nos", "durante", "les", "contra", "otro", "otra", "otros", "otras", "ante",
        "ellos", "antes", "qué", "cómo", "tras", "será", "puede", "van", "está", "están",
        "así", "ahora", "después", "cuál", "dónde", "solo", "sólo", "hace", "tiene", "tras",
        // pt
        "não", "com", "dos", "das", "nos", "mais", "mas", "foi", "ele", "ela", "seu", "sua",
        "são", "pelo", "pela", "após", "até", "já", "também", "sobre", "uma",
        // it
        "della", "delle", "degli", "dello", "che", "per", "non", "nel", "nella", "sono",
        "dal", "dalla", "alla", "alle", "agli", "gli", "una", "con", "dopo",
        // fr
        "les", "des", "une", "est", "pour", "dans", "avec", "sur", "qui", "par", "pas",
        "plus", "aux", "son", "ses", "après",
        // en
        "the", "and", "for", "with", "from", "that", "this", "are", "was", "were", "has",
        "have", "had", "not", "but", "his", "her", "its", "our", "their", "they", "you",
        "after", "over", "into", "about", "will", "who", "what", "when", "how", "out", "new",
        "can", "vs",
    ]
    .into_iter()
    .collect()
});

/// A word and how many times it appears across all headlines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}

/// Split a headline into normalized, meaningful tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    WORD.find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .filter(|w| w.chars().count() >= 3)
        .filter(|w| !w.chars().all(|c| c.is_numeric()))
        .filter(|w| !STOPWORDS.contains(w.as_str()))
        .collect()
}

/// Word counts over every headline, most frequent first, ties alphabetical.
pub fn word_frequencies(table: &ResultTable) -> Vec<WordCount> {
    table
        .records()
        .iter()
        .flat_map(|r| tokenize(&r.text))
        .counts()
        .into_iter()
        .map(|(word, count)| WordCount { word, count })
        .sorted_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)))
        .collect()
}

/// Headline count per source, in the order sources appear in the table.
pub fn headlines_per_source(table: &ResultTable) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for record in table.records() {
        match counts.iter_mut().find(|(source, _)| *source == record.source) {
            Some((_, n)) => *n += 1,
            None => counts.push((record.source.clone(), 1)),
        }
    }
    counts
}

/// Render the `top` most frequent words as an aligned table.
pub fn render_frequencies(frequencies: &[WordCount], top: usize) -> String {
    let shown = &frequencies[..top.min(frequencies.len())];
    let width = shown
        .iter()
        .map(|w| w.word.chars().count())
        .chain(std::iter::once("Palabra".len()))
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    let _ = writeln!(out, "{:<width$}  Frecuencia", "Palabra");
    let _ = writeln!(out, "{}  ----------", "-".repeat(width));
    for entry in shown {
        let _ = writeln!(out, "{:<width$}  {}", entry.word, entry.count);
    }
    out
}

/// A short free-text summary of what the headlines talk about.
pub fn summarize(table: &ResultTable, frequencies: &[WordCount], top: usize) -> String {
    if table.is_empty() {
        return "No headlines to summarize.".to_string();
    }

    let per_source = headlines_per_source(table);
    let mut summary = format!(
        "{} headlines from {} sources.",
        table.len(),
        per_source.len()
    );

    let leading = frequencies
        .iter()
        .take(top.min(5))
        .filter(|w| w.count > 1)
        .map(|w| format!("{} ({})", w.word, w.count))
        .join(", ");
    if leading.is_empty() {
        summary.push_str(" No word repeats across headlines.");
    } else {
        let _ = write!(summary, " Most repeated terms: {leading}.");
    }

    if let Some((source, count)) = per_source.iter().max_by_key(|(_, count)| *count) {
        let _ = write!(summary, " Most headlines: {source} ({count}).");
    }
    summary
}
