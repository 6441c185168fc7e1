use std::sync::OnceLock;

use regex::Regex;

/// Trailing sections that carry no narrative content
const TRAILING_SECTIONS: &[&str] = &[
    "references",
    "notes",
    "see also",
    "external links",
    "further reading",
    "bibliography",
    "sources",
    "citations",
    "footnotes",
];

fn heading() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(=+)\s*(.*?)\s*=+\s*$").expect("must be valid regex"))
}

/// Cleaned article body plus its word count
#[derive(Debug, PartialEq, Eq)]
pub struct CleanText {
    pub text: String,
    pub word_count: usize,
}

/// Turn a plain-text extract into speakable paragraphs
///
/// Everything from the first trailing section on is dropped, remaining
/// headings are removed, whitespace is collapsed, and the body is capped at
/// `max_words`.
pub fn clean_extract(extract: &str, max_words: usize) -> CleanText {
    let mut paragraphs: Vec<String> = Vec::new();
    let mut word_count = 0;

    for line in extract.lines() {
        if let Some(captures) = heading().captures(line) {
            let title = captures.get(2).map_or("", |m| m.as_str()).to_lowercase();
            if TRAILING_SECTIONS.contains(&title.as_str()) {
                break;
            }
            continue;
        }

        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }

        let budget = max_words - word_count;
        if words.len() >= budget {
            paragraphs.push(words[..budget].join(" "));
            word_count = max_words;
            break;
        }

        word_count += words.len();
        paragraphs.push(words.join(" "));
    }

    CleanText {
        text: paragraphs.join("\n\n"),
        word_count,
    }
}
