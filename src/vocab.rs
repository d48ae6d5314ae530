//! Vocabulary Parser - turns the vocabulary document into categories
//!
//! Category boundaries are `## ` headers; everything under a header until
//! the next one is a comma-separated word list. Summary sections such as
//! "Complete word list" are not categories and are skipped.

use regex::Regex;

/// Header titles (matched case-insensitively, by substring) that are
/// document metadata rather than word categories.
const SUMMARY_SECTIONS: &[&str] = &["complete word list", "total words", "note:", "recommended"];

/// A named group of vocabulary words, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabCategory {
    pub name: String,
    pub words: Vec<String>,
}

/// Parse a vocabulary document into ordered categories.
///
/// Never fails: a malformed document yields an empty or partial result.
/// A header with no body yields a category with an empty word list.
pub fn parse_vocabulary(text: &str) -> Vec<VocabCategory> {
    let header_re = Regex::new(r"^##\s+(.+?)\s*$").unwrap();

    let mut categories: Vec<VocabCategory> = Vec::new();
    let mut current: Option<usize> = None;

    for line in text.lines() {
        let line = line.trim();

        if let Some(caps) = header_re.captures(line) {
            let title = caps[1].to_string();
            if is_summary_section(&title) {
                current = None;
                continue;
            }
            // A repeated header folds into the first occurrence so
            // category names stay unique within a parse.
            let idx = match categories.iter().position(|c| c.name == title) {
                Some(idx) => idx,
                None => {
                    categories.push(VocabCategory {
                        name: title,
                        words: Vec::new(),
                    });
                    categories.len() - 1
                }
            };
            current = Some(idx);
            continue;
        }

        let Some(idx) = current else { continue };

        // Skip blank lines and markup (deeper headers, bullets).
        if line.is_empty() || line.starts_with('#') || line.starts_with('*') {
            continue;
        }

        categories[idx].words.extend(
            line.split(',')
                .map(str::trim)
                .filter(|w| !w.is_empty())
                .map(String::from),
        );
    }

    categories
}

fn is_summary_section(title: &str) -> bool {
    let lower = title.to_lowercase();
    SUMMARY_SECTIONS.iter().any(|marker| lower.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_categories_and_excludes_summaries() {
        let doc = "## Colors\nred, blue, green\n## Complete word list\nred, blue\n";
        let categories = parse_vocabulary(doc);

        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name, "Colors");
        assert_eq!(categories[0].words, vec!["red", "blue", "green"]);
    }

    #[test]
    fn summary_match_is_case_insensitive() {
        let doc = "## TOTAL WORDS\n42\n## Animals & Creatures\ncat, dog\n";
        let categories = parse_vocabulary(doc);

        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name, "Animals & Creatures");
    }

    #[test]
    fn words_accumulate_across_lines() {
        let doc = "## Food & Drink\napple, banana\nmilk, juice\n";
        let categories = parse_vocabulary(doc);

        assert_eq!(categories[0].words, vec!["apple", "banana", "milk", "juice"]);
    }

    #[test]
    fn markup_and_blank_lines_are_skipped() {
        let doc = "## Shapes\n\n* a bullet note\n### nested header\ncircle, square\n";
        let categories = parse_vocabulary(doc);

        assert_eq!(categories[0].words, vec!["circle", "square"]);
    }

    #[test]
    fn header_with_no_body_yields_empty_category() {
        let doc = "## Numbers\n## Colors\nred\n";
        let categories = parse_vocabulary(doc);

        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].name, "Numbers");
        assert!(categories[0].words.is_empty());
        assert_eq!(categories[1].words, vec!["red"]);
    }

    #[test]
    fn repeated_header_folds_into_first_occurrence() {
        let doc = "## Colors\nred\n## Animals & Creatures\ncat\n## Colors\nblue\n";
        let categories = parse_vocabulary(doc);

        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].words, vec!["red", "blue"]);
    }

    #[test]
    fn malformed_document_is_tolerated() {
        assert!(parse_vocabulary("").is_empty());
        assert!(parse_vocabulary("no headers, just text\n").is_empty());
    }
}
