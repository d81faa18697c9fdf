//! Utility functions for mapping operations.

/// Normalizes a title for comparison by lowercasing and replacing
/// separators with spaces.
pub fn normalize_title(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .replace(['_', '-', '.', '/', '\\'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// A column title matches a candidate when the normalized forms are equal
/// or the candidate appears in the title as a whole phrase. Partial-word
/// hits ("Coached by" for "Coach") do not count.
pub fn title_matches(title: &str, candidate: &str) -> bool {
    let title = normalize_title(title);
    let candidate = normalize_title(candidate);
    if candidate.is_empty() {
        return false;
    }
    if title == candidate {
        return true;
    }
    contains_phrase(&title, &candidate)
}

fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    let words: Vec<&str> = haystack.split(' ').collect();
    let needle: Vec<&str> = phrase.split(' ').collect();
    if needle.is_empty() || needle.len() > words.len() {
        return false;
    }
    words
        .windows(needle.len())
        .any(|window| window == needle.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_separators_and_case() {
        assert_eq!(normalize_title("  Visit_Date "), "visit date");
        assert_eq!(normalize_title("school-name"), "school name");
        assert_eq!(normalize_title("Coach   Name"), "coach name");
    }

    #[test]
    fn matches_exact_and_whole_phrase() {
        assert!(title_matches("Visit Date", "visit date"));
        assert!(title_matches("Planned Visit Date", "Visit Date"));
        assert!(title_matches("Coach", "coach"));
        assert!(!title_matches("Coached By", "coach"));
        assert!(!title_matches("Update", "Date"));
        assert!(!title_matches("Visit", ""));
    }
}
