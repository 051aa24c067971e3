use crate::types::tables::Site;
use once_cell::sync::Lazy;
use regex::Regex;

static STARTERS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Starters \d+").unwrap());
static EDUCATIONAL_ROUND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Educational Codeforces Round \d+").unwrap());
static CODEFORCES_ROUND: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Codeforces Round \d+").unwrap());

/// Reduces a contest title to the short canonical phrase used when matching
/// against video titles. Titles that don't follow a known platform naming
/// convention (all LeetCode titles included) pass through unchanged.
pub fn canonical_key(title: &str, site: Site) -> &str {
    let key = match site {
        Site::Codechef => STARTERS.find(title),
        Site::Codeforces => EDUCATIONAL_ROUND
            .find(title)
            .or_else(|| CODEFORCES_ROUND.find(title)),
        Site::Leetcode => None,
    };

    key.map(|m| m.as_str()).unwrap_or(title)
}

/// Case-insensitive containment of the canonical key in the video title.
pub fn matches(contest_title: &str, site: Site, video_title: &str) -> bool {
    let key = canonical_key(contest_title, site).to_lowercase();
    video_title.to_lowercase().contains(&key)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_codeforces_round_key() {
        assert_eq!(
            canonical_key("Codeforces Round 950 (Div 3)", Site::Codeforces),
            "Codeforces Round 950"
        );
    }

    #[test]
    fn test_educational_round_key() {
        assert_eq!(
            canonical_key("Educational Codeforces Round 170 (Rated for Div. 2)", Site::Codeforces),
            "Educational Codeforces Round 170"
        );
    }

    #[test]
    fn test_starters_key() {
        assert_eq!(
            canonical_key("Starters 160 (Rated)", Site::Codechef),
            "Starters 160"
        );
    }

    #[test]
    fn test_leetcode_title_passes_through() {
        assert_eq!(
            canonical_key("Biweekly Contest 120", Site::Leetcode),
            "Biweekly Contest 120"
        );
    }

    #[test]
    fn test_unconventional_title_passes_through() {
        assert_eq!(
            canonical_key("Good Bye 2025", Site::Codeforces),
            "Good Bye 2025"
        );
        assert_eq!(canonical_key("Starters", Site::Codechef), "Starters");
    }

    #[test]
    fn test_match_is_case_insensitive_containment() {
        assert!(matches(
            "Codeforces Round 950 (Div 3)",
            Site::Codeforces,
            "CODEFORCES ROUND 950 (Div 3) Editorial Discussion [Video]"
        ));
        assert!(!matches(
            "Codeforces Round 950 (Div 3)",
            Site::Codeforces,
            "Codeforces Round 951 Editorial"
        ));
    }
}
