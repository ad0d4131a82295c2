use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating category slugs
    /// Must be lowercase alphanumeric with single hyphens between segments
    /// - Valid: "electronics", "oled-tvs", "tv2"
    /// - Invalid: "-tvs", "tvs-", "oled--tvs", "TVs", "oled_tvs"
    pub static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_regex_valid() {
        assert!(SLUG_REGEX.is_match("electronics"));
        assert!(SLUG_REGEX.is_match("oled-tvs"));
        assert!(SLUG_REGEX.is_match("tv2"));
        assert!(SLUG_REGEX.is_match("a-b-c"));
    }

    #[test]
    fn test_slug_regex_invalid() {
        assert!(!SLUG_REGEX.is_match("-tvs")); // starts with hyphen
        assert!(!SLUG_REGEX.is_match("tvs-")); // ends with hyphen
        assert!(!SLUG_REGEX.is_match("oled--tvs")); // double hyphen
        assert!(!SLUG_REGEX.is_match("TVs")); // uppercase
        assert!(!SLUG_REGEX.is_match("oled_tvs")); // underscore
        assert!(!SLUG_REGEX.is_match("")); // empty
        assert!(!SLUG_REGEX.is_match("oled tvs")); // space
    }
}
