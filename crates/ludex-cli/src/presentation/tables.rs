//! Table formatting utilities for CLI output.

/// Truncates a string to at most `max_len` characters, adding "..." if needed.
///
/// # Examples
///
/// ```rust
/// use ludex_cli::presentation::truncate_string;
///
/// assert_eq!(truncate_string("Hello", 10), "Hello");
/// assert_eq!(truncate_string("Hello World", 8), "Hello...");
/// ```
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Print a horizontal separator line.
pub fn print_separator(width: usize) {
    println!("{}", "-".repeat(width));
}

/// Format an optional value for table display, returning a default if None.
pub fn format_optional<T: std::fmt::Display>(value: Option<T>, default: &str) -> String {
    value.map_or_else(|| default.to_string(), |v| v.to_string())
}

/// A 0-100 rating with one decimal, or `--`.
pub fn format_rating(rating: Option<f64>) -> String {
    rating.map_or_else(|| "--".to_string(), |r| format!("{r:.1}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string_no_truncation_needed() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("exactly10c", 10), "exactly10c");
    }

    #[test]
    fn test_truncate_string_needs_truncation() {
        assert_eq!(truncate_string("this is a very long string", 10), "this is...");
    }

    #[test]
    fn test_truncate_string_counts_characters() {
        assert_eq!(truncate_string("Pokémon Légendes", 10), "Pokémon...");
    }

    #[test]
    fn test_format_helpers() {
        assert_eq!(format_optional(Some(2017), "--"), "2017");
        assert_eq!(format_optional(None::<i32>, "--"), "--");
        assert_eq!(format_rating(Some(94.456)), "94.5");
        assert_eq!(format_rating(None), "--");
    }
}
