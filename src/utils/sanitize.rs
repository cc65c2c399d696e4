//! Filename sanitization utilities

/// Longest file name, in bytes, accepted by common filesystems
pub const MAX_NAME_BYTES: usize = 255;

/// Longest prefix of `name` no longer than `max_bytes`, cut on a character boundary
pub fn truncate_name(name: &str, max_bytes: usize) -> &str {
    if name.len() <= max_bytes {
        return name;
    }
    let mut end = max_bytes;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    &name[..end]
}

/// Sanitize a single path component for safe filesystem usage
///
/// Replaces filesystem-unsafe characters with visually similar Unicode alternatives,
/// drops control characters, trims surrounding whitespace and trailing dots, and
/// truncates to 255 bytes on a character boundary. Names that would still resolve
/// to the current or parent directory become `_`.
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .filter(|c| !c.is_control() || *c == '\0')
        .map(|c| match c {
            '/' => '⧸',  // U+29F8 - Big Solidus
            '\\' => '⧹', // U+29F9 - Big Reverse Solidus
            ':' => '꞉',  // U+A789 - Modifier Letter Colon
            '*' => '⁎',  // U+204E - Low Asterisk
            '?' => '？', // U+FF1F - Fullwidth Question Mark
            '"' => '″',  // U+2033 - Double Prime
            '<' => '‹',  // U+2039 - Single Left Angle Quote
            '>' => '›',  // U+203A - Single Right Angle Quote
            '|' => '｜', // U+FF5C - Fullwidth Vertical Line
            '\0' => '_',
            _ => c,
        })
        .collect();

    let trimmed = replaced.trim().trim_end_matches('.').trim_end();

    let result = truncate_name(trimmed, MAX_NAME_BYTES).to_string();

    if result.is_empty() || result == "." || result == ".." {
        return "_".to_string();
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_slashes() {
        assert_eq!(
            sanitize_filename("BOTHERED / UNBOTHERED"),
            "BOTHERED ⧸ UNBOTHERED"
        );
        assert_eq!(sanitize_filename("R/Edgelord"), "R⧸Edgelord");
    }

    #[test]
    fn test_sanitize_colon() {
        assert_eq!(sanitize_filename("Gym: Legs Day"), "Gym꞉ Legs Day");
    }

    #[test]
    fn test_no_changes_needed() {
        assert_eq!(sanitize_filename("Workout"), "Workout");
    }

    #[test]
    fn test_control_characters_dropped() {
        assert_eq!(sanitize_filename("Road\tTrip\n"), "RoadTrip");
    }

    #[test]
    fn test_trailing_dots_and_whitespace() {
        assert_eq!(sanitize_filename("  Chill...  "), "Chill");
    }

    #[test]
    fn test_relative_names_replaced() {
        assert_eq!(sanitize_filename(".."), "_");
        assert_eq!(sanitize_filename("   "), "_");
    }

    #[test]
    fn test_truncates_on_char_boundary() {
        let long = "é".repeat(200);
        let result = sanitize_filename(&long);
        assert!(result.len() <= MAX_NAME_BYTES);
        assert!(result.chars().all(|c| c == 'é'));
    }
}
