/// Parses a `#rrggbb` or `rrggbb` hex string into RGB channels.
pub fn parse_hex_color(value: &str) -> Option<[u8; 3]> {
    let digits = value.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
    let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
    let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
    Some([r, g, b])
}

/// Formats a 0..1 score as a percentage with one decimal, e.g. "46.9%".
pub fn format_percent(score: f32) -> String {
    format!("{:.1}%", score * 100.0)
}
