/// Truncates to at most `max_chars` characters, appending an ellipsis.
/// Counts chars rather than bytes so Turkish text never splits mid-character.
pub fn truncate_string(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
