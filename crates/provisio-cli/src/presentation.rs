//! Table helpers shared by the handlers.

/// ANSI styles for terminal output.
pub mod style {
    pub const GREEN: &str = "\x1b[32m";
    pub const RED: &str = "\x1b[31m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const BOLD: &str = "\x1b[1m";
    pub const RESET: &str = "\x1b[0m";
}

/// Truncate to `max_len` characters, ending in "..." when cut.
///
/// ```rust
/// use provisio_cli::presentation::truncate_string;
///
/// assert_eq!(truncate_string("filesystem", 20), "filesystem");
/// assert_eq!(truncate_string("server-filesystem", 10), "server-...");
/// ```
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{kept}...")
}

pub fn print_separator(width: usize) {
    println!("{}", "-".repeat(width));
}
