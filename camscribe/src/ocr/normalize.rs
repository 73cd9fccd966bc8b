use regex::Regex;
use std::sync::OnceLock;

fn unprintable() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\x20-\x7E\t\n\x0B\x0C\r]+").expect("valid regex"))
}

fn whitespace_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"))
}

/// Clean raw OCR output.
///
/// Every run of characters outside printable ASCII becomes one space, every
/// whitespace run becomes one space, and the ends are trimmed. Applying it to
/// its own output changes nothing.
pub fn normalize_text(raw: &str) -> String {
    let text = unprintable().replace_all(raw, " ");
    let text = whitespace_run().replace_all(&text, " ");
    text.trim().to_string()
}
