// Simple helpers to avoid accidental printing of secrets in logs.

/// Shorten a 0x-prefixed hex value (address, hash) to its head and tail.
pub fn short_hex(s: &str) -> String {
    if s.len() <= 14 || !s.is_ascii() {
        return s.to_string();
    }
    format!("{}…{}", &s[..8], &s[s.len() - 4..])
}
