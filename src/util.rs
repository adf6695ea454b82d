//! Small utility helpers used across modules.

/// Strip control characters, then surrounding whitespace.
/// Flags are compared exactly afterwards, so interior spaces are kept ("hello world" is a valid flag).
pub fn sanitize_flag(raw: &str) -> String {
  let cleaned: String = raw.chars().filter(|c| !c.is_control()).collect();
  cleaned.trim().to_string()
}
