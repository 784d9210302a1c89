//! Splitting the question-generation response into questions.

/// Split raw model output into questions, one per non-blank line.
///
/// Leading list decoration (digits, `.`, `-` and whitespace) is stripped,
/// so `"1. What is magma?"` and `"- What is magma?"` both become
/// `"What is magma?"`. The model output is untrusted: any number of lines
/// is passed through, in order, duplicates included.
pub fn parse_questions(raw: &str) -> Vec<String> {
    raw.lines()
        .filter(|line| !line.trim().is_empty())
        .map(strip_list_marker)
        .collect()
}

fn strip_list_marker(line: &str) -> String {
    line.trim_start_matches(|c: char| c.is_ascii_digit() || c == '.' || c == '-' || c.is_whitespace())
        .trim()
        .to_string()
}
