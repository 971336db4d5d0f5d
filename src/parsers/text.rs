use regex::Regex;
use std::sync::LazyLock;

/// Horizontal whitespace hanging off the end of a line
static TRAILING_WS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+\n").unwrap());

/// Three or more newlines in a row
static BLANK_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Two or more spaces/tabs in a row
static SPACE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]{2,}").unwrap());

/// Normalizes extracted text into its canonical plain-text form
///
/// The rules run in a fixed order, each one on the output of the previous:
/// - carriage returns are removed
/// - trailing spaces/tabs are stripped from every line
/// - runs of blank lines are capped at one blank line
/// - runs of spaces/tabs collapse to a single space
/// - the whole result is trimmed
///
/// Newlines between distinct fragments are kept, so block structure
/// survives. `None` is treated as empty input.
pub fn normalize<'a>(input: impl Into<Option<&'a str>>) -> String {
    let text = input.into().unwrap_or_default().replace('\r', "");
    let text = TRAILING_WS.replace_all(&text, "\n");
    let text = BLANK_RUNS.replace_all(&text, "\n\n");
    let text = SPACE_RUNS.replace_all(&text, " ");
    text.trim().to_string()
}

/// Length of normalized text as the guard measures it
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}
