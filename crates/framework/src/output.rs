//! Terminal styling helpers shared by error messages and help.

use console::style;
use std::io::Write;

pub fn gray(text: impl AsRef<str>) -> String {
    style(text.as_ref()).black().bright().to_string()
}

/// Flag and command names inside gray prose.
pub fn highlight(text: impl AsRef<str>) -> String {
    style(text.as_ref()).white().bold().to_string()
}

/// Values echoed back to the user.
pub fn bright(text: impl AsRef<str>) -> String {
    style(text.as_ref()).white().bright().to_string()
}

pub fn bold(text: impl AsRef<str>) -> String {
    style(text.as_ref()).bold().to_string()
}

pub fn red(text: impl AsRef<str>) -> String {
    style(text.as_ref()).red().to_string()
}

pub fn underline(text: impl AsRef<str>) -> String {
    style(text.as_ref()).underlined().to_string()
}

/// Print an error block: `Error: <message>`.
///
/// Write failures are ignored; there is nowhere left to report them.
pub fn error(out: &mut dyn Write, message: &str) {
    let _ = writeln!(out, "{} {}", red("Error:"), message);
}

/// Raw text to a stream, without a trailing newline added.
pub fn emit(out: &mut dyn Write, text: &str) {
    let _ = out.write_all(text.as_bytes());
    let _ = out.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_block_has_prefix() {
        console::set_colors_enabled(false);
        let mut buf = Vec::new();
        error(&mut buf, "something broke");
        assert_eq!(String::from_utf8(buf).unwrap(), "Error: something broke\n");
    }

    #[test]
    fn helpers_keep_text_when_colors_are_off() {
        console::set_colors_enabled(false);
        assert_eq!(gray("a"), "a");
        assert_eq!(highlight("--flag"), "--flag");
        assert_eq!(console::measure_text_width(&bold("abc")), 3);
    }
}
