//! Utility functions for HTML and Markdown text handling.

/// Escape text for use in HTML content or a double-quoted attribute value
pub fn escape_html(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }

    result
}

/// Clean an attribute value (trim and handle empty)
pub fn clean_attribute(value: Option<&str>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

/// Drop one trailing newline, as left behind by `<pre>` text content
pub fn strip_trailing_newline(text: &str) -> &str {
    text.strip_suffix('\n').unwrap_or(text)
}

/// Prefix every line after the first with `indent`, leaving blank lines empty
pub fn indent_continuation(text: &str, indent: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            result.push('\n');
            if !line.is_empty() {
                result.push_str(indent);
            }
        }
        result.push_str(line);
    }

    result
}

/// Collapse whitespace runs to single spaces so a table cell stays on one line
pub fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Drop surrounding blank lines and squeeze runs of blank lines to one.
///
/// Lines inside a backtick fence are kept as they are.
pub fn squeeze_blank_lines(text: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    let mut open_fence: Option<usize> = None;

    for line in text.split('\n') {
        let trimmed = line.trim_start();
        let run = trimmed.chars().take_while(|c| *c == '`').count();

        match open_fence {
            Some(len) => {
                if run >= len && trimmed[run..].trim().is_empty() {
                    open_fence = None;
                }
                lines.push(line);
                continue;
            }
            None if run >= 3 => open_fence = Some(run),
            None => {}
        }

        if line.trim().is_empty() {
            if lines.last().is_some_and(|last| !last.is_empty()) {
                lines.push("");
            }
        } else {
            lines.push(line);
        }
    }

    while lines.last().is_some_and(|last| last.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}
