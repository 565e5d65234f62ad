//! GFM rules for HTML to Markdown conversion.

use mdbridge_core::fence_for;
use scraper::ElementRef;

use super::{Filter, Rule};
use crate::node::ElementExt;
use crate::service::Walker;
use crate::utilities::{clean_attribute, single_line, squeeze_blank_lines, strip_trailing_newline};

/// Create all built-in rules
pub fn gfm_rules() -> Vec<Rule> {
    vec![
        paragraph_rule(),
        line_break_rule(),
        heading_rule(),
        blockquote_rule(),
        list_rule(),
        list_item_rule(),
        code_block_rule(),
        horizontal_rule(),
        link_rule(),
        emphasis_rule(),
        strong_rule(),
        strikethrough_rule(),
        code_rule(),
        image_rule(),
        table_rule(),
    ]
}

fn paragraph_rule() -> Rule {
    Rule::for_tag("p", |node, walker| {
        format!("{}\n\n", walker.children(node).trim())
    })
}

fn line_break_rule() -> Rule {
    Rule::for_tag("br", |_, _| "\n".to_string())
}

fn heading_rule() -> Rule {
    Rule::for_tags(&["h1", "h2", "h3", "h4", "h5", "h6"], |node, walker| {
        let level: usize = node.tag_name()[1..].parse().unwrap_or(1);
        format!("{} {}\n\n", "#".repeat(level), walker.children(node).trim())
    })
}

fn blockquote_rule() -> Rule {
    Rule::for_tag("blockquote", |node, walker| {
        let content = squeeze_blank_lines(&walker.children(node));
        let quoted: Vec<String> = content
            .split('\n')
            .map(|line| {
                if line.trim().is_empty() {
                    ">".to_string()
                } else {
                    format!("> {}", line)
                }
            })
            .collect();
        format!("{}\n\n", quoted.join("\n"))
    })
}

fn list_rule() -> Rule {
    Rule::for_tags(&["ul", "ol"], |node, walker| {
        format!("{}\n\n", walker.list(node))
    })
}

fn list_item_rule() -> Rule {
    // Only reached for an <li> outside any list; listed items go through `Walker::list`
    Rule::for_tag("li", |node, walker| walker.list_item(node))
}

fn code_block_rule() -> Rule {
    Rule::for_tag("pre", |node, _| {
        let code_node = node.find_descendant("code");

        let language = code_node
            .and_then(|code| code.attr("class"))
            .and_then(|class| {
                class
                    .split_whitespace()
                    .find_map(|c| c.strip_prefix("language-"))
            })
            .unwrap_or("");

        let code_content = code_node.unwrap_or(*node).text_content();
        let code_content = strip_trailing_newline(&code_content);

        let fence = fence_for(code_content, "```");
        format!("{fence}{language}\n{code_content}\n{fence}\n\n")
    })
}

fn horizontal_rule() -> Rule {
    Rule::for_tag("hr", |_, _| "---\n\n".to_string())
}

fn link_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node| tag == "a" && node.has_attr("href")),
        |node, walker| {
            let href = clean_attribute(node.attr("href"));
            let title_part = node
                .attr("title")
                .map(|t| format!(" \"{}\"", t.replace('"', "\\\"")))
                .unwrap_or_default();

            format!("[{}]({}{})", walker.children(node), href, title_part)
        },
    )
}

fn delimited(node: &ElementRef, walker: &Walker, delimiter: &str) -> String {
    let content = walker.children(node);
    if content.trim().is_empty() {
        return content;
    }

    // Delimiters must hug non-whitespace, so outer spaces move outside
    let trimmed_start = content.trim_start();
    let leading = &content[..content.len() - trimmed_start.len()];
    let trimmed = trimmed_start.trim_end();
    let trailing = &trimmed_start[trimmed.len()..];

    format!("{leading}{delimiter}{trimmed}{delimiter}{trailing}")
}

fn emphasis_rule() -> Rule {
    Rule::for_tags(&["em", "i"], |node, walker| delimited(node, walker, "_"))
}

fn strong_rule() -> Rule {
    Rule::for_tags(&["strong", "b"], |node, walker| delimited(node, walker, "**"))
}

fn strikethrough_rule() -> Rule {
    Rule::for_tags(&["del", "s", "strike"], |node, walker| {
        delimited(node, walker, "~~")
    })
}

fn code_rule() -> Rule {
    Rule::for_tag("code", |node, _| {
        let content = node.text_content();

        // Inside <pre> the fence comes from the code block rule
        if node.parent_tag() == Some("pre") {
            return content;
        }
        if content.is_empty() {
            return String::new();
        }

        // Count backticks needed
        let max_consecutive_backticks = content
            .chars()
            .fold((0, 0), |(max, current), c| {
                if c == '`' {
                    (max.max(current + 1), current + 1)
                } else {
                    (max, 0)
                }
            })
            .0;

        let backticks = "`".repeat(max_consecutive_backticks + 1);
        let needs_space = content.starts_with('`') || content.ends_with('`');

        if needs_space {
            format!("{} {} {}", backticks, content, backticks)
        } else {
            format!("{}{}{}", backticks, content, backticks)
        }
    })
}

fn image_rule() -> Rule {
    Rule::for_tag("img", |node, _| {
        let alt = clean_attribute(node.attr("alt"));
        let src = clean_attribute(node.attr("src"));
        let title_part = node
            .attr("title")
            .map(|t| format!(" \"{}\"", t.replace('"', "\\\"")))
            .unwrap_or_default();

        format!("![{}]({}{})", alt, src, title_part)
    })
}

fn table_rule() -> Rule {
    Rule::for_tag("table", |node, walker| {
        let rows = table_rows(node);
        if rows.is_empty() {
            return String::new();
        }

        let mut lines = Vec::with_capacity(rows.len() + 1);
        for (row_index, row) in rows.iter().enumerate() {
            let cells: Vec<String> = row
                .element_children()
                .filter(|cell| matches!(cell.tag_name(), "th" | "td"))
                .map(|cell| single_line(&walker.children(&cell)).replace('|', "\\|"))
                .collect();
            lines.push(format!("| {} |", cells.join(" | ")));

            if row_index == 0 {
                let separator = vec!["---"; cells.len()].join(" | ");
                lines.push(format!("| {} |", separator));
            }
        }

        format!("{}\n\n", lines.join("\n"))
    })
}

/// Rows of `table` itself, not of tables nested inside its cells
fn table_rows<'a>(table: &ElementRef<'a>) -> Vec<ElementRef<'a>> {
    table
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(|e| e.tag_name() == "tr")
        .filter(|row| {
            row.ancestors()
                .filter_map(ElementRef::wrap)
                .find(|a| a.tag_name() == "table")
                .is_some_and(|owner| owner == *table)
        })
        .collect()
}
