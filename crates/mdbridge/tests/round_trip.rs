use mdbridge::node::ElementExt;
use mdbridge::{
    html_to_markdown, markdown_to_html, normalize_markdown, parse_markdown, stringify_markdown,
    BoxError, ConversionOptions, ConversionService, DiagramCodec, DiagramForm, Error, Filter, Rule,
};
use scraper::ElementRef;

fn round_trip(markdown: &str, options: &ConversionOptions) -> String {
    let html = markdown_to_html(markdown, options).unwrap();
    html_to_markdown(&html, options).unwrap()
}

/// Extract the body of the first fenced block tagged `mermaid`
fn mermaid_body(markdown: &str) -> Option<&str> {
    let start = markdown.find("```mermaid\n")? + "```mermaid\n".len();
    let end = markdown[start..].find("\n```")?;
    Some(&markdown[start..start + end])
}

#[test]
fn test_empty_document() {
    assert!(parse_markdown("").children.is_empty());
    assert_eq!(stringify_markdown(&parse_markdown("")), "");
    assert_eq!(markdown_to_html("", &ConversionOptions::default()).unwrap(), "");
    assert_eq!(html_to_markdown("", &ConversionOptions::default()).unwrap(), "");
}

#[test]
fn test_constructs_round_trip() {
    let markdown = concat!(
        "# Title\n\n",
        "## Sub\n\n",
        "Some **bold**, _italic_, ~~gone~~ and `code`.\n\n",
        "> Quote\n\n",
        "1. one\n2. two\n\n",
        "- a\n- b\n\n",
        "[link](https://example.com) ![img](a.png)\n\n",
        "---\n\n",
        "```rust\nfn main() {}\n```\n",
    );

    let result = round_trip(markdown, &ConversionOptions::unsanitized());
    assert_eq!(result, markdown);
}

#[test]
fn test_all_heading_levels_round_trip() {
    for level in 1..=6 {
        let markdown = format!("{} Level {}\n", "#".repeat(level), level);
        assert_eq!(round_trip(&markdown, &ConversionOptions::unsanitized()), markdown);
    }
}

#[test]
fn test_code_fence_without_language() {
    let markdown = "```\nplain <text> & more\n```\n";
    assert_eq!(round_trip(markdown, &ConversionOptions::default()), markdown);
}

#[test]
fn test_diagram_arrow_is_not_escaped() {
    let result = round_trip("```mermaid\nA-->B\n```", &ConversionOptions::default());
    assert_eq!(mermaid_body(&result), Some("A-->B"));
    assert!(!result.contains("&gt;"));
}

#[test]
fn test_diagram_special_characters_survive() {
    let source = r#"A["Label <with> special & chars"] --> B"#;
    let markdown = format!("```mermaid\n{}\n```\n", source);

    for options in [ConversionOptions::default(), ConversionOptions::unsanitized()] {
        let result = round_trip(&markdown, &options);
        assert_eq!(mermaid_body(&result), Some(source));
        assert!(result.contains("<with>"));
        assert!(result.contains(" & "));
        assert!(result.contains("-->"));
    }
}

#[test]
fn test_multiline_diagram_survives() {
    let source = "graph TD\n  A[Start] --> B{Is it?}\n\n  B -->|Yes| C['quoted']";
    let markdown = format!("```mermaid\n{}\n```\n", source);
    let result = round_trip(&markdown, &ConversionOptions::default());
    assert_eq!(result, markdown);
}

#[test]
fn test_script_is_removed_by_default() {
    let html = markdown_to_html(
        "Hello world\n\n<script>alert(1)</script>\n",
        &ConversionOptions::default(),
    )
    .unwrap();
    assert!(!html.contains("script"));
    assert!(!html.contains("alert"));
    assert!(html.contains("Hello world"));
}

#[test]
fn test_script_is_kept_when_unsanitized() {
    let html = markdown_to_html("<script>alert(1)</script>\n", &ConversionOptions::unsanitized())
        .unwrap();
    assert!(html.contains("<script>"));
}

#[test]
fn test_html_input_is_sanitized_before_conversion() {
    let markdown = html_to_markdown(
        "<p>Keep</p><script>alert(1)</script>",
        &ConversionOptions::default(),
    )
    .unwrap();
    assert_eq!(markdown, "Keep\n");
}

#[test]
fn test_table_round_trip() {
    let markdown = "| A | B |\n| --- | --- |\n| 1 | 2 |\n";
    let result = round_trip(markdown, &ConversionOptions::default());
    assert_eq!(result, markdown);

    let separator = result.lines().nth(1).unwrap();
    assert_eq!(separator.matches("---").count(), 2);
}

#[test]
fn test_three_diagram_forms_agree() {
    let forms = [
        r#"<div data-mermaid="true" data-code="A --&gt; B &amp; C"></div>"#,
        r#"<pre><code class="language-mermaid">A --&gt; B &amp; C</code></pre>"#,
        r#"<div data-type="mermaid" data-code="A --&gt; B &amp; C"></div>"#,
    ];

    for options in [ConversionOptions::default(), ConversionOptions::unsanitized()] {
        let results: Vec<String> = forms
            .iter()
            .map(|html| html_to_markdown(html, &options).unwrap())
            .collect();

        assert_eq!(results[0], "```mermaid\nA --> B & C\n```\n");
        assert!(results.iter().all(|r| r == &results[0]));
    }
}

#[test]
fn test_task_list_state_round_trip() {
    let markdown = "- [x] Done\n- [ ] Todo\n";
    for options in [ConversionOptions::default(), ConversionOptions::unsanitized()] {
        assert_eq!(round_trip(markdown, &options), markdown);
    }
}

#[test]
fn test_nested_lists_round_trip() {
    let markdown = "- Outer\n  - Inner\n    1. Deep\n- Next\n";
    assert_eq!(round_trip(markdown, &ConversionOptions::unsanitized()), markdown);
}

#[test]
fn test_normalize() {
    assert_eq!(normalize_markdown("*a*"), "_a_\n");
    assert_eq!(normalize_markdown("Title\n====="), "# Title\n");
    assert_eq!(normalize_markdown("1\\. not a list"), "1\\. not a list\n");
}

#[test]
fn test_stringify_reparses_to_same_tree() {
    let cases = [
        "| a | b |\n| - | - |\n| `x\\|y` | z |",
        "| *a\\|b* | c |\n| --- | --- |\n| 1 | 2 |",
        "| [l](/p \"t\") | `\\|` |\n| --- | --- |",
        "- a\n\n  - x\n\n  * y",
        "1. a\n\n   1. x\n\n   2) y",
        "- [x] Done\n- [ ] Todo\n- plain",
        "1. one\n   - sub\n     1. deep\n2. two",
        "3. three\n4. four",
        "- a\n\n* b",
        "\\# not a heading\n\n1\\. not a list\n\n\\- not a bullet\n\n\\> not a quote",
        "[link](https://example.com \"Title\") and [spaced](<a b>)",
        "<div>\nraw\n</div>\n\nafter <span>inline</span> html",
        "> quote with **bold**\n>\n> - item",
        "Text with a  \nhard break and `code | pipe`",
        "````\n```\ninner\n```\n````",
        "snake_case and *emphasis*inside",
    ];

    for source in cases {
        let tree = parse_markdown(source);
        let markdown = stringify_markdown(&tree);
        assert_eq!(
            parse_markdown(&markdown),
            tree,
            "{:?} stringified as {:?}",
            source,
            markdown
        );
    }
}

#[test]
fn test_custom_rule_on_service() {
    let mut service = ConversionService::new();
    service.add_rule(
        "underline",
        Rule::new(Filter::tags(&["u", "ins"]), |node, walker| {
            format!("++{}++", walker.children(node))
        }),
    );

    let markdown = service
        .html_to_markdown(
            "<p><u>under</u> and <ins>inserted</ins></p>",
            &ConversionOptions::unsanitized(),
        )
        .unwrap();
    assert_eq!(markdown, "++under++ and ++inserted++\n");
}

struct FigureForm;

impl DiagramForm for FigureForm {
    fn name(&self) -> &'static str {
        "figure"
    }

    fn extract(&self, element: &ElementRef<'_>) -> Option<String> {
        if element.tag_name() == "figure" && element.has_class("diagram") {
            Some(element.text_content().trim().to_string())
        } else {
            None
        }
    }
}

#[test]
fn test_additional_diagram_form() {
    let html = r#"<figure class="diagram">A --&gt; B</figure>"#;

    let plain = ConversionService::new()
        .html_to_markdown(html, &ConversionOptions::unsanitized())
        .unwrap();
    assert_eq!(plain, "A --> B\n");

    let service = ConversionService::new().with_diagrams(DiagramCodec::new().with_form(FigureForm));
    let markdown = service
        .html_to_markdown(html, &ConversionOptions::unsanitized())
        .unwrap();
    assert_eq!(markdown, "```mermaid\nA --> B\n```\n");
}

#[test]
fn test_sanitizer_failure_is_returned_unmodified() {
    #[derive(Debug)]
    struct Rejected;

    impl std::fmt::Display for Rejected {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("rejected by policy")
        }
    }

    impl std::error::Error for Rejected {}

    fn reject(_: &str) -> Result<String, BoxError> {
        Err(Box::new(Rejected))
    }

    let service = ConversionService::with_sanitizer(reject);
    let err = service
        .markdown_to_html("# Title", &ConversionOptions::default())
        .unwrap_err();

    let Error::Sanitizer(inner) = err;
    assert!(inner.downcast_ref::<Rejected>().is_some());
}
