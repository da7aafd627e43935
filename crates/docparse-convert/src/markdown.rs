//! Markdown to HTML rendering.

use pulldown_cmark::{html, Event, Options, Parser, Tag};

/// Render Markdown text to HTML.
///
/// CommonMark plus pipe tables and `~~strikethrough~~`. Raw HTML in the source
/// is never passed through: inline HTML is escaped in place, and an HTML block
/// becomes an escaped paragraph.
pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let mut events = Vec::new();
    let mut html_block = String::new();
    let mut inline_depth = 0usize;

    for event in Parser::new_ext(markdown, options) {
        let event = match event {
            Event::Html(raw) if inline_depth == 0 => {
                html_block.push_str(&raw);
                continue;
            }
            Event::Html(raw) => Event::Text(raw),
            Event::Start(Tag::Strikethrough) => Event::Html("<s>".into()),
            Event::End(Tag::Strikethrough) => Event::Html("</s>".into()),
            other => other,
        };

        flush_html_block(&mut html_block, &mut events);

        match &event {
            Event::Start(tag) if holds_inline(tag) => inline_depth += 1,
            Event::End(tag) if holds_inline(tag) => inline_depth = inline_depth.saturating_sub(1),
            _ => {}
        }
        events.push(event);
    }
    flush_html_block(&mut html_block, &mut events);

    let mut output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut output, events.into_iter());
    output
}

/// Containers whose raw HTML is inline rather than a block of its own.
fn holds_inline(tag: &Tag) -> bool {
    matches!(
        tag,
        Tag::Paragraph | Tag::Heading(..) | Tag::TableCell | Tag::Item
    )
}

fn flush_html_block<'a>(block: &mut String, events: &mut Vec<Event<'a>>) {
    if block.is_empty() {
        return;
    }
    let text = block.trim_end_matches('\n').to_string();
    block.clear();

    events.push(Event::Start(Tag::Paragraph));
    events.push(Event::Text(text.into()));
    events.push(Event::End(Tag::Paragraph));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading() {
        assert_eq!(render_markdown("# Hi"), "<h1>Hi</h1>\n");
    }

    #[test]
    fn test_block_and_inline_elements() {
        let html = render_markdown(
            r#"## Section

Some *emphasis*, a [link](https://example.com) and `code`.

- one
- two

> quoted

```
let x = 1;
```
"#,
        );

        assert!(html.contains("<h2>Section</h2>"));
        assert!(html.contains("<em>emphasis</em>"));
        assert!(html.contains(r#"<a href="https://example.com">link</a>"#));
        assert!(html.contains("<code>code</code>"));
        assert!(html.contains("<ul>\n<li>one</li>\n<li>two</li>\n</ul>"));
        assert!(html.contains("<blockquote>\n<p>quoted</p>\n</blockquote>"));
        assert!(html.contains("<pre><code>let x = 1;\n</code></pre>"));
    }

    #[test]
    fn test_pipe_tables() {
        let html = render_markdown("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.starts_with("<table>"));
        assert!(html.contains("<th>a</th>"));
        assert!(html.contains("<td>2</td>"));
        assert!(!html.contains("<p>|"));
    }

    #[test]
    fn test_strikethrough() {
        assert_eq!(render_markdown("~~gone~~"), "<p><s>gone</s></p>\n");
    }

    #[test]
    fn test_html_block_becomes_escaped_paragraph() {
        assert_eq!(
            render_markdown("<div>\nhi\n</div>\n"),
            "<p>&lt;div&gt;\nhi\n&lt;/div&gt;</p>\n"
        );

        let html = render_markdown("intro\n\n<div>x</div>\n\noutro");
        assert_eq!(html, "<p>intro</p>\n<p>&lt;div&gt;x&lt;/div&gt;</p>\n<p>outro</p>\n");
    }

    #[test]
    fn test_raw_html_is_escaped() {
        let html = render_markdown("hello <script>alert(1)</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let text = "# Title\n\nBody with **bold** text.";
        assert_eq!(render_markdown(text), render_markdown(text));
        assert_eq!(render_markdown(""), "");
    }
}
