// src/render.rs
//!
//! Terminal rendering of markdown answers.
//!
//! The backend replies in markdown; this walks the pulldown-cmark event
//! stream and emits ANSI-styled text so the output reads well in a
//! terminal without any HTML step.

use pulldown_cmark::{Event, Parser, Tag, TagEnd};

const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const ITALIC: &str = "\x1b[3m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// Render a markdown string for terminal display.
pub fn render_markdown(markdown: &str) -> String {
    let mut out = String::new();
    // Stack of ordered-list counters; None marks a bullet list.
    let mut lists: Vec<Option<u64>> = Vec::new();

    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::Heading { .. }) => {
                ensure_blank_line(&mut out);
                out.push_str(BOLD);
            }
            Event::End(TagEnd::Heading(_)) => {
                out.push_str(RESET);
                out.push('\n');
            }
            Event::Start(Tag::Paragraph) => ensure_blank_line(&mut out),
            Event::End(TagEnd::Paragraph) => out.push('\n'),
            Event::Start(Tag::Strong) => out.push_str(BOLD),
            Event::End(TagEnd::Strong) => out.push_str(RESET),
            Event::Start(Tag::Emphasis) => out.push_str(ITALIC),
            Event::End(TagEnd::Emphasis) => out.push_str(RESET),
            Event::Start(Tag::List(start)) => {
                if lists.is_empty() {
                    ensure_blank_line(&mut out);
                }
                lists.push(start);
            }
            Event::End(TagEnd::List(_)) => {
                lists.pop();
                if lists.is_empty() {
                    out.push('\n');
                }
            }
            Event::Start(Tag::Item) => {
                let indent = "  ".repeat(lists.len());
                match lists.last_mut() {
                    Some(Some(counter)) => {
                        out.push_str(&format!("{indent}{counter}. "));
                        *counter += 1;
                    }
                    _ => out.push_str(&format!("{indent}- ")),
                }
            }
            Event::End(TagEnd::Item) => {
                if !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            Event::Start(Tag::CodeBlock(_)) => {
                ensure_blank_line(&mut out);
                out.push_str(DIM);
            }
            Event::End(TagEnd::CodeBlock) => {
                out.push_str(RESET);
                out.push('\n');
            }
            Event::Code(code) => {
                out.push_str(DIM);
                out.push_str(&code);
                out.push_str(RESET);
            }
            Event::Text(text) => out.push_str(&text),
            Event::SoftBreak | Event::HardBreak => out.push('\n'),
            Event::Rule => {
                ensure_blank_line(&mut out);
                out.push_str("----\n");
            }
            _ => {}
        }
    }

    out.trim_end().to_string()
}

/// Render a failure message as a red-highlighted block.
pub fn render_error(message: &str) -> String {
    format!("{RED}{BOLD}Error:{RESET} {message}")
}

fn ensure_blank_line(out: &mut String) {
    if out.is_empty() {
        return;
    }
    while !out.ends_with("\n\n") {
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip_ansi(text: &str) -> String {
        let re = regex::Regex::new("\x1b\\[[0-9;]*m").unwrap();
        re.replace_all(text, "").to_string()
    }

    #[test]
    fn strong_text_is_bolded() {
        let rendered = render_markdown("**short**");
        assert!(rendered.contains(BOLD));
        assert_eq!(strip_ansi(&rendered), "short");
    }

    #[test]
    fn headings_and_lists_render_as_plain_structure() {
        let rendered = render_markdown("# Intro\n\n1. first\n2. second\n\n- bullet\n");
        let plain = strip_ansi(&rendered);
        assert!(plain.contains("Intro"));
        assert!(plain.contains("  1. first"));
        assert!(plain.contains("  2. second"));
        assert!(plain.contains("  - bullet"));
    }

    #[test]
    fn code_spans_keep_their_text() {
        let plain = strip_ansi(&render_markdown("run `askdoc chat` now"));
        assert_eq!(plain, "run askdoc chat now");
    }

    #[test]
    fn error_block_is_red() {
        let block = render_error("model unavailable");
        assert!(block.contains(RED));
        assert!(block.contains("model unavailable"));
    }
}
