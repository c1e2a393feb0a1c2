use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag as MdTag};

use crate::editing::{BlockKind, Document, ListKind, StyleKind};
use crate::parsing::ParseError;
use crate::parsing::builder::{Element, Tag, build_document};

/// Import a Markdown note.
///
/// Headings deeper than level 3 become level 3, nested lists are flattened, code is kept
/// as plain text and links keep only their text.
pub fn parse_markdown(input: &str) -> Result<Document, ParseError> {
    let mut stack: Vec<(Tag, Vec<Element>)> = vec![(Tag::Transparent, Vec::new())];

    for event in Parser::new_ext(input, Options::ENABLE_STRIKETHROUGH) {
        match event {
            Event::Start(tag) => stack.push((map_tag(&tag), Vec::new())),
            Event::End(_) => {
                if stack.len() > 1
                    && let Some((tag, children)) = stack.pop()
                    && let Some((_, parent)) = stack.last_mut()
                {
                    parent.push(Element::tag(tag, children));
                }
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, children)) = stack.last_mut() {
                    children.push(Element::text(text.into_string()));
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if let Some((_, children)) = stack.last_mut() {
                    children.push(Element::text(" "));
                }
            }
            _ => {}
        }
    }

    let elements = stack.into_iter().next().map(|(_, root)| root).unwrap_or_default();
    build_document(elements)
}

fn map_tag(tag: &MdTag) -> Tag {
    match tag {
        MdTag::Paragraph | MdTag::CodeBlock(_) => Tag::Block(BlockKind::Paragraph),
        MdTag::Heading { level, .. } => Tag::Block(match level {
            HeadingLevel::H1 => BlockKind::Heading1,
            HeadingLevel::H2 => BlockKind::Heading2,
            _ => BlockKind::Heading3,
        }),
        MdTag::BlockQuote(_) => Tag::Block(BlockKind::Blockquote),
        MdTag::List(Some(_)) => Tag::List(ListKind::Ordered),
        MdTag::List(None) => Tag::List(ListKind::Unordered),
        MdTag::Item => Tag::Item,
        MdTag::Emphasis => Tag::Style(StyleKind::Italic),
        MdTag::Strong => Tag::Style(StyleKind::Bold),
        MdTag::Strikethrough => Tag::Style(StyleKind::Strikethrough),
        _ => Tag::Transparent,
    }
}
