use std::sync::OnceLock;

use regex::Regex;

use crate::editing::{BlockKind, Document, ListKind, NodeId, NodeKind, StyleKind};
use crate::parsing::ParseError;
use crate::parsing::builder::{Element, Tag, build_document};
use crate::parsing::cursor::Cursor;

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^<(/)?([A-Za-z][A-Za-z0-9]*)\b[^<>]*?(/)?\s*>$")
            .expect("valid tag regex")
    })
}

/// Elements that never have content or a closing tag
const VOID: &[&str] = &["br", "hr", "img", "input", "meta", "link", "wbr"];

/// Parse note markup into a document.
///
/// Accepts the tags [`to_html`] writes plus common synonyms; anything else is dropped
/// keeping its content. Unclosed elements are closed at the end of input and stray
/// closing tags are ignored, but a `<` that opens a tag without ever closing it is an
/// error.
pub fn parse_html(input: &str) -> Result<Document, ParseError> {
    build_document(parse_elements(input)?)
}

struct Frame {
    name: String,
    tag: Tag,
    children: Vec<Element>,
}

fn parse_elements(input: &str) -> Result<Vec<Element>, ParseError> {
    let mut stack = vec![Frame {
        name: String::new(),
        tag: Tag::Transparent,
        children: Vec::new(),
    }];
    let mut cur = Cursor::new(input);

    while !cur.eof() {
        if cur.starts_with(b"<!--") {
            let end = cur
                .find("-->")
                .ok_or(ParseError::UnterminatedTag { offset: cur.pos() })?;
            cur.bump_n(end + 3 - cur.pos());
            continue;
        }
        if cur.peek() == Some(b'<') {
            let start = cur.pos();
            let end = cur
                .find(">")
                .ok_or(ParseError::UnterminatedTag { offset: start })?;
            let raw = &input[start..=end];
            if raw.starts_with("<!") || raw.starts_with("<?") {
                cur.bump_n(raw.len());
                continue;
            }
            let Some(caps) = tag_regex().captures(raw) else {
                // Not markup, e.g. an unescaped "a < b"
                cur.bump();
                push_text(&mut stack, "<");
                continue;
            };
            cur.bump_n(raw.len());

            let closing = caps.get(1).is_some();
            let name = caps[2].to_ascii_lowercase();
            if closing {
                close(&mut stack, &name);
            } else if caps.get(3).is_some() || VOID.contains(&name.as_str()) {
                attach(&mut stack, Element::tag(Tag::from_name(&name), Vec::new()));
            } else {
                stack.push(Frame {
                    tag: Tag::from_name(&name),
                    name,
                    children: Vec::new(),
                });
            }
            continue;
        }
        let text = cur.take_until(b'<');
        push_text(&mut stack, &html_escape::decode_html_entities(text));
    }

    while stack.len() > 1 {
        pop(&mut stack);
    }
    Ok(stack.pop().map(|root| root.children).unwrap_or_default())
}

fn attach(stack: &mut [Frame], element: Element) {
    if let Some(top) = stack.last_mut() {
        top.children.push(element);
    }
}

fn push_text(stack: &mut [Frame], text: &str) {
    let Some(top) = stack.last_mut() else {
        return;
    };
    if let Some(Element::Text(previous)) = top.children.last_mut() {
        previous.push_str(text);
    } else {
        top.children.push(Element::text(text));
    }
}

fn pop(stack: &mut Vec<Frame>) {
    if let Some(frame) = stack.pop() {
        attach(stack, Element::tag(frame.tag, frame.children));
    }
}

/// Close the innermost open element called `name`, and anything still open inside it
fn close(stack: &mut Vec<Frame>, name: &str) {
    let Some(depth) = stack.iter().skip(1).rposition(|frame| frame.name == name) else {
        return;
    };
    while stack.len() > depth + 1 {
        pop(stack);
    }
}

/// Serialise a document as note markup, one top-level block or list item per line
pub fn to_html(document: &Document) -> String {
    let mut out = String::new();
    for &child in document.children(document.root()) {
        match document.kind(child) {
            Some(NodeKind::Block(kind)) => {
                write_block(document, child, block_tag(*kind), &mut out);
            }
            Some(NodeKind::List(kind)) => {
                let tag = match kind {
                    ListKind::Unordered => "ul",
                    ListKind::Ordered => "ol",
                };
                out.push_str(&format!("<{tag}>\n"));
                for &item in document.children(child) {
                    write_block(document, item, "li", &mut out);
                }
                out.push_str(&format!("</{tag}>\n"));
            }
            _ => {}
        }
    }
    out
}

fn block_tag(kind: BlockKind) -> &'static str {
    match kind {
        BlockKind::Paragraph => "p",
        BlockKind::Heading1 => "h1",
        BlockKind::Heading2 => "h2",
        BlockKind::Heading3 => "h3",
        BlockKind::Blockquote => "blockquote",
        BlockKind::ListItem => "li",
    }
}

fn style_tag(style: StyleKind) -> &'static str {
    match style {
        StyleKind::Bold => "b",
        StyleKind::Italic => "i",
        StyleKind::Underline => "u",
        StyleKind::Strikethrough => "s",
    }
}

fn write_block(document: &Document, block: NodeId, tag: &str, out: &mut String) {
    out.push_str(&format!("<{tag}>"));
    for &child in document.children(block) {
        write_inline(document, child, out);
    }
    out.push_str(&format!("</{tag}>\n"));
}

fn write_inline(document: &Document, node: NodeId, out: &mut String) {
    match document.kind(node) {
        Some(NodeKind::Text(content)) if content.is_empty() => out.push_str("<br>"),
        Some(NodeKind::Text(content)) => out.push_str(&html_escape::encode_text(content)),
        Some(NodeKind::Styled(style)) => {
            let tag = style_tag(*style);
            out.push_str(&format!("<{tag}>"));
            for &child in document.children(node) {
                write_inline(document, child, out);
            }
            out.push_str(&format!("</{tag}>"));
        }
        _ => {}
    }
}
