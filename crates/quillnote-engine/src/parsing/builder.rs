use crate::editing::{BlockKind, Document, ListKind, Node, StyleKind};
use crate::parsing::ParseError;

/// What a markup element means to the document model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Block(BlockKind),
    Item,
    List(ListKind),
    Style(StyleKind),
    LineBreak,
    /// Unknown or presentational element: dropped, its content kept
    Transparent,
}

impl Tag {
    /// Map an HTML element name (any case) onto the nearest model kind
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "p" | "div" => Tag::Block(BlockKind::Paragraph),
            "h1" => Tag::Block(BlockKind::Heading1),
            "h2" => Tag::Block(BlockKind::Heading2),
            "h3" | "h4" | "h5" | "h6" => Tag::Block(BlockKind::Heading3),
            "blockquote" => Tag::Block(BlockKind::Blockquote),
            "li" => Tag::Item,
            "ul" => Tag::List(ListKind::Unordered),
            "ol" => Tag::List(ListKind::Ordered),
            "b" | "strong" => Tag::Style(StyleKind::Bold),
            "i" | "em" => Tag::Style(StyleKind::Italic),
            "u" => Tag::Style(StyleKind::Underline),
            "s" | "strike" | "del" => Tag::Style(StyleKind::Strikethrough),
            "br" => Tag::LineBreak,
            _ => Tag::Transparent,
        }
    }
}

/// Loosely structured markup tree produced by the front ends
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Text(String),
    Tag { tag: Tag, children: Vec<Element> },
}

impl Element {
    pub fn tag(tag: Tag, children: Vec<Element>) -> Self {
        Element::Tag { tag, children }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Element::Text(content.into())
    }
}

/// Flatten markup into a valid document.
///
/// - bare inline content at the top level is gathered into an implicit paragraph
/// - blocks nested inside blocks are flattened into their parent's inline content
/// - nested lists are flattened to a single level, in document order
/// - whitespace-only text directly under the top level or a list is ignored
/// - an element with no text becomes a block holding the empty placeholder
pub fn build_document(elements: Vec<Element>) -> Result<Document, ParseError> {
    let mut builder = Builder::default();
    builder.top_level(elements);
    builder.flush();
    let nodes = builder.out.into_iter().map(Node::normalized).collect();
    Ok(Document::from_nodes(nodes)?)
}

#[derive(Default)]
struct Builder {
    out: Vec<Node>,
    pending: Vec<Node>,
}

impl Builder {
    fn flush(&mut self) {
        if !self.pending.is_empty() {
            let children = std::mem::take(&mut self.pending);
            self.out.push(Node::paragraph(children));
        }
    }

    fn top_level(&mut self, elements: Vec<Element>) {
        for element in elements {
            match element {
                Element::Text(text) if text.trim().is_empty() && self.pending.is_empty() => {}
                Element::Text(text) => self.pending.push(Node::text(text)),
                Element::Tag { tag, children } => match tag {
                    Tag::Block(kind) => {
                        self.flush();
                        self.out.push(Node::block(kind, inline(children)));
                    }
                    // A stray item reads as a plain paragraph
                    Tag::Item => {
                        self.flush();
                        self.out.push(Node::paragraph(inline(children)));
                    }
                    Tag::List(kind) => {
                        self.flush();
                        let mut items = Vec::new();
                        list_items(children, &mut items);
                        if !items.is_empty() {
                            self.out.push(Node::list(kind, items));
                        }
                    }
                    Tag::LineBreak => self.flush(),
                    Tag::Style(style) => self.pending.push(Node::styled(style, inline(children))),
                    Tag::Transparent => self.top_level(children),
                },
            }
        }
    }
}

fn list_items(elements: Vec<Element>, items: &mut Vec<Node>) {
    let mut loose = Vec::new();
    for element in elements {
        match element {
            Element::Text(text) if text.trim().is_empty() && loose.is_empty() => {}
            Element::Tag {
                tag: Tag::Item,
                children,
            } => {
                push_item(&mut loose, items);
                item(children, items);
            }
            Element::Tag {
                tag: Tag::List(_),
                children,
            } => {
                push_item(&mut loose, items);
                list_items(children, items);
            }
            other => loose.extend(inline(vec![other])),
        }
    }
    push_item(&mut loose, items);
}

/// One item, followed by the items of any list nested inside it
fn item(children: Vec<Element>, items: &mut Vec<Node>) {
    let mut content = Vec::new();
    let mut emitted = false;
    for child in children {
        match child {
            Element::Tag {
                tag: Tag::List(_),
                children,
            } => {
                if !emitted || !content.is_empty() {
                    items.push(Node::item(std::mem::take(&mut content)));
                    emitted = true;
                }
                list_items(children, items);
            }
            other => content.extend(inline(vec![other])),
        }
    }
    if !emitted || !content.is_empty() {
        items.push(Node::item(content));
    }
}

fn push_item(loose: &mut Vec<Node>, items: &mut Vec<Node>) {
    if !loose.is_empty() {
        items.push(Node::item(std::mem::take(loose)));
    }
}

/// Inline content of a run of elements; structure below inline level is flattened
fn inline(elements: Vec<Element>) -> Vec<Node> {
    let mut out = Vec::new();
    for element in elements {
        match element {
            Element::Text(text) => out.push(Node::text(text)),
            Element::Tag { tag, children } => match tag {
                Tag::Style(style) => out.push(Node::styled(style, inline(children))),
                Tag::LineBreak => out.push(Node::text("")),
                Tag::Block(_) | Tag::Item | Tag::List(_) | Tag::Transparent => {
                    out.extend(inline(children))
                }
            },
        }
    }
    out
}
