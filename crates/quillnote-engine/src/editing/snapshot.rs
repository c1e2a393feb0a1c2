use std::ops::Range;

use crate::editing::{BlockKind, Document, ListKind, NodeId, NodeKind, Position, StyleKind};

/// Immutable render view of a document.
///
/// Hosts draw from a snapshot and talk to the engine in [`Position`]s; the snapshot maps
/// between those and flat `(block index, byte offset)` points in each block's text, which
/// is what a terminal or text widget works with.
///
/// ```rust
/// # use quillnote_engine::editing::{Document, ListKind, Node};
/// let doc = Document::from_nodes(vec![
///     Node::paragraph(vec![Node::text("intro")]),
///     Node::list(ListKind::Ordered, vec![Node::item(vec![Node::text("first")])]),
/// ]).unwrap();
/// let snapshot = doc.snapshot();
/// assert_eq!(snapshot.blocks.len(), 2);
/// assert_eq!(snapshot.blocks[1].list.unwrap().number, 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Document version for change detection
    pub version: u64,
    /// Blocks and list items in document order
    pub blocks: Vec<RenderBlock>,
    /// The same blocks with consecutive list items grouped
    pub content_groups: Vec<ContentGroup>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContentGroup {
    SingleBlock(RenderBlock),
    List {
        kind: ListKind,
        items: Vec<RenderBlock>,
    },
}

/// List membership of a rendered item; `number` counts from 1 within its list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListMarker {
    pub kind: ListKind,
    pub number: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderBlock {
    pub id: NodeId,
    pub kind: BlockKind,
    pub list: Option<ListMarker>,
    /// Visible text of the block
    pub content: String,
    /// One span per text leaf, covering `content` without gaps
    pub spans: Vec<StyledSpan>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StyledSpan {
    pub leaf: NodeId,
    /// Byte range within the block's content
    pub range: Range<usize>,
    /// Styles of the enclosing spans, outermost first
    pub styles: Vec<StyleKind>,
}

impl Snapshot {
    /// Engine position for a byte offset into block `block`'s text. At a boundary between
    /// two spans the later one wins; offsets past the end clamp to the end.
    pub fn position_at(&self, block: usize, offset: usize) -> Option<Position> {
        let block = self.blocks.get(block)?;
        let span = block
            .spans
            .iter()
            .find(|span| offset < span.range.end)
            .or(block.spans.last())?;
        let local = offset.clamp(span.range.start, span.range.end) - span.range.start;
        Some(Position::new(span.leaf, local))
    }

    /// Flat `(block index, byte offset)` point of a text position, if it is in view
    pub fn locate(&self, position: &Position) -> Option<(usize, usize)> {
        self.blocks.iter().enumerate().find_map(|(index, block)| {
            block
                .spans
                .iter()
                .find(|span| span.leaf == position.node)
                .map(|span| (index, span.range.start + position.offset))
        })
    }
}

impl RenderBlock {
    /// Styles in effect at a byte offset of the content
    pub fn styles_at(&self, offset: usize) -> &[StyleKind] {
        self.spans
            .iter()
            .find(|span| span.range.contains(&offset))
            .map(|span| span.styles.as_slice())
            .unwrap_or(&[])
    }
}

impl Document {
    /// Create a snapshot for rendering
    pub fn snapshot(&self) -> Snapshot {
        let mut blocks = Vec::new();
        let mut content_groups = Vec::new();
        for &child in self.children(self.root()) {
            match self.kind(child) {
                Some(NodeKind::Block(_)) => {
                    if let Some(block) = self.render_block(child, None) {
                        blocks.push(block.clone());
                        content_groups.push(ContentGroup::SingleBlock(block));
                    }
                }
                Some(NodeKind::List(kind)) => {
                    let items: Vec<RenderBlock> = self
                        .children(child)
                        .iter()
                        .enumerate()
                        .filter_map(|(index, &item)| {
                            let marker = ListMarker {
                                kind: *kind,
                                number: index + 1,
                            };
                            self.render_block(item, Some(marker))
                        })
                        .collect();
                    blocks.extend(items.iter().cloned());
                    content_groups.push(ContentGroup::List { kind: *kind, items });
                }
                _ => {}
            }
        }
        Snapshot {
            version: self.version(),
            blocks,
            content_groups,
        }
    }

    fn render_block(&self, id: NodeId, list: Option<ListMarker>) -> Option<RenderBlock> {
        let NodeKind::Block(kind) = self.kind(id)? else {
            return None;
        };
        let mut block = RenderBlock {
            id,
            kind: *kind,
            list,
            content: String::new(),
            spans: Vec::new(),
        };
        let mut styles = Vec::new();
        for &child in self.children(id) {
            self.collect_spans(child, &mut styles, &mut block);
        }
        Some(block)
    }

    fn collect_spans(&self, id: NodeId, styles: &mut Vec<StyleKind>, block: &mut RenderBlock) {
        match self.kind(id) {
            Some(NodeKind::Text(content)) => {
                let start = block.content.len();
                block.content.push_str(content);
                block.spans.push(StyledSpan {
                    leaf: id,
                    range: start..block.content.len(),
                    styles: styles.clone(),
                });
            }
            Some(NodeKind::Styled(style)) => {
                styles.push(*style);
                for &child in self.children(id) {
                    self.collect_spans(child, styles, block);
                }
                styles.pop();
            }
            _ => {}
        }
    }
}
