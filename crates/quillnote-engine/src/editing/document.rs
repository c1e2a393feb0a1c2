use std::collections::HashMap;
use std::fmt;

use uuid::Uuid;

use crate::editing::FormatError;

/// Inline emphasis carried by a styled span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleKind {
    Bold,
    Italic,
    Underline,
    Strikethrough,
}

impl StyleKind {
    pub const ALL: [StyleKind; 4] = [
        StyleKind::Bold,
        StyleKind::Italic,
        StyleKind::Underline,
        StyleKind::Strikethrough,
    ];
}

/// Paragraph-level structural unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Paragraph,
    Heading1,
    Heading2,
    Heading3,
    Blockquote,
    ListItem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    Unordered,
    Ordered,
}

/// Handle to a node slot in a [`Document`] arena.
///
/// Ids carry the lineage of the document that allocated them, so a handle taken from an
/// unrelated document is rejected rather than silently aliasing another node. Slots are
/// never reused: once a toggle frees a node, every handle to it stays invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    tree: Uuid,
    index: usize,
}

impl NodeId {
    /// Slot index inside the owning arena
    pub fn index(self) -> usize {
        self.index
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index)
    }
}

/// What a node slot holds. `Root` is the single document container and never matches
/// any ancestor search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Root,
    Text(String),
    Styled(StyleKind),
    Block(BlockKind),
    List(ListKind),
}

impl NodeKind {
    pub fn is_text(&self) -> bool {
        matches!(self, NodeKind::Text(_))
    }

    /// Text and styled spans: content that must live inside a block
    pub fn is_inline(&self) -> bool {
        matches!(self, NodeKind::Text(_) | NodeKind::Styled(_))
    }

    pub fn is_block(&self) -> bool {
        matches!(self, NodeKind::Block(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, NodeKind::List(_))
    }

    pub fn is_list_item(&self) -> bool {
        matches!(self, NodeKind::Block(BlockKind::ListItem))
    }

    pub fn is_styled(&self, style: StyleKind) -> bool {
        matches!(self, NodeKind::Styled(s) if *s == style)
    }

    fn describe(&self) -> &'static str {
        match self {
            NodeKind::Root => "root",
            NodeKind::Text(_) => "text",
            NodeKind::Styled(_) => "styled span",
            NodeKind::Block(_) => "block",
            NodeKind::List(_) => "list",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Slot {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

/// The structural model being edited.
///
/// A `Document` is an arena of node slots hanging off a single root. Formatting commands
/// never touch the caller's value: they clone it, mutate the clone and hand it back in a
/// [`Patch`](crate::editing::Patch) together with the new selection.
///
/// ```rust
/// # use quillnote_engine::editing::{Document, Node};
/// let doc = Document::from_nodes(vec![Node::paragraph(vec![Node::text("hello world")])]).unwrap();
/// assert_eq!(doc.plain_text(), "hello world");
/// assert_eq!(doc.blocks().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Document {
    pub(crate) tree: Uuid,
    pub(crate) slots: Vec<Option<Slot>>,
    pub(crate) root: NodeId,
    /// Incremented by every toggle that changes the tree
    pub(crate) version: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document (a root with no blocks)
    pub fn new() -> Self {
        let tree = Uuid::new_v4();
        Self {
            tree,
            slots: vec![Some(Slot {
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
            })],
            root: NodeId { tree, index: 0 },
            version: 0,
        }
    }

    /// Build a document from value nodes, rejecting trees that break an invariant
    pub fn from_nodes(nodes: Vec<Node>) -> Result<Self, FormatError> {
        let mut doc = Self::new();
        let root = doc.root;
        for node in nodes {
            let id = doc.build(node);
            doc.link(root, id);
        }
        doc.check_invariants()?;
        Ok(doc)
    }

    fn build(&mut self, node: Node) -> NodeId {
        match node {
            Node::Text { content } => self.alloc(NodeKind::Text(content)),
            Node::Styled { style, children } => {
                self.build_container(NodeKind::Styled(style), children)
            }
            Node::Block { kind, children } => self.build_container(NodeKind::Block(kind), children),
            Node::List { kind, items } => self.build_container(NodeKind::List(kind), items),
        }
    }

    fn build_container(&mut self, kind: NodeKind, children: Vec<Node>) -> NodeId {
        let id = self.alloc(kind);
        for child in children {
            let child = self.build(child);
            self.link(id, child);
        }
        id
    }

    /// Append a freshly allocated node; both ids are known to be live.
    fn link(&mut self, parent: NodeId, child: NodeId) {
        if let Some(Some(slot)) = self.slots.get_mut(child.index) {
            slot.parent = Some(parent);
        }
        if let Some(Some(slot)) = self.slots.get_mut(parent.index) {
            slot.children.push(child);
        }
    }

    /// Copy of the live tree into a fresh arena, without the slots freed by earlier edits.
    ///
    /// The copy has a new lineage, so ids of this document are foreign to it; the returned
    /// map translates every live id to its counterpart. The version is kept.
    pub fn compacted(&self) -> (Document, HashMap<NodeId, NodeId>) {
        let mut doc = Self::new();
        doc.version = self.version;
        let mut ids = HashMap::new();
        ids.insert(self.root, doc.root);
        let root = doc.root;
        for &child in self.children(self.root) {
            self.copy_into(&mut doc, root, child, &mut ids);
        }
        (doc, ids)
    }

    fn copy_into(
        &self,
        doc: &mut Document,
        parent: NodeId,
        id: NodeId,
        ids: &mut HashMap<NodeId, NodeId>,
    ) {
        let Some(kind) = self.kind(id) else {
            return;
        };
        let copy = doc.alloc(kind.clone());
        doc.link(parent, copy);
        ids.insert(id, copy);
        for &child in self.children(id) {
            self.copy_into(doc, copy, child, ids);
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// True when the document holds no blocks at all
    pub fn is_empty(&self) -> bool {
        self.children(self.root).is_empty()
    }

    pub(crate) fn slot(&self, id: NodeId) -> Result<&Slot, FormatError> {
        if id.tree != self.tree {
            return Err(FormatError::unknown_node(id));
        }
        self.slots
            .get(id.index)
            .and_then(Option::as_ref)
            .ok_or_else(|| FormatError::unknown_node(id))
    }

    pub(crate) fn slot_mut(&mut self, id: NodeId) -> Result<&mut Slot, FormatError> {
        if id.tree != self.tree {
            return Err(FormatError::unknown_node(id));
        }
        self.slots
            .get_mut(id.index)
            .and_then(Option::as_mut)
            .ok_or_else(|| FormatError::unknown_node(id))
    }

    pub(crate) fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId {
            tree: self.tree,
            index: self.slots.len(),
        };
        self.slots.push(Some(Slot {
            kind,
            parent: None,
            children: Vec::new(),
        }));
        id
    }

    /// Release a detached node and everything below it
    pub(crate) fn free(&mut self, id: NodeId) {
        if id.tree != self.tree || id == self.root {
            return;
        }
        if let Some(slot) = self.slots.get_mut(id.index).and_then(Option::take) {
            for child in slot.children {
                self.free(child);
            }
        }
    }

    pub(crate) fn bump_version(&mut self) {
        self.version += 1;
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.slot(id).ok().map(|slot| &slot.kind)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id).ok().and_then(|slot| slot.parent)
    }

    /// Children of a node; empty for leaves and for ids this document does not own
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.slot(id)
            .map(|slot| slot.children.as_slice())
            .unwrap_or(&[])
    }

    /// Content of a text node
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Text(content) => Some(content.as_str()),
            _ => None,
        }
    }

    /// True when `id` is live and attached under this document's root
    pub fn contains(&self, id: NodeId) -> bool {
        let mut current = id;
        // Parent chains are acyclic; the bound only guards against a corrupted arena.
        for _ in 0..self.slots.len() {
            if current == self.root {
                return self.slot(current).is_ok();
            }
            match self.parent(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
        false
    }

    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&child| child == id)
    }

    /// Child indices from the root down to `id`
    pub fn path(&self, id: NodeId) -> Option<Vec<usize>> {
        if !self.contains(id) {
            return None;
        }
        let mut path = Vec::new();
        let mut current = id;
        while current != self.root {
            path.push(self.index_in_parent(current)?);
            current = self.parent(current)?;
        }
        path.reverse();
        Some(path)
    }

    pub fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Byte length of all text below `id`
    pub fn text_len(&self, id: NodeId) -> usize {
        match self.kind(id) {
            Some(NodeKind::Text(content)) => content.len(),
            Some(_) => self
                .children(id)
                .iter()
                .map(|&child| self.text_len(child))
                .sum(),
            None => 0,
        }
    }

    /// Flattened visible text below `id`
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.kind(id) {
            Some(NodeKind::Text(content)) => out.push_str(content),
            Some(_) => {
                for &child in self.children(id) {
                    self.collect_text(child, out);
                }
            }
            None => {}
        }
    }

    /// Visible text of the whole document, one line per block
    pub fn plain_text(&self) -> String {
        self.blocks()
            .into_iter()
            .map(|block| self.text_content(block))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Top-level blocks and list items in document order
    pub fn blocks(&self) -> Vec<NodeId> {
        let mut blocks = Vec::new();
        for &child in self.children(self.root) {
            match self.kind(child) {
                Some(NodeKind::List(_)) => blocks.extend_from_slice(self.children(child)),
                Some(NodeKind::Block(_)) => blocks.push(child),
                _ => {}
            }
        }
        blocks
    }

    /// Text leaves below `id` in document order
    pub fn text_leaves(&self, id: NodeId) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        self.collect_leaves(id, &mut leaves);
        leaves
    }

    fn collect_leaves(&self, id: NodeId, out: &mut Vec<NodeId>) {
        match self.kind(id) {
            Some(NodeKind::Text(_)) => out.push(id),
            Some(_) => {
                for &child in self.children(id) {
                    self.collect_leaves(child, out);
                }
            }
            None => {}
        }
    }

    pub fn first_leaf(&self, id: NodeId) -> Option<NodeId> {
        match self.kind(id)? {
            NodeKind::Text(_) => Some(id),
            _ => self
                .children(id)
                .iter()
                .find_map(|&child| self.first_leaf(child)),
        }
    }

    pub fn last_leaf(&self, id: NodeId) -> Option<NodeId> {
        match self.kind(id)? {
            NodeKind::Text(_) => Some(id),
            _ => self
                .children(id)
                .iter()
                .rev()
                .find_map(|&child| self.last_leaf(child)),
        }
    }

    /// Value form of the subtree at `id` (`None` for the root or unknown ids)
    pub fn node(&self, id: NodeId) -> Option<Node> {
        let children = || -> Vec<Node> {
            self.children(id)
                .iter()
                .filter_map(|&child| self.node(child))
                .collect()
        };
        Some(match self.kind(id)? {
            NodeKind::Root => return None,
            NodeKind::Text(content) => Node::Text {
                content: content.clone(),
            },
            NodeKind::Styled(style) => Node::Styled {
                style: *style,
                children: children(),
            },
            NodeKind::Block(kind) => Node::Block {
                kind: *kind,
                children: children(),
            },
            NodeKind::List(kind) => Node::List {
                kind: *kind,
                items: children(),
            },
        })
    }

    /// Value form of the top-level sequence
    pub fn to_nodes(&self) -> Vec<Node> {
        self.children(self.root)
            .iter()
            .filter_map(|&child| self.node(child))
            .collect()
    }

    /// Value form with adjacent text and same-style spans merged, for structural comparison
    pub fn normalized_nodes(&self) -> Vec<Node> {
        self.to_nodes().into_iter().map(Node::normalized).collect()
    }

    /// Verify the structural invariants of the tree.
    ///
    /// Inline nodes never sit under the root, lists hold only list items, containers are
    /// never empty, an empty text node only appears as the sole child of a block, parent
    /// links agree with child lists and no live slot is left detached.
    pub fn check_invariants(&self) -> Result<(), FormatError> {
        let root = self.slot(self.root)?;
        if root.kind != NodeKind::Root || root.parent.is_some() {
            return Err(FormatError::violation("root slot is not a detached root"));
        }

        let mut reachable = 1;
        for &child in &root.children {
            self.check_parent_link(child, self.root)?;
            match &self.slot(child)?.kind {
                NodeKind::Block(BlockKind::ListItem) => {
                    return Err(FormatError::violation(format!(
                        "list item {child} outside a list"
                    )));
                }
                NodeKind::Block(_) | NodeKind::List(_) => {}
                other => {
                    return Err(FormatError::violation(format!(
                        "{} {child} directly under the document root",
                        other.describe()
                    )));
                }
            }
            reachable += self.check_subtree(child)?;
        }

        let live = self.slots.iter().filter(|slot| slot.is_some()).count();
        if live != reachable {
            return Err(FormatError::violation(format!(
                "{} detached nodes left in the arena",
                live - reachable.min(live)
            )));
        }
        Ok(())
    }

    fn check_subtree(&self, id: NodeId) -> Result<usize, FormatError> {
        let slot = self.slot(id)?;
        match &slot.kind {
            NodeKind::Root => return Err(FormatError::violation(format!("nested root {id}"))),
            NodeKind::Text(content) => {
                if !slot.children.is_empty() {
                    return Err(FormatError::violation(format!("text {id} has children")));
                }
                let sole_in_block = slot
                    .parent
                    .and_then(|parent| self.slot(parent).ok())
                    .is_some_and(|parent| parent.kind.is_block() && parent.children.len() == 1);
                if content.is_empty() && !sole_in_block {
                    return Err(FormatError::violation(format!(
                        "empty text {id} outside an otherwise empty block"
                    )));
                }
                return Ok(1);
            }
            NodeKind::List(_) => {
                if slot.children.is_empty() {
                    return Err(FormatError::violation(format!("list {id} has no items")));
                }
                for &child in &slot.children {
                    if !self.slot(child)?.kind.is_list_item() {
                        return Err(FormatError::violation(format!(
                            "list {id} holds {child}, which is not a list item"
                        )));
                    }
                }
            }
            NodeKind::Block(_) | NodeKind::Styled(_) => {
                if slot.children.is_empty() {
                    return Err(FormatError::violation(format!(
                        "{} {id} has no children",
                        slot.kind.describe()
                    )));
                }
                for &child in &slot.children {
                    let kind = &self.slot(child)?.kind;
                    if !kind.is_inline() {
                        return Err(FormatError::violation(format!(
                            "{} {child} nested inside {} {id}",
                            kind.describe(),
                            slot.kind.describe()
                        )));
                    }
                }
            }
        }

        let mut count = 1;
        for &child in &slot.children {
            self.check_parent_link(child, id)?;
            count += self.check_subtree(child)?;
        }
        Ok(count)
    }

    fn check_parent_link(&self, child: NodeId, parent: NodeId) -> Result<(), FormatError> {
        if self.slot(child)?.parent != Some(parent) {
            return Err(FormatError::violation(format!(
                "{child} is listed under {parent} but points elsewhere"
            )));
        }
        Ok(())
    }
}

/// Owned value form of a subtree.
///
/// Used to build documents and to compare them; the arena is the working representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text { content: String },
    Styled { style: StyleKind, children: Vec<Node> },
    Block { kind: BlockKind, children: Vec<Node> },
    List { kind: ListKind, items: Vec<Node> },
}

impl Node {
    pub fn text(content: impl Into<String>) -> Self {
        Node::Text {
            content: content.into(),
        }
    }

    pub fn styled(style: StyleKind, children: Vec<Node>) -> Self {
        Node::Styled { style, children }
    }

    pub fn block(kind: BlockKind, children: Vec<Node>) -> Self {
        Node::Block { kind, children }
    }

    pub fn paragraph(children: Vec<Node>) -> Self {
        Node::block(BlockKind::Paragraph, children)
    }

    pub fn item(children: Vec<Node>) -> Self {
        Node::block(BlockKind::ListItem, children)
    }

    pub fn list(kind: ListKind, items: Vec<Node>) -> Self {
        Node::List { kind, items }
    }

    /// Merge adjacent text siblings and adjacent spans of the same style, and drop empty
    /// text, keeping a lone placeholder in an otherwise empty block
    pub fn normalized(self) -> Self {
        match self {
            Node::Text { .. } => self,
            Node::Styled { style, children } => Node::Styled {
                style,
                children: normalize_inline(children),
            },
            Node::Block { kind, children } => {
                let mut children = normalize_inline(children);
                if children.is_empty() {
                    children.push(Node::text(""));
                }
                Node::Block { kind, children }
            }
            Node::List { kind, items } => Node::List {
                kind,
                items: items.into_iter().map(Node::normalized).collect(),
            },
        }
    }
}

fn normalize_inline(children: Vec<Node>) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::new();
    for child in children.into_iter().map(Node::normalized) {
        match child {
            Node::Text { content } if content.is_empty() => {}
            Node::Text { content } => match out.last_mut() {
                Some(Node::Text { content: previous }) => previous.push_str(&content),
                _ => out.push(Node::Text { content }),
            },
            Node::Styled { children, .. } if children.is_empty() => {}
            Node::Styled { style, children } => match out.last_mut() {
                Some(Node::Styled {
                    style: previous_style,
                    children: previous,
                }) if *previous_style == style => {
                    let mut joined = std::mem::take(previous);
                    joined.extend(children);
                    *previous = normalize_inline(joined);
                }
                _ => out.push(Node::Styled { style, children }),
            },
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Document {
        Document::from_nodes(vec![
            Node::block(BlockKind::Heading1, vec![Node::text("Title")]),
            Node::paragraph(vec![
                Node::text("plain "),
                Node::styled(StyleKind::Bold, vec![Node::text("bold")]),
            ]),
            Node::list(
                ListKind::Unordered,
                vec![
                    Node::item(vec![Node::text("one")]),
                    Node::item(vec![Node::text("two")]),
                ],
            ),
        ])
        .expect("sample document is valid")
    }

    #[test]
    fn test_from_nodes_round_trips_to_nodes() {
        let nodes = vec![
            Node::paragraph(vec![Node::text("a")]),
            Node::list(ListKind::Ordered, vec![Node::item(vec![Node::text("b")])]),
        ];
        let doc = Document::from_nodes(nodes.clone()).unwrap();
        assert_eq!(doc.to_nodes(), nodes);
        assert_eq!(doc.version(), 0);
    }

    #[test]
    fn test_plain_text_and_blocks() {
        let doc = sample();
        assert_eq!(doc.blocks().len(), 4);
        assert_eq!(doc.plain_text(), "Title\nplain bold\none\ntwo");
    }

    #[test]
    fn test_paths_and_parents() {
        let doc = sample();
        let paragraph = doc.children(doc.root())[1];
        let bold = doc.children(paragraph)[1];
        let leaf = doc.children(bold)[0];

        assert_eq!(doc.path(leaf), Some(vec![1, 1, 0]));
        assert_eq!(doc.parent(leaf), Some(bold));
        assert_eq!(doc.index_in_parent(bold), Some(1));
        assert!(doc.is_ancestor_or_self(paragraph, leaf));
        assert!(!doc.is_ancestor_or_self(leaf, paragraph));
        assert_eq!(doc.text_len(paragraph), "plain bold".len());
        assert_eq!(doc.first_leaf(paragraph), Some(doc.children(paragraph)[0]));
        assert_eq!(doc.last_leaf(paragraph), Some(leaf));
    }

    #[test]
    fn test_ids_from_other_documents_are_foreign() {
        let doc = sample();
        let other = sample();
        let foreign = other.children(other.root())[0];
        assert!(!doc.contains(foreign));
        assert!(doc.kind(foreign).is_none());
        assert!(doc.contains(doc.children(doc.root())[0]));
    }

    #[test]
    fn test_compacted_drops_freed_slots_and_maps_live_ids() {
        use crate::editing::{Bias, Cmd, Selection};

        let doc = sample();
        let paragraph = doc.blocks()[1];
        let selection = Selection::new(
            doc.point_at_offset(paragraph, 6, Bias::Forward),
            doc.point_at_offset(paragraph, 10, Bias::Backward),
        );
        // Removing the bold span frees it and the merged text leaf
        let edited = doc
            .apply(Cmd::ToggleInlineStyle(StyleKind::Bold), &selection)
            .unwrap()
            .document;
        assert!(edited.slots.iter().any(Option::is_none));

        let (compact, ids) = edited.compacted();
        assert_eq!(compact.to_nodes(), edited.to_nodes());
        assert_eq!(compact.version(), edited.version());
        assert!(compact.slots.iter().all(Option::is_some));
        assert!(compact.check_invariants().is_ok());

        let old_leaf = edited.text_leaves(edited.root())[0];
        assert!(!compact.contains(old_leaf));
        let new_leaf = ids[&old_leaf];
        assert_eq!(compact.text(new_leaf), edited.text(old_leaf));
        assert_eq!(compact.path(new_leaf), edited.path(old_leaf));
        assert_eq!(ids.len(), compact.slots.len());
    }

    #[test]
    fn test_empty_document_is_valid() {
        let doc = Document::new();
        assert!(doc.is_empty());
        assert!(doc.check_invariants().is_ok());
        assert_eq!(doc.plain_text(), "");
    }

    #[test]
    fn test_placeholder_allowed_only_alone_in_block() {
        assert!(Document::from_nodes(vec![Node::paragraph(vec![Node::text("")])]).is_ok());

        let result = Document::from_nodes(vec![Node::paragraph(vec![
            Node::text("x"),
            Node::text(""),
        ])]);
        assert!(matches!(result, Err(FormatError::StructuralViolation(_))));

        let result = Document::from_nodes(vec![Node::paragraph(vec![Node::styled(
            StyleKind::Bold,
            vec![Node::text("")],
        )])]);
        assert!(matches!(result, Err(FormatError::StructuralViolation(_))));
    }

    #[test]
    fn test_inline_under_root_is_rejected() {
        let result = Document::from_nodes(vec![Node::text("loose")]);
        assert!(matches!(result, Err(FormatError::StructuralViolation(_))));
    }

    #[test]
    fn test_list_must_hold_list_items() {
        let result = Document::from_nodes(vec![Node::list(
            ListKind::Unordered,
            vec![Node::paragraph(vec![Node::text("x")])],
        )]);
        assert!(matches!(result, Err(FormatError::StructuralViolation(_))));

        let result = Document::from_nodes(vec![Node::item(vec![Node::text("x")])]);
        assert!(matches!(result, Err(FormatError::StructuralViolation(_))));

        let result = Document::from_nodes(vec![Node::list(ListKind::Ordered, vec![])]);
        assert!(matches!(result, Err(FormatError::StructuralViolation(_))));
    }

    #[test]
    fn test_blocks_do_not_nest() {
        let result = Document::from_nodes(vec![Node::block(
            BlockKind::Blockquote,
            vec![Node::paragraph(vec![Node::text("x")])],
        )]);
        assert!(matches!(result, Err(FormatError::StructuralViolation(_))));
    }

    #[test]
    fn test_normalized_merges_text_and_same_style_spans() {
        let node = Node::paragraph(vec![
            Node::text("a"),
            Node::text(""),
            Node::text("b"),
            Node::styled(StyleKind::Italic, vec![Node::text("c"), Node::text("d")]),
            Node::text("e"),
        ]);
        assert_eq!(
            node.normalized(),
            Node::paragraph(vec![
                Node::text("ab"),
                Node::styled(StyleKind::Italic, vec![Node::text("cd")]),
                Node::text("e"),
            ])
        );

        let twins = Node::paragraph(vec![
            Node::styled(
                StyleKind::Bold,
                vec![Node::text("a"), Node::styled(StyleKind::Italic, vec![Node::text("b")])],
            ),
            Node::styled(
                StyleKind::Bold,
                vec![Node::styled(StyleKind::Italic, vec![Node::text("c")]), Node::text("d")],
            ),
            Node::styled(StyleKind::Italic, vec![Node::text("e")]),
        ]);
        assert_eq!(
            twins.normalized(),
            Node::paragraph(vec![
                Node::styled(
                    StyleKind::Bold,
                    vec![
                        Node::text("a"),
                        Node::styled(StyleKind::Italic, vec![Node::text("bc")]),
                        Node::text("d"),
                    ]
                ),
                Node::styled(StyleKind::Italic, vec![Node::text("e")]),
            ])
        );

        let empty = Node::paragraph(vec![Node::styled(StyleKind::Bold, vec![])]);
        assert_eq!(empty.normalized(), Node::paragraph(vec![Node::text("")]));
    }
}
