//! Primitive tree operations shared by the toggle algorithms.
//!
//! Every mutator checks that the parent/child kinds it produces are allowed (see
//! [`accepts`]) and reports stale ids or bad offsets as [`FormatError`]s. A container may
//! be left empty for the duration of a command; the commit step re-checks the whole tree.

use std::collections::HashSet;

use log::trace;

use crate::editing::{
    Bias, BlockKind, Document, FormatError, NodeId, NodeKind, Position, Selection,
};

/// Whether a node of kind `child` may sit directly inside a node of kind `parent`
pub(crate) fn accepts(parent: &NodeKind, child: &NodeKind) -> bool {
    match parent {
        NodeKind::Root => matches!(child, NodeKind::List(_))
            || matches!(child, NodeKind::Block(kind) if *kind != BlockKind::ListItem),
        NodeKind::List(_) => child.is_list_item(),
        NodeKind::Block(_) | NodeKind::Styled(_) => child.is_inline(),
        NodeKind::Text(_) => false,
    }
}

impl Document {
    fn check_accepts(&self, parent: NodeId, child: NodeId) -> Result<(), FormatError> {
        let parent_kind = &self.slot(parent)?.kind;
        let child_kind = &self.slot(child)?.kind;
        if accepts(parent_kind, child_kind) {
            Ok(())
        } else {
            Err(FormatError::violation(format!(
                "{child} ({child_kind:?}) cannot be placed inside {parent} ({parent_kind:?})"
            )))
        }
    }

    /// Insert a detached node as child `index` of `parent`
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        index: usize,
        child: NodeId,
    ) -> Result<(), FormatError> {
        if self.slot(child)?.parent.is_some() || child == self.root {
            return Err(FormatError::violation(format!("{child} is already attached")));
        }
        self.check_accepts(parent, child)?;
        let children = &mut self.slot_mut(parent)?.children;
        if index > children.len() {
            return Err(FormatError::violation(format!(
                "child index {index} out of range for {parent}"
            )));
        }
        children.insert(index, child);
        self.slot_mut(child)?.parent = Some(parent);
        Ok(())
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), FormatError> {
        let index = self.children(parent).len();
        self.insert_child(parent, index, child)
    }

    /// Unlink a node from its parent, returning where it was. The node stays allocated.
    pub fn detach(&mut self, node: NodeId) -> Result<(NodeId, usize), FormatError> {
        let parent = self
            .slot(node)?
            .parent
            .ok_or_else(|| FormatError::violation(format!("{node} is not attached")))?;
        let index = self
            .index_in_parent(node)
            .ok_or_else(|| FormatError::violation(format!("{node} missing from {parent}")))?;
        self.slot_mut(parent)?.children.remove(index);
        self.slot_mut(node)?.parent = None;
        Ok((parent, index))
    }

    /// Detach a node and free its subtree
    pub fn remove_node(&mut self, node: NodeId) -> Result<(), FormatError> {
        self.detach(node)?;
        self.free(node);
        Ok(())
    }

    /// Reparent every child of `from` onto the end of `to`
    pub fn move_children(&mut self, from: NodeId, to: NodeId) -> Result<(), FormatError> {
        let moved = std::mem::take(&mut self.slot_mut(from)?.children);
        for &child in &moved {
            if let Err(err) = self.check_accepts(to, child) {
                self.slot_mut(from)?.children = moved;
                return Err(err);
            }
        }
        for &child in &moved {
            self.slot_mut(child)?.parent = Some(to);
        }
        self.slot_mut(to)?.children.extend(moved);
        Ok(())
    }

    /// Split a text node at a byte offset. The original node keeps the left half; the
    /// right half is inserted as its next sibling.
    pub fn split_text_at(
        &mut self,
        node: NodeId,
        offset: usize,
    ) -> Result<(NodeId, NodeId), FormatError> {
        let NodeKind::Text(content) = &self.slot(node)?.kind else {
            return Err(FormatError::violation(format!("{node} is not a text node")));
        };
        if offset == 0 || offset >= content.len() || !content.is_char_boundary(offset) {
            return Err(FormatError::violation(format!(
                "cannot split text {node} of length {} at {offset}",
                content.len()
            )));
        }
        let right_text = content[offset..].to_string();
        let (parent, index) = match (self.parent(node), self.index_in_parent(node)) {
            (Some(parent), Some(index)) => (parent, index),
            _ => return Err(FormatError::violation(format!("{node} is not attached"))),
        };

        if let NodeKind::Text(content) = &mut self.slot_mut(node)?.kind {
            content.truncate(offset);
        }
        let right = self.alloc(NodeKind::Text(right_text));
        self.insert_child(parent, index + 1, right)?;
        trace!("split text {node} at {offset} -> {right}");
        Ok((node, right))
    }

    /// Wrap a contiguous run of siblings in a new container of `kind`
    pub fn wrap(&mut self, nodes: &[NodeId], kind: NodeKind) -> Result<NodeId, FormatError> {
        let Some(&first) = nodes.first() else {
            return Err(FormatError::violation("nothing to wrap"));
        };
        if matches!(kind, NodeKind::Root | NodeKind::Text(_)) {
            return Err(FormatError::violation("wrapper must be a container"));
        }
        let parent = self
            .parent(first)
            .ok_or_else(|| FormatError::violation(format!("{first} is not attached")))?;
        let start = self
            .index_in_parent(first)
            .ok_or_else(|| FormatError::violation(format!("{first} missing from {parent}")))?;
        let contiguous = nodes.iter().enumerate().all(|(offset, &node)| {
            self.children(parent).get(start + offset) == Some(&node)
        });
        if !contiguous {
            return Err(FormatError::violation(
                "wrapped nodes are not contiguous siblings",
            ));
        }
        if !accepts(&self.slot(parent)?.kind, &kind) {
            return Err(FormatError::violation(format!(
                "{kind:?} cannot be placed inside {parent}"
            )));
        }
        if let Some(&bad) = nodes
            .iter()
            .find(|&&node| self.kind(node).is_none_or(|child| !accepts(&kind, child)))
        {
            return Err(FormatError::violation(format!(
                "{bad} cannot be wrapped in {kind:?}"
            )));
        }

        let wrapper = self.alloc(kind);
        let taken: Vec<NodeId> = self
            .slot_mut(parent)?
            .children
            .splice(start..start + nodes.len(), [wrapper])
            .collect();
        self.slot_mut(wrapper)?.parent = Some(parent);
        for &child in &taken {
            self.slot_mut(child)?.parent = Some(wrapper);
        }
        self.slot_mut(wrapper)?.children = taken;
        trace!("wrapped {} nodes of {parent} in {wrapper}", nodes.len());
        Ok(wrapper)
    }

    /// Remove a container, splicing its children into the parent at its position.
    ///
    /// Text siblings that meet across the splice are merged, as are styled spans of the
    /// same style (which is how spans split by an earlier toggle come back together).
    /// Returns the spliced children that are still live afterwards.
    pub fn unwrap(&mut self, node: NodeId) -> Result<Vec<NodeId>, FormatError> {
        let kind = self.slot(node)?.kind.clone();
        if matches!(kind, NodeKind::Root | NodeKind::Text(_)) {
            return Err(FormatError::violation(format!("{node} is not a container")));
        }
        let (parent, index) = self.detach(node)?;
        let children = std::mem::take(&mut self.slot_mut(node)?.children);
        let parent_kind = self.slot(parent)?.kind.clone();
        if let Some(&bad) = children
            .iter()
            .find(|&&child| self.kind(child).is_none_or(|k| !accepts(&parent_kind, k)))
        {
            self.slot_mut(node)?.children = children;
            self.insert_child(parent, index, node)?;
            return Err(FormatError::violation(format!(
                "{bad} cannot be placed inside {parent}"
            )));
        }

        for &child in &children {
            self.slot_mut(child)?.parent = Some(parent);
        }
        let count = children.len();
        self.slot_mut(parent)?
            .children
            .splice(index..index, children.iter().copied());
        self.free(node);
        trace!("unwrapped {node} into {parent} at {index}");

        self.merge_siblings(parent, index.saturating_sub(1), index + count)?;
        Ok(children
            .into_iter()
            .filter(|&child| self.slot(child).is_ok())
            .collect())
    }

    /// Merge mergeable neighbours among `parent`'s children `first..=last`
    fn merge_siblings(
        &mut self,
        parent: NodeId,
        first: usize,
        mut last: usize,
    ) -> Result<(), FormatError> {
        let mut index = first;
        while index < last && index + 1 < self.children(parent).len() {
            let left = self.children(parent)[index];
            let right = self.children(parent)[index + 1];
            match (self.slot(left)?.kind.clone(), self.slot(right)?.kind.clone()) {
                (NodeKind::Text(_), NodeKind::Text(tail)) => {
                    if let NodeKind::Text(content) = &mut self.slot_mut(left)?.kind {
                        content.push_str(&tail);
                    }
                    self.remove_node(right)?;
                    last -= 1;
                }
                (NodeKind::Styled(a), NodeKind::Styled(b)) if a == b => {
                    let seam = self.children(left).len();
                    self.move_children(right, left)?;
                    self.remove_node(right)?;
                    self.merge_siblings(left, seam.saturating_sub(1), seam)?;
                    last -= 1;
                }
                _ => index += 1,
            }
        }
        Ok(())
    }

    /// Put `new` (detached) where `old` is and free `old` with its remaining subtree
    pub fn replace_node(&mut self, old: NodeId, new: NodeId) -> Result<(), FormatError> {
        if self.slot(new)?.parent.is_some() {
            return Err(FormatError::violation(format!("{new} is already attached")));
        }
        let parent = self
            .slot(old)?
            .parent
            .ok_or_else(|| FormatError::violation(format!("{old} is not attached")))?;
        self.check_accepts(parent, new)?;
        let (parent, index) = self.detach(old)?;
        self.insert_child(parent, index, new)?;
        self.free(old);
        trace!("replaced {old} with {new}");
        Ok(())
    }

    /// Closest node at or above `position.node` matching `predicate`. The root never
    /// matches.
    pub fn find_nearest_ancestor(
        &self,
        position: &Position,
        predicate: impl Fn(&NodeKind) -> bool,
    ) -> Option<NodeId> {
        let mut current = Some(position.node);
        while let Some(id) = current {
            let kind = self.kind(id)?;
            if *kind == NodeKind::Root {
                return None;
            }
            if predicate(kind) {
                return Some(id);
            }
            current = self.parent(id);
        }
        None
    }

    /// True when the selection's text extent is exactly the text of `node`
    pub fn range_exactly_covered_by(
        &self,
        selection: &Selection,
        node: NodeId,
    ) -> Result<bool, FormatError> {
        selection.validate(self)?;
        if !self.contains(node) {
            return Err(FormatError::unknown_node(node));
        }
        let (start, end) = selection.ordered(self)?;
        let start = self.leaf_point(&self.retarget_list_position(start), Bias::Forward);
        let end = self.leaf_point(&self.retarget_list_position(end), Bias::Backward);
        Ok(matches!(
            (self.text_offset_in(node, &start), self.text_offset_in(node, &end)),
            (Some(0), Some(len)) if len == self.text_len(node)
        ))
    }

    /// Deepest container holding both nodes
    pub(crate) fn common_ancestor(&self, a: NodeId, b: NodeId) -> Option<NodeId> {
        let mut seen = HashSet::new();
        let mut current = Some(a);
        while let Some(id) = current {
            seen.insert(id);
            current = self.parent(id);
        }
        let mut current = Some(b);
        while let Some(id) = current {
            if seen.contains(&id) {
                return match self.kind(id)? {
                    NodeKind::Text(_) => self.parent(id),
                    _ => Some(id),
                };
            }
            current = self.parent(id);
        }
        None
    }

    /// Make sure a child boundary of `container` falls at text offset `offset`, splitting
    /// the text leaf and any styled spans that straddle it. Returns the index of the
    /// first child after the boundary.
    pub fn split_container_at(
        &mut self,
        container: NodeId,
        offset: usize,
    ) -> Result<usize, FormatError> {
        let children = self.children(container).to_vec();
        let mut cursor = 0;
        for (index, &child) in children.iter().enumerate() {
            if offset == cursor {
                return Ok(index);
            }
            let end = cursor + self.text_len(child);
            if offset < end {
                let inner = offset - cursor;
                match self.slot(child)?.kind.clone() {
                    NodeKind::Text(_) => {
                        self.split_text_at(child, inner)?;
                    }
                    NodeKind::Styled(style) => {
                        let at = self.split_container_at(child, inner)?;
                        let tail = self.slot_mut(child)?.children.split_off(at);
                        let twin = self.alloc(NodeKind::Styled(style));
                        for &moved in &tail {
                            self.slot_mut(moved)?.parent = Some(twin);
                        }
                        self.slot_mut(twin)?.children = tail;
                        self.insert_child(container, index + 1, twin)?;
                        trace!("split {child} into twin {twin}");
                    }
                    other => {
                        return Err(FormatError::violation(format!(
                            "cannot split {other:?} {child} inside {container}"
                        )));
                    }
                }
                return Ok(index + 1);
            }
            cursor = end;
        }
        if offset == cursor {
            Ok(children.len())
        } else {
            Err(FormatError::violation(format!(
                "offset {offset} past the end of {container}"
            )))
        }
    }

    /// Delete the text between two text points, pruning any container left empty, and
    /// return what was removed
    pub fn extract_range(
        &mut self,
        start: &Position,
        end: &Position,
    ) -> Result<String, FormatError> {
        let leaves = self.text_leaves(self.root);
        let (Some(first), Some(last)) = (
            leaves.iter().position(|&leaf| leaf == start.node),
            leaves.iter().position(|&leaf| leaf == end.node),
        ) else {
            return Ok(String::new());
        };

        let mut removed = String::new();
        for (index, &leaf) in leaves.iter().enumerate().take(last + 1).skip(first) {
            let len = self.text_len(leaf);
            let from = if index == first { start.offset } else { 0 };
            let to = if index == last { end.offset } else { len };
            if from >= to {
                continue;
            }
            let emptied = match &mut self.slot_mut(leaf)?.kind {
                NodeKind::Text(content) => {
                    if !content.is_char_boundary(from) || !content.is_char_boundary(to) {
                        return Err(FormatError::invalid_selection(format!(
                            "range {from}..{to} splits a character in {leaf}"
                        )));
                    }
                    removed.extend(content.drain(from..to));
                    content.is_empty()
                }
                _ => false,
            };
            if emptied {
                self.prune(leaf)?;
            }
        }
        trace!("extracted {} bytes", removed.len());
        Ok(removed)
    }

    /// Remove `node` and then every ancestor it leaves without children
    fn prune(&mut self, node: NodeId) -> Result<(), FormatError> {
        let mut current = node;
        loop {
            let parent = self.parent(current);
            self.remove_node(current)?;
            match parent {
                Some(parent) if parent != self.root && self.children(parent).is_empty() => {
                    current = parent;
                }
                _ => return Ok(()),
            }
        }
    }
}
