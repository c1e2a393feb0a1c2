use crate::editing::{Document, NodeId, Selection};

/// Result of applying a command
#[derive(Debug, Clone)]
pub struct Patch {
    pub document: Document,
    pub new_selection: Selection,
    /// Nodes created or restructured by the command; empty for a no-op
    pub changed: Vec<NodeId>,
    pub version: u64,
}

impl Patch {
    /// The input document handed back as-is
    pub(crate) fn unchanged(document: &Document, selection: Selection) -> Self {
        Self {
            version: document.version(),
            document: document.clone(),
            new_selection: selection,
            changed: Vec::new(),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.changed.is_empty()
    }
}
