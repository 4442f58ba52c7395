//! DOM Tree (arena-based allocation)

use crate::{DomError, ElementData, Node, NodeId};

/// Arena-based DOM tree
///
/// Index 0 always holds the document node.
#[derive(Debug, Clone)]
pub struct DomTree {
    pub(crate) nodes: Vec<Node>,
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::document()],
        }
    }

    /// Document node
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Number of nodes in the tree (attached or not)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree holds nothing but the document node
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Allocate a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(Node::element(tag))
    }

    /// Allocate a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.push(Node::text(content.to_string()))
    }

    /// Allocate a detached comment node
    pub fn create_comment(&mut self, content: &str) -> NodeId {
        self.push(Node::comment(content.to_string()))
    }

    /// Allocate a detached doctype node
    pub fn create_doctype(&mut self, name: &str) -> NodeId {
        self.push(Node::doctype(name.to_string()))
    }

    /// Append a detached node as the last child of `parent`
    ///
    /// `parent` must not be `child` or lie inside its subtree.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let parent_node = self.get(parent).ok_or(DomError::InvalidNode(parent))?;
        if !parent_node.can_have_children() {
            return Err(DomError::NotAContainer(parent));
        }
        let prev_last = parent_node.last_child;

        let mut ancestor = parent;
        while ancestor.is_valid() {
            if ancestor == child {
                return Err(DomError::HierarchyRequest(child));
            }
            ancestor = self.nodes[ancestor.index()].parent;
        }

        let child_node = self.get_mut(child).ok_or(DomError::InvalidNode(child))?;
        if child_node.parent.is_valid() || child == NodeId::ROOT {
            return Err(DomError::AlreadyAttached(child));
        }
        child_node.parent = parent;
        child_node.prev_sibling = prev_last;
        child_node.next_sibling = NodeId::NONE;

        if prev_last.is_valid() {
            self.nodes[prev_last.index()].next_sibling = child;
        } else {
            self.nodes[parent.index()].first_child = child;
        }
        self.nodes[parent.index()].last_child = child;
        Ok(())
    }

    /// Unlink a node from its parent. The node stays in the arena.
    pub fn detach(&mut self, id: NodeId) -> Result<(), DomError> {
        let node = self.get(id).ok_or(DomError::InvalidNode(id))?;
        let (parent, prev, next) = (node.parent, node.prev_sibling, node.next_sibling);
        if !parent.is_valid() {
            return Ok(());
        }

        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = next;
        } else {
            self.nodes[parent.index()].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = prev;
        } else {
            self.nodes[parent.index()].last_child = prev;
        }

        let node = &mut self.nodes[id.index()];
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;
        Ok(())
    }

    /// Parent of a node, if attached
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).map(|n| n.parent).filter(|p| p.is_valid())
    }

    /// Direct children of a node
    pub fn children(&self, id: NodeId) -> Children<'_> {
        let next = self.get(id).map_or(NodeId::NONE, |n| n.first_child);
        Children { tree: self, next }
    }

    /// Pre-order traversal of everything below `id` (excluding `id`)
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack = Vec::new();
        let first = self.get(id).map_or(NodeId::NONE, |n| n.first_child);
        if first.is_valid() {
            stack.push(first);
        }
        Descendants { tree: self, stack }
    }

    /// Element data of a node
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(Node::as_element)
    }

    /// Mutable element data of a node
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(Node::as_element_mut)
    }

    /// Lowercase tag name of an element
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.tag.as_str())
    }

    /// Attribute value on an element
    pub fn get_attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|e| e.get_attr(name))
    }

    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.element(id).is_some_and(|e| e.has_attr(name))
    }

    /// Set an attribute on an element
    pub fn set_attr(
        &mut self,
        id: NodeId,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), DomError> {
        self.element_mut_checked(id)?.set_attr(name, value);
        Ok(())
    }

    /// Remove an attribute from an element, returning the old value
    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> Result<Option<String>, DomError> {
        Ok(self.element_mut_checked(id)?.remove_attr(name))
    }

    fn element_mut_checked(&mut self, id: NodeId) -> Result<&mut ElementData, DomError> {
        let node = self.get_mut(id).ok_or(DomError::InvalidNode(id))?;
        node.as_element_mut().ok_or(DomError::NotAnElement(id))
    }

    /// First element below `start` (pre-order) matching the predicate
    pub fn find_descendant<F>(&self, start: NodeId, mut predicate: F) -> Option<NodeId>
    where
        F: FnMut(NodeId, &ElementData) -> bool,
    {
        self.descendants(start)
            .find(|&id| self.element(id).is_some_and(|e| predicate(id, e)))
    }

    /// First element below `start` carrying the attribute
    pub fn find_by_attr(&self, start: NodeId, name: &str) -> Option<NodeId> {
        self.find_descendant(start, |_, e| e.has_attr(name))
    }

    /// Every element below `start` carrying the attribute, in document order
    pub fn find_all_by_attr(&self, start: NodeId, name: &str) -> Vec<NodeId> {
        self.descendants(start)
            .filter(|&id| self.has_attr(id, name))
            .collect()
    }

    /// Concatenated text of all text descendants
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .filter_map(|d| self.get(d).and_then(Node::as_text))
            .collect()
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over direct children, yielding `(id, node)`
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl<'a> Iterator for Children<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        if !self.next.is_valid() {
            return None;
        }
        let id = self.next;
        let node = self.tree.get(id)?;
        self.next = node.next_sibling;
        Some((id, node))
    }
}

/// Pre-order descendant iterator
pub struct Descendants<'a> {
    tree: &'a DomTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        let node = self.tree.get(id)?;
        // Sibling first on the stack so the child is visited next
        if node.next_sibling.is_valid() {
            self.stack.push(node.next_sibling);
        }
        if node.first_child.is_valid() {
            self.stack.push(node.first_child);
        }
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (DomTree, NodeId, NodeId, NodeId) {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        let img = tree.create_element("img");
        let span = tree.create_element("span");
        tree.append_child(tree.root(), div).unwrap();
        tree.append_child(div, img).unwrap();
        tree.append_child(div, span).unwrap();
        (tree, div, img, span)
    }

    #[test]
    fn test_append_and_children() {
        let (tree, div, img, span) = sample();
        let ids: Vec<_> = tree.children(div).map(|(id, _)| id).collect();
        assert_eq!(ids, vec![img, span]);
        assert_eq!(tree.parent(img), Some(div));
    }

    #[test]
    fn test_append_twice_fails() {
        let (mut tree, div, img, _) = sample();
        assert_eq!(tree.append_child(div, img), Err(DomError::AlreadyAttached(img)));
    }

    #[test]
    fn test_append_to_self_fails() {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        assert_eq!(tree.append_child(div, div), Err(DomError::HierarchyRequest(div)));
        assert_eq!(tree.parent(div), None);
        assert_eq!(tree.children(div).count(), 0);
    }

    #[test]
    fn test_append_ancestor_to_descendant_fails() {
        let (mut tree, div, img, span) = sample();
        tree.detach(div).unwrap();

        assert_eq!(tree.append_child(img, div), Err(DomError::HierarchyRequest(div)));
        assert_eq!(tree.parent(div), None);
        assert_eq!(tree.children(img).count(), 0);
        let ids: Vec<_> = tree.descendants(div).collect();
        assert_eq!(ids, vec![img, span]);
    }

    #[test]
    fn test_text_cannot_have_children() {
        let mut tree = DomTree::new();
        let text = tree.create_text("hi");
        let div = tree.create_element("div");
        assert_eq!(tree.append_child(text, div), Err(DomError::NotAContainer(text)));
    }

    #[test]
    fn test_descendants_preorder() {
        let (mut tree, div, img, span) = sample();
        let inner = tree.create_element("b");
        tree.append_child(span, inner).unwrap();

        let order: Vec<_> = tree.descendants(tree.root()).collect();
        assert_eq!(order, vec![div, img, span, inner]);
    }

    #[test]
    fn test_descendants_stop_at_subtree() {
        let (mut tree, div, img, span) = sample();
        let sibling = tree.create_element("p");
        tree.append_child(tree.root(), sibling).unwrap();

        let order: Vec<_> = tree.descendants(div).collect();
        assert_eq!(order, vec![img, span]);
    }

    #[test]
    fn test_detach() {
        let (mut tree, div, img, span) = sample();
        tree.detach(img).unwrap();
        let ids: Vec<_> = tree.children(div).map(|(id, _)| id).collect();
        assert_eq!(ids, vec![span]);
        assert_eq!(tree.parent(img), None);
    }

    #[test]
    fn test_find_by_attr() {
        let (mut tree, div, img, _) = sample();
        tree.set_attr(img, "data-main-image", "").unwrap();
        assert_eq!(tree.find_by_attr(tree.root(), "data-main-image"), Some(img));
        assert_eq!(tree.find_by_attr(img, "data-main-image"), None);
        assert_eq!(tree.find_all_by_attr(div, "data-main-image"), vec![img]);
    }

    #[test]
    fn test_set_attr_on_text_fails() {
        let mut tree = DomTree::new();
        let text = tree.create_text("x");
        assert_eq!(tree.set_attr(text, "a", "b"), Err(DomError::NotAnElement(text)));
    }
}
