//! Parse tree nodes.
//!
//! A successful parse produces a tree of [`ParseNode`]s: one per matched
//! rule, plus one per pattern terminal that declared capture groups (with
//! the captures as children). Nodes borrow the parsed input, so the tree is
//! zero-copy and tied to the input's lifetime.

use compact_str::CompactString;

/// A node in the concrete parse tree.
///
/// `text` is always exactly `&input[start..end]`, and children are nested
/// within the parent's span in non-decreasing offset order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNode<'i> {
    /// Rule name, capture-group name, or 1-based capture index.
    pub name: CompactString,
    /// Byte offset of the first consumed character.
    pub start: usize,
    /// Byte offset one past the last consumed character.
    pub end: usize,
    /// The consumed slice of the original input.
    pub text: &'i str,
    pub children: Vec<ParseNode<'i>>,
}

impl<'i> ParseNode<'i> {
    pub(crate) fn new(
        name: CompactString,
        start: usize,
        end: usize,
        input: &'i str,
        children: Vec<ParseNode<'i>>,
    ) -> Self {
        Self {
            name,
            start,
            end,
            text: &input[start..end],
            children,
        }
    }

    /// First direct child with the given name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&ParseNode<'i>> {
        self.children.iter().find(|c| c.name == name)
    }

    /// First descendant with the given name, depth-first in offset order.
    #[must_use]
    pub fn descendant(&self, name: &str) -> Option<&ParseNode<'i>> {
        for child in &self.children {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.descendant(name) {
                return Some(found);
            }
        }
        None
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &str, start: usize, end: usize, input: &'static str) -> ParseNode<'static> {
        ParseNode::new(name.into(), start, end, input, Vec::new())
    }

    #[test]
    fn test_text_matches_span() {
        let node = leaf("word", 4, 9, "the quick fox");
        assert_eq!(node.text, "quick");
    }

    #[test]
    fn test_child_and_descendant() {
        let input = "ab";
        let inner = leaf("inner", 1, 2, input);
        let mid = ParseNode::new("mid".into(), 0, 2, input, vec![inner]);
        let root = ParseNode::new("root".into(), 0, 2, input, vec![mid]);

        assert!(root.child("mid").is_some());
        assert!(root.child("inner").is_none());
        assert_eq!(root.descendant("inner").unwrap().text, "b");
        assert!(root.descendant("missing").is_none());
    }
}
