//! Depth-first traversal of a text AST
//!
//! Every node is entered and exited exactly once. `between` fires for each pair of adjacent
//! siblings, after the left one has been exited. A visitor can refuse to descend into a node's
//! children by returning [`Descend::Skip`] from `enter`; `exit` is still called for it.

use super::ast::TextNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Descend {
    Children,
    Skip,
}

/// Position of the node being visited
#[derive(Debug, Clone, Copy)]
pub struct Route<'a, 'n> {
    /// Index among its siblings
    pub index: usize,
    /// Ancestors, outermost first
    pub ancestors: &'a [&'n TextNode],
}

impl<'a, 'n> Route<'a, 'n> {
    pub fn depth(&self) -> usize {
        self.ancestors.len()
    }

    pub fn parent(&self) -> Option<&'n TextNode> {
        self.ancestors.last().copied()
    }

    /// The ancestor `levels` steps up: 1 is the parent
    pub fn ancestor(&self, levels: usize) -> Option<&'n TextNode> {
        let len = self.ancestors.len();
        len.checked_sub(levels).map(|i| self.ancestors[i])
    }
}

pub trait TextVisitor {
    fn enter(&mut self, node: &TextNode, route: Route<'_, '_>) -> Descend;

    fn between(&mut self, _left: &TextNode, _right: &TextNode, _route: Route<'_, '_>) {}

    fn exit(&mut self, _node: &TextNode, _route: Route<'_, '_>) {}
}

pub fn walk<V: TextVisitor + ?Sized>(nodes: &[TextNode], visitor: &mut V) {
    let mut ancestors = Vec::new();
    walk_level(nodes, &mut ancestors, visitor);
}

fn walk_level<'n, V: TextVisitor + ?Sized>(
    nodes: &'n [TextNode],
    ancestors: &mut Vec<&'n TextNode>,
    visitor: &mut V,
) {
    for (index, node) in nodes.iter().enumerate() {
        if index > 0 {
            let route = Route {
                index,
                ancestors: ancestors.as_slice(),
            };
            visitor.between(&nodes[index - 1], node, route);
        }

        let route = Route {
            index,
            ancestors: ancestors.as_slice(),
        };
        if visitor.enter(node, route) == Descend::Children {
            if let Some(children) = &node.content {
                ancestors.push(node);
                walk_level(children, ancestors, visitor);
                ancestors.pop();
            }
        }

        let route = Route {
            index,
            ancestors: ancestors.as_slice(),
        };
        visitor.exit(node, route);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::ast::TextNodeType;

    #[derive(Default)]
    struct Trace(Vec<String>);

    impl TextVisitor for Trace {
        fn enter(&mut self, node: &TextNode, route: Route<'_, '_>) -> Descend {
            self.0.push(format!("enter {:?}@{}.{}", node.node_type, route.depth(), route.index));
            if node.node_type == TextNodeType::Gap {
                Descend::Skip
            } else {
                Descend::Children
            }
        }

        fn between(&mut self, _left: &TextNode, _right: &TextNode, _route: Route<'_, '_>) {
            self.0.push("between".to_string());
        }

        fn exit(&mut self, node: &TextNode, _route: Route<'_, '_>) {
            self.0.push(format!("exit {:?}", node.node_type));
        }
    }

    #[test]
    fn visits_in_document_order() {
        let gap = TextNode::new(TextNodeType::Gap).with_content(vec![TextNode::text("hidden")]);
        let ast = vec![TextNode::paragraph(vec![TextNode::text("a"), gap])];
        let mut trace = Trace::default();
        walk(&ast, &mut trace);
        assert_eq!(
            trace.0,
            vec![
                "enter Paragraph@0.0",
                "enter Text@1.0",
                "exit Text",
                "between",
                "enter Gap@1.1",
                "exit Gap",
                "exit Paragraph",
            ]
        );
    }

    #[test]
    fn route_reaches_grandparent() {
        struct Lists(Vec<Option<TextNodeType>>);
        impl TextVisitor for Lists {
            fn enter(&mut self, node: &TextNode, route: Route<'_, '_>) -> Descend {
                if node.node_type == TextNodeType::ListItem {
                    self.0.push(route.ancestor(1).map(|n| n.node_type));
                }
                Descend::Children
            }
        }

        let list = TextNode::new(TextNodeType::OrderedList)
            .with_content(vec![TextNode::new(TextNodeType::ListItem)]);
        let mut lists = Lists(Vec::new());
        walk(&[list], &mut lists);
        assert_eq!(lists.0, vec![Some(TextNodeType::OrderedList)]);
    }
}
