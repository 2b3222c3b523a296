//! Terminal rendering of forests with termtree

use std::fmt::Display;

use termtree::Tree;
use tracing::instrument;

use crate::domain::{Forest, LeafId, Positioned};

pub trait TreeNodeConvert {
    /// One tree per root, roots and children in child-set order.
    fn to_tree_strings(&self, show_positions: bool) -> Vec<Tree<String>>;
}

impl<T: Display> TreeNodeConvert for Forest<T> {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_strings(&self, show_positions: bool) -> Vec<Tree<String>> {
        fn build_tree<T: Display>(
            forest: &Forest<T>,
            idx: LeafId,
            show_positions: bool,
        ) -> Option<Tree<String>> {
            let node = forest.get(idx)?;
            let label = if show_positions {
                format!("{} [{}]", node.data, node.position())
            } else {
                node.data.to_string()
            };
            let leaves: Vec<Tree<String>> = node
                .children()
                .iter()
                .filter_map(|&child| build_tree(forest, child, show_positions))
                .collect();
            Some(Tree::new(label).with_leaves(leaves))
        }

        self.roots()
            .into_iter()
            .filter_map(|root| build_tree(self, root, show_positions))
            .collect()
    }
}

/// Renders the whole forest as text, or a placeholder when it is empty.
pub fn render_forest<T: Display>(forest: &Forest<T>, show_positions: bool) -> String {
    let trees = forest.to_tree_strings(show_positions);
    if trees.is_empty() {
        return "Empty forest\n".to_string();
    }
    trees.iter().map(|tree| tree.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_nested_with_positions() {
        let mut forest = Forest::new();
        let root = forest.insert("root");
        let child = forest.insert("child");
        forest.add_child(root, child).unwrap();
        forest.set_position(child, 1.5).unwrap();

        let rendered = render_forest(&forest, true);
        assert!(rendered.starts_with("root [0]\n"));
        assert!(rendered.contains("child [1.5]"));
    }

    #[test]
    fn test_render_without_positions() {
        let mut forest = Forest::new();
        forest.insert("a");
        forest.insert("b");
        let rendered = render_forest(&forest, false);
        assert_eq!(rendered, "a\nb\n");
    }

    #[test]
    fn test_render_empty() {
        let forest: Forest<String> = Forest::new();
        assert_eq!(render_forest(&forest, true), "Empty forest\n");
    }
}
