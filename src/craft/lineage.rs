//! Ancestry tree construction for the recipe viewer.
//!
//! A crafted concept records its two ingredient texts; walking those
//! references yields the full lineage back to the seed concepts. Parent
//! references are player data shaped by an oracle, so construction guards
//! against cycles and dangling references instead of trusting them.

use super::state::Concept;

/// Maximum lineage depth rendered; deeper ancestry is cut off.
pub const MAX_DEPTH: usize = 12;

#[derive(Debug, Clone, PartialEq)]
pub struct LineageNode {
    pub text: String,
    pub emoji: String,
    /// The two ingredients, when known and not cut off.
    pub ingredients: Vec<LineageNode>,
}

/// Build the lineage tree for `root_text`. `None` when the concept is not in
/// the inventory at all.
pub fn build_lineage(inventory: &[Concept], root_text: &str) -> Option<LineageNode> {
    let root = find(inventory, root_text)?;
    let mut path = Vec::new();
    Some(build_node(inventory, root, &mut path, 0))
}

fn find<'a>(inventory: &'a [Concept], text: &str) -> Option<&'a Concept> {
    let needle = text.to_lowercase();
    inventory.iter().find(|c| c.text.to_lowercase() == needle)
}

fn build_node(
    inventory: &[Concept],
    concept: &Concept,
    path: &mut Vec<String>,
    depth: usize,
) -> LineageNode {
    let key = concept.text.to_lowercase();
    let mut node = LineageNode {
        text: concept.text.clone(),
        emoji: concept.emoji.clone(),
        ingredients: Vec::new(),
    };

    if depth >= MAX_DEPTH || path.contains(&key) {
        return node;
    }

    if let Some(parents) = &concept.parents {
        path.push(key);
        for parent_text in parents {
            match find(inventory, parent_text) {
                Some(parent) => node
                    .ingredients
                    .push(build_node(inventory, parent, path, depth + 1)),
                // Dangling reference: show the name, nothing below it.
                None => node.ingredients.push(LineageNode {
                    text: parent_text.clone(),
                    emoji: "❔".into(),
                    ingredients: Vec::new(),
                }),
            }
        }
        path.pop();
    }
    node
}

/// Flatten a tree into `(depth, text, emoji)` rows for the scrollable viewer.
pub fn flatten(node: &LineageNode) -> Vec<(usize, String, String)> {
    let mut rows = Vec::new();
    walk(node, 0, &mut rows);
    rows
}

fn walk(node: &LineageNode, depth: usize, out: &mut Vec<(usize, String, String)>) {
    out.push((depth, node.text.clone(), node.emoji.clone()));
    for child in &node.ingredients {
        walk(child, depth + 1, out);
    }
}
