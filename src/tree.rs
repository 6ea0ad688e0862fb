use std::collections::HashMap;
use std::fmt;

use crate::api::Post;
use crate::{refs, sanitize};

/// One post placed in the reply tree. Nodes live in the arena owned by
/// [`ThreadTree`]; `children` and `quoted` are indices into it.
#[derive(Debug)]
pub struct ThreadNode {
    pub post: Post,
    /// Comment text after sanitizing, ready for markup rendering.
    pub text: String,
    pub parent: Option<usize>,
    /// Replies placed under this post, in arrival order. Each index
    /// appears in exactly one children list.
    pub children: Vec<usize>,
    /// Every post this one quotes, whether or not it became the parent.
    pub quoted: Vec<usize>,
}

#[derive(Debug)]
pub struct ThreadTree {
    nodes: Vec<ThreadNode>,
    root: usize,
}

#[derive(Debug, PartialEq, Eq)]
pub enum TreeError {
    EmptyThread,
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::EmptyThread => write!(f, "thread contains no posts"),
        }
    }
}

impl std::error::Error for TreeError {}

/// Rebuilds the reply tree from the flat, arrival-ordered post list.
///
/// The first post is the root. Every later post hangs under the highest-
/// numbered post it quotes; posts quoting nothing resolvable hang under
/// the root. Quotes of unknown or own IDs are dropped, never fatal —
/// the empty list is the only error.
pub fn build_tree(posts: &[Post]) -> Result<ThreadTree, TreeError> {
    if posts.is_empty() {
        return Err(TreeError::EmptyThread);
    }

    let mut nodes: Vec<ThreadNode> = posts
        .iter()
        .map(|post| ThreadNode {
            text: sanitize::clean(post.com.as_deref()),
            post: post.clone(),
            parent: None,
            children: Vec::new(),
            quoted: Vec::new(),
        })
        .collect();

    // Later arrival wins on duplicate IDs. Should not happen, but the
    // API is not trusted that far.
    let mut by_id: HashMap<u64, usize> = HashMap::new();
    for (idx, node) in nodes.iter().enumerate() {
        by_id.insert(node.post.no, idx);
    }

    let root = 0;
    for i in 1..nodes.len() {
        let own_id = nodes[i].post.no;
        let mut valid: Vec<(u64, usize)> = Vec::new();
        for id in refs::extract_references_for(own_id, &nodes[i].text) {
            // Only earlier arrivals are attachable; this is what keeps
            // the tree acyclic even on malformed input.
            if let Some(&idx) = by_id.get(&id) {
                if idx < i {
                    valid.push((id, idx));
                }
            }
        }

        nodes[i].quoted = valid.iter().map(|&(_, idx)| idx).collect();

        let parent = valid
            .iter()
            .max_by_key(|&&(id, _)| id)
            .map(|&(_, idx)| idx)
            .unwrap_or(root);
        nodes[i].parent = Some(parent);
        nodes[parent].children.push(i);
    }

    Ok(ThreadTree { nodes, root })
}

impl ThreadTree {
    pub fn root(&self) -> usize {
        self.root
    }

    pub fn root_id(&self) -> u64 {
        self.nodes[self.root].post.no
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, idx: usize) -> &ThreadNode {
        &self.nodes[idx]
    }

    /// Depth-first walk in display order: children in arrival order,
    /// each entry tagged with its nesting depth.
    pub fn walk(&self) -> Vec<(usize, usize)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![(self.root, 0usize)];
        while let Some((idx, depth)) = stack.pop() {
            out.push((idx, depth));
            for &child in self.nodes[idx].children.iter().rev() {
                stack.push((child, depth + 1));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(no: u64, com: &str) -> Post {
        Post {
            no,
            com: if com.is_empty() { None } else { Some(com.to_string()) },
            ..Default::default()
        }
    }

    #[test]
    fn empty_thread_is_the_only_error() {
        assert_eq!(build_tree(&[]).unwrap_err(), TreeError::EmptyThread);
    }

    #[test]
    fn every_post_gets_exactly_one_node() {
        let posts = vec![
            post(1, "opening"),
            post(2, ">>1 first reply"),
            post(3, "no quote at all"),
            post(4, ">>2 >>3"),
        ];
        let tree = build_tree(&posts).unwrap();
        assert_eq!(tree.len(), posts.len());
        assert_eq!(tree.walk().len(), posts.len(), "walk covers every node once");
    }

    #[test]
    fn first_post_is_root() {
        let tree = build_tree(&[post(10, ""), post(11, ">>10")]).unwrap();
        assert_eq!(tree.root_id(), 10);
        assert!(tree.node(tree.root()).parent.is_none());
    }

    #[test]
    fn multi_quote_attaches_under_highest_id() {
        let posts = vec![post(1, "op"), post(2, ">>1"), post(3, ">>1"), post(4, ">>2 >>3")];
        let tree = build_tree(&posts).unwrap();
        let four = tree
            .walk()
            .into_iter()
            .map(|(idx, _)| idx)
            .find(|&idx| tree.node(idx).post.no == 4)
            .unwrap();
        let parent = tree.node(four).parent.unwrap();
        assert_eq!(tree.node(parent).post.no, 3);
        let quoted_ids: Vec<u64> = tree.node(four).quoted.iter().map(|&q| tree.node(q).post.no).collect();
        assert_eq!(quoted_ids, vec![2, 3]);
    }

    #[test]
    fn no_reference_falls_back_to_root() {
        let tree = build_tree(&[post(1, "op"), post(2, ">>1"), post(3, "plain")]).unwrap();
        let root_children: Vec<u64> = tree
            .node(tree.root())
            .children
            .iter()
            .map(|&c| tree.node(c).post.no)
            .collect();
        assert_eq!(root_children, vec![2, 3]);
    }

    #[test]
    fn dangling_reference_falls_back_to_root() {
        let tree = build_tree(&[post(1, "op"), post(2, ">>999999 cross-thread quote")]).unwrap();
        let two = tree.node(tree.root()).children[0];
        assert_eq!(tree.node(two).post.no, 2);
        assert!(tree.node(two).quoted.is_empty());
    }

    #[test]
    fn self_reference_never_becomes_parent() {
        let tree = build_tree(&[post(1, "op"), post(2, ">>2 quoting myself")]).unwrap();
        let two = tree.node(tree.root()).children[0];
        assert_eq!(tree.node(two).post.no, 2);
        assert_eq!(tree.node(two).parent, Some(tree.root()));
        assert!(tree.node(two).quoted.is_empty());
    }

    #[test]
    fn entity_encoded_quote_resolves_from_raw_com() {
        let tree = build_tree(&[post(1, "op"), post(2, "&gt;&gt;1 reply")]).unwrap();
        let two = tree.node(tree.root()).children[0];
        assert_eq!(tree.node(two).parent, Some(tree.root()));
        assert_eq!(tree.node(two).quoted, vec![tree.root()]);
    }

    #[test]
    fn children_preserve_arrival_order() {
        let posts = vec![post(1, "op"), post(4, ">>1"), post(2, ">>1"), post(9, ">>1")];
        let tree = build_tree(&posts).unwrap();
        let ids: Vec<u64> = tree
            .node(tree.root())
            .children
            .iter()
            .map(|&c| tree.node(c).post.no)
            .collect();
        assert_eq!(ids, vec![4, 2, 9]);
    }

    #[test]
    fn walk_is_depth_first_in_arrival_order() {
        let posts = vec![post(1, "op"), post(2, ">>1"), post(3, ">>2"), post(4, ">>1")];
        let tree = build_tree(&posts).unwrap();
        let order: Vec<(u64, usize)> = tree
            .walk()
            .into_iter()
            .map(|(idx, depth)| (tree.node(idx).post.no, depth))
            .collect();
        assert_eq!(order, vec![(1, 0), (2, 1), (3, 2), (4, 1)]);
    }

    #[test]
    fn duplicate_ids_do_not_panic() {
        let posts = vec![post(1, "op"), post(2, "first"), post(2, "again"), post(3, ">>2")];
        let tree = build_tree(&posts).unwrap();
        assert_eq!(tree.len(), 4);
        // The later arrival owns the ID mapping.
        let three = tree
            .walk()
            .into_iter()
            .map(|(idx, _)| idx)
            .find(|&idx| tree.node(idx).post.no == 3)
            .unwrap();
        assert_eq!(tree.node(three).parent, Some(2));
    }
}
