use std::collections::HashMap;

use crate::api::{Comment, CommentId};

/// The discussion of a post, as a forest of comments.
///
/// Replies are kept under their direct parent whatever the depth, so that
/// nothing the backend sent is ever lost; it is up to the view to decide
/// how deep it wants to indent.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CommentTree {
    roots: Vec<Comment>,
}

impl CommentTree {
    /// Assembles the flat list the backend returns.
    ///
    /// A comment whose parent is not part of `flat`, or is the comment
    /// itself, becomes a root. Comments only reachable through a parent
    /// cycle get the first of them (in input order) demoted to root. With
    /// duplicate ids, replies attach to the first occurrence. Both roots
    /// and replies keep input order.
    pub fn build(mut flat: Vec<Comment>) -> CommentTree {
        let n = flat.len();
        let mut first = HashMap::with_capacity(n);
        for (i, c) in flat.iter_mut().enumerate() {
            c.replies.clear();
            first.entry(c.id).or_insert(i);
        }

        let mut parent_of = vec![None; n];
        let mut children = vec![Vec::new(); n];
        let mut roots = Vec::new();
        for (i, c) in flat.iter().enumerate() {
            let parent = c
                .parent_id
                .filter(|p| *p != c.id)
                .and_then(|p| first.get(&p).copied());
            match parent {
                Some(p) => {
                    parent_of[i] = Some(p);
                    children[p].push(i);
                }
                None => roots.push(i),
            }
        }

        // Break parent cycles
        let mut reachable = vec![false; n];
        for &r in &roots {
            mark_reachable(r, &children, &mut reachable);
        }
        for i in 0..n {
            if reachable[i] {
                continue;
            }
            tracing::debug!(comment = %flat[i].id, "comment is part of a parent cycle, demoting it to root");
            if let Some(p) = parent_of[i].take() {
                children[p].retain(|&c| c != i);
            }
            roots.push(i);
            mark_reachable(i, &children, &mut reachable);
        }
        roots.sort_unstable();

        // Pre-order, so that every node comes after its parent
        let mut order = Vec::with_capacity(n);
        let mut stack = roots.iter().rev().copied().collect::<Vec<_>>();
        while let Some(i) = stack.pop() {
            order.push(i);
            stack.extend(children[i].iter().rev().copied());
        }

        let mut slots = flat.into_iter().map(Some).collect::<Vec<_>>();
        for &i in order.iter().rev() {
            let replies = children[i]
                .iter()
                .filter_map(|&c| slots[c].take())
                .collect::<Vec<_>>();
            if let Some(c) = slots[i].as_mut() {
                c.replies = replies;
            }
        }
        CommentTree {
            roots: roots.into_iter().filter_map(|r| slots[r].take()).collect(),
        }
    }

    pub fn roots(&self) -> &[Comment] {
        &self.roots
    }

    pub fn into_roots(self) -> Vec<Comment> {
        self.roots
    }

    /// Number of comments, replies included
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Depth-first, parents before their replies
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            stack: self.roots.iter().rev().map(|c| (0, c)).collect(),
        }
    }

    pub fn find(&self, id: CommentId) -> Option<&Comment> {
        self.iter().map(|(_, c)| c).find(|c| c.id == id)
    }

    pub fn find_mut(&mut self, id: CommentId) -> Option<&mut Comment> {
        find_in(&mut self.roots, id)
    }

    /// Where comment `id` currently sits: `Some(None)` for a root,
    /// `Some(Some(p))` for a reply to `p`, `None` if it is not in the tree
    pub fn position_of(&self, id: CommentId) -> Option<Option<CommentId>> {
        if self.roots.iter().any(|c| c.id == id) {
            return Some(None);
        }
        self.iter()
            .map(|(_, c)| c)
            .find(|c| c.replies.iter().any(|r| r.id == id))
            .map(|p| Some(p.id))
    }

    /// Inserts a comment the backend just acknowledged.
    ///
    /// A reply goes at the end of its parent's replies; a root comment, or a
    /// reply whose parent is not known locally, goes in front of the roots.
    pub fn insert(&mut self, mut comment: Comment) {
        comment.replies.clear();
        if let Some(parent) = comment.parent_id.filter(|p| *p != comment.id) {
            if let Some(p) = self.find_mut(parent) {
                p.replies.push(comment);
                return;
            }
            tracing::debug!(comment = %comment.id, %parent, "parent of new comment is not loaded");
        }
        self.roots.insert(0, comment);
    }

    /// Removes comment `id` from the replies of `parent`, or from the roots
    /// if `parent` is `None`. Its own replies go away with it.
    pub fn remove(&mut self, id: CommentId, parent: Option<CommentId>) -> Option<Comment> {
        let list = match parent {
            None => &mut self.roots,
            Some(p) => &mut self.find_mut(p)?.replies,
        };
        let pos = list.iter().position(|c| c.id == id)?;
        Some(list.remove(pos))
    }
}

fn mark_reachable(from: usize, children: &[Vec<usize>], reachable: &mut [bool]) {
    let mut stack = vec![from];
    while let Some(i) = stack.pop() {
        if !reachable[i] {
            reachable[i] = true;
            stack.extend(children[i].iter().copied());
        }
    }
}

fn find_in(comments: &mut [Comment], id: CommentId) -> Option<&mut Comment> {
    for c in comments.iter_mut() {
        if c.id == id {
            return Some(c);
        }
        if let Some(res) = find_in(&mut c.replies, id) {
            return Some(res);
        }
    }
    None
}

/// Iterator over a comment tree, yielding `(depth, comment)` with roots at
/// depth 0
pub struct Iter<'a> {
    stack: Vec<(usize, &'a Comment)>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (usize, &'a Comment);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, c) = self.stack.pop()?;
        self.stack
            .extend(c.replies.iter().rev().map(|r| (depth + 1, r)));
        Some((depth, c))
    }
}

/// One line of a discussion drawn with a single level of indentation
#[derive(Clone, Copy, Debug)]
pub struct FlatReply<'a> {
    pub comment: &'a Comment,

    /// Author of the comment this answers, when it is not the root
    pub reply_to: Option<&'a str>,
}

/// All the replies under `root`, depth-first, each tagged with who it
/// answers when it is nested deeper than one level
pub fn flatten_replies(root: &Comment) -> Vec<FlatReply<'_>> {
    let mut res = Vec::new();
    let mut stack = root
        .replies
        .iter()
        .rev()
        .map(|r| (r, None))
        .collect::<Vec<_>>();
    while let Some((c, reply_to)) = stack.pop() {
        res.push(FlatReply {
            comment: c,
            reply_to,
        });
        stack.extend(
            c.replies
                .iter()
                .rev()
                .map(|r| (r, Some(c.author_name.as_str()))),
        );
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::UserId;

    fn comment(id: u64, parent: Option<u64>) -> Comment {
        Comment {
            id: CommentId(id),
            content: format!("comment {id}"),
            author_id: UserId(1),
            author_name: format!("user{id}"),
            parent_id: parent.map(CommentId),
            created_at: None,
            replies: Vec::new(),
        }
    }

    fn ids(list: &[Comment]) -> Vec<u64> {
        list.iter().map(|c| c.id.0).collect()
    }

    #[test]
    fn replies_stay_under_their_direct_parent() {
        let tree = CommentTree::build(vec![
            comment(1, None),
            comment(2, Some(1)),
            comment(3, Some(2)),
            comment(4, Some(99)),
        ]);
        assert_eq!(ids(tree.roots()), vec![1, 4]);
        assert_eq!(ids(&tree.roots()[0].replies), vec![2]);
        assert_eq!(ids(&tree.roots()[0].replies[0].replies), vec![3]);
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn reply_before_its_parent() {
        let tree = CommentTree::build(vec![comment(2, Some(1)), comment(1, None)]);
        assert_eq!(ids(tree.roots()), vec![1]);
        assert_eq!(ids(&tree.roots()[0].replies), vec![2]);
    }

    #[test]
    fn self_parent_and_cycles_become_roots() {
        let tree = CommentTree::build(vec![comment(5, Some(5))]);
        assert_eq!(ids(tree.roots()), vec![5]);

        let tree = CommentTree::build(vec![
            comment(1, Some(2)),
            comment(2, Some(1)),
            comment(3, None),
        ]);
        assert_eq!(ids(tree.roots()), vec![1, 3]);
        assert_eq!(ids(&tree.roots()[0].replies), vec![2]);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn duplicate_ids_are_all_kept() {
        let tree = CommentTree::build(vec![
            comment(1, None),
            comment(1, None),
            comment(2, Some(1)),
        ]);
        assert_eq!(ids(tree.roots()), vec![1, 1]);
        assert_eq!(ids(&tree.roots()[0].replies), vec![2]);
        assert!(tree.roots()[1].replies.is_empty());
    }

    #[test]
    fn incoming_replies_are_ignored() {
        let mut root = comment(1, None);
        root.replies.push(comment(7, Some(1)));
        let tree = CommentTree::build(vec![root]);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn empty() {
        let tree = CommentTree::build(Vec::new());
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
    }

    #[test]
    fn insert_and_remove() {
        let mut tree = CommentTree::build(vec![
            comment(1, None),
            comment(2, Some(1)),
            comment(3, None),
        ]);

        tree.insert(comment(10, None));
        assert_eq!(ids(tree.roots()), vec![10, 1, 3]);

        tree.insert(comment(11, Some(2)));
        assert_eq!(ids(&tree.find(CommentId(2)).unwrap().replies), vec![11]);

        tree.insert(comment(12, Some(1)));
        assert_eq!(ids(&tree.find(CommentId(1)).unwrap().replies), vec![2, 12]);

        tree.insert(comment(13, Some(404)));
        assert_eq!(tree.roots()[0].id, CommentId(13));

        assert_eq!(tree.position_of(CommentId(11)), Some(Some(CommentId(2))));
        assert_eq!(tree.position_of(CommentId(3)), Some(None));
        assert_eq!(tree.position_of(CommentId(99)), None);

        assert!(tree.remove(CommentId(11), Some(CommentId(1))).is_none());
        assert_eq!(
            tree.remove(CommentId(11), Some(CommentId(2))).map(|c| c.id),
            Some(CommentId(11)),
        );
        assert!(tree.find(CommentId(11)).is_none());

        let removed = tree.remove(CommentId(1), None).unwrap();
        assert_eq!(ids(&removed.replies), vec![2, 12]);
        assert_eq!(ids(tree.roots()), vec![13, 10, 3]);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn iter_is_depth_first() {
        let tree = CommentTree::build(vec![
            comment(1, None),
            comment(2, None),
            comment(3, Some(1)),
            comment(4, Some(3)),
            comment(5, Some(1)),
        ]);
        let walk = tree.iter().map(|(d, c)| (d, c.id.0)).collect::<Vec<_>>();
        assert_eq!(walk, vec![(0, 1), (1, 3), (2, 4), (1, 5), (0, 2)]);
    }

    #[test]
    fn flattened_replies_name_their_target() {
        let tree = CommentTree::build(vec![
            comment(1, None),
            comment(2, Some(1)),
            comment(3, Some(2)),
            comment(4, Some(1)),
        ]);
        let flat = flatten_replies(&tree.roots()[0])
            .into_iter()
            .map(|r| (r.comment.id.0, r.reply_to))
            .collect::<Vec<_>>();
        assert_eq!(flat, vec![(2, None), (3, Some("user2")), (4, None)]);
    }

    fn flat_from(shape: &[(u8, Option<u8>)]) -> Vec<Comment> {
        shape.iter()
            .enumerate()
            .map(|(i, (id, parent))| Comment {
                id: CommentId(u64::from(id % 32)),
                content: i.to_string(),
                author_id: UserId(1),
                author_name: String::from("a"),
                parent_id: parent.map(|p| CommentId(u64::from(p % 32))),
                created_at: None,
                replies: Vec::new(),
            })
            .collect()
    }

    fn index_of(c: &Comment) -> usize {
        c.content.parse().unwrap()
    }

    fn check_level(flat: &[Comment], list: &[Comment], parent: Option<&Comment>) {
        let idx = list.iter().map(index_of).collect::<Vec<_>>();
        assert!(idx.windows(2).all(|w| w[0] < w[1]), "order lost: {idx:?}");
        for c in list {
            if let Some(p) = parent {
                assert_eq!(c.parent_id, Some(p.id));
                assert_eq!(flat.iter().position(|x| x.id == p.id), Some(index_of(p)));
            }
            check_level(flat, &c.replies, Some(c));
        }
    }

    #[test]
    fn fuzz_build_is_lossless() {
        bolero::check!()
            .with_type::<Vec<(u8, Option<u8>)>>()
            .cloned()
            .for_each(|shape| {
                let flat = flat_from(&shape);
                let tree = CommentTree::build(flat.clone());

                let mut seen = tree.iter().map(|(_, c)| index_of(c)).collect::<Vec<_>>();
                seen.sort_unstable();
                assert_eq!(seen, (0..flat.len()).collect::<Vec<_>>());

                check_level(&flat, tree.roots(), None);
            })
    }

    #[test]
    fn fuzz_roots_are_exactly_the_orphans() {
        bolero::check!()
            .with_type::<Vec<Option<u8>>>()
            .cloned()
            .for_each(|parents| {
                // Unique ids, parents only ever point backwards or nowhere
                let flat = parents
                    .iter()
                    .enumerate()
                    .map(|(i, p)| {
                        let id = i as u64 + 1;
                        let parent = p.map(|p| match u64::from(p) < id {
                            true => CommentId(u64::from(p)),
                            false => CommentId(u64::from(p) + 1000),
                        });
                        Comment {
                            parent_id: parent,
                            ..comment(id, None)
                        }
                    })
                    .collect::<Vec<_>>();
                let tree = CommentTree::build(flat.clone());
                let expected = flat
                    .iter()
                    .filter(|c| c.parent_id.map_or(true, |p| p.0 == 0 || p.0 >= 1000))
                    .map(|c| c.id.0)
                    .collect::<Vec<_>>();
                assert_eq!(ids(tree.roots()), expected);
                assert_eq!(tree.len(), flat.len());
            })
    }
}
