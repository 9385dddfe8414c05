//! Todo Tree
//!
//! Derives the hierarchy from a flat todo list, either as a display forest or
//! as the id set a cascade must touch. Relationships are recomputed from the
//! given slice on every call; nothing is cached.

use std::collections::{HashMap, HashSet};

use super::todo::{TodoNode, TodoRecord};

/// id -> position of the first record carrying that id
struct RecordIndex<'a> {
    positions: HashMap<&'a str, usize>,
}

impl<'a> RecordIndex<'a> {
    fn build(records: &'a [TodoRecord]) -> Self {
        let mut positions = HashMap::with_capacity(records.len());
        for (pos, record) in records.iter().enumerate() {
            positions.entry(record.id.as_str()).or_insert(pos);
        }
        Self { positions }
    }

    /// Position of the record's parent, if the parent is in the list
    fn parent_of(&self, record: &TodoRecord) -> Option<usize> {
        record
            .parent_id
            .as_deref()
            .and_then(|parent| self.positions.get(parent).copied())
    }
}

/// parent id -> child ids, children in input order
struct ChildIndex<'a> {
    children: HashMap<&'a str, Vec<&'a str>>,
}

impl<'a> ChildIndex<'a> {
    fn build(records: &'a [TodoRecord]) -> Self {
        let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
        for record in records {
            if let Some(parent) = record.parent_id.as_deref() {
                children.entry(parent).or_default().push(record.id.as_str());
            }
        }
        Self { children }
    }

    fn children_of(&self, id: &str) -> &[&'a str] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Positional layout of the forest: which records are roots and which
/// positions hang under each position.
struct Layout {
    roots: Vec<usize>,
    children: Vec<Vec<usize>>,
}

impl Layout {
    fn build(records: &[TodoRecord]) -> Self {
        let index = RecordIndex::build(records);
        let mut roots = Vec::new();
        let mut children = vec![Vec::new(); records.len()];
        let mut parents = vec![None; records.len()];

        for (pos, record) in records.iter().enumerate() {
            match index.parent_of(record) {
                Some(parent) => {
                    children[parent].push(pos);
                    parents[pos] = Some(parent);
                }
                // No parent, or a dangling reference: treat as root
                None => roots.push(pos),
            }
        }

        let mut layout = Self { roots, children };
        layout.break_cycles(&parents);
        layout
    }

    /// Records caught in a parent cycle are unreachable from any root. Promote
    /// the first such record (in input order) to a root, which makes the rest
    /// of its cycle reachable, and repeat until every record is placed.
    fn break_cycles(&mut self, parents: &[Option<usize>]) {
        let mut reached = vec![false; parents.len()];
        for &root in &self.roots {
            self.mark_reachable(root, &mut reached);
        }

        let mut promoted = false;
        for pos in 0..parents.len() {
            if reached[pos] {
                continue;
            }
            if let Some(parent) = parents[pos] {
                self.children[parent].retain(|&child| child != pos);
            }
            self.roots.push(pos);
            self.mark_reachable(pos, &mut reached);
            promoted = true;
        }

        if promoted {
            self.roots.sort_unstable();
        }
    }

    fn mark_reachable(&self, start: usize, reached: &mut [bool]) {
        let mut stack = vec![start];
        while let Some(pos) = stack.pop() {
            if reached[pos] {
                continue;
            }
            reached[pos] = true;
            stack.extend(self.children[pos].iter().copied());
        }
    }
}

/// Convert a flat todo list into a forest.
///
/// Roots are records without a parent or whose parent is missing from the
/// list. Root order and sibling order follow the input order; no sorting is
/// done here. Never fails, and works iteratively so depth is unbounded.
pub fn build_tree(records: &[TodoRecord]) -> Vec<TodoNode> {
    let layout = Layout::build(records);
    let mut built: Vec<Option<TodoNode>> = vec![None; records.len()];

    // Post-order assembly: children are finished before their parent
    let mut stack: Vec<(usize, bool)> = layout.roots.iter().rev().map(|&r| (r, false)).collect();
    while let Some((pos, expanded)) = stack.pop() {
        if expanded {
            let children = layout.children[pos]
                .iter()
                .filter_map(|&child| built[child].take())
                .collect();
            built[pos] = Some(TodoNode {
                record: records[pos].clone(),
                children,
            });
        } else {
            stack.push((pos, true));
            stack.extend(layout.children[pos].iter().rev().map(|&child| (child, false)));
        }
    }

    layout
        .roots
        .iter()
        .filter_map(|&root| built[root].take())
        .collect()
}

/// Ids of the target and all of its transitive descendants.
///
/// The target always comes first, even when it is not in the list. The rest
/// follow in depth-first pre-order with siblings in input order, so a parent
/// always precedes its children. Each id is emitted once, which also bounds
/// the walk on corrupted (cyclic) data.
pub fn resolve_subtree_ids(records: &[TodoRecord], target_id: &str) -> Vec<String> {
    let index = ChildIndex::build(records);
    let mut visited: HashSet<&str> = HashSet::new();
    let mut result = Vec::new();
    let mut stack = vec![target_id];

    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        result.push(id.to_string());
        stack.extend(
            index
                .children_of(id)
                .iter()
                .rev()
                .filter(|child| !visited.contains(*child)),
        );
    }

    result
}

/// Flatten a forest into (record, depth) pairs in display order
pub fn flatten_tree(roots: &[TodoNode]) -> Vec<(&TodoRecord, usize)> {
    let mut result = Vec::new();
    let mut stack: Vec<(&TodoNode, usize)> = roots.iter().rev().map(|n| (n, 0)).collect();
    while let Some((node, depth)) = stack.pop() {
        result.push((&node.record, depth));
        stack.extend(node.children.iter().rev().map(|c| (c, depth + 1)));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_todo(id: &str, parent_id: Option<&str>) -> TodoRecord {
        TodoRecord {
            id: id.to_string(),
            title: id.to_uppercase(),
            completed: false,
            parent_id: parent_id.map(str::to_string),
            owner_id: "user-1".to_string(),
            created_at: None,
        }
    }

    fn sample() -> Vec<TodoRecord> {
        vec![
            make_todo("a", None),
            make_todo("b", Some("a")),
            make_todo("c", Some("a")),
            make_todo("d", Some("b")),
        ]
    }

    fn ids(nodes: &[TodoNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.id()).collect()
    }

    /// Deterministic pseudo-random forest: each record points at an earlier
    /// one, nothing, or a missing id.
    fn generated(n: usize, seed: u64) -> Vec<TodoRecord> {
        let mut state = seed;
        let mut next = move || {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (state >> 33) as usize
        };
        let mut records = Vec::with_capacity(n);
        for i in 0..n {
            let id = format!("t{}", i);
            let parent = match next() % 5 {
                0 => None,
                1 => Some("ghost".to_string()),
                _ if i > 0 => Some(format!("t{}", next() % i)),
                _ => None,
            };
            records.push(make_todo(&id, parent.as_deref()));
        }
        // Shuffle so parents do not always precede children
        for i in (1..records.len()).rev() {
            let j = next() % (i + 1);
            records.swap(i, j);
        }
        records
    }

    fn is_descendant(records: &[TodoRecord], id: &str, ancestor: &str) -> bool {
        let by_id: HashMap<&str, &TodoRecord> = records.iter().map(|r| (r.id.as_str(), r)).collect();
        let mut current = by_id.get(id).and_then(|r| r.parent_id.as_deref());
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = by_id.get(parent).and_then(|r| r.parent_id.as_deref());
        }
        false
    }

    #[test]
    fn test_build_tree_nests_children() {
        let roots = build_tree(&sample());

        assert_eq!(ids(&roots), vec!["a"]);
        assert_eq!(ids(&roots[0].children), vec!["b", "c"]);
        assert_eq!(ids(&roots[0].children[0].children), vec!["d"]);
        assert!(roots[0].children[1].children.is_empty());
    }

    #[test]
    fn test_build_tree_empty_input() {
        assert!(build_tree(&[]).is_empty());
    }

    #[test]
    fn test_dangling_parent_becomes_root() {
        let roots = build_tree(&[make_todo("x", Some("missing"))]);
        assert_eq!(ids(&roots), vec!["x"]);
        assert_eq!(roots[0].record.parent_id.as_deref(), Some("missing"));
    }

    #[test]
    fn test_child_listed_before_parent() {
        let records = vec![make_todo("d", Some("b")), make_todo("b", None)];
        let roots = build_tree(&records);
        assert_eq!(ids(&roots), vec!["b"]);
        assert_eq!(ids(&roots[0].children), vec!["d"]);
    }

    #[test]
    fn test_sibling_and_root_order_follow_input() {
        let records = vec![
            make_todo("r2", None),
            make_todo("c3", Some("r1")),
            make_todo("r1", None),
            make_todo("c1", Some("r1")),
            make_todo("orphan", Some("nope")),
            make_todo("c2", Some("r1")),
        ];
        let roots = build_tree(&records);

        assert_eq!(ids(&roots), vec!["r2", "r1", "orphan"]);
        assert_eq!(ids(&roots[1].children), vec!["c3", "c1", "c2"]);
    }

    #[test]
    fn test_every_record_placed_once() {
        for seed in 1..20 {
            let records = generated(200, seed);
            let roots = build_tree(&records);

            let total: usize = roots.iter().map(TodoNode::subtree_len).sum();
            assert_eq!(total, records.len());

            let flat = flatten_tree(&roots);
            let unique: HashSet<&str> = flat.iter().map(|(r, _)| r.id.as_str()).collect();
            assert_eq!(unique.len(), records.len());
        }
    }

    #[test]
    fn test_generated_order_preserved() {
        let records = generated(150, 7);
        let position: HashMap<&str, usize> =
            records.iter().enumerate().map(|(i, r)| (r.id.as_str(), i)).collect();
        let roots = build_tree(&records);

        let mut groups: Vec<&[TodoNode]> = vec![roots.as_slice()];
        while let Some(group) = groups.pop() {
            let order: Vec<usize> = group.iter().map(|n| position[n.id()]).collect();
            let mut sorted = order.clone();
            sorted.sort_unstable();
            assert_eq!(order, sorted);
            for node in group {
                groups.push(&node.children);
            }
        }
    }

    #[test]
    fn test_cycle_members_are_kept() {
        let records = vec![
            make_todo("root", None),
            make_todo("x", Some("y")),
            make_todo("y", Some("x")),
            make_todo("self", Some("self")),
        ];
        let roots = build_tree(&records);

        assert_eq!(ids(&roots), vec!["root", "x", "self"]);
        assert_eq!(ids(&roots[1].children), vec!["y"]);
        assert!(roots[2].children.is_empty());
    }

    #[test]
    fn test_deep_chain_builds_without_recursion() {
        let mut records = vec![make_todo("n0", None)];
        for i in 1..2_000 {
            records.push(make_todo(&format!("n{}", i), Some(&format!("n{}", i - 1))));
        }
        let roots = build_tree(&records);
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].subtree_len(), 2_000);
    }

    #[test]
    fn test_resolve_subtree_ids() {
        assert_eq!(resolve_subtree_ids(&sample(), "a"), vec!["a", "b", "d", "c"]);
        assert_eq!(resolve_subtree_ids(&sample(), "b"), vec!["b", "d"]);
        assert_eq!(resolve_subtree_ids(&sample(), "c"), vec!["c"]);
    }

    #[test]
    fn test_resolve_unknown_target() {
        assert_eq!(resolve_subtree_ids(&sample(), "zzz"), vec!["zzz"]);
        assert_eq!(resolve_subtree_ids(&[], "a"), vec!["a"]);
    }

    #[test]
    fn test_resolve_matches_ancestry() {
        let records = generated(120, 3);
        for target in records.iter().map(|r| r.id.as_str()) {
            let resolved = resolve_subtree_ids(&records, target);
            assert_eq!(resolved[0], target);

            let unique: HashSet<&str> = resolved.iter().map(String::as_str).collect();
            assert_eq!(unique.len(), resolved.len());

            let expected: HashSet<&str> = records
                .iter()
                .map(|r| r.id.as_str())
                .filter(|id| *id == target || is_descendant(&records, id, target))
                .collect();
            assert_eq!(unique, expected);
        }
    }

    #[test]
    fn test_reversed_resolution_deletes_children_first() {
        let records = generated(120, 11);
        let parent_of: HashMap<&str, Option<&str>> = records
            .iter()
            .map(|r| (r.id.as_str(), r.parent_id.as_deref()))
            .collect();

        for target in records.iter().map(|r| r.id.as_str()) {
            let mut deleted: HashSet<String> = HashSet::new();
            for id in resolve_subtree_ids(&records, target).into_iter().rev() {
                // Every child of the record being deleted must already be gone
                let pending_child = parent_of.iter().any(|(child, parent)| {
                    *parent == Some(id.as_str()) && !deleted.contains(*child)
                });
                assert!(!pending_child, "deleted {} before its children", id);
                deleted.insert(id);
            }
        }
    }

    #[test]
    fn test_resolve_terminates_on_cycle() {
        let records = vec![
            make_todo("x", Some("y")),
            make_todo("y", Some("x")),
            make_todo("z", Some("y")),
        ];
        assert_eq!(resolve_subtree_ids(&records, "x"), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_resolve_deep_chain() {
        let mut records = vec![make_todo("n0", None)];
        for i in 1..100_000 {
            records.push(make_todo(&format!("n{}", i), Some(&format!("n{}", i - 1))));
        }
        let resolved = resolve_subtree_ids(&records, "n0");
        assert_eq!(resolved.len(), 100_000);
        assert_eq!(resolved.last().map(String::as_str), Some("n99999"));
    }

    #[test]
    fn test_flatten_tree_depths() {
        let roots = build_tree(&sample());
        let flat: Vec<(&str, usize)> = flatten_tree(&roots)
            .into_iter()
            .map(|(r, depth)| (r.id.as_str(), depth))
            .collect();
        assert_eq!(flat, vec![("a", 0), ("b", 1), ("d", 2), ("c", 1)]);
    }
}
