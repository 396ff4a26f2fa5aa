// ── Tree builder ──
//
// Department values are space-separated paths ("Sales Japan Tokyo"). The
// tree merges shared prefixes: one node per distinct label under each parent.

use crate::model::TreeNode;

/// Build the department hierarchy from flat path strings.
///
/// Sibling order is first-seen order, so callers that want a sorted tree
/// pass sorted input. Ids are assigned from 1 in creation order and are only
/// unique within one call. An empty input yields the single sentinel node.
///
/// Runs of spaces keep their empty segments as empty-label nodes, so every
/// node's `full_label` is a real prefix of its trimmed input line and the
/// department filter matches the stored value.
pub fn build_tree<S: AsRef<str>>(lines: &[S]) -> Vec<TreeNode> {
    if lines.is_empty() {
        return vec![TreeNode::sentinel()];
    }

    let mut roots: Vec<TreeNode> = Vec::new();
    let mut next_id: u64 = 1;

    for line in lines {
        let mut level = &mut roots;
        let trimmed = line.as_ref().trim();
        let mut end = 0;

        for (i, segment) in trimmed.split(' ').enumerate() {
            end += segment.len() + usize::from(i > 0);
            let path = &trimmed[..end];

            let pos = if let Some(pos) = level.iter().position(|n| n.label == segment) {
                pos
            } else {
                level.push(TreeNode::new(next_id.to_string(), segment, path));
                next_id += 1;
                level.len() - 1
            };
            level = &mut level[pos].children;
        }
    }

    roots
}
