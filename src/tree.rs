use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub child: String,
    pub parent: String,
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.child, self.parent)
    }
}

/// Branches forked from `root`, each attached to its nearest parent
#[derive(Debug, Clone)]
pub struct BranchTree {
    root: String,
    parents: BTreeMap<String, String>,
}

impl BranchTree {
    /// Every chain of parents is guaranteed to end at `root`: cycles and
    /// dangling parents are reattached to the root
    pub fn new(root: String, mut parents: BTreeMap<String, String>) -> Self {
        parents.remove(&root);
        while let Some(branch) = Self::find_detached(&root, &parents) {
            if let Some(parent) = parents.get_mut(&branch) {
                log::warn!(
                    "Parents of '{}' never lead back to '{}' (stuck at '{}'), attaching it directly",
                    branch,
                    root,
                    parent
                );
                *parent = root.clone();
            }
        }
        Self { root, parents }
    }

    /// First branch, by name, of a parent chain that never reaches the root
    fn find_detached(root: &str, parents: &BTreeMap<String, String>) -> Option<String> {
        let mut reaches_root = BTreeSet::new();
        for start in parents.keys() {
            let mut path = Vec::new();
            let mut current = start.as_str();
            loop {
                if current == root || reaches_root.contains(current) {
                    reaches_root.extend(path.into_iter().map(str::to_string));
                    break;
                }
                let Some(parent) = parents.get(current) else {
                    // Dangling parent: the last branch on the path points outside the tree
                    return path.last().map(|branch: &&str| branch.to_string());
                };
                if let Some(position) = path.iter().position(|branch| *branch == current) {
                    return path[position..].iter().min().map(|branch| branch.to_string());
                }
                path.push(current);
                current = parent.as_str();
            }
        }
        None
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Direct children of `branch`, ordered by name
    pub fn children(&self, branch: &str) -> Vec<&str> {
        self.parents
            .iter()
            .filter(|(_, parent)| parent.as_str() == branch)
            .map(|(child, _)| child.as_str())
            .collect()
    }

    /// Depth-first pre-order from the root's children: every parent comes before its children
    pub fn edges(&self) -> Vec<Edge> {
        let mut edges = Vec::with_capacity(self.parents.len());
        self.visit(&self.root, &mut edges);
        edges
    }

    fn visit(&self, parent: &str, edges: &mut Vec<Edge>) {
        for child in self.children(parent) {
            edges.push(Edge {
                child: child.to_string(),
                parent: parent.to_string(),
            });
            self.visit(child, edges);
        }
    }
}
