//! Output rendering for a detected branch tree.

use crate::{
    errors::Result,
    tree::{BranchTree, Edge},
};
use clap::ValueEnum;
use serde::Serialize;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One `child:parent` line per branch, parents first
    #[default]
    Lines,
    /// A JSON document with the root and the ordered edges
    Json,
    /// An indented drawing of the tree
    Tree,
}

#[derive(Serialize)]
struct Document<'a> {
    root: &'a str,
    edges: Vec<Edge>,
}

pub fn render(tree: &BranchTree, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Lines => Ok(edges_to_string(tree)),
        OutputFormat::Json => {
            let document = Document {
                root: tree.root(),
                edges: tree.edges(),
            };
            Ok(format!("{}\n", serde_json::to_string_pretty(&document)?))
        }
        OutputFormat::Tree => Ok(tree_to_string(tree)),
    }
}

pub fn edges_to_string(tree: &BranchTree) -> String {
    let mut output = String::default();
    for edge in tree.edges() {
        // Writing into a String cannot fail
        let _ = writeln!(output, "{}", edge);
    }
    output
}

pub fn tree_to_string(tree: &BranchTree) -> String {
    let mut output = format!("{}\n", tree.root());
    draw_children(tree, tree.root(), "", &mut output);
    output
}

fn draw_children(tree: &BranchTree, branch: &str, prefix: &str, output: &mut String) {
    let children = tree.children(branch);
    let count = children.len();
    for (i, child) in children.into_iter().enumerate() {
        let last = i + 1 == count;
        let (connector, indent) = if last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };
        output.push_str(&format!("{}{}{}\n", prefix, connector, child));
        draw_children(tree, child, &format!("{}{}", prefix, indent), output);
    }
}
