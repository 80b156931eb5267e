use std::collections::HashMap;

use crate::error::TaskError;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Detect cycles in a dependency graph using DFS 3-color algorithm.
/// `edges` holds `(task_id, dependency_id)` pairs: the task depends on the
/// dependency. Nodes are visited in the order given so the reported cycle
/// is stable across runs.
pub fn detect_cycle(nodes: &[String], edges: &[(String, String)]) -> Result<(), TaskError> {
    match find_cycle(nodes, edges) {
        Some(path) => Err(TaskError::cycle_detected(&path)),
        None => Ok(()),
    }
}

/// The first cycle found, as a path that starts and ends on the revisited
/// node (`a -> b -> a`).
pub fn find_cycle(nodes: &[String], edges: &[(String, String)]) -> Option<Vec<String>> {
    let mut adj: HashMap<&str, Vec<&str>> = HashMap::new();
    for node in nodes {
        adj.entry(node.as_str()).or_default();
    }
    for (task_id, dep_id) in edges {
        adj.entry(task_id.as_str()).or_default().push(dep_id.as_str());
    }

    let mut color: HashMap<&str, Color> = adj.keys().map(|node| (*node, Color::White)).collect();
    let mut stack: Vec<&str> = Vec::new();

    for node in nodes {
        if color.get(node.as_str()) == Some(&Color::White) {
            if let Some(path) = visit(node, &adj, &mut color, &mut stack) {
                return Some(path);
            }
        }
    }
    None
}

fn visit<'a>(
    node: &'a str,
    adj: &HashMap<&'a str, Vec<&'a str>>,
    color: &mut HashMap<&'a str, Color>,
    stack: &mut Vec<&'a str>,
) -> Option<Vec<String>> {
    color.insert(node, Color::Gray);
    stack.push(node);
    if let Some(neighbors) = adj.get(node) {
        for &neighbor in neighbors {
            match color.get(neighbor).copied().unwrap_or(Color::White) {
                Color::Gray => {
                    // back edge: the cycle is the stack suffix from `neighbor`
                    let start = stack.iter().position(|n| *n == neighbor).unwrap_or(0);
                    let mut path: Vec<String> = stack[start..].iter().map(|n| n.to_string()).collect();
                    path.push(neighbor.to_string());
                    return Some(path);
                }
                Color::White => {
                    if let Some(path) = visit(neighbor, adj, color, stack) {
                        return Some(path);
                    }
                }
                Color::Black => {}
            }
        }
    }
    stack.pop();
    color.insert(node, Color::Black);
    None
}
