//! Reporting-tree reconstruction from flat employee records.
//!
//! Each record only knows its manager, so the tree for an employee is rebuilt by
//! repeatedly collecting the records whose `manager_id` points at an already placed
//! node. Traversal uses an explicit work queue rather than recursion, and every id
//! may be placed once: meeting it again means the manager relation has a cycle.
//!
//! Sibling order is the order of the flat input. The repository reads rows ordered
//! by id, so the same table contents always produce the same tree.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::error::ServiceError;
use crate::schema::{EmployeeNode, EmployeeRecord};

/// How direct reports are located while expanding the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStrategy {
    /// Group records by manager in one pass, then expand by lookup.
    /// O(n) time, O(n) extra memory.
    #[default]
    Indexed,
    /// Rescan the whole record set for every expanded node.
    /// O(n·d) time for a subtree of depth d, no auxiliary index.
    Rescan,
}

impl FromStr for TreeStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "indexed" => Ok(Self::Indexed),
            "rescan" => Ok(Self::Rescan),
            other => Err(format!(
                "unknown tree strategy '{}' (expected 'indexed' or 'rescan')",
                other
            )),
        }
    }
}

impl fmt::Display for TreeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Indexed => f.write_str("indexed"),
            Self::Rescan => f.write_str("rescan"),
        }
    }
}

/// Where direct reports come from during expansion.
enum ReportSource<'a> {
    Index(HashMap<i64, Vec<&'a EmployeeRecord>>),
    Scan,
}

impl<'a> ReportSource<'a> {
    fn new(records: &'a [EmployeeRecord], strategy: TreeStrategy) -> Self {
        match strategy {
            TreeStrategy::Indexed => {
                let mut index: HashMap<i64, Vec<&EmployeeRecord>> = HashMap::new();
                for record in records {
                    if let Some(manager_id) = record.manager_id {
                        index.entry(manager_id).or_default().push(record);
                    }
                }
                Self::Index(index)
            }
            TreeStrategy::Rescan => Self::Scan,
        }
    }
}

/// A record placed in the tree, with the queue position of its manager.
struct Placed<'a> {
    record: &'a EmployeeRecord,
    parent: Option<usize>,
}

/// Find `target_id` in `records` and build its full tree of direct and indirect reports.
///
/// Returns `Ok(None)` when no record has that id. A record whose manager does not
/// exist is still a valid root of its own tree.
pub fn find_and_build_tree(
    records: &[EmployeeRecord],
    target_id: i64,
    strategy: TreeStrategy,
) -> Result<Option<EmployeeNode>, ServiceError> {
    let Some(root) = records.iter().find(|r| r.id == target_id) else {
        debug!("Employee {} not present in {} records", target_id, records.len());
        return Ok(None);
    };

    let source = ReportSource::new(records, strategy);
    let mut placed = vec![Placed {
        record: root,
        parent: None,
    }];
    let mut visited = HashSet::from([root.id]);

    // Breadth-first: every manager is placed before any of its reports.
    let mut cursor = 0;
    while cursor < placed.len() {
        let manager_id = placed[cursor].record.id;
        match &source {
            ReportSource::Index(index) => {
                for &report in index.get(&manager_id).into_iter().flatten() {
                    place(&mut placed, &mut visited, report, cursor)?;
                }
            }
            ReportSource::Scan => {
                for report in records.iter().filter(|r| r.manager_id == Some(manager_id)) {
                    place(&mut placed, &mut visited, report, cursor)?;
                }
            }
        }
        cursor += 1;
    }

    debug!(
        "Built tree for employee {} ({} nodes, strategy={})",
        target_id,
        placed.len(),
        strategy
    );

    Ok(assemble(&placed))
}

fn place<'a>(
    placed: &mut Vec<Placed<'a>>,
    visited: &mut HashSet<i64>,
    report: &'a EmployeeRecord,
    parent: usize,
) -> Result<(), ServiceError> {
    if !visited.insert(report.id) {
        return Err(ServiceError::CyclicHierarchy {
            employee_id: report.id,
            manager_id: placed[parent].record.id,
        });
    }
    placed.push(Placed {
        record: report,
        parent: Some(parent),
    });
    Ok(())
}

/// Fold the placement queue into nested nodes, last placed first.
///
/// A node's reports all sit after it in the queue, so by the time a node is popped
/// its reports are attached (in reverse, hence the flip).
fn assemble(placed: &[Placed<'_>]) -> Option<EmployeeNode> {
    let mut nodes: Vec<EmployeeNode> = placed.iter().map(|p| EmployeeNode::from(p.record)).collect();

    while let Some(mut node) = nodes.pop() {
        node.reports.reverse();
        match placed[nodes.len()].parent {
            Some(parent) => nodes[parent].reports.push(node),
            None => return Some(node),
        }
    }

    None
}

/// Total number of nodes in a tree, root included.
pub fn count_nodes(root: &EmployeeNode) -> usize {
    let mut count = 0;
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        count += 1;
        stack.extend(node.reports.iter());
    }
    count
}
