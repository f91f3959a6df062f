//! Employee data types.
//!
//! `EmployeeRecord` is the flat row as stored; `EmployeeNode` is the derived tree
//! returned to callers. The node is written as JSON with the wire names `ID`,
//! `Name`, `ManagerID` and `Employees`.

/// A flat employee row as read from the `Employee` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeRecord {
    pub id: i64,
    pub name: String,
    /// `None` marks a root (no manager).
    pub manager_id: Option<i64>,
    pub enabled: bool,
}

#[cfg(test)]
impl EmployeeRecord {
    pub fn new(id: i64, name: impl Into<String>, manager_id: Option<i64>) -> Self {
        Self {
            id,
            name: name.into(),
            manager_id,
            enabled: true,
        }
    }
}

/// A node in the reporting tree: one employee plus their direct reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeNode {
    pub id: i64,
    pub name: String,
    pub manager_id: Option<i64>,
    pub reports: Vec<EmployeeNode>,
}

/// Pending work while writing a tree.
enum Frame<'a> {
    Open { node: &'a EmployeeNode, first: bool },
    Close,
}

impl EmployeeNode {
    /// Serialize the tree as `{"ID":..,"Name":..,"ManagerID":..,"Employees":[..]}`.
    ///
    /// Uses an explicit stack, so depth is limited by memory rather than call frames.
    /// Scalars go through `serde_json` for escaping.
    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut stack = vec![Frame::Open {
            node: self,
            first: true,
        }];

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Open { node, first } => {
                    if !first {
                        out.push(b',');
                    }
                    out.extend_from_slice(b"{\"ID\":");
                    serde_json::to_writer(&mut out, &node.id)?;
                    out.extend_from_slice(b",\"Name\":");
                    serde_json::to_writer(&mut out, &node.name)?;
                    out.extend_from_slice(b",\"ManagerID\":");
                    serde_json::to_writer(&mut out, &node.manager_id)?;
                    out.extend_from_slice(b",\"Employees\":[");

                    stack.push(Frame::Close);
                    for (i, report) in node.reports.iter().enumerate().rev() {
                        stack.push(Frame::Open {
                            node: report,
                            first: i == 0,
                        });
                    }
                }
                Frame::Close => out.extend_from_slice(b"]}"),
            }
        }

        Ok(out)
    }
}

impl From<&EmployeeRecord> for EmployeeNode {
    fn from(record: &EmployeeRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            manager_id: record.manager_id,
            reports: Vec::new(),
        }
    }
}

// Deep management chains would otherwise drop one stack frame per level.
impl Drop for EmployeeNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.reports);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.reports);
        }
    }
}

/// Convert the store's 0/1 `Enable` column into a bool. Any nonzero value is enabled.
pub fn bit_to_bool(bit: i64) -> bool {
    bit != 0
}
