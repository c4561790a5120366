use twr_ir::InsnId;

/// An inclusive, contiguous span of nodes excluded from coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IgnoredRange {
    pub first: InsnId,
    pub last: InsnId,
}

impl IgnoredRange {
    pub fn new(first: InsnId, last: InsnId) -> Self {
        debug_assert!(first <= last, "range {first}..={last} is reversed");
        Self { first, last }
    }

    pub fn contains(&self, id: InsnId) -> bool {
        self.first <= id && id <= self.last
    }

    /// Number of nodes in the range, markers included.
    pub fn node_count(&self) -> usize {
        self.last.0 - self.first.0 + 1
    }
}

/// Receives the ranges a filter decides to ignore.
pub trait IgnoreSink {
    fn ignore(&mut self, first: InsnId, last: InsnId);
}

impl IgnoreSink for Vec<IgnoredRange> {
    fn ignore(&mut self, first: InsnId, last: InsnId) {
        self.push(IgnoredRange::new(first, last));
    }
}
