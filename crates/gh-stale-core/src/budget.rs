//! Operation budget
//!
//! Every remote call consumes one operation. The counter may go below
//! zero within an item; the run stops at the next check.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationBudget {
    initial: i64,
    consumed: i64,
}

impl OperationBudget {
    pub fn new(initial: i64) -> Self {
        Self {
            initial,
            consumed: 0,
        }
    }

    pub fn consume(&mut self) {
        self.consume_many(1);
    }

    pub fn consume_many(&mut self, count: i64) {
        self.consumed += count;
    }

    pub fn consumed(&self) -> i64 {
        self.consumed
    }

    /// Operations left, never below zero
    pub fn remaining(&self) -> i64 {
        (self.initial - self.consumed).max(0)
    }

    pub fn has_remaining(&self) -> bool {
        self.initial - self.consumed > 0
    }
}
