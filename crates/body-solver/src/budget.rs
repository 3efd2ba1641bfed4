//! Hard cap on model deformations for one solve.

/// Counts deformations against a fixed limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeformationBudget {
    limit: usize,
    spent: usize,
}

impl DeformationBudget {
    pub fn new(limit: usize) -> Self {
        Self { limit, spent: 0 }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn spent(&self) -> usize {
        self.spent
    }

    pub fn remaining(&self) -> usize {
        self.limit - self.spent
    }

    pub fn is_exhausted(&self) -> bool {
        self.spent >= self.limit
    }

    /// Spend one deformation if any remain.
    pub fn try_spend(&mut self) -> bool {
        if self.is_exhausted() {
            false
        } else {
            self.spent += 1;
            true
        }
    }

    /// How many of `count` deformations fit in what is left.
    pub fn grant(&self, count: usize) -> usize {
        count.min(self.remaining())
    }

    /// Record deformations performed under an earlier `grant`.
    pub fn record(&mut self, count: usize) {
        debug_assert!(count <= self.remaining(), "deformation budget overspent");
        self.spent = (self.spent + count).min(self.limit);
    }
}
