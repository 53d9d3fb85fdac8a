//! Agent loop state management
//!
//! Tracks the Ask iterations spent within a single turn.

/// Iteration budget for one turn
#[derive(Debug, Clone)]
pub struct IterationBudget {
    /// Ask iterations started so far
    pub iteration: usize,
    /// Maximum allowed iterations
    pub max_iterations: usize,
}

impl IterationBudget {
    /// Create a fresh budget; the counter starts at zero
    pub fn new(max_iterations: usize) -> Self {
        Self {
            iteration: 0,
            max_iterations,
        }
    }

    /// Count one more Ask step.
    ///
    /// Returns `false` once the count exceeds the cap, in which case the
    /// turn must stop without calling the model.
    pub fn advance(&mut self) -> bool {
        self.iteration += 1;
        self.iteration <= self.max_iterations
    }
}

/// How a turn ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The model replied without tool calls
    Answered(String),
    /// The iteration cap was passed
    BudgetExhausted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_new() {
        let budget = IterationBudget::new(10);
        assert_eq!(budget.iteration, 0);
        assert_eq!(budget.max_iterations, 10);
    }

    #[test]
    fn test_advance_until_exhausted() {
        let mut budget = IterationBudget::new(2);
        assert!(budget.advance());
        assert!(budget.advance());

        assert!(!budget.advance()); // third Ask exceeds the cap
        assert_eq!(budget.iteration, 3);
    }
}
