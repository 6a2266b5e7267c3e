//! The constraint store: an append-only list of cardinality clauses plus the
//! per-head rule justifications used for iff-completion.

use std::collections::BTreeMap;

use crate::solver::clause::{AtomId, CardinalityClause, Lit};

/// Holds every clause of the problem and the rule-justification index.
///
/// Completion clauses are appended once per solve; `non_rule_checkpoint`
/// records the clause count immediately before they were, so the next
/// constraint-adding operation (or the next solve) can truncate them away
/// without touching user-supplied clauses.
#[derive(Debug, Clone, Default)]
pub struct ConstraintStore {
    clauses: Vec<CardinalityClause>,
    /// For each rule head, the justification literals recorded so far. A
    /// justification is the constant-true literal (premise-free rule), a
    /// single premise literal, or an anonymous atom standing in for a
    /// conjunction of premises.
    rules: BTreeMap<AtomId, Vec<Lit>>,
    non_rule_checkpoint: Option<usize>,
}

impl ConstraintStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clauses(&self) -> &[CardinalityClause] {
        &self.clauses
    }

    pub fn justifications(&self) -> &BTreeMap<AtomId, Vec<Lit>> {
        &self.rules
    }

    /// Drops any completion clauses appended by a previous solve.
    fn rollback_completion(&mut self) {
        if let Some(checkpoint) = self.non_rule_checkpoint.take() {
            self.clauses.truncate(checkpoint);
        }
    }

    /// Appends a user clause, first discarding stale completion clauses.
    pub fn push(&mut self, clause: CardinalityClause) {
        self.rollback_completion();
        self.clauses.push(clause);
    }

    /// Records a justification for a rule head.
    pub fn record_justification(&mut self, head: AtomId, justification: Lit) {
        self.rollback_completion();
        self.rules.entry(head).or_default().push(justification);
    }

    /// Materializes iff-completion: for every head `h` with justifications
    /// `j1..jk`, appends `(1, 1+k, [-h, j1..jk])`, i.e. "if `h` holds, some
    /// justification holds". Idempotent across solves via the checkpoint.
    pub fn complete_rules(&mut self) {
        self.rollback_completion();
        self.non_rule_checkpoint = Some(self.clauses.len());
        for (&head, justifications) in &self.rules {
            let mut lits = Vec::with_capacity(1 + justifications.len());
            lits.push(-(head as Lit));
            lits.extend_from_slice(justifications);
            self.clauses.push(CardinalityClause::disjunction(lits));
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::solver::clause::TRUE_LIT;

    fn unit(lit: Lit) -> CardinalityClause {
        CardinalityClause::new(1, 1, vec![lit])
    }

    #[test]
    fn completion_appends_one_clause_per_head() {
        let mut store = ConstraintStore::new();
        store.push(unit(1));
        store.record_justification(2, -1);
        store.record_justification(2, 3);
        store.record_justification(4, TRUE_LIT);

        store.complete_rules();

        assert_eq!(store.clauses().len(), 3);
        assert_eq!(
            store.clauses()[1],
            CardinalityClause::new(1, 3, vec![-2, -1, 3])
        );
        assert_eq!(store.clauses()[2], CardinalityClause::new(1, 2, vec![-4, 0]));
    }

    #[test]
    fn mutation_after_completion_truncates_back() {
        let mut store = ConstraintStore::new();
        store.push(unit(1));
        store.record_justification(2, 1);
        store.complete_rules();
        assert_eq!(store.clauses().len(), 2);

        // Adding a clause rolls the completion back first.
        store.push(unit(3));
        assert_eq!(store.clauses().len(), 2);
        assert_eq!(store.clauses()[1], unit(3));

        // Re-completing never duplicates.
        store.complete_rules();
        store.complete_rules();
        assert_eq!(store.clauses().len(), 3);
    }

    #[test]
    fn recording_a_justification_also_truncates() {
        let mut store = ConstraintStore::new();
        store.record_justification(1, 2);
        store.complete_rules();
        assert_eq!(store.clauses().len(), 1);

        store.record_justification(1, 3);
        assert_eq!(store.clauses().len(), 0);

        store.complete_rules();
        assert_eq!(
            store.clauses()[0],
            CardinalityClause::new(1, 3, vec![-1, 2, 3])
        );
    }
}
