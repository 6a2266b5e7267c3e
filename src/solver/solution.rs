use crate::{
    error::{Result, SolverError},
    solver::{
        clause::AtomId,
        registry::{is_identifier, Registry},
        stats::SearchStats,
    },
};

/// An immutable view of one satisfying assignment.
///
/// A `Solution` snapshots the assignment and the registry's name tables at
/// the moment the solve finished. The snapshots are persistent structures,
/// so they stay valid (and cheap) while the originating problem keeps
/// accumulating attributes and constraints. Attributes minted after the
/// solve are simply absent from the snapshot, and looking them up fails.
#[derive(Clone, Debug)]
pub struct Solution {
    assignment: Vec<bool>,
    atoms: im::HashMap<String, AtomId>,
    names: im::Vector<String>,
    /// Statistics of the search run that produced this solution.
    pub stats: SearchStats,
}

impl Solution {
    pub(crate) fn new(assignment: Vec<bool>, registry: &Registry, stats: SearchStats) -> Self {
        debug_assert_eq!(assignment.len(), registry.atom_count() + 1);
        debug_assert!(assignment[0]);
        Self {
            assignment,
            atoms: registry.atoms_snapshot(),
            names: registry.names_snapshot(),
            stats,
        }
    }

    /// Every named attribute assigned true, lexicographically sorted.
    /// Anonymous solver-internal atoms are excluded.
    pub fn true_attributes(&self) -> Vec<String> {
        let mut attributes: Vec<String> = self
            .names
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(id, name)| !name.is_empty() && self.assignment[*id])
            .map(|(_, name)| name.clone())
            .collect();
        attributes.sort();
        attributes
    }

    /// The truth value of a proposition under this solution. A leading `!`
    /// negates the result. Fails if the attribute did not exist when the
    /// solution was produced.
    pub fn lookup(&self, proposition: &str) -> Result<bool> {
        let text = proposition.trim();
        let (negated, body) = match text.strip_prefix('!') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, text),
        };

        let tokens: Vec<&str> = body.split_whitespace().collect();
        if tokens.is_empty() || tokens.iter().any(|token| !is_identifier(token)) {
            return Err(SolverError::Grammar(proposition.to_string()).into());
        }
        let key = tokens.join(" ");

        let id = self
            .atoms
            .get(&key)
            .ok_or_else(|| SolverError::StaleLookup(key.clone()))?;
        let value = self.assignment[*id as usize];
        Ok(if negated { !value } else { value })
    }
}
