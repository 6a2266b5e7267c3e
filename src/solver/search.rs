//! The stochastic local search: a GSAT/WalkSAT-family flip loop over total
//! assignments, with noise adapted by stagnation detection over a sliding
//! window of satisfied-clause counts.

use rand::Rng;
use tracing::{debug, trace};

use crate::{
    error::{Result, SolverError},
    solver::{
        clause::{atom_of, eval_lit, AtomId, CardinalityClause},
        stats::SearchStats,
    },
};

/// Flip budget before a solve gives up. Hitting it is indistinguishable from
/// the problem being unsatisfiable.
pub const MAX_FLIPS: usize = 50_000;

const NOISE_RAISE: f64 = 0.2;
const NOISE_DECAY: f64 = 0.95;

/// One search run's worth of scratch state. The scoring and candidate
/// buffers are allocated once and reused across every flip.
pub struct LocalSearch {
    atom_count: usize,
    /// Net benefit of flipping each atom, rebuilt by every scoring pass.
    scores: Vec<i32>,
    /// Atoms tied for the best score in the current pass.
    candidates: Vec<AtomId>,
    pub stats: SearchStats,
}

impl LocalSearch {
    pub fn new(atom_count: usize) -> Self {
        Self {
            atom_count,
            scores: vec![0; atom_count + 1],
            candidates: Vec::with_capacity(atom_count),
            stats: SearchStats::default(),
        }
    }

    /// Searches for a total assignment satisfying every clause. Atom 0 is
    /// pinned true; all other atoms start uniformly random.
    pub fn run<R: Rng>(
        &mut self,
        clauses: &[CardinalityClause],
        rng: &mut R,
    ) -> Result<Vec<bool>> {
        let total = clauses.len();
        debug_assert!(self.atom_count > 0 || total == 0);
        self.stats = SearchStats {
            clause_count: total,
            atom_count: self.atom_count,
            ..SearchStats::default()
        };

        let mut assignment = vec![false; self.atom_count + 1];
        assignment[0] = true;
        for value in assignment.iter_mut().skip(1) {
            *value = rng.gen();
        }

        let window_len = total.div_ceil(6).max(3);
        let mut window = vec![0usize; window_len];
        let mut noise = 0.0_f64;

        debug!(atoms = self.atom_count, clauses = total, "starting local search");

        let (mut satisfied, mut suggestion) = self.evaluate(clauses, &assignment, rng);
        let mut flips = 0usize;
        while satisfied < total {
            if flips == MAX_FLIPS {
                debug!(satisfied, total, "flip failsafe reached");
                self.stats.flips = flips as u64;
                return Err(SolverError::Timeout(MAX_FLIPS).into());
            }

            let target = if rng.gen::<f64>() < noise {
                self.stats.random_flips += 1;
                rng.gen_range(1..=self.atom_count) as AtomId
            } else {
                self.stats.greedy_flips += 1;
                suggestion
            };
            assignment[target as usize] = !assignment[target as usize];

            // Stalled when no window entry is beaten by the current count.
            if window.iter().all(|&past| past >= satisfied) {
                noise += NOISE_RAISE * (1.0 - noise);
                self.stats.stagnations += 1;
            } else {
                noise *= NOISE_DECAY;
            }
            window[flips % window_len] = satisfied;
            flips += 1;

            if flips % 1024 == 0 {
                trace!(flips, satisfied, noise, "search progress");
            }

            (satisfied, suggestion) = self.evaluate(clauses, &assignment, rng);
        }

        self.stats.flips = flips as u64;
        debug!(flips, "model found");
        Ok(assignment)
    }

    /// One scoring pass over all clauses: counts satisfied clauses and picks
    /// the flip suggestion.
    ///
    /// Contributions per clause, keyed by each literal's current value:
    /// a violated clause one short of `lo` rewards its false literals, one
    /// past `hi` rewards its true literals; a satisfied clause sitting on
    /// `lo` penalizes its true literals, on `hi` its false literals.
    /// Violated clauses further out are beyond the reach of a single flip
    /// and contribute nothing.
    fn evaluate<R: Rng>(
        &mut self,
        clauses: &[CardinalityClause],
        assignment: &[bool],
        rng: &mut R,
    ) -> (usize, AtomId) {
        self.scores.fill(0);
        let mut satisfied = 0;

        for clause in clauses {
            let count = clause.satisfied_count(assignment);
            if clause.lo <= count && count <= clause.hi {
                satisfied += 1;
                if count == clause.lo {
                    self.bump(clause, assignment, true, -1);
                }
                if count == clause.hi {
                    self.bump(clause, assignment, false, -1);
                }
            } else if count + 1 == clause.lo {
                self.bump(clause, assignment, false, 1);
            } else if count == clause.hi + 1 {
                self.bump(clause, assignment, true, 1);
            }
        }

        if self.atom_count == 0 {
            return (satisfied, 0);
        }

        // The best-score accumulator starts at zero, so atoms whose flip
        // changes nothing stay eligible whenever no atom scores positive.
        self.candidates.clear();
        let mut best = 0;
        for atom in 1..=self.atom_count {
            let score = self.scores[atom];
            if score > best {
                best = score;
                self.candidates.clear();
                self.candidates.push(atom as AtomId);
            } else if score == best {
                self.candidates.push(atom as AtomId);
            }
        }

        let suggestion = if self.candidates.is_empty() {
            // Every atom scored negative; any flip hurts, so pick blind.
            rng.gen_range(1..=self.atom_count) as AtomId
        } else {
            self.candidates[rng.gen_range(0..self.candidates.len())]
        };
        (satisfied, suggestion)
    }

    /// Adds `delta` to the score of every atom whose literal in `clause`
    /// currently evaluates to `when`. The pinned atom 0 is never scored.
    fn bump(&mut self, clause: &CardinalityClause, assignment: &[bool], when: bool, delta: i32) {
        for &lit in &clause.lits {
            if eval_lit(assignment, lit) == when {
                let atom = atom_of(lit) as usize;
                if atom != 0 {
                    self.scores[atom] += delta;
                }
            }
        }
    }
}
