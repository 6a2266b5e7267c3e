//! The public face of the solver: declare attributes, post constraints,
//! sample models.
//!
//! Every constructor validates eagerly and compiles down to one or more
//! cardinality clauses in the store; nothing is deferred to solve time
//! except rule completion (and the search itself).

use prettytable::{Cell, Row, Table};
use rand::Rng;
use tracing::debug;

use crate::{
    error::{Result, SolverError},
    solver::{
        clause::{AtomId, CardinalityClause, Lit, TRUE_LIT},
        registry::Registry,
        search::LocalSearch,
        solution::Solution,
        store::ConstraintStore,
    },
};

/// A declarative constraint problem over boolean attributes.
///
/// Not safe for concurrent use; callers that want parallel sampling run
/// independent `Problem` instances.
#[derive(Debug, Clone, Default)]
pub struct Problem {
    registry: Registry,
    store: ConstraintStore,
}

impl Problem {
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            store: ConstraintStore::new(),
        }
    }

    /// Declares an attribute. `domains` holds one finite value set per
    /// argument position (at most three); an empty slice declares a plain
    /// boolean attribute. Every combination of in-domain arguments is
    /// grounded to its own atom immediately.
    pub fn attribute(&mut self, name: &str, domains: &[&[&str]]) -> Result<()> {
        self.registry.declare(name, domains)
    }

    /// Requires the number of true propositions among `propositions` to lie
    /// in `[min, max]`. Fractional bounds are tightened inward. Rejects
    /// bands that are infeasible on their own or that admit every count.
    pub fn quantify(&mut self, min: f64, max: f64, propositions: &[&str]) -> Result<()> {
        let n = propositions.len();
        if !min.is_finite() || !max.is_finite() {
            return Err(
                SolverError::Infeasible(format!("bounds {min}..={max} are not finite")).into(),
            );
        }
        if max < 0.0 {
            return Err(
                SolverError::Infeasible(format!("upper bound {max} is below zero")).into(),
            );
        }
        if min.ceil() > max.floor() {
            return Err(SolverError::Infeasible(format!(
                "no integer count lies in {min}..={max}"
            ))
            .into());
        }
        if min > n as f64 {
            return Err(SolverError::Infeasible(format!(
                "lower bound {min} exceeds the {n} propositions given"
            ))
            .into());
        }
        if min <= 0.0 && max >= n as f64 {
            return Err(SolverError::Vacuous(format!(
                "every count of {n} propositions lies in {min}..={max}"
            ))
            .into());
        }

        let lits = self.resolve_all(propositions)?;
        let lo = min.ceil().max(0.0) as usize;
        let hi = max.floor().min(n as f64) as usize;
        self.store.push(CardinalityClause::new(lo, hi, lits));
        Ok(())
    }

    /// Exactly `count` of `propositions` hold.
    pub fn exactly(&mut self, count: f64, propositions: &[&str]) -> Result<()> {
        if count.fract() != 0.0 {
            return Err(
                SolverError::Infeasible(format!("exact count {count} is not an integer")).into(),
            );
        }
        self.quantify(count, count, propositions)
    }

    /// At least `min` of `propositions` hold.
    pub fn at_least(&mut self, min: f64, propositions: &[&str]) -> Result<()> {
        if min.fract() != 0.0 {
            return Err(
                SolverError::Infeasible(format!("minimum count {min} is not an integer")).into(),
            );
        }
        self.quantify(min, propositions.len() as f64, propositions)
    }

    /// At most `max` of `propositions` hold.
    pub fn at_most(&mut self, max: f64, propositions: &[&str]) -> Result<()> {
        self.quantify(0.0, max, propositions)
    }

    /// Every proposition holds.
    pub fn all(&mut self, propositions: &[&str]) -> Result<()> {
        let n = propositions.len() as f64;
        self.quantify(n, n, propositions)
    }

    /// Exactly one proposition holds.
    pub fn unique(&mut self, propositions: &[&str]) -> Result<()> {
        if propositions.is_empty() {
            return Err(SolverError::Shape("unique over no propositions".to_string()).into());
        }
        self.exactly(1.0, propositions)
    }

    /// `a` and `b` never hold together.
    pub fn inconsistent(&mut self, a: &str, b: &str) -> Result<()> {
        self.at_most(1.0, &[a, b])
    }

    /// A single proposition holds.
    pub fn assert(&mut self, proposition: &str) -> Result<()> {
        self.all(&[proposition])
    }

    /// If every premise holds, the conclusion holds. Unlike [`rule`], this
    /// places no justification obligation on the conclusion.
    ///
    /// [`rule`]: Problem::rule
    pub fn implies(&mut self, premises: &[&str], conclusion: &str) -> Result<()> {
        let premise_lits = self.resolve_all(premises)?;
        let conclusion_lit = self.registry.resolve(conclusion)?;
        self.push_implication(&premise_lits, conclusion_lit);
        Ok(())
    }

    /// The conjunction of `left` holds exactly when the conjunction of
    /// `right` does. An empty side is the constant true.
    pub fn equal(&mut self, left: &[&str], right: &[&str]) -> Result<()> {
        match (left.len(), right.len()) {
            (0, 0) => {
                Err(SolverError::Shape("equivalence of two empty conjunctions".to_string()).into())
            }
            (0, _) => self.all(right),
            (_, 0) => self.all(left),
            (1, 1) => {
                let a = self.registry.resolve(left[0])?;
                let b = self.registry.resolve(right[0])?;
                self.store.push(CardinalityClause::disjunction(vec![a, -b]));
                self.store.push(CardinalityClause::disjunction(vec![-a, b]));
                Ok(())
            }
            (1, _) => {
                let single = self.registry.resolve(left[0])?;
                let conjunction = self.resolve_all(right)?;
                self.push_iff(&conjunction, single);
                Ok(())
            }
            (_, 1) => {
                let single = self.registry.resolve(right[0])?;
                let conjunction = self.resolve_all(left)?;
                self.push_iff(&conjunction, single);
                Ok(())
            }
            _ => {
                let left_lits = self.resolve_all(left)?;
                let right_lits = self.resolve_all(right)?;
                let hidden = self.registry.mint_anonymous() as Lit;
                self.push_iff(&left_lits, hidden);
                self.push_iff(&right_lits, hidden);
                Ok(())
            }
        }
    }

    /// A definitional rule: the premises force the conclusion, and at solve
    /// time the conclusion is completed against every rule that defines it,
    /// so it can only hold when at least one recorded body does.
    pub fn rule(&mut self, conclusion: &str, premises: &[&str]) -> Result<()> {
        let head = self.registry.resolve(conclusion)?;
        if head < 0 {
            return Err(SolverError::Shape(format!(
                "rule head `{}` must not be negated",
                conclusion.trim()
            ))
            .into());
        }
        let premise_lits = self.resolve_all(premises)?;
        self.push_implication(&premise_lits, head);

        let justification = match premise_lits[..] {
            [] => TRUE_LIT,
            [single] => single,
            _ => {
                let body = self.registry.mint_anonymous() as Lit;
                self.push_iff(&premise_lits, body);
                body
            }
        };
        self.store.record_justification(head as AtomId, justification);
        Ok(())
    }

    /// Samples one satisfying assignment with the thread-local RNG.
    pub fn solve(&mut self) -> Result<Solution> {
        self.solve_with_rng(&mut rand::thread_rng())
    }

    /// Like [`solve`](Problem::solve), but with a caller-supplied RNG, so
    /// tests can sample deterministically.
    pub fn solve_with_rng<R: Rng>(&mut self, rng: &mut R) -> Result<Solution> {
        self.store.complete_rules();
        debug!(
            atoms = self.registry.atom_count(),
            clauses = self.store.clauses().len(),
            "solving"
        );
        let mut search = LocalSearch::new(self.registry.atom_count());
        let assignment = search.run(self.store.clauses(), rng)?;
        Ok(Solution::new(assignment, &self.registry, search.stats))
    }

    /// Renders the clause store (and rule justifications, if any) as
    /// human-readable tables.
    pub fn show_constraints(&self) -> String {
        let mut table = Table::new();
        table.add_row(Row::new(vec![
            Cell::new("#"),
            Cell::new("Bounds"),
            Cell::new("Literals"),
        ]));
        for (index, clause) in self.store.clauses().iter().enumerate() {
            let literals = clause
                .lits
                .iter()
                .map(|&lit| self.registry.lit_display(lit))
                .collect::<Vec<_>>()
                .join(", ");
            table.add_row(Row::new(vec![
                Cell::new(&index.to_string()),
                Cell::new(&format!("{}..={}", clause.lo, clause.hi)),
                Cell::new(&literals),
            ]));
        }
        let mut rendered = table.to_string();

        if !self.store.justifications().is_empty() {
            let mut rules = Table::new();
            rules.add_row(Row::new(vec![Cell::new("Head"), Cell::new("Bodies")]));
            for (&head, justifications) in self.store.justifications() {
                let bodies = justifications
                    .iter()
                    .map(|&lit| self.registry.lit_display(lit))
                    .collect::<Vec<_>>()
                    .join(" | ");
                rules.add_row(Row::new(vec![
                    Cell::new(&self.registry.lit_display(head as Lit)),
                    Cell::new(&bodies),
                ]));
            }
            rendered.push_str(&rules.to_string());
        }
        rendered
    }

    fn resolve_all(&self, propositions: &[&str]) -> Result<Vec<Lit>> {
        propositions
            .iter()
            .map(|proposition| self.registry.resolve(proposition))
            .collect()
    }

    /// `p1 & .. & pk -> c` as a single disjunction.
    fn push_implication(&mut self, premises: &[Lit], conclusion: Lit) {
        let mut lits: Vec<Lit> = premises.iter().map(|&premise| -premise).collect();
        lits.push(conclusion);
        self.store.push(CardinalityClause::disjunction(lits));
    }

    /// `p1 & .. & pk <-> c`: the conclusion pulls each premise down, the
    /// premises together push the conclusion up.
    fn push_iff(&mut self, premises: &[Lit], conclusion: Lit) {
        for &premise in premises {
            self.store
                .push(CardinalityClause::disjunction(vec![premise, -conclusion]));
        }
        self.push_implication(premises, conclusion);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use pretty_assertions::assert_eq;
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    /// Collects the distinct models seen over `runs` seeded solves, each as
    /// its sorted list of true attributes.
    fn sample_models(problem: &mut Problem, runs: usize) -> BTreeSet<Vec<String>> {
        let mut rng = StdRng::seed_from_u64(0x5EED);
        (0..runs)
            .map(|_| {
                problem
                    .solve_with_rng(&mut rng)
                    .expect("scenario problems are satisfiable")
                    .true_attributes()
            })
            .collect()
    }

    fn expected(models: &[&[&str]]) -> BTreeSet<Vec<String>> {
        models
            .iter()
            .map(|model| model.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    fn booleans(problem: &mut Problem, names: &[&str]) {
        for name in names {
            problem.attribute(name, &[]).unwrap();
        }
    }

    // --- Model enumeration scenarios ---

    #[test]
    fn negation_loop_rules_exclude_the_joint_model() {
        let mut problem = Problem::new();
        booleans(&mut problem, &["p", "q"]);
        problem.rule("q", &["!p"]).unwrap();
        problem.rule("p", &["!q"]).unwrap();

        // Completion forbids {p, q}; the empty model violates the rules.
        let observed = sample_models(&mut problem, 100);
        assert_eq!(observed, expected(&[&["p"], &["q"]]));
    }

    #[test]
    fn negation_loop_implications_admit_the_joint_model() {
        let mut problem = Problem::new();
        booleans(&mut problem, &["p", "q"]);
        problem.implies(&["!p"], "q").unwrap();
        problem.implies(&["!q"], "p").unwrap();

        let observed = sample_models(&mut problem, 200);
        assert_eq!(observed, expected(&[&["p"], &["q"], &["p", "q"]]));
    }

    #[test]
    fn alternative_rule_bodies_complete_disjunctively() {
        let mut problem = Problem::new();
        booleans(&mut problem, &["a", "b", "c", "d"]);
        problem.rule("a", &["b", "c"]).unwrap();
        problem.rule("a", &["d"]).unwrap();

        let observed = sample_models(&mut problem, 600);
        assert_eq!(
            observed,
            expected(&[
                &[],
                &["b"],
                &["c"],
                &["a", "d"],
                &["a", "b", "c"],
                &["a", "b", "d"],
                &["a", "c", "d"],
                &["a", "b", "c", "d"],
            ])
        );
    }

    #[test]
    fn exactly_two_of_three() {
        let mut problem = Problem::new();
        booleans(&mut problem, &["a", "b", "c"]);
        problem.exactly(2.0, &["a", "b", "c"]).unwrap();

        let observed = sample_models(&mut problem, 200);
        assert_eq!(
            observed,
            expected(&[&["a", "b"], &["a", "c"], &["b", "c"]])
        );
    }

    #[test]
    fn inconsistent_pairs() {
        let mut problem = Problem::new();
        booleans(&mut problem, &["a", "b", "c"]);
        problem.inconsistent("a", "!b").unwrap();
        problem.inconsistent("b", "c").unwrap();

        let observed = sample_models(&mut problem, 400);
        assert_eq!(
            observed,
            expected(&[&[], &["b"], &["c"], &["a", "b"]])
        );
    }

    #[test]
    fn forced_unique_model() {
        let mut problem = Problem::new();
        booleans(&mut problem, &["a", "b", "c", "d", "e", "f", "g"]);
        problem.rule("a", &[]).unwrap();
        problem.rule("b", &["c"]).unwrap();
        problem.rule("c", &["a"]).unwrap();
        problem.assert("!d").unwrap();
        problem.equal(&[], &["f"]).unwrap();
        problem.equal(&["!g", "e"], &[]).unwrap();

        let observed = sample_models(&mut problem, 40);
        assert_eq!(observed, expected(&[&["a", "b", "c", "e", "f"]]));
    }

    #[test]
    fn equal_between_two_conjunctions_uses_a_hidden_atom() {
        let mut problem = Problem::new();
        booleans(&mut problem, &["a", "b", "c", "d"]);
        problem.equal(&["a", "b"], &["c", "d"]).unwrap();

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..60 {
            let solution = problem.solve_with_rng(&mut rng).unwrap();
            let left = solution.lookup("a").unwrap() && solution.lookup("b").unwrap();
            let right = solution.lookup("c").unwrap() && solution.lookup("d").unwrap();
            assert_eq!(left, right);
        }
    }

    #[test]
    fn equal_between_singletons_is_a_biconditional() {
        let mut problem = Problem::new();
        booleans(&mut problem, &["a", "b"]);
        problem.equal(&["a"], &["!b"]).unwrap();

        let observed = sample_models(&mut problem, 100);
        assert_eq!(observed, expected(&[&["a"], &["b"]]));
    }

    #[test]
    fn parameterized_attributes_ground_into_scenarios() {
        let mut problem = Problem::new();
        problem
            .attribute("mood", &[&["calm", "wild", "grim"]])
            .unwrap();
        problem
            .unique(&["mood calm", "mood wild", "mood grim"])
            .unwrap();

        let observed = sample_models(&mut problem, 200);
        assert_eq!(
            observed,
            expected(&[&["mood calm"], &["mood grim"], &["mood wild"]])
        );
    }

    // --- Checkpoint behavior ---

    #[test]
    fn completions_never_duplicate_across_solves() {
        let mut problem = Problem::new();
        booleans(&mut problem, &["a", "b"]);
        problem.rule("a", &["b"]).unwrap();

        let mut rng = StdRng::seed_from_u64(1);
        problem.solve_with_rng(&mut rng).unwrap();
        // 1 user implication + 1 completion clause.
        assert_eq!(problem.store.clauses().len(), 2);

        problem.solve_with_rng(&mut rng).unwrap();
        assert_eq!(problem.store.clauses().len(), 2);

        // A new constraint truncates the completion before appending.
        problem.assert("b").unwrap();
        assert_eq!(problem.store.clauses().len(), 2);

        problem.solve_with_rng(&mut rng).unwrap();
        assert_eq!(problem.store.clauses().len(), 3);
    }

    #[test]
    fn solutions_survive_later_mutation() {
        let mut problem = Problem::new();
        booleans(&mut problem, &["a"]);
        problem.assert("a").unwrap();

        let mut rng = StdRng::seed_from_u64(2);
        let solution = problem.solve_with_rng(&mut rng).unwrap();

        problem.attribute("late", &[]).unwrap();
        problem.assert("!late").unwrap();

        assert!(solution.lookup("a").unwrap());
        assert!(matches!(
            solution.lookup("late").unwrap_err().kind(),
            SolverError::StaleLookup(_)
        ));
    }

    // --- Error taxonomy ---

    fn kind_of(result: Result<()>) -> SolverError {
        match result.unwrap_err() {
            crate::error::Error::Inner { inner, .. } => *inner,
        }
    }

    #[test]
    fn degenerate_bounds_are_rejected_eagerly() {
        let mut problem = Problem::new();
        booleans(&mut problem, &["a", "b", "d"]);
        let props = ["a", "b", "d"];

        assert!(matches!(
            kind_of(problem.quantify(-2.0, -1.0, &props)),
            SolverError::Infeasible(_)
        ));
        assert!(matches!(
            kind_of(problem.quantify(5.0, 6.0, &props)),
            SolverError::Infeasible(_)
        ));
        assert!(matches!(
            kind_of(problem.quantify(2.0, 1.0, &props)),
            SolverError::Infeasible(_)
        ));
        assert!(matches!(
            kind_of(problem.exactly(1.5, &props)),
            SolverError::Infeasible(_)
        ));
        assert!(matches!(
            kind_of(problem.exactly(4.0, &props)),
            SolverError::Infeasible(_)
        ));
        assert!(matches!(
            kind_of(problem.at_most(-1.0, &props)),
            SolverError::Infeasible(_)
        ));
        assert!(matches!(
            kind_of(problem.at_least(4.0, &props)),
            SolverError::Infeasible(_)
        ));

        assert!(matches!(
            kind_of(problem.at_least(0.0, &props)),
            SolverError::Vacuous(_)
        ));
        assert!(matches!(
            kind_of(problem.at_most(3.0, &props)),
            SolverError::Vacuous(_)
        ));
        assert!(matches!(
            kind_of(problem.quantify(0.0, 3.0, &props)),
            SolverError::Vacuous(_)
        ));
        assert!(matches!(kind_of(problem.all(&[])), SolverError::Vacuous(_)));
        assert!(matches!(
            kind_of(problem.exactly(0.0, &[])),
            SolverError::Vacuous(_)
        ));

        // None of the rejected constraints may have advanced solver state.
        assert_eq!(problem.store.clauses().len(), 0);
        assert_eq!(problem.registry.atom_count(), 3);
    }

    #[test]
    fn shape_errors() {
        let mut problem = Problem::new();
        booleans(&mut problem, &["c", "d"]);

        assert!(matches!(kind_of(problem.unique(&[])), SolverError::Shape(_)));
        assert!(matches!(
            kind_of(problem.equal(&[], &[])),
            SolverError::Shape(_)
        ));
        assert!(matches!(
            kind_of(problem.rule("!c", &["d"])),
            SolverError::Shape(_)
        ));
        assert_eq!(problem.store.clauses().len(), 0);
    }

    #[test]
    fn declaration_and_reference_errors() {
        let mut problem = Problem::new();
        booleans(&mut problem, &["a"]);

        assert!(matches!(
            kind_of(problem.attribute("A", &[])),
            SolverError::Grammar(_)
        ));
        assert!(matches!(
            kind_of(problem.attribute("b c", &[])),
            SolverError::Grammar(_)
        ));
        assert!(matches!(
            kind_of(problem.attribute("1b", &[])),
            SolverError::Grammar(_)
        ));
        assert!(matches!(
            kind_of(problem.attribute("x", &[&["d1"], &["d2"], &["d3"], &["d4"]])),
            SolverError::ArityLimit { arity: 4, .. }
        ));
        assert!(matches!(
            kind_of(problem.attribute("a", &[])),
            SolverError::Redeclaration(_)
        ));

        assert!(matches!(
            kind_of(problem.assert("a Z y")),
            SolverError::Grammar(_)
        ));
        assert!(matches!(
            kind_of(problem.assert("ghost")),
            SolverError::UnknownPredicate(_)
        ));
        assert!(matches!(
            kind_of(problem.assert("a y")),
            SolverError::WrongArity { .. }
        ));

        assert_eq!(problem.store.clauses().len(), 0);
        assert_eq!(problem.registry.atom_count(), 1);
    }

    #[test]
    fn contradictory_problems_surface_as_timeouts() {
        let mut problem = Problem::new();
        booleans(&mut problem, &["p"]);
        problem.assert("p").unwrap();
        problem.assert("!p").unwrap();

        let mut rng = StdRng::seed_from_u64(3);
        let err = problem.solve_with_rng(&mut rng).unwrap_err();
        assert!(matches!(err.kind(), SolverError::Timeout(_)));
    }

    #[test]
    fn show_constraints_names_literals() {
        let mut problem = Problem::new();
        booleans(&mut problem, &["p", "q"]);
        problem.implies(&["p"], "q").unwrap();
        problem.rule("q", &["p"]).unwrap();

        let rendered = problem.show_constraints();
        assert!(rendered.contains("!p"));
        assert!(rendered.contains("q"));
        assert!(rendered.contains("1..=2"));
    }
}
