//! The identifier registry: a bijection between textual attribute names and
//! dense positive atom ids.
//!
//! Predicates are declared with up to three finite string domains and are
//! grounded eagerly: every combination of in-domain arguments gets its atom
//! id at declaration time. Anonymous atoms (solver-internal temporaries) live
//! in the same id space with an empty display name.

use std::collections::HashMap;

use crate::{
    error::{Result, SolverError},
    solver::clause::{atom_of, AtomId, Lit, TRUE_LIT},
};

#[derive(Debug, Clone)]
struct PredicateInfo {
    /// One entry per argument position, each a finite set of allowed values.
    domains: Vec<Vec<String>>,
}

impl PredicateInfo {
    fn arity(&self) -> usize {
        self.domains.len()
    }
}

/// Maps attribute names to atom ids and back.
///
/// The `id -> name` vector and the `ground name -> id` map are persistent
/// structures, so a [`Solution`](crate::solver::solution::Solution) can hold
/// an O(1) snapshot of both that stays valid while the live registry keeps
/// growing.
#[derive(Debug, Clone)]
pub struct Registry {
    predicates: HashMap<String, PredicateInfo>,
    atoms_by_name: im::HashMap<String, AtomId>,
    /// Dense `id -> display name`. Index 0 is the reserved always-true atom;
    /// anonymous atoms have the empty name.
    names: im::Vector<String>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// `[a-z][A-Za-z0-9_]*`
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn ground_name(name: &str, args: &[&str]) -> String {
    if args.is_empty() {
        name.to_string()
    } else {
        let mut out = String::from(name);
        for arg in args {
            out.push(' ');
            out.push_str(arg);
        }
        out
    }
}

impl Registry {
    pub fn new() -> Self {
        let mut names = im::Vector::new();
        names.push_back(String::new()); // slot 0: the reserved TRUE atom
        Self {
            predicates: HashMap::new(),
            atoms_by_name: im::HashMap::new(),
            names,
        }
    }

    /// The number of real atoms minted so far (the reserved atom excluded).
    pub fn atom_count(&self) -> usize {
        self.names.len() - 1
    }

    /// Declares a predicate and eagerly grounds it: one atom per combination
    /// of in-domain arguments, minted in argument order with the rightmost
    /// position varying fastest.
    pub fn declare(&mut self, name: &str, domains: &[&[&str]]) -> Result<()> {
        if !is_identifier(name) {
            return Err(SolverError::Grammar(name.to_string()).into());
        }
        if domains.len() > 3 {
            return Err(SolverError::ArityLimit {
                name: name.to_string(),
                arity: domains.len(),
            }
            .into());
        }
        for domain in domains {
            for element in *domain {
                if !is_identifier(element) {
                    return Err(SolverError::Grammar(element.to_string()).into());
                }
            }
        }
        if self.predicates.contains_key(name) {
            return Err(SolverError::Redeclaration(name.to_string()).into());
        }

        let domains: Vec<Vec<String>> = domains
            .iter()
            .map(|domain| {
                let mut seen = Vec::new();
                for element in *domain {
                    if !seen.iter().any(|s: &String| s == element) {
                        seen.push((*element).to_string());
                    }
                }
                seen
            })
            .collect();

        let mut tuples: Vec<Vec<&str>> = vec![Vec::new()];
        for domain in &domains {
            tuples = tuples
                .iter()
                .flat_map(|tuple| {
                    domain.iter().map(move |element| {
                        let mut next = tuple.clone();
                        next.push(element.as_str());
                        next
                    })
                })
                .collect();
        }
        for tuple in &tuples {
            let ground = ground_name(name, tuple);
            let id = self.names.len() as AtomId;
            self.names.push_back(ground.clone());
            self.atoms_by_name.insert(ground, id);
        }

        self.predicates
            .insert(name.to_string(), PredicateInfo { domains });
        Ok(())
    }

    /// Mints a fresh atom with no public name.
    pub fn mint_anonymous(&mut self) -> AtomId {
        let id = self.names.len() as AtomId;
        self.names.push_back(String::new());
        id
    }

    /// Resolves a textual proposition (optional leading `!`, predicate name,
    /// space-separated arguments) to a signed literal.
    pub fn resolve(&self, proposition: &str) -> Result<Lit> {
        let text = proposition.trim();
        let (negated, body) = match text.strip_prefix('!') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, text),
        };

        let mut tokens = body.split_whitespace();
        let name = tokens
            .next()
            .ok_or_else(|| SolverError::Grammar(proposition.to_string()))?;
        if !is_identifier(name) {
            return Err(SolverError::Grammar(name.to_string()).into());
        }
        let args: Vec<&str> = tokens.collect();
        for arg in &args {
            if !is_identifier(arg) {
                return Err(SolverError::Grammar((*arg).to_string()).into());
            }
        }

        let info = self
            .predicates
            .get(name)
            .ok_or_else(|| SolverError::UnknownPredicate(name.to_string()))?;
        if args.len() != info.arity() {
            return Err(SolverError::WrongArity {
                name: name.to_string(),
                expected: info.arity(),
                got: args.len(),
            }
            .into());
        }
        for (position, arg) in args.iter().enumerate() {
            if !info.domains[position].iter().any(|element| element == arg) {
                return Err(SolverError::OutOfDomain {
                    name: name.to_string(),
                    position,
                    argument: (*arg).to_string(),
                }
                .into());
            }
        }

        // Eager grounding guarantees the atom exists.
        let id = *self.atoms_by_name.get(&ground_name(name, &args)).unwrap();
        Ok(if negated { -(id as Lit) } else { id as Lit })
    }

    /// Renders a literal for diagnostics. Anonymous atoms show as `@id`.
    pub fn lit_display(&self, lit: Lit) -> String {
        if lit == TRUE_LIT {
            return "true".to_string();
        }
        let id = atom_of(lit) as usize;
        let name = &self.names[id];
        let shown = if name.is_empty() {
            format!("@{id}")
        } else {
            name.clone()
        };
        if lit < 0 {
            format!("!{shown}")
        } else {
            shown
        }
    }

    /// O(1) snapshot of the `id -> name` vector.
    pub fn names_snapshot(&self) -> im::Vector<String> {
        self.names.clone()
    }

    /// O(1) snapshot of the `ground name -> id` map.
    pub fn atoms_snapshot(&self) -> im::HashMap<String, AtomId> {
        self.atoms_by_name.clone()
    }
}
