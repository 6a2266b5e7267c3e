//! Motley is a randomized declarative constraint solver for procedural
//! content generation.
//!
//! A caller declares a vocabulary of boolean **attributes** (optionally
//! parameterized by finite string domains), attaches logical constraints
//! over them, and asks for a satisfying truth assignment. The solver is
//! deliberately stochastic: repeated solves of the same problem sample
//! *different* models, so one specification can stand for a whole family of
//! generated worlds.
//!
//! # Core Concepts
//!
//! - **[`Problem`]**: the mutable specification: attributes plus
//!   constraints (`quantify`, `implies`, `equal`, `rule`, ...). Constraints
//!   compile to generalized-cardinality clauses; `rule` additionally records
//!   a justification that is completed at solve time, so rule heads hold
//!   only when some body fires.
//! - **[`Solution`]**: an immutable snapshot of one model. It stays valid
//!   while the problem keeps growing.
//! - The search is an adaptive-noise WalkSAT-style flip loop; it is
//!   incomplete, and a solve of an unsatisfiable (or just unlucky) problem
//!   fails with a timeout after a fixed flip budget.
//!
//! # Example: a tiny world sketch
//!
//! ```
//! use motley::solver::problem::Problem;
//!
//! # fn main() -> motley::error::Result<()> {
//! let mut world = Problem::new();
//! world.attribute("biome", &[&["forest", "desert", "tundra"]])?;
//! world.attribute("has_river", &[])?;
//! world.attribute("has_oasis", &[])?;
//!
//! // Exactly one biome per world.
//! world.unique(&["biome forest", "biome desert", "biome tundra"])?;
//! // An oasis is exactly a watered desert.
//! world.rule("has_oasis", &["biome desert", "has_river"])?;
//! // Tundra rivers are frozen over.
//! world.implies(&["biome tundra"], "!has_river")?;
//!
//! let solution = world.solve()?;
//! for attribute in solution.true_attributes() {
//!     println!("{attribute}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Each run of the example may print a different world; the constraints are
//! what all of them have in common.
//!
//! [`Problem`]: solver::problem::Problem
//! [`Solution`]: solver::solution::Solution

pub mod error;
pub mod examples;
pub mod solver;
