//! A worked procedural-generation domain: sketching fantasy villages.
//!
//! One specification stands for the whole family of villages; every solve
//! samples a fresh member of the family. The test suite doubles as a usage
//! guide for the constraint vocabulary.

use crate::{error::Result, solver::problem::Problem};

/// Builds the village specification.
pub fn village_problem() -> Result<Problem> {
    let mut problem = Problem::new();
    problem.attribute("size", &[&["hamlet", "town"]])?;
    problem.attribute(
        "landmark",
        &[&["tavern", "chapel", "market", "well"]],
    )?;
    problem.attribute("trade_route", &[])?;
    problem.attribute("prosperous", &[])?;
    problem.attribute("walled", &[])?;

    // Exactly one settlement size.
    problem.unique(&["size hamlet", "size town"])?;
    // Between one and three landmarks; a village of all four reads wrong.
    problem.quantify(
        1.0,
        3.0,
        &[
            "landmark tavern",
            "landmark chapel",
            "landmark market",
            "landmark well",
        ],
    )?;
    // A market needs through-traffic.
    problem.implies(&["landmark market"], "trade_route")?;
    // Prosperity is exactly trade plus a market, nothing else explains it.
    problem.rule("prosperous", &["trade_route", "landmark market"])?;
    // Hamlets never raise walls.
    problem.inconsistent("size hamlet", "walled")?;

    Ok(problem)
}
