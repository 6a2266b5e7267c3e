use prettytable::{Cell, Row, Table};

/// Holds statistics for a single search run.
#[derive(Debug, Default, Clone, Copy)]
pub struct SearchStats {
    /// Total flips performed before a model was found (or the failsafe hit).
    pub flips: u64,
    /// Flips that followed the scoring pass's suggestion.
    pub greedy_flips: u64,
    /// Flips of a uniformly chosen atom, taken on the noise branch.
    pub random_flips: u64,
    /// How often the sliding window detected a stall and noise was raised.
    pub stagnations: u64,
    /// Number of clauses scored each pass, completion clauses included.
    pub clause_count: usize,
    /// Number of atoms in play, anonymous temporaries included.
    pub atom_count: usize,
}

pub fn render_stats_table(stats: &SearchStats) -> String {
    let mut table = Table::new();
    table.add_row(Row::new(vec![Cell::new("Metric"), Cell::new("Value")]));

    let rows: [(&str, String); 6] = [
        ("Atoms", stats.atom_count.to_string()),
        ("Clauses", stats.clause_count.to_string()),
        ("Flips", stats.flips.to_string()),
        ("Greedy flips", stats.greedy_flips.to_string()),
        ("Random flips", stats.random_flips.to_string()),
        ("Stagnation events", stats.stagnations.to_string()),
    ];
    for (label, value) in rows {
        table.add_row(Row::new(vec![Cell::new(label), Cell::new(&value)]));
    }

    table.to_string()
}
