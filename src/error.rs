use std::backtrace::Backtrace;
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Everything that can go wrong while declaring attributes, posting
/// constraints, solving, or reading a solution back.
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    /// An attribute name or argument does not match `[a-z][A-Za-z0-9_]*`.
    #[error("malformed identifier `{0}`")]
    Grammar(String),

    /// The predicate was already declared.
    #[error("predicate `{0}` is already declared")]
    Redeclaration(String),

    /// Predicates take at most three arguments.
    #[error("predicate `{name}` declared with {arity} argument positions; at most 3 are supported")]
    ArityLimit { name: String, arity: usize },

    /// A proposition referenced a predicate that was never declared.
    #[error("unknown predicate `{0}`")]
    UnknownPredicate(String),

    /// A proposition supplied the wrong number of arguments.
    #[error("predicate `{name}` takes {expected} arguments, got {got}")]
    WrongArity {
        name: String,
        expected: usize,
        got: usize,
    },

    /// An argument is not a member of its declared domain.
    #[error("`{argument}` is not in the domain of position {position} of predicate `{name}`")]
    OutOfDomain {
        name: String,
        position: usize,
        argument: String,
    },

    /// The constraint is structurally malformed, e.g. a rule with a negated
    /// head or an equivalence between two empty conjunctions.
    #[error("malformed constraint: {0}")]
    Shape(String),

    /// The constraint is trivially true over its arguments and would never
    /// prune anything.
    #[error("vacuous constraint: {0}")]
    Vacuous(String),

    /// The constraint is unsatisfiable in isolation.
    #[error("infeasible constraint: {0}")]
    Infeasible(String),

    /// The search hit its flip failsafe. Indistinguishable from an
    /// unsatisfiable problem.
    #[error("no model found within {0} flips")]
    Timeout(usize),

    /// A solution was queried for an attribute that did not exist when the
    /// solution was produced.
    #[error("attribute `{0}` did not exist when this solution was produced")]
    StaleLookup(String),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Inner: {inner}\n{backtrace}")]
    Inner {
        inner: Box<SolverError>,
        backtrace: Box<Backtrace>,
    },
}

impl Error {
    /// The underlying error kind, without the capture context.
    pub fn kind(&self) -> &SolverError {
        match self {
            Error::Inner { inner, .. } => inner,
        }
    }
}

impl From<SolverError> for Error {
    fn from(inner: SolverError) -> Self {
        Error::Inner {
            inner: Box::new(inner),
            backtrace: Box::new(std::backtrace::Backtrace::capture()),
        }
    }
}
