/// Errors surfaced at the crate's API boundary.
///
/// Violated internal invariants (an impossible expression shape reaching the
/// derivative engine, a broken constructor rewrite) are programming errors
/// and panic instead.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed pattern syntax.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// A structurally valid request the engine rejects, such as a code
    /// point beyond 0x10FFFF or an empty rule vector.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
