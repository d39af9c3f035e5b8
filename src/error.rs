//! Rich diagnostic error types for the triadic engine.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text. Expected outcomes of exploratory work
//! (a rejected candidate, an unresolved target) are *not* errors and never
//! appear here; they are reported through return values instead.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the triadic engine.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum TriadicError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Rational(#[from] RationalError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Infer(#[from] InferError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Concept(#[from] ConceptError),
}

// ---------------------------------------------------------------------------
// Rational errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum RationalError {
    #[error("division by zero: cannot reduce {numerator}/0")]
    #[diagnostic(
        code(triadic::rational::division_by_zero),
        help("A ratio needs a non-zero denominator. Check the divisor roles of the quadruple.")
    )]
    DivisionByZero { numerator: String },
}

// ---------------------------------------------------------------------------
// Discovery errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum DiscoveryError {
    #[error("invalid input: {reason}")]
    #[diagnostic(
        code(triadic::discovery::invalid_input),
        help(
            "Observations must be four non-negative integers with four matching labels, \
             and the C2/C3 roles must stay non-zero after dividing out the shared GCD."
        )
    )]
    InvalidInput { reason: String },

    #[error("irreducible result: {numerator}/{denominator} is not an integer")]
    #[diagnostic(
        code(triadic::discovery::irreducible),
        help(
            "Generative mode only produces exact integers. The coefficients (a, b) \
             do not balance these inputs to a whole C4; rounding would corrupt the relation."
        )
    )]
    IrreducibleResult {
        numerator: String,
        denominator: String,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Rational(#[from] RationalError),
}

impl DiscoveryError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Graph errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum GraphError {
    #[error("node not found: \"{label}\"")]
    #[diagnostic(
        code(triadic::graph::node_not_found),
        help("No accepted relation mentions this label. Add an observation containing it first.")
    )]
    NodeNotFound { label: String },

    #[error("expected {expected} labels, got {actual}")]
    #[diagnostic(
        code(triadic::graph::label_arity),
        help("A relation always spans exactly four quantities (C1, C2, C3, C4).")
    )]
    LabelArity { expected: usize, actual: usize },
}

// ---------------------------------------------------------------------------
// Inference errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum InferError {
    #[error("division by zero while solving for \"{label}\"")]
    #[diagnostic(
        code(triadic::infer::division_by_zero),
        help(
            "A known quantity in the divisor role is zero, so this relation cannot \
             determine the missing label. The solver skips the relation and continues."
        )
    )]
    DivisionByZero { label: String },

    #[error("additive law not found: \"{name}\"")]
    #[diagnostic(
        code(triadic::infer::unknown_law),
        help("Register the law with `AdditiveLawRegistry::register` before referring to it.")
    )]
    UnknownLaw { name: String },

    #[error("invalid additive law \"{name}\": {reason}")]
    #[diagnostic(
        code(triadic::infer::invalid_law),
        help(
            "An additive law needs a unique name, at least one part, \
             and a total that is not itself one of the parts."
        )
    )]
    InvalidLaw { name: String, reason: String },
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read {path}")]
    #[diagnostic(
        code(triadic::config::read),
        help("Ensure the file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}")]
    #[diagnostic(
        code(triadic::config::write),
        help("Check that the parent directory is writable and the disk is not full.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    #[diagnostic(
        code(triadic::config::parse),
        help(
            "Check the TOML syntax. Engine configs use the [discovery], [inference] \
             and [units] sections; scenarios add [[observation]], [[law]] and [[query]]."
        )
    )]
    Parse { path: String, message: String },

    #[error("invalid configuration: {message}")]
    #[diagnostic(code(triadic::config::invalid), help("{message}"))]
    Invalid { message: String },
}

// ---------------------------------------------------------------------------
// Concept errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConceptError {
    #[error("concept not defined: \"{word}\"")]
    #[diagnostic(
        code(triadic::concept::unknown_concept),
        help("Only words with an attribute definition can be mapped. Run `triadic concept` to list them.")
    )]
    UnknownConcept { word: String },

    #[error("attribute \"{attribute}\" of \"{concept}\" is not in the prime basis")]
    #[diagnostic(
        code(triadic::concept::unknown_attribute),
        help("Every attribute a concept uses must be assigned a prime first.")
    )]
    UnknownAttribute { concept: String, attribute: String },

    #[error("zero has no attribute factorization")]
    #[diagnostic(
        code(triadic::concept::zero_value),
        help("Concept values are products of primes and always at least 1.")
    )]
    ZeroValue,
}

/// Convenience alias for functions returning triadic results.
pub type TriadicResult<T> = std::result::Result<T, TriadicError>;
