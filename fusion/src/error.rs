use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Fatal errors raised while fusing a region.
///
/// A rule that does not apply reports `RewriteResult::NoMatch`; these
/// variants only describe broken contracts, after which the pass stops.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Graph operation rejected by the IR.
    #[snafu(display("graph error: {source}"), context(false))]
    Ir { source: stencil_ir::Error },

    /// Graph failed verification after a rewrite.
    #[snafu(display("invariant violated after {rule} rewrite: {source}"))]
    VerificationFailed { rule: &'static str, source: stencil_ir::Error },
}
