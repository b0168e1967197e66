//! CLI command implementations.

pub(crate) mod check;
pub(crate) mod rewrite;

pub(crate) use check::CheckArgs;
pub(crate) use rewrite::RewriteArgs;
