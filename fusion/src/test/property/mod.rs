//! Property-based tests for the fusion pass.
//!
//! Random regions come from the graph generators of `stencil-ir`; every
//! property compares the fused region against the original.

mod fusion_props;
