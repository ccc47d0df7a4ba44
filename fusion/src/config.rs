//! Fusion configuration.
//!
//! Provides typed configuration with a bon builder and environment variable
//! fallbacks. The pass itself keeps no state between runs.

use bon::bon;

/// Which rules run and whether the graph is re-verified after each rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FusionConfig {
    /// Enable producer inlining.
    pub inline: bool,
    /// Enable output rerouting.
    pub reroute: bool,
    /// Enable root introduction for shared loads.
    pub root: bool,
    /// Run `Graph::verify` after every rewrite.
    /// Default: on in debug builds.
    pub verify: bool,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self { inline: true, reroute: true, root: true, verify: cfg!(debug_assertions) }
    }
}

#[bon]
impl FusionConfig {
    /// Create a fusion configuration with builder pattern.
    #[builder]
    pub fn builder(
        #[builder(default = true)] inline: bool,
        #[builder(default = true)] reroute: bool,
        #[builder(default = true)] root: bool,
        #[builder(default = cfg!(debug_assertions))] verify: bool,
    ) -> Self {
        Self { inline, reroute, root, verify }
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// * `STENCIL_NO_INLINE` - Disable producer inlining
    /// * `STENCIL_NO_REROUTE` - Disable output rerouting
    /// * `STENCIL_NO_ROOT` - Disable root introduction
    /// * `STENCIL_VERIFY=0|1` - Force per-rewrite verification off/on
    pub fn from_env() -> Self {
        let verify = match std::env::var("STENCIL_VERIFY").as_deref() {
            Ok("0") | Ok("false") => false,
            Ok(_) => true,
            Err(_) => cfg!(debug_assertions),
        };

        Self {
            inline: std::env::var("STENCIL_NO_INLINE").is_err(),
            reroute: std::env::var("STENCIL_NO_REROUTE").is_err(),
            root: std::env::var("STENCIL_NO_ROOT").is_err(),
            verify,
        }
    }

    /// Whether every rule is disabled.
    pub fn is_noop(&self) -> bool {
        !(self.inline || self.reroute || self.root)
    }
}
