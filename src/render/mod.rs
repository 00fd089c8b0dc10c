//! Rendering strategies and the compositor that chooses between them.

/// Renderer trait and the unencoded surface type.
pub(crate) mod backend;
pub(crate) mod cover;
/// Primary `vello_cpu` strategy.
pub(crate) mod cpu;
pub(crate) mod pipeline;
/// Preview markup and the `resvg` snapshot strategy.
pub(crate) mod svg;
