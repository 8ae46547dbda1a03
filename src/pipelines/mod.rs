//! Render pipelines.
//!
//! `hologram` builds the additive, depth-tested but non-writing pipelines of
//! the two hologram materials from one WGSL template.

pub mod hologram;
