//! Ebmlcast - live WebM re-segmentation tool
//!
//! This library crate exposes the binary's building blocks for integration
//! testing. Segmenting itself lives in `ebmlcast-media`.

pub mod config;
pub mod listen;
pub mod output;
pub mod split;
