//! Ebmlcast-Media: ring-buffered WebM re-segmentation
//!
//! This crate splits a live WebM byte stream into the pieces a re-streamer
//! hands to its clients: one initialization segment per logical stream and
//! one media segment per Cluster.
//!
//! # Modules
//!
//! - `ring_buffer` - Fixed-capacity byte store addressed by stream offset
//! - `assembler` - Folds structural events into segments
//! - `stream` - Ring buffer, tokenizer and assembler behind `write`/`reset`
//! - `segment` - Emitted segment types
//! - `config` - Construction-time options
//!
//! # Architecture
//!
//! Input chunks are appended to the ring buffer, which retains only a
//! trailing window of the stream, and fed to the EBML tokenizer. The
//! assembler consumes the tokenizer's events and copies segment bytes back
//! out of the window by absolute offset:
//!
//! - Initialization segment: EBML header through the byte before the first
//!   Cluster
//! - Media segment: one whole Cluster, with its Timecode and, when enabled,
//!   a duration computed once the following Cluster's Timecode is seen
//!
//! The window must be larger than the header and the largest Cluster;
//! otherwise reads fail rather than return truncated segments.

pub mod assembler;
pub mod config;
pub mod error;
pub mod ring_buffer;
pub mod segment;
pub mod stream;

pub use assembler::SegmentAssembler;
pub use config::{StreamConfig, DEFAULT_BUFFER_CAPACITY};
pub use error::{Error, Result};
pub use ring_buffer::RingBuffer;
pub use segment::{InitSegment, MediaSegment, StreamSegment};
pub use stream::SegmentStream;
