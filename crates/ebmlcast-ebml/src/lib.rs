//! # ebmlcast-ebml
//!
//! Incremental EBML tokenizer for live WebM streams.
//!
//! The tokenizer turns arbitrarily chunked WebM bytes into a sequence of
//! structural events carrying absolute byte offsets:
//!
//! - `Start`/`End` for the EBML header, SeekHead, Info, Tracks and Cluster
//! - `Timecode` for a Cluster's timestamp, with its raw payload bytes
//! - `Ignored` for everything else
//!
//! It does not decode frames or validate the document; it only tracks element
//! boundaries, including unknown-size Segments and Clusters written by live
//! encoders.
//!
//! ## Example
//!
//! ```
//! use ebmlcast_ebml::{StructuralEvent, Tokenizer};
//!
//! // EBML header, unknown-size Segment, one Cluster holding Timecode 0.
//! let stream = [
//!     0x1A, 0x45, 0xDF, 0xA3, 0x80,
//!     0x18, 0x53, 0x80, 0x67, 0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
//!     0x1F, 0x43, 0xB6, 0x75, 0x83,
//!     0xE7, 0x81, 0x00,
//! ];
//!
//! let mut tokenizer = Tokenizer::new();
//! tokenizer.feed(&stream);
//! let timecodes = tokenizer
//!     .events()
//!     .filter_map(|event| match event {
//!         Ok(StructuralEvent::Timecode { payload, .. }) => Some(payload),
//!         _ => None,
//!     })
//!     .count();
//! assert_eq!(timecodes, 1);
//! ```

#[cfg(any(test, feature = "test-util"))]
pub mod builder;
pub mod element;
pub mod error;
pub mod event;
pub mod tokenizer;
pub mod vint;

pub use element::{ElementId, ElementName};
pub use error::{Error, Result};
pub use event::StructuralEvent;
pub use tokenizer::{Events, Tokenizer};
