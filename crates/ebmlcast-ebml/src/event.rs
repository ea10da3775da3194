//! Structural events produced by the tokenizer.

use std::ops::Range;

use bytes::Bytes;

use crate::element::{ElementId, ElementName};

/// One structural event, with absolute stream offsets.
///
/// Offsets count bytes from the first byte fed to the tokenizer since it was
/// created or reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuralEvent {
    /// A recognized element's header was read.
    Start {
        element: ElementName,
        /// Offset of the first ID byte.
        start: u64,
        /// Declared end of the element, `None` for unknown sizes.
        end: Option<u64>,
    },

    /// A recognized element is complete; `[start, end)` spans header and data.
    End {
        element: ElementName,
        start: u64,
        end: u64,
    },

    /// A Cluster Timecode leaf, with its raw payload and payload range.
    Timecode { payload: Bytes, range: Range<u64> },

    /// Any other element.
    Ignored { id: ElementId, start: u64 },
}

impl StructuralEvent {
    /// Whether this event opens a new logical stream.
    pub fn is_top_level_start(&self) -> bool {
        matches!(
            self,
            Self::Start {
                element: ElementName::Ebml,
                ..
            }
        )
    }
}
