//! Incremental EBML tokenizer.
//!
//! Bytes are pushed in arbitrary chunks with [`Tokenizer::feed`] and events
//! are pulled with [`Tokenizer::next_event`] (or the [`Tokenizer::events`]
//! iterator) until it reports that more input is needed.
//!
//! The tokenizer only walks the parts of the tree the segmenter cares about:
//! the EBML header and Segment, the Segment's header children and Clusters.
//! Payloads of every other element are skipped as they stream past and never
//! buffered, so memory stays bounded by the largest element header plus a
//! Timecode payload.
//!
//! # Unknown sizes
//!
//! Live muxers write the Segment and often every Cluster with the reserved
//! "unknown size" value. An unknown-size element ends where an element that
//! cannot be its child begins: a Segment child (Cluster, Cues, ...) closes
//! open unknown-size elements below the Segment, and a new EBML header closes
//! everything.

use std::collections::VecDeque;

use bytes::{Buf, BytesMut};

use crate::element::ElementId;
use crate::error::{Error, Result};
use crate::event::StructuralEvent;
use crate::vint::{self, Vint, MAX_SIZE_LENGTH};

/// An element whose end has not been reached yet.
#[derive(Debug, Clone, Copy)]
struct OpenElement {
    id: ElementId,
    start: u64,
    end: Option<u64>,
}

/// A decoded element header that has not been consumed yet.
#[derive(Debug, Clone, Copy)]
struct Header {
    id: ElementId,
    size: Option<u64>,
    len: usize,
}

/// Push-in, pull-out EBML tokenizer.
#[derive(Debug, Default)]
pub struct Tokenizer {
    buf: BytesMut,
    /// Absolute offset of `buf[0]`.
    offset: u64,
    /// Payload bytes still to discard before the next header.
    skip: u64,
    stack: Vec<OpenElement>,
    pending: VecDeque<StructuralEvent>,
}

impl Tokenizer {
    /// Create a tokenizer positioned at offset 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append input bytes.
    pub fn feed(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Absolute offset of the next byte the tokenizer will look at.
    pub fn position(&self) -> u64 {
        self.offset
    }

    /// Bytes fed but not yet consumed.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Number of elements currently open.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Forget all input and restart offsets at zero.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.offset = 0;
        self.skip = 0;
        self.stack.clear();
        self.pending.clear();
    }

    /// Iterate over the events available from the input fed so far.
    pub fn events(&mut self) -> Events<'_> {
        Events {
            tokenizer: self,
            failed: false,
        }
    }

    /// Pull the next event, or `None` when more input is needed.
    ///
    /// After an error the tokenizer cannot resynchronize and keeps returning
    /// the same error until [`Tokenizer::reset`] is called.
    pub fn next_event(&mut self) -> Result<Option<StructuralEvent>> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Ok(Some(event));
            }

            if self.skip > 0 {
                let n = self.skip.min(self.buf.len() as u64) as usize;
                self.consume(n);
                self.skip -= n as u64;
                if self.skip > 0 {
                    return Ok(None);
                }
            }

            if self.close_finished() {
                continue;
            }

            let Some(header) = self.peek_header()? else {
                return Ok(None);
            };

            if self.close_before(header.id) {
                continue;
            }

            match self.enter(header)? {
                Some(event) => return Ok(Some(event)),
                None => return Ok(None),
            }
        }
    }

    fn consume(&mut self, n: usize) {
        self.buf.advance(n);
        self.offset += n as u64;
    }

    fn peek_header(&self) -> Result<Option<Header>> {
        let (id, id_len) = match vint::read_id(&self.buf) {
            Vint::Incomplete => return Ok(None),
            Vint::Invalid(byte) => {
                return Err(Error::InvalidId {
                    offset: self.offset,
                    byte,
                })
            }
            Vint::Complete { value, len } => (ElementId(value), len),
        };

        let (size, size_len) = match vint::read_size(&self.buf[id_len..]) {
            Vint::Incomplete => return Ok(None),
            Vint::Invalid(byte) => {
                return Err(Error::InvalidSize {
                    offset: self.offset + id_len as u64,
                    byte,
                })
            }
            Vint::Complete { value, len } => (value, len),
        };

        Ok(Some(Header {
            id,
            size,
            len: id_len + size_len,
        }))
    }

    /// Pop known-size elements whose end has been reached.
    fn close_finished(&mut self) -> bool {
        let mut closed = false;
        while let Some(top) = self.stack.last().copied() {
            match top.end {
                Some(end) if end <= self.offset => {
                    self.stack.pop();
                    self.close(top, end);
                    closed = true;
                }
                _ => break,
            }
        }
        closed
    }

    /// Close elements that cannot contain an element with `id`.
    fn close_before(&mut self, id: ElementId) -> bool {
        let at = self.offset;
        let mut closed = false;

        if id == ElementId::EBML {
            while let Some(top) = self.stack.pop() {
                if top.end.is_some() {
                    tracing::debug!(
                        id = %top.id,
                        start = top.start,
                        at,
                        "Closing truncated element at new EBML header"
                    );
                }
                self.close(top, at);
                closed = true;
            }
        } else if id.is_segment_child() {
            while let Some(top) = self.stack.last().copied() {
                if top.end.is_some() || top.id == ElementId::SEGMENT {
                    break;
                }
                self.stack.pop();
                tracing::trace!(id = %top.id, start = top.start, at, "Closing unknown-size element");
                self.close(top, at);
                closed = true;
            }
        }

        closed
    }

    fn close(&mut self, element: OpenElement, end: u64) {
        if let Some(name) = element.id.name() {
            self.pending.push_back(StructuralEvent::End {
                element: name,
                start: element.start,
                end,
            });
        }
    }

    fn in_cluster(&self) -> bool {
        self.stack
            .last()
            .is_some_and(|el| el.id == ElementId::CLUSTER)
    }

    /// Consume `header` and describe it. `None` means the element's payload
    /// must be buffered first and the header was left in place.
    fn enter(&mut self, header: Header) -> Result<Option<StructuralEvent>> {
        let start = self.offset;
        let data_start = start + header.len as u64;
        let end = header.size.map(|size| data_start.saturating_add(size));

        if header.size.is_none() && !header.id.is_master() {
            return Err(Error::UnknownSizeLeaf {
                id: header.id.0,
                offset: start,
            });
        }

        if header.id == ElementId::TIMECODE && self.in_cluster() {
            if let Some(size) = header.size.filter(|&s| s <= MAX_SIZE_LENGTH as u64) {
                let size = size as usize;
                if self.buf.len() < header.len + size {
                    return Ok(None);
                }
                self.consume(header.len);
                let payload = self.buf.split_to(size).freeze();
                self.offset += size as u64;
                return Ok(Some(StructuralEvent::Timecode {
                    payload,
                    range: data_start..data_start + size as u64,
                }));
            }
        }

        self.consume(header.len);

        if let Some(element) = header.id.name() {
            self.stack.push(OpenElement {
                id: header.id,
                start,
                end,
            });
            // Header elements are reported whole; only Clusters are walked.
            if header.id != ElementId::CLUSTER {
                if let Some(size) = header.size {
                    self.skip = size;
                }
            }
            return Ok(Some(StructuralEvent::Start {
                element,
                start,
                end,
            }));
        }

        // The Segment is always walked; other masters only when their end
        // has to be discovered from their children.
        match header.size {
            Some(size) if header.id != ElementId::SEGMENT => self.skip = size,
            _ => self.stack.push(OpenElement {
                id: header.id,
                start,
                end,
            }),
        }

        Ok(Some(StructuralEvent::Ignored {
            id: header.id,
            start,
        }))
    }
}

/// Iterator over the events currently available from a [`Tokenizer`].
///
/// Ends when more input is needed, or after yielding the first error.
pub struct Events<'a> {
    tokenizer: &'a mut Tokenizer,
    failed: bool,
}

impl Iterator for Events<'_> {
    type Item = Result<StructuralEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.tokenizer.next_event() {
            Ok(event) => event.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
