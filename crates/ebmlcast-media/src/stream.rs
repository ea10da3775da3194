//! Chunked WebM input to segments.

use ebmlcast_ebml::Tokenizer;

use crate::assembler::SegmentAssembler;
use crate::config::StreamConfig;
use crate::error::Result;
use crate::ring_buffer::RingBuffer;
use crate::segment::StreamSegment;

/// Buffers a WebM byte stream and splits it into segments.
///
/// Every chunk is appended to the ring buffer before it is tokenized, so any
/// offset an event refers to has already been written when the assembler
/// reads it back.
#[derive(Debug)]
pub struct SegmentStream {
    config: StreamConfig,
    ring: RingBuffer,
    tokenizer: Tokenizer,
    assembler: SegmentAssembler,
}

impl SegmentStream {
    /// Create a stream, rejecting an invalid configuration.
    pub fn new(config: StreamConfig) -> Result<Self> {
        config.validate()?;
        let ring = RingBuffer::with_capacity(config.buffer_capacity)?;
        let assembler = SegmentAssembler::new(&config);

        tracing::debug!(
            buffer_capacity = config.buffer_capacity,
            compute_durations = config.compute_durations,
            redact_timecodes = config.redact_timecodes,
            "Segment stream created"
        );

        Ok(Self {
            config,
            ring,
            tokenizer: Tokenizer::new(),
            assembler,
        })
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Feed the next chunk of the stream and collect the segments it
    /// completes, in order.
    ///
    /// A chunk larger than the buffer is rejected before anything is written.
    /// Buffer and tokenizer errors leave the stream unusable until
    /// [`SegmentStream::reset`]. Segments completed earlier in a failing
    /// chunk are dropped with the error; use [`SegmentStream::write_into`] to
    /// keep them.
    pub fn write(&mut self, chunk: &[u8]) -> Result<Vec<StreamSegment>> {
        let mut segments = Vec::new();
        self.write_into(chunk, &mut segments)?;
        Ok(segments)
    }

    /// Like [`SegmentStream::write`], but pushes each segment into `out` as
    /// soon as it is complete, so segments that precede an error in the
    /// same chunk survive it.
    pub fn write_into(&mut self, chunk: &[u8], out: &mut Vec<StreamSegment>) -> Result<()> {
        self.ring.append(chunk)?;
        self.tokenizer.feed(chunk);

        while let Some(event) = self.tokenizer.next_event()? {
            if let Some(segment) = self.assembler.handle(event, &self.ring)? {
                out.push(segment);
            }
        }
        Ok(())
    }

    /// Begin a new logical stream, e.g. after the producer reconnects.
    pub fn reset(&mut self) {
        tracing::debug!(total = self.ring.total_written(), "Segment stream reset");
        self.ring.reset();
        self.tokenizer.reset();
        self.assembler.reset();
    }

    /// Read retained bytes by absolute offset.
    pub fn read(&self, start: u64, end: u64) -> Result<Vec<u8>> {
        self.ring.read(start, end)
    }

    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    pub fn total_bytes_written(&self) -> u64 {
        self.ring.total_written()
    }

    pub fn oldest_retained_offset(&self) -> u64 {
        self.ring.oldest_retained()
    }

    pub fn assembler(&self) -> &SegmentAssembler {
        &self.assembler
    }
}
