//! Segment reconstruction from structural events.
//!
//! The assembler folds tokenizer events into segments, reading the bytes it
//! needs back out of the [`RingBuffer`] by absolute offset:
//!
//! 1. An EBML header start begins a new logical stream and clears all state.
//! 2. The first Cluster start after it emits the initialization segment,
//!    `[stream start, first Cluster start)`.
//! 3. Each Timecode is decoded and pushed into a two-slot history.
//! 4. Each non-empty Cluster end emits a media segment, either immediately
//!    (duration unknown) or, with durations enabled, once the next Timecode
//!    arrives.
//!
//! Structural anomalies (a Cluster end without its start, an empty Timecode)
//! skip the affected unit and keep the stream flowing. Buffer errors mean
//! the retained window is too small and are returned to the caller.

mod timecode;

pub use timecode::{TimecodeEntry, TimecodeHistory};

use std::ops::Range;

use ebmlcast_ebml::{vint, ElementName, StructuralEvent};

use crate::config::StreamConfig;
use crate::error::Result;
use crate::ring_buffer::RingBuffer;
use crate::segment::{InitSegment, MediaSegment, StreamSegment};

/// Where the current stream is in producing its initialization segment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum InitState {
    #[default]
    Pending,
    Emitted(Range<u64>),
    /// The first Cluster had no header bytes in front of it.
    Unavailable,
}

/// A Cluster waiting for the next Timecode.
#[derive(Debug, Clone)]
struct PendingCluster {
    offset: u64,
    cluster: Vec<u8>,
}

/// Everything that is discarded when a new logical stream begins.
#[derive(Debug, Clone, Default)]
struct AssemblerState {
    stream_start: Option<u64>,
    init: InitState,
    open_cluster: Option<u64>,
    pending_cluster: Option<PendingCluster>,
    timecodes: TimecodeHistory,
    headers: Vec<ElementName>,
}

/// Turns structural events into initialization and media segments.
#[derive(Debug, Clone)]
pub struct SegmentAssembler {
    compute_durations: bool,
    redact_timecodes: bool,
    state: AssemblerState,
}

impl SegmentAssembler {
    pub fn new(config: &StreamConfig) -> Self {
        Self {
            compute_durations: config.compute_durations,
            redact_timecodes: config.redact_timecodes,
            state: AssemblerState::default(),
        }
    }

    /// Drop all parse state.
    pub fn reset(&mut self) {
        self.state = AssemblerState::default();
    }

    /// Offset of the current stream's EBML header, if one was seen.
    pub fn stream_start(&self) -> Option<u64> {
        self.state.stream_start
    }

    /// Range of the initialization segment emitted for the current stream.
    pub fn init_segment_range(&self) -> Option<Range<u64>> {
        match &self.state.init {
            InitState::Emitted(range) => Some(range.clone()),
            _ => None,
        }
    }

    /// Whether a Cluster is held back waiting for its duration.
    pub fn has_pending_cluster(&self) -> bool {
        self.state.pending_cluster.is_some()
    }

    pub fn timecodes(&self) -> &TimecodeHistory {
        &self.state.timecodes
    }

    /// Fold a sequence of events, collecting every segment produced.
    pub fn process<I>(&mut self, events: I, ring: &RingBuffer) -> Result<Vec<StreamSegment>>
    where
        I: IntoIterator<Item = StructuralEvent>,
    {
        let mut segments = Vec::new();
        for event in events {
            segments.extend(self.handle(event, ring)?);
        }
        Ok(segments)
    }

    /// Handle one event. At most one segment results from any event.
    pub fn handle(
        &mut self,
        event: StructuralEvent,
        ring: &RingBuffer,
    ) -> Result<Option<StreamSegment>> {
        match event {
            StructuralEvent::Start {
                element: ElementName::Ebml,
                start,
                ..
            } => {
                self.begin_stream(start);
                Ok(None)
            }
            StructuralEvent::Start {
                element: ElementName::Cluster,
                start,
                ..
            } => self.on_cluster_start(start, ring),
            StructuralEvent::End {
                element: ElementName::Cluster,
                start,
                end,
            } => self.on_cluster_end(start, end, ring),
            StructuralEvent::End { element, .. } if element.is_header() => {
                self.state.headers.push(element);
                Ok(None)
            }
            StructuralEvent::Timecode { payload, range } => Ok(self.on_timecode(&payload, range)),
            _ => Ok(None),
        }
    }

    fn begin_stream(&mut self, start: u64) {
        if self.state.pending_cluster.is_some() {
            tracing::debug!(start, "New stream discards the held-back cluster");
        }
        self.state = AssemblerState {
            stream_start: Some(start),
            ..AssemblerState::default()
        };
        tracing::debug!(start, "Stream start");
    }

    fn on_cluster_start(&mut self, start: u64, ring: &RingBuffer) -> Result<Option<StreamSegment>> {
        if let Some(open) = self.state.open_cluster.replace(start) {
            tracing::warn!(open, start, "Cluster started before the previous one ended");
        }

        if self.state.init != InitState::Pending {
            return Ok(None);
        }

        let Some(stream_start) = self.state.stream_start.filter(|&s| s < start) else {
            tracing::warn!(start, "No header bytes before the first Cluster, no initialization segment");
            self.state.init = InitState::Unavailable;
            return Ok(None);
        };

        if !self.state.headers.contains(&ElementName::Tracks) {
            tracing::warn!(start, "Initialization segment has no Tracks element");
        }

        let data = ring.read(stream_start, start)?;
        tracing::debug!(
            offset = stream_start,
            len = data.len(),
            headers = ?self.state.headers,
            "Initialization segment ready"
        );
        self.state.init = InitState::Emitted(stream_start..start);

        Ok(Some(StreamSegment::Init(InitSegment {
            offset: stream_start,
            data,
        })))
    }

    fn on_cluster_end(
        &mut self,
        start: u64,
        end: u64,
        ring: &RingBuffer,
    ) -> Result<Option<StreamSegment>> {
        if self.state.open_cluster.take() != Some(start) {
            tracing::warn!(start, end, "Cluster end without a matching start, skipping");
            return Ok(None);
        }
        if end <= start {
            tracing::debug!(start, "Empty cluster, skipping");
            return Ok(None);
        }

        let mut cluster = ring.read(start, end)?;
        if self.redact_timecodes {
            self.redact(&mut cluster, start);
        }

        let timecode = self.state.timecodes.newest().value;
        if !self.compute_durations {
            tracing::debug!(offset = start, len = cluster.len(), timecode, "Media segment ready");
            return Ok(Some(StreamSegment::Media(MediaSegment {
                offset: start,
                cluster,
                timecode,
                duration: None,
            })));
        }

        let held = PendingCluster {
            offset: start,
            cluster,
        };
        if let Some(dropped) = self.state.pending_cluster.replace(held) {
            tracing::warn!(
                offset = dropped.offset,
                "Cluster never received a following Timecode, dropping it"
            );
        }
        Ok(None)
    }

    fn on_timecode(&mut self, payload: &[u8], range: Range<u64>) -> Option<StreamSegment> {
        let Some(value) = vint::read_unsigned(payload) else {
            tracing::warn!(
                offset = range.start,
                len = payload.len(),
                "Ignoring malformed Timecode"
            );
            return None;
        };
        self.state.timecodes.push(TimecodeEntry { value, range });

        if !self.compute_durations {
            return None;
        }
        let pending = self.state.pending_cluster.take()?;
        let duration = self.state.timecodes.lookahead_duration();
        let timecode = self.state.timecodes.newest().value;

        tracing::debug!(
            offset = pending.offset,
            len = pending.cluster.len(),
            timecode,
            duration,
            "Media segment ready"
        );
        Some(StreamSegment::Media(MediaSegment {
            offset: pending.offset,
            cluster: pending.cluster,
            timecode,
            duration: Some(duration),
        }))
    }

    /// Zero the newest Timecode payload inside `cluster`, which starts at
    /// absolute offset `start`.
    fn redact(&self, cluster: &mut [u8], start: u64) {
        let range = &self.state.timecodes.newest().range;
        let end = start + cluster.len() as u64;
        if range.is_empty() || range.start < start || range.end > end {
            tracing::debug!(start, "No Timecode inside cluster to redact");
            return;
        }
        let from = (range.start - start) as usize;
        let to = (range.end - start) as usize;
        cluster[from..to].fill(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn ring_with(bytes: &[u8]) -> RingBuffer {
        let mut ring = RingBuffer::with_capacity(1024).unwrap();
        ring.append(bytes).unwrap();
        ring
    }

    fn timecode(value: &[u8], at: u64) -> StructuralEvent {
        StructuralEvent::Timecode {
            payload: Bytes::copy_from_slice(value),
            range: at..at + value.len() as u64,
        }
    }

    fn cluster_start(start: u64) -> StructuralEvent {
        StructuralEvent::Start {
            element: ElementName::Cluster,
            start,
            end: None,
        }
    }

    fn cluster_end(start: u64, end: u64) -> StructuralEvent {
        StructuralEvent::End {
            element: ElementName::Cluster,
            start,
            end,
        }
    }

    fn stream_start(start: u64) -> StructuralEvent {
        StructuralEvent::Start {
            element: ElementName::Ebml,
            start,
            end: None,
        }
    }

    #[test]
    fn test_init_segment_emitted_once() {
        let ring = ring_with(&[0xAA; 64]);
        let mut assembler = SegmentAssembler::new(&StreamConfig::default());

        let segments = assembler
            .process(
                [
                    stream_start(0),
                    cluster_start(10),
                    cluster_end(10, 20),
                    cluster_start(20),
                ],
                &ring,
            )
            .unwrap();

        let inits: Vec<_> = segments.iter().filter_map(|s| s.as_init()).collect();
        assert_eq!(inits.len(), 1);
        assert_eq!(inits[0].data.len(), 10);
        assert_eq!(assembler.init_segment_range(), Some(0..10));
    }

    #[test]
    fn test_immediate_emission_uses_newest_timecode() {
        let ring = ring_with(&[0; 64]);
        let mut assembler = SegmentAssembler::new(&StreamConfig::default());

        let segments = assembler
            .process(
                [
                    stream_start(0),
                    cluster_start(10),
                    timecode(&[0x03, 0xE8], 17),
                    cluster_end(10, 30),
                ],
                &ring,
            )
            .unwrap();

        let media = segments[1].as_media().unwrap();
        assert_eq!(media.timecode, 1000);
        assert_eq!(media.duration, None);
        assert_eq!(media.duration_or_sentinel(), -1);
        assert_eq!(media.cluster.len(), 20);
    }

    #[test]
    fn test_duration_lookahead() {
        let ring = ring_with(&[0; 64]);
        let config = StreamConfig::default().compute_durations(true);
        let mut assembler = SegmentAssembler::new(&config);

        let first = assembler
            .process(
                [
                    stream_start(0),
                    cluster_start(10),
                    timecode(&[0x03, 0xE8], 17),
                    cluster_end(10, 30),
                ],
                &ring,
            )
            .unwrap();
        // Only the init segment; the cluster waits for the next Timecode.
        assert_eq!(first.len(), 1);
        assert!(assembler.has_pending_cluster());

        let second = assembler
            .process([cluster_start(30), timecode(&[0x05, 0x14], 37)], &ring)
            .unwrap();
        let media = second[0].as_media().unwrap();
        assert_eq!(media.offset, 10);
        assert_eq!(media.duration, Some(-300));
        assert_eq!(media.timecode, 1300);
        assert!(!assembler.has_pending_cluster());
    }

    #[test]
    fn test_cluster_end_without_start_skipped() {
        let ring = ring_with(&[0; 64]);
        let mut assembler = SegmentAssembler::new(&StreamConfig::default());

        let segments = assembler
            .process([stream_start(0), cluster_end(10, 20)], &ring)
            .unwrap();
        assert!(segments.is_empty());
    }

    #[test]
    fn test_empty_timecode_ignored() {
        let ring = ring_with(&[0; 64]);
        let mut assembler = SegmentAssembler::new(&StreamConfig::default());

        assembler
            .process([timecode(&[0x07], 3), timecode(&[], 9)], &ring)
            .unwrap();
        assert_eq!(assembler.timecodes().newest().value, 7);
    }

    #[test]
    fn test_cluster_without_stream_start_has_no_init() {
        let ring = ring_with(&[0x11; 64]);
        let mut assembler = SegmentAssembler::new(&StreamConfig::default());

        let segments = assembler
            .process([cluster_start(4), cluster_end(4, 12)], &ring)
            .unwrap();
        assert_eq!(segments.len(), 1);
        assert!(segments[0].as_media().is_some());
    }

    #[test]
    fn test_redaction_zeroes_payload_only() {
        let bytes: Vec<u8> = (1..=40).collect();
        let ring = ring_with(&bytes);
        let config = StreamConfig::default().redact_timecodes(true);
        let mut assembler = SegmentAssembler::new(&config);

        let segments = assembler
            .process(
                [
                    cluster_start(10),
                    timecode(&bytes[17..19], 17),
                    cluster_end(10, 30),
                ],
                &ring,
            )
            .unwrap();

        let media = segments[0].as_media().unwrap();
        assert_eq!(&media.cluster[7..9], &[0, 0]);
        assert_eq!(&media.cluster[..7], &bytes[10..17]);
        assert_eq!(&media.cluster[9..], &bytes[19..30]);
    }

    #[test]
    fn test_stale_read_is_fatal() {
        let mut ring = RingBuffer::with_capacity(8).unwrap();
        ring.append(&[0; 8]).unwrap();
        ring.append(&[0; 8]).unwrap();
        let mut assembler = SegmentAssembler::new(&StreamConfig::default());

        let result = assembler.process([stream_start(0), cluster_start(12)], &ring);
        assert!(matches!(result, Err(e) if e.is_capacity()));
    }

    #[test]
    fn test_new_stream_resets_state() {
        let ring = ring_with(&[0; 64]);
        let config = StreamConfig::default().compute_durations(true);
        let mut assembler = SegmentAssembler::new(&config);

        assembler
            .process(
                [
                    stream_start(0),
                    cluster_start(10),
                    timecode(&[0x10], 17),
                    cluster_end(10, 30),
                    stream_start(30),
                ],
                &ring,
            )
            .unwrap();

        assert!(!assembler.has_pending_cluster());
        assert_eq!(assembler.stream_start(), Some(30));
        assert_eq!(assembler.init_segment_range(), None);
        assert_eq!(assembler.timecodes(), &TimecodeHistory::default());
    }
}
