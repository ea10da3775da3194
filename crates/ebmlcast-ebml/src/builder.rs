//! Synthesize small WebM byte streams.
//!
//! Used to build fixtures for tests and benchmarks: an EBML header, a Segment
//! holding SeekHead/Info/Tracks, then one Cluster per [`WebmBuilder::cluster`]
//! call, each with a Timecode and a single SimpleBlock. The returned
//! [`BuiltStream`] records where every piece landed so callers can compare
//! emitted segments against exact byte ranges.

use std::ops::Range;

use crate::element::ElementId;
use crate::vint::{encode_id, encode_size, UNKNOWN_SIZE};

/// Encode a complete element with a known size.
pub fn element(id: ElementId, payload: &[u8]) -> Vec<u8> {
    let mut out = encode_id(id.0);
    out.extend(encode_size(payload.len() as u64));
    out.extend_from_slice(payload);
    out
}

/// Encode an unsigned integer element using the fewest bytes (at least one).
pub fn unsigned_element(id: ElementId, value: u64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let skip = bytes.iter().take_while(|&&b| b == 0).count().min(7);
    element(id, &bytes[skip..])
}

/// Encode an element header with the unknown-size marker.
pub fn unknown_size_header(id: ElementId) -> Vec<u8> {
    let mut out = encode_id(id.0);
    out.extend_from_slice(&UNKNOWN_SIZE);
    out
}

#[derive(Debug, Clone)]
struct ClusterPlan {
    timecode: Vec<u8>,
    frame: Vec<u8>,
}

/// Builder for a single logical WebM stream.
#[derive(Debug, Clone, Default)]
pub struct WebmBuilder {
    live: bool,
    cues: bool,
    clusters: Vec<ClusterPlan>,
}

impl WebmBuilder {
    /// Create an empty builder (known sizes, no clusters).
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the Segment and every Cluster with unknown size, as live
    /// muxers do.
    pub fn live(mut self, live: bool) -> Self {
        self.live = live;
        self
    }

    /// Append a Cues element after the last Cluster.
    pub fn cues(mut self, cues: bool) -> Self {
        self.cues = cues;
        self
    }

    /// Append a Cluster with the given timecode and one frame of data.
    pub fn cluster(self, timecode: u64, frame: &[u8]) -> Self {
        let bytes = timecode.to_be_bytes();
        let skip = bytes.iter().take_while(|&&b| b == 0).count().min(7);
        self.cluster_with_raw_timecode(&bytes[skip..], frame)
    }

    /// Append a Cluster whose Timecode payload is exactly `raw`.
    pub fn cluster_with_raw_timecode(mut self, raw: &[u8], frame: &[u8]) -> Self {
        self.clusters.push(ClusterPlan {
            timecode: raw.to_vec(),
            frame: frame.to_vec(),
        });
        self
    }

    /// Serialize the stream.
    pub fn build(&self) -> BuiltStream {
        let ebml = element(
            ElementId::EBML,
            &[
                unsigned_element(ElementId::EBML_VERSION, 1),
                element(ElementId::DOC_TYPE, b"webm"),
            ]
            .concat(),
        );

        let headers = [
            element(ElementId::SEEK_HEAD, &element(ElementId::VOID, &[0; 4])),
            element(
                ElementId::INFO,
                &[
                    unsigned_element(ElementId::TIMECODE_SCALE, 1_000_000),
                    element(ElementId::MUXING_APP, b"ebmlcast"),
                ]
                .concat(),
            ),
            element(
                ElementId::TRACKS,
                &element(
                    ElementId::TRACK_ENTRY,
                    &[
                        unsigned_element(ElementId::TRACK_NUMBER, 1),
                        element(ElementId::CODEC_ID, b"V_VP8"),
                    ]
                    .concat(),
                ),
            ),
        ]
        .concat();

        // Clusters relative to the start of the Segment body.
        let mut body = headers;
        let mut clusters = Vec::with_capacity(self.clusters.len());
        for plan in &self.clusters {
            let timecode = element(ElementId::TIMECODE, &plan.timecode);
            let timecode_header = timecode.len() - plan.timecode.len();
            let mut block = vec![0x81, 0x00, 0x00, 0x80];
            block.extend_from_slice(&plan.frame);
            let payload = [timecode, element(ElementId::SIMPLE_BLOCK, &block)].concat();
            let payload_len = payload.len();

            let cluster = if self.live {
                [unknown_size_header(ElementId::CLUSTER), payload].concat()
            } else {
                element(ElementId::CLUSTER, &payload)
            };
            let cluster_header = cluster.len() - payload_len;

            let start = body.len();
            let timecode_start = start + cluster_header + timecode_header;
            clusters.push(ClusterLayout {
                range: start..start + cluster.len(),
                timecode_payload: timecode_start..timecode_start + plan.timecode.len(),
            });
            body.extend(cluster);
        }
        if self.cues {
            body.extend(element(ElementId::CUES, &[0xBB, 0x80]));
        }

        let segment_header = if self.live {
            unknown_size_header(ElementId::SEGMENT)
        } else {
            [encode_id(ElementId::SEGMENT.0), encode_size(body.len() as u64)].concat()
        };

        let base = ebml.len() + segment_header.len();
        let header_len = clusters
            .first()
            .map(|c| c.range.start)
            .unwrap_or(body.len());
        for cluster in &mut clusters {
            cluster.range = shift(&cluster.range, base);
            cluster.timecode_payload = shift(&cluster.timecode_payload, base);
        }

        BuiltStream {
            bytes: [ebml, segment_header, body].concat(),
            init: 0..base + header_len,
            clusters,
        }
    }
}

fn shift(range: &Range<usize>, by: usize) -> Range<usize> {
    range.start + by..range.end + by
}

/// Byte layout of one Cluster inside a [`BuiltStream`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterLayout {
    /// The whole Cluster element.
    pub range: Range<usize>,
    /// The Timecode element's payload.
    pub timecode_payload: Range<usize>,
}

/// A serialized stream and where its pieces are.
#[derive(Debug, Clone)]
pub struct BuiltStream {
    pub bytes: Vec<u8>,
    /// EBML header through the last header element before the first Cluster.
    pub init: Range<usize>,
    pub clusters: Vec<ClusterLayout>,
}

impl BuiltStream {
    /// Bytes of the initialization segment.
    pub fn init_bytes(&self) -> &[u8] {
        &self.bytes[self.init.clone()]
    }

    /// Bytes of cluster `index`.
    pub fn cluster_bytes(&self, index: usize) -> &[u8] {
        &self.bytes[self.clusters[index].range.clone()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vint::read_unsigned;

    #[test]
    fn test_layout_known_size() {
        let stream = WebmBuilder::new()
            .cluster(1000, b"frame-a")
            .cluster(1300, b"frame-b")
            .build();

        assert_eq!(stream.clusters.len(), 2);
        assert_eq!(stream.init.end, stream.clusters[0].range.start);
        assert_eq!(stream.clusters[0].range.end, stream.clusters[1].range.start);
        assert_eq!(stream.clusters[1].range.end, stream.bytes.len());
        assert_eq!(&stream.init_bytes()[..4], &[0x1A, 0x45, 0xDF, 0xA3]);
        assert_eq!(&stream.cluster_bytes(1)[..4], &[0x1F, 0x43, 0xB6, 0x75]);

        let tc = &stream.bytes[stream.clusters[1].timecode_payload.clone()];
        assert_eq!(read_unsigned(tc), Some(1300));
    }

    #[test]
    fn test_layout_live_with_cues() {
        let stream = WebmBuilder::new()
            .live(true)
            .cues(true)
            .cluster(40, b"x")
            .build();

        let cluster = stream.cluster_bytes(0);
        assert_eq!(&cluster[4..12], &UNKNOWN_SIZE);
        assert!(stream.clusters[0].range.end < stream.bytes.len());

        // Unknown-size header is 4 ID bytes plus 8 size bytes.
        let layout = &stream.clusters[0];
        assert_eq!(layout.timecode_payload.start, layout.range.start + 12 + 2);
        let tc = &stream.bytes[layout.timecode_payload.clone()];
        assert_eq!(read_unsigned(tc), Some(40));
    }

    #[test]
    fn test_no_clusters() {
        let stream = WebmBuilder::new().build();
        assert_eq!(stream.init.end, stream.bytes.len());
        assert!(stream.clusters.is_empty());
    }
}
