//! Integration tests for the EBML tokenizer over whole synthesized streams.

use ebmlcast_ebml::builder::{BuiltStream, WebmBuilder};
use ebmlcast_ebml::{ElementName, StructuralEvent, Tokenizer};

fn tokenize(bytes: &[u8], chunk: usize) -> Vec<StructuralEvent> {
    let mut tokenizer = Tokenizer::new();
    let mut events = Vec::new();
    for piece in bytes.chunks(chunk) {
        tokenizer.feed(piece);
        for event in tokenizer.events() {
            events.push(event.expect("valid stream"));
        }
    }
    events
}

fn structural(events: &[StructuralEvent]) -> Vec<StructuralEvent> {
    events
        .iter()
        .filter(|e| !matches!(e, StructuralEvent::Ignored { .. }))
        .cloned()
        .collect()
}

fn cluster_ends(events: &[StructuralEvent]) -> Vec<(u64, u64)> {
    events
        .iter()
        .filter_map(|e| match e {
            StructuralEvent::End {
                element: ElementName::Cluster,
                start,
                end,
            } => Some((*start, *end)),
            _ => None,
        })
        .collect()
}

fn expected_clusters(built: &BuiltStream) -> Vec<(u64, u64)> {
    built
        .clusters
        .iter()
        .map(|c| (c.range.start as u64, c.range.end as u64))
        .collect()
}

#[test]
fn test_known_size_stream_event_order() {
    let built = WebmBuilder::new().cluster(0, b"a").build();
    let names: Vec<_> = structural(&tokenize(&built.bytes, built.bytes.len()))
        .into_iter()
        .map(|e| match e {
            StructuralEvent::Start { element, .. } => format!("+{element}"),
            StructuralEvent::End { element, .. } => format!("-{element}"),
            StructuralEvent::Timecode { .. } => "tc".to_string(),
            StructuralEvent::Ignored { .. } => unreachable!(),
        })
        .collect();

    assert_eq!(
        names,
        [
            "+EBML", "-EBML", "+SeekHead", "-SeekHead", "+Info", "-Info", "+Tracks", "-Tracks",
            "+Cluster", "tc", "-Cluster",
        ]
    );
}

#[test]
fn test_cluster_boundaries_match_layout() {
    let built = WebmBuilder::new()
        .cluster(0, &[1; 100])
        .cluster(33, &[2; 5000])
        .cluster(66, &[3; 1])
        .build();

    for chunk in [1, 4, 13, 4096] {
        let events = tokenize(&built.bytes, chunk);
        assert_eq!(cluster_ends(&events), expected_clusters(&built), "chunk {chunk}");
    }
}

#[test]
fn test_chunking_yields_identical_events() {
    let built = WebmBuilder::new()
        .live(true)
        .cues(true)
        .cluster(1000, &[9; 257])
        .cluster(1300, &[8; 3])
        .build();

    let whole = tokenize(&built.bytes, built.bytes.len());
    for chunk in [1, 2, 5, 64] {
        assert_eq!(tokenize(&built.bytes, chunk), whole, "chunk {chunk}");
    }
}

#[test]
fn test_live_clusters_closed_by_siblings() {
    let built = WebmBuilder::new()
        .live(true)
        .cues(true)
        .cluster(0, b"a")
        .cluster(33, b"bb")
        .build();

    let events = tokenize(&built.bytes, 3);
    assert_eq!(cluster_ends(&events), expected_clusters(&built));
}

#[test]
fn test_timecode_payloads_and_ranges() {
    let built = WebmBuilder::new()
        .cluster(1000, b"a")
        .cluster_with_raw_timecode(&[0x00, 0x00, 0x05, 0x14], b"b")
        .build();

    let timecodes: Vec<_> = tokenize(&built.bytes, 7)
        .into_iter()
        .filter_map(|e| match e {
            StructuralEvent::Timecode { payload, range } => Some((payload.to_vec(), range)),
            _ => None,
        })
        .collect();

    assert_eq!(timecodes.len(), 2);
    assert_eq!(timecodes[0].0, [0x03, 0xE8]);
    assert_eq!(timecodes[1].0, [0x00, 0x00, 0x05, 0x14]);
    for (index, (_, range)) in timecodes.iter().enumerate() {
        let expected = &built.clusters[index].timecode_payload;
        assert_eq!(range.start, expected.start as u64);
        assert_eq!(range.end, expected.end as u64);
    }
}

#[test]
fn test_second_header_starts_new_stream() {
    let first = WebmBuilder::new().live(true).cluster(0, b"a").build();
    let second = WebmBuilder::new().cluster(0, b"b").build();
    let bytes = [first.bytes.clone(), second.bytes.clone()].concat();

    let events = tokenize(&bytes, 11);
    let stream_starts: Vec<_> = events
        .iter()
        .filter(|e| e.is_top_level_start())
        .map(|e| match e {
            StructuralEvent::Start { start, .. } => *start,
            _ => unreachable!(),
        })
        .collect();
    assert_eq!(stream_starts, [0, first.bytes.len() as u64]);

    // The open live Cluster is closed by the new EBML header.
    let ends = cluster_ends(&events);
    assert_eq!(ends[0], (first.clusters[0].range.start as u64, first.bytes.len() as u64));
}
