//! Shared fixtures for integration tests.
//!
//! Streams are synthesized with [`WebmBuilder`] and written into a temporary
//! directory, so tests never depend on media files being present.

#![allow(dead_code)]

use std::path::PathBuf;

use ebmlcast_ebml::builder::{BuiltStream, WebmBuilder};
use tempfile::TempDir;

/// A stream with three clusters at 1000, 1300 and 1600.
pub fn three_cluster_stream() -> BuiltStream {
    WebmBuilder::new()
        .cluster(1000, &[0x11; 200])
        .cluster(1300, &[0x22; 50])
        .cluster(1600, &[0x33; 10])
        .build()
}

/// A live-style stream with unknown sizes and a trailing Cues element.
pub fn live_stream() -> BuiltStream {
    WebmBuilder::new()
        .live(true)
        .cues(true)
        .cluster(0, b"first")
        .cluster(40, b"second")
        .build()
}

/// Temporary directory holding a stream written to `input.webm`.
pub struct Fixture {
    pub dir: TempDir,
    pub input: PathBuf,
    pub stream: BuiltStream,
}

impl Fixture {
    pub fn new(stream: BuiltStream) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let input = dir.path().join("input.webm");
        std::fs::write(&input, &stream.bytes).expect("failed to write fixture");
        Self { dir, input, stream }
    }

    pub fn out_dir(&self) -> PathBuf {
        self.dir.path().join("out")
    }

    pub fn read_output(&self, file: &str) -> Vec<u8> {
        std::fs::read(self.out_dir().join(file)).expect("missing output file")
    }
}
