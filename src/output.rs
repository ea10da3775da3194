//! Segment files on disk.
//!
//! [`SegmentWriter`] stores each emitted segment as its own file and keeps a
//! manifest describing them, written as `segments.json` on
//! [`SegmentWriter::finish`]:
//!
//! - `init.webm` for the first initialization segment, `init-NNNNN.webm` for
//!   later streams in the same input
//! - `cluster-NNNNN.webm` for media segments, numbered from zero

use anyhow::{Context, Result};
use ebmlcast_media::StreamSegment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const MANIFEST_FILE: &str = "segments.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Init,
    Media,
}

/// One written segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub kind: SegmentKind,
    pub file: String,
    /// Absolute stream offset of the first byte.
    pub offset: u64,
    pub size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timecode: Option<u64>,
    /// Lookahead duration; `-1` when it was not computed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub total_bytes: u64,
    pub segments: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn init_count(&self) -> usize {
        self.count(SegmentKind::Init)
    }

    pub fn media_count(&self) -> usize {
        self.count(SegmentKind::Media)
    }

    fn count(&self, kind: SegmentKind) -> usize {
        self.segments.iter().filter(|s| s.kind == kind).count()
    }
}

/// Writes segments into a directory, one file per segment.
#[derive(Debug)]
pub struct SegmentWriter {
    dir: PathBuf,
    manifest: Manifest,
    inits: usize,
    clusters: usize,
}

impl SegmentWriter {
    /// Create the output directory if needed.
    pub fn create(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {:?}", dir))?;

        Ok(Self {
            dir: dir.to_path_buf(),
            manifest: Manifest::default(),
            inits: 0,
            clusters: 0,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write one segment and record it in the manifest.
    pub fn write(&mut self, segment: &StreamSegment) -> Result<&ManifestEntry> {
        let entry = match segment {
            StreamSegment::Init(init) => {
                let file = match self.inits {
                    0 => "init.webm".to_string(),
                    n => format!("init-{:05}.webm", n),
                };
                self.inits += 1;
                ManifestEntry {
                    kind: SegmentKind::Init,
                    file,
                    offset: init.offset,
                    size: init.data.len(),
                    timecode: None,
                    duration: None,
                }
            }
            StreamSegment::Media(media) => {
                let file = format!("cluster-{:05}.webm", self.clusters);
                self.clusters += 1;
                ManifestEntry {
                    kind: SegmentKind::Media,
                    file,
                    offset: media.offset,
                    size: media.cluster.len(),
                    timecode: Some(media.timecode),
                    duration: Some(media.duration_or_sentinel()),
                }
            }
        };

        let path = self.dir.join(&entry.file);
        std::fs::write(&path, segment.data())
            .with_context(|| format!("Failed to write segment: {:?}", path))?;
        tracing::debug!(file = %entry.file, size = entry.size, "Wrote segment");

        self.manifest.segments.push(entry);
        Ok(&self.manifest.segments[self.manifest.segments.len() - 1])
    }

    /// Write `segments.json` and return the manifest.
    pub fn finish(mut self, total_bytes: u64) -> Result<Manifest> {
        self.manifest.total_bytes = total_bytes;

        let path = self.dir.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(&self.manifest)?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write manifest: {:?}", path))?;

        Ok(self.manifest)
    }
}
