//! Segments emitted by the assembler.

/// Header bytes every consumer needs once before any Cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct InitSegment {
    /// Absolute stream offset of the EBML header.
    pub offset: u64,
    /// EBML header through the last element before the first Cluster.
    pub data: Vec<u8>,
}

/// One Cluster with its timing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct MediaSegment {
    /// Absolute stream offset of the Cluster element.
    pub offset: u64,
    /// The whole Cluster element.
    pub cluster: Vec<u8>,
    /// Cluster timecode, in Segment timecode-scale units.
    pub timecode: u64,
    /// Duration from the lookahead, `None` when not computed.
    pub duration: Option<i64>,
}

impl MediaSegment {
    /// Duration with `-1` standing in for unknown, as some consumers expect.
    pub fn duration_or_sentinel(&self) -> i64 {
        self.duration.unwrap_or(-1)
    }
}

/// Output of the segment stream.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum StreamSegment {
    /// Initialization segment ready.
    Init(InitSegment),
    /// Media segment ready.
    Media(MediaSegment),
}

impl StreamSegment {
    /// Raw bytes of the segment.
    pub fn data(&self) -> &[u8] {
        match self {
            Self::Init(init) => &init.data,
            Self::Media(media) => &media.cluster,
        }
    }

    pub fn as_media(&self) -> Option<&MediaSegment> {
        match self {
            Self::Media(media) => Some(media),
            Self::Init(_) => None,
        }
    }

    pub fn as_init(&self) -> Option<&InitSegment> {
        match self {
            Self::Init(init) => Some(init),
            Self::Media(_) => None,
        }
    }
}
