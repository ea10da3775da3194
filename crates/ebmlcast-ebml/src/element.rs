//! Element IDs and the structural roles the tokenizer assigns them.

/// EBML element ID (marker bit retained, as written on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(pub u32);

impl ElementId {
    pub const EBML: Self = Self(0x1A45_DFA3);
    pub const SEGMENT: Self = Self(0x1853_8067);
    pub const SEEK_HEAD: Self = Self(0x114D_9B74);
    pub const INFO: Self = Self(0x1549_A966);
    pub const TRACKS: Self = Self(0x1654_AE6B);
    pub const CLUSTER: Self = Self(0x1F43_B675);
    pub const CUES: Self = Self(0x1C53_BB6B);
    pub const TAGS: Self = Self(0x1254_C367);
    pub const CHAPTERS: Self = Self(0x1043_A770);
    pub const ATTACHMENTS: Self = Self(0x1941_A469);
    pub const TIMECODE: Self = Self(0xE7);
    pub const BLOCK_GROUP: Self = Self(0xA0);
    pub const SIMPLE_BLOCK: Self = Self(0xA3);
    pub const VOID: Self = Self(0xEC);

    // Header children, only needed to synthesize streams.
    pub const EBML_VERSION: Self = Self(0x4286);
    pub const DOC_TYPE: Self = Self(0x4282);
    pub const TIMECODE_SCALE: Self = Self(0x2A_D7B1);
    pub const MUXING_APP: Self = Self(0x4D80);
    pub const TRACK_ENTRY: Self = Self(0xAE);
    pub const TRACK_NUMBER: Self = Self(0xD7);
    pub const CODEC_ID: Self = Self(0x86);

    /// Children of a Segment. Seeing one of these closes any open
    /// unknown-size element below the Segment.
    pub fn is_segment_child(self) -> bool {
        matches!(
            self,
            Self::SEEK_HEAD
                | Self::INFO
                | Self::TRACKS
                | Self::CLUSTER
                | Self::CUES
                | Self::TAGS
                | Self::CHAPTERS
                | Self::ATTACHMENTS
        )
    }

    /// Elements whose children the tokenizer walks when their size is unknown.
    pub fn is_master(self) -> bool {
        self.is_segment_child() || matches!(self, Self::EBML | Self::SEGMENT | Self::BLOCK_GROUP)
    }

    /// Structural name reported in start/end events, if any.
    pub fn name(self) -> Option<ElementName> {
        match self {
            Self::EBML => Some(ElementName::Ebml),
            Self::SEEK_HEAD => Some(ElementName::SeekHead),
            Self::INFO => Some(ElementName::Info),
            Self::TRACKS => Some(ElementName::Tracks),
            Self::CLUSTER => Some(ElementName::Cluster),
            _ => None,
        }
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#X}", self.0)
    }
}

/// Elements reported with start and end events.
///
/// `Ebml` is the EBML header that opens every logical stream; its start is
/// the top-level-start marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementName {
    Ebml,
    SeekHead,
    Info,
    Tracks,
    Cluster,
}

impl ElementName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ebml => "EBML",
            Self::SeekHead => "SeekHead",
            Self::Info => "Info",
            Self::Tracks => "Tracks",
            Self::Cluster => "Cluster",
        }
    }

    /// The header elements that precede the first Cluster.
    pub fn is_header(&self) -> bool {
        matches!(self, Self::SeekHead | Self::Info | Self::Tracks)
    }
}

impl std::fmt::Display for ElementName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(ElementId::CLUSTER.name(), Some(ElementName::Cluster));
        assert_eq!(ElementId::SEGMENT.name(), None);
        assert_eq!(ElementId::TIMECODE.name(), None);
        assert_eq!(ElementName::Ebml.to_string(), "EBML");
    }

    #[test]
    fn test_segment_children() {
        assert!(ElementId::CLUSTER.is_segment_child());
        assert!(ElementId::CUES.is_segment_child());
        assert!(!ElementId::SEGMENT.is_segment_child());
        assert!(!ElementId::TIMECODE.is_master());
        assert!(ElementId::SEGMENT.is_master());
    }
}
