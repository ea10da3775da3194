//! Split a recorded WebM stream into segment files.

use anyhow::{Context, Result};
use ebmlcast_media::{SegmentStream, StreamConfig};
use std::io::{ErrorKind, Read};
use std::path::Path;

use crate::output::{Manifest, SegmentWriter};

/// Feed `reader` through a segment stream `chunk_size` bytes at a time,
/// writing every segment into `out_dir`.
pub fn split_reader<R: Read>(
    mut reader: R,
    stream_config: StreamConfig,
    chunk_size: usize,
    out_dir: &Path,
) -> Result<Manifest> {
    if chunk_size == 0 {
        anyhow::bail!("Chunk size cannot be 0");
    }

    let mut stream = SegmentStream::new(stream_config)?;
    let mut writer = SegmentWriter::create(out_dir)?;
    let mut buf = vec![0u8; chunk_size.min(stream.capacity())];
    let mut segments = Vec::new();

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e).context("Failed to read input"),
        };

        let result = stream.write_into(&buf[..n], &mut segments);
        // Segments completed before a failure in this chunk are still written.
        for segment in segments.drain(..) {
            writer.write(&segment)?;
        }
        result.with_context(|| {
            format!(
                "Failed to segment input at offset {}",
                stream.total_bytes_written()
            )
        })?;
    }

    if stream.assembler().has_pending_cluster() {
        tracing::info!("Last cluster has no following timecode and was not written");
    }

    let total = stream.total_bytes_written();
    let manifest = writer.finish(total)?;
    tracing::info!(
        total_bytes = total,
        init = manifest.init_count(),
        media = manifest.media_count(),
        "Split complete"
    );
    Ok(manifest)
}

/// Split a file, or stdin when `input` is `-`.
pub fn split_path(
    input: &Path,
    stream_config: StreamConfig,
    chunk_size: usize,
    out_dir: &Path,
) -> Result<Manifest> {
    if input == Path::new("-") {
        return split_reader(std::io::stdin().lock(), stream_config, chunk_size, out_dir);
    }

    if !input.exists() {
        anyhow::bail!("Input file does not exist: {:?}", input);
    }
    let file = std::fs::File::open(input)
        .with_context(|| format!("Failed to open input: {:?}", input))?;
    tracing::info!("Splitting {:?} into {:?}", input, out_dir);
    split_reader(file, stream_config, chunk_size, out_dir)
}
