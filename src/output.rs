//! CLI output formatting.
//!
//! One line per processed file, with annotations for the fallback and
//! compression-skipped signals so batch runs are scannable.

use crate::imaging::Probe;
use crate::pipeline::{PipelineError, ProcessedImage};

/// `photo.jpg → 1920x1080 jpeg, 214.3 KB [edge-extend fallback]`
pub fn format_result(filename: &str, result: &ProcessedImage) -> String {
    let mut line = format!(
        "{} → {}x{} {}, {}",
        filename,
        result.metadata.width,
        result.metadata.height,
        result.metadata.format,
        format_size(result.metadata.size),
    );
    if result.fallback_used {
        line.push_str(" [edge-extend fallback]");
    }
    if result.compression_skipped {
        line.push_str(" [compression skipped]");
    }
    line
}

pub fn format_failure(filename: &str, error: &PipelineError) -> String {
    format!("{} → FAILED: {}", filename, error)
}

pub fn format_probe(filename: &str, probe: &Probe) -> String {
    format!(
        "{} → {}x{} {:?}",
        filename, probe.dimensions.width, probe.dimensions.height, probe.format
    )
}

fn format_size(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = 1024.0 * 1024.0;

    let b = bytes as f64;
    if b >= MB {
        format!("{:.1} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{bytes} B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::OutputFormat;
    use crate::pipeline::ImageMetadata;

    fn result(fallback: bool, skipped: bool) -> ProcessedImage {
        ProcessedImage {
            buffer: Vec::new(),
            metadata: ImageMetadata {
                width: 1920,
                height: 1080,
                format: OutputFormat::Jpeg,
                size: 219_443,
            },
            fallback_used: fallback,
            compression_skipped: skipped,
        }
    }

    #[test]
    fn plain_result_line() {
        let line = format_result("photo.jpg", &result(false, false));
        assert_eq!(line, "photo.jpg → 1920x1080 jpeg, 214.3 KB");
    }

    #[test]
    fn fallback_and_skip_annotations() {
        let line = format_result("photo.jpg", &result(true, true));
        assert!(line.ends_with("[edge-extend fallback] [compression skipped]"));
    }

    #[test]
    fn size_units() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }
}
