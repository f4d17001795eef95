//! ffmpeg-based media backend.
//!
//! | Operation | Tool |
//! |---|---|
//! | Metadata tracks | `ffprobe -print_format json -show_format -show_streams` |
//! | First frame | `ffmpeg -frames:v 1 -f image2pipe -c:v ppm -` |
//! | PPM → RGB raster | `image` crate PNM decoder |
//!
//! Both tools are expected on `PATH`. A missing `ffprobe` only costs the
//! metadata date (the resolver falls back to file times); a missing `ffmpeg`
//! makes every item an open failure.

use super::backend::{ExtractError, Frame, MediaBackend, MetadataTrack, ProbeError};
use image::ImageFormat;
use log::debug;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};

#[derive(Deserialize)]
struct FfprobeOutput {
    format: Option<FormatInfo>,
    #[serde(default)]
    streams: Vec<StreamInfo>,
}

#[derive(Deserialize)]
struct FormatInfo {
    #[serde(default)]
    tags: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct StreamInfo {
    #[serde(default)]
    index: u32,
    codec_type: Option<String>,
    #[serde(default)]
    tags: BTreeMap<String, String>,
}

/// Turn `ffprobe` JSON into tracks: the container (`General`) track first,
/// then streams in index order.
pub(crate) fn parse_probe_json(json: &str) -> Result<Vec<MetadataTrack>, ProbeError> {
    let probe: FfprobeOutput = serde_json::from_str(json)?;

    let mut tracks = Vec::with_capacity(probe.streams.len() + 1);
    if let Some(format) = probe.format {
        tracks.push(MetadataTrack {
            kind: "General".to_string(),
            tags: format.tags.into_iter().collect(),
        });
    }

    let mut streams = probe.streams;
    streams.sort_by_key(|s| s.index);
    tracks.extend(streams.into_iter().map(|s| MetadataTrack {
        kind: s.codec_type.unwrap_or_else(|| "unknown".to_string()),
        tags: s.tags.into_iter().collect(),
    }));

    Ok(tracks)
}

/// Owns a running decoder process for the duration of one frame read.
///
/// Dropping the session kills and reaps the process if it is still alive,
/// so the decoder is released on every exit path.
struct DecoderSession {
    child: Option<Child>,
}

impl DecoderSession {
    fn spawn(program: &Path, video: &Path) -> std::io::Result<Self> {
        let mut cmd = Command::new(program);
        cmd.args(["-hide_banner", "-nostdin", "-loglevel", "error", "-i"])
            .arg(video)
            .args([
                "-map", "0:v:0", "-frames:v", "1", "-an", "-sn", "-dn", "-f", "image2pipe",
                "-c:v", "ppm", "-",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        debug!("decoding first frame: {:?}", cmd);
        Ok(Self {
            child: Some(cmd.spawn()?),
        })
    }

    /// Read everything the decoder writes and wait for it to exit.
    fn finish(mut self) -> std::io::Result<Output> {
        match self.child.take() {
            Some(child) => child.wait_with_output(),
            None => Err(std::io::Error::other("decoder already released")),
        }
    }
}

impl Drop for DecoderSession {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// ffmpeg reports a missing video stream through the `-map` selector.
fn is_missing_stream(stderr: &str) -> bool {
    stderr.contains("matches no streams") || stderr.contains("does not contain any stream")
}

/// Media backend driving the `ffprobe` and `ffmpeg` executables.
pub struct FfmpegBackend {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl FfmpegBackend {
    pub fn new() -> Self {
        Self::with_binaries("ffmpeg", "ffprobe")
    }

    pub fn with_binaries(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }
}

impl Default for FfmpegBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaBackend for FfmpegBackend {
    fn probe_tracks(&self, path: &Path) -> Result<Vec<MetadataTrack>, ProbeError> {
        let output = Command::new(&self.ffprobe)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .map_err(ProbeError::Spawn)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProbeError::Failed(format!(
                "{} exited with {}: {}",
                self.ffprobe.display(),
                output.status,
                stderr.trim()
            )));
        }

        parse_probe_json(&String::from_utf8_lossy(&output.stdout))
    }

    fn first_frame(&self, path: &Path) -> Result<Frame, ExtractError> {
        let open_failure = |reason: String| ExtractError::Open {
            path: path.to_path_buf(),
            reason,
        };
        let decode_failure = |reason: String| ExtractError::Decode {
            path: path.to_path_buf(),
            reason,
        };

        std::fs::File::open(path).map_err(|e| open_failure(e.to_string()))?;

        let session = DecoderSession::spawn(&self.ffmpeg, path).map_err(|e| {
            open_failure(format!("cannot start {}: {e}", self.ffmpeg.display()))
        })?;
        let output = session
            .finish()
            .map_err(|e| decode_failure(format!("decoder I/O failed: {e}")))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if output.stdout.is_empty() {
            if !output.status.success() && !is_missing_stream(&stderr) {
                return Err(open_failure(stderr.trim().to_string()));
            }
            let reason = if stderr.trim().is_empty() {
                "no frame returned".to_string()
            } else {
                stderr.trim().to_string()
            };
            return Err(decode_failure(reason));
        }

        let decoded = image::load_from_memory_with_format(&output.stdout, ImageFormat::Pnm)
            .map_err(|e| ExtractError::Conversion {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        Frame::new(decoded.into_rgb8()).ok_or_else(|| decode_failure("empty frame".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::DateField;

    const QUICKTIME_PROBE: &str = r#"{
        "streams": [
            {
                "index": 1,
                "codec_type": "audio",
                "tags": { "creation_time": "2023-06-15T14:31:00.000000Z" }
            },
            {
                "index": 0,
                "codec_type": "video",
                "tags": { "creation_time": "2023-06-15T14:30:00.000000Z", "language": "und" }
            }
        ],
        "format": {
            "filename": "clip.mov",
            "tags": {
                "major_brand": "qt  ",
                "com.apple.quicktime.creationdate": "2023-06-15T16:30:00+0200"
            }
        }
    }"#;

    #[test]
    fn general_track_comes_first() {
        let tracks = parse_probe_json(QUICKTIME_PROBE).unwrap();
        let kinds: Vec<&str> = tracks.iter().map(|t| t.kind.as_str()).collect();
        assert_eq!(kinds, vec!["General", "video", "audio"]);
    }

    #[test]
    fn tags_are_carried_through() {
        let tracks = parse_probe_json(QUICKTIME_PROBE).unwrap();
        assert_eq!(
            tracks[0].field(DateField::Recorded),
            Some("2023-06-15T16:30:00+0200")
        );
        assert_eq!(
            tracks[1].field(DateField::Creation),
            Some("2023-06-15T14:30:00.000000Z")
        );
    }

    #[test]
    fn missing_sections_yield_no_tracks() {
        assert!(parse_probe_json("{}").unwrap().is_empty());
    }

    #[test]
    fn streams_without_tags_are_kept() {
        let tracks =
            parse_probe_json(r#"{"streams": [{"index": 0, "codec_type": "video"}]}"#).unwrap();
        assert_eq!(tracks.len(), 1);
        assert!(tracks[0].tags.is_empty());
    }

    #[test]
    fn malformed_json_is_probe_error() {
        assert!(matches!(
            parse_probe_json("not json"),
            Err(ProbeError::Json(_))
        ));
    }

    #[test]
    fn missing_stream_detection() {
        assert!(is_missing_stream(
            "Stream map '0:v:0' matches no streams.\nTo ignore this, add a trailing '?' to the map."
        ));
        assert!(!is_missing_stream("clip.mp4: Invalid data found when processing input"));
    }

    #[test]
    fn nonexistent_file_is_open_failure() {
        let backend = FfmpegBackend::new();
        let result = backend.first_frame(Path::new("/nonexistent/clip.mp4"));
        assert!(matches!(result, Err(ExtractError::Open { .. })));
    }

    #[test]
    fn missing_decoder_binary_is_open_failure() {
        let tmp = tempfile::TempDir::new().unwrap();
        let video = tmp.path().join("clip.mp4");
        std::fs::write(&video, b"\x00\x00\x00\x18ftypmp42").unwrap();

        let backend =
            FfmpegBackend::with_binaries("/nonexistent/ffmpeg", "/nonexistent/ffprobe");
        let result = backend.first_frame(&video);
        assert!(matches!(result, Err(ExtractError::Open { .. })));
    }

    #[test]
    fn missing_probe_binary_is_spawn_error() {
        let backend =
            FfmpegBackend::with_binaries("/nonexistent/ffmpeg", "/nonexistent/ffprobe");
        let result = backend.probe_tracks(Path::new("/nonexistent/clip.mp4"));
        assert!(matches!(result, Err(ProbeError::Spawn(_))));
    }
}
