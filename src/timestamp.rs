//! Creation-time resolution for a video file.
//!
//! Every video gets a timestamp, no matter what. Sources are tried in order
//! and the first usable one wins:
//!
//! ```text
//! 1. container metadata   first non-empty date field, tracks in container order,
//!                         fields in priority order (recorded → creation → encoded → tagged)
//! 2. file modified time   when metadata is missing or unparseable      (fallback)
//! 3. current time         when even the file stat fails                (fallback)
//! ```
//!
//! ## Date formats
//!
//! A metadata value has any literal `UTC` marker stripped, then is matched
//! against [`DateFormat::PRIORITY`]. Each format is tried twice, first on the
//! value with its fractional-seconds suffix cut off, then on the value as-is.
//!
//! Parsed values are taken as local wall-clock time. Offsets and `UTC`
//! markers are not converted: the thumbnail shows the clock the camera wrote.
//!
//! ## Canonical string
//!
//! Whatever the source, the text form is `YYYY:MM:DD HH:MM:SS` in local time,
//! the layout EXIF uses for its date fields.

use crate::media::{DateField, MediaBackend, MetadataTrack};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use log::debug;
use serde::Serialize;
use std::path::Path;
use std::time::SystemTime;

/// `strftime` layout of the canonical timestamp string.
pub const CANONICAL_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Where a resolved timestamp came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimestampSource {
    Metadata { field: DateField },
    FileModified,
    Now,
}

/// A video's creation time, resolved once per item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedTimestamp {
    /// Seconds since the Unix epoch.
    pub instant: i64,
    /// `YYYY:MM:DD HH:MM:SS`, local time.
    pub text: String,
    pub used_fallback: bool,
    pub source: TimestampSource,
}

/// Known metadata date layouts, tried in [`DateFormat::PRIORITY`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// `15/06/2023 14:30`
    DayMonthYearMinutes,
    /// `2023-06-15 14:30:00`
    IsoSpace,
    /// `2023-06-15 14:30:00.123`
    IsoSpaceFraction,
    /// `2023-06-15T14:30:00`
    IsoT,
    /// `2023-06-15T14:30:00+0200`
    IsoTOffset,
}

impl DateFormat {
    pub const PRIORITY: [DateFormat; 5] = [
        DateFormat::DayMonthYearMinutes,
        DateFormat::IsoSpace,
        DateFormat::IsoSpaceFraction,
        DateFormat::IsoT,
        DateFormat::IsoTOffset,
    ];

    fn pattern(self) -> &'static str {
        match self {
            DateFormat::DayMonthYearMinutes => "%d/%m/%Y %H:%M",
            DateFormat::IsoSpace => "%Y-%m-%d %H:%M:%S",
            DateFormat::IsoSpaceFraction => "%Y-%m-%d %H:%M:%S%.f",
            DateFormat::IsoT => "%Y-%m-%dT%H:%M:%S",
            DateFormat::IsoTOffset => "%Y-%m-%dT%H:%M:%S%.f%z",
        }
    }

    /// Pattern used against a value whose fraction was cut off.
    fn truncated_pattern(self) -> &'static str {
        match self {
            DateFormat::IsoSpaceFraction => "%Y-%m-%d %H:%M:%S",
            other => other.pattern(),
        }
    }

    fn parse_with(self, value: &str, pattern: &str) -> Option<NaiveDateTime> {
        match self {
            DateFormat::IsoTOffset => DateTime::parse_from_str(value, pattern)
                .ok()
                .map(|dt| dt.naive_local()),
            _ => NaiveDateTime::parse_from_str(value, pattern).ok(),
        }
    }

    /// Try the truncated value first, then the raw one.
    fn parse(self, raw: &str, truncated: &str) -> Option<NaiveDateTime> {
        self.parse_with(truncated, self.truncated_pattern())
            .or_else(|| self.parse_with(raw, self.pattern()))
    }
}

/// Parse a metadata date value into a naive local date-time.
///
/// Returns the winning format alongside the value, or `None` when no format
/// matches.
pub fn parse_metadata_date(value: &str) -> Option<(NaiveDateTime, DateFormat)> {
    let cleaned = value.replace("UTC", "");
    let cleaned = cleaned.trim();
    let truncated = cleaned.split('.').next().unwrap_or(cleaned);

    DateFormat::PRIORITY
        .iter()
        .find_map(|format| format.parse(cleaned, truncated).map(|dt| (dt, *format)))
}

/// First non-empty date field across `tracks`.
///
/// Tracks are scanned in order; within a track, fields go by
/// [`DateField::PRIORITY`]. The scan stops at the first value found even if
/// it later fails to parse.
pub fn find_metadata_date(tracks: &[MetadataTrack]) -> Option<(DateField, &str)> {
    tracks.iter().find_map(|track| {
        DateField::PRIORITY
            .iter()
            .find_map(|field| track.field(*field).map(|value| (*field, value)))
    })
}

/// Format a local date-time as the canonical string.
pub fn format_canonical(dt: &DateTime<Local>) -> String {
    dt.format(CANONICAL_FORMAT).to_string()
}

fn from_naive(naive: NaiveDateTime, field: DateField) -> ResolvedTimestamp {
    let instant = Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.timestamp())
        .unwrap_or_else(|| naive.and_utc().timestamp());
    ResolvedTimestamp {
        instant,
        text: naive.format(CANONICAL_FORMAT).to_string(),
        used_fallback: false,
        source: TimestampSource::Metadata { field },
    }
}

fn from_system_time(time: SystemTime, source: TimestampSource) -> ResolvedTimestamp {
    let local: DateTime<Local> = time.into();
    ResolvedTimestamp {
        instant: local.timestamp(),
        text: format_canonical(&local),
        used_fallback: true,
        source,
    }
}

fn resolve_from_metadata(backend: &impl MediaBackend, path: &Path) -> Option<ResolvedTimestamp> {
    let tracks = match backend.probe_tracks(path) {
        Ok(tracks) => tracks,
        Err(e) => {
            debug!("metadata unavailable for {}: {e}", path.display());
            return None;
        }
    };

    let (field, value) = find_metadata_date(&tracks)?;
    match parse_metadata_date(value) {
        Some((naive, format)) => {
            debug!(
                "{}: {} = {value:?} parsed as {format:?}",
                path.display(),
                field.name()
            );
            Some(from_naive(naive, field))
        }
        None => {
            debug!(
                "{}: {} = {value:?} matches no known date format",
                path.display(),
                field.name()
            );
            None
        }
    }
}

/// Resolve the creation time of the video at `path`. Never fails.
pub fn resolve(backend: &impl MediaBackend, path: &Path) -> ResolvedTimestamp {
    if let Some(resolved) = resolve_from_metadata(backend, path) {
        return resolved;
    }

    match std::fs::metadata(path).and_then(|m| m.modified()) {
        Ok(modified) => from_system_time(modified, TimestampSource::FileModified),
        Err(e) => {
            debug!("cannot stat {}: {e}; using current time", path.display());
            from_system_time(SystemTime::now(), TimestampSource::Now)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::backend::tests::MockBackend;
    use crate::test_helpers::{general_track as general, set_mtime};
    use std::time::{Duration, UNIX_EPOCH};
    use tempfile::TempDir;

    fn canonical(value: &str) -> Option<String> {
        parse_metadata_date(value).map(|(dt, _)| dt.format(CANONICAL_FORMAT).to_string())
    }

    // =========================================================================
    // parse_metadata_date()
    // =========================================================================

    #[test]
    fn primary_format_day_month_year() {
        assert_eq!(
            canonical("15/06/2023 14:30").as_deref(),
            Some("2023:06:15 14:30:00")
        );
    }

    #[test]
    fn primary_format_wins_first() {
        let (_, format) = parse_metadata_date("15/06/2023 14:30").unwrap();
        assert_eq!(format, DateFormat::DayMonthYearMinutes);
    }

    #[test]
    fn iso_space_format() {
        let (dt, format) = parse_metadata_date("2023-06-15 14:30:05").unwrap();
        assert_eq!(format, DateFormat::IsoSpace);
        assert_eq!(dt.format(CANONICAL_FORMAT).to_string(), "2023:06:15 14:30:05");
    }

    #[test]
    fn fractional_seconds_are_truncated() {
        let (_, format) = parse_metadata_date("2023-06-15 14:30:05.123456").unwrap();
        assert_eq!(format, DateFormat::IsoSpace);
        assert_eq!(
            canonical("2023-06-15 14:30:05.123456").as_deref(),
            Some("2023:06:15 14:30:05")
        );
    }

    #[test]
    fn utc_marker_is_stripped() {
        assert_eq!(
            canonical("UTC 2023-06-15 14:30:00").as_deref(),
            Some("2023:06:15 14:30:00")
        );
        assert_eq!(
            canonical("2023-06-15 14:30:00 UTC").as_deref(),
            Some("2023:06:15 14:30:00")
        );
    }

    #[test]
    fn ffprobe_creation_time() {
        let (_, format) = parse_metadata_date("2023-06-15T14:30:00.000000Z").unwrap();
        assert_eq!(format, DateFormat::IsoT);
        assert_eq!(
            canonical("2023-06-15T14:30:00.000000Z").as_deref(),
            Some("2023:06:15 14:30:00")
        );
    }

    #[test]
    fn quicktime_offset_keeps_wall_clock() {
        let (_, format) = parse_metadata_date("2023-06-15T16:30:00+0200").unwrap();
        assert_eq!(format, DateFormat::IsoTOffset);
        assert_eq!(
            canonical("2023-06-15T16:30:00+0200").as_deref(),
            Some("2023:06:15 16:30:00")
        );
    }

    #[test]
    fn unknown_format_is_none() {
        assert!(parse_metadata_date("June 15th, 2023").is_none());
        assert!(parse_metadata_date("").is_none());
        assert!(parse_metadata_date("2023").is_none());
    }

    #[test]
    fn invalid_calendar_date_is_none() {
        assert!(parse_metadata_date("31/02/2023 10:00").is_none());
    }

    // =========================================================================
    // find_metadata_date()
    // =========================================================================

    #[test]
    fn field_priority_within_track() {
        let track = MetadataTrack::new("General")
            .with_tag("tagged_date", "2020-01-01 00:00:00")
            .with_tag("encoded_date", "2021-01-01 00:00:00")
            .with_tag("recorded_date", "2022-01-01 00:00:00");
        let tracks = [track];
        assert_eq!(
            find_metadata_date(&tracks),
            Some((DateField::Recorded, "2022-01-01 00:00:00"))
        );
    }

    #[test]
    fn earlier_track_wins_over_better_field() {
        let tracks = [
            general("tagged_date", "2020-01-01 00:00:00"),
            MetadataTrack::new("video").with_tag("recorded_date", "2022-01-01 00:00:00"),
        ];
        assert_eq!(
            find_metadata_date(&tracks),
            Some((DateField::Tagged, "2020-01-01 00:00:00"))
        );
    }

    #[test]
    fn empty_fields_are_skipped_across_tracks() {
        let tracks = [
            general("recorded_date", ""),
            MetadataTrack::new("video").with_tag("creation_time", "2022-01-01 00:00:00"),
        ];
        assert_eq!(
            find_metadata_date(&tracks),
            Some((DateField::Creation, "2022-01-01 00:00:00"))
        );
    }

    #[test]
    fn no_date_fields_is_none() {
        let tracks = [general("major_brand", "isom")];
        assert_eq!(find_metadata_date(&tracks), None);
        assert_eq!(find_metadata_date(&[]), None);
    }

    // =========================================================================
    // resolve()
    // =========================================================================

    fn video_with_mtime(dir: &TempDir, name: &str, secs: u64) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::File::create(&path).unwrap();
        set_mtime(&path, secs);
        path
    }

    fn expected_local(secs: u64) -> String {
        let local: DateTime<Local> = (UNIX_EPOCH + Duration::from_secs(secs)).into();
        format_canonical(&local)
    }

    #[test]
    fn resolve_uses_recorded_date() {
        let tmp = TempDir::new().unwrap();
        let path = video_with_mtime(&tmp, "a.mp4", 1_600_000_000);
        let backend =
            MockBackend::new().with_metadata("a.mp4", vec![general("recorded_date", "15/06/2023 14:30")]);

        let resolved = resolve(&backend, &path);
        assert_eq!(resolved.text, "2023:06:15 14:30:00");
        assert!(!resolved.used_fallback);
        assert_eq!(
            resolved.source,
            TimestampSource::Metadata {
                field: DateField::Recorded
            }
        );
    }

    #[test]
    fn resolve_instant_matches_local_wall_clock() {
        let tmp = TempDir::new().unwrap();
        let path = video_with_mtime(&tmp, "a.mp4", 1_600_000_000);
        let backend = MockBackend::new()
            .with_metadata("a.mp4", vec![general("creation_time", "2023-06-15 14:30:00")]);

        let resolved = resolve(&backend, &path);
        let back = Local.timestamp_opt(resolved.instant, 0).single().unwrap();
        assert_eq!(format_canonical(&back), resolved.text);
    }

    #[test]
    fn resolve_falls_back_to_mtime_without_metadata() {
        let tmp = TempDir::new().unwrap();
        let path = video_with_mtime(&tmp, "b.mp4", 1_650_000_000);
        let backend = MockBackend::new();

        let resolved = resolve(&backend, &path);
        assert!(resolved.used_fallback);
        assert_eq!(resolved.source, TimestampSource::FileModified);
        assert_eq!(resolved.text, expected_local(1_650_000_000));
        assert_eq!(resolved.instant, 1_650_000_000);
    }

    #[test]
    fn resolve_falls_back_when_value_unparseable() {
        let tmp = TempDir::new().unwrap();
        let path = video_with_mtime(&tmp, "c.mp4", 1_650_000_000);
        let backend = MockBackend::new().with_metadata(
            "c.mp4",
            vec![
                general("recorded_date", "sometime in June"),
                MetadataTrack::new("video").with_tag("creation_time", "2023-06-15 14:30:00"),
            ],
        );

        let resolved = resolve(&backend, &path);
        assert!(resolved.used_fallback);
        assert_eq!(resolved.text, expected_local(1_650_000_000));
    }

    #[test]
    fn resolve_falls_back_when_all_fields_empty() {
        let tmp = TempDir::new().unwrap();
        let path = video_with_mtime(&tmp, "d.mp4", 1_650_000_000);
        let backend =
            MockBackend::new().with_metadata("d.mp4", vec![general("recorded_date", "  ")]);

        let resolved = resolve(&backend, &path);
        assert!(resolved.used_fallback);
        assert_eq!(resolved.source, TimestampSource::FileModified);
    }

    #[test]
    fn resolve_uses_now_when_stat_fails() {
        let backend = MockBackend::new();
        let before = Local::now().timestamp();
        let resolved = resolve(&backend, Path::new("/nonexistent/video.mp4"));
        let after = Local::now().timestamp();

        assert!(resolved.used_fallback);
        assert_eq!(resolved.source, TimestampSource::Now);
        assert!(resolved.instant >= before && resolved.instant <= after);
        assert_eq!(resolved.text.len(), "YYYY:MM:DD HH:MM:SS".len());
    }
}
