//! SHOUTcast server statistics: decoding the status XML and fetching it.

use leader_config::LeaderConfig;
use leader_http::{Credentials, FetchError, FetchRequest};
use quick_xml::Reader;
use quick_xml::events::Event;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Root element written by [`StatsRecord::to_xml`]. Decoding accepts any root.
pub const STATS_ROOT: &str = "SHOUTCASTSERVER";

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("couldn't load page - {0}")]
    Fetch(#[from] FetchError),
    #[error("couldn't parse stats - {0}")]
    Decode(String),
    #[error("couldn't encode stats - {0}")]
    Encode(String),
}

/// One snapshot of the server status document. Tags not listed here are
/// ignored, missing tags stay at zero, and a repeated tag keeps its last value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatsRecord {
    #[serde(rename = "CURRENTLISTENERS")]
    pub current_listeners: i64,
    #[serde(rename = "PEAKLISTENERS")]
    pub peak_listeners: i64,
    #[serde(rename = "MAXLISTENERS")]
    pub max_listeners: i64,
    #[serde(rename = "UNIQUELISTENERS")]
    pub unique_listeners: i64,
    /// Average listen time in seconds.
    #[serde(rename = "AVERAGETIME")]
    pub average_time: i64,
    #[serde(rename = "SERVERGENRE")]
    pub server_genre: String,
    #[serde(rename = "SERVERURL")]
    pub server_url: String,
    #[serde(rename = "SERVERTITLE")]
    pub server_title: String,
    #[serde(rename = "SONGTITLE")]
    pub song_title: String,
    #[serde(rename = "STREAMHITS")]
    pub stream_hits: i64,
    #[serde(rename = "STREAMSTATUS")]
    pub stream_status: i64,
    #[serde(rename = "BACKUPSTATUS")]
    pub backup_status: i64,
    #[serde(rename = "STREAMPATH")]
    pub stream_path: String,
    /// Seconds since the source connected.
    #[serde(rename = "STREAMUPTIME")]
    pub stream_uptime: i64,
    /// kbps
    #[serde(rename = "BITRATE")]
    pub bitrate: i64,
    #[serde(rename = "CONTENT")]
    pub content: String,
    #[serde(rename = "VERSION")]
    pub version: String,
}

enum Slot<'a> {
    Int(&'a mut i64),
    Text(&'a mut String),
}

impl Slot<'_> {
    fn assign(self, tag: &str, raw: String) -> Result<(), StatsError> {
        match self {
            Slot::Text(field) => *field = raw,
            Slot::Int(field) => *field = parse_int(tag, &raw)?,
        }
        Ok(())
    }
}

// Empty integer elements read as zero; anything else must parse.
fn parse_int(tag: &str, raw: &str) -> Result<i64, StatsError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0);
    }
    raw.parse()
        .map_err(|e| StatsError::Decode(format!("invalid integer {raw:?} in <{tag}>: {e}")))
}

impl StatsRecord {
    fn slot(&mut self, tag: &[u8]) -> Option<Slot<'_>> {
        let slot = match tag {
            b"CURRENTLISTENERS" => Slot::Int(&mut self.current_listeners),
            b"PEAKLISTENERS" => Slot::Int(&mut self.peak_listeners),
            b"MAXLISTENERS" => Slot::Int(&mut self.max_listeners),
            b"UNIQUELISTENERS" => Slot::Int(&mut self.unique_listeners),
            b"AVERAGETIME" => Slot::Int(&mut self.average_time),
            b"SERVERGENRE" => Slot::Text(&mut self.server_genre),
            b"SERVERURL" => Slot::Text(&mut self.server_url),
            b"SERVERTITLE" => Slot::Text(&mut self.server_title),
            b"SONGTITLE" => Slot::Text(&mut self.song_title),
            b"STREAMHITS" => Slot::Int(&mut self.stream_hits),
            b"STREAMSTATUS" => Slot::Int(&mut self.stream_status),
            b"BACKUPSTATUS" => Slot::Int(&mut self.backup_status),
            b"STREAMPATH" => Slot::Text(&mut self.stream_path),
            b"STREAMUPTIME" => Slot::Int(&mut self.stream_uptime),
            b"BITRATE" => Slot::Int(&mut self.bitrate),
            b"CONTENT" => Slot::Text(&mut self.content),
            b"VERSION" => Slot::Text(&mut self.version),
            _ => return None,
        };
        Some(slot)
    }

    pub fn is_streaming(&self) -> bool {
        self.stream_status != 0
    }

    /// Encode under a `SHOUTCASTSERVER` root.
    pub fn to_xml(&self) -> Result<String, StatsError> {
        quick_xml::se::to_string_with_root(STATS_ROOT, self)
            .map_err(|e| StatsError::Encode(e.to_string()))
    }

    /// One line for the chat `stats` command.
    ///
    /// ```
    /// use leader_commands::stats::StatsRecord;
    ///
    /// let stats = StatsRecord {
    ///     current_listeners: 12,
    ///     max_listeners: 100,
    ///     peak_listeners: 40,
    ///     server_title: "Mighty Radio".into(),
    ///     song_title: "Band - Song".into(),
    ///     stream_status: 1,
    ///     stream_uptime: 3_720,
    ///     bitrate: 128,
    ///     ..Default::default()
    /// };
    /// assert_eq!(
    ///     stats.summary(),
    ///     "Mighty Radio - now playing: Band - Song | listeners: 12/100 (peak 40) | 128kbps | up 1h 2m"
    /// );
    /// ```
    pub fn summary(&self) -> String {
        let title = if self.server_title.trim().is_empty() {
            "The stream"
        } else {
            self.server_title.trim()
        };
        if !self.is_streaming() {
            return format!("{title} is offline");
        }

        let mut out = title.to_string();
        if !self.song_title.trim().is_empty() {
            out.push_str(" - now playing: ");
            out.push_str(self.song_title.trim());
        }
        out.push_str(&format!(
            " | listeners: {}/{} (peak {})",
            self.current_listeners, self.max_listeners, self.peak_listeners
        ));
        if self.bitrate > 0 {
            out.push_str(&format!(" | {}kbps", self.bitrate));
        }
        if self.stream_uptime > 0 {
            out.push_str(&format!(" | up {}", format_uptime(self.stream_uptime)));
        }
        out
    }
}

fn format_uptime(secs: i64) -> String {
    let (days, rem) = (secs / 86_400, secs % 86_400);
    let (hours, mins) = (rem / 3_600, (rem % 3_600) / 60);
    match (days, hours) {
        (0, 0) => format!("{mins}m"),
        (0, _) => format!("{hours}h {mins}m"),
        _ => format!("{days}d {hours}h {mins}m"),
    }
}

/// Decode the status XML. Pure; malformed input never yields a partial record.
///
/// Only direct children of the root element are mapped. Text inside a field's
/// own child elements is skipped, and the root element's name is not checked.
pub fn decode_stats(xml: &str) -> Result<StatsRecord, StatsError> {
    let mut reader = Reader::from_str(xml);
    let mut stats = StatsRecord::default();
    let mut depth = 0usize;
    let mut seen_root = false;
    // Tag and text of the known field currently open at depth 2.
    let mut open: Option<(String, String)> = None;

    let malformed = |reader: &Reader<&[u8]>, e: quick_xml::Error| {
        StatsError::Decode(format!("{e} at byte {}", reader.buffer_position()))
    };

    loop {
        match reader.read_event().map_err(|e| malformed(&reader, e))? {
            Event::Start(e) => {
                depth += 1;
                seen_root = true;
                if depth == 2 && stats.slot(e.name().as_ref()).is_some() {
                    let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    open = Some((tag, String::new()));
                }
            }
            Event::Empty(e) => {
                if depth == 0 {
                    // `<ROOT/>`: nothing to read.
                    return Ok(stats);
                }
                if depth == 1 {
                    let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    if let Some(slot) = stats.slot(e.name().as_ref()) {
                        slot.assign(&tag, String::new())?;
                    }
                }
            }
            Event::Text(e) if depth == 2 => {
                if let Some((_, text)) = open.as_mut() {
                    let chunk = e.unescape().map_err(|e| malformed(&reader, e))?;
                    text.push_str(&chunk);
                }
            }
            Event::CData(e) if depth == 2 => {
                if let Some((_, text)) = open.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::End(_) => {
                if depth == 2 {
                    if let Some((tag, text)) = open.take() {
                        if let Some(slot) = stats.slot(tag.as_bytes()) {
                            slot.assign(&tag, text)?;
                        }
                    }
                }
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Ok(stats);
                }
            }
            Event::Eof => {
                let message = if seen_root {
                    "unexpected end of document"
                } else {
                    "no root element"
                };
                return Err(StatsError::Decode(message.to_string()));
            }
            _ => {}
        }
    }
}

/// Where to fetch stats from. Passed explicitly to [`fetch_stats`].
#[derive(Debug, Clone)]
pub struct StatsSource {
    pub url: String,
    pub credentials: Option<Credentials>,
    pub connect_timeout: Duration,
    pub io_timeout: Duration,
}

impl StatsSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            credentials: None,
            connect_timeout: leader_http::DEFAULT_CONNECT_TIMEOUT,
            io_timeout: leader_http::DEFAULT_IO_TIMEOUT,
        }
    }

    pub fn with_credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_timeouts(mut self, connect: Duration, io: Duration) -> Self {
        self.connect_timeout = connect;
        self.io_timeout = io;
        self
    }

    /// `None` when `stream.stats_url` is unset.
    pub fn from_config(cfg: &LeaderConfig) -> Option<Self> {
        if !cfg.stream.is_configured() {
            return None;
        }
        let credentials = cfg
            .stream
            .credentials()
            .and_then(|(user, pass)| Credentials::new(user, pass));
        Some(
            Self::new(cfg.stream.stats_url.trim())
                .with_credentials(credentials)
                .with_timeouts(
                    Duration::from_secs(cfg.http.connect_timeout_secs),
                    Duration::from_secs(cfg.http.io_timeout_secs),
                ),
        )
    }

    fn request(&self) -> FetchRequest {
        FetchRequest::new(self.url.clone())
            .with_credentials(self.credentials.clone())
            .with_connect_timeout(self.connect_timeout)
            .with_io_timeout(self.io_timeout)
    }
}

/// Fetch the status page once and decode it.
pub async fn fetch_stats(source: &StatsSource) -> Result<StatsRecord, StatsError> {
    let body = source.request().send().await.map_err(|e| {
        tracing::error!(message = %e, "stats.load_failed");
        StatsError::Fetch(e)
    })?;

    let stats = decode_stats(&body).inspect_err(|e| {
        tracing::error!(message = %e, body_len = body.len(), "stats.parse_failed");
    })?;

    tracing::debug!(
        listeners = stats.current_listeners,
        streaming = stats.is_streaming(),
        "stats.fetched"
    );
    Ok(stats)
}
