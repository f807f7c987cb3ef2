//! Line-oriented M3U parser
//!
//! Only the `#EXTINF` + URL-line subset used by the iptv-org playlists is
//! understood. Every other tag is ignored.
//!
//! The parser keeps three pending fields (name, group, URL). An `#EXTINF:` line
//! resets all three. Whenever all three are set, one [`ParsedChannel`] is emitted
//! and the fields are cleared, so a block yields at most one channel: a second
//! URL line before the next `#EXTINF:` is dropped.

use std::io::BufRead;
use tracing::warn;

use crate::models::ParsedChannel;

const EXTINF_MARKER: &str = "#EXTINF:";
const URL_PREFIX: &str = "http";
const GROUP_TITLE_ATTR: &str = "group-title=\"";

/// Where the group key of a parsed channel comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupSource {
    /// The `group-title="..."` attribute of each `#EXTINF` line
    Attribute,
    /// A key fixed for the whole resource, e.g. derived from its filename
    Fixed(String),
}

/// Lazy iterator of channels over an iterator of lines
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct M3uLineParser<I> {
    lines: I,
    group_source: GroupSource,
    pending_name: String,
    pending_group: String,
    pending_url: String,
}

impl<I, S> M3uLineParser<I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    pub fn new(lines: I, group_source: GroupSource) -> Self {
        Self {
            lines,
            group_source,
            pending_name: String::new(),
            pending_group: String::new(),
            pending_url: String::new(),
        }
    }

    fn reset(&mut self) {
        self.pending_name.clear();
        self.pending_group.clear();
        self.pending_url.clear();
    }

    fn handle_extinf(&mut self, line: &str) {
        self.reset();

        let Some((attributes, name)) = line.rsplit_once(',') else {
            return;
        };
        self.pending_name = name.trim().to_string();
        self.pending_group = match &self.group_source {
            GroupSource::Attribute => extract_group_title(attributes).unwrap_or_default(),
            GroupSource::Fixed(key) => key.clone(),
        };
    }

    fn take_complete(&mut self) -> Option<ParsedChannel> {
        if self.pending_name.is_empty() || self.pending_group.is_empty() || self.pending_url.is_empty()
        {
            return None;
        }
        Some(ParsedChannel {
            display_name: std::mem::take(&mut self.pending_name),
            group_key: std::mem::take(&mut self.pending_group),
            stream_url: std::mem::take(&mut self.pending_url),
        })
    }
}

impl<I, S> Iterator for M3uLineParser<I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    type Item = ParsedChannel;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(line) = self.lines.next() {
            let line = line.as_ref();
            if line.starts_with(EXTINF_MARKER) {
                self.handle_extinf(line);
            } else if line.starts_with(URL_PREFIX) {
                self.pending_url = line.trim().to_string();
            }

            if let Some(channel) = self.take_complete() {
                return Some(channel);
            }
        }
        None
    }
}

/// First quoted value after `group-title="`, trimmed
fn extract_group_title(attributes: &str) -> Option<String> {
    let (_, rest) = attributes.split_once(GROUP_TITLE_ATTR)?;
    let value = rest.split('"').next().unwrap_or(rest);
    Some(value.trim().to_string())
}

/// Parse an in-memory playlist body
pub fn parse_str(content: &str, group_source: GroupSource) -> Vec<ParsedChannel> {
    M3uLineParser::new(content.lines(), group_source).collect()
}

/// Lines of a reader, decoded permissively.
///
/// Invalid UTF-8 is replaced rather than rejected. A read error ends the
/// sequence early and is logged.
pub struct LossyLines<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: BufRead> LossyLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(512),
        }
    }
}

impl<R: BufRead> Iterator for LossyLines<R> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                let mut line = String::from_utf8_lossy(&self.buf).into_owned();
                while line.ends_with('\n') || line.ends_with('\r') {
                    line.pop();
                }
                Some(line)
            }
            Err(e) => {
                warn!("Stopped reading playlist early: {}", e);
                None
            }
        }
    }
}
