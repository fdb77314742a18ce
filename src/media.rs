//! Image retrieval for embedded binaries.
//!
//! A source is either a filesystem path or an `http`/`https` URL. The
//! [`MediaFetcher`] trait hides which one; [`SourceFetcher`] is the default
//! implementation and tests substitute their own.

use std::io::Read;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{Error, Result};
use crate::util::{MediaFormat, describe_unknown, sniff_media_format};

/// Conventional desktop browser user agent; some image hosts refuse
/// requests without one.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:88.8) Gecko/20100101 Firefox/88.8";

/// Default upper bound on a downloaded image (32 MiB).
pub const MAX_MEDIA_SIZE: u64 = 32 * 1024 * 1024;

/// Retrieves raw bytes for a media source.
pub trait MediaFetcher: Send + Sync {
    fn fetch(&self, source: &str) -> Result<Vec<u8>>;
}

/// Settings for [`SourceFetcher`].
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout: Duration,
    /// Downloads larger than this fail instead of being truncated.
    pub max_size: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            max_size: MAX_MEDIA_SIZE,
        }
    }
}

/// Where a source string points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    File,
    Http,
}

impl SourceKind {
    /// Classify by URI scheme. Anything without an `http`/`https` scheme is
    /// treated as a local path.
    pub fn of(source: &str) -> Self {
        match source.split_once("://") {
            Some((scheme, _))
                if scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https") =>
            {
                SourceKind::Http
            }
            _ => SourceKind::File,
        }
    }
}

/// Reads local files and downloads HTTP(S) URLs.
#[derive(Debug, Clone, Default)]
pub struct SourceFetcher {
    config: FetchConfig,
}

impl SourceFetcher {
    pub fn new(config: FetchConfig) -> Self {
        Self { config }
    }

    fn fetch_http(&self, url: &str) -> Result<Vec<u8>> {
        tracing::info!(url, "fetching media");
        let agent = ureq::AgentBuilder::new()
            .timeout(self.config.timeout)
            .user_agent(&self.config.user_agent)
            .build();

        let response = match agent.get(url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(code, _)) => {
                return Err(Error::fetch(url, format!("HTTP status {code}")));
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(Error::fetch(url, transport));
            }
        };

        // One byte past the limit tells a full-size payload from a cut one.
        let limit = self.config.max_size;
        let mut data = Vec::new();
        response
            .into_reader()
            .take(limit.saturating_add(1))
            .read_to_end(&mut data)
            .map_err(|e| Error::fetch(url, e))?;
        if data.len() as u64 > limit {
            return Err(Error::fetch(url, format!("payload exceeds {limit} bytes")));
        }
        Ok(data)
    }
}

impl MediaFetcher for SourceFetcher {
    fn fetch(&self, source: &str) -> Result<Vec<u8>> {
        match SourceKind::of(source) {
            SourceKind::Http => self.fetch_http(source),
            SourceKind::File => std::fs::read(source).map_err(|e| Error::fetch(source, e)),
        }
    }
}

/// An image payload that passed sniffing, ready to embed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedMedia {
    pub format: MediaFormat,
    pub base64: String,
}

/// Check that `data` is PNG or JPEG and base64-encode it.
pub fn encode_image(data: &[u8]) -> Result<EncodedMedia> {
    let Some(format) = sniff_media_format(data) else {
        let detected = describe_unknown(data);
        tracing::warn!(content_type = %detected, "unsupported media content type");
        return Err(Error::UnsupportedMediaType(detected));
    };
    Ok(EncodedMedia {
        format,
        base64: STANDARD.encode(data),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_kind() {
        assert_eq!(SourceKind::of("https://x.test/a.png"), SourceKind::Http);
        assert_eq!(SourceKind::of("HTTP://x.test/a.png"), SourceKind::Http);
        assert_eq!(SourceKind::of("ftp://x.test/a.png"), SourceKind::File);
        assert_eq!(SourceKind::of("/tmp/a.png"), SourceKind::File);
        assert_eq!(SourceKind::of("C:\\images\\a.png"), SourceKind::File);
    }

    #[test]
    fn test_encode_image_accepts_png() {
        let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        let encoded = encode_image(&png).unwrap();
        assert_eq!(encoded.format, MediaFormat::Png);
        assert_eq!(encoded.base64, "iVBORw0KGgo=");
    }

    #[test]
    fn test_encode_image_rejects_gif() {
        let err = encode_image(b"GIF89a....").unwrap_err();
        assert!(matches!(err, Error::UnsupportedMediaType(ref t) if t == "image/gif"));
    }

    #[test]
    fn test_fetch_config_defaults() {
        let config = FetchConfig::default();
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_size, 32 * 1024 * 1024);
    }

    #[test]
    fn test_missing_file_is_fetch_error() {
        let err = SourceFetcher::default()
            .fetch("/definitely/not/here.png")
            .unwrap_err();
        assert!(matches!(err, Error::MediaFetch { .. }));
    }
}
