use url::Url;

use crate::{DecodeError, PathIdentity};

/// Hostname of the priority ("firehose") upload channel.
pub const PRIORITY_UPLOAD_HOST: &str = "upload.commadotai.com";

/// Decodes upload target URLs into route/segment/filename identity.
///
/// The identity always occupies the last three path segments. Standard hosts
/// additionally carry an account segment right before the route:
///
/// - priority host: `/…/<route>/<segment>/<filename>`
/// - other hosts:   `/…/<account>/<route>/<segment>/<filename>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathDecoder {
    priority_host: String,
}

impl Default for PathDecoder {
    fn default() -> Self {
        Self::with_priority_host(PRIORITY_UPLOAD_HOST)
    }
}

impl PathDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_priority_host(host: impl Into<String>) -> Self {
        Self {
            priority_host: host.into().trim().to_ascii_lowercase(),
        }
    }

    pub fn priority_host(&self) -> &str {
        &self.priority_host
    }

    pub fn decode(&self, url: &str) -> Result<PathIdentity, DecodeError> {
        let parsed =
            Url::parse(url).map_err(|err| DecodeError::malformed(url, format!("invalid url: {err}")))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| DecodeError::malformed(url, "missing host"))?;
        let is_priority_channel = host.eq_ignore_ascii_case(&self.priority_host);

        let segments: Vec<&str> = parsed
            .path_segments()
            .map(|segments| segments.collect())
            .unwrap_or_default();
        let required = if is_priority_channel { 3 } else { 4 };
        if segments.len() < required {
            return Err(DecodeError::malformed(
                url,
                format!(
                    "expected at least {required} path segments, found {}",
                    segments.len()
                ),
            ));
        }

        let tail = &segments[segments.len() - required..];
        if tail.iter().any(|part| part.is_empty()) {
            return Err(DecodeError::malformed(url, "empty path segment"));
        }
        let (route, segment, filename) = (tail[required - 3], tail[required - 2], tail[required - 1]);

        Ok(PathIdentity {
            route: route.to_string(),
            segment: parse_segment(url, segment)?,
            filename: filename.to_string(),
            is_priority_channel,
        })
    }
}

/// Decodes `url` against the default priority host.
pub fn decode_upload_path(url: &str) -> Result<PathIdentity, DecodeError> {
    PathDecoder::default().decode(url)
}

// Segments are plain decimal numbers; signs, whitespace and overflow are rejected.
fn parse_segment(url: &str, raw: &str) -> Result<u32, DecodeError> {
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DecodeError::malformed(
            url,
            format!("segment {raw:?} is not a number"),
        ));
    }
    raw.parse::<u32>()
        .map_err(|err| DecodeError::malformed(url, format!("segment {raw:?}: {err}")))
}
