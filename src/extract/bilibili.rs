//! BiliBili subtitle extractor.
//!
//! Subtitle access is gated on a logged-in session cookie (`SESSDATA`)
//! supplied by an injected [`SessionProvider`]; the login flow itself is
//! external. Short `b23.tv` links are resolved with a HEAD request before
//! BVID extraction. All API calls send the session cookie and a desktop
//! user-agent — the API rejects default and mobile agents.

use std::sync::LazyLock;
use std::time::SystemTime;

use regex::Regex;
use reqwest::Client;
use reqwest::header::{COOKIE, USER_AGENT};
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::error::SummaryError;
use crate::source::ensure_scheme;

use super::ExtractedContent;
use super::http_client::DESKTOP_USER_AGENT;

const DEFAULT_API_BASE_URL: &str = "https://api.bilibili.com";
const SHORT_LINK_HOST: &str = "b23.tv";

/// Fixed placeholder body the subtitle API returns for videos without real
/// subtitles. Matching a literal localized string is brittle, but the API
/// offers no better signal; if upstream rewords it this check silently
/// stops filtering.
const FAILURE_SENTINEL: &str =
    "友情提示：如果视频本身没有添加字幕的，是无法使用此方法打开字幕选项的！";

static BVID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^BV[1-9A-HJ-NP-Za-km-z]{10}$")
        .unwrap_or_else(|e| panic!("invalid static regex: {e}"))
});

/// A BiliBili session token with its expiry, produced by the external
/// login flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    /// Raw `SESSDATA` cookie value.
    pub value: String,
    /// Expiry when the login flow reported one.
    pub expires_at: Option<SystemTime>,
}

impl SessionToken {
    /// Creates a token without expiry information.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            expires_at: None,
        }
    }

    /// Returns true when the token has a recorded expiry in the past.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|expiry| expiry <= SystemTime::now())
    }
}

/// Supplies the current BiliBili session token, when one exists.
///
/// The core never performs the login flow itself; implementations read
/// whatever the platform's login surface persisted.
pub trait SessionProvider: Send + Sync {
    fn current_session_token(&self) -> Option<SessionToken>;
}

#[derive(Debug, Deserialize)]
struct VideoInfoResponse {
    code: i64,
    #[serde(default)]
    message: String,
    data: Option<VideoInfoData>,
}

#[derive(Debug, Deserialize)]
struct VideoInfoData {
    cid: i64,
    title: String,
    owner: VideoOwner,
}

#[derive(Debug, Deserialize)]
struct VideoOwner {
    name: String,
}

#[derive(Debug, Deserialize)]
struct PlayerInfoResponse {
    code: i64,
    #[serde(default)]
    message: String,
    data: Option<PlayerInfoData>,
}

#[derive(Debug, Deserialize)]
struct PlayerInfoData {
    subtitle: Option<SubtitleInfo>,
}

#[derive(Debug, Deserialize)]
struct SubtitleInfo {
    #[serde(default)]
    subtitles: Vec<SubtitleItem>,
}

/// One subtitle candidate from `x/player/wbi/v2`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
struct SubtitleItem {
    /// Language code, e.g. `zh-CN` or `ai-zh`.
    lan: String,
    /// `0` = user upload, `1` = AI generated.
    #[serde(rename = "type")]
    kind: i64,
    subtitle_url: String,
}

#[derive(Debug, Deserialize)]
struct SubtitleContentResponse {
    #[serde(default)]
    body: Vec<SubtitleLine>,
}

#[derive(Debug, Deserialize)]
struct SubtitleLine {
    #[serde(default)]
    content: String,
}

/// Drops blank URLs, normalizes protocol-relative URLs, and orders
/// candidates so user-uploaded or Chinese subtitles come first (stable
/// otherwise).
fn order_subtitle_candidates(subtitles: Vec<SubtitleItem>) -> Vec<SubtitleItem> {
    let mut candidates: Vec<SubtitleItem> = subtitles
        .into_iter()
        .filter(|item| !item.subtitle_url.trim().is_empty())
        .map(|mut item| {
            if item.subtitle_url.starts_with("//") {
                item.subtitle_url = format!("https:{}", item.subtitle_url);
            }
            item
        })
        .collect();
    candidates.sort_by_key(|item| {
        let preferred = item.kind == 0 || item.lan.to_ascii_lowercase().contains("zh");
        !preferred
    });
    candidates
}

/// Extractor for BiliBili video subtitles.
pub struct BiliBiliExtractor {
    client: Client,
    api_base_url: String,
    session: std::sync::Arc<dyn SessionProvider>,
}

impl BiliBiliExtractor {
    /// Creates an extractor against the production BiliBili API.
    #[must_use]
    pub fn new(client: Client, session: std::sync::Arc<dyn SessionProvider>) -> Self {
        Self::with_base_url(client, DEFAULT_API_BASE_URL, session)
    }

    /// Creates an extractor against a custom API endpoint for tests.
    #[must_use]
    pub fn with_base_url(
        client: Client,
        api_base_url: impl Into<String>,
        session: std::sync::Arc<dyn SessionProvider>,
    ) -> Self {
        Self {
            client,
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            session,
        }
    }

    /// Extracts title, author, and subtitle text for a BiliBili video URL.
    ///
    /// # Errors
    ///
    /// - [`SummaryError::InvalidLink`] when no BVID can be extracted.
    /// - [`SummaryError::BiliBiliLoginRequired`] when no usable session
    ///   token is available — checked before any API call.
    /// - [`SummaryError::NoInternet`] on transport failures or non-success
    ///   HTTP statuses.
    /// - [`SummaryError::NoContent`] when the video-info API rejects the
    ///   request.
    /// - [`SummaryError::NoTranscript`] when no candidate yields a usable
    ///   subtitle.
    #[tracing::instrument(skip(self), fields(url = %url))]
    pub async fn extract(&self, url: &str) -> Result<ExtractedContent, SummaryError> {
        // The session gate runs before anything that could touch the
        // network, including short-link resolution.
        let token = self
            .session
            .current_session_token()
            .filter(|token| !token.value.trim().is_empty() && !token.is_expired())
            .ok_or(SummaryError::BiliBiliLoginRequired)?;

        let bvid = self.resolve_bvid(url).await?;

        let info = self.fetch_video_info(&bvid, &token.value).await?;
        let candidates = self.fetch_subtitle_candidates(&bvid, info.cid, &token.value).await?;

        let mut transcript = None;
        for candidate in &candidates {
            let text = match self.fetch_subtitle_text(&candidate.subtitle_url).await {
                Ok(text) => text,
                Err(error) => {
                    warn!(language = %candidate.lan, error = %error, "subtitle candidate fetch failed");
                    continue;
                }
            };
            if text.contains(FAILURE_SENTINEL) {
                debug!(language = %candidate.lan, "candidate returned the no-subtitle placeholder");
                continue;
            }
            transcript = Some(text);
            break;
        }

        let Some(transcript) = transcript else {
            warn!(candidates = candidates.len(), "no candidate produced a usable subtitle");
            return Err(SummaryError::no_transcript());
        };
        if transcript.trim().is_empty() {
            return Err(SummaryError::no_transcript());
        }

        Ok(ExtractedContent::new(info.title, info.owner.name, transcript))
    }

    /// Resolves the BVID from the URL, following the `b23.tv` redirect
    /// first when needed. Prefers the path segment after a literal `video`
    /// segment, else the first segment.
    async fn resolve_bvid(&self, url: &str) -> Result<String, SummaryError> {
        let parsed =
            Url::parse(ensure_scheme(url.trim()).as_ref()).map_err(|_| SummaryError::InvalidLink)?;

        let final_url = if parsed
            .host_str()
            .is_some_and(|host| host.eq_ignore_ascii_case(SHORT_LINK_HOST))
        {
            let response = self
                .client
                .head(parsed.clone())
                .send()
                .await
                .map_err(|error| {
                    warn!(error = %error, "short-link resolution failed");
                    SummaryError::NoInternet
                })?;
            response.url().clone()
        } else {
            parsed
        };

        let segments: Vec<&str> = final_url
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();

        let candidate = match segments.as_slice() {
            [first, second, ..] if first.eq_ignore_ascii_case("video") => Some(*second),
            [first, ..] => Some(*first),
            [] => None,
        };

        candidate
            .filter(|value| BVID_RE.is_match(value))
            .map(str::to_string)
            .ok_or(SummaryError::InvalidLink)
    }

    async fn fetch_video_info(
        &self,
        bvid: &str,
        sessdata: &str,
    ) -> Result<VideoInfoData, SummaryError> {
        let url = format!("{}/x/web-interface/view", self.api_base_url);
        let response = self
            .client
            .get(&url)
            .header(COOKIE, format!("SESSDATA={sessdata}"))
            .header(USER_AGENT, DESKTOP_USER_AGENT)
            .query(&[("bvid", bvid)])
            .send()
            .await
            .map_err(|error| {
                warn!(error = %error, "video info request failed");
                SummaryError::NoInternet
            })?;

        if !response.status().is_success() {
            warn!(status = response.status().as_u16(), "video info request failed");
            return Err(SummaryError::NoInternet);
        }

        let info: VideoInfoResponse = response.json().await.map_err(|error| {
            warn!(error = %error, "video info response could not be parsed");
            SummaryError::NoInternet
        })?;

        if info.code != 0 {
            warn!(code = info.code, message = %info.message, "video info API error");
            return Err(SummaryError::NoContent);
        }
        info.data.ok_or(SummaryError::NoContent)
    }

    async fn fetch_subtitle_candidates(
        &self,
        bvid: &str,
        cid: i64,
        sessdata: &str,
    ) -> Result<Vec<SubtitleItem>, SummaryError> {
        let url = format!("{}/x/player/wbi/v2", self.api_base_url);
        let response = self
            .client
            .get(&url)
            .header(COOKIE, format!("SESSDATA={sessdata}"))
            .header(USER_AGENT, DESKTOP_USER_AGENT)
            .query(&[
                ("bvid", bvid),
                ("cid", &cid.to_string()),
                ("isGaiaAvoided", "false"),
                ("web_location", "1315873"),
            ])
            .send()
            .await
            .map_err(|error| {
                warn!(error = %error, "player info request failed");
                SummaryError::NoInternet
            })?;

        if !response.status().is_success() {
            warn!(status = response.status().as_u16(), "player info request failed");
            return Err(SummaryError::NoInternet);
        }

        let player: PlayerInfoResponse = response.json().await.map_err(|error| {
            warn!(error = %error, "player info response could not be parsed");
            SummaryError::NoInternet
        })?;

        if player.code != 0 {
            warn!(code = player.code, message = %player.message, "player info API error");
            return Err(SummaryError::no_transcript());
        }

        let subtitles = player
            .data
            .and_then(|data| data.subtitle)
            .map(|subtitle| subtitle.subtitles)
            .unwrap_or_default();
        let candidates = order_subtitle_candidates(subtitles);
        if candidates.is_empty() {
            debug!("no subtitle candidates available");
            return Err(SummaryError::no_transcript());
        }
        Ok(candidates)
    }

    async fn fetch_subtitle_text(&self, subtitle_url: &str) -> Result<String, SummaryError> {
        let response = self
            .client
            .get(subtitle_url)
            .header(USER_AGENT, DESKTOP_USER_AGENT)
            .send()
            .await
            .map_err(|error| {
                warn!(error = %error, "subtitle content request failed");
                SummaryError::NoInternet
            })?;

        if !response.status().is_success() {
            warn!(status = response.status().as_u16(), "subtitle content request failed");
            return Err(SummaryError::NoInternet);
        }

        let content: SubtitleContentResponse = response.json().await.map_err(|error| {
            warn!(error = %error, "subtitle content could not be parsed");
            SummaryError::NoInternet
        })?;

        Ok(content
            .body
            .into_iter()
            .map(|line| line.content)
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

impl std::fmt::Debug for BiliBiliExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BiliBiliExtractor")
            .field("api_base_url", &self.api_base_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn item(lan: &str, kind: i64, url: &str) -> SubtitleItem {
        SubtitleItem {
            lan: lan.to_string(),
            kind,
            subtitle_url: url.to_string(),
        }
    }

    #[test]
    fn test_bvid_pattern() {
        assert!(BVID_RE.is_match("BV1xx411c7mD"));
        // Excluded base58 characters must not match.
        assert!(!BVID_RE.is_match("BV0xx411c7mD"));
        assert!(!BVID_RE.is_match("BV1xx411c7m"));
        assert!(!BVID_RE.is_match("av12345"));
    }

    #[test]
    fn test_order_subtitle_candidates_prefers_user_or_chinese() {
        let ordered = order_subtitle_candidates(vec![
            item("en-US", 1, "https://cdn.test/en.json"),
            item("ai-zh", 1, "https://cdn.test/ai-zh.json"),
            item("ja", 0, "https://cdn.test/ja.json"),
        ]);
        // ai-zh (Chinese) and ja (user upload) outrank the AI English track,
        // keeping their relative order.
        assert_eq!(ordered[0].lan, "ai-zh");
        assert_eq!(ordered[1].lan, "ja");
        assert_eq!(ordered[2].lan, "en-US");
    }

    #[test]
    fn test_order_subtitle_candidates_normalizes_protocol_relative() {
        let ordered = order_subtitle_candidates(vec![item(
            "zh-CN",
            0,
            "//i0.hdslb.com/subtitle.json",
        )]);
        assert_eq!(ordered[0].subtitle_url, "https://i0.hdslb.com/subtitle.json");
    }

    #[test]
    fn test_order_subtitle_candidates_drops_blank_urls() {
        let ordered = order_subtitle_candidates(vec![
            item("zh-CN", 0, "   "),
            item("en", 1, "https://cdn.test/en.json"),
        ]);
        assert_eq!(ordered.len(), 1);
        assert_eq!(ordered[0].lan, "en");
    }

    #[test]
    fn test_session_token_expiry() {
        let fresh = SessionToken {
            value: "abc".to_string(),
            expires_at: Some(SystemTime::now() + Duration::from_secs(3600)),
        };
        assert!(!fresh.is_expired());

        let stale = SessionToken {
            value: "abc".to_string(),
            expires_at: Some(SystemTime::now() - Duration::from_secs(1)),
        };
        assert!(stale.is_expired());

        assert!(!SessionToken::new("abc").is_expired());
    }

    #[test]
    fn test_subtitle_item_wire_names() {
        let json = r#"{"lan": "ai-zh", "type": 1, "subtitle_url": "//cdn.test/s.json"}"#;
        let parsed: SubtitleItem = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.lan, "ai-zh");
        assert_eq!(parsed.kind, 1);
        assert_eq!(parsed.subtitle_url, "//cdn.test/s.json");
    }
}
