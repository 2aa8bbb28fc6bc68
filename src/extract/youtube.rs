//! YouTube transcript extractor.
//!
//! YouTube exposes no stable public transcript API, so extraction takes
//! two network round-trips: scrape the innertube API key out of the watch
//! page HTML, then call the `/youtubei/v1/player` endpoint for video
//! details and the caption-track list. The selected track's `baseUrl` is
//! rewritten to the `json3` format and downloaded as the third hop.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::Client;
use reqwest::header::ACCEPT_LANGUAGE;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};
use url::Url;

use crate::error::SummaryError;
use crate::source::ensure_scheme;

use super::ExtractedContent;

const DEFAULT_BASE_URL: &str = "https://www.youtube.com";

/// Client identity pinned in the innertube request body; the ANDROID
/// client returns complete caption metadata where web clients may not.
const INNERTUBE_CLIENT_NAME: &str = "ANDROID";
const INNERTUBE_CLIENT_VERSION: &str = "20.10.38";

static API_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r#""INNERTUBE_API_KEY"\s*:\s*"([^"]+)""#));
static VIDEO_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"^[A-Za-z0-9_-]{11}$"));

fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

/// One entry of `captions.playerCaptionsTracklistRenderer.captionTracks`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    pub base_url: String,
    #[serde(default)]
    pub name: Option<TrackName>,
    pub language_code: String,
    /// `"asr"` marks auto-generated tracks; absent or empty means
    /// human-authored.
    #[serde(default)]
    pub kind: Option<String>,
}

impl CaptionTrack {
    fn is_auto_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TrackName {
    #[serde(default)]
    pub simple_text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerResponse {
    playability_status: Option<PlayabilityStatus>,
    video_details: Option<VideoDetails>,
    captions: Option<Captions>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayabilityStatus {
    status: Option<String>,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoDetails {
    title: Option<String>,
    author: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Captions {
    player_captions_tracklist_renderer: Option<TracklistRenderer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TracklistRenderer {
    #[serde(default)]
    caption_tracks: Vec<CaptionTrack>,
}

#[derive(Debug, Deserialize)]
struct TranscriptJson {
    #[serde(default)]
    events: Vec<TranscriptEvent>,
}

#[derive(Debug, Deserialize)]
struct TranscriptEvent {
    #[serde(default)]
    segs: Vec<TranscriptSegment>,
}

#[derive(Debug, Deserialize)]
struct TranscriptSegment {
    #[serde(default)]
    utf8: Option<String>,
}

/// Extracts the 11-character video ID from any supported YouTube URL
/// shape: `youtu.be/<id>`, `watch?v=<id>`, `/shorts/<id>`, `/embed/<id>`,
/// `/live/<id>`, `/v/<id>`, a bare first path segment, a scheme-less
/// link, or a bare ID on its own.
#[must_use]
pub fn extract_video_id(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if VIDEO_ID_RE.is_match(trimmed) {
        return Some(trimmed.to_string());
    }

    let url = Url::parse(ensure_scheme(trimmed).as_ref()).ok()?;
    let host = url.host_str()?.to_ascii_lowercase();
    let segments: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    let candidate = if host == "youtu.be" {
        segments.first().copied().map(str::to_string)
    } else if host == "youtube.com" || host.ends_with(".youtube.com") {
        match segments.first().copied() {
            Some("watch") => url
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned()),
            Some("live" | "embed" | "v" | "shorts") => {
                segments.get(1).copied().map(str::to_string)
            }
            // Fallback for links like youtube.com/VIDEO_ID.
            Some(first) if VIDEO_ID_RE.is_match(first) => Some(first.to_string()),
            _ => None,
        }
    } else {
        None
    };

    candidate.filter(|id| VIDEO_ID_RE.is_match(id))
}

/// Rewrites a caption track `baseUrl` to force the `json3` transcript
/// format.
fn transcript_url(base_url: &str) -> String {
    if base_url.contains("fmt=srv3") {
        base_url.replace("fmt=srv3", "fmt=json3")
    } else if base_url.contains('?') {
        format!("{base_url}&fmt=json3")
    } else {
        format!("{base_url}?fmt=json3")
    }
}

/// Selects the single best caption track, strictly in priority order:
/// human-authored in the preferred language, human-authored English, any
/// track whose language code starts with the preferred language, any
/// track whose language code starts with `en`, then the first track.
fn select_caption_track<'a>(
    tracks: &'a [CaptionTrack],
    preferred_language: &str,
) -> Option<&'a CaptionTrack> {
    tracks
        .iter()
        .find(|t| t.language_code == preferred_language && !t.is_auto_generated())
        .or_else(|| {
            tracks
                .iter()
                .find(|t| t.language_code == "en" && !t.is_auto_generated())
        })
        .or_else(|| {
            tracks
                .iter()
                .find(|t| t.language_code.starts_with(preferred_language))
        })
        .or_else(|| tracks.iter().find(|t| t.language_code.starts_with("en")))
        .or_else(|| tracks.first())
}

/// Concatenates `events[].segs[].utf8` with no separator, converts
/// newlines to spaces, and trims. Segments may or may not carry their own
/// spacing, so joining with an empty string is the safe choice.
fn parse_json3_transcript(body: &str) -> String {
    let Ok(parsed) = serde_json::from_str::<TranscriptJson>(body) else {
        warn!("transcript response was not valid json3");
        return String::new();
    };

    parsed
        .events
        .into_iter()
        .flat_map(|event| event.segs)
        .filter_map(|segment| segment.utf8)
        .collect::<String>()
        .replace('\n', " ")
        .trim()
        .to_string()
}

/// Extractor for YouTube video transcripts.
pub struct YouTubeExtractor {
    client: Client,
    base_url: String,
    preferred_language: String,
}

impl YouTubeExtractor {
    /// Creates an extractor against the production YouTube endpoints.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, DEFAULT_BASE_URL)
    }

    /// Creates an extractor against a custom endpoint for tests.
    #[must_use]
    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            preferred_language: "en".to_string(),
        }
    }

    /// Overrides the preferred caption language (defaults to `en`).
    #[must_use]
    pub fn with_preferred_language(mut self, language: impl Into<String>) -> Self {
        self.preferred_language = language.into();
        self
    }

    /// Extracts title, author, and the full transcript for a video URL.
    ///
    /// # Errors
    ///
    /// - [`SummaryError::InvalidLink`] when no video ID can be extracted.
    /// - [`SummaryError::NoInternet`] when a fetch fails or the innertube
    ///   API key is missing from the watch page.
    /// - [`SummaryError::NoTranscript`] when playback is gated, no caption
    ///   tracks exist, or the transcript body is empty.
    /// - [`SummaryError::NoContent`] when the player response lacks video
    ///   details.
    #[tracing::instrument(skip(self), fields(url = %url))]
    pub async fn extract(&self, url: &str) -> Result<ExtractedContent, SummaryError> {
        let Some(video_id) = extract_video_id(url) else {
            warn!("could not extract video ID");
            return Err(SummaryError::InvalidLink);
        };

        let watch_page = self.fetch_watch_page(&video_id).await?;
        let Some(api_key) = extract_api_key(&watch_page) else {
            warn!("INNERTUBE_API_KEY missing from watch page");
            return Err(SummaryError::NoInternet);
        };

        let player = self.fetch_player_response(&video_id, &api_key).await?;

        if let Some(status) = &player.playability_status
            && let Some(state) = status.status.as_deref()
            && matches!(state, "LOGIN_REQUIRED" | "UNPLAYABLE")
        {
            let reason = status.reason.clone().unwrap_or_else(|| state.to_string());
            warn!(status = state, reason = %reason, "video is not playable");
            return Err(SummaryError::no_transcript_because(reason));
        }

        let (title, author) = match player.video_details {
            Some(VideoDetails {
                title: Some(title),
                author: Some(author),
            }) => (title, author),
            _ => {
                warn!("player response is missing video details");
                return Err(SummaryError::NoContent);
            }
        };

        let tracks = player
            .captions
            .and_then(|c| c.player_captions_tracklist_renderer)
            .map(|renderer| renderer.caption_tracks)
            .unwrap_or_default();
        if tracks.is_empty() {
            debug!("no caption tracks available");
            return Err(SummaryError::no_transcript());
        }

        let Some(track) = select_caption_track(&tracks, &self.preferred_language) else {
            return Err(SummaryError::no_transcript());
        };
        debug!(
            language = %track.language_code,
            auto_generated = track.is_auto_generated(),
            "selected caption track"
        );

        let transcript = self.fetch_transcript(track).await?;
        if transcript.is_empty() {
            return Err(SummaryError::no_transcript());
        }

        Ok(ExtractedContent::new(title, author, transcript))
    }

    async fn fetch_watch_page(&self, video_id: &str) -> Result<String, SummaryError> {
        let watch_url = format!("{}/watch?v={video_id}", self.base_url);
        let response = self
            .client
            .get(&watch_url)
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|error| {
                warn!(error = %error, "watch page fetch failed");
                SummaryError::NoInternet
            })?;

        if !response.status().is_success() {
            warn!(status = response.status().as_u16(), "watch page fetch failed");
            return Err(SummaryError::NoInternet);
        }

        response.text().await.map_err(|error| {
            warn!(error = %error, "watch page body could not be read");
            SummaryError::NoInternet
        })
    }

    async fn fetch_player_response(
        &self,
        video_id: &str,
        api_key: &str,
    ) -> Result<PlayerResponse, SummaryError> {
        let api_url = format!("{}/youtubei/v1/player?key={api_key}", self.base_url);
        let body = json!({
            "context": {
                "client": {
                    "clientName": INNERTUBE_CLIENT_NAME,
                    "clientVersion": INNERTUBE_CLIENT_VERSION,
                }
            },
            "videoId": video_id,
        });

        let response = self
            .client
            .post(&api_url)
            .json(&body)
            .send()
            .await
            .map_err(|error| {
                warn!(error = %error, "player API request failed");
                SummaryError::NoInternet
            })?;

        if !response.status().is_success() {
            warn!(status = response.status().as_u16(), "player API request failed");
            return Err(SummaryError::NoInternet);
        }

        response.json::<PlayerResponse>().await.map_err(|error| {
            warn!(error = %error, "player response could not be parsed");
            SummaryError::NoInternet
        })
    }

    async fn fetch_transcript(&self, track: &CaptionTrack) -> Result<String, SummaryError> {
        let url = transcript_url(&track.base_url);
        let response = self
            .client
            .get(&url)
            // Mimic browser behavior; required for the request to succeed.
            .header(
                ACCEPT_LANGUAGE,
                format!("{},en;q=0.9", track.language_code),
            )
            .send()
            .await
            .map_err(|error| {
                warn!(error = %error, "transcript download failed");
                SummaryError::NoInternet
            })?;

        if !response.status().is_success() {
            warn!(status = response.status().as_u16(), "transcript download failed");
            return Err(SummaryError::NoInternet);
        }

        let body = response.text().await.map_err(|error| {
            warn!(error = %error, "transcript body could not be read");
            SummaryError::NoInternet
        })?;
        if body.is_empty() {
            return Err(SummaryError::no_transcript());
        }

        Ok(parse_json3_transcript(&body))
    }
}

impl std::fmt::Debug for YouTubeExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YouTubeExtractor")
            .field("base_url", &self.base_url)
            .field("preferred_language", &self.preferred_language)
            .finish_non_exhaustive()
    }
}

fn extract_api_key(html: &str) -> Option<String> {
    API_KEY_RE
        .captures(html)
        .and_then(|caps| caps.get(1).map(|m| m.as_str().to_string()))
}
