//! Lookup module - nearby gym search and tutorial video search
//!
//! Both services are consumed as-is: one request per user action, no retry,
//! no timeout policy. Failures are logged by callers and degrade to an empty
//! result on screen.

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";
const YOUTUBE_SEARCH_URL: &str = "https://www.googleapis.com/youtube/v3/search";

/// Search radius around the geocoded point, in meters
const GYM_SEARCH_RADIUS_M: f64 = 1000.0;

/// Meters per degree of latitude
const METERS_PER_DEG_LAT: f64 = 111_320.0;

/// A nearby gym (or similar place) for display
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub name: String,
    pub address: String,
}

/// A tutorial video search hit for display
#[derive(Debug, Clone, PartialEq)]
pub struct Video {
    pub video_id: String,
    pub title: String,
    pub description: String,
}

impl Video {
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.video_id)
    }
}

#[derive(Debug, Deserialize)]
struct NominatimHit {
    lat: String,
    lon: String,
    #[serde(default)]
    name: String,
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct VideoSearchResponse {
    items: Vec<VideoSearchItem>,
}

#[derive(Debug, Deserialize)]
struct VideoSearchItem {
    id: VideoSearchId,
    snippet: VideoSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSearchId {
    // Absent for channel/playlist hits, which we skip.
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoSnippet {
    title: String,
    description: String,
}

/// Bounding box approximating a radius around a point: (left, top, right,
/// bottom) in degrees, the order Nominatim's `viewbox` parameter expects.
fn viewbox(lat: f64, lon: f64, radius_m: f64) -> (f64, f64, f64, f64) {
    let dlat = radius_m / METERS_PER_DEG_LAT;
    let dlon = radius_m / (METERS_PER_DEG_LAT * lat.to_radians().cos().max(0.01));
    (lon - dlon, lat + dlat, lon + dlon, lat - dlat)
}

fn decode<T: for<'de> Deserialize<'de>>(body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| Error::MalformedResponse(e.to_string()))
}

/// Client for the two external lookup services
pub struct LookupClient {
    http: Client,
}

impl LookupClient {
    pub fn new() -> Result<Self> {
        // Nominatim requires an identifying user agent.
        let http = Client::builder()
            .user_agent(concat!("fittrack/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http })
    }

    /// Find gyms within the fixed radius of a free-text location
    ///
    /// Geocodes the location first, then runs a bounded place search around
    /// the resolved coordinates.
    pub async fn find_gyms(&self, location: &str) -> Result<Vec<Place>> {
        let body = self
            .http
            .get(NOMINATIM_URL)
            .query(&[("q", location), ("format", "jsonv2"), ("limit", "1")])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let hits: Vec<NominatimHit> = decode(&body)?;

        let hit = hits
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(format!("no match for location '{location}'")))?;
        let lat: f64 = hit
            .lat
            .parse()
            .map_err(|_| Error::MalformedResponse(format!("bad latitude '{}'", hit.lat)))?;
        let lon: f64 = hit
            .lon
            .parse()
            .map_err(|_| Error::MalformedResponse(format!("bad longitude '{}'", hit.lon)))?;
        debug!(location, lat, lon, "geocoded");

        let (left, top, right, bottom) = viewbox(lat, lon, GYM_SEARCH_RADIUS_M);
        let viewbox_param = format!("{left},{top},{right},{bottom}");
        let body = self
            .http
            .get(NOMINATIM_URL)
            .query(&[
                ("q", "gym"),
                ("format", "jsonv2"),
                ("viewbox", viewbox_param.as_str()),
                ("bounded", "1"),
                ("limit", "20"),
            ])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let hits: Vec<NominatimHit> = decode(&body)?;

        Ok(hits
            .into_iter()
            .map(|h| Place {
                name: if h.name.is_empty() {
                    "Unknown".to_string()
                } else {
                    h.name
                },
                address: h.display_name,
            })
            .collect())
    }

    /// Search tutorial videos for a free-text query
    pub async fn search_videos(&self, query: &str, api_key: &str) -> Result<Vec<Video>> {
        let body = self
            .http
            .get(YOUTUBE_SEARCH_URL)
            .query(&[("key", api_key), ("part", "snippet"), ("q", query)])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let response: VideoSearchResponse = decode(&body)?;

        Ok(response
            .items
            .into_iter()
            .filter_map(|item| {
                item.id.video_id.map(|video_id| Video {
                    video_id,
                    title: item.snippet.title,
                    description: item.snippet.description,
                })
            })
            .collect())
    }
}
