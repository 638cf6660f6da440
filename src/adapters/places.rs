//! Text search against the Places API.

use crate::config::{PlacesConfig, API_KEY_ENV};
use crate::core::{Photo, PlaceLookup, PlaceResult};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{validate_required_field, Validate};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchTextRequest<'a> {
    text_query: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct SearchTextResponse {
    #[serde(default)]
    places: Vec<ApiPlace>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiPlace {
    user_rating_count: Option<u64>,
    rating: Option<serde_json::Number>,
    #[serde(default)]
    photos: Vec<ApiPhoto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiPhoto {
    #[serde(default)]
    name: String,
    #[serde(default)]
    author_attributions: Vec<AuthorAttribution>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthorAttribution {
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    uri: String,
}

pub struct GooglePlacesClient {
    client: Client,
    config: PlacesConfig,
    api_key: String,
}

impl GooglePlacesClient {
    /// Fails when the credential is absent, so a run never starts without one.
    pub fn new(config: PlacesConfig) -> Result<Self> {
        config.validate()?;
        let api_key = validate_required_field(API_KEY_ENV, &config.api_key)?.clone();

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(timeout));
        }

        Ok(Self {
            client: builder.build()?,
            config,
            api_key,
        })
    }

    /// One POST to the search endpoint; the first place in the response wins.
    pub async fn search_text(&self, query: &str) -> Result<PlaceResult> {
        tracing::debug!("Making API request to: {}", self.config.endpoint);

        let response = self
            .client
            .post(&self.config.endpoint)
            .header("X-Goog-Api-Key", &self.api_key)
            .header("X-Goog-FieldMask", &self.config.field_mask)
            .json(&SearchTextRequest { text_query: query })
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);

        let body = response.text().await?;
        if !status.is_success() {
            return Err(EtlError::LookupError {
                query: query.to_string(),
                message: format!("HTTP {}: {}", status, body.trim()),
            });
        }

        let parsed: SearchTextResponse = serde_json::from_str(&body)?;
        let place = parsed
            .places
            .into_iter()
            .next()
            .ok_or_else(|| EtlError::LookupError {
                query: query.to_string(),
                message: "no place found".to_string(),
            })?;

        Ok(self.place_result(place))
    }

    fn place_result(&self, place: ApiPlace) -> PlaceResult {
        let photos = place
            .photos
            .into_iter()
            .filter(|photo| !photo.name.is_empty())
            .map(|photo| Photo {
                url: self.photo_url(&photo.name),
                attribution: photo
                    .author_attributions
                    .iter()
                    .map(|a| format!("{}: {}", a.display_name, a.uri))
                    .collect::<Vec<_>>()
                    .join("; "),
            })
            .collect();

        PlaceResult {
            review_count: place.user_rating_count,
            rating: place.rating,
            photos,
        }
    }

    /// `{base}/{photo name}/media?key=...&maxWidthPx=...`
    pub fn photo_url(&self, photo_name: &str) -> String {
        format!(
            "{}/{}/media?key={}&maxWidthPx={}",
            self.config.photo_base_url.trim_end_matches('/'),
            photo_name,
            self.api_key,
            self.config.photo_max_width
        )
    }
}

#[async_trait]
impl PlaceLookup for GooglePlacesClient {
    async fn lookup(&self, business_name: &str) -> PlaceResult {
        let query = business_name.trim();
        if query.is_empty() {
            tracing::warn!("Skipping empty business name.");
            return PlaceResult::default();
        }

        match self.search_text(query).await {
            Ok(result) => result,
            Err(e) if e.is_recoverable() => {
                tracing::warn!("No usable place for '{}': {}", query, e);
                PlaceResult::default()
            }
            Err(e) => {
                tracing::error!("API request failed for '{}': {}", query, e);
                PlaceResult::default()
            }
        }
    }
}
