//! Reqwest-based platform client.
//!
//! Two calls make up the whole protocol: `POST /v1/tokens` trades
//! service-account credentials for a bearer token, `POST /v1/maps`
//! registers a dataset + visualization pair and yields a map id from
//! which the tile URL template is built.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use terra_core::{LayerSpec, MapSpec, ServiceConfig, VisParams};

use crate::credentials::ServiceAccountCredentials;
use crate::error::{EoError, EoResult};

/// Bearer token for one request's worth of platform calls.
#[derive(Clone)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn secret(&self) -> &str {
        &self.0
    }
}

/// A registered map layer: where the widget fetches tiles from.
#[derive(Debug, Clone, PartialEq)]
pub struct TileSource {
    /// Tile URL template with `{z}/{x}/{y}` placeholders.
    pub tile_url: String,
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    email: &'a str,
    key: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Serialize)]
struct MapRegistration<'a> {
    dataset: &'a str,
    vis: &'a VisParams,
}

#[derive(Deserialize)]
struct MapResponse {
    map_id: String,
}

/// Client for the Earth-observation platform.
///
/// Holds only the connection pool; tokens and credentials stay with the
/// request that created them.
#[derive(Clone)]
pub struct EoClient {
    http: reqwest::Client,
    base_url: String,
}

impl EoClient {
    pub fn from_config(config: &ServiceConfig) -> EoResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("terramap/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: config.platform_url.clone(),
        })
    }

    /// Exchange credentials for a bearer token.
    pub async fn authenticate(
        &self,
        credentials: &ServiceAccountCredentials,
    ) -> EoResult<AccessToken> {
        let url = format!("{}/v1/tokens", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&TokenRequest {
                email: credentials.email(),
                key: credentials.key(),
            })
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let body: TokenResponse = response.json().await?;
                debug!(email = credentials.email(), "platform token issued");
                Ok(AccessToken(body.access_token))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(EoError::AuthRejected(response.status().as_u16()))
            }
            status => Err(EoError::Unexpected(status.as_u16())),
        }
    }

    /// Register one layer and return its tile source.
    pub async fn register_map(
        &self,
        token: &AccessToken,
        layer: &LayerSpec,
    ) -> EoResult<TileSource> {
        let url = format!("{}/v1/maps", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(token.secret())
            .json(&MapRegistration {
                dataset: &layer.dataset,
                vis: &layer.vis,
            })
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let body: MapResponse = response.json().await?;
                debug!(dataset = %layer.dataset, map_id = %body.map_id, "layer registered");
                Ok(TileSource {
                    tile_url: tile_url(&self.base_url, &body.map_id),
                })
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(EoError::AuthRejected(response.status().as_u16()))
            }
            StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND => Err(EoError::DatasetRejected {
                dataset: layer.dataset.clone(),
                status: response.status().as_u16(),
            }),
            status => Err(EoError::Unexpected(status.as_u16())),
        }
    }

    /// Authenticate and register every layer of a map, in order.
    ///
    /// The returned sources line up index-for-index with `spec.layers`.
    pub async fn resolve_map(
        &self,
        credentials: &ServiceAccountCredentials,
        spec: &MapSpec,
    ) -> EoResult<Vec<TileSource>> {
        let token = self.authenticate(credentials).await?;
        let mut sources = Vec::with_capacity(spec.layers.len());
        for layer in &spec.layers {
            sources.push(self.register_map(&token, layer).await?);
        }
        Ok(sources)
    }
}

fn tile_url(base_url: &str, map_id: &str) -> String {
    format!("{base_url}/v1/maps/{map_id}/tiles/{{z}}/{{x}}/{{y}}")
}
