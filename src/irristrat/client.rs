use super::normalize::{into_observation_set, into_stations};
use super::types::*;
use crate::config::Config;
use crate::validation::{DateRange, StationId};
use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("Irristrat request failed: {0}")]
    Unreachable(#[from] reqwest::Error),
    #[error("Irristrat returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Irristrat payload could not be read: {0}")]
    Malformed(String),
    #[error("{0}")]
    Provider(String),
}

pub struct IrristratClient {
    client: Client,
    config: Config,
}

impl IrristratClient {
    pub fn new(config: Config) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .user_agent(concat!("StationGateway/", env!("CARGO_PKG_VERSION")))
            .timeout(config.irristrat_timeout)
            .build()?;

        Ok(Self { client, config })
    }

    pub async fn stations(&self) -> Result<Vec<Station>, UpstreamError> {
        let url = format!(
            "{}{}",
            self.config.irristrat_base_url, self.config.irristrat_stations_path
        );

        let payload: UpstreamPayload<Station> = self.get_json(&url, &[]).await?;
        into_stations(payload)
    }

    /// Hourly observations for one station.
    pub async fn hourly(&self, station: &StationId) -> Result<ObservationSet, UpstreamError> {
        self.observations(station, Granularity::Hourly, &[]).await
    }

    pub async fn ten_minute(&self, station: &StationId) -> Result<ObservationSet, UpstreamError> {
        self.observations(station, Granularity::TenMinute, &[]).await
    }

    pub async fn daily(
        &self,
        station: &StationId,
        range: &DateRange,
    ) -> Result<ObservationSet, UpstreamError> {
        let from = range.from.format("%Y-%m-%d").to_string();
        let to = range.to.format("%Y-%m-%d").to_string();
        let params = [("from", from.as_str()), ("to", to.as_str())];
        self.observations(station, Granularity::Daily, &params).await
    }

    async fn observations(
        &self,
        station: &StationId,
        granularity: Granularity,
        params: &[(&str, &str)],
    ) -> Result<ObservationSet, UpstreamError> {
        let path = self
            .config
            .observation_path(granularity)
            .replace("{station}", &urlencoding::encode(station.as_str()));
        let url = format!("{}{}", self.config.irristrat_base_url, path);

        let payload: UpstreamPayload<UpstreamRecord> = self.get_json(&url, params).await?;
        let set = into_observation_set(payload, granularity)?;

        tracing::debug!(
            "Fetched {} {} observations for station {}",
            set.len(),
            granularity,
            station
        );
        Ok(set)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<T, UpstreamError> {
        let mut request = self.client.get(url).query(params);
        if let Some(token) = &self.config.irristrat_api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| UpstreamError::Malformed(e.to_string()))
    }
}
