//! # Observatory HTTP client
//!
//! Fetches raw MEV datapoints and the validator directory from an
//! observatory deployment (`/api/v1/raw_mev`, `/api/v1/validator`).
//!
//! Every call is attempted exactly once: no retries, no pagination, no
//! caching. Non-success statuses, undecodable bodies and schema violations
//! are all surfaced as [`ObservatoryError`] so that nothing malformed reaches
//! the join.

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::config::ObservatoryConfig;
use crate::error::ObservatoryError;
use crate::types::{
    parse_datapoints, parse_validators, HeightRange, MevSample, RawMevResponse,
    RawValidatorResponse, ValidatorInfo,
};

/// API version path segment.
pub const API_VERSION: &str = "v1";

const RAW_MEV_ENDPOINT: &str = "/raw_mev";
const VALIDATOR_ENDPOINT: &str = "/validator";

/// Anything that can produce the MEV samples for a height window.
#[async_trait]
pub trait MevSampleSource {
    async fn fetch_mev_samples(
        &self,
        range: HeightRange,
    ) -> Result<Vec<MevSample>, ObservatoryError>;
}

/// Anything that can produce the current validator directory.
#[async_trait]
pub trait ValidatorSource {
    async fn fetch_validators(&self) -> Result<Vec<ValidatorInfo>, ObservatoryError>;
}

/// Client for a single observatory deployment.
#[derive(Debug, Clone)]
pub struct ObservatoryClient {
    client: Client,
    config: ObservatoryConfig,
}

impl ObservatoryClient {
    /// Builds the underlying HTTP client from `config`.
    ///
    /// # Errors
    /// Returns [`ObservatoryError::InvalidUrl`] if `config.base_url` does not
    /// parse, or [`ObservatoryError::Http`] if the HTTP client cannot be built.
    pub fn new(config: ObservatoryConfig) -> Result<Self, ObservatoryError> {
        Url::parse(&config.base_url)
            .map_err(|e| ObservatoryError::InvalidUrl(format!("{}: {e}", config.base_url)))?;

        let mut builder = Client::builder().user_agent(&config.user_agent);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client, config })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn config(&self) -> &ObservatoryConfig {
        &self.config
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!(
            "{}/api/{}{}",
            self.config.base_url.trim_end_matches('/'),
            API_VERSION,
            endpoint
        )
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T, ObservatoryError> {
        let url = self.endpoint_url(endpoint);
        debug!(url = %url, ?query, "observatory GET");

        let response = self.client.get(&url).query(query).send().await?;
        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
    ) -> Result<T, ObservatoryError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ObservatoryError::api_error(status.as_u16(), body));
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Fetches every datapoint with height in `range` (inclusive).
    ///
    /// # Errors
    /// Fails on transport errors, non-success status, undecodable JSON, or
    /// a datapoint missing `height`/`value`.
    #[tracing::instrument(skip_all, fields(from = range.from_height, to = range.to_height))]
    pub async fn fetch_raw_mev(
        &self,
        range: HeightRange,
    ) -> Result<Vec<MevSample>, ObservatoryError> {
        let query = [
            ("limit", self.config.limit.to_string()),
            ("from_height", range.from_height.to_string()),
            ("to_height", range.to_height.to_string()),
            ("with_block_info", self.config.with_block_info.to_string()),
        ];

        let response: RawMevResponse = self.get(RAW_MEV_ENDPOINT, &query).await?;
        let samples = parse_datapoints(response)?;

        info!(samples = samples.len(), "mev samples fetched");
        Ok(samples)
    }

    /// Fetches the full validator directory.
    ///
    /// # Errors
    /// Fails on transport errors, non-success status, undecodable JSON, or
    /// a validator missing `pubkey`/`moniker`.
    #[tracing::instrument(skip_all)]
    pub async fn fetch_validator_directory(
        &self,
    ) -> Result<Vec<ValidatorInfo>, ObservatoryError> {
        let response: RawValidatorResponse = self.get(VALIDATOR_ENDPOINT, &[]).await?;
        let validators = parse_validators(response)?;

        info!(validators = validators.len(), "validator directory fetched");
        Ok(validators)
    }
}

#[async_trait]
impl MevSampleSource for ObservatoryClient {
    async fn fetch_mev_samples(
        &self,
        range: HeightRange,
    ) -> Result<Vec<MevSample>, ObservatoryError> {
        self.fetch_raw_mev(range).await
    }
}

#[async_trait]
impl ValidatorSource for ObservatoryClient {
    async fn fetch_validators(&self) -> Result<Vec<ValidatorInfo>, ObservatoryError> {
        self.fetch_validator_directory().await
    }
}
