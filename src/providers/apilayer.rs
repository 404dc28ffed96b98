use crate::core::config::ApiLayerProviderConfig;
use crate::core::currency::{Amount, Conversion, ConversionProvider, CurrencyPair};
use crate::core::error::ConversionError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, instrument};

const CONVERT_PATH: &str = "/currency_data/convert";

/// Currency conversion through the apilayer `currency_data` API.
pub struct ApiLayerProvider {
    endpoint: Url,
    api_key: String,
    client: reqwest::Client,
}

impl ApiLayerProvider {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let endpoint = format!("{}{}", base_url.trim_end_matches('/'), CONVERT_PATH);
        let endpoint = Url::parse(&endpoint)
            .with_context(|| format!("Invalid apilayer base url: {base_url}"))?;
        let client = reqwest::Client::builder()
            .user_agent("xconv/0.1")
            .build()
            .context("Failed to build HTTP client")?;

        Ok(ApiLayerProvider {
            endpoint,
            api_key: api_key.to_string(),
            client,
        })
    }

    pub fn from_config(config: &ApiLayerProviderConfig, api_key: &str) -> Result<Self> {
        Self::new(&config.base_url, api_key)
    }

    fn request_url(&self, amount: Amount, pair: &CurrencyPair) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("to", pair.to.as_str())
            .append_pair("from", pair.from.as_str())
            .append_pair("amount", &amount.to_string());
        url
    }
}

#[derive(Debug, Deserialize)]
struct ConvertResponse {
    success: Option<bool>,
    result: Option<f64>,
    info: Option<ConvertInfo>,
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ConvertInfo {
    timestamp: Option<i64>,
    quote: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    code: Option<i64>,
    info: Option<String>,
}

/// Error bodies come either from the API (`error.info`) or the gateway
/// in front of it (`message`).
#[derive(Debug, Deserialize)]
struct ErrorPayload {
    message: Option<String>,
    error: Option<ErrorDetail>,
}

fn error_message(body: &str) -> Option<String> {
    let payload: ErrorPayload = serde_json::from_str(body).ok()?;
    payload
        .error
        .and_then(|e| e.info)
        .or(payload.message)
        .filter(|m| !m.trim().is_empty())
}

fn parse_conversion(
    body: &str,
    status: u16,
    amount: Amount,
    pair: &CurrencyPair,
) -> Result<Conversion, ConversionError> {
    let data: ConvertResponse =
        serde_json::from_str(body).map_err(|e| ConversionError::Parse {
            message: e.to_string(),
        })?;

    if data.success == Some(false) || data.error.is_some() {
        let detail = data.error.as_ref();
        let message = detail
            .and_then(|e| e.info.clone())
            .or_else(|| detail.and_then(|e| e.code).map(|c| format!("error code {c}")))
            .unwrap_or_else(|| "request was not successful".to_string());
        return Err(ConversionError::Api { status, message });
    }

    let result = data.result.ok_or_else(|| ConversionError::Parse {
        message: "response has no numeric `result` field".to_string(),
    })?;

    let quoted_at = data
        .info
        .as_ref()
        .and_then(|i| i.timestamp)
        .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
        .unwrap_or_else(Utc::now);

    Ok(Conversion {
        amount,
        pair: pair.clone(),
        result,
        rate: data.info.and_then(|i| i.quote),
        quoted_at,
    })
}

#[async_trait]
impl ConversionProvider for ApiLayerProvider {
    #[instrument(name = "ApiLayerConvert", skip(self, pair), fields(pair = %pair))]
    async fn convert(
        &self,
        amount: Amount,
        pair: &CurrencyPair,
    ) -> Result<Conversion, ConversionError> {
        let url = self.request_url(amount, pair);
        debug!("Requesting conversion from {}", url);

        let response = self
            .client
            .get(url)
            .header("apikey", &self.api_key)
            .send()
            .await
            .map_err(ConversionError::Network)?;

        let status = response.status();
        debug!(status = %status, "Received apilayer response");

        let body = response.text().await.map_err(ConversionError::Network)?;

        if !status.is_success() {
            let message = error_message(&body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            });
            return Err(ConversionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let conversion = parse_conversion(&body, status.as_u16(), amount, pair)?;
        debug!(result = conversion.result, "Parsed conversion result");
        Ok(conversion)
    }
}
