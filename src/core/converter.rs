//! Drives conversion requests through a provider and into the session state.

use crate::core::currency::{Amount, Conversion, ConversionProvider, CurrencyPair};
use crate::core::error::ConversionError;
use crate::core::session::{Completion, RequestToken, Session};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Result of submitting one amount.
#[derive(Debug)]
pub enum Outcome {
    /// The conversion is now the displayed result.
    Displayed(Conversion),
    /// The conversion succeeded but a newer request was issued meanwhile.
    Superseded(Conversion),
    Failed(ConversionError),
    /// The request failed after a newer request was issued, so the error
    /// never reached the display.
    SupersededFailure(ConversionError),
}

impl Outcome {
    pub fn conversion(&self) -> Option<&Conversion> {
        match self {
            Outcome::Displayed(c) | Outcome::Superseded(c) => Some(c),
            Outcome::Failed(_) | Outcome::SupersededFailure(_) => None,
        }
    }

    /// Only failures of the latest request count; superseded ones do not.
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

pub struct Converter {
    provider: Arc<dyn ConversionProvider>,
    pair: CurrencyPair,
    session: Mutex<Session>,
}

impl Converter {
    pub fn new(
        provider: Arc<dyn ConversionProvider>,
        pair: CurrencyPair,
        default_amount: Option<Amount>,
    ) -> Self {
        Self {
            provider,
            pair,
            session: Mutex::new(Session::new(default_amount)),
        }
    }

    pub fn pair(&self) -> &CurrencyPair {
        &self.pair
    }

    /// Parses `input` and converts it. Only the latest submission updates
    /// the displayed result.
    pub async fn submit(&self, input: &str) -> Outcome {
        let amount = match input.parse::<Amount>() {
            Ok(amount) => amount,
            Err(e) => {
                self.session.lock().await.reject(input, e.to_string());
                return Outcome::Failed(e);
            }
        };

        let token = self.session.lock().await.begin(input);
        debug!(token = token.id(), %amount, pair = %self.pair, "Submitting conversion");

        let result = self.provider.convert(amount, &self.pair).await;
        self.finish(token, result).await
    }

    async fn finish(
        &self,
        token: RequestToken,
        result: Result<Conversion, ConversionError>,
    ) -> Outcome {
        let mut session = self.session.lock().await;
        match result {
            Ok(conversion) => match session.complete(token, conversion.clone()) {
                Completion::Applied => Outcome::Displayed(conversion),
                Completion::Superseded => {
                    debug!(token = token.id(), "Discarding superseded conversion");
                    Outcome::Superseded(conversion)
                }
            },
            Err(e) => match session.fail(token, e.to_string()) {
                Completion::Applied => {
                    warn!(token = token.id(), error = %e, "Conversion failed");
                    Outcome::Failed(e)
                }
                Completion::Superseded => {
                    debug!(token = token.id(), error = %e, "Discarding superseded failure");
                    Outcome::SupersededFailure(e)
                }
            },
        }
    }

    /// Resubmits the preserved input, which is the default amount until the
    /// user enters something else.
    pub async fn retry(&self) -> Option<Outcome> {
        let input = self.session.lock().await.input()?.to_string();
        Some(self.submit(&input).await)
    }

    pub async fn snapshot(&self) -> Session {
        self.session.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::session::DisplayState;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Converts at a fixed rate, optionally delaying some amounts.
    struct MockProvider {
        rate: f64,
        delays_ms: HashMap<u64, u64>,
        fail_with_status: Option<u16>,
        fail_amounts: Vec<u64>,
        call_count: AtomicUsize,
    }

    impl MockProvider {
        fn new(rate: f64) -> Self {
            Self {
                rate,
                delays_ms: HashMap::new(),
                fail_with_status: None,
                fail_amounts: Vec::new(),
                call_count: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ConversionProvider for MockProvider {
        async fn convert(
            &self,
            amount: Amount,
            pair: &CurrencyPair,
        ) -> Result<Conversion, ConversionError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delays_ms.get(&(amount.value() as u64)) {
                tokio::time::sleep(Duration::from_millis(*delay)).await;
            }
            let status = self.fail_with_status.or_else(|| {
                self.fail_amounts
                    .contains(&(amount.value() as u64))
                    .then_some(500)
            });
            if let Some(status) = status {
                return Err(ConversionError::Api {
                    status,
                    message: "Internal Server Error".to_string(),
                });
            }
            Ok(Conversion {
                amount,
                pair: pair.clone(),
                result: amount.value() * self.rate,
                rate: Some(self.rate),
                quoted_at: Utc::now(),
            })
        }
    }

    fn pair() -> CurrencyPair {
        CurrencyPair::new("CAD".parse().unwrap(), "INR".parse().unwrap())
    }

    #[tokio::test]
    async fn test_zero_amount_converts_to_zero() {
        let converter = Converter::new(Arc::new(MockProvider::new(60.5)), pair(), None);
        let outcome = converter.submit("0").await;
        assert_eq!(outcome.conversion().map(|c| c.result), Some(0.0));
        assert_eq!(converter.snapshot().await.converted_amount(), Some(0.0));
    }

    #[tokio::test]
    async fn test_invalid_input_skips_provider() {
        let provider = Arc::new(MockProvider::new(60.5));
        let converter = Converter::new(provider.clone(), pair(), None);

        let outcome = converter.submit("twelve").await;
        assert!(matches!(
            outcome,
            Outcome::Failed(ConversionError::InvalidAmount { .. })
        ));
        assert_eq!(provider.call_count.load(Ordering::SeqCst), 0);

        let session = converter.snapshot().await;
        assert_eq!(session.input(), Some("twelve"));
        assert_eq!(session.state(), DisplayState::Idle);
    }

    #[tokio::test]
    async fn test_failure_preserves_input_for_retry() {
        let mut provider = MockProvider::new(60.5);
        provider.fail_with_status = Some(500);
        let provider = Arc::new(provider);
        let converter = Converter::new(provider.clone(), pair(), None);

        let outcome = converter.submit("42").await;
        assert!(outcome.is_failure());

        let session = converter.snapshot().await;
        assert_eq!(session.input(), Some("42"));
        assert!(session.converted_amount().is_none());
        assert!(session.last_error().unwrap().contains("500"));

        let retried = converter.retry().await.expect("input should be preserved");
        assert!(retried.is_failure());
        assert_eq!(provider.call_count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_uses_default_amount() {
        let converter = Converter::new(
            Arc::new(MockProvider::new(2.0)),
            pair(),
            Some(Amount::new(5.0).unwrap()),
        );
        let outcome = converter.retry().await.unwrap();
        assert_eq!(outcome.conversion().map(|c| c.result), Some(10.0));

        let converter = Converter::new(Arc::new(MockProvider::new(2.0)), pair(), None);
        assert!(converter.retry().await.is_none());
    }

    #[tokio::test]
    async fn test_late_failure_of_older_request_is_superseded() {
        let mut provider = MockProvider::new(60.0);
        provider.delays_ms.insert(10, 200);
        provider.fail_amounts.push(10);
        let converter = Converter::new(Arc::new(provider), pair(), None);

        let first = converter.submit("10");
        let second = async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            converter.submit("20").await
        };
        let (first, second) = tokio::join!(first, second);

        assert!(matches!(
            first,
            Outcome::SupersededFailure(ConversionError::Api { status: 500, .. })
        ));
        assert!(!first.is_failure());
        assert!(first.conversion().is_none());
        assert!(matches!(second, Outcome::Displayed(_)));

        let session = converter.snapshot().await;
        assert_eq!(session.converted_amount(), Some(1200.0));
        assert!(session.last_error().is_none());
    }

    #[tokio::test]
    async fn test_latest_request_wins_over_late_response() {
        let mut provider = MockProvider::new(60.0);
        provider.delays_ms.insert(10, 200);
        let converter = Converter::new(Arc::new(provider), pair(), None);

        let first = converter.submit("10");
        let second = async {
            // Let the first request take its token before this one
            tokio::time::sleep(Duration::from_millis(20)).await;
            converter.submit("20").await
        };
        let (first, second) = tokio::join!(first, second);

        assert!(matches!(second, Outcome::Displayed(_)));
        assert!(matches!(first, Outcome::Superseded(_)));

        let session = converter.snapshot().await;
        assert_eq!(session.state(), DisplayState::Displayed);
        assert_eq!(session.converted_amount(), Some(1200.0));
    }
}
