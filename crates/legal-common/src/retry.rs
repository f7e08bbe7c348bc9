/// Opt-in retry decorator for a `ModelGateway`.
///
/// Backends never retry; wrapping one in `Retrying` at construction time is how a caller
/// asks for retries. With `max_retries == 0` the decorator is a pass-through.
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use futures::future::BoxFuture;
use tracing::warn;

use crate::gateway::{GatewayError, ModelGateway, ModelRequest};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_millis(5_000),
        }
    }
}

pub struct Retrying {
    inner: Arc<dyn ModelGateway>,
    policy: RetryPolicy,
}

impl Retrying {
    pub fn new(inner: Arc<dyn ModelGateway>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

impl ModelGateway for Retrying {
    fn model_label(&self) -> &str {
        self.inner.model_label()
    }

    fn invoke<'a>(&'a self, request: &'a ModelRequest) -> BoxFuture<'a, Result<String, GatewayError>> {
        Box::pin(async move {
            let mut attempt: u32 = 0;
            loop {
                attempt += 1;
                match self.inner.invoke(request).await {
                    Ok(text) => return Ok(text),
                    Err(e) => {
                        if attempt > self.policy.max_retries || !should_retry(&e) {
                            return Err(e);
                        }
                        let delay = backoff_delay(
                            self.policy.initial_backoff,
                            self.policy.max_backoff,
                            attempt - 1,
                        );
                        warn!(
                            attempt,
                            delay_ms = delay.as_millis(),
                            error = %e,
                            "model request failed, retrying"
                        );
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        })
    }
}

fn should_retry(err: &GatewayError) -> bool {
    match err {
        GatewayError::Timeout(_) => true,
        GatewayError::Request(e) => e.is_connect() || e.is_request() || e.is_body(),
        GatewayError::Upstream { status, .. } | GatewayError::UpstreamBody { status, .. } => {
            status.as_u16() == 429 || status.is_server_error()
        }
        GatewayError::InvalidJson(_)
        | GatewayError::EmptyCompletion
        | GatewayError::Unconfigured(_) => false,
    }
}

fn backoff_delay(initial: Duration, max: Duration, exponent: u32) -> Duration {
    let mult = 1u128.checked_shl(exponent).unwrap_or(u128::MAX);
    let base_ms = initial.as_millis().saturating_mul(mult);
    let capped_ms = std::cmp::min(base_ms, max.as_millis()) as u64;
    let jitter_cap = std::cmp::max(1, capped_ms / 4);
    let jitter_ms = pseudo_jitter_ms(jitter_cap);
    Duration::from_millis(capped_ms.saturating_add(jitter_ms))
}

fn pseudo_jitter_ms(max_inclusive: u64) -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0));
    let nanos = now.subsec_nanos() as u64;
    nanos % (max_inclusive + 1)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    struct Flaky {
        failures_left: AtomicU32,
        calls: AtomicU32,
        error: fn() -> GatewayError,
    }

    impl ModelGateway for Flaky {
        fn model_label(&self) -> &str {
            "flaky"
        }

        fn invoke<'a>(&'a self, _request: &'a ModelRequest) -> BoxFuture<'a, Result<String, GatewayError>> {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                if self.failures_left.load(Ordering::SeqCst) > 0 {
                    self.failures_left.fetch_sub(1, Ordering::SeqCst);
                    return Err((self.error)());
                }
                Ok("ok".to_string())
            })
        }
    }

    fn request() -> ModelRequest {
        ModelRequest {
            prompt: "p".to_string(),
            max_tokens: 10,
            temperature: 0.1,
        }
    }

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(2),
        }
    }

    #[tokio::test]
    async fn retries_timeouts_until_success() {
        let inner = Arc::new(Flaky {
            failures_left: AtomicU32::new(2),
            calls: AtomicU32::new(0),
            error: || GatewayError::Timeout(Duration::from_secs(30)),
        });
        let gateway = Retrying::new(inner.clone(), fast_policy(3));
        assert_eq!(gateway.invoke(&request()).await.unwrap(), "ok");
        assert_eq!(inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn zero_retries_is_pass_through() {
        let inner = Arc::new(Flaky {
            failures_left: AtomicU32::new(1),
            calls: AtomicU32::new(0),
            error: || GatewayError::Timeout(Duration::from_secs(30)),
        });
        let gateway = Retrying::new(inner.clone(), fast_policy(0));
        assert!(gateway.invoke(&request()).await.is_err());
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_completion_is_not_retried() {
        let inner = Arc::new(Flaky {
            failures_left: AtomicU32::new(1),
            calls: AtomicU32::new(0),
            error: || GatewayError::EmptyCompletion,
        });
        let gateway = Retrying::new(inner.clone(), fast_policy(5));
        assert!(matches!(
            gateway.invoke(&request()).await,
            Err(GatewayError::EmptyCompletion)
        ));
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn backoff_is_capped() {
        let delay = backoff_delay(Duration::from_millis(200), Duration::from_millis(5_000), 10);
        assert!(delay >= Duration::from_millis(5_000));
        assert!(delay <= Duration::from_millis(6_250));
    }
}
