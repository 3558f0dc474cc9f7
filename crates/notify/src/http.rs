//! The HTTP notification channel.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::header::{CONNECTION, CONTENT_LENGTH};
use reqwest::{Certificate, StatusCode};

use crate::NotifyError;

/// Attempts per URL before giving up on it for this cycle.
pub const MAX_ATTEMPTS: u32 = 10;
/// Fixed delay between attempts.
pub const RETRY_DELAY: Duration = Duration::from_secs(5);
/// Hard per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// POSTs report bodies to the configured URLs, sequentially, with a bounded
/// per-URL retry loop.
///
/// Requests carry an explicit `Content-Length` and are not kept alive. A 404
/// marks the URL as misconfigured and is never retried; every other failure
/// (non-2xx status or network error) burns one attempt and waits out the
/// fixed delay.
pub struct UrlChannel {
    client: reqwest::Client,
    urls: Vec<String>,
    subject: String,
    retry_delay: Duration,
}

impl UrlChannel {
    pub fn new(
        urls: Vec<String>,
        subject: String,
        ca_bundle: Option<&Path>,
    ) -> Result<Self, NotifyError> {
        let mut builder = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            // One connection per request; notification posts are rare and
            // the endpoints are tiny embedded listeners.
            .pool_max_idle_per_host(0);

        if let Some(path) = ca_bundle {
            for certificate in read_pem_bundle(path)? {
                builder = builder.add_root_certificate(certificate);
            }
        }

        Ok(Self {
            client: builder.build()?,
            urls,
            subject,
            retry_delay: RETRY_DELAY,
        })
    }

    /// Override the inter-attempt delay. Mainly useful to keep tests fast.
    pub fn set_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    /// POST `body` to every URL. True only if every URL eventually accepted
    /// the report.
    pub async fn post_all(&self, body: &str) -> bool {
        let payload = format!("Subject: {}\n{body}", self.subject);
        let mut all_ok = true;

        for url in &self.urls {
            if !self.post_with_retry(url, &payload).await {
                all_ok = false;
            }
        }

        all_ok
    }

    async fn post_with_retry(&self, url: &str, payload: &str) -> bool {
        for attempt in 1..=MAX_ATTEMPTS {
            match self.post_once(url, payload).await {
                Disposition::Delivered => return true,
                Disposition::Misconfigured(status) => {
                    tracing::error!(url, %status, "endpoint rejected report as not found, giving up on it");

                    return false;
                }
                Disposition::Retry(reason) => {
                    tracing::warn!(url, attempt, %reason, "report delivery failed");

                    if attempt < MAX_ATTEMPTS {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }

        tracing::error!(url, attempts = MAX_ATTEMPTS, "report delivery exhausted its attempts");

        false
    }

    async fn post_once(&self, url: &str, payload: &str) -> Disposition {
        let response = self
            .client
            .post(url)
            .header(CONTENT_LENGTH, payload.len())
            .header(CONNECTION, "close")
            .body(payload.to_owned())
            .send()
            .await;

        match response {
            Ok(response) => disposition(response.status()),
            Err(err) => Disposition::Retry(err.to_string()),
        }
    }
}

enum Disposition {
    Delivered,
    /// 404: the endpoint does not exist; retrying cannot help.
    Misconfigured(StatusCode),
    Retry(String),
}

fn disposition(status: StatusCode) -> Disposition {
    if status.is_success() {
        return Disposition::Delivered;
    }
    if status == StatusCode::NOT_FOUND {
        return Disposition::Misconfigured(status);
    }

    Disposition::Retry(format!("unexpected status {status}"))
}

fn read_pem_bundle(path: &Path) -> Result<Vec<Certificate>, NotifyError> {
    const BEGIN: &str = "-----BEGIN CERTIFICATE-----";
    const END: &str = "-----END CERTIFICATE-----";

    let text = std::fs::read_to_string(path).map_err(|source| NotifyError::CaBundleRead {
        path: PathBuf::from(path),
        source,
    })?;

    let mut certificates = Vec::new();
    let mut rest = text.as_str();

    while let Some(start) = rest.find(BEGIN) {
        let Some(end) = rest[start..].find(END) else {
            break;
        };
        let block = &rest[start..start + end + END.len()];

        let certificate =
            Certificate::from_pem(block.as_bytes()).map_err(|source| NotifyError::CaBundleInvalid {
                path: PathBuf::from(path),
                source,
            })?;
        certificates.push(certificate);

        rest = &rest[start + end + END.len()..];
    }

    if certificates.is_empty() {
        return Err(NotifyError::CaBundleEmpty {
            path: PathBuf::from(path),
        });
    }

    Ok(certificates)
}
