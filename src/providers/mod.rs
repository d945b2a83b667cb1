//! Upstream extraction providers and the ordered provider registry.

pub mod facebook;
pub mod generic;
pub mod instagram;
pub mod tiktok;

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::api::{HttpClient, HttpResponse};
use crate::config::{Config, DownloadMode};
use crate::error::{Error, Result};
use crate::media::{build_media, DownloadRequest, MediaMeta, Platform, Resolved, StreamSet};
use crate::resolve::Diagnostics;

pub use facebook::FacebookProvider;
pub use generic::{CobaltProvider, OceanSaverProvider};
pub use instagram::{InstagramProvider, MedsossProvider};
pub use tiktok::{DouyinProvider, LoveTikProvider, TikFailProvider, TikWmProvider};

/// Names of every built-in provider, in default chain order.
pub const PROVIDER_NAMES: &[&str] = &[
    tiktok::TIKWM,
    tiktok::TIKFAIL,
    tiktok::DOUYIN,
    tiktok::LOVETIK,
    instagram::INSTAGRAM,
    instagram::MEDSOSS,
    facebook::FACEBOOK,
    generic::OCEANSAVER,
    generic::COBALT,
];

/// Result of one provider invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderOutcome {
    /// The provider does not handle this platform. Not an error.
    NotApplicable,
    /// The provider tried and could not resolve the link.
    Failed { reason: String },
    Success(Resolved),
}

/// One upstream extraction strategy.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Name of the provider (for logging and toggles).
    fn name(&self) -> &'static str;

    /// Whether this provider handles `platform`.
    fn supports(&self, platform: Platform) -> bool;

    /// Generic providers run after every platform-specific one.
    fn is_generic(&self) -> bool {
        false
    }

    /// Perform the upstream calls and normalize the answer.
    async fn fetch(
        &self,
        request: &DownloadRequest,
        platform: Platform,
        diagnostics: &mut Diagnostics,
    ) -> Result<Resolved>;

    /// Applicability check plus `fetch`, with every error folded into the outcome.
    async fn resolve(
        &self,
        request: &DownloadRequest,
        platform: Platform,
        diagnostics: &mut Diagnostics,
    ) -> ProviderOutcome {
        if !self.supports(platform) {
            return ProviderOutcome::NotApplicable;
        }

        match self.fetch(request, platform, diagnostics).await {
            Ok(resolved) => ProviderOutcome::Success(resolved),
            Err(e) => {
                let mut reason = e.to_string();
                if reason.trim().is_empty() {
                    reason = format!("{} could not process this link", self.name());
                }
                diagnostics.record(self.name(), format!("failed: {}", reason));
                ProviderOutcome::Failed { reason }
            }
        }
    }
}

/// Ordered list of providers.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn Provider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a provider.
    pub fn register(&mut self, provider: Arc<dyn Provider>) {
        self.providers.push(provider);
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, provider: Arc<dyn Provider>) -> Self {
        self.register(provider);
        self
    }

    /// The built-in chain, minus the providers disabled in `config`.
    pub fn default_chain(http: Arc<dyn HttpClient>, config: &Config) -> Self {
        let settings = &config.providers;

        let all: Vec<Arc<dyn Provider>> = vec![
            Arc::new(TikWmProvider::new(http.clone())),
            Arc::new(TikFailProvider::new(http.clone())),
            Arc::new(DouyinProvider::new(http.clone())),
            Arc::new(LoveTikProvider::new(http.clone())),
            Arc::new(InstagramProvider::new(http.clone())),
            Arc::new(MedsossProvider::new(http.clone())),
            Arc::new(FacebookProvider::new(http.clone())),
            Arc::new(OceanSaverProvider::new(
                http.clone(),
                settings.oceansaver_api_key.clone(),
            )),
            Arc::new(CobaltProvider::new(
                http,
                settings.cobalt_instances.clone(),
                settings.cobalt_user_agent.clone(),
            )),
        ];

        let providers = all
            .into_iter()
            .filter(|provider| {
                let disabled = settings
                    .disabled
                    .iter()
                    .any(|name| name.eq_ignore_ascii_case(provider.name()));
                if disabled {
                    tracing::debug!("Provider {} disabled by configuration", provider.name());
                }
                !disabled
            })
            .collect();

        Self { providers }
    }

    /// Providers to try for `platform`: specific ones first, then generic ones.
    ///
    /// Unknown platforms get no candidates at all.
    pub fn candidates(&self, platform: Platform) -> Vec<Arc<dyn Provider>> {
        if !platform.is_known() {
            return Vec::new();
        }

        let (generic, specific): (Vec<_>, Vec<_>) =
            self.providers.iter().cloned().partition(|p| p.is_generic());

        specific.into_iter().chain(generic).collect()
    }

    /// Provider names in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

/// Parse an upstream JSON body, noting the raw snippet when it is not JSON.
pub(crate) fn parse_json<T: DeserializeOwned>(
    upstream: &'static str,
    response: &HttpResponse,
    diagnostics: &mut Diagnostics,
) -> Result<T> {
    response.json().map_err(|_| {
        diagnostics.record(
            upstream,
            format!("unreadable response (HTTP {}): {}", response.status, response.snippet()),
        );
        Error::Upstream(format!(
            "{} returned an unreadable response (HTTP {})",
            upstream, response.status
        ))
    })
}

/// Require HTTP 200 from a scrape target.
pub(crate) fn require_ok(upstream: &'static str, response: &HttpResponse) -> Result<()> {
    if response.status == 200 {
        Ok(())
    } else {
        Err(Error::UpstreamStatus {
            upstream,
            status: response.status,
        })
    }
}

/// Media from scraped URLs: the first is HD, the second (or the first again) SD.
pub(crate) fn scraped_media(urls: &[String], title: &str, mode: DownloadMode) -> Result<Resolved> {
    let hd = urls.first().cloned();
    let sd = urls.get(1).cloned().or_else(|| hd.clone());

    build_media(
        StreamSet::from_video(hd, sd),
        MediaMeta::new("video_download.mp4", title),
        mode,
    )
    .map(Resolved::Media)
}
