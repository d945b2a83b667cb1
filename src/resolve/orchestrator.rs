//! Provider fallback chain.

use std::sync::Arc;

use crate::api::{HttpClient, ReqwestClient};
use crate::config::Config;
use crate::error::Result;
use crate::media::{classify, DownloadRequest, Platform, ResolutionResult};
use crate::providers::{ProviderOutcome, ProviderRegistry};
use crate::resolve::Diagnostics;

const UNSUPPORTED_MESSAGE: &str = "Unsupported link: no provider handles this platform.";

/// Resolves a link by trying each candidate provider in order.
pub struct Resolver {
    registry: ProviderRegistry,
}

impl Resolver {
    pub fn new(registry: ProviderRegistry) -> Self {
        Self { registry }
    }

    /// Production resolver: reqwest transport and the built-in provider chain.
    pub fn from_config(config: &Config) -> Result<Self> {
        let http: Arc<dyn HttpClient> = Arc::new(ReqwestClient::new(&config.http)?);
        Ok(Self::new(ProviderRegistry::default_chain(http, config)))
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Resolve `request`, discarding diagnostics.
    pub async fn resolve_url(&self, request: &DownloadRequest) -> ResolutionResult {
        let mut diagnostics = Diagnostics::new();
        self.resolve_with_diagnostics(request, &mut diagnostics).await
    }

    /// Resolve `request`, recording per-provider notes into `diagnostics`.
    ///
    /// Never fails: every problem ends up in the returned `Failure`.
    pub async fn resolve_with_diagnostics(
        &self,
        request: &DownloadRequest,
        diagnostics: &mut Diagnostics,
    ) -> ResolutionResult {
        let platform = classify(request.source_url());
        tracing::info!("Resolving {} link: {}", platform, request.source_url());

        if platform == Platform::Unknown {
            diagnostics.record("resolver", "unrecognized platform");
            return ResolutionResult::Failure {
                message: UNSUPPORTED_MESSAGE.to_string(),
            };
        }

        let mut last_error: Option<String> = None;

        for provider in self.registry.candidates(platform) {
            tracing::info!("Trying provider {}", provider.name());

            match provider.resolve(request, platform, diagnostics).await {
                ProviderOutcome::Success(resolved) => {
                    tracing::info!("Provider {} succeeded", provider.name());
                    return resolved.into();
                }
                ProviderOutcome::Failed { reason } => {
                    tracing::warn!("Provider {} failed: {}", provider.name(), reason);
                    last_error = Some(reason);
                }
                ProviderOutcome::NotApplicable => {}
            }
        }

        let message = match last_error {
            Some(last) => format!(
                "Unable to process this link right now ({}). Please try again later.",
                last
            ),
            None => "Unable to process this link right now. Please try again later.".to_string(),
        };

        ResolutionResult::Failure { message }
    }
}
