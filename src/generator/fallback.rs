//! Primary-then-fallback generator composition.

use crate::error::GenerationError;
use crate::generator::{GenerationRequest, Generated, RuleBasedGenerator, UpdateGenerator};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_GENERATOR_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Runs `primary` under a timeout; any failure is logged at `warn` and the
/// request is answered by `fallback` instead.
pub struct FallbackGenerator {
    primary: Arc<dyn UpdateGenerator>,
    fallback: Arc<dyn UpdateGenerator>,
    timeout: Duration,
    name: String,
}

impl FallbackGenerator {
    pub fn new(
        primary: Arc<dyn UpdateGenerator>,
        fallback: Arc<dyn UpdateGenerator>,
        timeout: Duration,
    ) -> Self {
        let name = format!("{}|{}", primary.name(), fallback.name());
        Self {
            primary,
            fallback,
            timeout,
            name,
        }
    }

    /// Fall back to the keyword rules.
    pub fn with_rules(primary: Arc<dyn UpdateGenerator>, timeout: Duration) -> Self {
        Self::new(primary, Arc::new(RuleBasedGenerator::new()), timeout)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn run_primary(&self, request: &GenerationRequest) -> Result<Generated, GenerationError> {
        match tokio::time::timeout(self.timeout, self.primary.generate(request)).await {
            Ok(result) => result,
            Err(_) => Err(GenerationError::Timeout(self.timeout.as_millis() as u64)),
        }
    }
}

#[async_trait]
impl UpdateGenerator for FallbackGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<Generated, GenerationError> {
        match self.run_primary(request).await {
            Ok(generated) => Ok(generated),
            Err(err) => {
                warn!(
                    primary = self.primary.name(),
                    fallback = self.fallback.name(),
                    error = %err,
                    "Generator failed, using fallback"
                );
                self.fallback.generate(request).await
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
