//! BoxAdvisorResponder -- object-safe dynamic dispatch wrapper for AdvisorResponder.
//!
//! 1. Define an object-safe `AdvisorResponderDyn` trait with boxed futures
//! 2. Blanket-impl `AdvisorResponderDyn` for all `T: AdvisorResponder`
//! 3. `BoxAdvisorResponder` wraps `Box<dyn AdvisorResponderDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use counsel_types::advisor::Advisor;
use counsel_types::error::GenerationError;
use counsel_types::memory::MemoryWindow;

use super::AdvisorResponder;

/// Object-safe version of [`AdvisorResponder`] with boxed futures.
pub trait AdvisorResponderDyn: Send + Sync {
    fn name(&self) -> &str;

    fn respond_boxed<'a>(
        &'a self,
        advisor: &'a Advisor,
        user_text: &'a str,
        memory: &'a MemoryWindow,
    ) -> Pin<Box<dyn Future<Output = Result<String, GenerationError>> + Send + 'a>>;
}

impl<T: AdvisorResponder> AdvisorResponderDyn for T {
    fn name(&self) -> &str {
        AdvisorResponder::name(self)
    }

    fn respond_boxed<'a>(
        &'a self,
        advisor: &'a Advisor,
        user_text: &'a str,
        memory: &'a MemoryWindow,
    ) -> Pin<Box<dyn Future<Output = Result<String, GenerationError>> + Send + 'a>> {
        Box::pin(self.respond(advisor, user_text, memory))
    }
}

/// Type-erased responder for runtime backend selection.
///
/// Since `AdvisorResponder` uses RPITIT it cannot be a trait object
/// directly; this wrapper exposes the same methods over `dyn`.
pub struct BoxAdvisorResponder {
    inner: Box<dyn AdvisorResponderDyn + Send + Sync>,
}

impl BoxAdvisorResponder {
    pub fn new<T: AdvisorResponder + 'static>(responder: T) -> Self {
        Self {
            inner: Box::new(responder),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub async fn respond(
        &self,
        advisor: &Advisor,
        user_text: &str,
        memory: &MemoryWindow,
    ) -> Result<String, GenerationError> {
        self.inner.respond_boxed(advisor, user_text, memory).await
    }
}

impl std::fmt::Debug for BoxAdvisorResponder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxAdvisorResponder")
            .field("name", &self.name())
            .finish()
    }
}
