use tracing::debug;

use crate::errors::ServiceError;
use crate::feature::Feature;
use crate::log::Transcript;
use crate::provider::DynBackend;
use crate::schema;

/// Renders a feature prompt, calls the backend once and returns a response
/// that conforms to the feature's output shape.
#[derive(Clone)]
pub struct Invoker {
    backend: DynBackend,
    transcript: Option<Transcript>,
}

impl Invoker {
    pub fn new(backend: DynBackend) -> Self {
        Self { backend, transcript: None }
    }

    pub fn with_transcript(mut self, transcript: Transcript) -> Self {
        self.transcript = Some(transcript);
        self
    }

    /// `req` must already have passed input validation.
    pub async fn invoke<F: Feature>(&self, req: &F::Request) -> Result<F::Response, ServiceError> {
        let prompt = F::render(req);
        let shape = F::output_shape();
        debug!(feature = F::KIND.storage_key(), prompt_len = prompt.len(), "invoking backend");

        let raw = self.backend.generate(&prompt, &shape.json_schema()).await;
        if let Some(t) = &self.transcript {
            t.record(F::KIND, &prompt, &raw);
        }

        let checked = schema::check(&raw?, &shape)
            .map_err(|e| ServiceError::MalformedOutput(e.to_string()))?;
        let resp: F::Response = serde_json::from_value(checked)
            .map_err(|e| ServiceError::MalformedOutput(e.to_string()))?;
        F::finish(req, resp).map_err(ServiceError::MalformedOutput)
    }
}
