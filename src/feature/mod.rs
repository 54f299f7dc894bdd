//! Per-feature glue: request/response shapes, prompt selection and
//! post-conditions on generated output.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::schema::Shape;
use crate::wire::FeatureKind;

mod alerts;
mod climate;
mod conditions;
mod crop;
mod fertilizer;
mod optimize;

pub use alerts::GenerateAlerts;
pub use climate::CityClimateLookup;
pub use conditions::IdealConditionsLookup;
pub use crop::RecommendCrop;
pub use fertilizer::RecommendFertilizer;
pub use optimize::OptimizeYield;

pub trait Feature: Send + Sync + 'static {
    type Request: DeserializeOwned + Serialize + Send + Sync;
    type Response: DeserializeOwned + Serialize + Clone + Send + Sync;

    const KIND: FeatureKind;
    /// Caller-facing message for a rejected request.
    const INVALID: &'static str = "Invalid input.";

    fn input_shape() -> Shape;
    fn output_shape() -> Shape;
    fn render(req: &Self::Request) -> String;

    /// Feature-specific checks on a decoded response. An `Err` marks the
    /// output as malformed.
    fn finish(_req: &Self::Request, resp: Self::Response) -> Result<Self::Response, String> {
        Ok(resp)
    }
}
