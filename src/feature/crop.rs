use tracing::warn;

use super::Feature;
use crate::prompt;
use crate::schema::{FieldType, Shape};
use crate::wire::{CropRecommendation, CropRequest, FeatureKind};

pub struct RecommendCrop;

impl Feature for RecommendCrop {
    type Request = CropRequest;
    type Response = CropRecommendation;

    const KIND: FeatureKind = FeatureKind::CropRecommendation;
    const INVALID: &'static str = "Invalid location data.";

    fn input_shape() -> Shape {
        Shape::new()
            .required("city", FieldType::text())
            .required("state", FieldType::text())
            .optional("excludeCrops", FieldType::TextList)
            .optional("forceCropName", FieldType::text())
    }

    fn output_shape() -> Shape {
        Shape::new()
            .required("cropName", FieldType::text())
            .required("reason", FieldType::text())
            .required("predictedFarmType", FieldType::text())
    }

    fn render(req: &Self::Request) -> String {
        prompt::recommend_crop(req)
    }

    /// A forced crop always comes back under its requested name.
    fn finish(req: &Self::Request, mut resp: Self::Response) -> Result<Self::Response, String> {
        if let Some(forced) = req.forced_crop() {
            if resp.crop_name != forced {
                warn!(generated = %resp.crop_name, forced, "model renamed forced crop; pinning");
                resp.crop_name = forced.to_string();
            }
        }
        Ok(resp)
    }
}
