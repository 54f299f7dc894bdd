use super::Feature;
use crate::prompt;
use crate::schema::{FieldType, Shape};
use crate::wire::{FeatureKind, FertilizerRecommendation, FertilizerRequest};

pub struct RecommendFertilizer;

impl Feature for RecommendFertilizer {
    type Request = FertilizerRequest;
    type Response = FertilizerRecommendation;

    const KIND: FeatureKind = FeatureKind::Fertilizer;

    fn input_shape() -> Shape {
        Shape::new()
            .required("temperature", FieldType::range(-50.0, 100.0, "Invalid temperature"))
            .required("humidity", FieldType::range(0.0, 100.0, "Invalid humidity"))
            .required("moisture", FieldType::range(0.0, 100.0, "Invalid moisture"))
            .required("soilType", FieldType::non_empty("Please select a soil type"))
            .required("cropType", FieldType::non_empty("Crop type is required"))
            .required("nitrogen", FieldType::at_least(0.0, "Invalid nitrogen"))
            .required("phosphorous", FieldType::at_least(0.0, "Invalid phosphorous"))
            .required("potassium", FieldType::at_least(0.0, "Invalid potassium"))
    }

    fn output_shape() -> Shape {
        Shape::new()
            .required("fertilizerName", FieldType::text())
            .required("reasoning", FieldType::text())
    }

    fn render(req: &Self::Request) -> String {
        prompt::recommend_fertilizer(req)
    }
}
