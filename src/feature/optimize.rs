use super::Feature;
use crate::prompt;
use crate::schema::{FieldType, Shape};
use crate::wire::{FeatureKind, OptimizeYieldRequest, OptimizeYieldResponse};

pub struct OptimizeYield;

impl Feature for OptimizeYield {
    type Request = OptimizeYieldRequest;
    type Response = OptimizeYieldResponse;

    const KIND: FeatureKind = FeatureKind::Optimization;

    fn input_shape() -> Shape {
        Shape::new()
            .required("cropType", FieldType::non_empty("Crop type is required."))
            .required("temperature", FieldType::range(-50.0, 100.0, "Invalid temperature"))
            .required("humidity", FieldType::range(0.0, 100.0, "Invalid humidity"))
            .required("lightLevel", FieldType::at_least(0.0, "Invalid light level"))
    }

    fn output_shape() -> Shape {
        Shape::new()
            .required("temperatureAdjustment", FieldType::text())
            .required("humidityAdjustment", FieldType::text())
            .required("lightLevelAdjustment", FieldType::text())
            .required("summary", FieldType::text())
    }

    fn render(req: &Self::Request) -> String {
        prompt::optimize_yield(req)
    }
}
