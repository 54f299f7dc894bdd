use super::Feature;
use crate::prompt;
use crate::schema::{FieldType, Shape};
use crate::wire::{FeatureKind, IdealConditions, IdealConditionsRequest};

pub struct IdealConditionsLookup;

impl Feature for IdealConditionsLookup {
    type Request = IdealConditionsRequest;
    type Response = IdealConditions;

    const KIND: FeatureKind = FeatureKind::IdealConditions;

    fn input_shape() -> Shape {
        Shape::new().required("cropName", FieldType::non_empty("Crop name is required."))
    }

    fn output_shape() -> Shape {
        Shape::new()
            .required("temperatureRange", FieldType::text())
            .required("humidityRange", FieldType::text())
            .required("lightInfo", FieldType::text())
            .required("description", FieldType::text())
    }

    fn render(req: &Self::Request) -> String {
        prompt::ideal_conditions(req)
    }
}
