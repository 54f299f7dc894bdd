use super::Feature;
use crate::prompt;
use crate::schema::{FieldType, Shape};
use crate::wire::{CityClimate, ClimateRequest, FeatureKind};

pub struct CityClimateLookup;

impl Feature for CityClimateLookup {
    type Request = ClimateRequest;
    type Response = CityClimate;

    const KIND: FeatureKind = FeatureKind::Climate;
    const INVALID: &'static str = "Invalid location data.";

    fn input_shape() -> Shape {
        Shape::new()
            .required("city", FieldType::text())
            .required("state", FieldType::text())
    }

    fn output_shape() -> Shape {
        Shape::new()
            .required("averageTemp", FieldType::number())
            .required("averageHumidity", FieldType::number())
            .required("climateDescription", FieldType::text())
    }

    fn render(req: &Self::Request) -> String {
        prompt::city_climate(req)
    }
}
