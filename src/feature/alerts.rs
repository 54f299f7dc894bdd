use std::collections::HashSet;

use super::Feature;
use crate::prompt;
use crate::schema::{FieldType, Shape};
use crate::wire::{AlertBatch, AlertStatus, AlertType, AlertsRequest, FeatureKind, Severity};

pub const MIN_ALERTS: usize = 5;
pub const MAX_ALERTS: usize = 10;

pub struct GenerateAlerts;

impl Feature for GenerateAlerts {
    type Request = AlertsRequest;
    type Response = AlertBatch;

    const KIND: FeatureKind = FeatureKind::Alerts;
    const INVALID: &'static str = "Invalid input data.";

    fn input_shape() -> Shape {
        Shape::new()
            .required("city", FieldType::text())
            .required("state", FieldType::text())
            .required("cropName", FieldType::text())
            .required("farmType", FieldType::text())
    }

    fn output_shape() -> Shape {
        let alert = Shape::new()
            .required("id", FieldType::non_empty("Alert id is required."))
            .required("severity", FieldType::OneOf(Severity::NAMES))
            .required("type", FieldType::OneOf(AlertType::NAMES))
            .required("component", FieldType::text())
            .required("message", FieldType::text())
            .required("timestamp", FieldType::text())
            .required("status", FieldType::OneOf(AlertStatus::NAMES))
            .required("suggestion", FieldType::text());
        Shape::new().required(
            "alerts",
            FieldType::Records { item: alert, min_items: MIN_ALERTS, max_items: MAX_ALERTS },
        )
    }

    fn render(req: &Self::Request) -> String {
        prompt::generate_alerts(req)
    }

    fn finish(_req: &Self::Request, resp: Self::Response) -> Result<Self::Response, String> {
        let mut seen = HashSet::new();
        for a in &resp.alerts {
            if !seen.insert(a.id.clone()) {
                return Err(format!("duplicate alert id '{}' in batch", a.id));
            }
        }
        Ok(resp)
    }
}
