use crate::wire::{
    AlertsRequest, ClimateRequest, CropRequest, FertilizerRequest, IdealConditionsRequest,
    OptimizeYieldRequest,
};

fn json_only() -> &'static str {
    "Return only the structured JSON data. Output exactly one JSON object; no markdown or code fences."
}

pub fn optimize_yield(req: &OptimizeYieldRequest) -> String {
    format!(
r#"You are an expert agricultural consultant specializing in urban vertical farming.

You are advising a farmer on how to optimize their crop yield.

Based on the following sensor data, recommend adjustments to the temperature, humidity, and light levels to optimize the yield for the specified crop.

Crop Type: {crop}
Current Temperature: {temp}°C
Current Humidity: {hum}%
Current Light Level: {light} Lux

Consider the following:
* Optimal growing conditions for the crop type.
* Potential issues based on current conditions.
* Actions to take to correct these issues.

Fill 'temperatureAdjustment', 'humidityAdjustment' and 'lightLevelAdjustment' with the recommended change, and 'summary' with a short reason for the recommendation.

{tail}"#,
        crop = req.crop_type,
        temp = req.temperature,
        hum = req.humidity,
        light = req.light_level,
        tail = json_only(),
    )
}

/// Which crop-recommendation template variant to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CropPromptMode<'a> {
    Discover { exclude: Vec<&'a str> },
    Force(&'a str),
}

impl<'a> CropPromptMode<'a> {
    pub fn select(req: &'a CropRequest) -> Self {
        match req.forced_crop() {
            Some(name) => CropPromptMode::Force(name),
            None => CropPromptMode::Discover {
                exclude: req
                    .exclude_crops
                    .iter()
                    .flatten()
                    .map(String::as_str)
                    .filter(|s| !s.trim().is_empty())
                    .collect(),
            },
        }
    }
}

pub fn recommend_crop(req: &CropRequest) -> String {
    let goal = match CropPromptMode::select(req) {
        CropPromptMode::Force(name) => format!(
r#"Your goal is to provide a detailed justification for growing '{name}' in the specified location, along with the most suitable vertical farming method.
For the output, set 'cropName' to '{name}'.
Provide a new 'reason' and 'predictedFarmType' based on the analysis for '{name}'."#
        ),
        CropPromptMode::Discover { exclude } => {
            let mut goal = String::from(
"Your goal is to provide unique and profitable crop recommendations tailored to a specific location. Avoid common choices like spinach or lettuce unless they are exceptionally well-suited for the given location.\n",
            );
            if !exclude.is_empty() {
                goal.push_str(&format!(
                    "\nPlease do not recommend any of the following crops: {}. Find a suitable alternative.\n",
                    exclude.join(", ")
                ));
            }
            goal.push_str(
"\nBased on the location provided, recommend a single, highly suitable crop to grow and the most appropriate vertical farming method (e.g., Hydroponics, Aeroponics, Aquaponics).",
            );
            goal
        }
    };

    format!(
r#"You are an agricultural expert and creative consultant for vertical farming startups in India.

{goal}

Your recommendation must be based on a detailed analysis of:
1.  **Local Climate**: The general climate of the region.
2.  **Market Demand**: What crops have high local market value or are popular in local cuisine?
3.  **Resource Availability**: Consider factors like water and electricity that might favor one farming technique over another.
4.  **Profitability**: Suggest a crop that could be profitable for a small-scale urban farm.

Location: {city}, {state}, India

Provide a clear, concise reason for your crop recommendation that explicitly references the factors above.
The output 'predictedFarmType' field should contain the name of the single recommended farming method.

{tail}"#,
        city = req.city,
        state = req.state,
        tail = json_only(),
    )
}

pub fn city_climate(req: &ClimateRequest) -> String {
    format!(
r#"You are a climatologist. For the given city and state in India, provide the typical average annual temperature in Celsius ('averageTemp'), the typical average annual humidity percentage ('averageHumidity'), and a one-sentence description of the climate ('climateDescription').

City: {city}
State: {state}

{tail}"#,
        city = req.city,
        state = req.state,
        tail = json_only(),
    )
}

pub fn generate_alerts(req: &AlertsRequest) -> String {
    format!(
r#"You are a vertical farm monitoring system. Based on the provided farm context, generate a list of 5 to 10 realistic system alerts under the key 'alerts'.

Farm Location: '{city}, {state}'
Primary Crop: '{crop}'
Farm Type: '{farm}'

Instructions:
1.  Generate a unique ID for each alert.
2.  Assign a 'type' from: Temperature, Moisture, Nutrients, Light, Hardware, Power.
3.  Assign a 'severity' ('Critical', 'Warning', 'Info'). Critical alerts are for immediate, system-threatening issues.
4.  Write a clear, concise 'message'.
5.  Provide a realistic 'component' name where the alert originates.
6.  Set a recent, relative 'timestamp' (e.g. "5m ago").
7.  Provide a helpful, actionable 'suggestion' for resolving the alert.
8.  Make most alerts 'Active', but include one or two 'Resolved' alerts for realism.

Example Alerts:
- Temperature: "High temperature detected in Tray 2: 38°C"
- Moisture: "Soil moisture low in Rack 1 – Water pump not triggered."
- Nutrients: "Nutrient tank nearing empty – 10% remaining."
- Light: "LED lights not functioning in Tower 4"
- Hardware: "Humidity sensor failure in Zone B"
- Power: "Backup battery at 20% – Please charge."

{tail}"#,
        city = req.city,
        state = req.state,
        crop = req.crop_name,
        farm = req.farm_type,
        tail = json_only(),
    )
}

pub fn recommend_fertilizer(req: &FertilizerRequest) -> String {
    format!(
r#"You are an expert agricultural scientist specializing in soil health and crop nutrition in India.

Based on the provided environmental and soil data, recommend the most suitable fertilizer.

Context:
- Crop Type: {crop}
- Soil Type: {soil}
- Temperature: {temp}°C
- Humidity: {hum}%
- Soil Moisture: {moist}%
- Nitrogen (N): {n} kg/ha
- Phosphorous (P): {p} kg/ha
- Potassium (K): {k} kg/ha

Your task is to:
1.  Analyze the provided data to determine nutrient deficiencies or imbalances for the specified crop.
2.  Recommend a single, appropriate fertilizer by name in 'fertilizerName' (e.g., "Urea", "DAP", "14-35-14", "28-28-0").
3.  Provide a clear, one-paragraph 'reasoning' for your recommendation, explaining how the fertilizer addresses the specific needs of the crop in the given conditions.

{tail}"#,
        crop = req.crop_type,
        soil = req.soil_type,
        temp = req.temperature,
        hum = req.humidity,
        moist = req.moisture,
        n = req.nitrogen,
        p = req.phosphorous,
        k = req.potassium,
        tail = json_only(),
    )
}

pub fn ideal_conditions(req: &IdealConditionsRequest) -> String {
    format!(
r#"You are an agricultural expert specializing in vertical farming. For the given crop, provide the ideal environmental conditions for growing it indoors.

Crop: {crop}

Provide the optimal temperature range in Celsius ('temperatureRange'), the ideal relative humidity range ('humidityRange'), and information about its light requirements such as daily hours of light or DLI ('lightInfo'). Also provide a short, one-paragraph summary describing the perfect environment for this crop ('description').

{tail}"#,
        crop = req.crop_name,
        tail = json_only(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crop_req(exclude: Option<Vec<&str>>, force: Option<&str>) -> CropRequest {
        CropRequest {
            city: "Pune".into(),
            state: "Maharashtra".into(),
            exclude_crops: exclude.map(|v| v.into_iter().map(String::from).collect()),
            force_crop_name: force.map(String::from),
        }
    }

    #[test]
    fn discover_mode_joins_exclusions() {
        let p = recommend_crop(&crop_req(Some(vec!["Spinach", "Basil"]), None));
        assert!(p.contains("do not recommend any of the following crops: Spinach, Basil."));
        assert!(p.contains("Location: Pune, Maharashtra, India"));
        assert!(!p.contains("set 'cropName'"));
    }

    #[test]
    fn force_mode_ignores_exclusions() {
        let req = crop_req(Some(vec!["Spinach"]), Some("Strawberry"));
        assert_eq!(CropPromptMode::select(&req), CropPromptMode::Force("Strawberry"));
        let p = recommend_crop(&req);
        assert!(p.contains("set 'cropName' to 'Strawberry'"));
        assert!(!p.contains("Spinach"));
    }

    #[test]
    fn empty_force_name_falls_back_to_discovery() {
        let req = crop_req(None, Some(""));
        assert_eq!(
            CropPromptMode::select(&req),
            CropPromptMode::Discover { exclude: vec![] }
        );
        assert!(!recommend_crop(&req).contains("do not recommend"));
    }

    #[test]
    fn numbers_render_as_literal_text() {
        let p = optimize_yield(&OptimizeYieldRequest {
            crop_type: "Lettuce".into(),
            temperature: 22.0,
            humidity: 65.5,
            light_level: 8000.0,
        });
        assert!(p.contains("Current Temperature: 22°C"));
        assert!(p.contains("Current Humidity: 65.5%"));
        assert!(p.contains("Current Light Level: 8000 Lux"));
    }
}
