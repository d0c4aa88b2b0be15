use garnish::prelude::*;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Forecast {
    pub api_version: &'static str,
    pub temperature: i32,
    pub humidity: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

#[controller(path = "/api")]
pub struct WeatherController;

#[routes]
impl WeatherController {
    #[get("/forecast")]
    pub fn get(&self, #[query("cityName")] city: Option<String>) -> Forecast {
        Forecast {
            api_version: "v1",
            temperature: 20,
            humidity: 80,
            city,
        }
    }
}
