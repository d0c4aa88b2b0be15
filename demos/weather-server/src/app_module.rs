use crate::cities::{CitiesController, CitiesDb};
use crate::weather::WeatherController;
use garnish::prelude::*;

/// Root application module
#[module(
    controllers = [WeatherController, CitiesController],
    providers = [CitiesDb],
)]
pub struct AppModule;
