use garnish::prelude::*;
use serde::Serialize;

#[derive(Injectable)]
#[injectable(id = "CitiesDB")]
pub struct CitiesDb;

impl CitiesDb {
    pub fn get_cities(&self) -> Vec<String> {
        tracing::info!("CitiesDB - Getting a list of cities");
        vec!["London".into(), "New York".into(), "Dublin".into()]
    }
}

#[derive(Debug, Serialize)]
pub struct CityList {
    pub cities: Vec<String>,
}

#[controller(path = "/api")]
pub struct CitiesController {
    #[inject("CitiesDB")]
    cities_db: Arc<CitiesDb>,
}

#[routes]
impl CitiesController {
    #[get("/cities")]
    pub fn get(&self) -> CityList {
        CityList {
            cities: self.cities_db.get_cities(),
        }
    }
}
