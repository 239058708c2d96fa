mod classify;
mod crop;
mod fertilizer;
mod price;
mod soil;
pub mod util;
mod weather_code;

pub use classify::Classify;
pub use crop::Crop;
pub use fertilizer::Fertilizer;
pub use price::Price;
pub use soil::Soil;
pub use weather_code::WeatherCode;
