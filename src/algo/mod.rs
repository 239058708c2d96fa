pub mod crop;
pub mod fertilizer;
pub mod matcher;
pub mod parse;
pub mod price;
pub mod soil;
pub mod string_distance;
pub mod table;
pub mod weather;
