pub mod alerts;
pub mod config;
pub mod dashboard;
pub mod disease;
pub mod profile;
pub mod sensors;
pub mod utility;
pub mod water;
pub mod zones;
