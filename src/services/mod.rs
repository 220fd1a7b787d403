pub mod availability;
pub mod discovery;
pub mod profile;
pub mod providers;
pub mod recommendations;
pub mod weighting;
