pub mod client;
pub mod envelope;

// Endpoint groups
pub mod depreciation;
pub mod dimension;
pub mod equipment;
pub mod investment;
