pub mod traits;

// Transport implementations
pub mod reqwest_transport;
