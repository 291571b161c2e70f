pub mod depreciation;
pub mod dimension;
pub mod equipment;
pub mod investment;
pub mod lenient;
pub mod pagination;
pub mod settings;
