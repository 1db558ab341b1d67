pub mod bridge;
pub mod confidence;
pub mod entropy;
pub mod executor;
pub mod gateway;
pub mod profiles;
pub mod simulator;
pub mod symbols;
