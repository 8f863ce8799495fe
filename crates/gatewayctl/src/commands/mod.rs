pub mod gateway;
pub mod profile;
pub mod utils;
