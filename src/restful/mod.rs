pub mod models;
pub mod position;
pub mod sign;
