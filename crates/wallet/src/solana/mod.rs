pub mod amount;
pub mod connection;
pub mod mint;
pub mod pending;
pub mod processor;
pub mod rent;
pub mod seed;
pub mod transaction;
