pub mod balance;
pub mod metadata;
