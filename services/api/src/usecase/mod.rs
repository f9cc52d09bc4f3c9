pub mod social;
pub mod token;
pub mod user;
pub mod wish;
