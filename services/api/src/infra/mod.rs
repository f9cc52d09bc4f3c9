pub mod cache;
pub mod db;
pub mod mail;
pub mod social;
pub mod upload;
