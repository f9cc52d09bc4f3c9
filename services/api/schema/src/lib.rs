pub mod user_tokens;
pub mod users;
pub mod wishes;
