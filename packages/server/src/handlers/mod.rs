pub mod blog;
pub mod fallback;
pub mod login;
pub mod user;
