pub mod blog;
pub mod shared;
pub mod user;
