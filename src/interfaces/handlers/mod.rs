pub mod articles;
pub mod json_error;
pub mod users;
