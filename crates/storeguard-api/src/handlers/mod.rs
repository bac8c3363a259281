pub mod csrf_token;
pub mod reports;
