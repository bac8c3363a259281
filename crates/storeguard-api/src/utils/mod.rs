pub mod locale;
pub mod multipart;
