pub mod admin;
pub mod application;
pub mod blog_post;
pub mod profile;
