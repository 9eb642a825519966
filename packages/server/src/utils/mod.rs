pub mod filename;
pub mod hash;
pub mod jwt;
pub mod rate_limit;
pub mod upload;
