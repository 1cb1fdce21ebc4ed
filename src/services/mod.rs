pub mod error;
pub mod hashing;
pub mod jwt;
pub mod rate_limit;
pub mod response;
pub mod validation;
