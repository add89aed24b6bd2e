pub mod auth;
pub mod client_id;
pub mod rate_limit;
