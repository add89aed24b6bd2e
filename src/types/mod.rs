pub mod profile;
pub mod search;
pub mod thread;
pub mod tweet;
