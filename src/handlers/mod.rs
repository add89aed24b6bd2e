pub mod brand;
pub mod health;
pub mod profiles;
pub mod threads;
pub mod tweets;
