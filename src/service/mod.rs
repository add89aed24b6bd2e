pub mod improver;
pub mod profile;
pub mod quality;
pub mod research;
pub mod threads;
