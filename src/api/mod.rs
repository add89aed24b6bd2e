pub mod serper;
pub mod xai;
