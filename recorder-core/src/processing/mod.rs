pub mod normalizer;
pub mod wav;
