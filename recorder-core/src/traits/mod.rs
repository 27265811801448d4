pub mod capture_provider;
pub mod observer;
pub mod playback_provider;
