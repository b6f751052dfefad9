pub mod info;
pub mod passes;
pub mod progress;
