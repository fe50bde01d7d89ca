//! Process lifecycle: startup wiring lives in `main.rs`, shutdown
//! coordination here.

pub mod shutdown;

pub use shutdown::Shutdown;
