//! Hardware initialisation and the platform halves of the dimmer.

pub mod gate;
#[cfg(target_os = "espidf")]
pub mod gptimer;
pub mod hw_init;
pub mod hw_timer;
