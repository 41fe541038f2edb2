// Utility functions
// Framework-independent helpers shared by stores and components

pub mod data_state;
pub mod time;
pub mod transition;

pub use data_state::DataState;
