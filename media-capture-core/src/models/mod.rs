pub mod capability;
pub mod config;
pub mod error;
pub mod media_file;
pub mod outcome;
pub mod request;
pub mod state;
