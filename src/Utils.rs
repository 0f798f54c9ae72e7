//! different utility modules used throughout the project
/// tiny module to set up terminal and file logging
pub mod logger;
