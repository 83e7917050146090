pub mod cli;
pub mod initializer;
pub mod logging;
pub mod options;
