//! Infrastructure shared by the server binary and the web layer:
//! command line/environment configuration and logger setup.

pub mod config;
pub mod logging;
