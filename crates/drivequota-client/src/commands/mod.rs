//! Command implementations.
//!
//! Each command returns its rendered output; printing and exit codes are
//! left to `main`.

pub mod accounts;
pub mod check;
pub mod config;
pub mod quota;
