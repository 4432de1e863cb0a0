//! Command implementations

pub mod init;
pub mod lookup;
pub mod submit;
pub mod validate;
