//! Highlight Export Core Library
//!
//! Synchronizes highlights into a directory of markdown notes, once per
//! highlight, without disturbing what the user wrote in between.

pub mod codec;
pub mod config;
pub mod error;
pub mod export;
pub mod group;
pub mod hash;
pub mod logging;
pub mod note;
pub mod source;
pub mod store;
