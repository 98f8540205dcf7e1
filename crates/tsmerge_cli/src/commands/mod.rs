//! CLI command implementations.

pub mod catalogue;
pub mod inspect;
pub mod select;
