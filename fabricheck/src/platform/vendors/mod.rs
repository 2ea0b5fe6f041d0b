//! Vendor platform definitions.

pub mod arista;
