//! Filter-tree normalization applied before compilation.
//!
//! Canonicalizes enumerated type codes and expands bare calendar dates so
//! the compiler only ever sees values the backend accepts.

pub mod normalizers;

pub use normalizers::*;
