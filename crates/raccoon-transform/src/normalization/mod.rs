//! Normalization of demographic fields.
//!
//! Both the submission and the reference table go through the same
//! normalizers so that cleaned values compare directly.

pub mod date;
pub mod name;
