//! Data structures shared by the loader: values, module records, errors.

pub mod error;
pub mod record;
pub mod value;
