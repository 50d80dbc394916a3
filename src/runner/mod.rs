pub mod ds;
pub mod eval;
pub mod loader;
