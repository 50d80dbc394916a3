//! Evaluators turn fetched source text into a registration.
//!
//! An evaluator is the loader's single evaluation primitive. Given the
//! source of one module it must call [`System::register`] exactly once; the
//! loader has already pointed its context at the module's path, so the
//! registration is attributed correctly even while other modules are
//! half-way through theirs.

use std::rc::Rc;

use crate::runner::ds::error::LoaderError;
use crate::runner::loader::system::System;

pub trait Evaluator {
    /// Evaluate `source`, the text fetched for canonical `path`.
    ///
    /// Errors raised by the module itself should be
    /// [`LoaderError::Thrown`]; the loader tags them with the path.
    fn evaluate(&self, path: &str, source: &str, system: &System) -> Result<(), LoaderError>;

    /// Human-readable name for this evaluator (for debugging/logging).
    fn name(&self) -> &str;
}

impl<T: Evaluator + ?Sized> Evaluator for Rc<T> {
    fn evaluate(&self, path: &str, source: &str, system: &System) -> Result<(), LoaderError> {
        (**self).evaluate(path, source, system)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
