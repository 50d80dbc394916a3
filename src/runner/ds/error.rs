use thiserror::Error;

/// Every way a load, registration or execution can fail.
///
/// Errors raised by module code itself start out as [`LoaderError::Thrown`]
/// and are tagged with the module path once they leave the loader
/// (`Evaluation` while registering, `Execute` while running the body).
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("failed to fetch module {path}: {reason}")]
    Fetch { path: String, reason: String },

    #[error("error evaluating module {path}: {message}")]
    Evaluation { path: String, message: String },

    #[error("module {0} did not register itself")]
    MissingRegistration(String),

    #[error("registration outside loader context")]
    NoContext,

    #[error("module {0} is already registered")]
    AlreadyRegistered(String),

    #[error("module {path} declared {dependencies} dependencies but supplied {setters} setters")]
    SetterCount {
        path: String,
        dependencies: usize,
        setters: usize,
    },

    #[error("error executing module {path}: {message}")]
    Execute { path: String, message: String },

    #[error("uncaught error: {0}")]
    Thrown(String),

    #[error("module loader has been dropped")]
    Detached,

    #[error("loader config error: {0}")]
    Config(String),
}

impl LoaderError {
    pub fn thrown(message: impl Into<String>) -> Self {
        LoaderError::Thrown(message.into())
    }

    pub(crate) fn during_evaluation(self, path: &str) -> Self {
        match self {
            LoaderError::Thrown(message) => LoaderError::Evaluation {
                path: path.to_string(),
                message,
            },
            other => other,
        }
    }

    pub(crate) fn during_execution(self, path: &str) -> Self {
        match self {
            LoaderError::Thrown(message) => LoaderError::Execute {
                path: path.to_string(),
                message,
            },
            other => other,
        }
    }
}
