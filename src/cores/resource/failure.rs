use std::fmt;

use crate::errors::RetdecError;

/// What to do when a job (or one of its outputs) ends in failure.
#[derive(Default)]
pub enum OnFailure {
    /// Return the error specific to the job kind or output.
    #[default]
    Raise,
    /// Swallow the failure.
    Ignore,
    /// Report the message and carry on.
    Call(Box<dyn FnMut(&str)>),
    /// Build the error to return from the message.
    RaiseWith(Box<dyn FnOnce(String) -> RetdecError>),
}

impl OnFailure {
    pub fn call(f: impl FnMut(&str) + 'static) -> Self {
        OnFailure::Call(Box::new(f))
    }

    pub fn raise_with(f: impl FnOnce(String) -> RetdecError + 'static) -> Self {
        OnFailure::RaiseWith(Box::new(f))
    }

    /// Applies the policy to `message`. `default_error` builds the error used
    /// by [`OnFailure::Raise`].
    pub fn handle(
        self,
        message: String,
        default_error: impl FnOnce(String) -> RetdecError,
    ) -> Result<(), RetdecError> {
        match self {
            OnFailure::Raise => Err(default_error(message)),
            OnFailure::Ignore => Ok(()),
            OnFailure::Call(mut f) => {
                f(&message);
                Ok(())
            }
            OnFailure::RaiseWith(f) => Err(f(message)),
        }
    }
}

impl fmt::Debug for OnFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OnFailure::Raise => "Raise",
            OnFailure::Ignore => "Ignore",
            OnFailure::Call(_) => "Call",
            OnFailure::RaiseWith(_) => "RaiseWith",
        };
        f.write_str(name)
    }
}
