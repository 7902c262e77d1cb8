use std::fmt::Display;

/// A violated front-end invariant.
///
/// Raised through `INTERNAL_FAULT!`, which records where the fault was
/// detected and unwinds with this value as the panic payload. Callers that
/// want to report it can recover the payload with
/// `std::panic::catch_unwind` and `downcast_ref::<InternalFault>()`.
#[derive(Debug, Clone)]
pub struct InternalFault {
    pub message: String,
    pub context: Vec<(String, String)>,
}

impl InternalFault {
    pub fn new(message: impl Into<String>) -> Self {
        InternalFault {
            message: message.into(),
            context: vec![],
        }
    }

    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.context.push((key.to_string(), value.to_string()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.context
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn raise(self) -> ! {
        tracing::error!(fault = %self, "internal fault");
        std::panic::panic_any(self)
    }
}

impl Display for InternalFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "InternalFault: {}", self.message)?;
        for (key, value) in &self.context {
            write!(f, "\n  {}: {}", key, value)?;
        }
        Ok(())
    }
}
