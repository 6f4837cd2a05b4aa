use std::fmt;
use std::io::Write;

use tracing::warn;

pub struct AuditLog {
    writer: Option<Box<dyn Write>>,
}

impl AuditLog {
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self {
            writer: Some(writer),
        }
    }

    pub fn disabled() -> Self {
        Self { writer: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }

    pub fn line(&mut self, message: impl fmt::Display) {
        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        let result = writeln!(writer, "{message}").and_then(|_| writer.flush());
        if let Err(err) = result {
            warn!("install.log write failed, audit output disabled: {err}");
            self.writer = None;
        }
    }
}

impl fmt::Debug for AuditLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditLog")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
