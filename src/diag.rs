use std::cell::RefCell;

/// Severity of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// One structured diagnostic emitted by the core.
///
/// The core decides severity and message content; delivery is the sink's
/// concern. The optional module and locale fields identify what the message
/// is about.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub module: Option<String>,
    pub locale: Option<String>,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            module: None,
            locale: None,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }
}

/// Delivery target for diagnostics.
///
/// Passed explicitly into every component that reports anything; no
/// component holds its own logger state.
pub trait DiagnosticsSink {
    fn emit(&self, diagnostic: Diagnostic);
}

/// Sink that forwards diagnostics to the `tracing` dispatcher.
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn emit(&self, diagnostic: Diagnostic) {
        let module = diagnostic.module.as_deref().unwrap_or("");
        let locale = diagnostic.locale.as_deref().unwrap_or("");
        match diagnostic.severity {
            Severity::Info => {
                tracing::info!(module, locale, "{}", diagnostic.message);
            }
            Severity::Warning => {
                tracing::warn!(module, locale, "{}", diagnostic.message);
            }
            Severity::Error => {
                tracing::error!(module, locale, "{}", diagnostic.message);
            }
        }
    }
}

/// Sink that buffers diagnostics in memory.
#[derive(Default)]
pub struct MemorySink {
    entries: RefCell<Vec<Diagnostic>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries.borrow().clone()
    }

    pub fn with_severity(&self, severity: Severity) -> Vec<Diagnostic> {
        self.entries
            .borrow()
            .iter()
            .filter(|d| d.severity == severity)
            .cloned()
            .collect()
    }
}

impl DiagnosticsSink for MemorySink {
    fn emit(&self, diagnostic: Diagnostic) {
        self.entries.borrow_mut().push(diagnostic);
    }
}
