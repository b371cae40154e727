/// Error categories surfaced by the pipeline and its adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input rows: empty dataset, missing columns/dates, unparseable or non-finite values.
    InputValidation,
    /// Too few points survived filtering to fit the selected trend model.
    DataInsufficiency,
    /// Inconsistent run configuration.
    Config,
    /// File system failures in the ingest/export adapters.
    Io,
    /// Least-squares solve failed or a model produced non-finite output.
    Numeric,
}

impl ErrorKind {
    /// Process exit code used by the binary.
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::InputValidation | ErrorKind::Config | ErrorKind::Io => 2,
            ErrorKind::DataInsufficiency => 3,
            ErrorKind::Numeric => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InputValidation, message)
    }

    pub fn insufficient(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DataInsufficiency, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    pub fn numeric(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Numeric, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
