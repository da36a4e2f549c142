use std::fmt;

/// Failure to turn an uploaded file into import rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    /// Required headers absent from the first row. Lists every missing name.
    MissingColumns(Vec<String>),
    /// Extension is neither CSV nor a spreadsheet format.
    UnsupportedFormat(String),
    /// File has no header row at all.
    Empty,
    /// Content could not be decoded (malformed CSV, corrupt workbook).
    Parse(String),
    /// File could not be read.
    Io(String),
}

impl ImportError {
    /// Structural problems with the uploaded file, as opposed to I/O failures.
    pub fn is_format(&self) -> bool {
        !matches!(self, Self::Io(_))
    }
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingColumns(names) => {
                let quoted: Vec<String> = names.iter().map(|n| format!("'{n}'")).collect();
                write!(f, "missing required column(s): {}", quoted.join(", "))
            }
            Self::UnsupportedFormat(ext) if ext.is_empty() => {
                write!(f, "unsupported file type (no extension)")
            }
            Self::UnsupportedFormat(ext) => write!(f, "unsupported file type: .{ext}"),
            Self::Empty => write!(f, "file has no header row"),
            Self::Parse(msg) => write!(f, "could not parse file: {msg}"),
            Self::Io(msg) => write!(f, "could not read file: {msg}"),
        }
    }
}

impl std::error::Error for ImportError {}

impl From<std::io::Error> for ImportError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<::csv::Error> for ImportError {
    fn from(e: ::csv::Error) -> Self {
        if e.is_io_error() {
            Self::Io(e.to_string())
        } else {
            Self::Parse(e.to_string())
        }
    }
}

/// Failure to write an export file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    UnsupportedFormat(String),
    Write(String),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedFormat(ext) => {
                write!(f, "cannot export to .{ext} (expected .csv or .xlsx)")
            }
            Self::Write(msg) => write!(f, "export failed: {msg}"),
        }
    }
}

impl std::error::Error for ExportError {}

impl From<::csv::Error> for ExportError {
    fn from(e: ::csv::Error) -> Self {
        Self::Write(e.to_string())
    }
}

impl From<std::io::Error> for ExportError {
    fn from(e: std::io::Error) -> Self {
        Self::Write(e.to_string())
    }
}
