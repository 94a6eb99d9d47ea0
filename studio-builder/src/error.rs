use thiserror::Error;

pub type BuilderResult<T> = Result<T, BuilderError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuilderError {
    // --- structural rejections (tree left untouched) ---

    #[error("Unknown element kind '{kind}': not present in the catalog")]
    UnknownKind { kind: String },

    #[error("Element '{id}' not found")]
    NotFound { id: String },

    #[error("Invalid drop target '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },

    #[error("Cannot place '{id}' there: nesting deeper than {max_depth} container level(s) is not supported")]
    NestingNotSupported { id: String, max_depth: usize },

    #[error("Invalid style property '{property}': {reason}")]
    InvalidStyle { property: String, reason: String },

    #[error("Invalid list id '{value}': expected 'catalog', 'root' or 'container:<id>'")]
    InvalidListId { value: String },

    // --- recovery ---

    #[error("Could not extract '{field}' from document markup")]
    ExtractionMiss { field: String },

    #[error("Document is {size} bytes; documents over {limit} bytes are not scanned")]
    DocumentTooLarge { size: usize, limit: usize },

    // --- validation ---

    #[error("Duplicate id '{id}': element and section ids must be unique within the document")]
    DuplicateId { id: String },

    #[error("Element '{id}' of kind '{kind}' cannot have children")]
    ChildrenOnLeaf { id: String, kind: String },

    #[error("Element '{id}' is nested {depth} container level(s) deep; maximum is {max_depth}")]
    NestingDepthExceeded {
        id: String,
        depth: usize,
        max_depth: usize,
    },

    #[error("Section '{id}' has order {found} but sits at position {expected}")]
    SectionOrder {
        id: String,
        expected: usize,
        found: usize,
    },

    #[error("Field '{field}' is {day}; expected a day of the month from 1 to 31")]
    DayOutOfRange { field: String, day: u8 },

    #[error("Invalid marker token '{token}': markers must look like {{{{lower_snake_case}}}}")]
    InvalidMarker { token: String },

    // --- ambient ---

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("YAML error: {0}")]
    Yaml(String),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl BuilderError {
    /// Structural rejections leave the tree as it was and are only reported as a gesture that
    /// silently did not take effect.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            BuilderError::UnknownKind { .. }
                | BuilderError::InvalidTarget { .. }
                | BuilderError::NestingNotSupported { .. }
                | BuilderError::NotFound { .. }
        )
    }
}

impl From<serde_yaml::Error> for BuilderError {
    fn from(err: serde_yaml::Error) -> Self {
        BuilderError::Yaml(err.to_string())
    }
}

impl From<serde_json::Error> for BuilderError {
    fn from(err: serde_json::Error) -> Self {
        BuilderError::Json(err.to_string())
    }
}

impl From<std::io::Error> for BuilderError {
    fn from(err: std::io::Error) -> Self {
        BuilderError::Io(err.to_string())
    }
}
