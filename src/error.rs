use thiserror::Error;

/// Boxed error returned by constraint validators and value extractors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum ValidatorError {
    #[error("No value extractor found for type parameter '{type_parameter}' of type {container}")]
    NoValueExtractorFound {
        container: String,
        type_parameter: String,
    },

    #[error(
        "Unable to determine value extractor for runtime type {runtime_type}: ambiguous candidates [{candidates}]"
    )]
    AmbiguousValueExtractor {
        runtime_type: String,
        candidates: String,
    },

    #[error("Invalid group conversion on {context}: {message}")]
    InvalidGroupConversion { context: String, message: String },

    #[error("Invalid type declaration: {message}")]
    InvalidTypeDeclaration { message: String },

    #[error("Unable to parse type '{input}': {message}")]
    TypeParse { input: String, message: String },

    #[error("Unexpected exception during validation of {constraint} at '{path}'")]
    UnexpectedValidation {
        constraint: String,
        path: String,
        #[source]
        source: BoxError,
    },

    #[error("Maximum cascade depth {depth} exceeded at '{path}'")]
    CascadeDepthExceeded { depth: usize, path: String },

    #[error("Type {bean_type} declares no property '{property}'")]
    UnknownProperty { bean_type: String, property: String },

    #[error("Object {id} is not part of the validated graph")]
    UnknownObject { id: usize },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ValidatorError {
    pub fn no_value_extractor_found(
        container: impl Into<String>,
        type_parameter: impl Into<String>,
    ) -> Self {
        Self::NoValueExtractorFound {
            container: container.into(),
            type_parameter: type_parameter.into(),
        }
    }

    pub fn ambiguous_value_extractor(
        runtime_type: impl Into<String>,
        candidates: impl Into<String>,
    ) -> Self {
        Self::AmbiguousValueExtractor {
            runtime_type: runtime_type.into(),
            candidates: candidates.into(),
        }
    }

    pub fn invalid_group_conversion(
        context: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidGroupConversion {
            context: context.into(),
            message: message.into(),
        }
    }

    pub fn invalid_type_declaration(message: impl Into<String>) -> Self {
        Self::InvalidTypeDeclaration {
            message: message.into(),
        }
    }

    pub fn type_parse(input: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TypeParse {
            input: input.into(),
            message: message.into(),
        }
    }

    pub fn unexpected_validation(
        constraint: impl Into<String>,
        path: impl Into<String>,
        source: BoxError,
    ) -> Self {
        Self::UnexpectedValidation {
            constraint: constraint.into(),
            path: path.into(),
            source,
        }
    }

    pub fn unknown_property(bean_type: impl Into<String>, property: impl Into<String>) -> Self {
        Self::UnknownProperty {
            bean_type: bean_type.into(),
            property: property.into(),
        }
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this error stems from invalid metadata rather than from a
    /// validated instance.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::NoValueExtractorFound { .. }
                | Self::AmbiguousValueExtractor { .. }
                | Self::InvalidGroupConversion { .. }
                | Self::InvalidTypeDeclaration { .. }
                | Self::TypeParse { .. }
                | Self::Config { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ValidatorError>;
