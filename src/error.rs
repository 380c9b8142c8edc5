use thiserror::Error;

/// Something in a map description that could not be understood.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown directive {0:?}")]
    UnknownDirective(String),
    #[error("unknown direction {0:?}")]
    UnknownDirection(String),
    #[error("bad coordinates {0:?}")]
    BadCoordinates(String),
    #[error("bad color {0:?}")]
    BadColor(String),
    #[error("bad platform reference {0:?}")]
    BadPlatformRef(String),
    #[error("unknown station {0:?}")]
    UnknownStation(String),
    #[error("station {station:?} has no platform {platform:?}")]
    UnknownPlatform { station: String, platform: String },
    #[error("unknown line {0:?}")]
    UnknownLine(String),
    #[error("unknown platform side {0:?}")]
    UnknownPlatformSide(String),
    #[error("unknown draw position {0:?}")]
    UnknownDrawPosition(String),
    #[error("{0} must follow a station definition")]
    NoStation(&'static str),
    #[error("missing {0}")]
    Missing(&'static str),
}

/// A [`ParseError`] tied to the 1-based source line it came from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {source}")]
pub struct LoadError {
    pub line: usize,
    #[source]
    pub source: ParseError,
}

impl LoadError {
    pub fn new(line: usize, source: ParseError) -> Self {
        Self { line, source }
    }
}
