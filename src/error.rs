use std::fmt;

#[derive(Debug)]
pub enum AppearanceError {
    InvalidConfiguration(String),
    Io(std::io::Error),
}

impl fmt::Display for AppearanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppearanceError::InvalidConfiguration(message) => {
                write!(f, "invalid configuration: {}", message)
            }
            AppearanceError::Io(err) => write!(f, "io error: {}", err),
        }
    }
}

impl std::error::Error for AppearanceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppearanceError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for AppearanceError {
    fn from(value: std::io::Error) -> Self {
        AppearanceError::Io(value)
    }
}
