use std::{error, fmt};

/// Unified error type
///
/// Most of the rigging core recovers locally (a rejected command is logged and
/// ignored) so only the boundary operations return this: clip parsing and
/// loading, mask construction and selection resolution.
///
/// Some wrapped error types are large so are boxed.
#[derive(Debug)]
pub enum RigError {
    InvalidJoint(i64),
    VertexOutOfRange(usize),
    FrameJointMismatch {
        frame: usize,
        expected: usize,
        found: usize,
    },
    InvalidDuration,
    DegenerateMask { width: u32, height: u32 },
    /// The mask renderer failed, with its error
    MaskUnavailable(Box<RigError>),
    MaskSizeMismatch { expected: usize, found: usize },
    DataNotConverted,
    LoaderDisconnected,
    SerdeYamlError(Box<serde_yaml::Error>),
    StdIoError(std::io::Error),
    ImageImageError(Box<image::error::ImageError>),
}

impl error::Error for RigError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::MaskUnavailable(e) => Some(e.as_ref()),
            Self::SerdeYamlError(e) => Some(e.as_ref()),
            Self::StdIoError(e) => Some(e),
            Self::ImageImageError(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl fmt::Display for RigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidJoint(j) => write!(f, "joint index {j} is not valid"),
            Self::VertexOutOfRange(v) => {
                write!(f, "vertex index {v} is out of range")
            }
            Self::FrameJointMismatch {
                frame,
                expected,
                found,
            } => write!(
                f,
                "frame {frame} has {found} joints but {expected} were expected"
            ),
            Self::InvalidDuration => {
                write!(f, "animation with frames must have a positive duration")
            }
            Self::DegenerateMask { width, height } => {
                write!(f, "selection mask {width}x{height} is smaller than 2x2")
            }
            Self::MaskUnavailable(e) => {
                write!(f, "selection mask is unavailable: {e}")
            }
            Self::MaskSizeMismatch { expected, found } => write!(
                f,
                "mask data has {found} bytes but {expected} were expected"
            ),
            Self::DataNotConverted => {
                write!(f, "data could not convert to a valid value")
            }
            Self::LoaderDisconnected => {
                write!(f, "clip loader finished without producing a result")
            }
            Self::SerdeYamlError(e) => write!(f, "serde_yaml::Error: {e}"),
            Self::StdIoError(e) => write!(f, "std::io::Error: {}", e.kind()),
            Self::ImageImageError(e) => {
                write!(f, "image crate ImageError: {e}")
            }
        }
    }
}

impl From<serde_yaml::Error> for RigError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::SerdeYamlError(Box::new(e))
    }
}

impl From<std::io::Error> for RigError {
    fn from(e: std::io::Error) -> Self {
        Self::StdIoError(e)
    }
}

impl From<image::error::ImageError> for RigError {
    fn from(e: image::error::ImageError) -> Self {
        Self::ImageImageError(Box::new(e))
    }
}
