use core::fmt;

/// Failure while waiting on or mapping GPU work.
#[derive(Debug, Clone)]
pub struct DeviceError(pub String);

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gpu device error: {}", self.0)
    }
}

impl std::error::Error for DeviceError {}

impl From<DeviceError> for crate::error::ConvertError {
    fn from(err: DeviceError) -> Self {
        crate::error::ConvertError::Device(err.0)
    }
}
