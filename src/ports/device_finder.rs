use super::BoxedElement;
use crate::error::SekeyResult;

/// Locates a connected secure element
///
/// Returns `DeviceError::NotFound` when nothing is connected. Closures of the
/// right shape are finders too.
pub trait DeviceFinder {
    fn find_first(&self) -> SekeyResult<BoxedElement>;
}

impl<F> DeviceFinder for F
where
    F: Fn() -> SekeyResult<BoxedElement>,
{
    fn find_first(&self) -> SekeyResult<BoxedElement> {
        self()
    }
}
