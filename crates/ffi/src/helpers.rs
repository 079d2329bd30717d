use crate::error::{with_last_error_mut, FfiError, TerrainSnapErrorCode};
use std::ffi::CString;

/// Set the thread-local error message and code.
pub(crate) fn set_last_error(error: &impl FfiError) {
    with_last_error_mut(|(cstring, code)| {
        *cstring = CString::new(error.msg()).ok();
        *code = error.code();
    });
}

/// Record `error` in thread-local storage and return its code.
#[inline]
pub(crate) fn track_error(error: &impl FfiError) -> TerrainSnapErrorCode {
    set_last_error(error);
    error.code()
}

/// Clear the last error on success, or record it on failure.
pub(crate) fn track_result<T, E: FfiError>(result: Result<T, E>) -> Result<T, TerrainSnapErrorCode> {
    match result {
        Ok(value) => {
            clear_last_error();
            Ok(value)
        }
        Err(error) => Err(track_error(&error)),
    }
}

/// Clear the thread-local error message and code.
pub(crate) fn clear_last_error() {
    with_last_error_mut(|(cstring, code)| {
        *cstring = None;
        *code = TerrainSnapErrorCode::Ok;
    });
}
