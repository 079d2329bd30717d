use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;
use terrain_snap_core::SnapError;

/// Common interface for errors crossing the FFI boundary.
///
/// - `code()` - Returns the error code handed back to the caller
/// - `msg()` - Returns the message stored for `terrain_snap_get_last_error`
pub(crate) trait FfiError {
    /// Returns the error code to be returned across the FFI boundary.
    fn code(&self) -> TerrainSnapErrorCode;

    /// Returns the human-readable error message.
    fn msg(&self) -> &str;
}

/// Default implementation of `FfiError` for the failures this library reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DefaultFfiError {
    code: TerrainSnapErrorCode,
    msg: String,
}

impl DefaultFfiError {
    /// Create error for null pointer passed where non-null required.
    ///
    /// # Arguments
    /// * `param_name` - The name of the parameter that was null (e.g., `"out_position"`)
    pub fn null_pointer(param_name: &str) -> Self {
        Self {
            code: TerrainSnapErrorCode::NullPointer,
            msg: format!("Parameter '{param_name}' cannot be null"),
        }
    }

    /// Create error for poisoned lock.
    ///
    /// # Arguments
    /// * `lock_name` - The name of the lock that was poisoned (e.g., `"Mutex"`)
    pub fn lock_poisoned(lock_name: &str) -> Self {
        Self {
            code: TerrainSnapErrorCode::LockPoisoned,
            msg: format!("Lock '{lock_name}' was poisoned by a panic in another thread"),
        }
    }

    /// Create error for an unusable argument.
    pub fn invalid_parameter(message: String) -> Self {
        Self {
            code: TerrainSnapErrorCode::InvalidParameter,
            msg: message,
        }
    }
}

impl From<SnapError> for DefaultFfiError {
    fn from(error: SnapError) -> Self {
        Self::invalid_parameter(error.to_string())
    }
}

impl FfiError for DefaultFfiError {
    fn code(&self) -> TerrainSnapErrorCode {
        self.code
    }

    fn msg(&self) -> &str {
        &self.msg
    }
}

/// FFI error codes returned by terrain snap functions.
/// Follows standard C convention: 0 = success, non-zero = error.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerrainSnapErrorCode {
    /// Operation completed successfully.
    Ok = 0,

    /// Invalid pointer: null pointer passed where non-null required.
    NullPointer = 1,

    /// Lock poisoned: internal synchronization primitive was poisoned by a panic.
    LockPoisoned = 2,

    /// Invalid parameter passed to function (non-positive search distance,
    /// bad delay range, unknown surface kind).
    InvalidParameter = 3,
}

impl From<DefaultFfiError> for TerrainSnapErrorCode {
    fn from(error: DefaultFfiError) -> Self {
        error.code
    }
}

thread_local! {
    /// Thread-local storage for the most recent FFI error (C string, error code).
    /// The CString is kept here so the pointer handed out stays valid.
    static LAST_ERROR: RefCell<(Option<CString>, TerrainSnapErrorCode)> = const { RefCell::new((None, TerrainSnapErrorCode::Ok)) };
}

/// Internal helper to read `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error<F, R>(f: F) -> R
where
    F: FnOnce(&(Option<CString>, TerrainSnapErrorCode)) -> R,
{
    LAST_ERROR.with_borrow(f)
}

/// Internal helper to mutate `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut (Option<CString>, TerrainSnapErrorCode)) -> R,
{
    LAST_ERROR.with_borrow_mut(f)
}

/// Retrieve the most recent FFI error message as a null-terminated C string.
///
/// Returns:
/// - A borrowed pointer to the error message if the last call on this thread failed.
/// - `null` if the last call succeeded.
///
/// # Lifetime
/// The returned pointer is valid until the next FFI call on this thread.
///
/// **DO NOT FREE THIS POINTER** - it is managed internally.
///
/// Example:
/// ```cpp
/// TerrainSnapVec3 snapped;
/// bool found = false;
/// TerrainSnapErrorCode err = terrain_snap_try_snap(pos, 100.0f, hits, count, &snapped, &found);
/// if (err != Ok) {
///     printf("Snap failed: %s\n", terrain_snap_get_last_error());
/// }
/// ```
#[no_mangle]
pub extern "C" fn terrain_snap_get_last_error() -> *const c_char {
    with_last_error(|(cstring, _code)| cstring.as_ref().map_or(ptr::null(), |cs| cs.as_ptr()))
}

/// Retrieve the most recent FFI error code.
///
/// Returns `TerrainSnapErrorCode::Ok` (0) if the last call on this thread succeeded.
#[no_mangle]
pub extern "C" fn terrain_snap_get_last_error_code() -> TerrainSnapErrorCode {
    with_last_error(|(_cstring, code)| *code)
}
