//! C FFI bindings for Mermaid - for the native desktop window
//!
//! Build: cargo build --release -p mermaid-ffi
//! This generates a dylib/staticlib that the window links against. The window
//! owns layout and events; every generate button calls into this library.

use std::ffi::{c_char, CStr, CString};
use std::io::Write;
use std::ptr;
use std::time::Instant;

use mermaid_core::{format_contextual_prompt, Config, ContextualRequest, Page, Session};

// =============================================================================
// Global Tokio runtime (mistral.rs only)
// =============================================================================

#[cfg(feature = "mistralrs")]
static RUNTIME: once_cell::sync::Lazy<Option<std::sync::Arc<tokio::runtime::Runtime>>> =
    once_cell::sync::Lazy::new(|| match tokio::runtime::Runtime::new() {
        Ok(rt) => {
            let rt = std::sync::Arc::new(rt);
            mermaid_core::runtime::register_runtime(std::sync::Arc::clone(&rt));
            log_debug("Global Tokio runtime registered with mermaid-core");
            Some(rt)
        }
        Err(e) => {
            log_debug(&format!("Failed to create Tokio runtime: {}", e));
            None
        }
    });

fn ensure_runtime_initialized() {
    #[cfg(feature = "mistralrs")]
    {
        let _ = &*RUNTIME;
    }
}

/// Write debug log to file (GUI hosts don't have stderr)
fn log_debug(msg: &str) {
    let log_path = std::env::temp_dir().join("mermaid_debug.log");
    if let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
    {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let _ = writeln!(file, "[{}] {}", timestamp, msg);
    }
}

/// Opaque handle owning the session behind the window
pub struct MermaidHandle {
    session: Session,
}

/// Result struct returned to foreign callers
#[repr(C)]
pub struct MermaidResult {
    pub success: bool,
    /// Text for the response label (`Response: ...` or the no-model message)
    pub text: *mut c_char,
    pub error_message: *mut c_char,
    pub generation_ms: u64,
}

/// Interior NUL bytes are dropped so model output always crosses the boundary
fn into_c_string(s: String) -> *mut c_char {
    let s = if s.contains('\0') { s.replace('\0', "") } else { s };
    CString::new(s)
        .map(|s| s.into_raw())
        .unwrap_or(ptr::null_mut())
}

/// Borrow a nullable C string; null reads as empty
unsafe fn str_or_empty<'a>(s: *const c_char) -> Result<&'a str, std::str::Utf8Error> {
    if s.is_null() {
        return Ok("");
    }
    CStr::from_ptr(s).to_str()
}

fn panic_message(e: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = e.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = e.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

fn error_result(msg: &str) -> MermaidResult {
    MermaidResult {
        success: false,
        text: ptr::null_mut(),
        error_message: into_c_string(msg.to_string()),
        generation_ms: 0,
    }
}

fn run_generation<F>(name: &str, generate: F) -> MermaidResult
where
    F: FnOnce() -> anyhow::Result<String>,
{
    let started = Instant::now();
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(generate));

    match result {
        Ok(Ok(text)) => {
            log_debug(&format!("{}: {} chars", name, text.len()));
            MermaidResult {
                success: true,
                text: into_c_string(text),
                error_message: ptr::null_mut(),
                generation_ms: started.elapsed().as_millis() as u64,
            }
        }
        Ok(Err(e)) => {
            log_debug(&format!("ERROR - {} failed: {:#}", name, e));
            error_result(&format!("{:#}", e))
        }
        Err(e) => {
            let msg = panic_message(e);
            log_debug(&format!("PANIC caught in {}: {}", name, msg));
            error_result(&format!("Internal error: {}", msg))
        }
    }
}

/// Load config and model, returning a handle (null on failure)
///
/// A missing config file yields a handle whose generate calls return the
/// no-model message. Malformed config or model-load failures return null.
///
/// # Safety
/// config_path must be a valid null-terminated string or null for ./config.json
#[no_mangle]
pub unsafe extern "C" fn mermaid_init(config_path: *const c_char) -> *mut MermaidHandle {
    log_debug("mermaid_init called");
    ensure_runtime_initialized();

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let config_str = if config_path.is_null() {
            None
        } else {
            match CStr::from_ptr(config_path).to_str() {
                Ok(s) => Some(s),
                Err(_) => return ptr::null_mut(),
            }
        };

        let config = match Config::load(config_str) {
            Ok(c) => c,
            Err(e) => {
                log_debug(&format!("Failed to load config: {}", e));
                return ptr::null_mut();
            }
        };

        log_debug(&format!("Config loaded: model_id={:?}", config.model_id()));

        let session = match Session::from_config(&config) {
            Ok(s) => s,
            Err(e) => {
                log_debug(&format!("Failed to load model: {:#}", e));
                return ptr::null_mut();
            }
        };

        log_debug("mermaid_init complete - returning handle");
        Box::into_raw(Box::new(MermaidHandle { session }))
    }));

    match result {
        Ok(handle) => handle,
        Err(e) => {
            log_debug(&format!("PANIC caught in mermaid_init: {}", panic_message(e)));
            ptr::null_mut()
        }
    }
}

/// "Selected Model: ..." label for the window header
///
/// # Safety
/// handle must be a valid pointer from mermaid_init
#[no_mangle]
pub unsafe extern "C" fn mermaid_model_label(handle: *const MermaidHandle) -> *mut c_char {
    if handle.is_null() {
        return ptr::null_mut();
    }
    into_c_string((*handle).session.model_label())
}

/// Generate button of the contextual page
///
/// # Safety
/// - handle must be a valid pointer from mermaid_init
/// - string arguments must be null-terminated or null (read as empty);
///   invalid UTF-8 yields an error result
#[no_mangle]
pub unsafe extern "C" fn mermaid_generate_contextual(
    handle: *const MermaidHandle,
    context: *const c_char,
    input_text: *const c_char,
    instruction: *const c_char,
) -> MermaidResult {
    if handle.is_null() {
        return error_result("Invalid handle");
    }

    let session = &(*handle).session;
    let (context, input_text, instruction) = match (
        str_or_empty(context),
        str_or_empty(input_text),
        str_or_empty(instruction),
    ) {
        (Ok(c), Ok(i), Ok(n)) => (c, i, n),
        _ => return error_result("Invalid UTF-8 in arguments"),
    };
    let request = ContextualRequest::new(context, input_text, instruction);

    run_generation("mermaid_generate_contextual", || {
        session.generate_contextual(&request)
    })
}

/// Generate button of the free-text page
///
/// # Safety
/// - handle must be a valid pointer from mermaid_init
/// - input_text must be null-terminated or null (read as empty)
#[no_mangle]
pub unsafe extern "C" fn mermaid_generate_simple(
    handle: *const MermaidHandle,
    input_text: *const c_char,
) -> MermaidResult {
    if handle.is_null() {
        return error_result("Invalid handle");
    }

    let session = &(*handle).session;
    let Ok(input) = str_or_empty(input_text) else {
        return error_result("Invalid UTF-8 in input_text");
    };

    run_generation("mermaid_generate_simple", || session.generate_simple(input))
}

/// Format the contextual template without a handle (null on invalid UTF-8)
///
/// # Safety
/// string arguments must be null-terminated or null (read as empty)
#[no_mangle]
pub unsafe extern "C" fn mermaid_format_template(
    context: *const c_char,
    input_text: *const c_char,
    instruction: *const c_char,
) -> *mut c_char {
    match (
        str_or_empty(context),
        str_or_empty(input_text),
        str_or_empty(instruction),
    ) {
        (Ok(c), Ok(i), Ok(n)) => into_c_string(format_contextual_prompt(c, i, n)),
        _ => ptr::null_mut(),
    }
}

/// Number of pages in the window
#[no_mangle]
pub extern "C" fn mermaid_page_count() -> usize {
    Page::ALL.len()
}

/// Navigation title of a page (null when out of range)
#[no_mangle]
pub extern "C" fn mermaid_page_title(index: usize) -> *mut c_char {
    match Page::from_index(index) {
        Some(page) => into_c_string(page.title().to_string()),
        None => ptr::null_mut(),
    }
}

/// Free a MermaidResult's strings
///
/// # Safety
/// Only call this once per result
#[no_mangle]
pub unsafe extern "C" fn mermaid_free_result(result: MermaidResult) {
    if !result.text.is_null() {
        let _ = CString::from_raw(result.text);
    }
    if !result.error_message.is_null() {
        let _ = CString::from_raw(result.error_message);
    }
}

/// Free a C string returned by other functions
///
/// # Safety
/// Only call once per string
#[no_mangle]
pub unsafe extern "C" fn mermaid_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = CString::from_raw(s);
    }
}

/// Cleanup and free the handle
///
/// # Safety
/// Only call this once per handle
#[no_mangle]
pub unsafe extern "C" fn mermaid_destroy(handle: *mut MermaidHandle) {
    if !handle.is_null() {
        let _ = Box::from_raw(handle);
    }
}

/// Get the library version
#[no_mangle]
pub extern "C" fn mermaid_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;
    use mermaid_core::NO_MODEL_MESSAGE;

    unsafe fn take_string(s: *mut c_char) -> String {
        assert!(!s.is_null());
        let owned = CStr::from_ptr(s).to_string_lossy().into_owned();
        mermaid_free_string(s);
        owned
    }

    fn disabled_handle() -> (tempfile::TempDir, *mut MermaidHandle) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"model_id": ""}"#).unwrap();
        let path = CString::new(path.to_str().unwrap()).unwrap();
        let handle = unsafe { mermaid_init(path.as_ptr()) };
        assert!(!handle.is_null());
        (dir, handle)
    }

    #[test]
    fn test_disabled_handle_returns_no_model_message() {
        let (_dir, handle) = disabled_handle();
        unsafe {
            assert_eq!(take_string(mermaid_model_label(handle)), "Selected Model: None");

            let text = CString::new("hello").unwrap();
            let result = mermaid_generate_simple(handle, text.as_ptr());
            assert!(result.success);
            assert_eq!(CStr::from_ptr(result.text).to_str().unwrap(), NO_MODEL_MESSAGE);
            mermaid_free_result(result);

            let result = mermaid_generate_contextual(handle, ptr::null(), ptr::null(), ptr::null());
            assert!(result.success);
            assert_eq!(CStr::from_ptr(result.text).to_str().unwrap(), NO_MODEL_MESSAGE);
            mermaid_free_result(result);

            mermaid_destroy(handle);
        }
    }

    #[test]
    fn test_malformed_config_returns_null() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        let path = CString::new(path.to_str().unwrap()).unwrap();

        let handle = unsafe { mermaid_init(path.as_ptr()) };
        assert!(handle.is_null());
    }

    #[test]
    fn test_null_handle_is_an_error() {
        let result = unsafe { mermaid_generate_simple(ptr::null(), ptr::null()) };
        assert!(!result.success);
        assert!(result.text.is_null());
        unsafe { mermaid_free_result(result) };
    }

    #[test]
    fn test_format_template() {
        let context = CString::new("ctx").unwrap();
        let input = CString::new("input").unwrap();
        let instruction = CString::new("do it").unwrap();

        let template = unsafe {
            take_string(mermaid_format_template(
                context.as_ptr(),
                input.as_ptr(),
                instruction.as_ptr(),
            ))
        };
        assert_eq!(template, format_contextual_prompt("ctx", "input", "do it"));
    }

    #[test]
    fn test_nul_in_output_keeps_success_text() {
        let result = run_generation("test", || Ok("Response: a\0b".to_string()));
        assert!(result.success);
        assert!(!result.text.is_null());
        unsafe {
            assert_eq!(CStr::from_ptr(result.text).to_str().unwrap(), "Response: ab");
            mermaid_free_result(result);
        }
    }

    #[test]
    fn test_invalid_utf8_input_is_an_error() {
        let (_dir, handle) = disabled_handle();
        let bytes: [u8; 3] = [0xff, 0xfe, 0];
        let invalid = bytes.as_ptr() as *const c_char;
        unsafe {
            let result = mermaid_generate_simple(handle, invalid);
            assert!(!result.success);
            assert!(result.text.is_null());
            let message = CStr::from_ptr(result.error_message).to_str().unwrap();
            assert!(message.contains("Invalid UTF-8"));
            mermaid_free_result(result);

            let result = mermaid_generate_contextual(handle, invalid, ptr::null(), ptr::null());
            assert!(!result.success);
            mermaid_free_result(result);

            assert!(mermaid_format_template(invalid, ptr::null(), ptr::null()).is_null());
            mermaid_destroy(handle);
        }
    }

    #[test]
    fn test_pages() {
        assert_eq!(mermaid_page_count(), 2);
        unsafe {
            assert_eq!(take_string(mermaid_page_title(0)), "Contextual");
            assert_eq!(take_string(mermaid_page_title(1)), "Mermaid Flow");
        }
        assert!(mermaid_page_title(2).is_null());
    }
}
