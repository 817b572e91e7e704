//! FFI bindings for examlens
//!
//! C-compatible entry points for embedding the engine in a host
//! application. All functions use C strings (null-terminated) and return
//! allocated memory that must be freed by the caller using
//! `examlens_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::pipeline::assemble_metrics;
use crate::sources::{parse_historical, parse_prediction, parse_statistics};
use crate::types::TimeRange;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert a C string to a Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert a Rust string to a C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Assemble metric sections from the three source payloads.
///
/// `time_range_json` may be NULL (no filtering) or a JSON value in one of
/// the forms `"all"`, `{"since": "2026-01-01T00:00:00Z"}`,
/// `{"last_exams": 5}`.
///
/// # Safety
/// - `historical_json`, `statistics_json`, and `prediction_json` must be
///   valid null-terminated C strings.
/// - Returns a newly allocated MetricSections JSON string that must be
///   freed with `examlens_free_string`.
/// - Returns NULL on error; call `examlens_last_error` for the message.
#[no_mangle]
pub unsafe extern "C" fn examlens_assemble_metrics(
    historical_json: *const c_char,
    statistics_json: *const c_char,
    prediction_json: *const c_char,
    time_range_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let historical_str = match cstr_to_string(historical_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid historical JSON string pointer");
            return ptr::null_mut();
        }
    };

    let statistics_str = match cstr_to_string(statistics_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid statistics JSON string pointer");
            return ptr::null_mut();
        }
    };

    let prediction_str = match cstr_to_string(prediction_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid prediction JSON string pointer");
            return ptr::null_mut();
        }
    };

    let time_range = if time_range_json.is_null() {
        TimeRange::All
    } else {
        let raw = match cstr_to_string(time_range_json) {
            Some(s) => s,
            None => {
                set_last_error("Invalid time range string pointer");
                return ptr::null_mut();
            }
        };
        match serde_json::from_str::<TimeRange>(&raw) {
            Ok(range) => range,
            Err(e) => {
                set_last_error(&format!("Invalid time range: {e}"));
                return ptr::null_mut();
            }
        }
    };

    let result = (|| {
        let historical = parse_historical(&serde_json::from_str(&historical_str)?)?;
        let statistics = parse_statistics(&serde_json::from_str(&statistics_str)?)?;
        let prediction = parse_prediction(&serde_json::from_str(&prediction_str)?)?;

        let sections = assemble_metrics(
            Some(&historical),
            Some(&statistics),
            Some(&prediction),
            time_range,
        );
        Ok::<_, crate::error::AnalyticsError>(sections)
    })();

    match result {
        // All three payloads are present here, so assembly always yields
        // a populated structure.
        Ok(Some(sections)) => match serde_json::to_string(&sections) {
            Ok(json) => string_to_cstr(&json),
            Err(e) => {
                set_last_error(&e.to_string());
                ptr::null_mut()
            }
        },
        Ok(None) => {
            set_last_error("Metrics not ready");
            ptr::null_mut()
        }
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free a string returned by examlens functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by an examlens function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn examlens_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next examlens call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn examlens_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the examlens library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn examlens_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    fn sample_historical() -> CString {
        CString::new(
            r#"[{
                "id": 1,
                "student_id": "stu-1",
                "exam_id": 1,
                "exam_name": "Surgery Shelf",
                "score": 82.0,
                "passed": true,
                "timestamp": "2026-01-05T09:00:00Z",
                "question_attempts": [
                    {"question_id": 1, "correct": true, "confidence": 5,
                     "prompt": "p", "difficulty": "Easy"}
                ]
            }]"#,
        )
        .unwrap()
    }

    fn sample_statistics() -> CString {
        CString::new(
            r#"{
                "total_exams": 1,
                "average_score": "82.0",
                "total_questions": "1",
                "correct_percentage": "100.0",
                "exam_dates": [
                    {"exam_id": 1, "timestamp": "2026-01-05T09:00:00Z", "score": 82.0}
                ]
            }"#,
        )
        .unwrap()
    }

    fn sample_prediction() -> CString {
        CString::new(
            r#"{"predicted_class": 1, "probability": 0.95,
                "message": "On track", "confidence_score": 91.2}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_ffi_assemble_metrics() {
        let historical = sample_historical();
        let statistics = sample_statistics();
        let prediction = sample_prediction();

        unsafe {
            let result = examlens_assemble_metrics(
                historical.as_ptr(),
                statistics.as_ptr(),
                prediction.as_ptr(),
                ptr::null(),
            );

            assert!(!result.is_null());

            let result_str = CStr::from_ptr(result).to_str().unwrap();
            let parsed: serde_json::Value = serde_json::from_str(result_str).unwrap();
            assert!(parsed.get("historical").is_some());
            assert!(parsed.get("predictive").is_some());
            assert_eq!(parsed["engagement"][0]["value"], "1");

            examlens_free_string(result);
        }
    }

    #[test]
    fn test_ffi_time_range_filter() {
        let historical = sample_historical();
        let statistics = sample_statistics();
        let prediction = sample_prediction();
        let range = CString::new(r#"{"last_exams": 1}"#).unwrap();

        unsafe {
            let result = examlens_assemble_metrics(
                historical.as_ptr(),
                statistics.as_ptr(),
                prediction.as_ptr(),
                range.as_ptr(),
            );

            assert!(!result.is_null());
            examlens_free_string(result);
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        let invalid = CString::new("not json").unwrap();
        let statistics = sample_statistics();
        let prediction = sample_prediction();

        unsafe {
            let result = examlens_assemble_metrics(
                invalid.as_ptr(),
                statistics.as_ptr(),
                prediction.as_ptr(),
                ptr::null(),
            );

            assert!(result.is_null());

            let error = examlens_last_error();
            assert!(!error.is_null());
            let error_str = CStr::from_ptr(error).to_str().unwrap();
            assert!(!error_str.is_empty());
        }
    }

    #[test]
    fn test_ffi_invalid_shape_sets_error() {
        let historical = CString::new(r#"{"records": []}"#).unwrap();
        let statistics = sample_statistics();
        let prediction = sample_prediction();

        unsafe {
            let result = examlens_assemble_metrics(
                historical.as_ptr(),
                statistics.as_ptr(),
                prediction.as_ptr(),
                ptr::null(),
            );

            assert!(result.is_null());
            let error = CStr::from_ptr(examlens_last_error()).to_str().unwrap();
            assert!(error.contains("not a list"));
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = examlens_version();
            assert!(!version.is_null());
            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert!(!version_str.is_empty());
        }
    }
}
