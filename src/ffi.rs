//! C FFI bindings for u-eda.
//!
//! Exposes column classification and the pairwise test runner via a
//! C-compatible interface.
//!
//! - **Opaque handle**: `*mut EdaContext` holds a parsed table
//! - **`#[repr(C)]`**: all data transfer structs
//! - **Integer error codes**: 0 = success, negative = error
//! - **Thread-local error message**: `eda_last_error()`
//!
//! # Safety
//!
//! All entry points that do real work are wrapped in `catch_unwind` so a
//! panic never crosses the FFI boundary. Null pointer arguments return
//! error code -1.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic;
use std::ptr;
use std::slice;

use crate::csv_parser::CsvParser;
use crate::dataframe::{DataFrame, DataType};
use crate::stat_tests::{normalize_name, run_statistical_tests, TestConfig, TestKind};
use crate::summary::{classify_column, ColumnKind};

// ── Error handling ────────────────────────────────────────────────────

/// Error codes returned by FFI functions.
pub const EDA_OK: i32 = 0;
pub const EDA_ERR_NULL_PTR: i32 = -1;
pub const EDA_ERR_INVALID_INPUT: i32 = -2;
pub const EDA_ERR_PARSE_FAILED: i32 = -3;
pub const EDA_ERR_ANALYSIS_FAILED: i32 = -4;
pub const EDA_ERR_PANIC: i32 = -99;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|cell| {
        *cell.borrow_mut() = CString::new(msg).ok();
    });
}

/// Returns the last error message, or null if no error.
/// The returned string is valid until the next FFI call on this thread.
///
/// # Safety
/// The caller must not free the returned pointer.
#[no_mangle]
pub extern "C" fn eda_last_error() -> *const c_char {
    LAST_ERROR.with(|cell| {
        let borrow = cell.borrow();
        match borrow.as_ref() {
            Some(cstr) => cstr.as_ptr(),
            None => ptr::null(),
        }
    })
}

/// Clears the last error message.
#[no_mangle]
pub extern "C" fn eda_clear_error() {
    LAST_ERROR.with(|cell| {
        *cell.borrow_mut() = None;
    });
}

// ── Context (opaque handle) ───────────────────────────────────────────

/// Opaque handle holding a parsed table.
pub struct EdaContext {
    dataframe: DataFrame,
    names: Vec<CString>,
}

/// C-compatible column summary.
#[repr(C)]
pub struct CColumnSummary {
    /// Column index.
    pub index: u32,
    /// Number of distinct non-missing values.
    pub unique_count: u64,
    /// Number of missing values.
    pub missing_count: u64,
    /// `unique_count / rows`; NaN for an empty table.
    pub unique_ratio: f64,
    /// Column data type: 0=Numeric, 1=Boolean, 2=Categorical, 3=Text.
    pub data_type: u32,
    /// Suggested role: 0=Categorical, 1=Numeric.
    pub suggested: u32,
}

/// Parses a CSV string into a new context.
///
/// # Safety
/// - `csv_data` must be a valid null-terminated UTF-8 string.
/// - The returned handle must be freed with `eda_free`.
#[no_mangle]
pub unsafe extern "C" fn eda_load_csv(csv_data: *const c_char) -> *mut EdaContext {
    let result = panic::catch_unwind(|| {
        if csv_data.is_null() {
            set_last_error("null csv_data pointer");
            return ptr::null_mut();
        }

        let c_str = unsafe { CStr::from_ptr(csv_data) };
        let csv = match c_str.to_str() {
            Ok(s) => s,
            Err(e) => {
                set_last_error(&format!("invalid UTF-8: {e}"));
                return ptr::null_mut();
            }
        };

        let df = match CsvParser::new().parse_str(csv) {
            Ok(df) => df,
            Err(e) => {
                set_last_error(&format!("CSV parse error: {e}"));
                return ptr::null_mut();
            }
        };

        // interior NULs cannot come out of a C string
        let names = df
            .column_names()
            .iter()
            .map(|n| CString::new(n.as_str()).unwrap_or_default())
            .collect();

        Box::into_raw(Box::new(EdaContext {
            dataframe: df,
            names,
        }))
    });

    match result {
        Ok(ptr) => ptr,
        Err(_) => {
            set_last_error("panic in eda_load_csv");
            ptr::null_mut()
        }
    }
}

/// Frees a context.
///
/// # Safety
/// `ctx` must be a valid pointer from `eda_load_csv`, or null.
#[no_mangle]
pub unsafe extern "C" fn eda_free(ctx: *mut EdaContext) {
    if !ctx.is_null() {
        let _ = unsafe { Box::from_raw(ctx) };
    }
}

/// Returns the number of rows, or -1 for a null context.
///
/// # Safety
/// `ctx` must be a valid context or null.
#[no_mangle]
pub unsafe extern "C" fn eda_row_count(ctx: *const EdaContext) -> i64 {
    if ctx.is_null() {
        set_last_error("null context");
        return -1;
    }
    let ctx = unsafe { &*ctx };
    ctx.dataframe.row_count() as i64
}

/// Returns the number of columns, or -1 for a null context.
///
/// # Safety
/// `ctx` must be a valid context or null.
#[no_mangle]
pub unsafe extern "C" fn eda_col_count(ctx: *const EdaContext) -> i64 {
    if ctx.is_null() {
        set_last_error("null context");
        return -1;
    }
    let ctx = unsafe { &*ctx };
    ctx.dataframe.column_count() as i64
}

/// Returns the name of column `col_idx`, or null when out of range.
///
/// # Safety
/// `ctx` must be a valid context or null. The string is owned by the
/// context and lives until `eda_free`.
#[no_mangle]
pub unsafe extern "C" fn eda_column_name(ctx: *const EdaContext, col_idx: u32) -> *const c_char {
    if ctx.is_null() {
        set_last_error("null context");
        return ptr::null();
    }
    let ctx = unsafe { &*ctx };
    match ctx.names.get(col_idx as usize) {
        Some(name) => name.as_ptr(),
        None => {
            set_last_error("column index out of range");
            ptr::null()
        }
    }
}

/// Classifies one column with the given unique-ratio threshold.
///
/// # Safety
/// `ctx` must be valid. `out` must point to a valid `CColumnSummary`.
#[no_mangle]
pub unsafe extern "C" fn eda_summary_column(
    ctx: *const EdaContext,
    col_idx: u32,
    threshold: f64,
    out: *mut CColumnSummary,
) -> i32 {
    let result = panic::catch_unwind(|| {
        if ctx.is_null() || out.is_null() {
            set_last_error("null pointer");
            return EDA_ERR_NULL_PTR;
        }
        let ctx = unsafe { &*ctx };
        let idx = col_idx as usize;

        let (Some(name), Some(col)) = (
            ctx.dataframe.column_names().get(idx),
            ctx.dataframe.column(idx),
        ) else {
            set_last_error("column index out of range");
            return EDA_ERR_INVALID_INPUT;
        };

        let summary = classify_column(name, col, ctx.dataframe.row_count(), threshold);
        let data_type = match col.data_type() {
            DataType::Numeric => 0u32,
            DataType::Boolean => 1,
            DataType::Categorical => 2,
            DataType::Text => 3,
        };
        let suggested = match summary.suggested {
            ColumnKind::Categorical => 0u32,
            ColumnKind::Numeric => 1,
        };

        unsafe {
            (*out) = CColumnSummary {
                index: col_idx,
                unique_count: summary.unique_count as u64,
                missing_count: summary.missing_count as u64,
                unique_ratio: summary.unique_ratio,
                data_type,
                suggested,
            };
        }

        EDA_OK
    });

    match result {
        Ok(code) => code,
        Err(_) => {
            set_last_error("panic in eda_summary_column");
            EDA_ERR_PANIC
        }
    }
}

// ── Statistical tests ─────────────────────────────────────────────────

/// C-compatible test result.
#[repr(C)]
pub struct CTestResult {
    /// 0=Chi-squared, 1=T-test, 2=ANOVA.
    pub test: u32,
    /// Column index of the first variable.
    pub variable_1: u32,
    /// Column index of the second variable.
    pub variable_2: u32,
    /// χ², t or F.
    pub statistic: f64,
    /// P-value; NaN for degenerate groups.
    pub p_value: f64,
}

/// C-compatible list of test results, sorted by p-value ascending.
#[repr(C)]
pub struct CTestResults {
    /// Caller must free with `eda_free_tests`.
    pub results: *mut CTestResult,
    /// Number of results.
    pub n_results: u32,
    /// Number of results with `p < alpha`.
    pub n_significant: u32,
}

/// Runs all pairwise tests on the context's table. Nothing is printed.
///
/// `binary_columns` lists `n_binary` column names whose labels are cleaned
/// before testing; it may be null when `n_binary` is 0.
///
/// # Safety
/// - `ctx` and `out` must be valid.
/// - `binary_columns` must point to `n_binary` null-terminated strings.
/// - The caller must free `out` with `eda_free_tests`.
#[no_mangle]
pub unsafe extern "C" fn eda_run_tests(
    ctx: *const EdaContext,
    binary_columns: *const *const c_char,
    n_binary: u32,
    alpha: f64,
    out: *mut CTestResults,
) -> i32 {
    let result = panic::catch_unwind(|| {
        if ctx.is_null() || out.is_null() || (binary_columns.is_null() && n_binary > 0) {
            set_last_error("null pointer");
            return EDA_ERR_NULL_PTR;
        }
        let ctx = unsafe { &*ctx };

        let binary = if n_binary == 0 {
            None
        } else {
            let raw = unsafe { slice::from_raw_parts(binary_columns, n_binary as usize) };
            let mut names = Vec::with_capacity(raw.len());
            for &p in raw {
                if p.is_null() {
                    set_last_error("null binary column name");
                    return EDA_ERR_NULL_PTR;
                }
                match unsafe { CStr::from_ptr(p) }.to_str() {
                    Ok(s) => names.push(s.to_string()),
                    Err(e) => {
                        set_last_error(&format!("invalid UTF-8: {e}"));
                        return EDA_ERR_INVALID_INPUT;
                    }
                }
            }
            Some(names)
        };

        let config = TestConfig {
            binary_columns: binary,
            alpha,
            verbose: false,
            ..TestConfig::default()
        };
        let report = match run_statistical_tests(&ctx.dataframe, &config) {
            Ok(r) => r,
            Err(e) => {
                set_last_error(&e.to_string());
                return EDA_ERR_ANALYSIS_FAILED;
            }
        };

        // results use normalized names; map them back to positions
        let normalized: Vec<String> = ctx
            .dataframe
            .column_names()
            .iter()
            .map(|n| normalize_name(n))
            .collect();
        let position = |name: &str| {
            normalized
                .iter()
                .position(|n| n == name)
                .map_or(u32::MAX, |i| i as u32)
        };

        let c_results: Vec<CTestResult> = report
            .results
            .iter()
            .map(|r| CTestResult {
                test: match r.test {
                    TestKind::ChiSquared => 0,
                    TestKind::TTest => 1,
                    TestKind::Anova => 2,
                },
                variable_1: position(&r.variable_1),
                variable_2: position(&r.variable_2),
                statistic: r.statistic,
                p_value: r.p_value,
            })
            .collect();

        let out_ref = unsafe { &mut *out };
        out_ref.n_results = c_results.len() as u32;
        out_ref.n_significant = report.significant().count() as u32;
        let mut boxed = c_results.into_boxed_slice();
        out_ref.results = boxed.as_mut_ptr();
        std::mem::forget(boxed);

        EDA_OK
    });

    match result {
        Ok(code) => code,
        Err(_) => {
            set_last_error("panic in eda_run_tests");
            EDA_ERR_PANIC
        }
    }
}

/// Frees the array inside a `CTestResults` and zeroes it.
///
/// # Safety
/// `results` must have been filled by `eda_run_tests`, or be null.
#[no_mangle]
pub unsafe extern "C" fn eda_free_tests(results: *mut CTestResults) {
    if results.is_null() {
        return;
    }
    let results = unsafe { &mut *results };
    if !results.results.is_null() {
        let n = results.n_results as usize;
        let _ = unsafe { Vec::from_raw_parts(results.results, n, n) };
    }
    results.results = ptr::null_mut();
    results.n_results = 0;
    results.n_significant = 0;
}

// ── Version ──────────────────────────────────────────────────────────

/// Returns the version string of u-eda.
///
/// # Safety
/// The returned string is a static string literal. Do not free it.
#[no_mangle]
pub extern "C" fn eda_version() -> *const c_char {
    c"0.1.0".as_ptr()
}

// ── Tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const SURVEY: &str = "Usage Hours,Gender,Addicted\n\
                          1.0,M,No\n\
                          1.5,F,No\n\
                          1.2,M,No\n\
                          6.0,F,Yes\n\
                          6.5,M,Yes\n\
                          5.8,F,Yes\n";

    fn load(csv: &str) -> *mut EdaContext {
        let csv = CString::new(csv).unwrap();
        unsafe { eda_load_csv(csv.as_ptr()) }
    }

    fn empty_results() -> CTestResults {
        CTestResults {
            results: ptr::null_mut(),
            n_results: 0,
            n_significant: 0,
        }
    }

    #[test]
    fn ffi_version() {
        let v = eda_version();
        let s = unsafe { CStr::from_ptr(v) }.to_str().unwrap();
        assert_eq!(s, "0.1.0");
    }

    #[test]
    fn ffi_error_lifecycle() {
        eda_clear_error();
        assert!(eda_last_error().is_null());

        set_last_error("test error");
        let msg = unsafe { CStr::from_ptr(eda_last_error()) }.to_str().unwrap();
        assert_eq!(msg, "test error");

        eda_clear_error();
        assert!(eda_last_error().is_null());
    }

    #[test]
    fn ffi_load_and_counts() {
        let ctx = load(SURVEY);
        assert!(!ctx.is_null());
        assert_eq!(unsafe { eda_row_count(ctx) }, 6);
        assert_eq!(unsafe { eda_col_count(ctx) }, 3);

        let name = unsafe { CStr::from_ptr(eda_column_name(ctx, 1)) };
        assert_eq!(name.to_str().unwrap(), "Gender");
        assert!(unsafe { eda_column_name(ctx, 9) }.is_null());

        unsafe { eda_free(ctx) };
    }

    #[test]
    fn ffi_null_inputs() {
        assert!(unsafe { eda_load_csv(ptr::null()) }.is_null());
        assert_eq!(unsafe { eda_row_count(ptr::null()) }, -1);
        assert_eq!(unsafe { eda_col_count(ptr::null()) }, -1);

        let mut out = empty_results();
        let rc = unsafe { eda_run_tests(ptr::null(), ptr::null(), 0, 0.05, &mut out) };
        assert_eq!(rc, EDA_ERR_NULL_PTR);
        unsafe { eda_free_tests(ptr::null_mut()) };
    }

    #[test]
    fn ffi_parse_error_sets_message() {
        eda_clear_error();
        let ctx = load("a,b\n1,2\n3\n");
        assert!(ctx.is_null());
        let msg = unsafe { CStr::from_ptr(eda_last_error()) }.to_str().unwrap();
        assert!(msg.starts_with("CSV parse error"));
    }

    #[test]
    fn ffi_summary_column() {
        let ctx = load(SURVEY);
        let mut summary = CColumnSummary {
            index: 0,
            unique_count: 0,
            missing_count: 0,
            unique_ratio: 0.0,
            data_type: 0,
            suggested: 0,
        };

        let rc = unsafe { eda_summary_column(ctx, 0, 0.05, &mut summary) };
        assert_eq!(rc, EDA_OK);
        assert_eq!(summary.data_type, 0);
        assert_eq!(summary.suggested, 1);
        assert_eq!(summary.unique_count, 6);
        assert!((summary.unique_ratio - 1.0).abs() < 1e-12);

        let rc = unsafe { eda_summary_column(ctx, 1, 0.05, &mut summary) };
        assert_eq!(rc, EDA_OK);
        assert_eq!(summary.suggested, 0);
        assert_eq!(summary.unique_count, 2);

        let rc = unsafe { eda_summary_column(ctx, 7, 0.05, &mut summary) };
        assert_eq!(rc, EDA_ERR_INVALID_INPUT);

        unsafe { eda_free(ctx) };
    }

    #[test]
    fn ffi_run_tests() {
        let ctx = load(SURVEY);
        let binary = CString::new("Addicted").unwrap();
        let names = [binary.as_ptr()];
        let mut out = empty_results();

        let rc = unsafe { eda_run_tests(ctx, names.as_ptr(), 1, 0.05, &mut out) };
        assert_eq!(rc, EDA_OK);
        // 2 chi-squared (both orders) + 2 t-tests
        assert_eq!(out.n_results, 4);

        let results = unsafe { slice::from_raw_parts(out.results, out.n_results as usize) };
        let first = &results[0];
        assert_eq!(first.test, 1);
        assert_eq!(first.variable_1, 0);
        assert_eq!(first.variable_2, 2);
        assert!(first.p_value < 0.001);
        assert!(out.n_significant >= 1);

        unsafe { eda_free_tests(&mut out) };
        assert!(out.results.is_null());
        assert_eq!(out.n_results, 0);
        unsafe { eda_free(ctx) };
    }
}
