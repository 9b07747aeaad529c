//! C-ABI wrapper around `fx-core`.
//!
//! # Overview
//! Exposes the conversion controller through `extern "C"` functions so a
//! native UI shell can forward user events, run the exchange-rate request
//! itself and render the result line without linking to serde or an async
//! runtime.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - `fx_trigger_convert` hands out an `FfiConvertTicket` with the HTTP
//!   request to execute; the caller returns the response (or a transport
//!   error) together with the ticket. Tickets for an outdated input are
//!   reported as `Stale` and change nothing.
//! - The C caller owns all returned pointers and must call the matching
//!   `fx_free_*` function to release them.

pub mod types;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::catch_unwind;

use fx_core::{currency_table, ApiError, CurrencyCode, HttpResponse};
use tracing::warn;

use types::*;

/// Borrow a C string as `&str`. Null and invalid UTF-8 yield `None`.
fn str_arg<'a>(s: *const c_char) -> Option<&'a str> {
    if s.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(s) }.to_str().ok()
}

// ---------------------------------------------------------------------------
// Controller lifecycle
// ---------------------------------------------------------------------------

/// Create a controller with the default pair (USD → EUR) and no amount.
///
/// The caller must free the returned pointer with `fx_controller_free`.
#[unsafe(no_mangle)]
pub extern "C" fn fx_controller_new() -> *mut FfiController {
    catch_unwind(|| {
        Box::into_raw(Box::new(FfiController {
            inner: fx_core::ConversionController::new(),
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a controller created by `fx_controller_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn fx_controller_free(ctrl: *mut FfiController) {
    if !ctrl.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(ctrl) });
        });
    }
}

// ---------------------------------------------------------------------------
// Rate client lifecycle
// ---------------------------------------------------------------------------

/// Create a rate client for `base_url` (e.g. `https://v6.exchangerate-api.com/v6`)
/// and `api_key`.
///
/// Returns null if either argument is null or not UTF-8.
/// The caller must free the returned pointer with `fx_rate_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn fx_rate_client_new(
    base_url: *const c_char,
    api_key: *const c_char,
) -> *mut FfiRateClient {
    catch_unwind(|| {
        let (Some(url), Some(key)) = (str_arg(base_url), str_arg(api_key)) else {
            return std::ptr::null_mut();
        };
        Box::into_raw(Box::new(FfiRateClient {
            inner: fx_core::RateClient::new(url, key),
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Create a rate client from `FX_API_BASE_URL`, `FX_API_KEY` and
/// `FX_API_TIMEOUT_MS`.
///
/// Returns null when the environment does not hold a usable configuration.
#[unsafe(no_mangle)]
pub extern "C" fn fx_rate_client_from_env() -> *mut FfiRateClient {
    catch_unwind(|| match fx_core::RateClient::from_env() {
        Ok(inner) => Box::into_raw(Box::new(FfiRateClient { inner })),
        Err(e) => {
            warn!(error = %e, "rate client configuration rejected");
            std::ptr::null_mut()
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a rate client. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn fx_rate_client_free(client: *mut FfiRateClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// User events
// ---------------------------------------------------------------------------

/// Pass the amount field's new content through the normalizer.
///
/// Returns the text the field must now display (free with
/// `fx_free_string`), or null if an argument is null.
#[unsafe(no_mangle)]
pub extern "C" fn fx_edit_amount(ctrl: *mut FfiController, input: *const c_char) -> *mut c_char {
    catch_unwind(|| {
        if ctrl.is_null() || input.is_null() {
            return std::ptr::null_mut();
        }
        let ctrl = unsafe { &mut *ctrl };
        let input = unsafe { CStr::from_ptr(input) }.to_string_lossy();
        c_string(ctrl.inner.edit_amount(&input))
    })
    .unwrap_or(std::ptr::null_mut())
}

fn select(ctrl: *mut FfiController, code: *const c_char, to: bool) -> bool {
    if ctrl.is_null() {
        return false;
    }
    let Some(code) = str_arg(code).and_then(|c| CurrencyCode::from_code(c).ok()) else {
        return false;
    };
    let ctrl = unsafe { &mut *ctrl };
    if to {
        ctrl.inner.select_to(code);
    } else {
        ctrl.inner.select_from(code);
    }
    true
}

/// Select the source currency by ISO code (case-insensitive).
///
/// Returns false, leaving the state untouched, for null arguments or an
/// unsupported code.
#[unsafe(no_mangle)]
pub extern "C" fn fx_select_from(ctrl: *mut FfiController, code: *const c_char) -> bool {
    catch_unwind(|| select(ctrl, code, false)).unwrap_or(false)
}

/// Select the target currency. Same contract as `fx_select_from`.
#[unsafe(no_mangle)]
pub extern "C" fn fx_select_to(ctrl: *mut FfiController, code: *const c_char) -> bool {
    catch_unwind(|| select(ctrl, code, true)).unwrap_or(false)
}

/// Swap source and target. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn fx_flip(ctrl: *mut FfiController) {
    if !ctrl.is_null() {
        let _ = catch_unwind(|| unsafe { &mut *ctrl }.inner.flip());
    }
}

/// Reset amount and result. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn fx_clear(ctrl: *mut FfiController) {
    if !ctrl.is_null() {
        let _ = catch_unwind(|| unsafe { &mut *ctrl }.inner.clear());
    }
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

/// Start converting the current amount.
///
/// Returns null when there is nothing to convert (empty or non-positive
/// amount) or an argument is null; the state is then unchanged. Otherwise
/// the state is loading and the returned ticket carries the request to
/// execute. Free it with `fx_free_ticket` after completing it.
#[unsafe(no_mangle)]
pub extern "C" fn fx_trigger_convert(
    ctrl: *mut FfiController,
    client: *const FfiRateClient,
) -> *mut FfiConvertTicket {
    catch_unwind(|| {
        if ctrl.is_null() || client.is_null() {
            return std::ptr::null_mut();
        }
        let ctrl = unsafe { &mut *ctrl };
        let client = unsafe { &*client };
        match ctrl.inner.trigger_convert() {
            Some(ticket) => {
                let request = client.inner.build_pair_request(&ticket.request);
                FfiConvertTicket::from_core(ticket, request)
            }
            None => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Convert an `FfiHttpResponse` to a core `HttpResponse`. A null body is
/// treated as empty.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    let body = if resp.body.is_null() {
        String::new()
    } else {
        unsafe { CStr::from_ptr(resp.body) }
            .to_string_lossy()
            .into_owned()
    };
    HttpResponse::new(resp.status, body)
}

/// Hand back the response to the request of `ticket`.
///
/// `Applied` and `Failed` mean the state changed; `Stale` means the input
/// moved on since the ticket was issued and the response was ignored.
#[unsafe(no_mangle)]
pub extern "C" fn fx_complete_convert(
    ctrl: *mut FfiController,
    client: *const FfiRateClient,
    ticket: *const FfiConvertTicket,
    response: *const FfiHttpResponse,
) -> FfiCompletion {
    catch_unwind(|| {
        if ctrl.is_null() || client.is_null() || response.is_null() {
            return FfiCompletion::NullArg;
        }
        let Some(ticket) = (unsafe { FfiConvertTicket::core_ticket(ticket) }) else {
            return FfiCompletion::NullArg;
        };
        let ctrl = unsafe { &mut *ctrl };
        let client = unsafe { &*client };
        let response = ffi_response_to_core(unsafe { &*response });
        let outcome = client.inner.parse_pair_response(response);
        ctrl.inner.complete_convert(&ticket, outcome).into()
    })
    .unwrap_or(FfiCompletion::Panic)
}

/// Report that the request of `ticket` produced no response at all
/// (connection failure, timeout). `message` may be null.
#[unsafe(no_mangle)]
pub extern "C" fn fx_fail_convert(
    ctrl: *mut FfiController,
    ticket: *const FfiConvertTicket,
    message: *const c_char,
) -> FfiCompletion {
    catch_unwind(|| {
        if ctrl.is_null() {
            return FfiCompletion::NullArg;
        }
        let Some(ticket) = (unsafe { FfiConvertTicket::core_ticket(ticket) }) else {
            return FfiCompletion::NullArg;
        };
        let ctrl = unsafe { &mut *ctrl };
        let message = str_arg(message).unwrap_or("request failed").to_string();
        ctrl.inner
            .complete_convert(&ticket, Err(ApiError::Transport(message)))
            .into()
    })
    .unwrap_or(FfiCompletion::Panic)
}

// ---------------------------------------------------------------------------
// Reading state
// ---------------------------------------------------------------------------

/// Copy the current state. Free with `fx_free_state`. Null if `ctrl` is null.
#[unsafe(no_mangle)]
pub extern "C" fn fx_snapshot(ctrl: *const FfiController) -> *mut FfiConversionState {
    catch_unwind(|| {
        if ctrl.is_null() {
            return std::ptr::null_mut();
        }
        FfiConversionState::from_core(unsafe { &*ctrl }.inner.state())
    })
    .unwrap_or(std::ptr::null_mut())
}

/// The current state as a JSON object. Free with `fx_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn fx_state_json(ctrl: *const FfiController) -> *mut c_char {
    catch_unwind(|| {
        if ctrl.is_null() {
            return std::ptr::null_mut();
        }
        match serde_json::to_string(unsafe { &*ctrl }.inner.state()) {
            Ok(json) => c_string(json),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// The result line to show, e.g. `"$1,000 USD = €920.5 EUR"` or
/// `"Converting..."`. Null when the result area stays empty.
#[unsafe(no_mangle)]
pub extern "C" fn fx_display(ctrl: *const FfiController) -> *mut c_char {
    catch_unwind(|| {
        if ctrl.is_null() {
            return std::ptr::null_mut();
        }
        match unsafe { &*ctrl }.inner.display() {
            Some(line) => c_string(line),
            None => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Currency table
// ---------------------------------------------------------------------------

/// Number of supported currencies.
#[unsafe(no_mangle)]
pub extern "C" fn fx_currency_count() -> u32 {
    catch_unwind(|| CurrencyCode::all().count() as u32).unwrap_or(0)
}

/// Picker metadata for the currency at `index`, in picker order. Null when
/// `index` is out of range. Free with `fx_free_meta`.
#[unsafe(no_mangle)]
pub extern "C" fn fx_currency_meta(index: u32) -> *mut FfiCurrencyMeta {
    catch_unwind(|| match currency_table().into_iter().nth(index as usize) {
        Some(meta) => FfiCurrencyMeta::from_core(meta),
        None => std::ptr::null_mut(),
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free a ticket returned by `fx_trigger_convert`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn fx_free_ticket(ticket: *mut FfiConvertTicket) {
    if ticket.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let mut ticket = unsafe { Box::from_raw(ticket) };
        ticket.request.free_fields();
        if !ticket.handle.is_null() {
            drop(unsafe { Box::from_raw(ticket.handle) });
        }
    });
}

/// Free a snapshot returned by `fx_snapshot`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn fx_free_state(state: *mut FfiConversionState) {
    if state.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let state = unsafe { Box::from_raw(state) };
        free_c_string(state.raw_amount_text);
        free_c_string(state.failure_message);
    });
}

/// Free a record returned by `fx_currency_meta`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn fx_free_meta(meta: *mut FfiCurrencyMeta) {
    if meta.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let meta = unsafe { Box::from_raw(meta) };
        free_c_string(meta.code_str);
        free_c_string(meta.symbol);
        free_c_string(meta.display_name);
        free_c_string(meta.flag);
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn fx_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| free_c_string(s));
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
