//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! enums with explicit discriminants. Conversion functions live here to keep
//! `lib.rs` focused on the `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use fx_core::{
    Completion, ConversionState, ConvertTicket, CurrencyCode, CurrencyMeta,
    FailureKind, HttpMethod, HttpRequest, Phase,
};

/// Opaque handle to a `ConversionController`. C callers receive a pointer
/// to this and pass it back into every controller function.
pub struct FfiController {
    pub(crate) inner: fx_core::ConversionController,
}

/// Opaque handle to a `RateClient`.
pub struct FfiRateClient {
    pub(crate) inner: fx_core::RateClient,
}

/// Copy `s` into a heap C string owned by the caller. Interior NULs yield an
/// empty string.
pub(crate) fn c_string(s: impl Into<Vec<u8>>) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}

/// Release a string produced by [`c_string`]. Null is ignored.
pub(crate) fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

// ---------------------------------------------------------------------------
// Currency
// ---------------------------------------------------------------------------

/// Supported currency as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
pub enum FfiCurrencyCode {
    USD = 0,
    EUR = 1,
    GBP = 2,
    CAD = 3,
    JPY = 4,
    MXN = 5,
    COP = 6,
    BRL = 7,
}

impl From<CurrencyCode> for FfiCurrencyCode {
    fn from(code: CurrencyCode) -> Self {
        match code {
            CurrencyCode::USD => FfiCurrencyCode::USD,
            CurrencyCode::EUR => FfiCurrencyCode::EUR,
            CurrencyCode::GBP => FfiCurrencyCode::GBP,
            CurrencyCode::CAD => FfiCurrencyCode::CAD,
            CurrencyCode::JPY => FfiCurrencyCode::JPY,
            CurrencyCode::MXN => FfiCurrencyCode::MXN,
            CurrencyCode::COP => FfiCurrencyCode::COP,
            CurrencyCode::BRL => FfiCurrencyCode::BRL,
        }
    }
}

impl From<FfiCurrencyCode> for CurrencyCode {
    fn from(code: FfiCurrencyCode) -> Self {
        match code {
            FfiCurrencyCode::USD => CurrencyCode::USD,
            FfiCurrencyCode::EUR => CurrencyCode::EUR,
            FfiCurrencyCode::GBP => CurrencyCode::GBP,
            FfiCurrencyCode::CAD => CurrencyCode::CAD,
            FfiCurrencyCode::JPY => CurrencyCode::JPY,
            FfiCurrencyCode::MXN => CurrencyCode::MXN,
            FfiCurrencyCode::COP => CurrencyCode::COP,
            FfiCurrencyCode::BRL => CurrencyCode::BRL,
        }
    }
}

/// One row of the currency picker.
#[repr(C)]
pub struct FfiCurrencyMeta {
    pub code: FfiCurrencyCode,
    pub code_str: *mut c_char,
    pub symbol: *mut c_char,
    pub display_name: *mut c_char,
    pub flag: *mut c_char,
}

impl FfiCurrencyMeta {
    pub(crate) fn from_core(meta: CurrencyMeta) -> *mut Self {
        Box::into_raw(Box::new(FfiCurrencyMeta {
            code: meta.code.into(),
            code_str: c_string(meta.code.code()),
            symbol: c_string(meta.symbol),
            display_name: c_string(meta.display_name),
            flag: c_string(meta.flag),
        }))
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
pub enum FfiHttpMethod {
    Get = 0,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// `timeout_ms` is 0 when the client carries no timeout hint.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub timeout_ms: u64,
}

impl FfiHttpRequest {
    pub(crate) fn from_core(req: HttpRequest) -> Self {
        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: c_string(k),
                    value: c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        FfiHttpRequest {
            method: req.method.into(),
            url: c_string(req.url),
            headers,
            headers_len,
            timeout_ms: req.timeout_ms.unwrap_or(0),
        }
    }

    /// Free the strings and header array owned by this request.
    pub(crate) fn free_fields(&mut self) {
        free_c_string(self.url);
        self.url = std::ptr::null_mut();
        if !self.headers.is_null() && self.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    self.headers,
                    self.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                free_c_string(h.key);
                free_c_string(h.value);
            }
        }
        self.headers = std::ptr::null_mut();
        self.headers_len = 0;
    }
}

/// Opaque copy of the ticket issued by the controller.
pub struct FfiTicketHandle {
    pub(crate) inner: ConvertTicket,
}

/// A conversion the C caller must perform: execute `request`, then hand the
/// response back with `fx_complete_convert` (or report a transport error
/// with `fx_fail_convert`) together with this ticket.
///
/// `generation`, `base`, `target` and `amount` are for display only.
/// Completion reads `handle` and nothing else.
#[repr(C)]
pub struct FfiConvertTicket {
    pub generation: u64,
    pub base: FfiCurrencyCode,
    pub target: FfiCurrencyCode,
    pub amount: f64,
    pub request: FfiHttpRequest,
    pub handle: *mut FfiTicketHandle,
}

impl FfiConvertTicket {
    pub(crate) fn from_core(ticket: ConvertTicket, request: HttpRequest) -> *mut Self {
        Box::into_raw(Box::new(FfiConvertTicket {
            generation: ticket.generation,
            base: ticket.request.base.into(),
            target: ticket.request.target.into(),
            amount: ticket.request.amount,
            request: FfiHttpRequest::from_core(request),
            handle: Box::into_raw(Box::new(FfiTicketHandle { inner: ticket })),
        }))
    }

    /// The core ticket behind `ticket`, or `None` if it or its handle is null.
    ///
    /// Only the `handle` field is read, so caller edits to the C-visible
    /// fields (including out-of-range enum values) are never observed.
    ///
    /// # Safety
    /// `ticket` must be null or point to a ticket from `fx_trigger_convert`
    /// that has not been freed.
    pub(crate) unsafe fn core_ticket(ticket: *const Self) -> Option<ConvertTicket> {
        if ticket.is_null() {
            return None;
        }
        let handle = unsafe { std::ptr::addr_of!((*ticket).handle).read() };
        if handle.is_null() {
            return None;
        }
        Some(unsafe { (*handle).inner })
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this on the stack after executing the ticket's
/// request. The FFI layer reads but does not free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Results and snapshots
// ---------------------------------------------------------------------------

/// Outcome of `fx_complete_convert` / `fx_fail_convert`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiCompletion {
    Applied = 0,
    Failed = 1,
    Stale = 2,
    NullArg = 3,
    Panic = 4,
}

impl From<Completion> for FfiCompletion {
    fn from(c: Completion) -> Self {
        match c {
            Completion::Applied => FfiCompletion::Applied,
            Completion::Failed => FfiCompletion::Failed,
            Completion::Stale => FfiCompletion::Stale,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiPhase {
    Idle = 0,
    Editing = 1,
    Loading = 2,
    Converted = 3,
    Failed = 4,
}

impl From<Phase> for FfiPhase {
    fn from(p: Phase) -> Self {
        match p {
            Phase::Idle => FfiPhase::Idle,
            Phase::Editing => FfiPhase::Editing,
            Phase::Loading => FfiPhase::Loading,
            Phase::Converted => FfiPhase::Converted,
            Phase::Failed => FfiPhase::Failed,
        }
    }
}

/// `None` when the state holds no failure.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiFailureKind {
    None = 0,
    Transport = 1,
    Http = 2,
    Rejected = 3,
    Malformed = 4,
}

impl From<FailureKind> for FfiFailureKind {
    fn from(k: FailureKind) -> Self {
        match k {
            FailureKind::Transport => FfiFailureKind::Transport,
            FailureKind::Http => FfiFailureKind::Http,
            FailureKind::Rejected => FfiFailureKind::Rejected,
            FailureKind::Malformed => FfiFailureKind::Malformed,
        }
    }
}

/// Copy of the controller state.
///
/// `last_result` is meaningful only when `has_result` is true;
/// `failure_message` is null when `failure_kind` is `None`.
#[repr(C)]
pub struct FfiConversionState {
    pub from: FfiCurrencyCode,
    pub to: FfiCurrencyCode,
    pub raw_amount_text: *mut c_char,
    pub has_converted: bool,
    pub is_loading: bool,
    pub has_result: bool,
    pub last_result: f64,
    pub failure_kind: FfiFailureKind,
    pub failure_message: *mut c_char,
    pub phase: FfiPhase,
}

impl FfiConversionState {
    pub(crate) fn from_core(state: &ConversionState) -> *mut Self {
        let (failure_kind, failure_message) = match &state.last_failure {
            Some(f) => (f.kind.into(), c_string(f.message.as_str())),
            None => (FfiFailureKind::None, std::ptr::null_mut()),
        };
        Box::into_raw(Box::new(FfiConversionState {
            from: state.from.into(),
            to: state.to.into(),
            raw_amount_text: c_string(state.raw_amount_text.as_str()),
            has_converted: state.has_converted,
            is_loading: state.is_loading,
            has_result: state.last_result.is_some(),
            last_result: state.last_result.unwrap_or(0.0),
            failure_kind,
            failure_message,
            phase: state.phase().into(),
        }))
    }
}
