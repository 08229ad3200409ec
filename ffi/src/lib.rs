//! C-ABI wrapper around `character-core` for mobile hosts.
//!
//! # Overview
//! Exposes request building, response parsing, the list and detail screen
//! state machines, and the display mappings through `extern "C"` functions.
//! The host performs all networking: controller functions hand out an
//! `FfiHttpRequest` when a fetch should start, and the host reports the
//! response back through the matching `*_complete` function.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Controller handles wrap `ListState` / `DetailState` together with their
//!   in-flight tickets, so busy handling is identical to the Rust drivers.
//! - A single `FfiCharacterResult` envelope with `FfiDataTag` + `void* data`
//!   conveys parse payloads and errors uniformly.
//! - The C caller owns all returned pointers and must call the matching
//!   `character_free_*` function to release them.

pub mod types;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use character_core::{
    ApiError, CharacterCard, DetailState, HttpResponse, Labels, ListState, RecordTicket,
    StatusMarker,
};
use tracing::error;

use types::*;

/// Read a borrowed C string. Null and invalid UTF-8 read as `None`.
fn read_str<'a>(s: *const c_char) -> Option<&'a str> {
    if s.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(s) }.to_str().ok()
}

/// Convert an `FfiHttpResponse` to a core `HttpResponse`. A null body reads
/// as an empty string.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    HttpResponse {
        status: resp.status,
        headers: Vec::new(),
        body: read_str(resp.body).unwrap_or("").to_string(),
    }
}

/// A null response pointer means the host never got a response.
fn transport_failure() -> ApiError {
    ApiError::Transport("host reported no response".to_string())
}

fn log_panic(function: &str) {
    error!(function, "panic caught at FFI boundary");
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new `CharacterClient` bound to `base_url`.
///
/// Returns null if `base_url` is null or if an internal panic occurs.
/// The caller must free the returned pointer with `character_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn character_client_new(base_url: *const c_char) -> *mut FfiCharacterClient {
    catch_unwind(|| {
        let Some(url) = read_str(base_url) else {
            return std::ptr::null_mut();
        };
        let client = character_core::CharacterClient::new(url);
        Box::into_raw(Box::new(FfiCharacterClient { inner: client }))
    })
    .unwrap_or_else(|_| {
        log_panic("character_client_new");
        std::ptr::null_mut()
    })
}

/// Free a client created by `character_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn character_client_free(client: *mut FfiCharacterClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Build an HTTP request for one page of characters.
///
/// Returns null if `client` is null.
/// The caller must free the returned pointer with `character_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn character_build_list_page(
    client: *const FfiCharacterClient,
    page: u32,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        FfiHttpRequest::from_core(client.inner.build_list_characters(page))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build an HTTP request for a single character.
///
/// Returns null if `client` is null.
#[unsafe(no_mangle)]
pub extern "C" fn character_build_get(
    client: *const FfiCharacterClient,
    id: u32,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        FfiHttpRequest::from_core(client.inner.build_get_character(id))
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// Parse the response of a page request.
///
/// Returns a result with `data_tag = CharacterList` on success.
#[unsafe(no_mangle)]
pub extern "C" fn character_parse_list_page(
    client: *const FfiCharacterClient,
    response: *const FfiHttpResponse,
) -> *mut FfiCharacterResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiCharacterResult::null_arg("client");
        }
        if response.is_null() {
            return FfiCharacterResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        match client.inner.parse_list_characters(ffi_response_to_core(resp)) {
            Ok(page) => FfiCharacterResult::ok_list(&page.results),
            Err(e) => FfiCharacterResult::from_error(&e),
        }
    })
    .unwrap_or_else(|_| FfiCharacterResult::panic("panic in character_parse_list_page"))
}

/// Parse the response of a single-character request.
///
/// Returns a result with `data_tag = Record` on success.
#[unsafe(no_mangle)]
pub extern "C" fn character_parse_get(
    client: *const FfiCharacterClient,
    response: *const FfiHttpResponse,
) -> *mut FfiCharacterResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiCharacterResult::null_arg("client");
        }
        if response.is_null() {
            return FfiCharacterResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        match client.inner.parse_get_character(ffi_response_to_core(resp)) {
            Ok(record) => FfiCharacterResult::ok_record(&record),
            Err(e) => FfiCharacterResult::from_error(&e),
        }
    })
    .unwrap_or_else(|_| FfiCharacterResult::panic("panic in character_parse_get"))
}

// ---------------------------------------------------------------------------
// List controller
// ---------------------------------------------------------------------------

/// Create list screen state: no items, page 1, not busy.
/// Free with `character_list_free`.
#[unsafe(no_mangle)]
pub extern "C" fn character_list_new() -> *mut FfiListController {
    Box::into_raw(Box::new(FfiListController {
        state: ListState::new(),
        pending: None,
    }))
}

/// Free a list handle. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn character_list_free(list: *mut FfiListController) {
    if !list.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(list) });
        });
    }
}

/// Shared body of the list trigger functions: run `start` against the
/// state and turn a granted ticket into a request for the host.
fn list_trigger(
    list: *mut FfiListController,
    client: *const FfiCharacterClient,
    start: impl FnOnce(&mut ListState) -> Option<character_core::PageTicket>,
) -> *mut FfiHttpRequest {
    if list.is_null() || client.is_null() {
        return std::ptr::null_mut();
    }
    let list = unsafe { &mut *list };
    let client = unsafe { &*client };
    match start(&mut list.state) {
        Some(ticket) => {
            let req = client.inner.build_list_characters(ticket.target());
            list.pending = Some(ticket);
            FfiHttpRequest::from_core(req)
        }
        None => std::ptr::null_mut(),
    }
}

/// The list screen became active. Returns the request for page 1 on first
/// activation, null otherwise.
#[unsafe(no_mangle)]
pub extern "C" fn character_list_activate(
    list: *mut FfiListController,
    client: *const FfiCharacterClient,
) -> *mut FfiHttpRequest {
    catch_unwind(AssertUnwindSafe(|| list_trigger(list, client, ListState::activate)))
        .unwrap_or(std::ptr::null_mut())
}

/// Request the page after the current cursor. Returns null while a page is
/// already in flight.
#[unsafe(no_mangle)]
pub extern "C" fn character_list_end_reached(
    list: *mut FfiListController,
    client: *const FfiCharacterClient,
) -> *mut FfiHttpRequest {
    catch_unwind(AssertUnwindSafe(|| list_trigger(list, client, ListState::end_reached)))
        .unwrap_or(std::ptr::null_mut())
}

/// Report the scroll position. Returns a request for the next page when
/// `last_visible` is within `threshold × visible_count` rows of the end.
#[unsafe(no_mangle)]
pub extern "C" fn character_list_scrolled(
    list: *mut FfiListController,
    client: *const FfiCharacterClient,
    last_visible: u32,
    visible_count: u32,
    threshold: f32,
) -> *mut FfiHttpRequest {
    catch_unwind(AssertUnwindSafe(|| {
        list_trigger(list, client, |state| {
            if state.is_near_end(last_visible as usize, visible_count as usize, threshold) {
                state.end_reached()
            } else {
                None
            }
        })
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Hand the response for the in-flight page back to the list.
///
/// Pass a null `response` when the request failed without a response. The
/// busy flag is always released. The return value reports the fetch outcome
/// for diagnostics; list state has already been updated either way.
#[unsafe(no_mangle)]
pub extern "C" fn character_list_complete(
    list: *mut FfiListController,
    client: *const FfiCharacterClient,
    response: *const FfiHttpResponse,
) -> FfiErrorCode {
    catch_unwind(AssertUnwindSafe(|| {
        if list.is_null() || client.is_null() {
            return FfiErrorCode::NullArg;
        }
        let list = unsafe { &mut *list };
        let client = unsafe { &*client };
        let Some(ticket) = list.pending.take() else {
            return FfiErrorCode::NoPendingRequest;
        };
        let outcome = if response.is_null() {
            Err(transport_failure())
        } else {
            let resp = unsafe { &*response };
            client
                .inner
                .parse_list_characters(ffi_response_to_core(resp))
                .map(|page| page.results)
        };
        let code = match &outcome {
            Ok(_) => FfiErrorCode::Ok,
            Err(e) => e.into(),
        };
        list.state.finish(ticket, outcome);
        code
    }))
    .unwrap_or_else(|_| {
        log_panic("character_list_complete");
        FfiErrorCode::Panic
    })
}

/// Number of loaded items. Zero for null.
#[unsafe(no_mangle)]
pub extern "C" fn character_list_len(list: *const FfiListController) -> u32 {
    if list.is_null() {
        return 0;
    }
    unsafe { &*list }.state.items().len() as u32
}

/// Current page cursor. Zero for null.
#[unsafe(no_mangle)]
pub extern "C" fn character_list_page(list: *const FfiListController) -> u32 {
    if list.is_null() {
        return 0;
    }
    unsafe { &*list }.state.page()
}

/// Whether a page is in flight (show the footer spinner).
#[unsafe(no_mangle)]
pub extern "C" fn character_list_busy(list: *const FfiListController) -> bool {
    !list.is_null() && unsafe { &*list }.state.is_busy()
}

/// Render row `index` with labels for `locale`. Returns null when out of
/// range. Free with `character_free_card`.
#[unsafe(no_mangle)]
pub extern "C" fn character_list_card(
    list: *const FfiListController,
    index: u32,
    locale: FfiLocale,
) -> *mut FfiCard {
    catch_unwind(|| {
        if list.is_null() {
            return std::ptr::null_mut();
        }
        let list = unsafe { &*list };
        let index = index as usize;
        let Some(item) = list.state.items().get(index) else {
            return std::ptr::null_mut();
        };
        let labels = Labels::for_locale(locale.into());
        let card = CharacterCard::from_summary(item, &labels);
        let key = format!("{}-{index}", card.name);
        Box::into_raw(Box::new(FfiCard::from_core(&card, Some(&key))))
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Detail controller
// ---------------------------------------------------------------------------

/// Create detail screen state: busy, no record. Free with
/// `character_detail_free`.
#[unsafe(no_mangle)]
pub extern "C" fn character_detail_new(policy: FfiStalePolicy) -> *mut FfiDetailController {
    Box::into_raw(Box::new(FfiDetailController {
        state: DetailState::new(policy.into()),
        pending: Vec::new(),
    }))
}

/// Free a detail handle. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn character_detail_free(detail: *mut FfiDetailController) {
    if !detail.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(detail) });
        });
    }
}

/// Remove the pending ticket issued under `token`.
fn take_detail_ticket(detail: &mut FfiDetailController, token: u64) -> Option<RecordTicket> {
    let pos = detail.pending.iter().position(|t| t.generation() == token)?;
    Some(detail.pending.remove(pos))
}

/// The detail screen became active for `id`. Returns the request to execute
/// and writes its token to `out_token`; pass that token to
/// `character_detail_complete` or `character_detail_abandon`.
///
/// Returns null if any pointer argument is null.
#[unsafe(no_mangle)]
pub extern "C" fn character_detail_focus(
    detail: *mut FfiDetailController,
    client: *const FfiCharacterClient,
    id: u32,
    out_token: *mut u64,
) -> *mut FfiHttpRequest {
    catch_unwind(AssertUnwindSafe(|| {
        if detail.is_null() || client.is_null() || out_token.is_null() {
            return std::ptr::null_mut();
        }
        let detail = unsafe { &mut *detail };
        let client = unsafe { &*client };
        let ticket = detail.state.begin(id);
        unsafe { *out_token = ticket.generation() };
        detail.pending.push(ticket);
        FfiHttpRequest::from_core(client.inner.build_get_character(id))
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Hand the response for the request issued under `token` back to the
/// detail screen. Pass a null `response` when the request failed without a
/// response.
///
/// Returns `Superseded` when a newer request owns the screen and this
/// completion was discarded; otherwise the fetch outcome.
#[unsafe(no_mangle)]
pub extern "C" fn character_detail_complete(
    detail: *mut FfiDetailController,
    client: *const FfiCharacterClient,
    token: u64,
    response: *const FfiHttpResponse,
) -> FfiErrorCode {
    catch_unwind(AssertUnwindSafe(|| {
        if detail.is_null() || client.is_null() {
            return FfiErrorCode::NullArg;
        }
        let detail = unsafe { &mut *detail };
        let client = unsafe { &*client };
        let Some(ticket) = take_detail_ticket(detail, token) else {
            return FfiErrorCode::NoPendingRequest;
        };
        let outcome = if response.is_null() {
            Err(transport_failure())
        } else {
            let resp = unsafe { &*response };
            client.inner.parse_get_character(ffi_response_to_core(resp))
        };
        let code = match &outcome {
            Ok(_) => FfiErrorCode::Ok,
            Err(e) => e.into(),
        };
        if detail.state.finish(ticket, outcome) {
            code
        } else {
            FfiErrorCode::Superseded
        }
    }))
    .unwrap_or_else(|_| {
        log_panic("character_detail_complete");
        FfiErrorCode::Panic
    })
}

/// The host gave up on the request issued under `token`. Releases busy if
/// it was the latest request.
#[unsafe(no_mangle)]
pub extern "C" fn character_detail_abandon(
    detail: *mut FfiDetailController,
    token: u64,
) -> FfiErrorCode {
    catch_unwind(AssertUnwindSafe(|| {
        if detail.is_null() {
            return FfiErrorCode::NullArg;
        }
        let detail = unsafe { &mut *detail };
        match take_detail_ticket(detail, token) {
            Some(ticket) => {
                detail.state.abandon(ticket);
                FfiErrorCode::Ok
            }
            None => FfiErrorCode::NoPendingRequest,
        }
    }))
    .unwrap_or_else(|_| {
        log_panic("character_detail_abandon");
        FfiErrorCode::Panic
    })
}

/// Whether the detail screen should show its spinner. True for null.
#[unsafe(no_mangle)]
pub extern "C" fn character_detail_busy(detail: *const FfiDetailController) -> bool {
    detail.is_null() || unsafe { &*detail }.state.is_busy()
}

/// Derive what the detail screen shows. Free with
/// `character_free_detail_view`.
#[unsafe(no_mangle)]
pub extern "C" fn character_detail_view(
    detail: *const FfiDetailController,
    locale: FfiLocale,
) -> *mut FfiDetailView {
    catch_unwind(|| {
        if detail.is_null() {
            return std::ptr::null_mut();
        }
        let detail = unsafe { &*detail };
        FfiDetailView::from_core(&detail.state.view(&Labels::for_locale(locale.into())))
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Display mappings
// ---------------------------------------------------------------------------

/// Localized species label. Null `species` maps like any non-human value.
/// Free with `character_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn character_species_label(
    species: *const c_char,
    locale: FfiLocale,
) -> *mut c_char {
    catch_unwind(|| {
        let labels = Labels::for_locale(locale.into());
        c_string(labels.species(read_str(species).unwrap_or("")))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Status marker for a status string. Null maps to `Yellow`.
#[unsafe(no_mangle)]
pub extern "C" fn character_status_marker(status: *const c_char) -> FfiStatusMarker {
    StatusMarker::from_status(read_str(status).unwrap_or("")).into()
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn character_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.path);
        for h in unsafe { vec_from_raw(req.headers, req.headers_len) } {
            free_c_string(h.key);
            free_c_string(h.value);
        }
    });
}

/// Free an `FfiCharacterResult`. Safe to call with null. Uses `data_tag` to
/// determine what `data` points to.
#[unsafe(no_mangle)]
pub extern "C" fn character_free_result(result: *mut FfiCharacterResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        if result.data.is_null() {
            return;
        }
        match result.data_tag {
            FfiDataTag::Record => {
                let record = unsafe { Box::from_raw(result.data as *mut FfiCharacterRecord) };
                record.free_fields();
            }
            FfiDataTag::CharacterList => {
                let list = unsafe { Box::from_raw(result.data as *mut FfiCharacterList) };
                for item in unsafe { vec_from_raw(list.items, list.len) } {
                    item.free_fields();
                }
            }
            FfiDataTag::None => {}
        }
    });
}

/// Free an `FfiCard`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn character_free_card(card: *mut FfiCard) {
    if !card.is_null() {
        let _ = catch_unwind(|| {
            unsafe { Box::from_raw(card) }.free_fields();
        });
    }
}

/// Free an `FfiDetailView`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn character_free_detail_view(view: *mut FfiDetailView) {
    if !view.is_null() {
        let _ = catch_unwind(|| {
            let view = unsafe { Box::from_raw(view) };
            free_c_string(view.message);
            view.card.free_fields();
        });
    }
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn character_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| free_c_string(s));
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
