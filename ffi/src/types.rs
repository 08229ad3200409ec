//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! tagged enums with explicit discriminants. Conversion functions live here
//! to keep `lib.rs` focused on the `extern "C"` surface.

use std::ffi::{c_void, CString};
use std::os::raw::c_char;

use character_core::{
    ApiError, CharacterCard, CharacterRecord, CharacterSummary, DetailState, DetailView,
    HttpMethod, ListState, Locale, PageTicket, RecordTicket, StalePolicy, StatusMarker,
};

/// Copy `s` into a heap C string owned by the caller. Interior NULs are
/// dropped rather than failing the whole call.
pub(crate) fn c_string(s: &str) -> *mut c_char {
    CString::new(s.replace('\0', "")).unwrap_or_default().into_raw()
}

/// Free a string produced by `c_string`. Null is ignored.
pub(crate) fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

/// Hand a `Vec` to C as a pointer; null when empty.
fn vec_into_raw<T>(items: Vec<T>) -> *mut T {
    if items.is_empty() {
        return std::ptr::null_mut();
    }
    let mut items = items.into_boxed_slice();
    let ptr = items.as_mut_ptr();
    std::mem::forget(items);
    ptr
}

/// Reclaim a buffer produced by `vec_into_raw`.
///
/// # Safety
/// `ptr` and `len` must come from the same `vec_into_raw` call.
pub(crate) unsafe fn vec_from_raw<T>(ptr: *mut T, len: u32) -> Vec<T> {
    if ptr.is_null() || len == 0 {
        return Vec::new();
    }
    let slice = std::ptr::slice_from_raw_parts_mut(ptr, len as usize);
    unsafe { Box::from_raw(slice) }.into_vec()
}

// ---------------------------------------------------------------------------
// Handles
// ---------------------------------------------------------------------------

/// Opaque handle to a `CharacterClient`.
pub struct FfiCharacterClient {
    pub(crate) inner: character_core::CharacterClient,
}

/// Opaque handle to a list screen's state plus its in-flight page ticket.
pub struct FfiListController {
    pub(crate) state: ListState,
    pub(crate) pending: Option<PageTicket>,
}

/// Opaque handle to a detail screen's state plus its in-flight tickets.
/// Hosts refer to a ticket by its generation token.
pub struct FfiDetailController {
    pub(crate) state: DetailState,
    pub(crate) pending: Vec<RecordTicket>,
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
/// The C caller executes the request and passes the response back through
/// the matching `character_parse_*` or `character_*_complete` function.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub path: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: character_core::HttpRequest) -> *mut Self {
        let headers_len = req.headers.len() as u32;
        let headers = vec_into_raw(
            req.headers
                .iter()
                .map(|(k, v)| FfiHeader {
                    key: c_string(k),
                    value: c_string(v),
                })
                .collect(),
        );
        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            path: c_string(&req.path),
            headers,
            headers_len,
        }))
    }
}

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this on the stack after executing a request. The
/// FFI layer reads but does not free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Character data
// ---------------------------------------------------------------------------

/// A character summary exposed to C.
#[repr(C)]
pub struct FfiCharacter {
    pub id: u32,
    pub name: *mut c_char,
    pub species: *mut c_char,
    pub status: *mut c_char,
    pub image: *mut c_char,
}

impl FfiCharacter {
    pub(crate) fn from_core(c: &CharacterSummary) -> Self {
        Self {
            id: c.id,
            name: c_string(&c.name),
            species: c_string(&c.species),
            status: c_string(&c.status),
            image: c_string(&c.image),
        }
    }

    pub(crate) fn free_fields(&self) {
        free_c_string(self.name);
        free_c_string(self.species);
        free_c_string(self.status);
        free_c_string(self.image);
    }
}

/// A list of character summaries exposed to C.
#[repr(C)]
pub struct FfiCharacterList {
    pub items: *mut FfiCharacter,
    pub len: u32,
}

/// A full character record exposed to C.
#[repr(C)]
pub struct FfiCharacterRecord {
    pub id: u32,
    pub name: *mut c_char,
    pub species: *mut c_char,
    pub status: *mut c_char,
    pub image: *mut c_char,
    pub gender: *mut c_char,
    pub origin_name: *mut c_char,
    pub location_name: *mut c_char,
}

impl FfiCharacterRecord {
    pub(crate) fn from_core(r: &CharacterRecord) -> Self {
        Self {
            id: r.id,
            name: c_string(&r.name),
            species: c_string(&r.species),
            status: c_string(&r.status),
            image: c_string(&r.image),
            gender: c_string(&r.gender),
            origin_name: c_string(&r.origin.name),
            location_name: c_string(&r.location.name),
        }
    }

    pub(crate) fn free_fields(&self) {
        for s in [
            self.name,
            self.species,
            self.status,
            self.image,
            self.gender,
            self.origin_name,
            self.location_name,
        ] {
            free_c_string(s);
        }
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned by parse and complete functions.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    NotFound = 1,
    Http = 2,
    Deserialization = 3,
    Transport = 4,
    Panic = 5,
    NullArg = 6,
    NoPendingRequest = 7,
    Superseded = 8,
}

impl From<&ApiError> for FfiErrorCode {
    fn from(err: &ApiError) -> Self {
        match err {
            ApiError::NotFound => FfiErrorCode::NotFound,
            ApiError::HttpError { .. } => FfiErrorCode::Http,
            ApiError::DeserializationError(_) => FfiErrorCode::Deserialization,
            ApiError::Transport(_) => FfiErrorCode::Transport,
        }
    }
}

/// Tag that tells `character_free_result` what `FfiCharacterResult::data`
/// points to.
#[repr(C)]
pub enum FfiDataTag {
    None = 0,
    Record = 1,
    CharacterList = 2,
}

/// Result envelope for parse operations.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data`
/// points to the parsed payload (tagged by `data_tag`).
/// On failure `error_code` describes the category, `error_message` is a
/// human-readable C string, and `data` is null.
#[repr(C)]
pub struct FfiCharacterResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data_tag: FfiDataTag,
    pub data: *mut c_void,
}

impl FfiCharacterResult {
    fn boxed(self) -> *mut Self {
        Box::into_raw(Box::new(self))
    }

    pub(crate) fn ok_record(record: &CharacterRecord) -> *mut Self {
        let data = Box::into_raw(Box::new(FfiCharacterRecord::from_core(record)));
        FfiCharacterResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            http_status: 0,
            data_tag: FfiDataTag::Record,
            data: data as *mut c_void,
        }
        .boxed()
    }

    pub(crate) fn ok_list(characters: &[CharacterSummary]) -> *mut Self {
        let len = characters.len() as u32;
        let items = vec_into_raw(characters.iter().map(FfiCharacter::from_core).collect());
        let data = Box::into_raw(Box::new(FfiCharacterList { items, len }));
        FfiCharacterResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            http_status: 0,
            data_tag: FfiDataTag::CharacterList,
            data: data as *mut c_void,
        }
        .boxed()
    }

    pub(crate) fn from_error(err: &ApiError) -> *mut Self {
        let http_status = match err {
            ApiError::NotFound => 404,
            ApiError::HttpError { status, .. } => *status,
            _ => 0,
        };
        FfiCharacterResult {
            error_code: err.into(),
            error_message: c_string(&err.to_string()),
            http_status,
            data_tag: FfiDataTag::None,
            data: std::ptr::null_mut(),
        }
        .boxed()
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::failure(FfiErrorCode::NullArg, &format!("null argument: {name}"))
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::failure(FfiErrorCode::Panic, msg)
    }

    fn failure(error_code: FfiErrorCode, msg: &str) -> *mut Self {
        FfiCharacterResult {
            error_code,
            error_message: c_string(msg),
            http_status: 0,
            data_tag: FfiDataTag::None,
            data: std::ptr::null_mut(),
        }
        .boxed()
    }
}

// ---------------------------------------------------------------------------
// Presentation
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiStatusMarker {
    Green = 0,
    Red = 1,
    Yellow = 2,
}

impl From<StatusMarker> for FfiStatusMarker {
    fn from(m: StatusMarker) -> Self {
        match m {
            StatusMarker::Green => FfiStatusMarker::Green,
            StatusMarker::Red => FfiStatusMarker::Red,
            StatusMarker::Yellow => FfiStatusMarker::Yellow,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiLocale {
    PtBr = 0,
    En = 1,
}

impl From<FfiLocale> for Locale {
    fn from(l: FfiLocale) -> Self {
        match l {
            FfiLocale::PtBr => Locale::PtBr,
            FfiLocale::En => Locale::En,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiStalePolicy {
    DiscardSuperseded = 0,
    LastWriterWins = 1,
}

impl From<FfiStalePolicy> for StalePolicy {
    fn from(p: FfiStalePolicy) -> Self {
        match p {
            FfiStalePolicy::DiscardSuperseded => StalePolicy::DiscardSuperseded,
            FfiStalePolicy::LastWriterWins => StalePolicy::LastWriterWins,
        }
    }
}

/// A character ready to render. `key` is set for list rows only.
#[repr(C)]
pub struct FfiCard {
    pub id: u32,
    pub key: *mut c_char,
    pub name: *mut c_char,
    pub image: *mut c_char,
    pub species_label: *mut c_char,
    pub status: FfiStatusMarker,
}

impl FfiCard {
    pub(crate) fn from_core(card: &CharacterCard, key: Option<&str>) -> Self {
        Self {
            id: card.id,
            key: key.map_or(std::ptr::null_mut(), c_string),
            name: c_string(&card.name),
            image: c_string(&card.image),
            species_label: c_string(card.species_label),
            status: card.status.into(),
        }
    }

    pub(crate) fn empty() -> Self {
        Self {
            id: 0,
            key: std::ptr::null_mut(),
            name: std::ptr::null_mut(),
            image: std::ptr::null_mut(),
            species_label: std::ptr::null_mut(),
            status: FfiStatusMarker::Yellow,
        }
    }

    pub(crate) fn free_fields(&self) {
        free_c_string(self.key);
        free_c_string(self.name);
        free_c_string(self.image);
        free_c_string(self.species_label);
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiDetailState {
    Loading = 0,
    NotFound = 1,
    Loaded = 2,
}

/// What the detail screen should show. `message` is set for `NotFound`,
/// `card` is populated for `Loaded`.
#[repr(C)]
pub struct FfiDetailView {
    pub state: FfiDetailState,
    pub message: *mut c_char,
    pub card: FfiCard,
}

impl FfiDetailView {
    pub(crate) fn from_core(view: &DetailView) -> *mut Self {
        let view = match view {
            DetailView::Loading => FfiDetailView {
                state: FfiDetailState::Loading,
                message: std::ptr::null_mut(),
                card: FfiCard::empty(),
            },
            DetailView::NotFound(message) => FfiDetailView {
                state: FfiDetailState::NotFound,
                message: c_string(message),
                card: FfiCard::empty(),
            },
            DetailView::Loaded(card) => FfiDetailView {
                state: FfiDetailState::Loaded,
                message: std::ptr::null_mut(),
                card: FfiCard::from_core(card, None),
            },
        };
        Box::into_raw(Box::new(view))
    }
}
