//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! enums with explicit discriminants. Conversion functions live here to keep
//! `lib.rs` focused on the `extern "C"` surface.

use std::ffi::{c_char, CStr, CString};

use shopping_core::error::{GeocodingError, ListError};
use shopping_core::permission::{RATIONALE_MESSAGE, SETTINGS_MESSAGE};
use shopping_core::{
    FlowAction, GeocodingClient, HttpMethod, ItemView, LocationRequest, LocationStore, Permission,
    PermissionFlow, PermissionState, Priority, ShoppingListController, ADDRESS_NOT_FOUND,
};

/// Opaque handle owning the list and the latest known location.
pub struct FfiShoppingList {
    pub(crate) list: ShoppingListController,
    pub(crate) store: LocationStore,
}

/// Opaque handle to a `GeocodingClient`.
pub struct FfiGeocodingClient {
    pub(crate) inner: GeocodingClient,
}

/// Opaque handle to a `PermissionFlow`.
pub struct FfiPermissionFlow {
    pub(crate) inner: PermissionFlow,
}

/// Copy `s` into a heap C string owned by the caller. Interior NULs are
/// dropped rather than failing the whole call.
pub(crate) fn to_c_string(s: String) -> *mut c_char {
    let cleaned = if s.contains('\0') { s.replace('\0', "") } else { s };
    CString::new(cleaned).unwrap_or_default().into_raw()
}

/// Read a borrowed C string. Null becomes `None`; invalid UTF-8 is replaced.
pub(crate) fn from_c_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        None
    } else {
        Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
    }
}

pub(crate) fn free_c_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(unsafe { CString::from_raw(ptr) });
    }
}

// ---------------------------------------------------------------------------
// Error codes
// ---------------------------------------------------------------------------

/// Error codes shared by every result envelope.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    EmptyName = 1,
    InvalidQuantity = 2,
    ItemNotFound = 3,
    Network = 4,
    HttpStatus = 5,
    InvalidResponse = 6,
    Rejected = 7,
    InvalidConfig = 8,
    Panic = 9,
    NullArg = 10,
}

impl From<&ListError> for FfiErrorCode {
    fn from(err: &ListError) -> Self {
        match err {
            ListError::EmptyName => FfiErrorCode::EmptyName,
            ListError::InvalidQuantity { .. } => FfiErrorCode::InvalidQuantity,
            ListError::ItemNotFound(_) => FfiErrorCode::ItemNotFound,
        }
    }
}

impl From<&GeocodingError> for FfiErrorCode {
    fn from(err: &GeocodingError) -> Self {
        match err {
            GeocodingError::Network(_) => FfiErrorCode::Network,
            GeocodingError::HttpStatus { .. } => FfiErrorCode::HttpStatus,
            GeocodingError::InvalidResponse(_) => FfiErrorCode::InvalidResponse,
            GeocodingError::Rejected { .. } => FfiErrorCode::Rejected,
        }
    }
}

// ---------------------------------------------------------------------------
// List types
// ---------------------------------------------------------------------------

/// Outcome of an add or save-edit.
///
/// On success `error_code` is `Ok`, `error_message` is null and `item_id`
/// is the affected item. On failure `item_id` is 0.
#[repr(C)]
pub struct FfiListResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub item_id: u64,
}

impl FfiListResult {
    pub(crate) fn ok(item_id: u64) -> *mut Self {
        Box::into_raw(Box::new(FfiListResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            item_id,
        }))
    }

    pub(crate) fn from_error(err: ListError) -> *mut Self {
        Self::failure((&err).into(), err.to_string())
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::failure(FfiErrorCode::NullArg, format!("null argument: {name}"))
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::failure(FfiErrorCode::Panic, msg.to_string())
    }

    fn failure(error_code: FfiErrorCode, msg: String) -> *mut Self {
        Box::into_raw(Box::new(FfiListResult {
            error_code,
            error_message: to_c_string(msg),
            item_id: 0,
        }))
    }
}

/// One row of the list exposed to C.
#[repr(C)]
pub struct FfiShoppingItem {
    pub id: u64,
    pub name: *mut c_char,
    pub quantity: i32,
    pub is_editing: bool,
    pub address: *mut c_char,
}

impl From<ItemView> for FfiShoppingItem {
    fn from(view: ItemView) -> Self {
        FfiShoppingItem {
            id: view.id.0,
            name: to_c_string(view.name),
            quantity: view.quantity,
            is_editing: view.is_editing,
            address: to_c_string(view.address),
        }
    }
}

/// Snapshot of the whole list in insertion order.
#[repr(C)]
pub struct FfiItemList {
    pub items: *mut FfiShoppingItem,
    pub len: u32,
}

impl FfiItemList {
    pub(crate) fn from_views(views: Vec<ItemView>) -> *mut Self {
        let len = views.len() as u32;
        let items = if views.is_empty() {
            std::ptr::null_mut()
        } else {
            let boxed: Box<[FfiShoppingItem]> =
                views.into_iter().map(FfiShoppingItem::from).collect();
            Box::into_raw(boxed) as *mut FfiShoppingItem
        };
        Box::into_raw(Box::new(FfiItemList { items, len }))
    }
}

// ---------------------------------------------------------------------------
// Geocoding request / response
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
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

/// A geocoding request for the host to execute.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
}

impl FfiHttpRequest {
    pub(crate) fn from_core(req: shopping_core::HttpRequest) -> *mut Self {
        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let boxed: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: to_c_string(k),
                    value: to_c_string(v),
                })
                .collect();
            Box::into_raw(boxed) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url: to_c_string(req.url),
            headers,
            headers_len,
        }))
    }
}

/// The host's answer to an `FfiHttpRequest`.
///
/// Built by the caller, usually on the stack. The FFI layer reads but does
/// not free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

/// Outcome of parsing a geocoding response.
///
/// `address` is always set: the resolved address on success, otherwise the
/// "Address Not Found" sentinel, so the host can display it unconditionally.
#[repr(C)]
pub struct FfiAddressResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub address: *mut c_char,
}

impl FfiAddressResult {
    pub(crate) fn ok(address: String) -> *mut Self {
        Box::into_raw(Box::new(FfiAddressResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            http_status: 200,
            address: to_c_string(address),
        }))
    }

    pub(crate) fn from_error(err: GeocodingError) -> *mut Self {
        let http_status = match &err {
            GeocodingError::HttpStatus { status, .. } => *status,
            GeocodingError::Rejected { .. } | GeocodingError::InvalidResponse(_) => 200,
            GeocodingError::Network(_) => 0,
        };
        Self::failure((&err).into(), err.to_string(), http_status)
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::failure(FfiErrorCode::NullArg, format!("null argument: {name}"), 0)
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::failure(FfiErrorCode::Panic, msg.to_string(), 0)
    }

    fn failure(error_code: FfiErrorCode, msg: String, http_status: u16) -> *mut Self {
        Box::into_raw(Box::new(FfiAddressResult {
            error_code,
            error_message: to_c_string(msg),
            http_status,
            address: to_c_string(ADDRESS_NOT_FOUND.to_string()),
        }))
    }
}

// ---------------------------------------------------------------------------
// Permission flow
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiPermissionState {
    Unrequested = 0,
    Pending = 1,
    Granted = 2,
    DeniedSoft = 3,
    DeniedHard = 4,
}

impl From<PermissionState> for FfiPermissionState {
    fn from(state: PermissionState) -> Self {
        use shopping_core::Denial;
        match state {
            PermissionState::Unrequested => FfiPermissionState::Unrequested,
            PermissionState::Pending => FfiPermissionState::Pending,
            PermissionState::Granted => FfiPermissionState::Granted,
            PermissionState::Denied(Denial::Soft) => FfiPermissionState::DeniedSoft,
            PermissionState::Denied(Denial::Hard) => FfiPermissionState::DeniedHard,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiFlowActionKind {
    None = 0,
    RequestPermissions = 1,
    StartUpdates = 2,
    ShowMessage = 3,
}

pub const FFI_PERMISSION_FINE: u32 = 1 << 0;
pub const FFI_PERMISSION_COARSE: u32 = 1 << 1;

/// What the host should do next.
///
/// `permissions` is a bitmask of `FFI_PERMISSION_*` for
/// `RequestPermissions`. `message` points to a static string for
/// `ShowMessage` and must not be freed; it is null otherwise.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct FfiFlowAction {
    pub kind: FfiFlowActionKind,
    pub permissions: u32,
    pub message: *const c_char,
}

const RATIONALE_C: &CStr = c"Location Permission is required for this feature to work";
const SETTINGS_C: &CStr = c"Location Permission is required: enable in device settings";

impl FfiFlowAction {
    pub(crate) fn none() -> Self {
        FfiFlowAction {
            kind: FfiFlowActionKind::None,
            permissions: 0,
            message: std::ptr::null(),
        }
    }
}

impl From<FlowAction> for FfiFlowAction {
    fn from(action: FlowAction) -> Self {
        match action {
            FlowAction::None => FfiFlowAction::none(),
            FlowAction::StartUpdates => FfiFlowAction {
                kind: FfiFlowActionKind::StartUpdates,
                ..FfiFlowAction::none()
            },
            FlowAction::RequestPermissions(permissions) => FfiFlowAction {
                kind: FfiFlowActionKind::RequestPermissions,
                permissions: permissions.iter().fold(0, |mask, p| {
                    mask | match p {
                        Permission::FineLocation => FFI_PERMISSION_FINE,
                        Permission::CoarseLocation => FFI_PERMISSION_COARSE,
                    }
                }),
                message: std::ptr::null(),
            },
            FlowAction::ShowMessage(message) => {
                let message = if message == RATIONALE_MESSAGE {
                    RATIONALE_C
                } else {
                    debug_assert_eq!(message, SETTINGS_MESSAGE);
                    SETTINGS_C
                };
                FfiFlowAction {
                    kind: FfiFlowActionKind::ShowMessage,
                    permissions: 0,
                    message: message.as_ptr(),
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Location request
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiPriority {
    HighAccuracy = 0,
    Balanced = 1,
    LowPower = 2,
    Passive = 3,
}

/// Subscription parameters for the host's location service.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct FfiLocationRequest {
    pub priority: FfiPriority,
    pub interval_ms: u64,
}

impl From<LocationRequest> for FfiLocationRequest {
    fn from(request: LocationRequest) -> Self {
        let priority = match request.priority {
            Priority::HighAccuracy => FfiPriority::HighAccuracy,
            Priority::Balanced => FfiPriority::Balanced,
            Priority::LowPower => FfiPriority::LowPower,
            Priority::Passive => FfiPriority::Passive,
        };
        FfiLocationRequest {
            priority,
            interval_ms: request.interval.as_millis() as u64,
        }
    }
}
