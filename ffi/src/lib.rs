//! C-ABI wrapper around `shopping-core` for the mobile host.
//!
//! # Overview
//! The host keeps the UI, the permission prompt, the OS location service and
//! the HTTP stack. Through this library it hands user intents and location
//! fixes to the core and gets back list snapshots, geocoding requests to
//! execute, and the next step of the permission flow.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Geocoding mirrors the core's `build_*` / `parse_*` split: the host runs
//!   the request in between.
//! - Results that carry strings are heap envelopes. The caller owns every
//!   returned pointer and must release it with the matching `shopping_free_*`
//!   function. Strings inside `FfiFlowAction` are static and never freed.

pub mod types;

use std::ffi::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use shopping_core::{
    AppConfig, GeocodingClient, HttpResponse, ItemId, LocationCoordinate, LocationRequest,
    LocationStore, PermissionFlow, PermissionGrant, ShoppingListController,
};
use tracing::warn;

use types::*;

// ---------------------------------------------------------------------------
// Shopping list
// ---------------------------------------------------------------------------

/// Create an empty shopping list.
///
/// The caller must free the returned pointer with `shopping_list_free`.
#[unsafe(no_mangle)]
pub extern "C" fn shopping_list_new() -> *mut FfiShoppingList {
    catch_unwind(|| {
        Box::into_raw(Box::new(FfiShoppingList {
            list: ShoppingListController::new(),
            store: LocationStore::new(),
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a list created by `shopping_list_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn shopping_list_free(list: *mut FfiShoppingList) {
    if !list.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(list) });
        }));
    }
}

/// Add an item.
///
/// `address` may be null, in which case the list's current address is used
/// (empty until one has been resolved). A blank `name` or a non-integer
/// `quantity` is reported through `error_code`; the list is unchanged.
#[unsafe(no_mangle)]
pub extern "C" fn shopping_list_add_item(
    list: *mut FfiShoppingList,
    name: *const c_char,
    quantity: *const c_char,
    address: *const c_char,
) -> *mut FfiListResult {
    catch_unwind(AssertUnwindSafe(|| {
        if list.is_null() {
            return FfiListResult::null_arg("list");
        }
        let list = unsafe { &mut *list };
        let name = from_c_str(name).unwrap_or_default();
        let quantity = from_c_str(quantity).unwrap_or_default();
        let address = from_c_str(address).unwrap_or_else(|| list.store.current_address());
        match list.list.add_item(&name, &quantity, &address) {
            Ok(id) => FfiListResult::ok(id.0),
            Err(e) => FfiListResult::from_error(e),
        }
    }))
    .unwrap_or_else(|_| {
        warn!("panic in shopping_list_add_item");
        FfiListResult::panic("panic in shopping_list_add_item")
    })
}

/// Open the editor for `id`, closing any other. Returns false if `id` is
/// not in the list (nothing is selected then).
#[unsafe(no_mangle)]
pub extern "C" fn shopping_list_begin_edit(list: *mut FfiShoppingList, id: u64) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if list.is_null() {
            return false;
        }
        let list = unsafe { &mut *list };
        list.list.begin_edit(ItemId(id))
    }))
    .unwrap_or(false)
}

/// Close the editor without saving.
#[unsafe(no_mangle)]
pub extern "C" fn shopping_list_cancel_edit(list: *mut FfiShoppingList) {
    if list.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let list = unsafe { &mut *list };
        list.list.cancel_edit();
    }));
}

/// Save the editor for `id`.
///
/// `address` may be null, in which case the list's current address is used.
/// On a validation error the editor stays open.
#[unsafe(no_mangle)]
pub extern "C" fn shopping_list_complete_edit(
    list: *mut FfiShoppingList,
    id: u64,
    name: *const c_char,
    quantity: *const c_char,
    address: *const c_char,
) -> *mut FfiListResult {
    catch_unwind(AssertUnwindSafe(|| {
        if list.is_null() {
            return FfiListResult::null_arg("list");
        }
        let list = unsafe { &mut *list };
        let name = from_c_str(name).unwrap_or_default();
        let quantity = from_c_str(quantity).unwrap_or_default();
        let address = from_c_str(address).unwrap_or_else(|| list.store.current_address());
        match list.list.complete_edit(ItemId(id), &name, &quantity, &address) {
            Ok(()) => FfiListResult::ok(id),
            Err(e) => FfiListResult::from_error(e),
        }
    }))
    .unwrap_or_else(|_| {
        warn!("panic in shopping_list_complete_edit");
        FfiListResult::panic("panic in shopping_list_complete_edit")
    })
}

/// Remove `id`. Returns whether an item was removed; absent ids are not an
/// error.
#[unsafe(no_mangle)]
pub extern "C" fn shopping_list_delete_item(list: *mut FfiShoppingList, id: u64) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if list.is_null() {
            return false;
        }
        let list = unsafe { &mut *list };
        list.list.delete_item(ItemId(id))
    }))
    .unwrap_or(false)
}

/// Snapshot of every row. Free with `shopping_free_item_list`.
///
/// Returns null if `list` is null.
#[unsafe(no_mangle)]
pub extern "C" fn shopping_list_items(list: *const FfiShoppingList) -> *mut FfiItemList {
    catch_unwind(AssertUnwindSafe(|| {
        if list.is_null() {
            return std::ptr::null_mut();
        }
        let list = unsafe { &*list };
        FfiItemList::from_views(list.list.views())
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Record a location fix from the platform.
#[unsafe(no_mangle)]
pub extern "C" fn shopping_list_update_location(
    list: *mut FfiShoppingList,
    latitude: f64,
    longitude: f64,
) {
    if list.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let list = unsafe { &*list };
        list.store
            .update_location(LocationCoordinate::new(latitude, longitude));
    }));
}

/// Record the address resolved for a fix.
///
/// Returns false, storing nothing, when the list has since moved to a
/// different location or when an argument is null.
#[unsafe(no_mangle)]
pub extern "C" fn shopping_list_set_address(
    list: *mut FfiShoppingList,
    latitude: f64,
    longitude: f64,
    address: *const c_char,
) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if list.is_null() {
            return false;
        }
        let Some(address) = from_c_str(address) else {
            return false;
        };
        let list = unsafe { &*list };
        list.store
            .set_address(LocationCoordinate::new(latitude, longitude), address)
    }))
    .unwrap_or(false)
}

/// The address new items are stamped with. Free with `shopping_free_string`.
///
/// Returns null if `list` is null.
#[unsafe(no_mangle)]
pub extern "C" fn shopping_list_current_address(list: *const FfiShoppingList) -> *mut c_char {
    catch_unwind(AssertUnwindSafe(|| {
        if list.is_null() {
            return std::ptr::null_mut();
        }
        let list = unsafe { &*list };
        to_c_string(list.store.current_address())
    }))
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Geocoding
// ---------------------------------------------------------------------------

/// Create a geocoding client for `base_url` with `api_key`.
///
/// Returns null if either argument is null. Free with
/// `shopping_geocoding_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn shopping_geocoding_client_new(
    base_url: *const c_char,
    api_key: *const c_char,
) -> *mut FfiGeocodingClient {
    catch_unwind(|| {
        let (Some(base_url), Some(api_key)) = (from_c_str(base_url), from_c_str(api_key)) else {
            return std::ptr::null_mut();
        };
        let inner = GeocodingClient::new(&base_url, &api_key);
        Box::into_raw(Box::new(FfiGeocodingClient { inner }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Create a geocoding client from the app's JSON configuration.
///
/// Returns null if `config_json` is null or invalid (bad JSON, missing API
/// key, zero location interval).
#[unsafe(no_mangle)]
pub extern "C" fn shopping_geocoding_client_from_json(
    config_json: *const c_char,
) -> *mut FfiGeocodingClient {
    catch_unwind(|| {
        let Some(json) = from_c_str(config_json) else {
            return std::ptr::null_mut();
        };
        match AppConfig::from_json(&json) {
            Ok(config) => Box::into_raw(Box::new(FfiGeocodingClient {
                inner: GeocodingClient::from_config(&config.geocoder),
            })),
            Err(e) => {
                warn!(error = %e, "rejected geocoder config");
                std::ptr::null_mut()
            }
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn shopping_geocoding_client_free(client: *mut FfiGeocodingClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

/// Build the reverse-geocoding request for a coordinate.
///
/// Returns null if `client` is null. Free with `shopping_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn shopping_build_reverse_geocode(
    client: *const FfiGeocodingClient,
    latitude: f64,
    longitude: f64,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let req = client
            .inner
            .build_reverse_geocode(LocationCoordinate::new(latitude, longitude));
        FfiHttpRequest::from_core(req)
    })
    .unwrap_or(std::ptr::null_mut())
}

fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    HttpResponse::new(resp.status, from_c_str(resp.body).unwrap_or_default())
}

/// Parse the host's response to a reverse-geocoding request.
///
/// `address` in the result is always set; on failure it holds the
/// "Address Not Found" sentinel. Free with `shopping_free_address_result`.
#[unsafe(no_mangle)]
pub extern "C" fn shopping_parse_reverse_geocode(
    client: *const FfiGeocodingClient,
    response: *const FfiHttpResponse,
) -> *mut FfiAddressResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiAddressResult::null_arg("client");
        }
        if response.is_null() {
            return FfiAddressResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        match client.inner.parse_reverse_geocode(ffi_response_to_core(resp)) {
            Ok(address) => FfiAddressResult::ok(address),
            Err(e) => {
                warn!(error = %e, "reverse geocoding failed");
                FfiAddressResult::from_error(e)
            }
        }
    })
    .unwrap_or_else(|_| FfiAddressResult::panic("panic in shopping_parse_reverse_geocode"))
}

// ---------------------------------------------------------------------------
// Permission flow and location request
// ---------------------------------------------------------------------------

/// Create a permission flow in the `Unrequested` state.
#[unsafe(no_mangle)]
pub extern "C" fn shopping_permission_flow_new() -> *mut FfiPermissionFlow {
    catch_unwind(|| {
        Box::into_raw(Box::new(FfiPermissionFlow {
            inner: PermissionFlow::new(),
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a flow. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn shopping_permission_flow_free(flow: *mut FfiPermissionFlow) {
    if !flow.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(flow) });
        });
    }
}

/// The user pressed "Address". `already_granted` is the host's live check
/// of both location permissions.
#[unsafe(no_mangle)]
pub extern "C" fn shopping_permission_request_address(
    flow: *mut FfiPermissionFlow,
    already_granted: bool,
) -> FfiFlowAction {
    catch_unwind(AssertUnwindSafe(|| {
        if flow.is_null() {
            return FfiFlowAction::none();
        }
        let flow = unsafe { &mut *flow };
        flow.inner.request_address(already_granted).into()
    }))
    .unwrap_or_else(|_| FfiFlowAction::none())
}

/// The OS permission prompt returned.
#[unsafe(no_mangle)]
pub extern "C" fn shopping_permission_on_result(
    flow: *mut FfiPermissionFlow,
    fine_granted: bool,
    coarse_granted: bool,
    rationale_required: bool,
) -> FfiFlowAction {
    catch_unwind(AssertUnwindSafe(|| {
        if flow.is_null() {
            return FfiFlowAction::none();
        }
        let flow = unsafe { &mut *flow };
        let grant = PermissionGrant {
            fine: fine_granted,
            coarse: coarse_granted,
        };
        flow.inner.on_permission_result(grant, rationale_required).into()
    }))
    .unwrap_or_else(|_| FfiFlowAction::none())
}

/// Current state of the flow. A null `flow` reads as `Unrequested`.
#[unsafe(no_mangle)]
pub extern "C" fn shopping_permission_state(flow: *const FfiPermissionFlow) -> FfiPermissionState {
    catch_unwind(|| {
        if flow.is_null() {
            return FfiPermissionState::Unrequested;
        }
        let flow = unsafe { &*flow };
        flow.inner.state().into()
    })
    .unwrap_or(FfiPermissionState::Unrequested)
}

/// Parameters to subscribe the platform location service with.
#[unsafe(no_mangle)]
pub extern "C" fn shopping_location_request_default() -> FfiLocationRequest {
    LocationRequest::default().into()
}

/// Location parameters from the app's JSON configuration (the `location`
/// section, defaults filled in).
///
/// Writes `out` and returns `Ok` on success. On a null argument or an
/// invalid config `out` is left untouched.
#[unsafe(no_mangle)]
pub extern "C" fn shopping_location_request_from_json(
    config_json: *const c_char,
    out: *mut FfiLocationRequest,
) -> FfiErrorCode {
    catch_unwind(|| {
        if out.is_null() {
            return FfiErrorCode::NullArg;
        }
        let Some(json) = from_c_str(config_json) else {
            return FfiErrorCode::NullArg;
        };
        match AppConfig::from_json(&json) {
            Ok(config) => {
                unsafe { out.write(config.location.into()) };
                FfiErrorCode::Ok
            }
            Err(e) => {
                warn!(error = %e, "rejected location config");
                FfiErrorCode::InvalidConfig
            }
        }
    })
    .unwrap_or(FfiErrorCode::Panic)
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiListResult`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn shopping_free_list_result(result: *mut FfiListResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
    });
}

/// Free an `FfiItemList` and every string inside it. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn shopping_free_item_list(list: *mut FfiItemList) {
    if list.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let list = unsafe { Box::from_raw(list) };
        if !list.items.is_null() && list.len > 0 {
            let items = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(list.items, list.len as usize))
            };
            for item in items.iter() {
                free_c_string(item.name);
                free_c_string(item.address);
            }
        }
    });
}

/// Free an `FfiHttpRequest`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn shopping_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.url);
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                free_c_string(h.key);
                free_c_string(h.value);
            }
        }
    });
}

/// Free an `FfiAddressResult`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn shopping_free_address_result(result: *mut FfiAddressResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        free_c_string(result.address);
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn shopping_free_string(s: *mut c_char) {
    let _ = catch_unwind(|| free_c_string(s));
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::{CStr, CString};

    fn read(ptr: *const c_char) -> String {
        unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string()
    }

    fn items(list: *const FfiShoppingList) -> Vec<(u64, String, i32, bool, String)> {
        let snapshot = shopping_list_items(list);
        assert!(!snapshot.is_null());
        let s = unsafe { &*snapshot };
        let rows = if s.len == 0 {
            Vec::new()
        } else {
            unsafe { std::slice::from_raw_parts(s.items, s.len as usize) }
                .iter()
                .map(|i| (i.id, read(i.name), i.quantity, i.is_editing, read(i.address)))
                .collect()
        };
        shopping_free_item_list(snapshot);
        rows
    }

    fn add(
        list: *mut FfiShoppingList,
        name: &str,
        qty: &str,
        address: Option<&str>,
    ) -> (FfiErrorCode, u64) {
        let name = CString::new(name).unwrap();
        let qty = CString::new(qty).unwrap();
        let address = address.map(|a| CString::new(a).unwrap());
        let result = shopping_list_add_item(
            list,
            name.as_ptr(),
            qty.as_ptr(),
            address.as_ref().map_or(std::ptr::null(), |a| a.as_ptr()),
        );
        let r = unsafe { &*result };
        let out = (r.error_code, r.item_id);
        shopping_free_list_result(result);
        out
    }

    #[test]
    fn list_new_and_free() {
        let list = shopping_list_new();
        assert!(!list.is_null());
        assert!(items(list).is_empty());
        shopping_list_free(list);
    }

    #[test]
    fn list_free_null_is_safe() {
        shopping_list_free(std::ptr::null_mut());
    }

    #[test]
    fn milk_scenario_through_ffi() {
        let list = shopping_list_new();

        assert_eq!(add(list, "Milk", "2", Some("")), (FfiErrorCode::Ok, 1));
        assert_eq!(items(list), vec![(1, "Milk".into(), 2, false, "".into())]);

        assert!(shopping_list_begin_edit(list, 1));
        assert!(items(list)[0].3);

        let name = CString::new("Milk").unwrap();
        let qty = CString::new("3").unwrap();
        let address = CString::new("221B Baker St").unwrap();
        let result =
            shopping_list_complete_edit(list, 1, name.as_ptr(), qty.as_ptr(), address.as_ptr());
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert!(r.error_message.is_null());
        shopping_free_list_result(result);
        assert_eq!(
            items(list),
            vec![(1, "Milk".into(), 3, false, "221B Baker St".into())]
        );

        assert!(shopping_list_delete_item(list, 1));
        assert!(!shopping_list_delete_item(list, 1));
        assert!(items(list).is_empty());

        shopping_list_free(list);
    }

    #[test]
    fn add_item_reports_validation_errors() {
        let list = shopping_list_new();
        assert_eq!(add(list, " ", "1", None).0, FfiErrorCode::EmptyName);
        assert_eq!(add(list, "Eggs", "a dozen", None).0, FfiErrorCode::InvalidQuantity);

        let name = CString::new("Eggs").unwrap();
        let qty = CString::new("x").unwrap();
        let result = shopping_list_add_item(list, name.as_ptr(), qty.as_ptr(), std::ptr::null());
        let r = unsafe { &*result };
        assert_eq!(read(r.error_message), "quantity \"x\" is not a whole number");
        assert_eq!(r.item_id, 0);
        shopping_free_list_result(result);

        assert!(items(list).is_empty());
        shopping_list_free(list);
    }

    #[test]
    fn add_item_null_list_returns_null_arg() {
        let name = CString::new("Milk").unwrap();
        let qty = CString::new("1").unwrap();
        let result = shopping_list_add_item(
            std::ptr::null_mut(),
            name.as_ptr(),
            qty.as_ptr(),
            std::ptr::null(),
        );
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::NullArg);
        shopping_free_list_result(result);
    }

    #[test]
    fn null_address_uses_resolved_location_address() {
        let list = shopping_list_new();
        shopping_list_update_location(list, 51.5237, -0.1585);
        let address = CString::new("221B Baker St").unwrap();
        assert!(shopping_list_set_address(list, 51.5237, -0.1585, address.as_ptr()));

        let current = shopping_list_current_address(list);
        assert_eq!(read(current), "221B Baker St");
        shopping_free_string(current);

        add(list, "Tea", "1", None);
        assert_eq!(items(list)[0].4, "221B Baker St");
        shopping_list_free(list);
    }

    #[test]
    fn stale_address_is_ignored() {
        let list = shopping_list_new();
        shopping_list_update_location(list, 1.0, 1.0);
        shopping_list_update_location(list, 2.0, 2.0);
        let address = CString::new("Old place").unwrap();
        assert!(!shopping_list_set_address(list, 1.0, 1.0, address.as_ptr()));

        let current = shopping_list_current_address(list);
        assert_eq!(read(current), "");
        shopping_free_string(current);
        shopping_list_free(list);
    }

    #[test]
    fn rejected_edit_keeps_editor_open() {
        let list = shopping_list_new();
        add(list, "Milk", "1", Some(""));
        shopping_list_begin_edit(list, 1);

        let name = CString::new("").unwrap();
        let qty = CString::new("1").unwrap();
        let result =
            shopping_list_complete_edit(list, 1, name.as_ptr(), qty.as_ptr(), std::ptr::null());
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::EmptyName);
        shopping_free_list_result(result);
        assert!(items(list)[0].3);

        shopping_list_cancel_edit(list);
        assert!(!items(list)[0].3);
        shopping_list_free(list);
    }

    #[test]
    fn complete_edit_unknown_id_is_item_not_found() {
        let list = shopping_list_new();
        let name = CString::new("A").unwrap();
        let qty = CString::new("1").unwrap();
        let result =
            shopping_list_complete_edit(list, 9, name.as_ptr(), qty.as_ptr(), std::ptr::null());
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::ItemNotFound);
        shopping_free_list_result(result);
        shopping_list_free(list);
    }

    #[test]
    fn list_calls_with_null_are_safe() {
        assert!(!shopping_list_begin_edit(std::ptr::null_mut(), 1));
        assert!(!shopping_list_delete_item(std::ptr::null_mut(), 1));
        assert!(shopping_list_items(std::ptr::null()).is_null());
        assert!(shopping_list_current_address(std::ptr::null()).is_null());
        shopping_list_cancel_edit(std::ptr::null_mut());
        shopping_list_update_location(std::ptr::null_mut(), 0.0, 0.0);
    }

    #[test]
    fn geocoding_client_new_null_returns_null() {
        let key = CString::new("k").unwrap();
        assert!(shopping_geocoding_client_new(std::ptr::null(), key.as_ptr()).is_null());
        shopping_geocoding_client_free(std::ptr::null_mut());
    }

    #[test]
    fn geocoding_client_from_json() {
        let ok =
            CString::new(r#"{"geocoder":{"base_url":"http://localhost:3000/","api_key":"k"}}"#)
                .unwrap();
        let client = shopping_geocoding_client_from_json(ok.as_ptr());
        assert!(!client.is_null());

        let req = shopping_build_reverse_geocode(client, 1.5, 2.5);
        let url = read(unsafe { &*req }.url);
        assert_eq!(url, "http://localhost:3000/maps/api/geocode/json?latlng=1.5%2C2.5&key=k");
        shopping_free_request(req);
        shopping_geocoding_client_free(client);

        let missing_key = CString::new(r#"{"geocoder":{}}"#).unwrap();
        assert!(shopping_geocoding_client_from_json(missing_key.as_ptr()).is_null());
        assert!(shopping_geocoding_client_from_json(std::ptr::null()).is_null());
    }

    #[test]
    fn build_reverse_geocode_returns_get_with_accept_header() {
        let base = CString::new("https://maps.googleapis.com").unwrap();
        let key = CString::new("secret").unwrap();
        let client = shopping_geocoding_client_new(base.as_ptr(), key.as_ptr());
        let req = shopping_build_reverse_geocode(client, 51.5237, -0.1585);
        assert!(!req.is_null());

        let r = unsafe { &*req };
        assert_eq!(r.method, FfiHttpMethod::Get);
        assert_eq!(
            read(r.url),
            "https://maps.googleapis.com/maps/api/geocode/json?latlng=51.5237%2C-0.1585&key=secret"
        );
        assert_eq!(r.headers_len, 1);
        let header = unsafe { &*r.headers };
        assert_eq!(read(header.key), "accept");
        assert_eq!(read(header.value), "application/json");

        shopping_free_request(req);
        shopping_geocoding_client_free(client);
    }

    #[test]
    fn build_reverse_geocode_null_client_returns_null() {
        assert!(shopping_build_reverse_geocode(std::ptr::null(), 0.0, 0.0).is_null());
    }

    fn parse(status: u16, body: &str) -> *mut FfiAddressResult {
        let base = CString::new("http://localhost").unwrap();
        let key = CString::new("k").unwrap();
        let client = shopping_geocoding_client_new(base.as_ptr(), key.as_ptr());
        let body = CString::new(body).unwrap();
        let resp = FfiHttpResponse {
            status,
            body: body.as_ptr(),
        };
        let result = shopping_parse_reverse_geocode(client, &resp);
        shopping_geocoding_client_free(client);
        result
    }

    #[test]
    fn parse_reverse_geocode_success() {
        let result = parse(200, r#"{"results":[{"formatted_address":"1 Main St"}],"status":"OK"}"#);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert!(r.error_message.is_null());
        assert_eq!(read(r.address), "1 Main St");
        shopping_free_address_result(result);
    }

    #[test]
    fn parse_reverse_geocode_zero_results_is_sentinel() {
        let result = parse(200, r#"{"results":[],"status":"ZERO_RESULTS"}"#);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert_eq!(read(r.address), "Address Not Found");
        shopping_free_address_result(result);
    }

    #[test]
    fn parse_reverse_geocode_errors_still_carry_sentinel() {
        for (status, body, code) in [
            (500, "oops", FfiErrorCode::HttpStatus),
            (200, "<html>", FfiErrorCode::InvalidResponse),
            (200, r#"{"results":[],"status":"REQUEST_DENIED"}"#, FfiErrorCode::Rejected),
        ] {
            let result = parse(status, body);
            let r = unsafe { &*result };
            assert_eq!(r.error_code, code, "{body}");
            assert!(!r.error_message.is_null());
            assert_eq!(read(r.address), "Address Not Found");
            shopping_free_address_result(result);
        }
    }

    #[test]
    fn parse_null_arguments() {
        let result = shopping_parse_reverse_geocode(std::ptr::null(), std::ptr::null());
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::NullArg);
        shopping_free_address_result(result);

        let base = CString::new("http://localhost").unwrap();
        let key = CString::new("k").unwrap();
        let client = shopping_geocoding_client_new(base.as_ptr(), key.as_ptr());
        let result = shopping_parse_reverse_geocode(client, std::ptr::null());
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::NullArg);
        shopping_free_address_result(result);
        shopping_geocoding_client_free(client);
    }

    #[test]
    fn permission_flow_grant_path() {
        let flow = shopping_permission_flow_new();
        assert_eq!(shopping_permission_state(flow), FfiPermissionState::Unrequested);

        let action = shopping_permission_request_address(flow, false);
        assert_eq!(action.kind, FfiFlowActionKind::RequestPermissions);
        assert_eq!(action.permissions, FFI_PERMISSION_FINE | FFI_PERMISSION_COARSE);
        assert_eq!(shopping_permission_state(flow), FfiPermissionState::Pending);

        let action = shopping_permission_on_result(flow, true, true, false);
        assert_eq!(action.kind, FfiFlowActionKind::StartUpdates);
        assert_eq!(shopping_permission_state(flow), FfiPermissionState::Granted);

        shopping_permission_flow_free(flow);
    }

    #[test]
    fn permission_flow_denials_carry_messages() {
        let flow = shopping_permission_flow_new();

        shopping_permission_request_address(flow, false);
        let action = shopping_permission_on_result(flow, true, false, true);
        assert_eq!(action.kind, FfiFlowActionKind::ShowMessage);
        assert_eq!(
            read(action.message),
            "Location Permission is required for this feature to work"
        );
        assert_eq!(shopping_permission_state(flow), FfiPermissionState::DeniedSoft);

        shopping_permission_request_address(flow, false);
        let action = shopping_permission_on_result(flow, false, false, false);
        assert_eq!(
            read(action.message),
            "Location Permission is required: enable in device settings"
        );
        assert_eq!(shopping_permission_state(flow), FfiPermissionState::DeniedHard);

        shopping_permission_flow_free(flow);
    }

    #[test]
    fn permission_flow_null_is_noop() {
        let action = shopping_permission_request_address(std::ptr::null_mut(), true);
        assert_eq!(action.kind, FfiFlowActionKind::None);
        assert_eq!(shopping_permission_state(std::ptr::null()), FfiPermissionState::Unrequested);
        shopping_permission_flow_free(std::ptr::null_mut());
    }

    #[test]
    fn default_location_request_is_high_accuracy_one_second() {
        let request = shopping_location_request_default();
        assert_eq!(request.priority, FfiPriority::HighAccuracy);
        assert_eq!(request.interval_ms, 1000);
    }

    #[test]
    fn location_request_comes_from_config() {
        let json = CString::new(
            r#"{"geocoder":{"api_key":"k"},"location":{"priority":"low_power","interval_ms":250}}"#,
        )
        .unwrap();
        let mut request = shopping_location_request_default();
        let code = shopping_location_request_from_json(json.as_ptr(), &mut request);
        assert_eq!(code, FfiErrorCode::Ok);
        assert_eq!(request.priority, FfiPriority::LowPower);
        assert_eq!(request.interval_ms, 250);
    }

    #[test]
    fn location_request_missing_section_uses_defaults() {
        let json = CString::new(r#"{"geocoder":{"api_key":"k"}}"#).unwrap();
        let mut request = FfiLocationRequest {
            priority: FfiPriority::Passive,
            interval_ms: 0,
        };
        let code = shopping_location_request_from_json(json.as_ptr(), &mut request);
        assert_eq!(code, FfiErrorCode::Ok);
        assert_eq!(request.priority, FfiPriority::HighAccuracy);
        assert_eq!(request.interval_ms, 1000);
    }

    #[test]
    fn location_request_rejects_invalid_config() {
        let mut request = shopping_location_request_default();
        let zero =
            CString::new(r#"{"geocoder":{"api_key":"k"},"location":{"interval_ms":0}}"#).unwrap();
        assert_eq!(
            shopping_location_request_from_json(zero.as_ptr(), &mut request),
            FfiErrorCode::InvalidConfig
        );
        assert_eq!(request.interval_ms, 1000);

        assert_eq!(
            shopping_location_request_from_json(std::ptr::null(), &mut request),
            FfiErrorCode::NullArg
        );
        assert_eq!(
            shopping_location_request_from_json(zero.as_ptr(), std::ptr::null_mut()),
            FfiErrorCode::NullArg
        );
    }

    #[test]
    fn free_functions_accept_null() {
        shopping_free_list_result(std::ptr::null_mut());
        shopping_free_item_list(std::ptr::null_mut());
        shopping_free_request(std::ptr::null_mut());
        shopping_free_address_result(std::ptr::null_mut());
        shopping_free_string(std::ptr::null_mut());
    }

    /// Host-side round trip: build through the FFI, execute with ureq
    /// against the mock geocoder, parse through the FFI.
    #[test]
    fn round_trip_against_mock_geocoder() {
        let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = std_listener.local_addr().unwrap();
        std_listener.set_nonblocking(true).unwrap();
        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async {
                let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
                mock_geocoder::run(listener).await
            })
            .unwrap();
        });

        let base = CString::new(format!("http://{addr}")).unwrap();
        let key = CString::new(mock_geocoder::DEFAULT_API_KEY).unwrap();
        let client = shopping_geocoding_client_new(base.as_ptr(), key.as_ptr());
        let list = shopping_list_new();

        let (lat, lng) = (51.5237, -0.1585);
        shopping_list_update_location(list, lat, lng);
        let req = shopping_build_reverse_geocode(client, lat, lng);
        let url = read(unsafe { &*req }.url);
        shopping_free_request(req);

        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        let mut response = agent.get(&url).call().expect("HTTP transport error");
        let status = response.status().as_u16();
        let body = CString::new(response.body_mut().read_to_string().unwrap()).unwrap();

        let resp = FfiHttpResponse {
            status,
            body: body.as_ptr(),
        };
        let result = shopping_parse_reverse_geocode(client, &resp);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert!(shopping_list_set_address(list, lat, lng, r.address));
        shopping_free_address_result(result);

        add(list, "Milk", "2", None);
        assert_eq!(items(list)[0].4, "221B Baker St, London NW1 6XE, UK");

        shopping_list_free(list);
        shopping_geocoding_client_free(client);
    }
}
