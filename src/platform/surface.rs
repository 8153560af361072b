// Surface creation - dispatch raw window handles to the right loader
//
// The declaration sets aggregated in the parent module are consumed here:
// a (display, window) handle pair is classified into a backend and handed
// to the matching ash surface extension. A handle pair for a backend this
// build does not carry is an error, the runtime analog of referencing an
// undeclared symbol.

use anyhow::{bail, Context, Result};
use ash::{extensions::khr, vk};
use raw_window_handle::{RawDisplayHandle, RawWindowHandle};

use super::Backend;

/// Classify a raw handle pair into the backend that can present to it.
///
/// Fails when the pair is mismatched, belongs to a window system this
/// crate has no declarations for (e.g. Xlib, AppKit), or names a backend
/// outside this build's declaration set.
pub fn backend_for_handles(
    display: RawDisplayHandle,
    window: RawWindowHandle,
) -> Result<Backend> {
    let backend = match (display, window) {
        (RawDisplayHandle::Windows(_), RawWindowHandle::Win32(_)) => Backend::Win32,
        (RawDisplayHandle::Xcb(_), RawWindowHandle::Xcb(_)) => Backend::Xcb,
        (RawDisplayHandle::Wayland(_), RawWindowHandle::Wayland(_)) => Backend::Wayland,
        (display, window) => bail!(
            "no surface declarations for window system: display handle is {}, window handle is {}",
            display_kind(display),
            window_kind(window),
        ),
    };

    if !backend.is_enabled() {
        bail!(
            "{} surface declarations are not part of this build (enabled backends: {:?})",
            backend.name(),
            Backend::enabled(),
        );
    }

    Ok(backend)
}

/// Create a `vk::SurfaceKHR` for the given raw handle pair.
///
/// The instance must have been created with
/// [`required_instance_extensions`](super::required_instance_extensions)
/// enabled. Destroy the returned surface through the common
/// `khr::Surface` loader before the window goes away.
///
/// # Safety
///
/// `display` and `window` must refer to a live window owned by the caller,
/// and `instance` must outlive the returned surface.
pub unsafe fn create_surface(
    entry: &ash::Entry,
    instance: &ash::Instance,
    display: RawDisplayHandle,
    window: RawWindowHandle,
) -> Result<vk::SurfaceKHR> {
    // Classification first, so disabled/unknown backends fail with the
    // same message whether or not a loader could be built for them.
    backend_for_handles(display, window)?;

    match (display, window) {
        #[cfg(windows)]
        (RawDisplayHandle::Windows(_), RawWindowHandle::Win32(handle)) => {
            let hinstance =
                handle.hinstance.map(|h| h.get()).unwrap_or(0) as *const std::ffi::c_void;
            let hwnd = handle.hwnd.get() as *const std::ffi::c_void;
            let create_info = vk::Win32SurfaceCreateInfoKHR::builder()
                .hinstance(hinstance)
                .hwnd(hwnd);
            let loader = khr::Win32Surface::new(entry, instance);
            loader
                .create_win32_surface(&create_info, None)
                .context("Failed to create Win32 surface")
        }

        #[cfg(all(unix, not(target_vendor = "apple")))]
        (RawDisplayHandle::Xcb(display), RawWindowHandle::Xcb(window)) => {
            let connection = display
                .connection
                .context("XCB display handle carries no connection pointer")?
                .as_ptr();
            let create_info = vk::XcbSurfaceCreateInfoKHR::builder()
                .connection(connection)
                .window(window.window.get());
            let loader = khr::XcbSurface::new(entry, instance);
            loader
                .create_xcb_surface(&create_info, None)
                .context("Failed to create XCB surface")
        }

        #[cfg(all(unix, not(target_vendor = "apple")))]
        (RawDisplayHandle::Wayland(display), RawWindowHandle::Wayland(window)) => {
            let create_info = vk::WaylandSurfaceCreateInfoKHR::builder()
                .display(display.display.as_ptr())
                .surface(window.surface.as_ptr());
            let loader = khr::WaylandSurface::new(entry, instance);
            loader
                .create_wayland_surface(&create_info, None)
                .context("Failed to create Wayland surface")
        }

        // backend_for_handles already rejected everything else.
        _ => bail!("window handle pair has no surface constructor in this build"),
    }
}

fn display_kind(handle: RawDisplayHandle) -> &'static str {
    match handle {
        RawDisplayHandle::Windows(_) => "Windows",
        RawDisplayHandle::Xcb(_) => "XCB",
        RawDisplayHandle::Wayland(_) => "Wayland",
        RawDisplayHandle::Xlib(_) => "Xlib",
        RawDisplayHandle::AppKit(_) => "AppKit",
        _ => "unrecognized",
    }
}

fn window_kind(handle: RawWindowHandle) -> &'static str {
    match handle {
        RawWindowHandle::Win32(_) => "Win32",
        RawWindowHandle::Xcb(_) => "XCB",
        RawWindowHandle::Wayland(_) => "Wayland",
        RawWindowHandle::Xlib(_) => "Xlib",
        RawWindowHandle::AppKit(_) => "AppKit",
        _ => "unrecognized",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(all(unix, not(target_vendor = "apple")))]
    mod posix {
        use super::*;
        use raw_window_handle::{
            WaylandDisplayHandle, WaylandWindowHandle, XcbDisplayHandle, XcbWindowHandle,
            XlibDisplayHandle, XlibWindowHandle,
        };
        use std::num::NonZeroU32;
        use std::ptr::NonNull;

        fn xcb_pair() -> (RawDisplayHandle, RawWindowHandle) {
            let display = XcbDisplayHandle::new(None, 0);
            let window = XcbWindowHandle::new(NonZeroU32::new(42).unwrap());
            (
                RawDisplayHandle::Xcb(display),
                RawWindowHandle::Xcb(window),
            )
        }

        fn wayland_pair() -> (RawDisplayHandle, RawWindowHandle) {
            let display = WaylandDisplayHandle::new(NonNull::dangling());
            let window = WaylandWindowHandle::new(NonNull::dangling());
            (
                RawDisplayHandle::Wayland(display),
                RawWindowHandle::Wayland(window),
            )
        }

        #[test]
        fn test_xcb_pair_classifies_as_xcb() {
            let (display, window) = xcb_pair();
            assert_eq!(backend_for_handles(display, window).unwrap(), Backend::Xcb);
        }

        #[test]
        fn test_wayland_pair_classifies_as_wayland() {
            let (display, window) = wayland_pair();
            assert_eq!(
                backend_for_handles(display, window).unwrap(),
                Backend::Wayland
            );
        }

        #[test]
        fn test_mismatched_pair_is_rejected() {
            let (display, _) = xcb_pair();
            let (_, window) = wayland_pair();
            let err = backend_for_handles(display, window).unwrap_err();
            assert!(err.to_string().contains("XCB"));
            assert!(err.to_string().contains("Wayland"));
        }

        // Xlib is X protocol too, but the declaration set only covers XCB.
        #[test]
        fn test_xlib_handles_are_outside_the_declaration_set() {
            let display = RawDisplayHandle::Xlib(XlibDisplayHandle::new(None, 0));
            let window = RawWindowHandle::Xlib(XlibWindowHandle::new(7));
            let err = backend_for_handles(display, window).unwrap_err();
            assert!(err.to_string().contains("Xlib"));
        }

        #[test]
        fn test_win32_pair_is_not_in_posix_build() {
            use raw_window_handle::{Win32WindowHandle, WindowsDisplayHandle};
            use std::num::NonZeroIsize;

            let display = RawDisplayHandle::Windows(WindowsDisplayHandle::new());
            let window =
                RawWindowHandle::Win32(Win32WindowHandle::new(NonZeroIsize::new(1).unwrap()));
            let err = backend_for_handles(display, window).unwrap_err();
            assert!(err.to_string().contains("win32"));
            assert!(err.to_string().contains("not part of this build"));
        }
    }

    #[cfg(windows)]
    mod windows {
        use super::*;
        use raw_window_handle::{Win32WindowHandle, WindowsDisplayHandle};
        use std::num::NonZeroIsize;

        #[test]
        fn test_win32_pair_classifies_as_win32() {
            let display = RawDisplayHandle::Windows(WindowsDisplayHandle::new());
            let window =
                RawWindowHandle::Win32(Win32WindowHandle::new(NonZeroIsize::new(1).unwrap()));
            assert_eq!(
                backend_for_handles(display, window).unwrap(),
                Backend::Win32
            );
        }

        #[test]
        fn test_xcb_pair_is_not_in_windows_build() {
            use raw_window_handle::{XcbDisplayHandle, XcbWindowHandle};
            use std::num::NonZeroU32;

            let display = RawDisplayHandle::Xcb(XcbDisplayHandle::new(None, 0));
            let window = RawWindowHandle::Xcb(XcbWindowHandle::new(NonZeroU32::new(42).unwrap()));
            let err = backend_for_handles(display, window).unwrap_err();
            assert!(err.to_string().contains("xcb"));
            assert!(err.to_string().contains("not part of this build"));
        }
    }
}
