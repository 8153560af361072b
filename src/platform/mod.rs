// Platform selection - which windowing declaration sets this build carries
//
// Responsibilities:
// - Enumerate the windowing backends compiled into this build
// - Produce the instance-extension name list for vk::InstanceCreateInfo
// - Reject unsupported targets at compile time

pub mod surface;

use ash::extensions::khr;
use std::ffi::CStr;

// Unsupported targets must fail the build, never silently produce an empty
// declaration set.
#[cfg(not(any(windows, all(unix, not(target_vendor = "apple")))))]
compile_error!(
    "vk-platform has no windowing backend for this target; \
     supported targets are Windows (Win32) and POSIX with XCB/Wayland"
);

/// A windowing-surface backend the Vulkan instance can present through.
///
/// All variants exist on every target so consumers can name them in
/// platform-neutral code; [`Backend::enabled`] reports which ones this
/// build actually carries declarations for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Win32 window handles (`VK_KHR_win32_surface`).
    Win32,
    /// X protocol via XCB window IDs (`VK_KHR_xcb_surface`).
    Xcb,
    /// Wayland surfaces (`VK_KHR_wayland_surface`).
    Wayland,
}

/// Backends compiled into this build.
///
/// The POSIX build deliberately carries both XCB and Wayland: which one is
/// used is decided at runtime by the consumer's window handles, not at
/// build time.
#[cfg(windows)]
pub const ENABLED_BACKENDS: &[Backend] = &[Backend::Win32];
#[cfg(all(unix, not(target_vendor = "apple")))]
pub const ENABLED_BACKENDS: &[Backend] = &[Backend::Xcb, Backend::Wayland];

impl Backend {
    /// Backends compiled into this build.
    pub fn enabled() -> &'static [Backend] {
        ENABLED_BACKENDS
    }

    /// Whether this backend's declarations are part of the current build.
    pub fn is_enabled(self) -> bool {
        ENABLED_BACKENDS.contains(&self)
    }

    /// The Vulkan instance extension providing this backend's surface
    /// declarations.
    pub fn extension_name(self) -> &'static CStr {
        match self {
            Backend::Win32 => khr::Win32Surface::name(),
            Backend::Xcb => khr::XcbSurface::name(),
            Backend::Wayland => khr::WaylandSurface::name(),
        }
    }

    /// Short lowercase name, matching the `preferred_backend` config values.
    pub fn name(self) -> &'static str {
        match self {
            Backend::Win32 => "win32",
            Backend::Xcb => "xcb",
            Backend::Wayland => "wayland",
        }
    }
}

/// Instance extensions required to create a surface on this target:
/// `VK_KHR_surface` plus one entry per enabled backend.
///
/// Pass these to `vk::InstanceCreateInfo::enabled_extension_names`.
pub fn required_instance_extensions() -> Vec<&'static CStr> {
    let mut names = Vec::with_capacity(1 + ENABLED_BACKENDS.len());
    names.push(khr::Surface::name());
    for backend in ENABLED_BACKENDS {
        names.push(backend.extension_name());
    }
    names
}
