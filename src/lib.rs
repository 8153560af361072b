// vk-platform - Platform-gated Vulkan windowing-surface glue
//
// Aggregates, per build target, the Vulkan instance-extension declaration
// sets needed for windowing-surface integration, and dispatches surface
// creation over raw window handles to the matching ash loader:
//
//   Windows  -> VK_KHR_win32_surface
//   POSIX    -> VK_KHR_xcb_surface + VK_KHR_wayland_surface (both; the
//               consumer picks one at runtime based on its window handles)
//
// Any other target is a compile error - an incomplete declaration set has
// no degraded mode.
//
// This crate does no rendering and owns no GPU resources. The companion
// `vk-platform-probe` binary verifies the declaration sets resolve against
// the installed Vulkan loader.

pub mod config;
pub mod platform;
pub mod probe;

pub use platform::surface::{backend_for_handles, create_surface};
pub use platform::{required_instance_extensions, Backend};
