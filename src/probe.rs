// Instance probe - verify the declaration sets resolve against the loader
//
// Loads the Vulkan library, asks for the instance API version and the
// available instance extensions/layers, and checks the required surface
// declaration sets are present. A missing set is fatal: there is no
// degraded mode for incomplete declarations.

use anyhow::{bail, Context, Result};
use ash::{vk, Entry};
use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use crate::platform;

/// Handle to the loaded Vulkan library.
pub struct InstanceProbe {
    entry: Entry,
}

impl InstanceProbe {
    /// Load the Vulkan library from the system loader.
    pub fn load() -> Result<Self> {
        let entry = unsafe { Entry::load() }
            .context("Failed to load Vulkan library. Is Vulkan installed?")?;
        Ok(Self { entry })
    }

    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    /// Query instance version, extensions and layers from the loader.
    pub fn report(&self) -> Result<ProbeReport> {
        let api_version = self
            .entry
            .try_enumerate_instance_version()
            .context("Failed to query instance API version")?;

        let extensions = self
            .entry
            .enumerate_instance_extension_properties(None)
            .context("Failed to enumerate instance extensions")?
            .iter()
            .map(|props| vk_string(&props.extension_name))
            .collect();

        let layers = self
            .entry
            .enumerate_instance_layer_properties()
            .context("Failed to enumerate instance layers")?
            .iter()
            .map(|props| vk_string(&props.layer_name))
            .collect();

        Ok(ProbeReport {
            api_version,
            extensions,
            layers,
        })
    }

    /// Create a minimal instance with this build's surface declaration
    /// sets enabled, for exercising surface creation.
    pub fn create_instance(&self, app_name: &str) -> Result<ash::Instance> {
        let app_name_cstr = CString::new(app_name)?;
        let engine_name = CString::new("vk-platform")?;

        let app_info = vk::ApplicationInfo::builder()
            .application_name(&app_name_cstr)
            .application_version(vk::make_api_version(0, 0, 1, 0))
            .engine_name(&engine_name)
            .engine_version(vk::make_api_version(0, 0, 1, 0))
            .api_version(vk::API_VERSION_1_0);

        let extensions: Vec<*const c_char> = platform::required_instance_extensions()
            .iter()
            .map(|name| name.as_ptr())
            .collect();

        let create_info = vk::InstanceCreateInfo::builder()
            .application_info(&app_info)
            .enabled_extension_names(&extensions);

        let instance = unsafe { self.entry.create_instance(&create_info, None) }
            .context("Failed to create Vulkan instance")?;

        Ok(instance)
    }
}

/// What the loader reported.
pub struct ProbeReport {
    /// `vkEnumerateInstanceVersion` result; `None` on Vulkan 1.0 loaders.
    pub api_version: Option<u32>,
    pub extensions: Vec<CString>,
    pub layers: Vec<CString>,
}

impl ProbeReport {
    /// Human-readable instance API version.
    pub fn api_version_string(&self) -> String {
        match self.api_version {
            Some(version) => format!(
                "{}.{}.{}",
                vk::api_version_major(version),
                vk::api_version_minor(version),
                vk::api_version_patch(version)
            ),
            None => "1.0".to_string(),
        }
    }

    pub fn has_extension(&self, name: &CStr) -> bool {
        self.extensions.iter().any(|ext| ext.as_c_str() == name)
    }

    /// Verify every required declaration set is available, naming the
    /// first missing one in the error.
    pub fn check_required(&self, required: &[&CStr]) -> Result<()> {
        for name in required {
            if !self.has_extension(name) {
                bail!(
                    "Vulkan loader is missing required instance extension {}; \
                     install the {} development/runtime package for this platform",
                    name.to_string_lossy(),
                    name.to_string_lossy(),
                );
            }
        }
        Ok(())
    }
}

// Vulkan reports names as fixed-size nul-padded c_char arrays.
fn vk_string(raw: &[c_char]) -> CString {
    let bytes: Vec<u8> = raw
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as u8)
        .collect();
    CString::new(bytes).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ash::extensions::khr;

    fn report_with(extensions: &[&CStr]) -> ProbeReport {
        ProbeReport {
            api_version: Some(vk::make_api_version(0, 1, 3, 250)),
            extensions: extensions.iter().map(|e| CString::from(*e)).collect(),
            layers: Vec::new(),
        }
    }

    #[test]
    fn test_api_version_string() {
        let report = report_with(&[]);
        assert_eq!(report.api_version_string(), "1.3.250");
    }

    #[test]
    fn test_missing_version_means_vulkan_1_0() {
        let report = ProbeReport {
            api_version: None,
            extensions: Vec::new(),
            layers: Vec::new(),
        };
        assert_eq!(report.api_version_string(), "1.0");
    }

    #[test]
    fn test_check_required_passes_when_all_present() {
        let names = platform::required_instance_extensions();
        let report = report_with(&names);
        assert!(report.check_required(&names).is_ok());
    }

    #[test]
    fn test_check_required_names_the_missing_extension() {
        // Core surface extension only, no backend extension.
        let report = report_with(&[khr::Surface::name()]);
        let names = platform::required_instance_extensions();
        let err = report.check_required(&names).unwrap_err();
        let missing = names[1].to_string_lossy();
        assert!(err.to_string().contains(missing.as_ref()));
    }

    #[test]
    fn test_has_extension() {
        let report = report_with(&[khr::Surface::name()]);
        assert!(report.has_extension(khr::Surface::name()));
        assert!(!report.has_extension(khr::Win32Surface::name()));
    }

    #[test]
    fn test_vk_string_stops_at_nul_padding() {
        let mut raw = [0 as c_char; 16];
        for (i, b) in b"VK_KHR_surface".iter().enumerate() {
            raw[i] = *b as c_char;
        }
        assert_eq!(vk_string(&raw).to_str().unwrap(), "VK_KHR_surface");
    }
}
