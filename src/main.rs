// =============================================================================
// VK-PLATFORM PROBE - verify this build's surface declaration sets
// =============================================================================
//
// PROBE FLOW:
// 1. Load the Vulkan library and request the instance API version
// 2. Enumerate instance extensions and layers
// 3. Check every required surface declaration set is available
//    (missing set = hard failure naming the missing dependency)
// 4. Optionally create a hidden window, classify its raw handles, and
//    create/destroy a real vk::SurfaceKHR through the matching backend
//
// =============================================================================

use anyhow::{Context, Result};
use ash::{extensions::khr, vk};
use std::fs::OpenOptions;
use std::io::Write;
use vk_platform::config::Config;
use vk_platform::platform::{self, surface, Backend};
use vk_platform::probe::InstanceProbe;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowAttributes},
};

// =============================================================================
// ENTRY POINT
// =============================================================================

fn main() -> Result<()> {
    let config = Config::load();

    init_logging(&config);
    log::info!("Starting vk-platform probe");
    log::info!(
        "Enabled windowing backends: {:?}",
        Backend::enabled()
            .iter()
            .map(|b| b.name())
            .collect::<Vec<_>>()
    );

    // ─────────────────────────────────────────────────────────────────────────
    // Headless pass: version + extension enumeration + required-set check
    // ─────────────────────────────────────────────────────────────────────────
    let probe = InstanceProbe::load()?;
    let report = probe.report()?;

    log::info!("Instance API version: {}", report.api_version_string());
    log::info!(
        "{} instance extensions, {} layers available",
        report.extensions.len(),
        report.layers.len()
    );

    let required = platform::required_instance_extensions();
    report.check_required(&required)?;
    log::info!("All required surface declaration sets are available");

    // ─────────────────────────────────────────────────────────────────────────
    // Windowed pass: exercise real surface creation (optional)
    // ─────────────────────────────────────────────────────────────────────────
    if config.probe.create_surface {
        run_surface_pass(config, probe)?;
    } else {
        log::info!("Skipping surface creation pass (probe.create_surface = false)");
    }

    log::info!("Probe finished");
    Ok(())
}

/// Initialize logging with optional file output
fn init_logging(config: &Config) {
    use env_logger::Builder;
    use log::LevelFilter;

    let mut builder = Builder::from_default_env();
    builder.filter_level(LevelFilter::Info);
    builder.init();

    // Create/clear log file if enabled
    if config.debug.log_to_file {
        if let Ok(mut file) = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&config.debug.log_file)
        {
            let _ = writeln!(file, "=== vk-platform probe log ===");
            let _ = writeln!(file, "Started: {:?}", std::time::SystemTime::now());
            let _ = writeln!(file);
        }
    }
}

fn run_surface_pass(config: Config, probe: InstanceProbe) -> Result<()> {
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    let mut app = ProbeApp::new(config, probe);
    event_loop.run_app(&mut app).context("Event loop failed")?;

    if let Some(error) = app.error.take() {
        return Err(error);
    }
    Ok(())
}

// =============================================================================
// SURFACE PASS
// =============================================================================

/// One-shot winit application: create a hidden window, create a surface
/// against it, then exit the event loop.
///
/// Field order matters for Drop: the surface must go before the instance,
/// and both before the window.
struct ProbeApp {
    config: Config,
    probe: InstanceProbe,

    surface: Option<vk::SurfaceKHR>,
    surface_loader: Option<khr::Surface>,
    instance: Option<ash::Instance>,
    window: Option<Window>,

    error: Option<anyhow::Error>,
}

impl ProbeApp {
    fn new(config: Config, probe: InstanceProbe) -> Self {
        Self {
            config,
            probe,
            surface: None,
            surface_loader: None,
            instance: None,
            window: None,
            error: None,
        }
    }

    fn create_probe_surface(&mut self, window: &Window) -> Result<()> {
        use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

        let display = window
            .display_handle()
            .context("Failed to get display handle")?
            .as_raw();
        let window_handle = window
            .window_handle()
            .context("Failed to get window handle")?
            .as_raw();

        let backend = surface::backend_for_handles(display, window_handle)?;
        log::info!("Window system backend: {}", backend.name());

        if let Some(preferred) = self.config.get_preferred_backend() {
            if preferred != backend {
                log::warn!(
                    "Window system handed out {} handles, but config prefers {}",
                    backend.name(),
                    preferred.name()
                );
            }
        }

        let instance = self.probe.create_instance(&self.config.window.title)?;
        let surface = unsafe {
            surface::create_surface(self.probe.entry(), &instance, display, window_handle)
        };

        // Keep the instance around for cleanup even if surface creation failed
        let surface_loader = khr::Surface::new(self.probe.entry(), &instance);
        self.surface_loader = Some(surface_loader);
        self.instance = Some(instance);

        let surface = surface?;
        log::info!("Created {} surface: {:?}", backend.name(), surface);
        self.surface = Some(surface);

        Ok(())
    }
}

impl ApplicationHandler for ProbeApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attributes = WindowAttributes::default()
            .with_title(&self.config.window.title)
            .with_inner_size(winit::dpi::PhysicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ))
            .with_visible(false);

        let window = match event_loop.create_window(window_attributes) {
            Ok(w) => w,
            Err(e) => {
                self.error = Some(anyhow::anyhow!("Failed to create probe window: {e}"));
                event_loop.exit();
                return;
            }
        };

        if let Err(e) = self.create_probe_surface(&window) {
            log::error!("Surface probe failed: {:?}", e);
            self.error = Some(e);
        }

        self.window = Some(window);

        // One-shot: everything interesting happened above
        event_loop.exit();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        if let WindowEvent::CloseRequested = event {
            event_loop.exit();
        }
    }
}

// =============================================================================
// CLEANUP
// =============================================================================

impl Drop for ProbeApp {
    fn drop(&mut self) {
        // Destroy in reverse order of creation: surface, then instance.
        // The window (and the InstanceProbe entry) drop after us.
        unsafe {
            if let (Some(surface), Some(ref loader)) = (self.surface.take(), &self.surface_loader) {
                loader.destroy_surface(surface, None);
            }
            if let Some(instance) = self.instance.take() {
                instance.destroy_instance(None);
            }
        }
        log::debug!("Probe resources released");
    }
}
