//! Plugin lifecycle: enable, reload, disable.
//!
//! [`WatchPlugin`] ties the data directory, the config and the controller
//! together. While disabled by config it keeps running but handles nothing.
//! A corrupt index is fatal on enable and on reload: the controller is not
//! registered and the error is returned to the host.

use std::path::{Path, PathBuf};

use tracing::{info, warn};
use watchlink_store::{FileBackend, LinkStore};

use crate::config::{WatchConfig, CONFIG_FILE_NAME};
use crate::controller::LinkController;
use crate::error::PluginError;
use crate::event::{Verdict, WorldEvent};
use crate::host::Host;
use crate::pulse::{PulseOutcome, PulseTask};

pub struct WatchPlugin {
    data_dir: PathBuf,
    config: WatchConfig,
    controller: Option<LinkController>,
}

impl WatchPlugin {
    /// Write the default config if needed, load it, and register the
    /// controller when enabled.
    pub fn enable(data_dir: impl Into<PathBuf>) -> Result<Self, PluginError> {
        let data_dir = data_dir.into();
        let config_path = data_dir.join(CONFIG_FILE_NAME);
        WatchConfig::write_default(&config_path)?;
        let config = WatchConfig::load(&config_path)?;

        let mut plugin = Self {
            data_dir,
            config,
            controller: None,
        };
        plugin.register()?;
        info!(
            data_dir = %plugin.data_dir.display(),
            active = plugin.is_active(),
            "plugin enabled"
        );
        Ok(plugin)
    }

    /// Re-read the config and the index.
    ///
    /// A config that fails to load leaves the running state untouched.
    pub fn reload(&mut self) -> Result<(), PluginError> {
        let config = match WatchConfig::load(self.config_path()) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "config reload failed, keeping current settings");
                return Err(e.into());
            }
        };
        self.controller = None;
        self.config = config;
        self.register()?;
        info!(active = self.is_active(), "plugin reloaded");
        Ok(())
    }

    pub fn disable(&mut self) {
        self.controller = None;
        info!("plugin disabled");
    }

    fn register(&mut self) -> Result<(), PluginError> {
        if !self.config.enabled {
            info!("watching disabled by config");
            return Ok(());
        }
        let store = LinkStore::open(FileBackend::new(&self.data_dir))?;
        self.controller = Some(LinkController::new(store));
        Ok(())
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join(CONFIG_FILE_NAME)
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    /// Whether a controller is registered and handling events.
    pub fn is_active(&self) -> bool {
        self.controller.is_some()
    }

    pub fn controller(&self) -> Option<&LinkController> {
        self.controller.as_ref()
    }

    /// Forward a host event. Inactive plugins let everything through.
    pub fn dispatch<H: Host + ?Sized>(&mut self, host: &mut H, event: &WorldEvent) -> Verdict {
        match self.controller.as_mut() {
            Some(controller) => controller.handle(host, event),
            None => Verdict::Proceed,
        }
    }

    /// Run a due pulse task. Returns `None` while inactive.
    pub fn run_task<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        task: &PulseTask,
    ) -> Option<PulseOutcome> {
        self.controller
            .as_mut()
            .map(|controller| controller.run_task(host, task))
    }
}
