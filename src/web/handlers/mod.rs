//! HTTP handlers and shared application state.

pub mod file;
pub mod home;

pub use file::*;
pub use home::*;

use std::path::Path;

use crate::config::{Config, SiteConfig};
use crate::file::{ExtensionPolicy, SubjectStorage};
use crate::template::TemplateEngine;
use crate::Result;

/// Name under which the homepage template is registered.
pub const HOMEPAGE_TEMPLATE: &str = "index";

/// Homepage template used when the templates directory has no `index.html`.
pub const BUILTIN_HOMEPAGE: &str = include_str!("../../../templates/index.html");

/// Application state shared across handlers.
#[derive(Debug)]
pub struct AppState {
    /// Subject-scoped upload storage.
    pub storage: SubjectStorage,
    /// Extensions accepted on upload.
    pub extensions: ExtensionPolicy,
    /// Page templates.
    pub templates: TemplateEngine,
    /// Homepage settings.
    pub site: SiteConfig,
}

impl AppState {
    /// Create state with the built-in homepage and default site settings.
    pub fn new(storage: SubjectStorage, extensions: ExtensionPolicy) -> Result<Self> {
        let mut templates = TemplateEngine::new();
        templates.load(HOMEPAGE_TEMPLATE, BUILTIN_HOMEPAGE)?;

        Ok(Self {
            storage,
            extensions,
            templates,
            site: SiteConfig::default(),
        })
    }

    /// Set the homepage settings.
    pub fn with_site(mut self, site: SiteConfig) -> Self {
        self.site = site;
        self
    }

    /// Replace the homepage template with `index.html` from `dir`, if present.
    pub fn with_templates_dir(mut self, dir: &Path) -> Result<Self> {
        let path = dir.join("index.html");
        if path.is_file() {
            self.templates.load_file(HOMEPAGE_TEMPLATE, &path)?;
            tracing::info!("Homepage template loaded from {}", path.display());
        } else {
            tracing::debug!(
                "No homepage template at {}, using built-in copy",
                path.display()
            );
        }
        Ok(self)
    }

    /// Build the state described by `config`, creating the storage root.
    pub fn from_config(config: &Config) -> Result<Self> {
        let storage = SubjectStorage::new(&config.storage.root)?;
        let extensions = ExtensionPolicy::from_config(&config.storage);

        Self::new(storage, extensions)?
            .with_site(config.site.clone())
            .with_templates_dir(Path::new(&config.templates.path))
    }
}
