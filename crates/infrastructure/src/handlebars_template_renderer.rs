//! Notification templates rendered with Handlebars.

use std::path::Path;

use handlebars::Handlebars;
use serde_json::Value;
use spacewarden_application::{NOTIFY_TEMPLATE, PURGE_TEMPLATE, TemplateRenderer};
use spacewarden_core::{AppError, AppResult};
use tracing::info;

const TEMPLATE_EXTENSION: &str = "html.hbs";

const BUILT_IN_TEMPLATES: [(&str, &str); 2] = [
    (NOTIFY_TEMPLATE, include_str!("../templates/notify.html.hbs")),
    (PURGE_TEMPLATE, include_str!("../templates/purge.html.hbs")),
];

/// Template renderer backed by a strict Handlebars registry.
pub struct HandlebarsTemplateRenderer {
    registry: Handlebars<'static>,
}

impl HandlebarsTemplateRenderer {
    /// Creates a renderer holding the built-in templates.
    pub fn new() -> AppResult<Self> {
        let mut renderer = Self {
            registry: Handlebars::new(),
        };
        renderer.registry.set_strict_mode(true);

        for (name, source) in BUILT_IN_TEMPLATES {
            renderer.register(name, source)?;
        }

        Ok(renderer)
    }

    /// Creates a renderer whose built-in templates are overridden by
    /// `<name>.html.hbs` files found in `directory`.
    pub fn from_directory(directory: &Path) -> AppResult<Self> {
        let mut renderer = Self::new()?;

        for (name, _) in BUILT_IN_TEMPLATES {
            let path = directory.join(format!("{name}.{TEMPLATE_EXTENSION}"));
            if !path.is_file() {
                continue;
            }

            let source = std::fs::read_to_string(&path).map_err(|error| {
                AppError::Template(format!(
                    "failed to read template '{}': {error}",
                    path.display()
                ))
            })?;
            renderer.register(name, source.as_str())?;
            info!(template = name, path = %path.display(), "loaded template override");
        }

        Ok(renderer)
    }

    /// Registers or replaces a template.
    pub fn register(&mut self, name: &str, source: &str) -> AppResult<()> {
        self.registry
            .register_template_string(name, source)
            .map_err(|error| AppError::Template(format!("invalid template '{name}': {error}")))
    }
}

impl TemplateRenderer for HandlebarsTemplateRenderer {
    fn render(&self, template_name: &str, data: &Value) -> AppResult<String> {
        if !data.is_object() {
            return Err(AppError::Template(format!(
                "data for template '{template_name}' must be an object"
            )));
        }

        self.registry.render(template_name, data).map_err(|error| {
            AppError::Template(format!("failed to render template '{template_name}': {error}"))
        })
    }
}
