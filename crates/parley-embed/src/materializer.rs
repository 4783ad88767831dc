use std::fmt::Write;

use parley_types::WidgetConfig;

use crate::escape::escape_js_string;

/// Behavioral widget body; expects a `CONFIG` binding in scope
const RUNTIME: &str = include_str!("widget/runtime.js");

/// Builds the `CONFIG` object literal
///
/// Keys are fixed identifiers chosen by this module. The only way to write a
/// string value is [`ConfigObject::string`], which escapes it.
struct ConfigObject {
    body: String,
}

impl ConfigObject {
    fn new() -> Self {
        Self {
            body: String::from("{\n"),
        }
    }

    fn string(mut self, key: &'static str, value: &str) -> Self {
        let _ = writeln!(self.body, "    {}: '{}',", key, escape_js_string(value));
        self
    }

    fn number(mut self, key: &'static str, value: u32) -> Self {
        let _ = writeln!(self.body, "    {}: {},", key, value);
        self
    }

    fn boolean(mut self, key: &'static str, value: bool) -> Self {
        let _ = writeln!(self.body, "    {}: {},", key, value);
        self
    }

    fn finish(mut self) -> String {
        self.body.push_str("  }");
        self.body
    }
}

/// Produces the standalone JavaScript served to host pages
#[derive(Debug, Clone)]
pub struct ScriptMaterializer {
    chat_endpoint: String,
    analytics_endpoint: String,
}

impl ScriptMaterializer {
    /// `base_url` is the public origin the widget calls back to
    pub fn new(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            chat_endpoint: format!("{}/public-chat", base),
            analytics_endpoint: format!("{}/embed-analytics", base),
        }
    }

    pub fn chat_endpoint(&self) -> &str {
        &self.chat_endpoint
    }

    pub fn materialize(&self, config: &WidgetConfig) -> String {
        // system_prompt is intentionally absent
        let config_object = ConfigObject::new()
            .string("embedCode", &config.embed_code)
            .string("name", &config.name)
            .string("welcomeMessage", &config.welcome_message)
            .string("placeholder", &config.placeholder)
            .string("primaryColor", &config.primary_color)
            .string("backgroundColor", &config.background_color)
            .string("textColor", &config.text_color)
            .number("borderRadius", config.border_radius)
            .number("fontSize", config.font_size)
            .string("fontFamily", &config.font_family)
            .string("avatarUrl", &config.avatar_url)
            .string("position", config.position.as_str())
            .boolean("autoOpen", config.auto_open)
            .string("apiUrl", &self.chat_endpoint)
            .string("analyticsUrl", &self.analytics_endpoint)
            .finish();

        let mut script = String::with_capacity(RUNTIME.len() + config_object.len() + 64);
        script.push_str("(function () {\n  'use strict';\n  var CONFIG = ");
        script.push_str(&config_object);
        script.push_str(";\n\n");
        script.push_str(RUNTIME);
        script.push_str("\n})();\n");
        script
    }
}
