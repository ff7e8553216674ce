//! Site Settings: the singleton branding row.

use async_trait::async_trait;
use serde::Deserialize;

use super::{optional, Screen};
use crate::db::models::{SiteSettings, SETTINGS_ID};
use crate::db::{DataAccess, StoreError};
use crate::site::load_settings;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsForm {
    #[serde(default)]
    pub site_name: String,
    #[serde(default)]
    pub logo_url: String,
    #[serde(default)]
    pub favicon_url: String,
    #[serde(default)]
    pub primary_color: String,
    #[serde(default)]
    pub footer_text: String,
}

fn is_hex_color(s: &str) -> bool {
    let hex = s.strip_prefix('#').unwrap_or("");
    matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
}

#[derive(Debug, Clone)]
pub struct SettingsEditor {
    pub settings: SiteSettings,
    pub saved: bool,
}

impl SettingsEditor {
    pub fn new(settings: SiteSettings) -> Self {
        Self {
            settings,
            saved: false,
        }
    }

    /// Copy form values in. Blank site name and malformed colors keep the
    /// current values.
    pub fn apply(&mut self, form: &SettingsForm) {
        let s = &mut self.settings;
        if let Some(name) = optional(&form.site_name) {
            s.site_name = name;
        }
        let color = form.primary_color.trim();
        if is_hex_color(color) {
            s.primary_color = color.to_uppercase();
        }
        s.logo_url = optional(&form.logo_url);
        s.favicon_url = optional(&form.favicon_url);
        s.footer_text = optional(&form.footer_text);
        self.saved = false;
    }

    /// Write the row under the singleton id.
    pub async fn save(&mut self, access: &DataAccess) -> Result<(), StoreError> {
        self.settings.id = SETTINGS_ID.to_string();
        access
            .from::<SiteSettings>()
            .upsert(&[self.settings.clone()], "id")
            .await?;
        self.saved = true;
        tracing::info!("site settings saved");
        Ok(())
    }
}

#[async_trait]
impl Screen for SettingsEditor {
    async fn load(access: &DataAccess) -> Result<Self, StoreError> {
        Ok(Self::new(load_settings(access).await?.unwrap_or_default()))
    }
}
