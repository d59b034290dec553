use std::{collections::BTreeSet, fs, path::Path, time::Duration};

use anyhow::{bail, Context};
use serde::Deserialize;
use shared::domain::{ElementId, FieldRule, SavingsRecord, SystemTier};
use url::Url;

use crate::format::NumberGrouping;

const BUILTIN_SITE_TOML: &str = include_str!("../config/site.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    pub page: PageSettings,
    pub form: FormSettings,
    pub calculator: CalculatorSettings,
    pub navigation: NavigationSettings,
    pub animation: AnimationSettings,
    pub submission: SubmissionSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageSettings {
    pub navbar_id: ElementId,
    pub nav_toggle_id: ElementId,
    pub nav_menu_id: ElementId,
    pub announcer_id: ElementId,
    pub skip_link_id: ElementId,
    pub main_content_id: ElementId,
    pub phone_href: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FormSettings {
    pub form_id: ElementId,
    pub status_id: ElementId,
    pub success_modal_id: ElementId,
    pub fields: Vec<FieldRule>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TierEntry {
    pub tier: SystemTier,
    pub production: u64,
    pub savings: u64,
    pub co2: u64,
}

impl TierEntry {
    pub fn record(&self) -> SavingsRecord {
        SavingsRecord {
            production: self.production,
            savings: self.savings,
            co2: self.co2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalculatorSettings {
    pub default_tier: SystemTier,
    pub lifetime_years: u64,
    pub currency_symbol: String,
    #[serde(default)]
    pub grouping: NumberGrouping,
    pub tiers: Vec<TierEntry>,
}

impl CalculatorSettings {
    pub fn savings_for(&self, tier: SystemTier) -> Option<SavingsRecord> {
        self.tiers
            .iter()
            .find(|entry| entry.tier == tier)
            .map(TierEntry::record)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NavigationSettings {
    pub scroll_threshold_px: f64,
    pub scroll_debounce_ms: u64,
    pub scroll_margin_px: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnimationSettings {
    pub counter_duration_ms: u64,
    pub counter_suffix_threshold: u64,
    pub value_settle_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionSettings {
    pub simulated_latency_ms: u64,
    #[serde(default)]
    pub endpoint: Option<String>,
    pub timeout_ms: u64,
}

impl SubmissionSettings {
    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn endpoint_url(&self) -> anyhow::Result<Option<Url>> {
        let Some(raw) = self.endpoint.as_deref().map(str::trim) else {
            return Ok(None);
        };
        if raw.is_empty() {
            return Ok(None);
        }
        let url = Url::parse(raw).with_context(|| format!("invalid submission endpoint '{raw}'"))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("submission endpoint must be http(s), got '{}'", url.scheme());
        }
        Ok(Some(url))
    }
}

impl SiteConfig {
    pub fn builtin() -> anyhow::Result<Self> {
        let config: Self =
            toml::from_str(BUILTIN_SITE_TOML).context("built-in site configuration is invalid")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let mut seen = BTreeSet::new();
        for entry in &self.calculator.tiers {
            if !seen.insert(entry.tier) {
                bail!("calculator tier {} is defined twice", entry.tier);
            }
        }
        if self.calculator.savings_for(self.calculator.default_tier).is_none() {
            bail!(
                "default calculator tier {} has no savings record",
                self.calculator.default_tier
            );
        }

        let mut field_ids = BTreeSet::new();
        for rule in &self.form.fields {
            if !field_ids.insert(rule.id.clone()) {
                bail!("form field '{}' is defined twice", rule.id);
            }
        }

        self.submission.endpoint_url()?;
        Ok(())
    }

    pub fn field_rule(&self, id: &shared::domain::FieldId) -> Option<&FieldRule> {
        self.form.fields.iter().find(|rule| &rule.id == id)
    }
}

/// Built-in TOML, then an optional user TOML file merged over it, then `APP__*` env overrides.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<SiteConfig> {
    load_settings_with(path, |key| std::env::var(key).ok())
}

pub fn load_settings_with(
    path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<SiteConfig> {
    let mut merged: toml::Table =
        toml::from_str(BUILTIN_SITE_TOML).context("built-in site configuration is invalid")?;

    if let Some(path) = path {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read site config '{}'", path.display()))?;
        let overlay: toml::Table = toml::from_str(&raw)
            .with_context(|| format!("failed to parse site config '{}'", path.display()))?;
        merge_tables(&mut merged, overlay);
    }

    let mut config: SiteConfig = toml::Value::Table(merged)
        .try_into()
        .context("site configuration does not match the expected shape")?;
    apply_env_overrides(&mut config, env)?;
    config.validate()?;
    Ok(config)
}

fn apply_env_overrides(
    config: &mut SiteConfig,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<()> {
    if let Some(v) = env("APP__SUBMISSION_ENDPOINT") {
        config.submission.endpoint = Some(v);
    }
    if let Some(v) = env("APP__SUBMISSION_LATENCY_MS") {
        config.submission.simulated_latency_ms = v
            .parse()
            .with_context(|| format!("APP__SUBMISSION_LATENCY_MS is not a number: '{v}'"))?;
    }
    if let Some(v) = env("APP__SUBMISSION_TIMEOUT_MS") {
        config.submission.timeout_ms = v
            .parse()
            .with_context(|| format!("APP__SUBMISSION_TIMEOUT_MS is not a number: '{v}'"))?;
    }
    if let Some(v) = env("APP__NUMBER_GROUPING") {
        config.calculator.grouping = match v.to_ascii_lowercase().as_str() {
            "international" => NumberGrouping::International,
            "indian" | "en-in" => NumberGrouping::Indian,
            other => bail!("APP__NUMBER_GROUPING must be 'international' or 'indian', got '{other}'"),
        };
    }
    Ok(())
}

/// Tables merge recursively; arrays and scalars in `overlay` replace the base value.
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(base_table)), toml::Value::Table(overlay_table)) => {
                merge_tables(base_table, overlay_table);
            }
            (Some(slot), value) => *slot = value,
            (None, value) => {
                base.insert(key, value);
            }
        }
    }
}
