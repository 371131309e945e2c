//! Shared clap argument types and the config/flag merge.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use playcards::{ErrorCorrection, IconPolicy, PageSize, SheetConfig};

/// Paper sizes accepted on the command line.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum PageSizeArg {
    A4,
    Letter,
    Legal,
}

impl From<PageSizeArg> for PageSize {
    fn from(value: PageSizeArg) -> PageSize {
        match value {
            PageSizeArg::A4 => PageSize::A4,
            PageSizeArg::Letter => PageSize::Letter,
            PageSizeArg::Legal => PageSize::Legal,
        }
    }
}

/// Reaction to an unusable icon.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum IconPolicyArg {
    Fail,
    Skip,
}

impl From<IconPolicyArg> for IconPolicy {
    fn from(value: IconPolicyArg) -> IconPolicy {
        match value {
            IconPolicyArg::Fail => IconPolicy::Fail,
            IconPolicyArg::Skip => IconPolicy::Skip,
        }
    }
}

/// QR error-correction levels.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum EcLevelArg {
    L,
    M,
    Q,
    H,
}

impl From<EcLevelArg> for ErrorCorrection {
    fn from(value: EcLevelArg) -> ErrorCorrection {
        match value {
            EcLevelArg::L => ErrorCorrection::Low,
            EcLevelArg::M => ErrorCorrection::Medium,
            EcLevelArg::Q => ErrorCorrection::Quartile,
            EcLevelArg::H => ErrorCorrection::High,
        }
    }
}

/// Sheet options shared by every command; each one overrides the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct SheetArgs {
    /// JSON config file (flags below take precedence).
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Paper size preset.
    #[arg(long = "pagesize", value_enum)]
    pub page_size: Option<PageSizeArg>,
    /// Custom page width in centimetres.
    #[arg(long = "page-width-cm")]
    pub page_width_cm: Option<f32>,
    /// Custom page height in centimetres.
    #[arg(long = "page-height-cm")]
    pub page_height_cm: Option<f32>,
    /// Edge length of a card in centimetres.
    #[arg(long = "tile-cm")]
    pub tile_cm: Option<f32>,
    /// Gap above the first row in centimetres.
    #[arg(long = "margin-cm")]
    pub margin_cm: Option<f32>,
    /// Image (path or URL) to embed in every QR code; keep it small and transparent.
    #[arg(long)]
    pub icon: Option<String>,
    /// What to do if the icon cannot be loaded.
    #[arg(long = "icon-policy", value_enum)]
    pub icon_policy: Option<IconPolicyArg>,
    /// QR error-correction level.
    #[arg(long = "ec-level", value_enum)]
    pub ec_level: Option<EcLevelArg>,
    /// Do not stroke tile borders.
    #[arg(long = "no-border")]
    pub no_border: bool,
}

impl SheetArgs {
    /// Load the config file (or defaults) and apply command-line overrides.
    pub fn resolve(&self) -> Result<SheetConfig> {
        let mut config = match &self.config {
            Some(path) => SheetConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => SheetConfig::default(),
        };
        if let Some(size) = self.page_size {
            config.page_size = size.into();
        }
        if self.page_width_cm.is_some() {
            config.page_width_cm = self.page_width_cm;
        }
        if self.page_height_cm.is_some() {
            config.page_height_cm = self.page_height_cm;
        }
        if let Some(tile) = self.tile_cm {
            config.tile_size_cm = tile;
        }
        if let Some(margin) = self.margin_cm {
            config.vertical_margin_cm = margin;
        }
        if let Some(icon) = &self.icon {
            config.icon = Some(icon.clone());
        }
        if let Some(policy) = self.icon_policy {
            config.icon_policy = policy.into();
        }
        if let Some(level) = self.ec_level {
            config.error_correction = level.into();
        }
        if self.no_border {
            config.border = false;
        }
        Ok(config)
    }
}
