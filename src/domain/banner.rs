//! Sitewide promotional banner.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Visual style of the banner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BannerVariant {
    /// Neutral styling.
    #[default]
    Default,
    /// Warning styling.
    Destructive,
    /// Informational styling.
    Info,
}

/// Announcement shown on the storefront home page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PromoBanner {
    /// Whether the banner is shown.
    #[serde(default)]
    pub enabled: bool,
    /// Banner text.
    #[serde(default)]
    pub text: String,
    /// Banner style.
    #[serde(default)]
    pub variant: BannerVariant,
}
