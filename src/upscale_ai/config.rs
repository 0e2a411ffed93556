use crate::error::{Error, Result};

/// Default maximum tile width/height accepted by the model.
pub const DEFAULT_OVER_DIMENSION_LIMIT: u32 = 300;

/// Where the brightness/contrast adjustment is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ContrastStage {
    /// On every tile, right before inference
    #[default]
    PreInference,
    /// Once, on the stitched output
    PostComposite,
    /// Both of the above; the adjustment compounds
    Both,
}

impl ContrastStage {
    #[inline]
    pub const fn applies_pre_inference(self) -> bool {
        matches!(self, Self::PreInference | Self::Both)
    }

    #[inline]
    pub const fn applies_post_composite(self) -> bool {
        matches!(self, Self::PostComposite | Self::Both)
    }
}

/// Options for one enhancement run.
///
/// # Examples
///
/// ```
/// use upscale_ai::EnhancementConfig;
///
/// let config = EnhancementConfig::default()
///     .with_over_dimension_limit(256)
///     .with_preserve_alpha(true)
///     .with_reduction_percentage(25);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EnhancementConfig {
    /// Largest tile side passed to the model; images wider than twice this
    /// are shrunk before tiling
    pub over_dimension_limit: u32,
    /// Carry the alpha channel around inference instead of dropping it
    pub preserve_alpha: bool,
    /// Percentage removed from each side of the result, 0 disables
    pub reduction_percentage: u8,
    /// Contrast strength, 0 disables; halved before it is applied
    pub contrast_adjust: i32,
    pub contrast_stage: ContrastStage,
}

impl Default for EnhancementConfig {
    fn default() -> Self {
        Self {
            over_dimension_limit: DEFAULT_OVER_DIMENSION_LIMIT,
            preserve_alpha: false,
            reduction_percentage: 0,
            contrast_adjust: 0,
            contrast_stage: ContrastStage::default(),
        }
    }
}

impl EnhancementConfig {
    #[must_use]
    pub const fn with_over_dimension_limit(mut self, limit: u32) -> Self {
        self.over_dimension_limit = limit;
        self
    }

    #[must_use]
    pub const fn with_preserve_alpha(mut self, preserve: bool) -> Self {
        self.preserve_alpha = preserve;
        self
    }

    #[must_use]
    pub const fn with_reduction_percentage(mut self, percent: u8) -> Self {
        self.reduction_percentage = percent;
        self
    }

    #[must_use]
    pub const fn with_contrast_adjust(mut self, contrast: i32) -> Self {
        self.contrast_adjust = contrast;
        self
    }

    #[must_use]
    pub const fn with_contrast_stage(mut self, stage: ContrastStage) -> Self {
        self.contrast_stage = stage;
        self
    }

    /// Contrast percentage actually applied at each enabled stage.
    #[inline]
    pub const fn effective_contrast(&self) -> i32 {
        self.contrast_adjust / 2
    }

    /// Whether the result is shrunk after stitching.
    #[inline]
    pub const fn reduces_output(&self) -> bool {
        self.reduction_percentage > 0 && self.reduction_percentage < 100
    }

    /// # Errors
    ///
    /// * `Error::InvalidConfig` - For a zero tile limit, a reduction above
    ///   100 percent or a negative contrast
    pub fn validate(&self) -> Result<()> {
        if self.over_dimension_limit == 0 {
            return Err(Error::InvalidConfig(
                "over_dimension_limit must be greater than zero".to_string(),
            ));
        }
        if self.reduction_percentage > 100 {
            return Err(Error::InvalidConfig(format!(
                "reduction_percentage must be within 0..=100, got {}",
                self.reduction_percentage
            )));
        }
        if self.contrast_adjust < 0 {
            return Err(Error::InvalidConfig(format!(
                "contrast_adjust must not be negative, got {}",
                self.contrast_adjust
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = EnhancementConfig::default();
        assert_eq!(config.over_dimension_limit, 300);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_limit_is_rejected() {
        let config = EnhancementConfig::default().with_over_dimension_limit(0);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn out_of_range_percentage_is_rejected() {
        let config = EnhancementConfig::default().with_reduction_percentage(101);
        assert!(config.validate().is_err());
    }

    #[test]
    fn negative_contrast_is_rejected() {
        let config = EnhancementConfig::default().with_contrast_adjust(-5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn contrast_is_halved() {
        let config = EnhancementConfig::default().with_contrast_adjust(25);
        assert_eq!(config.effective_contrast(), 12);
    }

    #[test]
    fn full_reduction_is_ignored() {
        assert!(!EnhancementConfig::default()
            .with_reduction_percentage(100)
            .reduces_output());
        assert!(EnhancementConfig::default()
            .with_reduction_percentage(50)
            .reduces_output());
    }

    #[test]
    fn contrast_stage_flags() {
        assert!(ContrastStage::PreInference.applies_pre_inference());
        assert!(!ContrastStage::PreInference.applies_post_composite());
        assert!(ContrastStage::Both.applies_pre_inference());
        assert!(ContrastStage::Both.applies_post_composite());
    }
}
