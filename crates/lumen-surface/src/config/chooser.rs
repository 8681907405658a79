use std::fmt;

use crate::error::{BridgeError, BridgeResult};

/// Requested (or offered) bit depths of a rendering context.
///
/// The same type describes both sides of the negotiation: the platform's
/// available configurations and the precision a surface asks for.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ContextConfig {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
    pub depth: u8,
    pub stencil: u8,
}

impl ContextConfig {
    pub const fn new(red: u8, green: u8, blue: u8, alpha: u8, depth: u8, stencil: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
            depth,
            stencil,
        }
    }

    /// 8-bit RGBA with the given depth/stencil.
    pub const fn rgba8(depth: u8, stencil: u8) -> Self {
        Self::new(8, 8, 8, 8, depth, stencil)
    }

    /// Returns `true` if `offered` satisfies this request.
    ///
    /// Color channels must match exactly (a mismatch is a bad-match error on most
    /// platforms). Depth and stencil are minimums.
    pub fn accepts(&self, offered: &ContextConfig) -> bool {
        offered.red == self.red
            && offered.green == self.green
            && offered.blue == self.blue
            && offered.alpha == self.alpha
            && offered.depth >= self.depth
            && offered.stencil >= self.stencil
    }

    /// Picks the most specific acceptable candidate.
    ///
    /// Smallest depth surplus wins, then smallest stencil surplus; ties keep
    /// platform order.
    pub fn choose(&self, candidates: &[ContextConfig]) -> Option<ContextConfig> {
        candidates
            .iter()
            .filter(|c| self.accepts(c))
            .min_by_key(|c| (c.depth - self.depth, c.stencil - self.stencil))
            .copied()
    }
}

impl fmt::Display for ContextConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "r{}g{}b{}a{} d{} s{}",
            self.red, self.green, self.blue, self.alpha, self.depth, self.stencil
        )
    }
}

/// Ordered chain of configuration strategies.
///
/// The first entry is the primary request. Each following entry is only consulted
/// when every entry before it found no match, and is given the same candidate list.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ConfigChooser {
    chain: Vec<ContextConfig>,
}

impl ConfigChooser {
    pub fn new(primary: ContextConfig) -> Self {
        Self {
            chain: vec![primary],
        }
    }

    /// Appends a fallback tried after everything already in the chain.
    pub fn with_fallback(mut self, fallback: ContextConfig) -> Self {
        self.chain.push(fallback);
        self
    }

    /// Selects a configuration from the platform's `candidates`.
    ///
    /// Failing every strategy is fatal for the surface: nothing can be rendered
    /// without a context.
    pub fn choose(&self, candidates: &[ContextConfig]) -> BridgeResult<ContextConfig> {
        for (index, request) in self.chain.iter().enumerate() {
            if index > 0 {
                log::warn!("trying context config fallback {request}");
            }

            if let Some(found) = request.choose(candidates) {
                log::debug!("context config {found} selected for request {request}");
                return Ok(found);
            }
        }

        let requested = self
            .chain
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" -> ");

        log::error!(
            "no context config among {} candidates matches {requested}",
            candidates.len()
        );

        Err(BridgeError::NoMatchingConfig { requested })
    }
}

impl Default for ConfigChooser {
    /// 24-bit depth, falling back to 16-bit depth.
    fn default() -> Self {
        ConfigChooser::new(ContextConfig::rgba8(24, 0)).with_fallback(ContextConfig::rgba8(16, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const D24: ContextConfig = ContextConfig::rgba8(24, 0);
    const D16: ContextConfig = ContextConfig::rgba8(16, 0);

    // ── ContextConfig ─────────────────────────────────────────────────────

    #[test]
    fn accepts_requires_exact_color_channels() {
        let rgb565 = ContextConfig::new(5, 6, 5, 0, 24, 0);
        assert!(!D24.accepts(&rgb565));
    }

    #[test]
    fn accepts_treats_depth_and_stencil_as_minimums() {
        assert!(D16.accepts(&ContextConfig::rgba8(24, 8)));
        assert!(!D24.accepts(&D16));
    }

    #[test]
    fn choose_prefers_smallest_surplus() {
        let candidates = [ContextConfig::rgba8(32, 8), ContextConfig::rgba8(24, 8), D24];
        assert_eq!(D16.choose(&candidates), Some(D24));
    }

    #[test]
    fn choose_keeps_platform_order_on_ties() {
        let a = ContextConfig::rgba8(24, 8);
        let b = ContextConfig::rgba8(24, 8);
        assert_eq!(D24.choose(&[a, b]), Some(a));
    }

    #[test]
    fn display_is_compact() {
        assert_eq!(D24.to_string(), "r8g8b8a8 d24 s0");
    }

    // ── ConfigChooser ─────────────────────────────────────────────────────

    #[test]
    fn primary_match_wins() {
        let chooser = ConfigChooser::default();
        assert_eq!(chooser.choose(&[D16, D24]).unwrap(), D24);
    }

    #[test]
    fn fallback_result_replaces_primary() {
        let chooser = ConfigChooser::new(D24).with_fallback(D16);
        assert_eq!(chooser.choose(&[D16]).unwrap(), D16);
    }

    #[test]
    fn fallbacks_are_tried_in_order() {
        let chooser = ConfigChooser::new(ContextConfig::rgba8(32, 8))
            .with_fallback(D24)
            .with_fallback(D16);
        assert_eq!(chooser.choose(&[D16, D24]).unwrap(), D24);
    }

    #[test]
    fn exhausted_chain_is_no_matching_config() {
        let chooser = ConfigChooser::default();
        let err = chooser
            .choose(&[ContextConfig::new(5, 6, 5, 0, 16, 0)])
            .unwrap_err();
        assert!(matches!(err, BridgeError::NoMatchingConfig { .. }));
        assert!(err.to_string().contains("r8g8b8a8 d24 s0 -> r8g8b8a8 d16 s0"));
    }

    #[test]
    fn empty_candidate_list_fails() {
        assert!(ConfigChooser::default().choose(&[]).is_err());
    }
}
