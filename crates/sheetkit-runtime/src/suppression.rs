#![forbid(unsafe_code)]

//! Suppression tokens.
//!
//! While any token is held the sheet stays hidden. Tokens are opaque and
//! released explicitly; releasing a token twice, or one that was never
//! issued, has no effect.
//!
//! Host signals (immersive mode, overlays, a detached anchor) hold at most
//! one token each, keyed by [`SuppressionKey`], so a repeated signal does
//! not stack.

use ahash::{AHashMap, AHashSet};

/// Opaque handle returned by a suppression request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SuppressionToken(u64);

/// Host-level events that hide or release the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuppressionSignal {
    ImmersiveModeEntered,
    ImmersiveModeExited,
    OverlayShown,
    OverlayHidden,
    AnchorDetached,
}

/// The source a keyed token belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuppressionKey {
    ImmersiveMode,
    Overlay,
    AnchorDetached,
}

impl SuppressionSignal {
    /// The key this signal acts on, and whether it acquires (`true`) or
    /// releases (`false`) it.
    #[must_use]
    pub const fn key(self) -> (SuppressionKey, bool) {
        match self {
            Self::ImmersiveModeEntered => (SuppressionKey::ImmersiveMode, true),
            Self::ImmersiveModeExited => (SuppressionKey::ImmersiveMode, false),
            Self::OverlayShown => (SuppressionKey::Overlay, true),
            Self::OverlayHidden => (SuppressionKey::Overlay, false),
            Self::AnchorDetached => (SuppressionKey::AnchorDetached, true),
        }
    }
}

#[derive(Debug, Default)]
pub struct SuppressionTokens {
    next: u64,
    active: AHashSet<SuppressionToken>,
    keyed: AHashMap<SuppressionKey, SuppressionToken>,
}

impl SuppressionTokens {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new token.
    pub fn acquire(&mut self) -> SuppressionToken {
        let token = SuppressionToken(self.next);
        self.next += 1;
        self.active.insert(token);
        token
    }

    /// Release a token. Returns whether it was active.
    pub fn release(&mut self, token: SuppressionToken) -> bool {
        if !self.active.remove(&token) {
            return false;
        }
        self.keyed.retain(|_, held| *held != token);
        true
    }

    /// Token for `key`, issuing one if none is held. The flag is true when a
    /// new token was issued.
    pub fn acquire_keyed(&mut self, key: SuppressionKey) -> (SuppressionToken, bool) {
        if let Some(token) = self.keyed.get(&key) {
            return (*token, false);
        }
        let token = self.acquire();
        self.keyed.insert(key, token);
        (token, true)
    }

    /// Release the token held for `key`, if any.
    pub fn release_keyed(&mut self, key: SuppressionKey) -> Option<SuppressionToken> {
        let token = self.keyed.remove(&key)?;
        self.active.remove(&token);
        Some(token)
    }

    #[must_use]
    pub fn holds(&self, key: SuppressionKey) -> bool {
        self.keyed.contains_key(&key)
    }

    #[inline]
    #[must_use]
    pub fn is_suppressed(&self) -> bool {
        !self.active.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_independent() {
        let mut tokens = SuppressionTokens::new();
        let a = tokens.acquire();
        let b = tokens.acquire();
        assert_ne!(a, b);
        assert!(tokens.release(a));
        assert!(tokens.is_suppressed());
        assert!(tokens.release(b));
        assert!(!tokens.is_suppressed());
    }

    #[test]
    fn double_release_is_inert() {
        let mut tokens = SuppressionTokens::new();
        let a = tokens.acquire();
        assert!(tokens.release(a));
        assert!(!tokens.release(a));
        assert!(tokens.is_empty());
    }

    #[test]
    fn keyed_tokens_do_not_stack() {
        let mut tokens = SuppressionTokens::new();
        let (first, issued) = tokens.acquire_keyed(SuppressionKey::Overlay);
        assert!(issued);
        let (again, issued) = tokens.acquire_keyed(SuppressionKey::Overlay);
        assert!(!issued);
        assert_eq!(first, again);
        assert_eq!(tokens.len(), 1);

        assert_eq!(tokens.release_keyed(SuppressionKey::Overlay), Some(first));
        assert_eq!(tokens.release_keyed(SuppressionKey::Overlay), None);
        assert!(tokens.is_empty());
    }

    #[test]
    fn releasing_keyed_token_directly_clears_key() {
        let mut tokens = SuppressionTokens::new();
        let (token, _) = tokens.acquire_keyed(SuppressionKey::ImmersiveMode);
        assert!(tokens.release(token));
        assert!(!tokens.holds(SuppressionKey::ImmersiveMode));
    }

    #[test]
    fn signals_map_to_keys() {
        assert_eq!(
            SuppressionSignal::OverlayShown.key(),
            (SuppressionKey::Overlay, true)
        );
        assert_eq!(
            SuppressionSignal::ImmersiveModeExited.key(),
            (SuppressionKey::ImmersiveMode, false)
        );
    }
}
