//! Optional capability modelling
//!
//! A capability slot is either fully functional or absent. There is no
//! half-initialized state and no null check at call sites: absence is a
//! value of [`Capability::Unsupported`], and a backend that never has the
//! capability names [`Absent`] as its implementation type.

/// Result of asking a platform for an optional capability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Capability<T> {
    /// The target provides this capability
    Supported(T),
    /// The target lacks this capability
    Unsupported,
}

impl<T> Capability<T> {
    /// Check if the capability is present
    pub fn is_supported(&self) -> bool {
        matches!(self, Capability::Supported(_))
    }

    /// Convert into an `Option`
    pub fn into_option(self) -> Option<T> {
        match self {
            Capability::Supported(value) => Some(value),
            Capability::Unsupported => None,
        }
    }

    /// Borrow the contained value
    pub fn as_ref(&self) -> Capability<&T> {
        match self {
            Capability::Supported(value) => Capability::Supported(value),
            Capability::Unsupported => Capability::Unsupported,
        }
    }

    /// Map the supported value, leaving `Unsupported` untouched
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Capability<U> {
        match self {
            Capability::Supported(value) => Capability::Supported(f(value)),
            Capability::Unsupported => Capability::Unsupported,
        }
    }

    /// Run `f` only when the capability is present
    ///
    /// Returns `None` when the capability is absent.
    pub fn with<U, F: FnOnce(T) -> U>(self, f: F) -> Option<U> {
        self.map(f).into_option()
    }
}

impl<T> From<Option<T>> for Capability<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Capability::Supported(value),
            None => Capability::Unsupported,
        }
    }
}

/// Implementation type for a capability the target never has
///
/// `Absent` has no values, so a backend naming it can only ever return
/// [`Capability::Unsupported`] for that slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Absent {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_capability() {
        let cap = Capability::Supported(3u8);
        assert!(cap.is_supported());
        assert_eq!(cap.map(|v| v * 2), Capability::Supported(6));
        assert_eq!(cap.into_option(), Some(3));
    }

    #[test]
    fn test_unsupported_capability() {
        let cap: Capability<u8> = Capability::Unsupported;
        assert!(!cap.is_supported());
        assert_eq!(cap.with(|v| v + 1), None);
        assert_eq!(cap.into_option(), None);
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Capability::from(Some(1)), Capability::Supported(1));
        assert_eq!(Capability::<u8>::from(None), Capability::Unsupported);
    }
}
