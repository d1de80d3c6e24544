use bitflags::bitflags;

bitflags! {
    /// View states a drawable can be asked to reflect.
    ///
    /// Bits a drawable does not recognise are dropped by
    /// [`StateSet::from_bits_truncate`] rather than rejected.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct StateSet: u32 {
        const ENABLED        = 1 << 0;
        const PRESSED        = 1 << 1;
        const FOCUSED        = 1 << 2;
        const HOVERED        = 1 << 3;
        const SELECTED       = 1 << 4;
        const CHECKED        = 1 << 5;
        const ACTIVATED      = 1 << 6;
        const WINDOW_FOCUSED = 1 << 7;
    }
}

bitflags! {
    /// Configuration changes a constant state depends on.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ConfigChanges: u32 {
        const DENSITY          = 1 << 0;
        const THEME            = 1 << 1;
        const LAYOUT_DIRECTION = 1 << 2;
        const ORIENTATION      = 1 << 3;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutDirection {
    #[default]
    Ltr,
    Rtl,
}

/// How a drawable covers the pixels inside its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opacity {
    Unknown,
    Translucent,
    Transparent,
    Opaque,
}

/// Combine two opacities into the one that describes drawing both.
pub fn resolve_opacity(a: Opacity, b: Opacity) -> Opacity {
    if a == b {
        return a;
    }
    if a == Opacity::Unknown || b == Opacity::Unknown {
        return Opacity::Unknown;
    }
    if a == Opacity::Translucent || b == Opacity::Translucent {
        return Opacity::Translucent;
    }
    if a == Opacity::Transparent || b == Opacity::Transparent {
        return Opacity::Transparent;
    }
    Opacity::Opaque
}
