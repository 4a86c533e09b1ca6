// crates/phgeo-core/src/text.rs
//! Accent- and case-insensitive text matching.
//!
//! Philippine place names carry diacritics (`Doña Imelda`, `Parañaque`) that
//! users rarely type. Everything here compares on the folded form produced
//! by [`fold_key`].
use crate::model::Geography;

/// Transliterates `s` to ASCII and lowercases it.
///
/// ```rust
/// use phgeo_core::text::fold_key;
///
/// assert_eq!(fold_key("Doña Imelda"), "dona imelda");
/// assert_eq!(fold_key("PARAÑAQUE"), "paranaque");
/// ```
pub fn fold_key(s: &str) -> String {
    deunicode::deunicode(s).to_lowercase()
}

/// Equality on the folded forms of `a` and `b`.
pub fn equals_folded(a: &str, b: &str) -> bool {
    fold_key(a) == fold_key(b)
}

/// Name-based matching helpers for anything with a display name.
///
/// # Examples
/// ```rust
/// use phgeo_core::text::NameMatch;
///
/// struct Place(&'static str);
/// impl NameMatch for Place {
///     fn name_str(&self) -> &str { self.0 }
/// }
///
/// assert!(Place("Parañaque").is_named("paranaque"));
/// assert!(Place("Doña Imelda").name_contains("dona"));
/// ```
pub trait NameMatch {
    /// The name used for matching; empty when there is none.
    fn name_str(&self) -> &str;

    #[inline]
    fn is_named(&self, q: &str) -> bool {
        equals_folded(self.name_str(), q)
    }

    /// Substring match on folded forms. An empty query matches nothing.
    #[inline]
    fn name_contains(&self, q: &str) -> bool {
        let q = fold_key(q);
        !q.is_empty() && fold_key(self.name_str()).contains(&q)
    }
}

impl<T: Geography> NameMatch for T {
    fn name_str(&self) -> &str {
        self.name().unwrap_or_default()
    }
}
