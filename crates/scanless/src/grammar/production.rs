//! Production values and builder operators.
//!
//! A [`Production`] is the user-facing description of a grammar fragment.
//! The operators here are pure value constructors; nothing is compiled or
//! resolved until [`GrammarBuilder::build`](crate::grammar::GrammarBuilder)
//! lowers the productions into the node arena. References between rules are
//! by name ([`rule`]) and resolve at build time, which is what makes cyclic
//! and forward references possible.

use compact_str::CompactString;

/// An unresolved grammar fragment, composed from the operator functions.
#[derive(Debug, Clone)]
pub struct Production {
    pub(crate) kind: ProductionKind,
    /// Optionality seed; set by [`possibly`] and [`zero_or_more`].
    pub(crate) optional: bool,
    /// Memoization seed; set by [`cached`] / [`uncached`].
    pub(crate) cache: Option<bool>,
}

#[derive(Debug, Clone)]
pub(crate) enum ProductionKind {
    Literal(CompactString),
    /// Uncompiled regex source; compiled per usage site at build time.
    Pattern(CompactString),
    Sequence(Vec<Production>),
    Choice {
        members: Vec<Production>,
        exhaustive: bool,
    },
    Repeat(Box<Production>),
    /// Reference to another production by rule key.
    Reference(CompactString),
}

impl Production {
    const fn new(kind: ProductionKind) -> Self {
        Self {
            kind,
            optional: false,
            cache: None,
        }
    }
}

/// A verbatim string terminal. Must be non-empty (checked at build time).
#[must_use]
pub fn lit(text: impl AsRef<str>) -> Production {
    Production::new(ProductionKind::Literal(text.as_ref().into()))
}

/// A regex terminal matching at the current offset.
///
/// The pattern is compiled during
/// [`GrammarBuilder::build`](crate::grammar::GrammarBuilder::build); regex
/// syntax errors and mixed named/unnamed capture groups are reported there.
#[must_use]
pub fn pattern(source: impl AsRef<str>) -> Production {
    Production::new(ProductionKind::Pattern(source.as_ref().into()))
}

/// A reference to the production registered under `name`.
#[must_use]
pub fn rule(name: impl AsRef<str>) -> Production {
    Production::new(ProductionKind::Reference(name.as_ref().into()))
}

/// Match every member in order.
#[must_use]
pub fn seq<I>(members: I) -> Production
where
    I: IntoIterator,
    I::Item: Into<Production>,
{
    Production::new(ProductionKind::Sequence(
        members.into_iter().map(Into::into).collect(),
    ))
}

/// Ordered choice: the first member that matches wins.
#[must_use]
pub fn any_of<I>(members: I) -> Production
where
    I: IntoIterator,
    I::Item: Into<Production>,
{
    Production::new(ProductionKind::Choice {
        members: members.into_iter().map(Into::into).collect(),
        exhaustive: false,
    })
}

/// Exhaustive choice: every member is evaluated and the longest match wins;
/// ties go to the earliest member.
#[must_use]
pub fn best_of<I>(members: I) -> Production
where
    I: IntoIterator,
    I::Item: Into<Production>,
{
    Production::new(ProductionKind::Choice {
        members: members.into_iter().map(Into::into).collect(),
        exhaustive: true,
    })
}

/// Greedy repetition tolerating zero matches.
#[must_use]
pub fn zero_or_more(body: impl Into<Production>) -> Production {
    let mut p = Production::new(ProductionKind::Repeat(Box::new(body.into())));
    p.optional = true;
    p
}

/// Greedy repetition requiring at least one match.
#[must_use]
pub fn one_or_more(body: impl Into<Production>) -> Production {
    Production::new(ProductionKind::Repeat(Box::new(body.into())))
}

/// Mark a production optional: a failure to match is tolerated by the
/// surrounding sequence.
#[must_use]
pub fn possibly(p: impl Into<Production>) -> Production {
    let mut p = p.into();
    p.optional = true;
    p
}

/// Memoize parse results for this production at every offset.
#[must_use]
pub fn cached(p: impl Into<Production>) -> Production {
    let mut p = p.into();
    p.cache = Some(true);
    p
}

/// Force this production uncached even when the engine default caches.
#[must_use]
pub fn uncached(p: impl Into<Production>) -> Production {
    let mut p = p.into();
    p.cache = Some(false);
    p
}

impl From<&str> for Production {
    fn from(text: &str) -> Self {
        lit(text)
    }
}

impl From<String> for Production {
    fn from(text: String) -> Self {
        lit(text)
    }
}

impl From<Vec<Production>> for Production {
    fn from(members: Vec<Production>) -> Self {
        seq(members)
    }
}

impl<const N: usize> From<[Production; N]> for Production {
    fn from(members: [Production; N]) -> Self {
        seq(members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operators_are_pure() {
        let base = lit("a");
        let optional = possibly(base.clone());
        assert!(!base.optional);
        assert!(optional.optional);
    }

    #[test]
    fn test_cache_seeds() {
        assert_eq!(lit("a").cache, None);
        assert_eq!(cached(lit("a")).cache, Some(true));
        assert_eq!(uncached(cached(lit("a"))).cache, Some(false));
    }

    #[test]
    fn test_zero_or_more_seeds_optional() {
        assert!(zero_or_more(lit("a")).optional);
        assert!(!one_or_more(lit("a")).optional);
    }

    #[test]
    fn test_string_conversion() {
        let p: Production = "hello".into();
        assert!(matches!(p.kind, ProductionKind::Literal(ref t) if t == "hello"));
    }

    #[test]
    fn test_array_conversion() {
        let p: Production = [lit("a"), rule("b")].into();
        assert!(matches!(p.kind, ProductionKind::Sequence(ref m) if m.len() == 2));
    }
}
