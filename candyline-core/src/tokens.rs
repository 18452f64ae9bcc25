//! Token catalog definitions

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Token kind identifier (index into a [`Catalog`])
pub type TokenId = u8;

/// Kinds used when no catalog is configured
pub const DEFAULT_TOKENS: [&str; 6] = ["Red", "Orange", "Yellow", "Green", "Blue", "Purple"];

/// Largest catalog addressable by [`TokenId`]
pub const MAX_TOKENS: usize = TokenId::MAX as usize + 1;

/// Ordered list of distinct token kinds.
///
/// The catalog is supplied by the host (usually one entry per visual asset).
/// Ids are positions in the list, so a catalog must not be reordered while a
/// board built from it is alive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Catalog {
    names: Vec<String>,
}

impl Catalog {
    /// Build a catalog, rejecting empty lists and duplicate names
    pub fn new<I, S>(names: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();

        if names.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        if names.len() > MAX_TOKENS {
            return Err(ConfigError::CatalogTooLarge { size: names.len() });
        }
        for (i, name) in names.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(ConfigError::BlankToken(i));
            }
            if names[..i].contains(name) {
                return Err(ConfigError::DuplicateToken(name.clone()));
            }
        }

        Ok(Self { names })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Name of a token kind
    pub fn name(&self, id: TokenId) -> Option<&str> {
        self.names.get(id as usize).map(String::as_str)
    }

    /// Look up a token kind by name
    pub fn id_of(&self, name: &str) -> Option<TokenId> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| i as TokenId)
    }

    /// All token ids in catalog order
    pub fn ids(&self) -> impl Iterator<Item = TokenId> {
        (0..self.names.len()).map(|i| i as TokenId)
    }

    /// Single-character label: first letter of the name, uppercased
    pub fn glyph(&self, id: TokenId) -> char {
        self.name(id)
            .and_then(|n| n.chars().next())
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('?')
    }

    /// Reverse of [`Catalog::glyph`]; the first kind whose glyph matches wins
    pub fn id_of_glyph(&self, glyph: char) -> Option<TokenId> {
        let glyph = glyph.to_ascii_uppercase();
        self.ids().find(|&id| self.glyph(id) == glyph)
    }

    /// Whether every kind has its own glyph, so boards render unambiguously
    pub fn has_unique_glyphs(&self) -> bool {
        self.ids()
            .all(|id| self.id_of_glyph(self.glyph(id)) == Some(id))
    }

    /// Uniform pick over the whole catalog (repeats allowed)
    pub fn random<R: Rng>(&self, rng: &mut R) -> TokenId {
        rng.gen_range(0..self.names.len()) as TokenId
    }

    /// Uniform pick over kinds not listed in `excluded`.
    ///
    /// Returns `None` when the exclusions cover the whole catalog.
    pub fn random_excluding<R: Rng>(
        &self,
        rng: &mut R,
        excluded: &[TokenId],
    ) -> Option<TokenId> {
        let candidates: Vec<TokenId> = self.ids().filter(|id| !excluded.contains(id)).collect();
        if candidates.is_empty() {
            return None;
        }
        Some(candidates[rng.gen_range(0..candidates.len())])
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            names: DEFAULT_TOKENS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl TryFrom<Vec<String>> for Catalog {
    type Error = ConfigError;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        Catalog::new(names)
    }
}

impl From<Catalog> for Vec<String> {
    fn from(catalog: Catalog) -> Self {
        catalog.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_default_catalog() {
        let catalog = Catalog::default();
        assert_eq!(catalog.len(), 6);
        assert_eq!(catalog.name(0), Some("Red"));
        assert_eq!(catalog.id_of("Blue"), Some(4));
        assert!(catalog.has_unique_glyphs());
    }

    #[test]
    fn test_rejects_bad_catalogs() {
        assert!(matches!(
            Catalog::new(Vec::<String>::new()),
            Err(ConfigError::EmptyCatalog)
        ));
        assert!(matches!(
            Catalog::new(["A", "B", "A"]),
            Err(ConfigError::DuplicateToken(name)) if name == "A"
        ));
        assert!(matches!(Catalog::new(["A", " "]), Err(ConfigError::BlankToken(1))));
    }

    #[test]
    fn test_glyph_lookup() {
        let catalog = Catalog::new(["apple", "banana", "cherry"]).unwrap();
        assert_eq!(catalog.glyph(1), 'B');
        assert_eq!(catalog.id_of_glyph('c'), Some(2));
        assert_eq!(catalog.id_of_glyph('Z'), None);
    }

    #[test]
    fn test_random_excluding_never_returns_excluded() {
        let catalog = Catalog::new(["A", "B", "C"]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..200 {
            assert_eq!(catalog.random_excluding(&mut rng, &[0, 2]), Some(1));
        }
        assert_eq!(catalog.random_excluding(&mut rng, &[0, 1, 2]), None);
    }

    #[test]
    fn test_serde_validates() {
        let json = r#"["A","B","C"]"#;
        let catalog: Catalog = serde_json::from_str(json).unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(serde_json::to_string(&catalog).unwrap(), json);

        assert!(serde_json::from_str::<Catalog>(r#"["A","A"]"#).is_err());
    }
}
