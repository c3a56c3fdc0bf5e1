use crate::{Collection, CollectionError, CollectionId};

/// Well-known id of the favorites collection on the reference server.
pub const FAVORITES_COLLECTION_ID: &str = "8234603c-c6e6-40cb-882c-c3d1e9c4ade8";

/// Collections with this name (any case) are never deleted.
pub const PROTECTED_COLLECTION_NAME: &str = "liked companies";

pub fn is_protected_name(name: &str) -> bool {
    name.trim().eq_ignore_ascii_case(PROTECTED_COLLECTION_NAME)
}

/// Last known collection metadata.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Catalog {
    collections: Vec<Collection>,
}

impl Catalog {
    pub fn replace(&mut self, collections: Vec<Collection>) {
        self.collections = collections;
    }

    pub fn get(&self, id: &CollectionId) -> Option<&Collection> {
        self.collections.iter().find(|c| &c.id == id)
    }

    pub fn name_of(&self, id: &CollectionId) -> Option<&str> {
        self.get(id).map(|c| c.name.as_str())
    }

    pub fn first(&self) -> Option<&Collection> {
        self.collections.first()
    }

    /// Look up by exact id first, then by case-insensitive name.
    pub fn resolve(&self, id_or_name: &str) -> Option<&Collection> {
        self.collections
            .iter()
            .find(|c| c.id.as_str() == id_or_name)
            .or_else(|| {
                let wanted = id_or_name.trim().to_lowercase();
                self.collections
                    .iter()
                    .find(|c| c.name.to_lowercase() == wanted)
            })
    }

    /// Trimmed name, if it is non-empty and not taken (ignoring case).
    pub fn validate_new_name(&self, name: &str) -> Result<String, CollectionError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(CollectionError::EmptyName);
        }
        let lowered = trimmed.to_lowercase();
        if let Some(existing) = self
            .collections
            .iter()
            .find(|c| c.name.to_lowercase() == lowered)
        {
            return Err(CollectionError::DuplicateName(existing.name.clone()));
        }
        Ok(trimmed.to_string())
    }

    pub fn check_deletable(&self, id: &CollectionId) -> Result<&Collection, CollectionError> {
        let collection = self
            .get(id)
            .ok_or_else(|| CollectionError::NotFound(id.clone()))?;
        if is_protected_name(&collection.name) {
            return Err(CollectionError::Protected(collection.name.clone()));
        }
        Ok(collection)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Collection> {
        self.collections.iter()
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}
