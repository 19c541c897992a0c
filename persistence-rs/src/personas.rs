// persistence-rs/src/personas.rs
// Cultural persona store, keyed case-insensitively by locale code.

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use shared_types::CulturalPersona;

use crate::cache::TtlCache;
use crate::error::StoreError;

#[async_trait]
pub trait PersonaStore: Send + Sync {
    async fn get(&self, code: &str) -> Result<Option<CulturalPersona>, StoreError>;

    /// Insert or replace; returns the stored persona with its code lowercased.
    async fn create(&self, persona: CulturalPersona) -> Result<CulturalPersona, StoreError>;
}

pub struct InMemoryPersonaStore {
    personas: DashMap<String, CulturalPersona>,
    cache: TtlCache<CulturalPersona>,
}

impl InMemoryPersonaStore {
    pub fn new(cache_ttl: Duration) -> Self {
        Self {
            personas: DashMap::new(),
            cache: TtlCache::new(cache_ttl),
        }
    }

    pub fn seed(&self, personas: Vec<CulturalPersona>) -> usize {
        let mut inserted = 0;
        for mut persona in personas {
            let key = persona.code.to_lowercase();
            if !self.personas.contains_key(&key) {
                persona.code = key.clone();
                self.personas.insert(key, persona);
                inserted += 1;
            }
        }
        tracing::info!(inserted, "cultural_personas_seeded");
        inserted
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }
}

#[async_trait]
impl PersonaStore for InMemoryPersonaStore {
    async fn get(&self, code: &str) -> Result<Option<CulturalPersona>, StoreError> {
        let key = code.trim().to_lowercase();
        if let Some(cached) = self.cache.get(&key) {
            return Ok(Some(cached));
        }

        let persona = self.personas.get(&key).map(|p| p.value().clone());
        if let Some(found) = &persona {
            self.cache.insert(key, found.clone());
        }
        Ok(persona)
    }

    async fn create(&self, mut persona: CulturalPersona) -> Result<CulturalPersona, StoreError> {
        let key = persona.code.trim().to_lowercase();
        if key.is_empty() {
            return Err(StoreError::InvalidInput("persona code must not be empty".to_string()));
        }
        persona.code = key.clone();

        self.personas.insert(key.clone(), persona.clone());
        self.cache.invalidate(&key);
        tracing::info!(
            code = %persona.code,
            source = %persona.source,
            verified = persona.is_verified,
            "cultural_persona_stored"
        );
        Ok(persona)
    }
}
