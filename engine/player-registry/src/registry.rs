use crate::error::RegistryError;
use crate::types::{normalize_name, Player, StatsRow};
use std::collections::HashMap;
use tracing::{debug, info};

/// Player statistics store keyed by normalized name
///
/// Players keep the order they were loaded in; that order is the stable
/// tie-break for similarity suggestions and the key for per-player random
/// streams. Aliases point a lineup spelling at an existing record without
/// copying it.
#[derive(Debug, Clone, Default)]
pub struct PlayerStatsStore {
    /// Players in load order
    players: Vec<Player>,

    /// Map from normalized name to index in `players`
    index_by_name: HashMap<String, usize>,

    /// Map from alias (lineup spelling) to index in `players`
    aliases: HashMap<String, usize>,
}

impl PlayerStatsStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self { players: Vec::new(), index_by_name: HashMap::new(), aliases: HashMap::new() }
    }

    /// Build a store from statistics rows
    pub fn from_rows(rows: &[StatsRow]) -> Result<Self, RegistryError> {
        let mut store = Self::new();
        for row in rows {
            store.insert(Player::from_row(row)?)?;
        }

        info!("Loaded {} players into statistics store", store.len());
        Ok(store)
    }

    /// Insert a player, rejecting duplicate names
    pub fn insert(&mut self, player: Player) -> Result<usize, RegistryError> {
        if self.index_by_name.contains_key(&player.name) {
            return Err(RegistryError::DuplicatePlayer(player.name));
        }

        let index = self.players.len();
        self.index_by_name.insert(player.name.clone(), index);
        self.players.push(player);
        Ok(index)
    }

    /// Register `alias` as another spelling of the canonical player `target`
    pub fn add_alias(&mut self, alias: &str, target: &str) -> Result<usize, RegistryError> {
        let alias = normalize_name(alias);
        let target = normalize_name(target);
        let index = *self.index_by_name.get(&target).ok_or_else(|| {
            RegistryError::UnknownAliasTarget { alias: alias.clone(), target: target.clone() }
        })?;

        if alias != target {
            debug!("Aliasing '{}' -> '{}'", alias, target);
            self.aliases.insert(alias, index);
        }
        Ok(index)
    }

    /// Index of a player by canonical name or alias
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index_by_name.get(name).or_else(|| self.aliases.get(name)).copied()
    }

    /// True if `name` is a canonical statistics name (aliases excluded)
    pub fn contains_canonical(&self, name: &str) -> bool {
        self.index_by_name.contains_key(name)
    }

    /// Get a player by canonical name or alias
    pub fn get(&self, name: &str) -> Result<&Player, RegistryError> {
        self.index_of(name)
            .map(|index| &self.players[index])
            .ok_or_else(|| RegistryError::PlayerNotFound(name.to_string()))
    }

    /// Get a player by store index
    pub fn player_at(&self, index: usize) -> Option<&Player> {
        self.players.get(index)
    }

    /// All players in load order
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Canonical names in load order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.players.iter().map(|player| player.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }
}
