// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Simulation configuration and its storage port.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use gridphase_geom::generate::{random_objects, ShapeDistribution};
use gridphase_geom::{PhysicsObject, SpatialHashConfig};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use crate::{Bounds, IntegratorParams, SimError};

/// Key under which [`SimConfig`] is stored.
pub const SIM_CONFIG_KEY: &str = "sim";

/// Everything the loop driver needs to build and run a world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Objects spawned by [`SimConfig::spawn_objects`].
    pub object_count: usize,
    /// Seed for the spawn generator.
    pub seed: u64,
    /// Arena extent used for containment.
    pub bounds: Bounds,
    /// Gravity and damping.
    pub integrator: IntegratorParams,
    /// Height potential energy is measured against; defaults to the arena floor.
    pub reference_height: Option<f64>,
    /// Broad-phase tuning; `enabled = false` selects the naive detector.
    pub spatial_hash: SpatialHashConfig,
    /// Shape statistics for spawned objects. The arena fields are replaced
    /// by `bounds` when spawning.
    pub shape: ShapeDistribution,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            object_count: 200,
            seed: 0x5eed,
            bounds: Bounds::default(),
            integrator: IntegratorParams::default(),
            reference_height: None,
            spatial_hash: SpatialHashConfig::default(),
            shape: ShapeDistribution::default(),
        }
    }
}

impl SimConfig {
    /// Height used by the energy accountant.
    pub fn reference_height(&self) -> f64 {
        self.reference_height.unwrap_or(self.bounds.height)
    }

    fn spawn_shape(&self) -> ShapeDistribution {
        ShapeDistribution {
            arena_width: self.bounds.width,
            arena_height: self.bounds.height,
            ..self.shape
        }
    }

    /// Checks every nested invariant, failing on the first violation.
    ///
    /// # Errors
    /// Returns the [`SimError`] describing the offending field.
    pub fn validate(&self) -> Result<(), SimError> {
        self.bounds.validate()?;
        self.integrator.validate()?;
        self.spatial_hash.validate()?;
        self.spawn_shape().validate()?;
        if let Some(h) = self.reference_height {
            if !h.is_finite() {
                return Err(SimError::InvalidReferenceHeight(h));
            }
        }
        Ok(())
    }

    /// Generates `object_count` dynamic objects inside `bounds`.
    ///
    /// # Errors
    /// Fails if the configuration does not validate.
    pub fn spawn_objects(&self) -> Result<Vec<PhysicsObject>, SimError> {
        self.validate()?;
        Ok(random_objects(self.object_count, 0, self.seed, &self.spawn_shape())?)
    }
}

/// Where serialized configs live, addressed by key (`"sim"` for
/// [`SimConfig`]). Stores move bytes only; parsing and validation happen in
/// [`ConfigService`].
pub trait ConfigStore {
    /// Returns the JSON bytes stored under `key`, or
    /// [`ConfigError::NotFound`] if nothing was ever saved there.
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError>;
    /// Replaces whatever is stored under `key`.
    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError>;
}

/// Failure to read, parse, or accept a stored simulation config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Nothing stored under the key. [`ConfigService`] turns this into
    /// "use defaults" rather than an error.
    #[error("no config stored under `{0}`")]
    NotFound(String),
    /// The backing file or directory could not be read or written.
    #[error("config storage: {0}")]
    Io(#[from] std::io::Error),
    /// The stored bytes are not valid JSON for the requested type.
    #[error("malformed config json: {0}")]
    Serde(#[from] serde_json::Error),
    /// The JSON parsed, but a value is out of range (cell size, bounds...).
    #[error("invalid config: {0}")]
    Invalid(#[from] SimError),
}

/// JSON layer between the simulation and a [`ConfigStore`].
pub struct ConfigService<S> {
    store: S,
}

impl<S> ConfigService<S> {
    /// Wraps `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Unwraps the store, e.g. to inspect what a test saved.
    pub fn into_inner(self) -> S {
        self.store
    }
}

impl<S> ConfigService<S>
where
    S: ConfigStore,
{
    /// Reads `key` as `T`.
    ///
    /// A missing key and an empty blob (a freshly truncated file) both mean
    /// "nothing configured yet" and yield `Ok(None)`.
    pub fn load<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: DeserializeOwned,
    {
        let bytes = match self.store.load_raw(key) {
            Ok(bytes) => bytes,
            Err(ConfigError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        if bytes.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Writes `value` under `key` as pretty-printed JSON, so hand edits of
    /// `sim.json` stay readable.
    pub fn save<T>(&self, key: &str, value: &T) -> Result<(), ConfigError>
    where
        T: Serialize,
    {
        self.store.save_raw(key, &serde_json::to_vec_pretty(value)?)
    }

    /// Loads the config stored under [`SIM_CONFIG_KEY`].
    ///
    /// No stored `sim` key means a first run: the result is
    /// [`SimConfig::default`]. Fields absent from the stored JSON take their
    /// defaults too. The merged result must validate.
    pub fn load_sim(&self) -> Result<SimConfig, ConfigError> {
        let cfg: SimConfig = self.load(SIM_CONFIG_KEY)?.unwrap_or_default();
        cfg.validate()?;
        Ok(cfg)
    }
}

/// Stores configs as `<key>.json` files under a base directory.
pub struct FsConfigStore {
    base: PathBuf,
}

impl FsConfigStore {
    /// Create a store rooted at `base`, creating the directory if needed.
    pub fn new(base: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let base = base.into();
        fs::create_dir_all(&base)?;
        Ok(Self { base })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.base.join(format!("{key}.json"))
    }
}

impl ConfigStore for FsConfigStore {
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(ConfigError::NotFound(key.to_owned()))
            }
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
        fs::write(self.path_for(key), data)?;
        Ok(())
    }
}

/// In-memory [`ConfigStore`] for tests and embedding hosts without a filesystem.
#[derive(Clone, Default)]
pub struct InMemoryConfigStore {
    inner: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl InMemoryConfigStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys stored.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// `true` when no key is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ConfigStore for InMemoryConfigStore {
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
        let data = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        data.get(key)
            .cloned()
            .ok_or_else(|| ConfigError::NotFound(key.to_owned()))
    }

    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        map.insert(key.to_owned(), data.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let svc = ConfigService::new(InMemoryConfigStore::new());
        assert_eq!(svc.load_sim().unwrap(), SimConfig::default());
    }

    #[test]
    fn round_trips_through_store() {
        let store = InMemoryConfigStore::new();
        let svc = ConfigService::new(store.clone());
        let cfg = SimConfig {
            object_count: 12,
            seed: 99,
            reference_height: Some(10.0),
            ..SimConfig::default()
        };
        svc.save(SIM_CONFIG_KEY, &cfg).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(svc.load_sim().unwrap(), cfg);
    }

    #[test]
    fn partial_json_uses_field_defaults() {
        let store = InMemoryConfigStore::new();
        store
            .save_raw(SIM_CONFIG_KEY, br#"{"object_count": 5, "spatial_hash": {"cell_size": 12.5}}"#)
            .unwrap();
        let cfg = ConfigService::new(store).load_sim().unwrap();
        assert_eq!(cfg.object_count, 5);
        assert_eq!(cfg.spatial_hash.cell_size, 12.5);
        assert!(cfg.spatial_hash.enabled);
        assert_eq!(cfg.bounds, Bounds::default());
    }

    #[test]
    fn invalid_cell_size_fails_fast() {
        let store = InMemoryConfigStore::new();
        store
            .save_raw(SIM_CONFIG_KEY, br#"{"spatial_hash": {"cell_size": 0}}"#)
            .unwrap();
        let err = ConfigService::new(store).load_sim().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(SimError::Geom(_))), "{err}");
    }

    #[test]
    fn fs_store_reports_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsConfigStore::new(dir.path()).unwrap();
        match store.load_raw("nope") {
            Err(ConfigError::NotFound(key)) => assert_eq!(key, "nope"),
            other => panic!("expected NotFound, got {other:?}"),
        }
        let svc = ConfigService::new(store);
        svc.save(SIM_CONFIG_KEY, &SimConfig::default()).unwrap();
        assert!(dir.path().join("sim.json").exists());
        assert_eq!(svc.load_sim().unwrap(), SimConfig::default());
    }

    #[test]
    fn spawned_objects_fit_bounds() {
        let cfg = SimConfig {
            object_count: 50,
            ..SimConfig::default()
        };
        let objs = cfg.spawn_objects().unwrap();
        assert_eq!(objs.len(), 50);
        assert!(objs
            .iter()
            .all(|o| o.aabb().is_within(cfg.bounds.width, cfg.bounds.height)));
    }

    #[test]
    fn empty_blob_means_unconfigured() {
        let store = InMemoryConfigStore::new();
        store.save_raw(SIM_CONFIG_KEY, b"").unwrap();
        let svc = ConfigService::new(store);
        assert!(svc.load::<SimConfig>(SIM_CONFIG_KEY).unwrap().is_none());
        assert_eq!(svc.load_sim().unwrap(), SimConfig::default());
    }

    #[test]
    fn malformed_json_is_reported() {
        let store = InMemoryConfigStore::new();
        store.save_raw(SIM_CONFIG_KEY, b"{ not json").unwrap();
        let err = ConfigService::new(store).load_sim().unwrap_err();
        assert!(matches!(err, ConfigError::Serde(_)), "{err}");
        assert!(err.to_string().starts_with("malformed config json"));
    }
}
