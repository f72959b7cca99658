//! One registry per stage category, plus registration of the built-ins.

use std::collections::BTreeSet;
use std::path::PathBuf;

use colmap_neural_registry::{Category, FactoryResult, Registry};
use tracing::info;

use crate::category::{DenseReconstruction, Extraction, Matching};
use crate::constants::*;
use crate::models::ModelStore;
use crate::{MvsNet, NetVlad, SuperGlue, SuperPoint};

/// Access to the registry serving category `C`
pub trait CategoryRegistry<C: Category> {
    fn category_registry(&self) -> &Registry<C>;
    fn category_registry_mut(&mut self) -> &mut Registry<C>;
}

/// The component registries of all pipeline stages
#[derive(Debug, Default)]
pub struct ComponentCatalog {
    extractors: Registry<Extraction>,
    matchers: Registry<Matching>,
    densifiers: Registry<DenseReconstruction>,
}

impl ComponentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry<C: Category>(&self) -> &Registry<C>
    where
        Self: CategoryRegistry<C>,
    {
        <Self as CategoryRegistry<C>>::category_registry(self)
    }

    pub fn register<C, F>(
        &mut self,
        name: impl Into<String>,
        factory: F,
    ) -> colmap_neural_registry::Result<()>
    where
        C: Category,
        Self: CategoryRegistry<C>,
        F: Fn() -> Box<C::Component> + Send + Sync + 'static,
    {
        <Self as CategoryRegistry<C>>::category_registry_mut(self).register(name, factory)
    }

    pub fn register_fallible<C, F>(
        &mut self,
        name: impl Into<String>,
        factory: F,
    ) -> colmap_neural_registry::Result<()>
    where
        C: Category,
        Self: CategoryRegistry<C>,
        F: Fn() -> FactoryResult<C> + Send + Sync + 'static,
    {
        <Self as CategoryRegistry<C>>::category_registry_mut(self).register_fallible(name, factory)
    }

    pub fn create<C: Category>(&self, name: &str) -> colmap_neural_registry::Result<Box<C::Component>>
    where
        Self: CategoryRegistry<C>,
    {
        self.registry::<C>().create(name)
    }

    /// Close registration on every category
    pub fn freeze(&mut self) {
        self.extractors.freeze();
        self.matchers.freeze();
        self.densifiers.freeze();
    }

    pub fn is_frozen(&self) -> bool {
        self.extractors.is_frozen() && self.matchers.is_frozen() && self.densifiers.is_frozen()
    }

    /// Registered names per category, for diagnostics
    pub fn summary(&self) -> Vec<(&'static str, BTreeSet<String>)> {
        vec![
            (self.extractors.category(), self.extractors.list()),
            (self.matchers.category(), self.matchers.list()),
            (self.densifiers.category(), self.densifiers.list()),
        ]
    }
}

impl CategoryRegistry<Extraction> for ComponentCatalog {
    fn category_registry(&self) -> &Registry<Extraction> {
        &self.extractors
    }

    fn category_registry_mut(&mut self) -> &mut Registry<Extraction> {
        &mut self.extractors
    }
}

impl CategoryRegistry<Matching> for ComponentCatalog {
    fn category_registry(&self) -> &Registry<Matching> {
        &self.matchers
    }

    fn category_registry_mut(&mut self) -> &mut Registry<Matching> {
        &mut self.matchers
    }
}

impl CategoryRegistry<DenseReconstruction> for ComponentCatalog {
    fn category_registry(&self) -> &Registry<DenseReconstruction> {
        &self.densifiers
    }

    fn category_registry_mut(&mut self) -> &mut Registry<DenseReconstruction> {
        &mut self.densifiers
    }
}

/// Settings shared by the built-in components
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltinSettings {
    pub model_dir: PathBuf,
    /// SuperPoint detection threshold
    pub keypoint_threshold: f32,
    pub require_accelerator: bool,
}

impl Default for BuiltinSettings {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            keypoint_threshold: DEFAULT_KEYPOINT_THRESHOLD,
            require_accelerator: false,
        }
    }
}

/// Register `superpoint`, `netvlad`, `superglue` and `mvsnet`.
pub fn register_builtin(
    catalog: &mut ComponentCatalog,
    settings: &BuiltinSettings,
) -> colmap_neural_registry::Result<()> {
    let store = ModelStore::new(&settings.model_dir);
    let threshold = settings.keypoint_threshold;
    let require = settings.require_accelerator;

    let s = store.clone();
    catalog.register::<Extraction, _>(SUPERPOINT, move || {
        SuperPoint::new(s.clone())
            .with_keypoint_threshold(threshold)
            .with_require_accelerator(require)
            .build()
    })?;

    let s = store.clone();
    catalog.register::<Extraction, _>(NETVLAD, move || {
        NetVlad::new(s.clone()).with_require_accelerator(require).build()
    })?;

    let s = store.clone();
    catalog.register::<Matching, _>(SUPERGLUE, move || {
        SuperGlue::new(s.clone()).with_require_accelerator(require).build()
    })?;

    catalog.register::<DenseReconstruction, _>(MVSNET, move || {
        MvsNet::new(store.clone()).with_require_accelerator(require).build()
    })?;

    info!(
        "Registered built-in components (models in {})",
        settings.model_dir.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NeuralComponent;
    use colmap_neural_registry::RegistryError;

    #[test]
    fn test_builtin_names_per_category() {
        let mut catalog = ComponentCatalog::new();
        register_builtin(&mut catalog, &BuiltinSettings::default()).unwrap();

        let summary = catalog.summary();
        assert_eq!(summary[0].0, CATEGORY_EXTRACTOR);
        assert!(summary[0].1.contains(SUPERPOINT));
        assert!(summary[0].1.contains(NETVLAD));
        assert!(summary[1].1.contains(SUPERGLUE));
        assert!(summary[2].1.contains(MVSNET));
        assert!(!catalog.registry::<Matching>().contains(SUPERPOINT));
    }

    #[test]
    fn test_register_builtin_twice_fails() {
        let mut catalog = ComponentCatalog::new();
        register_builtin(&mut catalog, &BuiltinSettings::default()).unwrap();

        let err = register_builtin(&mut catalog, &BuiltinSettings::default()).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateName { .. }));
    }

    #[test]
    fn test_freeze_all_categories() {
        let mut catalog = ComponentCatalog::new();
        assert!(!catalog.is_frozen());
        catalog.freeze();
        assert!(catalog.is_frozen());

        let err = catalog
            .register::<Matching, _>("late", || SuperGlue::new(ModelStore::default()).build())
            .unwrap_err();
        assert_eq!(err, RegistryError::Frozen { category: CATEGORY_MATCHER });
    }

    #[test]
    fn test_create_uses_settings() {
        let mut catalog = ComponentCatalog::new();
        let settings = BuiltinSettings {
            model_dir: PathBuf::from("/nonexistent/models"),
            ..BuiltinSettings::default()
        };
        register_builtin(&mut catalog, &settings).unwrap();

        let densifier = catalog.create::<DenseReconstruction>(MVSNET).unwrap();
        assert_eq!(densifier.name(), MVSNET);
        assert!(!densifier.is_initialized());
    }
}
