//! COLMAP Neural Component Registry
//!
//! A keyed factory store, generic over a component [`Category`]. One
//! [`Registry`] is instantiated per category; adding a new pluggable stage
//! means adding a category type, not touching this crate.
//!
//! # Lifecycle
//!
//! 1. **Setup**: components register under a symbolic name (`&mut self`).
//! 2. **Freeze**: [`Registry::freeze`] closes registration for good.
//! 3. **Use**: [`Registry::create`] resolves a name and runs its factory
//!    (`&self`, safe to share across threads).
//!
//! Registration needs exclusive access and creation needs shared access, so
//! a `register` racing a `create` does not compile.
//!
//! # Examples
//!
//! ```rust
//! use colmap_neural_registry::{Category, Registry};
//!
//! trait Greeter: Send {
//!     fn greet(&self) -> String;
//! }
//!
//! struct English;
//! impl Greeter for English {
//!     fn greet(&self) -> String { "hello".into() }
//! }
//!
//! struct Greeters;
//! impl Category for Greeters {
//!     type Component = dyn Greeter;
//!     const NAME: &'static str = "greeter";
//! }
//!
//! let mut registry = Registry::<Greeters>::new();
//! registry.register("english", || Box::new(English)).unwrap();
//! registry.freeze();
//!
//! let greeter = registry.create("english").unwrap();
//! assert_eq!(greeter.greet(), "hello");
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use tracing::debug;

pub mod error;

pub use error::{RegistryError, Result};

/// Error type a fallible factory may return
pub type FactoryError = Box<dyn std::error::Error + Send + Sync>;

/// Result of running a factory
pub type FactoryResult<C> = std::result::Result<Box<<C as Category>::Component>, FactoryError>;

type Factory<C> = Box<dyn Fn() -> FactoryResult<C> + Send + Sync>;

/// A pipeline stage contract.
///
/// `Component` is usually a trait object (`dyn FeatureExtractor`); `NAME`
/// is used in errors and logs.
pub trait Category: 'static {
    type Component: ?Sized;

    const NAME: &'static str;
}

/// Name plus zero-argument constructor
pub struct ComponentDescriptor<C: Category> {
    name: String,
    factory: Factory<C>,
}

impl<C: Category> ComponentDescriptor<C> {
    pub fn name(&self) -> &str {
        &self.name
    }

    fn construct(&self) -> Result<Box<C::Component>> {
        (self.factory)().map_err(|e| RegistryError::Construction {
            category: C::NAME,
            name: self.name.clone(),
            reason: e.to_string(),
        })
    }
}

impl<C: Category> fmt::Debug for ComponentDescriptor<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDescriptor")
            .field("category", &C::NAME)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Keyed factory store for one category
pub struct Registry<C: Category> {
    descriptors: BTreeMap<String, ComponentDescriptor<C>>,
    frozen: bool,
}

impl<C: Category> Registry<C> {
    pub fn new() -> Self {
        Self {
            descriptors: BTreeMap::new(),
            frozen: false,
        }
    }

    /// Category name this registry serves
    pub fn category(&self) -> &'static str {
        C::NAME
    }

    /// Register an infallible factory under `name`.
    ///
    /// Fails with [`RegistryError::DuplicateName`] if the name is taken (the
    /// existing registration is left intact) and with
    /// [`RegistryError::Frozen`] once the registry is frozen.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> Result<()>
    where
        F: Fn() -> Box<C::Component> + Send + Sync + 'static,
    {
        self.register_fallible(name, move || Ok(factory()))
    }

    /// Register a factory that may fail at construction time.
    pub fn register_fallible<F>(&mut self, name: impl Into<String>, factory: F) -> Result<()>
    where
        F: Fn() -> FactoryResult<C> + Send + Sync + 'static,
    {
        let name = name.into();

        if self.frozen {
            return Err(RegistryError::Frozen { category: C::NAME });
        }
        if self.descriptors.contains_key(&name) {
            return Err(RegistryError::DuplicateName {
                category: C::NAME,
                name,
            });
        }

        debug!("Registered {} component '{}'", C::NAME, name);
        self.descriptors.insert(
            name.clone(),
            ComponentDescriptor {
                name,
                factory: Box::new(factory),
            },
        );
        Ok(())
    }

    /// Construct a fresh instance of the component registered under `name`.
    ///
    /// Every call runs the factory again; nothing is cached.
    pub fn create(&self, name: &str) -> Result<Box<C::Component>> {
        let descriptor =
            self.descriptors
                .get(name)
                .ok_or_else(|| RegistryError::UnknownComponent {
                    category: C::NAME,
                    name: name.to_string(),
                })?;

        descriptor.construct()
    }

    /// Every registered name, for diagnostics
    pub fn list(&self) -> BTreeSet<String> {
        self.descriptors.keys().cloned().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.descriptors.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Close registration. Idempotent.
    pub fn freeze(&mut self) {
        if !self.frozen {
            debug!(
                "Freezing {} registry with {} component(s)",
                C::NAME,
                self.descriptors.len()
            );
        }
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }
}

impl<C: Category> Default for Registry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Category> fmt::Debug for Registry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("category", &C::NAME)
            .field("names", &self.descriptors.keys().collect::<Vec<_>>())
            .field("frozen", &self.frozen)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Counter: Send {
        fn value(&self) -> u32;
    }

    struct Fixed(u32);

    impl Counter for Fixed {
        fn value(&self) -> u32 {
            self.0
        }
    }

    struct Counters;

    impl Category for Counters {
        type Component = dyn Counter;
        const NAME: &'static str = "counter";
    }

    #[test]
    fn test_register_and_create() {
        let mut registry = Registry::<Counters>::new();
        registry.register("seven", || Box::new(Fixed(7))).unwrap();

        assert_eq!(registry.create("seven").unwrap().value(), 7);
        assert_eq!(registry.category(), "counter");
        assert!(registry.contains("seven"));
    }

    #[test]
    fn test_frozen_rejects_registration() {
        let mut registry = Registry::<Counters>::new();
        registry.register("one", || Box::new(Fixed(1))).unwrap();
        registry.freeze();
        registry.freeze();

        let err = registry.register("two", || Box::new(Fixed(2))).unwrap_err();
        assert_eq!(err, RegistryError::Frozen { category: "counter" });
        assert_eq!(registry.len(), 1);
        assert!(registry.create("one").is_ok());
    }

    #[test]
    fn test_fallible_factory_reports_construction_error() {
        let mut registry = Registry::<Counters>::new();
        registry
            .register_fallible("broken", || Err("weights missing".into()))
            .unwrap();

        match registry.create("broken") {
            Err(RegistryError::Construction { name, reason, .. }) => {
                assert_eq!(name, "broken");
                assert_eq!(reason, "weights missing");
            }
            other => panic!("expected construction error, got {:?}", other.map(|c| c.value())),
        }
    }
}
