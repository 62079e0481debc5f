//! Service plugin registry.
//!
//! The registry is built once at startup, then handed by reference to
//! whatever needs to look plugins up. It is never mutated afterwards, so
//! shared references can be read from any thread.

use tracing::debug;

use crate::error::RegistryError;
use crate::kind::ServiceKind;
use crate::plugin::ServicePlugin;

// ============================================================================
// Service Registry
// ============================================================================

/// Plugins keyed by slug, in registration order.
#[derive(Default)]
pub struct ServiceRegistry {
    plugins: Vec<Box<dyn ServicePlugin>>,
}

impl ServiceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every [`ServiceKind`].
    ///
    /// Each kind has its own service name, so the slugs never collide.
    pub fn with_builtin() -> Self {
        let plugins: Vec<Box<dyn ServicePlugin>> = ServiceKind::all().iter().map(ServiceKind::plugin).collect();
        debug!(count = plugins.len(), "Registered built-in service plugins");
        Self { plugins }
    }

    /// Adds a plugin.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateSlug`] if the slug is taken; the
    /// registry is left unchanged.
    pub fn register(&mut self, plugin: Box<dyn ServicePlugin>) -> Result<(), RegistryError> {
        if self.contains(plugin.shortname()) {
            return Err(RegistryError::DuplicateSlug {
                slug: plugin.shortname().to_string(),
            });
        }
        debug!(slug = plugin.shortname(), name = plugin.name(), "Registered service plugin");
        self.plugins.push(plugin);
        Ok(())
    }

    /// Adds several plugins, all or none.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateSlug`] for the first slug that is
    /// taken or repeated within the batch; nothing is registered.
    pub fn register_all(&mut self, plugins: Vec<Box<dyn ServicePlugin>>) -> Result<(), RegistryError> {
        let mut incoming: Vec<&str> = Vec::with_capacity(plugins.len());
        for plugin in &plugins {
            let slug = plugin.shortname();
            if self.contains(slug) || incoming.contains(&slug) {
                return Err(RegistryError::DuplicateSlug { slug: slug.to_string() });
            }
            incoming.push(slug);
        }

        for plugin in plugins {
            self.register(plugin)?;
        }
        Ok(())
    }

    /// Gets a plugin by slug.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for an unknown slug.
    pub fn get(&self, slug: &str) -> Result<&dyn ServicePlugin, RegistryError> {
        self.plugins
            .iter()
            .find(|p| p.shortname() == slug)
            .map(|p| &**p)
            .ok_or_else(|| RegistryError::NotFound { query: slug.to_string() })
    }

    /// Finds a plugin by slug, abbreviation, alias or full name, ignoring
    /// case.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if nothing matches.
    pub fn find(&self, query: &str) -> Result<&dyn ServicePlugin, RegistryError> {
        self.plugins
            .iter()
            .find(|p| p.metadata().is_named(query))
            .map(|p| &**p)
            .ok_or_else(|| RegistryError::NotFound {
                query: query.to_string(),
            })
    }

    /// Returns true if the slug is registered.
    pub fn contains(&self, slug: &str) -> bool {
        self.plugins.iter().any(|p| p.shortname() == slug)
    }

    /// Iterates over plugins in registration order.
    pub fn all(&self) -> impl Iterator<Item = &dyn ServicePlugin> {
        self.plugins.iter().map(|p| &**p)
    }

    /// Returns the registered slugs in registration order.
    pub fn slugs(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.shortname()).collect()
    }

    /// Returns the number of plugins.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Returns true if no plugin is registered.
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl std::fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("slugs", &self.slugs())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::efs::EfsPlugin;
    use crate::s3::S3Plugin;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_builtin_registry_order() {
        let registry = ServiceRegistry::with_builtin();
        assert_eq!(
            registry.slugs(),
            vec![
                "amazon-simple-storage-service",
                "amazon-elastic-compute-cloud",
                "ec2-other",
                "amazon-elastic-file-system",
                "amazon-relational-database-service",
            ]
        );
        assert_send_sync::<ServiceRegistry>();
    }

    #[test]
    fn test_duplicate_slug_leaves_registry_unchanged() {
        let mut registry = ServiceRegistry::new();
        registry.register(Box::new(S3Plugin::new())).unwrap();

        let err = registry.register(Box::new(S3Plugin::new())).unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateSlug {
                slug: "amazon-simple-storage-service".to_string()
            }
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_all_is_all_or_nothing() {
        let mut registry = ServiceRegistry::new();
        let batch: Vec<Box<dyn ServicePlugin>> = vec![
            Box::new(EfsPlugin::new()),
            Box::new(S3Plugin::new()),
            Box::new(S3Plugin::new()),
        ];
        assert!(registry.register_all(batch).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_builtin_slugs_are_distinct() {
        let registry = ServiceRegistry::with_builtin();
        let mut slugs = registry.slugs();
        slugs.sort_unstable();
        slugs.dedup();
        assert_eq!(slugs.len(), ServiceKind::all().len());
    }

    #[test]
    fn test_register_all_rejects_registered_slug() {
        let mut registry = ServiceRegistry::with_builtin();
        let batch: Vec<Box<dyn ServicePlugin>> = vec![Box::new(EfsPlugin::new())];

        let err = registry.register_all(batch).unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateSlug {
                slug: "amazon-elastic-file-system".to_string()
            }
        );
        assert_eq!(registry.len(), ServiceKind::all().len());
    }

    #[test]
    fn test_get_and_find() {
        let registry = ServiceRegistry::with_builtin();
        assert_eq!(registry.get("ec2-other").unwrap().name(), "EC2 - Other");
        assert!(matches!(registry.get("s3"), Err(RegistryError::NotFound { .. })));

        assert_eq!(registry.find("s3").unwrap().shortname(), "amazon-simple-storage-service");
        assert_eq!(registry.find("Amazon Elastic File System").unwrap().abbreviation(), "EFS");
        assert!(registry.find("lambda").is_err());
    }
}
