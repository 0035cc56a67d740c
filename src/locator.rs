use crate::config::Strategy;
use crate::types::{GatewayError, ObjectLocator};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Parse a path-style location (`<container>/<key...>`) into a locator
///
/// The container is everything before the first `/`, the key is everything
/// after it, further separators included. A single leading `/` is ignored.
/// Returns MalformedLocation if there is no separator or either part is empty.
pub fn parse_location(location: &str) -> Result<ObjectLocator, GatewayError> {
    let trimmed = location.strip_prefix('/').unwrap_or(location);

    let (container, key) = trimmed
        .split_once('/')
        .ok_or_else(|| GatewayError::MalformedLocation(location.to_string()))?;

    if container.is_empty() || key.is_empty() {
        return Err(GatewayError::MalformedLocation(location.to_string()));
    }

    Ok(ObjectLocator {
        container: container.to_string(),
        key: key.to_string(),
    })
}

/// Maps report identifiers to store locators
///
/// All locations are parsed when the resolver is built, so a bad
/// configuration fails at startup instead of on every request.
#[derive(Clone, Debug)]
pub struct LocatorResolver {
    catalog: Arc<HashMap<String, ObjectLocator>>,
    default: Option<ObjectLocator>,
}

impl LocatorResolver {
    /// Build a resolver from a catalog of `id -> location` and an optional
    /// single-file default
    ///
    /// The default is only consulted while the catalog is empty.
    pub fn new(
        catalog: &HashMap<String, String>,
        default: Option<&str>,
    ) -> Result<Self, GatewayError> {
        let catalog = catalog
            .iter()
            .map(|(id, location)| Ok((id.clone(), parse_location(location)?)))
            .collect::<Result<HashMap<_, _>, GatewayError>>()?;

        let default = default.map(parse_location).transpose()?;

        if catalog.is_empty() && default.is_none() {
            tracing::warn!("No report locations configured; every request will fail");
        }

        Ok(Self {
            catalog: Arc::new(catalog),
            default,
        })
    }

    /// Resolver that serves the same object for every identifier
    pub fn single(location: &str) -> Result<Self, GatewayError> {
        Self::new(&HashMap::new(), Some(location))
    }

    pub fn resolve(&self, identifier: &str) -> Result<ObjectLocator, GatewayError> {
        if self.catalog.is_empty() {
            return self
                .default
                .clone()
                .ok_or_else(|| GatewayError::UnknownReport(identifier.to_string()));
        }

        self.catalog
            .get(identifier)
            .cloned()
            .ok_or_else(|| GatewayError::UnknownReport(identifier.to_string()))
    }

    /// Every location this resolver can hand out
    ///
    /// The default counts only while the catalog is empty.
    pub fn locations(&self) -> Vec<&ObjectLocator> {
        if self.catalog.is_empty() {
            return self.default.iter().collect();
        }

        self.catalog.values().collect()
    }

    pub fn containers(&self) -> BTreeSet<&str> {
        self.locations()
            .into_iter()
            .map(|l| l.container.as_str())
            .collect()
    }

    /// Check that `strategy` can serve every configured location
    ///
    /// Header delegation redirects to `<prefix>/<key>` and the proxy location
    /// behind the prefix is bound to one container, so every location must
    /// share it.
    pub fn check_strategy(&self, strategy: Strategy) -> Result<(), GatewayError> {
        if strategy != Strategy::Header {
            return Ok(());
        }

        let containers = self.containers();
        if containers.len() > 1 {
            return Err(GatewayError::MalformedLocation(format!(
                "header strategy needs a single container, locations span {}",
                containers.into_iter().collect::<Vec<_>>().join(", ")
            )));
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }
}
