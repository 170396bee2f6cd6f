use std::fmt;

pub static DOCKER_HUB_REGISTRY: &str = "docker.io";

/// Ordered list of upstream registries that have a pull-through cache rule in ECR.
/// Order matters: the first entry that prefixes an image wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryCatalog {
    registries: Vec<String>,
}

impl RegistryCatalog {
    /// Builds a catalog from configured entries, falling back to Docker Hub when
    /// nothing usable is configured.
    pub fn new<I, S>(registries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let registries: Vec<String> = registries
            .into_iter()
            .map(|r| r.as_ref().trim().to_string())
            .filter(|r| !r.is_empty())
            .collect();

        if registries.is_empty() {
            return Self::default();
        }
        Self { registries }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.registries.iter().map(String::as_str)
    }

    /// First registry (in configured order) that the image starts with.
    pub fn first_prefix_of(&self, image: &str) -> Option<&str> {
        self.iter().find(|registry| image.starts_with(registry))
    }

    pub fn includes_docker_hub(&self) -> bool {
        self.iter().any(|registry| registry == DOCKER_HUB_REGISTRY)
    }
}

impl Default for RegistryCatalog {
    fn default() -> Self {
        Self {
            registries: vec![DOCKER_HUB_REGISTRY.to_string()],
        }
    }
}

impl fmt::Display for RegistryCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.registries.join(", "))
    }
}

/// The ECR account and region hosting the pull-through cache.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheTarget {
    pub account_id: String,
    pub region: String,
}

impl CacheTarget {
    pub fn new(account_id: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into().trim().to_string(),
            region: region.into().trim().to_string(),
        }
    }

    /// `{account}.dkr.ecr.{region}.amazonaws.com`, or `None` when either part is
    /// missing. An incomplete target must never produce a hostname.
    pub fn hostname(&self) -> Option<String> {
        if self.account_id.is_empty() || self.region.is_empty() {
            return None;
        }
        Some(format!(
            "{}.dkr.ecr.{}.amazonaws.com",
            self.account_id, self.region
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_defaults_to_docker_hub() {
        let catalog = RegistryCatalog::new(Vec::<String>::new());
        assert_eq!(catalog.iter().collect::<Vec<_>>(), vec!["docker.io"]);
        assert!(catalog.includes_docker_hub());
    }

    #[test]
    fn test_catalog_drops_blank_entries() {
        let catalog = RegistryCatalog::new(["  ", "quay.io ", ""]);
        assert_eq!(catalog.iter().collect::<Vec<_>>(), vec!["quay.io"]);
        assert!(!catalog.includes_docker_hub());

        let only_blank = RegistryCatalog::new([" "]);
        assert_eq!(only_blank, RegistryCatalog::default());
    }

    #[test]
    fn test_first_prefix_wins_over_longer_match() {
        let catalog = RegistryCatalog::new(["quay.io", "quay.io/team"]);
        assert_eq!(catalog.first_prefix_of("quay.io/team/app"), Some("quay.io"));
        assert_eq!(catalog.first_prefix_of("ghcr.io/team/app"), None);
    }

    #[test]
    fn test_docker_hub_membership_anywhere_in_catalog() {
        let catalog = RegistryCatalog::new(["quay.io", "ghcr.io", "docker.io"]);
        assert!(catalog.includes_docker_hub());
    }

    #[test]
    fn test_hostname() {
        let target = CacheTarget::new("123456789012", "us-east-1");
        assert_eq!(
            target.hostname().as_deref(),
            Some("123456789012.dkr.ecr.us-east-1.amazonaws.com")
        );
    }

    #[test]
    fn test_hostname_requires_account_and_region() {
        assert_eq!(CacheTarget::new("", "us-east-1").hostname(), None);
        assert_eq!(CacheTarget::new("123456789012", "  ").hostname(), None);
        assert_eq!(CacheTarget::default().hostname(), None);
    }
}
