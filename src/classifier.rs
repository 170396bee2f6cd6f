//! Decides whether a container image is rewritten to the ECR pull-through cache.
//!
//! Rules are evaluated in a fixed order and the first one that applies wins:
//!
//! 1. image already on the cache hostname: skip
//! 2. image on any other ECR registry: skip
//! 3. first catalog registry prefixing the image: rewrite, injecting `library/`
//!    for `registry/name` images
//! 4. bare name with Docker Hub in the catalog: rewrite to `docker.io/library/name`
//! 5. `user/name` with Docker Hub in the catalog: rewrite to `docker.io/user/name`
//! 6. otherwise skip
//!
//! The resulting paths follow the ECR pull-through cache repository layout
//! and must match it byte for byte.

use crate::image_reference::{is_bare_name, is_ecr_reference, is_hosted_on, segments};
use crate::registry::{CacheTarget, DOCKER_HUB_REGISTRY, RegistryCatalog};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Account id or region is not configured.
    CacheTargetUnset,
    AlreadyPatched,
    ForeignEcr,
    NoMatchingRegistry,
    /// The container carries no image at all.
    MissingImage,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::CacheTargetUnset => "cache-target-unset",
            SkipReason::AlreadyPatched => "already-patched",
            SkipReason::ForeignEcr => "foreign-ecr",
            SkipReason::NoMatchingRegistry => "no-matching-registry",
            SkipReason::MissingImage => "missing-image",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteDecision {
    Skip(SkipReason),
    Rewrite { new_image: String },
}

impl RewriteDecision {
    fn rewrite(new_image: String) -> Self {
        RewriteDecision::Rewrite { new_image }
    }
}

pub fn classify(image: &str, catalog: &RegistryCatalog, target: &CacheTarget) -> RewriteDecision {
    let Some(cache_host) = target.hostname() else {
        return RewriteDecision::Skip(SkipReason::CacheTargetUnset);
    };

    if is_hosted_on(image, &cache_host) {
        return RewriteDecision::Skip(SkipReason::AlreadyPatched);
    }

    if is_ecr_reference(image) {
        return RewriteDecision::Skip(SkipReason::ForeignEcr);
    }

    if catalog.first_prefix_of(image).is_some() {
        let new_image = match segments(image).as_slice() {
            [registry, name] => format!("{cache_host}/{registry}/library/{name}"),
            _ => format!("{cache_host}/{image}"),
        };
        return RewriteDecision::rewrite(new_image);
    }

    if catalog.includes_docker_hub() {
        if is_bare_name(image) {
            return RewriteDecision::rewrite(format!(
                "{cache_host}/{DOCKER_HUB_REGISTRY}/library/{image}"
            ));
        }
        if segments(image).len() == 2 {
            return RewriteDecision::rewrite(format!("{cache_host}/{DOCKER_HUB_REGISTRY}/{image}"));
        }
    }

    RewriteDecision::Skip(SkipReason::NoMatchingRegistry)
}
