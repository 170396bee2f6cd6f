use regex::Regex;
use std::sync::LazyLock;

// Unanchored on purpose: any `<something>.dkr.ecr.<something>.amazonaws.com/` in the image.
static ECR_REGISTRY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r".+\.dkr\.ecr\..+\.amazonaws\.com/").expect("ECR registry pattern is valid")
});

/// Whether the image already points at the given registry hostname.
pub fn is_hosted_on(image: &str, hostname: &str) -> bool {
    image.starts_with(hostname)
}

/// Whether the image points at any ECR registry, whatever the account or region.
pub fn is_ecr_reference(image: &str) -> bool {
    ECR_REGISTRY_PATTERN.is_match(image)
}

/// Splits an image on `/`. Tags and digests are left attached to the last segment.
pub fn segments(image: &str) -> Vec<&str> {
    image.split('/').collect()
}

/// Bare official image name such as `nginx` or `nginx:1.27`.
pub fn is_bare_name(image: &str) -> bool {
    !image.contains('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_hosted_on() {
        let host = "123456789012.dkr.ecr.us-east-1.amazonaws.com";
        assert!(is_hosted_on(
            "123456789012.dkr.ecr.us-east-1.amazonaws.com/docker.io/library/nginx",
            host
        ));
        assert!(!is_hosted_on("docker.io/nginx", host));
    }

    #[test]
    fn test_is_ecr_reference() {
        assert!(is_ecr_reference(
            "999999999999.dkr.ecr.eu-west-1.amazonaws.com/foo"
        ));
        assert!(is_ecr_reference(
            "myregistry.dkr.ecr.us-east-1.amazonaws.com/foo/bar:1.0"
        ));
        assert!(is_ecr_reference("a.dkr.ecr.b.amazonaws.com/"));
    }

    #[test]
    fn test_is_ecr_reference_requires_prefix_middle_and_path() {
        // nothing before .dkr.ecr.
        assert!(!is_ecr_reference(".dkr.ecr.us-east-1.amazonaws.com/foo"));
        // nothing between .dkr.ecr. and .amazonaws.com
        assert!(!is_ecr_reference("acct.dkr.ecr..amazonaws.com/foo"));
        // no repository separator
        assert!(!is_ecr_reference("acct.dkr.ecr.us-east-1.amazonaws.com"));
        assert!(!is_ecr_reference("public.ecr.aws/nginx/nginx"));
        assert!(!is_ecr_reference("nginx"));
    }

    #[test]
    fn test_segments() {
        assert_eq!(segments("nginx"), vec!["nginx"]);
        assert_eq!(segments("docker.io/nginx:1.27"), vec!["docker.io", "nginx:1.27"]);
        assert_eq!(
            segments("docker.io/bitnami/nginx"),
            vec!["docker.io", "bitnami", "nginx"]
        );
    }

    #[test]
    fn test_is_bare_name() {
        assert!(is_bare_name("nginx"));
        assert!(is_bare_name("nginx:latest"));
        assert!(!is_bare_name("bitnami/nginx"));
    }
}
