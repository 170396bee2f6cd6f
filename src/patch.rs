use serde::Serialize;
use std::fmt;

/// The three Pod spec fields holding containers, in the order they are patched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Containers,
    InitContainers,
    EphemeralContainers,
}

impl ContainerKind {
    pub const ALL: [ContainerKind; 3] = [
        ContainerKind::Containers,
        ContainerKind::InitContainers,
        ContainerKind::EphemeralContainers,
    ];

    /// Field name in the Pod spec, used verbatim in patch paths.
    pub fn spec_key(&self) -> &'static str {
        match self {
            ContainerKind::Containers => "containers",
            ContainerKind::InitContainers => "initContainers",
            ContainerKind::EphemeralContainers => "ephemeralContainers",
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spec_key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchOp {
    pub op: &'static str,
    pub path: String,
    pub value: String,
}

impl PatchOp {
    /// `replace` of `/spec/{kind}/{index}/image` with the rewritten image.
    pub fn replace_image(new_image: &str, kind: ContainerKind, index: usize) -> Self {
        PatchOp {
            op: "replace",
            path: format!("/spec/{}/{}/image", kind.spec_key(), index),
            value: new_image.to_string(),
        }
    }
}

/// Converts patch operations into the JSON-Patch document attached to an admission response.
pub fn to_json_patch(ops: &[PatchOp]) -> serde_json::Result<json_patch::Patch> {
    serde_json::from_value(serde_json::to_value(ops)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_replace_image_paths() {
        let op = PatchOp::replace_image("host/docker.io/library/nginx", ContainerKind::Containers, 0);
        assert_eq!(op.op, "replace");
        assert_eq!(op.path, "/spec/containers/0/image");
        assert_eq!(op.value, "host/docker.io/library/nginx");

        let op = PatchOp::replace_image("x", ContainerKind::InitContainers, 3);
        assert_eq!(op.path, "/spec/initContainers/3/image");

        let op = PatchOp::replace_image("x", ContainerKind::EphemeralContainers, 12);
        assert_eq!(op.path, "/spec/ephemeralContainers/12/image");
    }

    #[test]
    fn test_serializes_as_json_patch_operation() {
        let op = PatchOp::replace_image("img", ContainerKind::Containers, 1);
        assert_eq!(
            serde_json::to_value(&op).unwrap(),
            json!({"op": "replace", "path": "/spec/containers/1/image", "value": "img"})
        );
    }

    #[test]
    fn test_to_json_patch_applies_to_pod() {
        let ops = vec![
            PatchOp::replace_image("cache/docker.io/library/nginx", ContainerKind::Containers, 0),
            PatchOp::replace_image("cache/docker.io/library/busybox", ContainerKind::InitContainers, 0),
        ];
        let patch = to_json_patch(&ops).unwrap();
        assert_eq!(patch.0.len(), 2);

        let mut pod = json!({
            "spec": {
                "containers": [{"name": "app", "image": "nginx"}],
                "initContainers": [{"name": "init", "image": "busybox"}]
            }
        });
        json_patch::patch(&mut pod, &patch.0).unwrap();
        assert_eq!(pod["spec"]["containers"][0]["image"], "cache/docker.io/library/nginx");
        assert_eq!(
            pod["spec"]["initContainers"][0]["image"],
            "cache/docker.io/library/busybox"
        );
    }

    #[test]
    fn test_empty_patch() {
        let patch = to_json_patch(&[]).unwrap();
        assert!(patch.0.is_empty());
    }
}
