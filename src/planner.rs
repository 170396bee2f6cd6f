use crate::classifier::{RewriteDecision, SkipReason, classify};
use crate::patch::{ContainerKind, PatchOp};
use crate::registry::{CacheTarget, RegistryCatalog};
use k8s_openapi::api::core::v1::PodSpec;
use tracing::info;

/// The parts of a Pod the planner looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PodView {
    pub namespace: String,
    pub generated_name: String,
    pub containers: Vec<Option<String>>,
    pub init_containers: Vec<Option<String>>,
    pub ephemeral_containers: Vec<Option<String>>,
}

impl PodView {
    pub fn from_spec(namespace: String, generated_name: String, spec: &PodSpec) -> Self {
        PodView {
            namespace,
            generated_name,
            containers: spec.containers.iter().map(|c| c.image.clone()).collect(),
            init_containers: spec
                .init_containers
                .iter()
                .flatten()
                .map(|c| c.image.clone())
                .collect(),
            ephemeral_containers: spec
                .ephemeral_containers
                .iter()
                .flatten()
                .map(|c| c.image.clone())
                .collect(),
        }
    }

    fn images(&self, kind: ContainerKind) -> &[Option<String>] {
        match kind {
            ContainerKind::Containers => &self.containers,
            ContainerKind::InitContainers => &self.init_containers,
            ContainerKind::EphemeralContainers => &self.ephemeral_containers,
        }
    }
}

/// One record per classified image, patched or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    pub pod_namespace: String,
    pub pod_generated_name: String,
    pub container_kind: ContainerKind,
    pub index: usize,
    pub original_image: String,
    pub applied_patch: bool,
    pub new_image: Option<String>,
    pub skip_reason: Option<SkipReason>,
}

impl AuditEvent {
    pub fn emit(&self) {
        info!(
            appliedPatch = self.applied_patch,
            podNamespace = %self.pod_namespace,
            podGeneratedName = %self.pod_generated_name,
            specKey = %self.container_kind,
            index = self.index,
            originalImage = %self.original_image,
            newImage = self.new_image.as_deref(),
            reason = self.skip_reason.as_ref().map(SkipReason::as_str),
            "Classified container image"
        );
    }
}

#[derive(Debug, Default)]
pub struct MutationPlan {
    pub patches: Vec<PatchOp>,
    pub audit: Vec<AuditEvent>,
}

/// Classifies every image of the Pod, containers first, then init and ephemeral
/// containers, each by ascending index.
pub fn plan(pod: &PodView, catalog: &RegistryCatalog, target: &CacheTarget) -> MutationPlan {
    let mut plan = MutationPlan::default();

    for kind in ContainerKind::ALL {
        for (index, image) in pod.images(kind).iter().enumerate() {
            let decision = match image {
                Some(image) => classify(image, catalog, target),
                None => RewriteDecision::Skip(SkipReason::MissingImage),
            };

            let mut event = AuditEvent {
                pod_namespace: pod.namespace.clone(),
                pod_generated_name: pod.generated_name.clone(),
                container_kind: kind,
                index,
                original_image: image.clone().unwrap_or_default(),
                applied_patch: false,
                new_image: None,
                skip_reason: None,
            };

            match decision {
                RewriteDecision::Rewrite { new_image } => {
                    plan.patches
                        .push(PatchOp::replace_image(&new_image, kind, index));
                    event.applied_patch = true;
                    event.new_image = Some(new_image);
                }
                RewriteDecision::Skip(reason) => event.skip_reason = Some(reason),
            }

            plan.audit.push(event);
        }
    }

    plan
}
