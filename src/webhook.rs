//! Admission review handling for Pods.
//!
//! The webhook never blocks a Pod: decoding problems and patch serialization
//! failures are logged and answered with `allowed: true` and no patch.

use crate::patch::to_json_patch;
use crate::planner::{MutationPlan, PodView, plan};
use crate::state::WebhookState;
use anyhow::Context;
use axum::{Json, extract::State, http::Uri};
use k8s_openapi::api::core::v1::PodSpec;
use kube::core::DynamicObject;
use kube::core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview};
use std::sync::Arc;
use tracing::{debug, error, info};

pub async fn root(uri: Uri) -> String {
    format!("ECR Pull-through webhook {:?}", uri.path())
}

pub async fn mutate_handler(
    State(state): State<Arc<WebhookState>>,
    Json(body): Json<AdmissionReview<DynamicObject>>,
) -> Json<AdmissionReview<DynamicObject>> {
    let req: AdmissionRequest<DynamicObject> = match body.try_into() {
        Ok(req) => req,
        Err(e) => {
            error!(state = "error", error = %e, "Failed to parse admission request");
            return Json(AdmissionResponse::invalid(e.to_string()).into_review());
        }
    };

    Json(mutate_pod(&state, &req).into_review())
}

pub fn mutate_pod(state: &WebhookState, req: &AdmissionRequest<DynamicObject>) -> AdmissionResponse {
    let response = AdmissionResponse::from(req);

    let Some(object) = &req.object else {
        debug!(uid = %req.uid, "No object in admission request, allowing unchanged");
        return response;
    };

    let pod = match pod_view(req, object) {
        Ok(pod) => pod,
        Err(e) => {
            error!(
                state = "error",
                uid = %req.uid,
                error = ?e,
                "Failed to decode pod, allowing unchanged"
            );
            return response;
        }
    };

    info!(
        podNamespace = %pod.namespace,
        podGeneratedName = %pod.generated_name,
        state = "started",
        "Reviewing pod images"
    );

    let MutationPlan { patches, audit } = plan(&pod, &state.catalog, &state.target);
    audit.iter().for_each(|event| event.emit());

    if patches.is_empty() {
        info!(
            podNamespace = %pod.namespace,
            podGeneratedName = %pod.generated_name,
            state = "successful",
            "No image rewrites needed"
        );
        return response;
    }

    let patched = to_json_patch(&patches)
        .map_err(anyhow::Error::from)
        .and_then(|patch| {
            AdmissionResponse::from(req)
                .with_patch(patch)
                .context("Failed to attach JSON patch to admission response")
        });

    match patched {
        Ok(patched) => {
            info!(
                podNamespace = %pod.namespace,
                podGeneratedName = %pod.generated_name,
                state = "successful",
                patches = patches.len(),
                "Patched pod images"
            );
            patched
        }
        Err(e) => {
            error!(
                state = "error",
                uid = %req.uid,
                error = ?e,
                "Failed to build pod patch, allowing unchanged"
            );
            response
        }
    }
}

fn pod_view(req: &AdmissionRequest<DynamicObject>, object: &DynamicObject) -> anyhow::Result<PodView> {
    let spec = object.data.get("spec").cloned().context("Pod has no spec")?;
    let spec: PodSpec = serde_json::from_value(spec).context("Failed to decode pod spec")?;

    let namespace = object
        .metadata
        .namespace
        .clone()
        .or_else(|| req.namespace.clone())
        .unwrap_or_default();
    let generated_name = object.metadata.generate_name.clone().unwrap_or_default();

    Ok(PodView::from_spec(namespace, generated_name, &spec))
}
