//! Web target resource

use tfplug::schema::Attribute;

use super::{changed, VirtualTargetKind, VirtualTargetModel};
use crate::api::targets::{CreateWebTargetRequest, ModifyWebTargetRequest, Port, WebTarget};

pub type WebTargetModel = VirtualTargetModel;

#[derive(Default)]
pub struct WebTargetKind;

impl VirtualTargetKind for WebTargetKind {
    type Api = WebTarget;
    type Model = WebTargetModel;

    const TYPE_NAME: &'static str = "bastionzero_web_target";
    const PLURAL_TYPE_NAME: &'static str = "bastionzero_web_targets";
    const NOUN: &'static str = "web target";
    const PLURAL_NOUN: &'static str = "web targets";
    const TARGET_TYPE: &'static str = "Web";

    fn attributes() -> Vec<Attribute> {
        vec![]
    }

    fn flatten(target: &WebTarget) -> WebTargetModel {
        VirtualTargetModel::flatten(&target.common)
    }

    fn create_request(plan: &WebTargetModel) -> CreateWebTargetRequest {
        CreateWebTargetRequest {
            target_name: plan.name.clone(),
            proxy_target_id: plan.proxy_target_id.clone(),
            remote_host: plan.remote_host.clone(),
            remote_port: Port::new(plan.remote_port),
            local_port: Port::new(plan.local_port),
            environment_id: plan.environment_id.clone(),
        }
    }

    fn modify_request(plan: &WebTargetModel, prior: &WebTargetModel) -> ModifyWebTargetRequest {
        ModifyWebTargetRequest {
            target_name: changed(&plan.name, &prior.name),
            proxy_target_id: None,
            remote_host: changed(&plan.remote_host, &prior.remote_host),
            remote_port: changed(&plan.remote_port, &prior.remote_port).map(Port::new),
            local_port: changed(&plan.local_port, &prior.local_port).map(Port::new),
            environment_id: changed(&plan.environment_id, &prior.environment_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::targets::{TargetCommon, VirtualTargetCommon};

    fn web_target() -> WebTarget {
        WebTarget {
            common: VirtualTargetCommon {
                target: TargetCommon {
                    id: "w-1".to_string(),
                    name: "grafana".to_string(),
                    target_type: "Web".to_string(),
                    status: "Online".to_string(),
                    environment_id: "e-1".to_string(),
                    ..Default::default()
                },
                proxy_target_id: "b-1".to_string(),
                remote_host: "http://localhost".to_string(),
                remote_port: Port::new(Some(3000)),
                local_port: Port::new(None),
            },
        }
    }

    #[test]
    fn web_target_flattens_ports_and_computed_fields() {
        let model = WebTargetKind::flatten(&web_target());
        assert_eq!(model.id.as_deref(), Some("w-1"));
        assert_eq!(model.remote_port, Some(3000));
        assert_eq!(model.local_port, None);
        assert_eq!(model.target_type.as_deref(), Some("Web"));
        assert_eq!(model.last_agent_update, None);
    }

    #[test]
    fn modify_request_sends_only_changes() {
        let prior = WebTargetKind::flatten(&web_target());
        let mut plan = prior.clone();
        plan.local_port = Some(8080);

        let body = serde_json::to_value(WebTargetKind::modify_request(&plan, &prior)).unwrap();
        assert_eq!(body, serde_json::json!({"localPort": {"value": 8080}}));
    }

    #[test]
    fn clearing_local_port_sends_null_value() {
        let mut prior = WebTargetKind::flatten(&web_target());
        prior.local_port = Some(8080);
        let mut plan = prior.clone();
        plan.local_port = None;

        let body = serde_json::to_value(WebTargetKind::modify_request(&plan, &prior)).unwrap();
        assert_eq!(body, serde_json::json!({"localPort": {"value": null}}));
    }
}
