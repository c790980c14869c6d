//! Tests for Credential Offer and credential update compilation.

use std::collections::BTreeMap;

use assert_let_bind::assert_let;
use indexmap::IndexMap;
use proptest::prelude::*;
use rstest::rstest;
use serde_json::{Map, Value, json};
use vercre_template::error::XorViolation;
use vercre_template::test_utils::{self, sample};
use vercre_template::{
    CreateOfferRequest, CredentialTemplate, Error, FlowConfig, UpdateOfferRequest, create_offer,
    update_offer,
};

fn offer_request(
    credentials: Value, pre_authorized: bool, authorization_code: bool,
) -> CreateOfferRequest {
    let mut value = json!({"credentials": credentials, "issuerId": "internal-issuer-id"});
    if pre_authorized {
        value["preAuthorizedCodeFlowConfig"] = json!({
            "txCode": {"length": 6},
            "authorizationServerUrl": "https://as.example"
        });
    }
    if authorization_code {
        value["authorizationCodeFlowConfig"] =
            json!({"authorizationServerUrl": "https://as.example"});
    }
    serde_json::from_value(value).expect("request should deserialize")
}

const PRE_AUTH_FLOW: &str = "preAuthorizedCodeFlowConfig";
const AUTH_CODE_FLOW: &str = "authorizationCodeFlowConfig";

fn mdl_credentials(payload: Value) -> Value {
    json!([{"templateId": sample::MDL_TEMPLATE_ID, "payload": payload}])
}

#[rstest]
#[case::authorization_code(false, true, AUTH_CODE_FLOW, PRE_AUTH_FLOW)]
#[case::pre_authorized(true, false, PRE_AUTH_FLOW, AUTH_CODE_FLOW)]
fn driving_licence(
    #[case] pre_authorized: bool, #[case] authorization_code: bool, #[case] present: &str,
    #[case] absent: &str,
) {
    test_utils::init_tracer();

    let templates = vec![sample::driving_licence()];
    let credentials = mdl_credentials(json!({"family_name": "Doe"}));
    let request = offer_request(credentials, pre_authorized, authorization_code);

    let offer = create_offer(&request, &templates, &sample::issuer()).expect("should compile");
    let value = serde_json::to_value(&offer).expect("should serialize");

    assert_eq!(value["credentials"][0]["credentialSupportedId"], "DrivingLicense-mdoc");
    assert_eq!(value["credentials"][0]["format"], "mdoc");
    assert!(value.get(present).is_some());
    assert!(value.get(absent).is_none());
    assert!(value.get("issuerId").is_none());
}

#[test]
fn offer_matches_metadata() {
    let templates: IndexMap<String, CredentialTemplate> =
        [sample::driving_licence(), sample::employee_id()]
            .into_iter()
            .map(|t| (t.id.clone(), t))
            .collect();
    let request = offer_request(
        json!([
            {"templateId": sample::EMPLOYEE_TEMPLATE_ID, "payload": {"name": "Alice"}},
            {"templateId": sample::MDL_TEMPLATE_ID, "payload": {"org.iso.18013.5.1": {"family_name": "Doe"}}}
        ]),
        false,
        true,
    );

    let offer = create_offer(&request, &templates, &sample::issuer()).expect("should compile");
    let metadata = vercre_template::assemble(
        &sample::issuer(),
        &templates.values().cloned().collect::<Vec<_>>(),
        &vercre_template::MetadataOptions::default(),
    )
    .expect("should assemble");

    for id in offer.credential_configuration_ids() {
        assert!(metadata.credential_configurations_supported.contains_key(id));
    }
    assert_let!(FlowConfig::AuthorizationCode(flow), &offer.flow);
    assert_eq!(flow.authorization_server_url, "https://as.example");
}

#[test]
fn missing_family_name() {
    let templates = vec![sample::driving_licence()];
    let request = offer_request(mdl_credentials(json!({})), false, true);

    let err = create_offer(&request, &templates, &sample::issuer()).expect_err("should fail");
    assert_let!(Error::MissingMandatoryClaim(missing), &err);
    assert_eq!(missing[0].claims, ["family_name"]);
    assert_eq!(
        err.to_json(),
        json!({
            "error": "missing_mandatory_claim",
            "error_description": "missing mandatory claim(s): template `mdl-template` requires [family_name]"
        })
    );
}

#[test]
fn template_shape_errors() {
    let templates = vec![CredentialTemplate {
        attributes: json!({"name": {"mandatory": "yes", "value_type": "text"}}),
        ..sample::employee_id()
    }];
    let request = offer_request(
        json!([{"templateId": sample::EMPLOYEE_TEMPLATE_ID, "payload": {"name": "Alice"}}]),
        false,
        true,
    );

    let err = create_offer(&request, &templates, &sample::issuer()).expect_err("should fail");
    assert_let!(Error::Shape(shape), &err);
    assert_eq!(shape.problems.len(), 2);
    assert_eq!(err.to_json()["error"], "invalid_template_attributes");
}

#[test]
fn update_omits_flow() {
    let templates = vec![sample::driving_licence()];
    let request: UpdateOfferRequest = serde_json::from_value(json!({
        "credentials": mdl_credentials(json!({"family_name": "Doe", "given_name": "Jane"})),
        "publicIssuerId": "updated-issuer"
    }))
    .expect("should deserialize");

    let update = update_offer(&request, &templates, &sample::issuer()).expect("should compile");
    let value = serde_json::to_value(&update).expect("should serialize");

    assert_eq!(value["publicIssuerId"], "updated-issuer");
    assert!(value.get("preAuthorizedCodeFlowConfig").is_none());
    assert!(value.get("authorizationCodeFlowConfig").is_none());
}

#[test]
fn update_undeclared_keys() {
    let templates = vec![sample::driving_licence()];
    let request: UpdateOfferRequest = serde_json::from_value(json!({
        "credentials": mdl_credentials(json!({"family_name": "Doe", "height": 170}))
    }))
    .expect("should deserialize");

    let err = update_offer(&request, &templates, &sample::issuer()).expect_err("should fail");
    assert_let!(Error::InvalidAttributeKey(invalid), &err);
    assert_eq!(invalid[0].keys, ["height"]);
}

fn payload_strategy() -> impl Strategy<Value = (BTreeMap<String, String>, Option<String>)> {
    (
        prop::collection::btree_map("[a-z_]{1,12}", "[ -~]{0,16}", 0..6),
        prop::option::of("[A-Za-z.]{1,20}"),
    )
}

fn employee_payload(extra: &BTreeMap<String, String>, vct: Option<&String>) -> Map<String, Value> {
    let mut payload: Map<String, Value> =
        extra.iter().map(|(k, v)| (k.clone(), Value::String(v.clone()))).collect();
    payload.insert("name".into(), json!("Alice"));
    if let Some(vct) = vct {
        payload.insert("vct".into(), json!(vct));
    }
    payload
}

proptest! {
    #[test]
    fn vct_never_emitted((extra, vct) in payload_strategy()) {
        let templates = vec![sample::employee_id()];
        let payload = employee_payload(&extra, vct.as_ref());
        let request = offer_request(
            json!([{"templateId": sample::EMPLOYEE_TEMPLATE_ID, "payload": payload}]),
            false,
            true,
        );

        let offer = create_offer(&request, &templates, &sample::issuer()).expect("should compile");
        let built = &offer.credentials[0].payload;

        prop_assert!(!built.contains_key("vct"));
        prop_assert_eq!(built.len(), payload.len() - usize::from(payload.contains_key("vct")));
    }

    #[test]
    fn deterministic((extra, vct) in payload_strategy()) {
        let templates = vec![sample::employee_id(), sample::driving_licence()];
        let request = offer_request(
            json!([
                {"templateId": sample::EMPLOYEE_TEMPLATE_ID, "payload": employee_payload(&extra, vct.as_ref())},
                {"templateId": sample::MDL_TEMPLATE_ID, "payload": {"family_name": "Doe"}}
            ]),
            true,
            false,
        );

        let first = create_offer(&request, &templates, &sample::issuer()).expect("should compile");
        let second = create_offer(&request, &templates, &sample::issuer()).expect("should compile");

        prop_assert_eq!(
            serde_json::to_string(&first).expect("should serialize"),
            serde_json::to_string(&second).expect("should serialize")
        );
    }

    #[test]
    fn exactly_one_flow(pre_authorized in any::<bool>(), authorization_code in any::<bool>()) {
        let templates = vec![sample::driving_licence()];
        let request = offer_request(
            mdl_credentials(json!({"family_name": "Doe"})),
            pre_authorized,
            authorization_code,
        );

        match create_offer(&request, &templates, &sample::issuer()) {
            Ok(offer) => {
                prop_assert!(pre_authorized != authorization_code);
                let value = serde_json::to_value(&offer).expect("should serialize");
                prop_assert!(
                    value.get(PRE_AUTH_FLOW).is_some() != value.get(AUTH_CODE_FLOW).is_some()
                );
            }
            Err(Error::FlowConfigXorViolation(XorViolation::Both)) => {
                prop_assert!(pre_authorized && authorization_code);
            }
            Err(Error::FlowConfigXorViolation(XorViolation::Neither)) => {
                prop_assert!(!pre_authorized && !authorization_code);
            }
            Err(e) => prop_assert!(false, "unexpected error: {e}"),
        }
    }
}
