use serde_json::json;

use crate::types::{CredentialTemplate, IssuerRecord};

pub const MDL_TEMPLATE_ID: &str = "mdl-template";
pub const EMPLOYEE_TEMPLATE_ID: &str = "employee-template";
pub const PUBLIC_ISSUER_ID: &str = "example-issuer";
pub const ISSUER_DID: &str = "did:example:issuer";

/// An mdoc driving licence template, stored the way the template repository
/// returns it. Signs with the issuer's DID.
pub fn driving_licence() -> CredentialTemplate {
    serde_json::from_value(json!({
        "id": MDL_TEMPLATE_ID,
        "name": "DrivingLicense",
        "format": "mso_mdoc",
        "doctype": "org.iso.18013.5.1.mDL",
        "attributes": [{
            "namespace": "org.iso.18013.5.1",
            "attributes": {
                "family_name": {
                    "mandatory": true,
                    "value_type": "string",
                    "display": [{"name": "Family Name", "locale": "en"}]
                },
                "given_name": {
                    "mandatory": false,
                    "value_type": "string",
                    "display": [{"name": "Given Name", "locale": "en"}]
                }
            }
        }],
        "appearance": {
            "display": [{
                "name": "Driving Licence",
                "description": "Mobile driving licence",
                "locale": "en",
                "logo": "https://example.com/mdl.png"
            }]
        },
        "signerOption": "did"
    }))
    .expect("driving licence template should deserialize")
}

/// An SD-JWT employee credential template with a nested address claim.
pub fn employee_id() -> CredentialTemplate {
    serde_json::from_value(json!({
        "id": EMPLOYEE_TEMPLATE_ID,
        "name": "EmployeeID",
        "format": "sd-jwt",
        "vct": "EmployeeIDCredential",
        "attributes": {
            "name": {
                "mandatory": true,
                "value_type": "string",
                "display": [{"name": "Full Name", "locale": "en"}]
            },
            "email": {"mandatory": false, "value_type": "string"},
            "address": {
                "mandatory": false,
                "value_type": "string",
                "display": [{"name": "Address", "locale": "en"}],
                "children": {
                    "street": {"mandatory": true, "value_type": "string"},
                    "locality": {"mandatory": false, "value_type": "string"}
                }
            }
        },
        "appearance": [{
            "name": "Employee ID",
            "locale": "en",
            "logo": {"url": "https://example.com/employee.png", "altText": "Employee"}
        }]
    }))
    .expect("employee template should deserialize")
}

/// An issuer with a display entry, a batch size and a DID.
pub fn issuer() -> IssuerRecord {
    serde_json::from_value(json!({
        "publicIssuerId": PUBLIC_ISSUER_ID,
        "metadata": {
            "display": [{"name": "Example Issuer", "locale": "en"}]
        },
        "batchCredentialIssuanceSize": 10,
        "did": ISSUER_DID
    }))
    .expect("issuer should deserialize")
}
