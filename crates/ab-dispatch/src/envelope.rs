//! EventBridge envelope of an IAM CloudTrail event.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudTrailEnvelope {
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default)]
    pub detail: CloudTrailDetail,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudTrailDetail {
    #[serde(default)]
    pub event_name: Option<String>,
    #[serde(default)]
    pub request_parameters: Option<RequestParameters>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestParameters {
    #[serde(default)]
    pub role_name: Option<String>,
}

impl CloudTrailEnvelope {
    pub fn event_name(&self) -> Option<&str> {
        self.detail.event_name.as_deref()
    }

    pub fn role_name(&self) -> Option<&str> {
        self.detail
            .request_parameters
            .as_ref()
            .and_then(|p| p.role_name.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_create_role_event() {
        let envelope: CloudTrailEnvelope = serde_json::from_value(json!({
            "version": "0",
            "detail-type": "AWS API Call via CloudTrail",
            "source": "aws.iam",
            "account": "111122223333",
            "detail": {
                "eventSource": "iam.amazonaws.com",
                "eventName": "CreateRole",
                "requestParameters": {
                    "roleName": "deploy",
                    "assumeRolePolicyDocument": "{}"
                }
            }
        }))
        .unwrap();

        assert_eq!(envelope.account.as_deref(), Some("111122223333"));
        assert_eq!(envelope.event_name(), Some("CreateRole"));
        assert_eq!(envelope.role_name(), Some("deploy"));
    }

    #[test]
    fn test_parse_sparse_event() {
        let envelope: CloudTrailEnvelope = serde_json::from_value(json!({
            "detail": { "requestParameters": null }
        }))
        .unwrap();
        assert!(envelope.account.is_none());
        assert!(envelope.event_name().is_none());
        assert!(envelope.role_name().is_none());
    }
}
