//! Response bodies of the DNS API actions used here

use serde::Deserialize;

/// Body returned with a non-2xx status
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApiError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub request_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeDomainsResponse {
    #[serde(default)]
    pub domains: DomainList,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DomainList {
    #[serde(default)]
    pub domain: Vec<Domain>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Domain {
    pub domain_name: String,
    #[serde(default)]
    pub domain_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AddDomainRecordResponse {
    pub record_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeDomainRecordsResponse {
    #[serde(default)]
    pub domain_records: RecordList,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecordList {
    #[serde(default)]
    pub record: Vec<Record>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Record {
    pub record_id: String,
    #[serde(rename = "RR")]
    pub rr: String,
    #[serde(rename = "Type")]
    pub record_type: String,
    pub value: String,
    #[serde(rename = "TTL", default)]
    pub ttl: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteDomainRecordResponse {
    #[serde(default)]
    pub record_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_record_list() {
        let body = r#"{
            "TotalCount": 2,
            "PageSize": 500,
            "RequestId": "536E9CAD-DB30-4647-AC87-AA5CC38C5382",
            "DomainRecords": {
                "Record": [
                    {"RR": "_acme-challenge", "Type": "TXT", "Value": "token-a", "RecordId": "9999985", "TTL": 600, "Status": "ENABLE", "Locked": false},
                    {"RR": "_acme-challenge.www", "Type": "TXT", "Value": "token-b", "RecordId": "9999986", "TTL": 600}
                ]
            },
            "PageNumber": 1
        }"#;

        let resp: DescribeDomainRecordsResponse = serde_json::from_str(body).unwrap();
        let records = resp.domain_records.record;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].rr, "_acme-challenge");
        assert_eq!(records[0].record_id, "9999985");
        assert_eq!(records[1].ttl, Some(600));
    }

    #[test]
    fn test_decode_empty_domains() {
        let body = r#"{"TotalCount": 0, "Domains": {"Domain": []}, "RequestId": "x"}"#;
        let resp: DescribeDomainsResponse = serde_json::from_str(body).unwrap();
        assert!(resp.domains.domain.is_empty());
    }

    #[test]
    fn test_decode_error_body() {
        let body = r#"{"RequestId": "abc", "HostId": "alidns.aliyuncs.com", "Code": "InvalidAccessKeyId.NotFound", "Message": "Specified access key is not found."}"#;
        let err: ApiError = serde_json::from_str(body).unwrap();
        assert_eq!(err.code, "InvalidAccessKeyId.NotFound");
        assert_eq!(err.request_id.as_deref(), Some("abc"));
    }
}
