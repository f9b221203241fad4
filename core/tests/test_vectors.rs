//! Verify header parsing against JSON test vectors stored in `test-vectors/`.
//!
//! Each case gives a raw transfer, the status reported by the transport, and
//! the expected headers (in order), body and error flag.

use comb_core::{parse_response, RequestError, TransferDetails, DEFAULT_SUCCESS_CODES};

#[test]
fn header_test_vectors() {
    let raw = include_str!("../../test-vectors/headers.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();
    let success_codes = DEFAULT_SUCCESS_CODES.into_iter().collect();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let details = TransferDetails {
            status_code: case["status"].as_u64().unwrap() as u16,
            ..TransferDetails::default()
        };
        let result = parse_response(case["raw"].as_str().unwrap(), &success_codes, details);

        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            match expected_error.as_str().unwrap() {
                "MalformedResponse" => {
                    assert!(matches!(err, RequestError::MalformedResponse), "{name}: expected MalformedResponse")
                }
                other => panic!("{name}: unknown expected_error: {other}"),
            }
            continue;
        }

        let response = result.unwrap();
        let expected_headers: Vec<(String, String)> = case["expected_headers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|h| {
                let arr = h.as_array().unwrap();
                (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
            })
            .collect();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        assert_eq!(headers, expected_headers, "{name}: headers");
        assert_eq!(response.body_raw(), case["expected_body"].as_str().unwrap(), "{name}: body");
        assert_eq!(response.is_error(), case["expected_is_error"].as_bool().unwrap(), "{name}: is_error");
    }
}
