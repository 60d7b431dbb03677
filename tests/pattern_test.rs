use vhost_router::routing::{best_match, ErrorKind, Pattern, RoutingError};

#[test]
fn test_pattern_compile() {
    let test_cases = vec![
        // (패턴, 성공 여부)
        ("example.com", true),
        ("*.example.com", true),
        ("*", true),
        ("[::1]", true),
        ("localhost:8080", true),
        ("my_host-01.example.com", true),
        ("exa mple.com", false),
        ("example.com/", false),
        ("ex?mple.com", false),
        ("", false),
    ];

    for (source, should_succeed) in test_cases {
        let result = Pattern::compile(source);
        assert_eq!(
            result.is_ok(),
            should_succeed,
            "패턴 '{}': 예상 {}, 실제 {:?}",
            source,
            should_succeed,
            result
        );
    }
}

#[test]
fn test_invalid_pattern_is_validation_error() {
    let err = Pattern::compile("exa mple.com").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(matches!(err, RoutingError::InvalidPattern { ref pattern, .. } if pattern == "exa mple.com"));
}

#[test]
fn test_pattern_matching() {
    let test_cases = vec![
        // (패턴, 후보, 예상 결과)
        ("example.com", "example.com", true),
        ("example.com", "example.org", false),
        ("example.com", "www.example.com", false),
        // '.'은 리터럴
        ("example.com", "exampleXcom", false),
        // '*'는 한 글자 이상
        ("*.example.com", "api.example.com", true),
        ("*.example.com", "a.b.example.com", true),
        ("*.example.com", ".example.com", false),
        ("*.example.com", "example.com", false),
        ("*", "anything", true),
        ("*", "", false),
        ("api.*", "api.example.com", true),
        ("a*b*c", "aXbYc", true),
        ("a*b*c", "abc", false),
        ("[::1]", "[::1]", true),
        ("[::1]", ":", false),
        // 대소문자 구분
        ("Example.com", "example.com", false),
    ];

    for (source, candidate, expected) in test_cases {
        let pattern = Pattern::compile(source).unwrap();
        assert_eq!(
            pattern.matches(candidate),
            expected,
            "패턴: '{}', 후보: '{}', 예상 결과: {}",
            source,
            candidate,
            expected
        );
    }
}

#[test]
fn test_best_match_prefers_longest() {
    assert_eq!(
        best_match(["*.example.com", "api.example.com"], "api.example.com"),
        "api.example.com"
    );
    assert_eq!(best_match(["a*", "ab*"], "abcdef"), "ab*");
    assert_eq!(best_match(["ab*", "a*"], "abcdef"), "ab*");
}

#[test]
fn test_best_match_tie_goes_to_first() {
    // 길이가 같으면 먼저 나온 패턴
    assert_eq!(best_match(["a*c", "ab*"], "abc"), "a*c");
    assert_eq!(best_match(["ab*", "a*c"], "abc"), "ab*");
}

#[test]
fn test_best_match_is_length_not_specificity() {
    // 더 구체적인 서브도메인이 아니라 더 긴 문자열이 이김
    assert_eq!(
        best_match(["*.example.com", "a.*.com"], "a.b.example.com"),
        "*.example.com"
    );
}

#[test]
fn test_best_match_none() {
    assert_eq!(best_match(["*.example.com"], "example.org"), "");
    assert_eq!(best_match(Vec::<&str>::new(), "example.org"), "");
    // 잘못된 패턴은 무시
    assert_eq!(best_match(["bad pattern", "*"], "x"), "*");
}

#[test]
fn test_pattern_equality() {
    use std::collections::HashSet;

    let patterns = vec![
        Pattern::compile("*.example.com").unwrap(),
        Pattern::compile("*.example.com").unwrap(),
        Pattern::compile("example.com").unwrap(),
    ];
    assert!(patterns[0].is_wildcard());
    assert!(!patterns[2].is_wildcard());

    let unique: HashSet<_> = patterns.into_iter().collect();
    assert_eq!(unique.len(), 2, "같은 원본 문자열의 패턴은 하나로 처리되어야 함");
}
