use std::fmt;

/// 라우팅 에러의 분류입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 잘못된 호스트 패턴, 경로 등 인자 오류
    Validation,
    /// 같은 바인딩에 이미 등록된 호스트 패턴
    Conflict,
    /// 마운트 경로가 서로 접두사 관계
    Overlap,
    /// 요청 처리 중 발생한 오류
    Request,
}

/// 라우팅 관련 에러를 표현하는 열거형입니다.
#[derive(Debug, Clone, PartialEq)]
pub enum RoutingError {
    /// 유효하지 않은 호스트 패턴
    InvalidPattern {
        pattern: String,
        reason: String,
    },
    /// 유효하지 않은 마운트 경로
    InvalidDirectory {
        directory: String,
        reason: String,
    },
    /// 이미 사용 중인 호스트
    HostInUse {
        hostname: String,
        port: u16,
    },
    /// 기존 마운트와 경로가 겹침
    MountOverlap {
        directory: String,
        existing: String,
    },
    /// 유효하지 않은 호스트 이름
    InvalidHost {
        host: String,
        reason: String,
    },
    /// 유효하지 않은 포트 번호
    InvalidPort {
        port: String,
        reason: String,
    },
    /// Host 헤더 누락
    MissingHost,
    /// 헤더 파싱 에러
    HeaderParseError {
        header_name: String,
        error: String,
    },
    /// 호스트에 연결된 앱을 찾을 수 없음
    HostNotFound {
        host: String,
        port: u16,
    },
}

impl RoutingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RoutingError::InvalidPattern { .. } | RoutingError::InvalidDirectory { .. } => ErrorKind::Validation,
            RoutingError::HostInUse { .. } => ErrorKind::Conflict,
            RoutingError::MountOverlap { .. } => ErrorKind::Overlap,
            RoutingError::InvalidHost { .. }
            | RoutingError::InvalidPort { .. }
            | RoutingError::MissingHost
            | RoutingError::HeaderParseError { .. }
            | RoutingError::HostNotFound { .. } => ErrorKind::Request,
        }
    }
}

impl fmt::Display for RoutingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingError::InvalidPattern { pattern, reason } =>
                write!(f, "잘못된 호스트 패턴: {} ({})", pattern, reason),
            RoutingError::InvalidDirectory { directory, reason } =>
                write!(f, "잘못된 마운트 경로: {} ({})", directory, reason),
            RoutingError::HostInUse { hostname, port } =>
                write!(f, "{}:{} 은(는) 이미 사용 중", hostname, port),
            RoutingError::MountOverlap { directory, existing } =>
                write!(
                    f,
                    "\"{}\"에 마운트하면 기존 마운트 \"{}\"와 겹침. 중첩 마운트를 사용하세요",
                    directory, existing
                ),
            RoutingError::InvalidHost { host, reason } =>
                write!(f, "유효하지 않은 호스트 {}: {}", host, reason),
            RoutingError::InvalidPort { port, reason } =>
                write!(f, "유효하지 않은 포트 {}: {}", port, reason),
            RoutingError::MissingHost =>
                write!(f, "Host 헤더가 누락됨"),
            RoutingError::HeaderParseError { header_name, error } =>
                write!(f, "{} 헤더 파싱 실패: {}", header_name, error),
            RoutingError::HostNotFound { host, port } =>
                write!(f, "{}:{} 에 연결된 앱을 찾을 수 없음", host, port),
        }
    }
}

impl std::error::Error for RoutingError {}
