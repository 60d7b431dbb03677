use hyper::header;

use crate::routing::error::RoutingError;

/// 요청의 Host 헤더에서 얻은 호스트 정보입니다.
///
/// # 필드
///
/// * `name` - 호스트 이름 (예: "example.com")
/// * `port` - 선택적 포트 번호
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostInfo {
    pub name: String,
    pub port: Option<u16>,
}

impl HostInfo {
    /// 호스트 헤더 값에서 HostInfo를 생성합니다.
    ///
    /// # 인자
    ///
    /// * `value` - 파싱할 호스트 문자열 (예: "example.com" 또는 "example.com:8080")
    ///
    /// # 예제
    ///
    /// ```
    /// use vhost_router::routing::HostInfo;
    ///
    /// let host_info = HostInfo::from_header_value("example.com:8080").unwrap();
    /// assert_eq!(host_info.name, "example.com");
    /// assert_eq!(host_info.port, Some(8080));
    /// ```
    pub fn from_header_value(value: &str) -> Result<Self, RoutingError> {
        if value.is_empty() {
            return Err(RoutingError::InvalidHost {
                host: value.to_string(),
                reason: "Invalid format".to_string(),
            });
        }

        // IPv6 리터럴은 대괄호까지 호스트 이름으로 취급
        if value.starts_with('[') {
            return match value.find(']') {
                Some(end) if end + 1 == value.len() => Ok(HostInfo {
                    name: value.to_string(),
                    port: None,
                }),
                Some(end) if value[end + 1..].starts_with(':') => Ok(HostInfo {
                    name: value[..=end].to_string(),
                    port: Some(parse_port(&value[end + 2..])?),
                }),
                _ => Err(RoutingError::InvalidHost {
                    host: value.to_string(),
                    reason: "Invalid format".to_string(),
                }),
            };
        }

        let parts: Vec<&str> = value.split(':').collect();
        match parts.as_slice() {
            [name] => Ok(HostInfo {
                name: name.to_string(),
                port: None,
            }),
            [name, port] => {
                if name.is_empty() || port.is_empty() {
                    return Err(RoutingError::InvalidHost {
                        host: value.to_string(),
                        reason: "Invalid format".to_string(),
                    });
                }
                Ok(HostInfo {
                    name: name.to_string(),
                    port: Some(parse_port(port)?),
                })
            }
            _ => Err(RoutingError::InvalidHost {
                host: value.to_string(),
                reason: "Invalid format".to_string(),
            }),
        }
    }

    /// HTTP 요청에서 호스트 정보를 추출합니다.
    pub fn from_request<B>(req: &hyper::Request<B>) -> Result<Self, RoutingError> {
        let host = req.headers().get(header::HOST).ok_or(RoutingError::MissingHost)?;

        let host_str = host.to_str().map_err(|e| RoutingError::HeaderParseError {
            header_name: "Host".to_string(),
            error: e.to_string(),
        })?;

        Self::from_header_value(host_str)
    }
}

fn parse_port(port: &str) -> Result<u16, RoutingError> {
    let parsed = port.parse::<u16>().map_err(|_| RoutingError::InvalidPort {
        port: port.to_string(),
        reason: "Invalid format".to_string(),
    })?;

    if parsed == 0 {
        return Err(RoutingError::InvalidPort {
            port: port.to_string(),
            reason: "Port must be greater than 0".to_string(),
        });
    }

    Ok(parsed)
}
