//! vhost_router는 HTTP 서버 프레임워크의 라우팅 핵심입니다.
//!
//! 연결의 호스트 이름을 앱으로, 요청 경로를 하위 앱이나 인터셉트 핸들러로
//! 해석합니다.
//!
//! # 주요 기능
//!
//! - `*` 와일드카드 호스트 패턴과 가장 긴 패턴 우선 매칭
//! - 등록 시 정확히 무효화되는 포트별 호스트 해석 캐시
//! - 겹침을 허용하지 않는 절대 경로 마운트와 메서드별 인터셉트
//!
//! # 예제
//!
//! ```
//! use vhost_router::routing::{App, Binding, Dispatch};
//! use hyper::{Method, Request, Response};
//! use http_body_util::Full;
//! use bytes::Bytes;
//!
//! let binding = Binding::new(8080);
//! let site = App::default();
//! let api = App::default();
//!
//! site.mount("/api", &api).unwrap();
//! api.get("/status", |_| Response::new(Full::new(Bytes::from("ok")))).unwrap();
//! site.link(&binding, "*.example.com").unwrap();
//!
//! let req = Request::builder()
//!     .method(Method::GET)
//!     .uri("/api/status")
//!     .header("Host", "www.example.com:8080")
//!     .body(Bytes::new())
//!     .unwrap();
//!
//! let dispatch = binding.route(&req).unwrap();
//! assert!(matches!(dispatch, Dispatch::Intercept { .. }));
//! assert_eq!(dispatch.app(), &api);
//! ```
//!
//! # 준비 알림
//!
//! ```
//! use vhost_router::routing::{App, Binding};
//!
//! let binding = Binding::new(80);
//! let app = App::default();
//! let mut notice = app.link(&binding, "example.com").unwrap();
//! assert!(notice.try_take().is_none());
//!
//! // 리스너가 바인딩을 마치면 호출
//! binding.activate();
//!
//! let event = notice.try_take().unwrap();
//! assert_eq!(event.hostname, "example.com");
//! assert_eq!(event.port, 80);
//! ```

pub mod logging;
pub mod routing;
pub mod settings;
