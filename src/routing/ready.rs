use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use tracing::info;

use crate::routing::{App, BindingId};

/// 호스트 연결이 서비스 가능해졌음을 알리는 이벤트입니다.
///
/// `binding`은 이벤트를 보낸 [`Binding`](crate::routing::Binding)의 [`BindingId`]입니다.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadyEvent {
    pub binding: BindingId,
    pub port: u16,
    pub hostname: String,
}

/// `attach` 한 번에 대해 정확히 한 번 완료되는 준비 알림입니다.
///
/// 바인딩이 이미 활성 상태면 즉시 완료되고, 아니면 바인딩이 활성화될 때 완료됩니다.
/// 알림을 버리면 관심을 취소한 것으로 보며 앱 구독자에게는 영향이 없습니다.
#[derive(Debug)]
pub struct ReadyNotice {
    rx: oneshot::Receiver<ReadyEvent>,
}

impl ReadyNotice {
    /// 기다리지 않고 이미 도착한 이벤트를 꺼냅니다.
    pub fn try_take(&mut self) -> Option<ReadyEvent> {
        self.rx.try_recv().ok()
    }
}

impl Future for ReadyNotice {
    /// 바인딩이 활성화되기 전에 사라지면 `None`
    type Output = Option<ReadyEvent>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(Result::ok)
    }
}

/// 바인딩 활성화를 기다리는 준비 신호입니다.
pub(crate) struct PendingReady {
    tx: oneshot::Sender<ReadyEvent>,
    app: App,
    event: ReadyEvent,
}

impl PendingReady {
    pub(crate) fn new(app: App, event: ReadyEvent) -> (Self, ReadyNotice) {
        let (tx, rx) = oneshot::channel();
        (Self { tx, app, event }, ReadyNotice { rx })
    }

    /// 신호를 보냅니다. `self`를 소비하므로 두 번 보낼 수 없습니다.
    pub(crate) fn fire(self) {
        info!(binding = %self.event.binding, port = self.event.port, hostname = %self.event.hostname, "호스트 준비 완료");
        self.app.emit_ready(self.event.clone());
        // 수신자가 알림을 버렸으면 무시
        let _ = self.tx.send(self.event);
    }
}
