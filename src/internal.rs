use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc::{channel, error::TrySendError, Receiver, Sender};

use crate::{AcceptAddr, Accepter, ProxyError, ProxyResult};

/// 默认的投递队列容量
const DEFAULT_BACKLOG: usize = 128;

/// 程序内投递连接的虚拟监听器, 供其他任务把已完成的连接交给accept方
///
/// 从单条物理链路分离出来的子流或访问端配对出来的流, 都经由这里
/// 进入与内核监听完全一致的处理管道
pub struct InternalListener<T> {
    /// None表示已关闭, 锁保护关闭判定与关闭动作
    sender: Mutex<Option<Sender<T>>>,
    receiver: tokio::sync::Mutex<Receiver<T>>,
}

impl<T> InternalListener<T> {
    pub fn new() -> InternalListener<T> {
        Self::with_capacity(DEFAULT_BACKLOG)
    }

    pub fn with_capacity(capacity: usize) -> InternalListener<T> {
        let (sender, receiver) = channel(capacity);
        InternalListener {
            sender: Mutex::new(Some(sender)),
            receiver: tokio::sync::Mutex::new(receiver),
        }
    }

    /// 非阻塞投递, 失败时连接在本调用内被关闭, 调用方不可再关闭
    pub fn put_conn(&self, conn: T) -> ProxyResult<()> {
        let sender = self.sender.lock().unwrap();
        match &*sender {
            Some(s) => match s.try_send(conn) {
                Ok(()) => Ok(()),
                Err(TrySendError::Full(conn)) => {
                    // dropping the stream closes it
                    drop(conn);
                    log::debug!("内部监听器队列已满, 丢弃连接");
                    Err(ProxyError::QueueFull)
                }
                Err(TrySendError::Closed(conn)) => {
                    drop(conn);
                    Err(ProxyError::ListenerClosed)
                }
            },
            None => {
                drop(conn);
                Err(ProxyError::ListenerClosed)
            }
        }
    }

    /// 按投递顺序取出连接, 关闭后先取尽队列再持续报错
    pub async fn accept(&self) -> ProxyResult<T> {
        let mut receiver = self.receiver.lock().await;
        receiver.recv().await.ok_or(ProxyError::ListenerClosed)
    }

    /// 幂等关闭, 丢弃生产端使队列进入终止状态
    /// 队列中尚未取出的连接不在此处关闭
    pub fn close(&self) {
        let mut sender = self.sender.lock().unwrap();
        if sender.take().is_some() {
            log::trace!("内部监听器已关闭");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.lock().unwrap().is_none()
    }
}

impl<T> Default for InternalListener<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Send> Accepter for InternalListener<T> {
    type Stream = T;

    async fn accept(&self) -> ProxyResult<T> {
        InternalListener::accept(self).await
    }

    fn local_addr(&self) -> ProxyResult<AcceptAddr> {
        Ok(AcceptAddr::Internal)
    }
}
