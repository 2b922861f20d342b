use std::fmt;
use std::net::SocketAddr;

use async_trait::async_trait;
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};

use crate::ProxyResult;

/// 监听地址, 内部监听器没有真实地址只有固定占位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptAddr {
    Socket(SocketAddr),
    Internal,
}

impl fmt::Display for AcceptAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcceptAddr::Socket(addr) => write!(f, "{}", addr),
            AcceptAddr::Internal => f.write_str("internal"),
        }
    }
}

/// 连接来源的统一抽象, 消费方不区分内核套接字与程序内投递
#[async_trait]
pub trait Accepter {
    type Stream;

    /// suspends until the next connection is ready or the source is closed
    async fn accept(&self) -> ProxyResult<Self::Stream>;

    fn local_addr(&self) -> ProxyResult<AcceptAddr>;
}

/// 包装内核监听器
pub struct WrapTcpAccepter {
    listener: TcpListener,
}

impl WrapTcpAccepter {
    pub fn new(listener: TcpListener) -> WrapTcpAccepter {
        WrapTcpAccepter { listener }
    }

    pub async fn bind<A: ToSocketAddrs>(addr: A) -> ProxyResult<WrapTcpAccepter> {
        let listener = TcpListener::bind(addr).await?;
        Ok(WrapTcpAccepter { listener })
    }

    pub fn into_inner(self) -> TcpListener {
        self.listener
    }
}

#[async_trait]
impl Accepter for WrapTcpAccepter {
    type Stream = TcpStream;

    async fn accept(&self) -> ProxyResult<TcpStream> {
        let (stream, addr) = self.listener.accept().await?;
        log::trace!("接收客户端地址={}", addr);
        Ok(stream)
    }

    fn local_addr(&self) -> ProxyResult<AcceptAddr> {
        Ok(AcceptAddr::Socket(self.listener.local_addr()?))
    }
}
