use std::{fmt, io};

/// 协议核心的统一错误类型
#[derive(Debug)]
pub enum ProxyError {
    IoError(io::Error),
    SerdeError(serde_json::Error),
    /// 消息类型未注册
    UnknownMessage(u8),
    /// 定向解码时类型不匹配
    KindMismatch { expect: u8, found: u8 },
    /// 消息长度超出上限
    TooLong(u32),
    TooShort,
    ListenerClosed,
    QueueFull,
    Extension(&'static str),
}

pub type ProxyResult<T> = Result<T, ProxyError>;

impl ProxyError {
    pub fn extension(value: &'static str) -> ProxyError {
        ProxyError::Extension(value)
    }

    pub fn is_closed(&self) -> bool {
        match self {
            ProxyError::ListenerClosed => true,
            _ => false,
        }
    }

    pub fn is_io(&self) -> bool {
        match self {
            ProxyError::IoError(_) => true,
            _ => false,
        }
    }
}

impl From<io::Error> for ProxyError {
    fn from(value: io::Error) -> Self {
        ProxyError::IoError(value)
    }
}

impl From<serde_json::Error> for ProxyError {
    fn from(value: serde_json::Error) -> Self {
        ProxyError::SerdeError(value)
    }
}

impl fmt::Display for ProxyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyError::IoError(e) => write!(f, "io error: {}", e),
            ProxyError::SerdeError(e) => write!(f, "serde error: {}", e),
            ProxyError::UnknownMessage(kind) => write!(f, "unknown message kind: {:#04x}", kind),
            ProxyError::KindMismatch { expect, found } => {
                write!(
                    f,
                    "message kind mismatch: expect {:#04x} found {:#04x}",
                    expect, found
                )
            }
            ProxyError::TooLong(len) => write!(f, "message too long: {}", len),
            ProxyError::TooShort => write!(f, "buffer too short"),
            ProxyError::ListenerClosed => write!(f, "listener closed"),
            ProxyError::QueueFull => write!(f, "accept queue full"),
            ProxyError::Extension(s) => write!(f, "{}", s),
        }
    }
}

impl std::error::Error for ProxyError {}
