use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::ProxyResult;

pub const TYPE_LOGIN: u8 = b'o';
pub const TYPE_LOGIN_RESP: u8 = b'1';
pub const TYPE_NEW_PROXY: u8 = b'p';
pub const TYPE_NEW_PROXY_RESP: u8 = b'2';
pub const TYPE_CLOSE_PROXY: u8 = b'c';
pub const TYPE_REQ_WORK_CONN: u8 = b'r';
pub const TYPE_NEW_WORK_CONN: u8 = b'w';
pub const TYPE_START_WORK_CONN: u8 = b's';
pub const TYPE_NEW_VISITOR_CONN: u8 = b'v';
pub const TYPE_NEW_VISITOR_CONN_RESP: u8 = b'3';
pub const TYPE_PING: u8 = b'h';
pub const TYPE_PONG: u8 = b'4';
pub const TYPE_UDP_PACKET: u8 = b'u';

/// 控制消息的公共能力, 类型字节与编码, 携带裸数据的消息额外暴露数据访问
pub trait Msg {
    fn msg_kind(&self) -> u8;

    fn encode_body(&self) -> ProxyResult<Vec<u8>>;

    /// only payload-bearing kinds return their bytes, control kinds return None
    fn raw_data_mut(&mut self) -> Option<&mut Vec<u8>> {
        None
    }
}

/// 已知具体类型的消息, 可定向解码
pub trait TypedMsg: Msg + Serialize + DeserializeOwned {
    const KIND: u8;
}

/// 登录消息
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Login {
    pub version: String,
    pub hostname: String,
    pub os: String,
    pub arch: String,
    pub user: String,
    pub privilege_key: String,
    pub timestamp: u64,
    pub run_id: String,
    pub pool_count: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct LoginResp {
    pub version: String,
    pub run_id: String,
    pub error: String,
}

/// 新的映射请求
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct NewProxy {
    pub proxy_name: String,
    pub proxy_type: String,
    pub use_encryption: bool,
    pub use_compression: bool,
    pub remote_port: u16,
    pub custom_domains: Vec<String>,
    pub subdomain: String,
    pub sk: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct NewProxyResp {
    pub proxy_name: String,
    pub remote_addr: String,
    pub error: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct CloseProxy {
    pub proxy_name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ReqWorkConn {}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct NewWorkConn {
    pub run_id: String,
    pub privilege_key: String,
    pub timestamp: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct StartWorkConn {
    pub proxy_name: String,
    pub src_addr: String,
    pub dst_addr: String,
    pub src_port: u16,
    pub dst_port: u16,
    pub error: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct NewVisitorConn {
    pub proxy_name: String,
    pub sign_key: String,
    pub timestamp: u64,
    pub use_encryption: bool,
    pub use_compression: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct NewVisitorConnResp {
    pub proxy_name: String,
    pub error: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Ping {
    pub privilege_key: String,
    pub timestamp: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Pong {
    pub error: String,
}

/// 用户数据包, content在线路上会被混淆处理
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct UdpPacket {
    pub content: Vec<u8>,
    pub src_addr: String,
    pub dst_addr: String,
}

/// 所有已注册消息的联合类型, 由读取端按类型字节还原
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Login(Login),
    LoginResp(LoginResp),
    NewProxy(NewProxy),
    NewProxyResp(NewProxyResp),
    CloseProxy(CloseProxy),
    ReqWorkConn(ReqWorkConn),
    NewWorkConn(NewWorkConn),
    StartWorkConn(StartWorkConn),
    NewVisitorConn(NewVisitorConn),
    NewVisitorConnResp(NewVisitorConnResp),
    Ping(Ping),
    Pong(Pong),
    UdpPacket(UdpPacket),
}

macro_rules! impl_msg {
    ($t:ident, $kind:expr) => {
        impl Msg for $t {
            fn msg_kind(&self) -> u8 {
                $kind
            }

            fn encode_body(&self) -> ProxyResult<Vec<u8>> {
                Ok(serde_json::to_vec(self)?)
            }
        }

        impl TypedMsg for $t {
            const KIND: u8 = $kind;
        }

        impl From<$t> for Message {
            fn from(value: $t) -> Message {
                Message::$t(value)
            }
        }
    };
}

impl_msg!(Login, TYPE_LOGIN);
impl_msg!(LoginResp, TYPE_LOGIN_RESP);
impl_msg!(NewProxy, TYPE_NEW_PROXY);
impl_msg!(NewProxyResp, TYPE_NEW_PROXY_RESP);
impl_msg!(CloseProxy, TYPE_CLOSE_PROXY);
impl_msg!(ReqWorkConn, TYPE_REQ_WORK_CONN);
impl_msg!(NewWorkConn, TYPE_NEW_WORK_CONN);
impl_msg!(StartWorkConn, TYPE_START_WORK_CONN);
impl_msg!(NewVisitorConn, TYPE_NEW_VISITOR_CONN);
impl_msg!(NewVisitorConnResp, TYPE_NEW_VISITOR_CONN_RESP);
impl_msg!(Ping, TYPE_PING);
impl_msg!(Pong, TYPE_PONG);

impl UdpPacket {
    pub fn new(content: Vec<u8>, src_addr: String, dst_addr: String) -> UdpPacket {
        UdpPacket {
            content,
            src_addr,
            dst_addr,
        }
    }
}

impl Msg for Message {
    fn msg_kind(&self) -> u8 {
        match self {
            Message::Login(m) => m.msg_kind(),
            Message::LoginResp(m) => m.msg_kind(),
            Message::NewProxy(m) => m.msg_kind(),
            Message::NewProxyResp(m) => m.msg_kind(),
            Message::CloseProxy(m) => m.msg_kind(),
            Message::ReqWorkConn(m) => m.msg_kind(),
            Message::NewWorkConn(m) => m.msg_kind(),
            Message::StartWorkConn(m) => m.msg_kind(),
            Message::NewVisitorConn(m) => m.msg_kind(),
            Message::NewVisitorConnResp(m) => m.msg_kind(),
            Message::Ping(m) => m.msg_kind(),
            Message::Pong(m) => m.msg_kind(),
            Message::UdpPacket(m) => m.msg_kind(),
        }
    }

    fn encode_body(&self) -> ProxyResult<Vec<u8>> {
        match self {
            Message::Login(m) => m.encode_body(),
            Message::LoginResp(m) => m.encode_body(),
            Message::NewProxy(m) => m.encode_body(),
            Message::NewProxyResp(m) => m.encode_body(),
            Message::CloseProxy(m) => m.encode_body(),
            Message::ReqWorkConn(m) => m.encode_body(),
            Message::NewWorkConn(m) => m.encode_body(),
            Message::StartWorkConn(m) => m.encode_body(),
            Message::NewVisitorConn(m) => m.encode_body(),
            Message::NewVisitorConnResp(m) => m.encode_body(),
            Message::Ping(m) => m.encode_body(),
            Message::Pong(m) => m.encode_body(),
            Message::UdpPacket(m) => m.encode_body(),
        }
    }

    fn raw_data_mut(&mut self) -> Option<&mut Vec<u8>> {
        match self {
            Message::UdpPacket(m) => m.raw_data_mut(),
            _ => None,
        }
    }
}

impl Msg for UdpPacket {
    fn msg_kind(&self) -> u8 {
        TYPE_UDP_PACKET
    }

    fn encode_body(&self) -> ProxyResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    fn raw_data_mut(&mut self) -> Option<&mut Vec<u8>> {
        Some(&mut self.content)
    }
}

impl TypedMsg for UdpPacket {
    const KIND: u8 = TYPE_UDP_PACKET;
}

impl From<UdpPacket> for Message {
    fn from(value: UdpPacket) -> Message {
        Message::UdpPacket(value)
    }
}
