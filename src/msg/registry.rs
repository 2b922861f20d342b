use std::collections::HashMap;

use lazy_static::lazy_static;
use serde::de::DeserializeOwned;

use crate::{ProxyError, ProxyResult};

use super::{
    CloseProxy, Login, LoginResp, Message, NewProxy, NewProxyResp, NewVisitorConn,
    NewVisitorConnResp, NewWorkConn, Ping, Pong, ReqWorkConn, StartWorkConn, TypedMsg, UdpPacket,
    TYPE_CLOSE_PROXY, TYPE_LOGIN, TYPE_LOGIN_RESP, TYPE_NEW_PROXY, TYPE_NEW_PROXY_RESP,
    TYPE_NEW_VISITOR_CONN, TYPE_NEW_VISITOR_CONN_RESP, TYPE_NEW_WORK_CONN, TYPE_PING, TYPE_PONG,
    TYPE_REQ_WORK_CONN, TYPE_START_WORK_CONN, TYPE_UDP_PACKET,
};

type Decoder = fn(&[u8]) -> ProxyResult<Message>;

/// 类型字节到消息结构的映射表, 启动时注册完成后只读
pub struct MsgRegistry {
    decoders: HashMap<u8, Decoder>,
}

impl MsgRegistry {
    fn new() -> MsgRegistry {
        MsgRegistry {
            decoders: HashMap::new(),
        }
    }

    /// startup-only; duplicate registration is a programming error
    fn register(&mut self, kind: u8, decoder: Decoder) {
        if self.decoders.insert(kind, decoder).is_some() {
            panic!("message kind {:#04x} registered twice", kind);
        }
    }

    pub fn contains(&self, kind: u8) -> bool {
        self.decoders.contains_key(&kind)
    }

    pub fn decode(&self, kind: u8, body: &[u8]) -> ProxyResult<Message> {
        match self.decoders.get(&kind) {
            Some(decoder) => decoder(body),
            None => Err(ProxyError::UnknownMessage(kind)),
        }
    }
}

fn decode_typed<T>(body: &[u8]) -> ProxyResult<Message>
where
    T: TypedMsg + DeserializeOwned + Into<Message>,
{
    Ok(serde_json::from_slice::<T>(body)?.into())
}

lazy_static! {
    pub(crate) static ref MSG_REGISTRY: MsgRegistry = {
        let mut registry = MsgRegistry::new();
        registry.register(TYPE_LOGIN, decode_typed::<Login>);
        registry.register(TYPE_LOGIN_RESP, decode_typed::<LoginResp>);
        registry.register(TYPE_NEW_PROXY, decode_typed::<NewProxy>);
        registry.register(TYPE_NEW_PROXY_RESP, decode_typed::<NewProxyResp>);
        registry.register(TYPE_CLOSE_PROXY, decode_typed::<CloseProxy>);
        registry.register(TYPE_REQ_WORK_CONN, decode_typed::<ReqWorkConn>);
        registry.register(TYPE_NEW_WORK_CONN, decode_typed::<NewWorkConn>);
        registry.register(TYPE_START_WORK_CONN, decode_typed::<StartWorkConn>);
        registry.register(TYPE_NEW_VISITOR_CONN, decode_typed::<NewVisitorConn>);
        registry.register(TYPE_NEW_VISITOR_CONN_RESP, decode_typed::<NewVisitorConnResp>);
        registry.register(TYPE_PING, decode_typed::<Ping>);
        registry.register(TYPE_PONG, decode_typed::<Pong>);
        registry.register(TYPE_UDP_PACKET, decode_typed::<UdpPacket>);
        registry
    };
}
