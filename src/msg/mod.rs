
mod codec;
mod obfuscate;
mod registry;
mod types;

pub use codec::{
    encode_message, read_message, read_message_into, write_message, MsgHead, FRAME_HEADER_BYTES,
    MAX_MESSAGE_LENGTH,
};
pub use obfuscate::xor_bytes;
pub use types::{
    CloseProxy, Login, LoginResp, Message, Msg, NewProxy, NewProxyResp, NewVisitorConn,
    NewVisitorConnResp, NewWorkConn, Ping, Pong, ReqWorkConn, StartWorkConn, TypedMsg, UdpPacket,
    TYPE_CLOSE_PROXY, TYPE_LOGIN, TYPE_LOGIN_RESP, TYPE_NEW_PROXY, TYPE_NEW_PROXY_RESP,
    TYPE_NEW_VISITOR_CONN, TYPE_NEW_VISITOR_CONN_RESP, TYPE_NEW_WORK_CONN, TYPE_PING, TYPE_PONG,
    TYPE_REQ_WORK_CONN, TYPE_START_WORK_CONN, TYPE_UDP_PACKET,
};
