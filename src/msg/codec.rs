use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use webparse::{Buf, BufMut, BinaryMut};

use crate::{ProxyError, ProxyResult};

use super::obfuscate::{xor_bytes, ObfuscateGuard};
use super::registry::MSG_REGISTRY;
use super::{Msg, Message, TypedMsg};

/// 帧头固定为类型字节加4字节大端长度
pub const FRAME_HEADER_BYTES: usize = 5;
/// 单条控制消息的长度上限
pub const MAX_MESSAGE_LENGTH: u32 = 10240;

/// 一帧的头部, 长度字段与载荷字节数严格一致
pub struct MsgHead {
    pub kind: u8,
    pub length: u32,
}

impl MsgHead {
    pub fn new(kind: u8, length: u32) -> MsgHead {
        MsgHead { kind, length }
    }

    pub fn parse<T: Buf>(buffer: &mut T) -> ProxyResult<MsgHead> {
        if buffer.remaining() < FRAME_HEADER_BYTES {
            return Err(ProxyError::TooShort);
        }
        let kind = buffer.get_u8();
        let high = buffer.get_u16() as u32;
        let low = buffer.get_u16() as u32;
        Ok(MsgHead {
            kind,
            length: (high << 16) | low,
        })
    }

    pub fn encode<B: Buf + BufMut>(&self, buffer: &mut B) -> ProxyResult<usize> {
        let mut size = 0;
        size += buffer.put_u8(self.kind);
        size += buffer.put_u32(self.length);
        Ok(size)
    }
}

/// 将消息编码成完整的一帧
pub fn encode_message<B: Buf + BufMut, M: Msg>(msg: &M, buf: &mut B) -> ProxyResult<usize> {
    let body = msg.encode_body()?;
    if body.len() as u32 > MAX_MESSAGE_LENGTH {
        return Err(ProxyError::TooLong(body.len() as u32));
    }
    let head = MsgHead::new(msg.msg_kind(), body.len() as u32);
    let mut size = 0;
    size += head.encode(buf)?;
    size += buf.put_slice(&body);
    Ok(size)
}

async fn read_frame<R>(reader: &mut R) -> ProxyResult<(u8, Vec<u8>)>
where
    R: AsyncRead + Unpin,
{
    let kind = reader.read_u8().await?;
    if !MSG_REGISTRY.contains(kind) {
        return Err(ProxyError::UnknownMessage(kind));
    }
    let length = reader.read_u32().await?;
    if length > MAX_MESSAGE_LENGTH {
        return Err(ProxyError::TooLong(length));
    }
    let mut body = vec![0u8; length as usize];
    reader.read_exact(&mut body).await?;
    log::trace!("代理中心: 读取消息帧 kind={} len={}", kind, length);
    Ok((kind, body))
}

/// 读取一条消息, 载荷消息在返回前已完成还原
pub async fn read_message<R>(reader: &mut R) -> ProxyResult<Message>
where
    R: AsyncRead + Unpin,
{
    let (kind, body) = read_frame(reader).await?;
    let mut msg = MSG_REGISTRY.decode(kind, &body)?;
    if let Some(data) = msg.raw_data_mut() {
        xor_bytes(data);
    }
    Ok(msg)
}

/// 定向读取指定类型的消息, 类型不符时报错
pub async fn read_message_into<R, M>(reader: &mut R, msg: &mut M) -> ProxyResult<()>
where
    R: AsyncRead + Unpin,
    M: TypedMsg,
{
    let (kind, body) = read_frame(reader).await?;
    if kind != M::KIND {
        return Err(ProxyError::KindMismatch {
            expect: M::KIND,
            found: kind,
        });
    }
    *msg = serde_json::from_slice(&body)?;
    if let Some(data) = msg.raw_data_mut() {
        xor_bytes(data);
    }
    Ok(())
}

/// 写出一条消息, 载荷在写出期间临时混淆, 调用结束后消息内容不变
pub async fn write_message<W, M>(writer: &mut W, msg: &mut M) -> ProxyResult<()>
where
    W: AsyncWrite + Unpin,
    M: Msg,
{
    let mut buf = BinaryMut::new();
    let guard = ObfuscateGuard::new(msg);
    encode_message(&*guard, &mut buf)?;
    writer.write_all(buf.chunk()).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_head_roundtrip() {
        let mut buf = BinaryMut::new();
        let size = MsgHead::new(b'h', 17).encode(&mut buf).unwrap();
        assert_eq!(size, FRAME_HEADER_BYTES);
        assert_eq!(buf.chunk(), &[b'h', 0, 0, 0, 17]);

        let head = MsgHead::parse(&mut buf).unwrap();
        assert_eq!(head.kind, b'h');
        assert_eq!(head.length, 17);
    }

    #[test]
    fn test_head_too_short() {
        let mut buf = BinaryMut::new();
        buf.put_slice(&[b'h', 0]);
        match MsgHead::parse(&mut buf) {
            Err(ProxyError::TooShort) => {}
            _ => unreachable!("truncated header must be rejected"),
        }
    }
}
