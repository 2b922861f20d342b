use std::ops::Deref;

use super::Msg;

/// 线路混淆用的固定密钥, 与协议格式绑定不可更换
/// wire-format-visible, not a security boundary
pub(crate) const XOR_KEY: &[u8] = b"1.1.1";

/// self-inverse, one pass on encode and one pass on decode
pub fn xor_bytes(data: &mut [u8]) {
    for (i, b) in data.iter_mut().enumerate() {
        *b ^= XOR_KEY[i % XOR_KEY.len()];
    }
}

/// 写入期间临时混淆消息数据, Drop时无条件还原
/// the caller's message is observably unchanged even when the write fails
pub(crate) struct ObfuscateGuard<'a, M: Msg> {
    msg: &'a mut M,
}

impl<'a, M: Msg> ObfuscateGuard<'a, M> {
    pub fn new(msg: &'a mut M) -> ObfuscateGuard<'a, M> {
        if let Some(data) = msg.raw_data_mut() {
            xor_bytes(data);
        }
        ObfuscateGuard { msg }
    }
}

impl<M: Msg> Deref for ObfuscateGuard<'_, M> {
    type Target = M;

    fn deref(&self) -> &M {
        self.msg
    }
}

impl<M: Msg> Drop for ObfuscateGuard<'_, M> {
    fn drop(&mut self) {
        if let Some(data) = self.msg.raw_data_mut() {
            xor_bytes(data);
        }
    }
}
