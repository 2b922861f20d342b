// #![deny(warnings)]
#![deny(rust_2018_idioms)]

#[cfg(test)]
mod tests {
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use rtproxy::msg::{
        self, CloseProxy, Login, LoginResp, NewProxy, NewProxyResp, NewVisitorConn,
        NewVisitorConnResp, NewWorkConn, Ping, Pong, ReqWorkConn, StartWorkConn, UdpPacket,
        TYPE_PING,
    };
    use rtproxy::{read_message, read_message_into, write_message, Message, ProxyError};
    use tokio::io::AsyncWrite;

    /// 始终写失败的流, 用于验证出错路径上的还原
    struct FailWriter;

    impl AsyncWrite for FailWriter {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &[u8],
        ) -> Poll<Result<usize, io::Error>> {
            Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "write refused")))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), io::Error>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
        ) -> Poll<Result<(), io::Error>> {
            Poll::Ready(Ok(()))
        }
    }

    fn sample_messages() -> Vec<Message> {
        vec![
            Login {
                version: "0.1.0".to_string(),
                hostname: "client-1".to_string(),
                os: "linux".to_string(),
                arch: "x86_64".to_string(),
                user: "admin".to_string(),
                privilege_key: "abcdef".to_string(),
                timestamp: 1700000000,
                run_id: "run-1".to_string(),
                pool_count: 4,
            }
            .into(),
            LoginResp {
                version: "0.1.0".to_string(),
                run_id: "run-1".to_string(),
                error: String::new(),
            }
            .into(),
            NewProxy {
                proxy_name: "web".to_string(),
                proxy_type: "http".to_string(),
                use_encryption: true,
                use_compression: false,
                remote_port: 8080,
                custom_domains: vec!["example.com".to_string()],
                subdomain: "web".to_string(),
                sk: String::new(),
            }
            .into(),
            NewProxyResp {
                proxy_name: "web".to_string(),
                remote_addr: "0.0.0.0:8080".to_string(),
                error: String::new(),
            }
            .into(),
            CloseProxy {
                proxy_name: "web".to_string(),
            }
            .into(),
            ReqWorkConn {}.into(),
            NewWorkConn {
                run_id: "run-1".to_string(),
                privilege_key: "abcdef".to_string(),
                timestamp: 1700000000,
            }
            .into(),
            StartWorkConn {
                proxy_name: "web".to_string(),
                src_addr: "1.2.3.4".to_string(),
                dst_addr: "127.0.0.1".to_string(),
                src_port: 50000,
                dst_port: 80,
                error: String::new(),
            }
            .into(),
            NewVisitorConn {
                proxy_name: "secret".to_string(),
                sign_key: "sign".to_string(),
                timestamp: 1700000000,
                use_encryption: false,
                use_compression: false,
            }
            .into(),
            NewVisitorConnResp {
                proxy_name: "secret".to_string(),
                error: String::new(),
            }
            .into(),
            Ping {
                privilege_key: "abcdef".to_string(),
                timestamp: 1700000000,
            }
            .into(),
            Pong {
                error: String::new(),
            }
            .into(),
            UdpPacket::new(vec![0x01, 0x02, 0x03], "1.2.3.4:53".to_string(), "8.8.8.8:53".to_string())
                .into(),
        ]
    }

    #[tokio::test]
    async fn test_roundtrip_all_kinds() {
        let _ = env_logger::builder().is_test(true).try_init();
        for mut msg in sample_messages() {
            let want = msg.clone();
            let mut buf = Vec::new();
            write_message(&mut buf, &mut msg).await.unwrap();
            // write must leave the message untouched
            assert_eq!(msg, want);

            let mut reader = &buf[..];
            let got = read_message(&mut reader).await.unwrap();
            assert_eq!(got, want);
        }
    }

    #[tokio::test]
    async fn test_udp_packet_obfuscated_on_wire() {
        let mut packet = UdpPacket::new(
            vec![0x01, 0x02, 0x03],
            "1.2.3.4:53".to_string(),
            "8.8.8.8:53".to_string(),
        );
        let mut buf = Vec::new();
        write_message(&mut buf, &mut packet).await.unwrap();

        // in-memory payload restored after the write
        assert_eq!(packet.content, vec![0x01, 0x02, 0x03]);

        // wire payload carries the obfuscated bytes, not the clear encoding
        let clear = serde_json::to_vec(&packet).unwrap();
        assert_ne!(&buf[msg::FRAME_HEADER_BYTES..], &clear[..]);

        let mut reader = &buf[..];
        let got = read_message(&mut reader).await.unwrap();
        match got {
            Message::UdpPacket(p) => assert_eq!(p.content, vec![0x01, 0x02, 0x03]),
            _ => unreachable!("wrong message kind"),
        }
    }

    #[tokio::test]
    async fn test_write_restores_on_failure() {
        let mut packet = UdpPacket::new(vec![9, 8, 7], String::new(), String::new());
        let ret = write_message(&mut FailWriter, &mut packet).await;
        assert!(matches!(ret, Err(ProxyError::IoError(_))));
        assert_eq!(packet.content, vec![9, 8, 7]);
    }

    #[tokio::test]
    async fn test_unknown_kind_rejected() {
        let buf = vec![b'z', 0, 0, 0, 2, b'{', b'}'];
        let mut reader = &buf[..];
        match read_message(&mut reader).await {
            Err(ProxyError::UnknownMessage(kind)) => assert_eq!(kind, b'z'),
            _ => unreachable!("unregistered kind must fail decode"),
        }
    }

    #[tokio::test]
    async fn test_truncated_frame() {
        let mut full = Vec::new();
        let mut ping = Ping::default();
        write_message(&mut full, &mut ping).await.unwrap();

        let mut reader = &full[..full.len() - 3];
        match read_message(&mut reader).await {
            Err(ProxyError::IoError(e)) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
            _ => unreachable!("truncated body must surface the stream error"),
        }
    }

    #[tokio::test]
    async fn test_oversize_length_rejected() {
        let length = (msg::MAX_MESSAGE_LENGTH + 1).to_be_bytes();
        let buf = vec![TYPE_PING, length[0], length[1], length[2], length[3]];
        let mut reader = &buf[..];
        match read_message(&mut reader).await {
            Err(ProxyError::TooLong(len)) => assert_eq!(len, msg::MAX_MESSAGE_LENGTH + 1),
            _ => unreachable!("oversize declared length must be rejected before read"),
        }
    }

    #[tokio::test]
    async fn test_read_into_typed() {
        let mut buf = Vec::new();
        let mut ping = Ping {
            privilege_key: "key".to_string(),
            timestamp: 42,
        };
        write_message(&mut buf, &mut ping).await.unwrap();

        let mut got = Ping::default();
        let mut reader = &buf[..];
        read_message_into(&mut reader, &mut got).await.unwrap();
        assert_eq!(got, ping);
    }

    #[tokio::test]
    async fn test_read_into_kind_mismatch() {
        let mut buf = Vec::new();
        let mut ping = Ping::default();
        write_message(&mut buf, &mut ping).await.unwrap();

        let mut wrong = Pong::default();
        let mut reader = &buf[..];
        match read_message_into(&mut reader, &mut wrong).await {
            Err(ProxyError::KindMismatch { expect, found }) => {
                assert_eq!(found, TYPE_PING);
                assert_ne!(expect, found);
            }
            _ => unreachable!("kind mismatch must be rejected"),
        }
    }

    #[tokio::test]
    async fn test_read_into_raw_data_restored() {
        let mut buf = Vec::new();
        let mut packet = UdpPacket::new(vec![1, 2, 3], String::new(), String::new());
        write_message(&mut buf, &mut packet).await.unwrap();

        let mut got = UdpPacket::default();
        let mut reader = &buf[..];
        read_message_into(&mut reader, &mut got).await.unwrap();
        assert_eq!(got.content, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_pipelined_frames() {
        let mut buf = Vec::new();
        for mut msg in sample_messages() {
            write_message(&mut buf, &mut msg).await.unwrap();
        }
        let mut reader = &buf[..];
        for want in sample_messages() {
            let got = read_message(&mut reader).await.unwrap();
            assert_eq!(got, want);
        }
    }
}
