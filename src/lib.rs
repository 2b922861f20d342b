

mod accepter;
mod error;
mod internal;
pub mod msg;

pub use accepter::{AcceptAddr, Accepter, WrapTcpAccepter};
pub use error::{ProxyError, ProxyResult};
pub use internal::InternalListener;
pub use msg::{read_message, read_message_into, write_message, Message, Msg, TypedMsg};
