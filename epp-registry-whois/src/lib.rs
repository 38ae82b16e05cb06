//! WHOIS responder for the registry backend
//!
//! 对公开查询返回结构化记录：域名、主机、注册商。数据直接来自注册局
//! 存储的只读视图，文本报文排版（RFC 3912）由外部负责。

mod error;
mod service;
mod types;

pub use error::{WhoisError, WhoisResult};
pub use service::WhoisService;
pub use types::{WhoisDomainRecord, WhoisHostRecord, WhoisRegistrarRecord};
