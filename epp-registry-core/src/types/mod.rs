//! 类型定义模块

mod command;
mod history;
mod registrar;
mod resource;
mod response;
mod transfer;

pub use command::{
    CommandOp, CreateArgs, EppCommand, PrivilegeLevel, SessionContext, TransferOp, UpdateArgs,
};
pub use history::{BillingEvent, BillingEventKind, HistoryEntry, HistoryType};
pub use registrar::{Registrar, RegistrarStatus};
pub use resource::{
    ContactData, DomainData, DsRecord, EppResource, GracePeriod, GracePeriodKind, HostData,
    ResourceData, ResourceKind, StatusValue,
};
pub use response::{EppResponse, ResourceSummary, ResultCode};
pub use transfer::{TransferData, TransferStatus};
