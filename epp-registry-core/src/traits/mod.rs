//! 存储层抽象 Trait 定义

mod registrar_repository;
mod resource_store;

pub use registrar_repository::RegistrarRepository;
pub use resource_store::{CommitSet, ResourceStore};
