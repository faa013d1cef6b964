//! RDMA device discovery over sysfs.

pub mod guid;
pub mod link;
pub mod nic;
pub mod resolve;
pub mod sysfs;

#[cfg(test)]
pub(crate) mod testing;
