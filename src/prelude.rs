//! The rdmamap prelude.
//!
//! The purpose of this module is to alleviate imports of common device
//! discovery functionalities.

pub use crate::rdma::guid::NodeGuid;
pub use crate::rdma::link::{LinkEncap, LinkResolver};
pub use crate::rdma::nic::{CharDevice, CharDeviceRole, RdmaMap};
pub use crate::rdma::resolve::ResolveError;
pub use crate::rdma::sysfs::SysfsLayout;
