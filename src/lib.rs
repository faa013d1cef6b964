//! A library that maps RDMA devices to the character devices and network
//! interfaces they expose, by walking the Linux sysfs.
//!
//! It answers three questions that container network plugins and device
//! plugins keep asking:
//!
//! - Which RDMA device (if any) backs network interface `eth0`?
//! - Which `/dev/infiniband/*` nodes must be passed to a container that
//!   uses RDMA device `mlx5_0`?
//! - Which RDMA devices hang off PCI function `0000:05:00.0` or auxiliary
//!   device `mlx5_core.sf.4`?
//!
//! Nothing is cached. Every call reads the live sysfs, so the answers are as
//! current as the kernel's view, and no more consistent than it: a device
//! may disappear between being listed and being read, in which case it is
//! treated as absent.
//!
//! # Example
//!
//! ```rust,no_run
//! use rdmamap::*;
//!
//! let map = RdmaMap::new();
//! for dev in map.list_devices() {
//!     println!("{}: {:?}", dev, map.char_device_paths(&dev));
//! }
//!
//! if let Ok(Some(dev)) = map.resolve_for_netdev("ib0") {
//!     println!("ib0 is backed by {}", dev);
//! }
//! ```
//!
//! Point the library elsewhere (a container's view of the host, a test
//! fixture) with a custom [`SysfsLayout`]:
//!
//! ```rust,no_run
//! use rdmamap::*;
//!
//! let map = RdmaMap::with_layout(SysfsLayout::with_root("/host"));
//! let devs = map.devices_for_pci("0000:05:00.0");
//! ```

mod rdma;

pub use rdma::guid::{hardware_eui, GuidParseError, NodeGuid, INFINIBAND_ADDR_LEN};
pub use rdma::link::{LinkAttrs, LinkEncap, LinkResolver, SysfsLinks};
pub use rdma::nic::*;
pub use rdma::resolve::ResolveError;
pub use rdma::sysfs::{ConfigError, SysfsError, SysfsLayout};

/// Raw, uncached sysfs reads.
pub use rdma::sysfs;

pub mod prelude;
