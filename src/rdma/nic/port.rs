use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use super::RdmaMap;
use crate::rdma::sysfs::{self, SysfsError};

const PORTS_DIR: &str = "ports";
const GID_ATTRS_NDEVS_DIR: &str = "gid_attrs/ndevs";
const COUNTERS_DIR: &str = "counters";
const HW_COUNTERS_DIR: &str = "hw_counters";

/// Port statistics query error type.
#[derive(Debug, Error)]
pub enum StatsError {
    /// A counter directory could not be listed.
    #[error("counter directory {} unavailable", .0.display())]
    MissingCounters(PathBuf),

    /// A counter file could not be read.
    #[error("cannot read counter")]
    Sysfs(#[from] SysfsError),
}

/// A single named counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatEntry {
    pub name: String,
    pub value: u64,
}

/// Counters of one port.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PortStats {
    /// Port number.
    pub port: u32,

    /// Standard InfiniBand port counters (`counters/`).
    pub stats: Vec<StatEntry>,

    /// Driver-specific hardware counters (`hw_counters/`).
    pub hw_stats: Vec<StatEntry>,
}

/// Counters of every port of a device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceStats {
    pub port_stats: Vec<PortStats>,
}

/// Read every counter file in a directory.
///
/// Unparsable content is recorded as zero. A counter that vanished after
/// listing is skipped.
fn read_counters(dir: &Path) -> Result<Vec<StatEntry>, StatsError> {
    if !dir.is_dir() {
        return Err(StatsError::MissingCounters(dir.to_owned()));
    }

    let mut entries = Vec::new();
    for name in sysfs::list_names(dir) {
        let path = dir.join(&name);
        let text = match sysfs::read_line(&path) {
            Ok(text) => text,
            Err(e) if e.is_not_found() => continue,
            Err(e) => return Err(e.into()),
        };
        let value = text.trim().parse::<u64>().unwrap_or_else(|e| {
            log::debug!("rdmamap: counter {} unparsable: {}", path.display(), e);
            0
        });
        entries.push(StatEntry { name, value });
    }
    Ok(entries)
}

impl RdmaMap {
    fn port_dir(&self, dev_name: &str, port: &str) -> PathBuf {
        self.device_dir(dev_name).join(PORTS_DIR).join(port)
    }

    /// List the port names (`1`, `2`, ...) of a device.
    #[inline]
    pub fn list_ports(&self, dev_name: &str) -> Vec<String> {
        sysfs::list_names(&self.device_dir(dev_name).join(PORTS_DIR))
    }

    /// List the GID-table indices of a port that have a network device
    /// attached.
    #[inline]
    pub fn netdev_attachments(&self, dev_name: &str, port: &str) -> Vec<String> {
        sysfs::list_names(&self.port_dir(dev_name, port).join(GID_ATTRS_NDEVS_DIR))
    }

    /// Get the network device name attached at a GID-table index.
    pub fn netdev_name_at(
        &self,
        dev_name: &str,
        port: &str,
        index: &str,
    ) -> Result<String, SysfsError> {
        let path = self
            .port_dir(dev_name, port)
            .join(GID_ATTRS_NDEVS_DIR)
            .join(index);
        sysfs::read_line(&path)
    }

    /// Read the counters and hardware counters of a port.
    pub fn port_stats(&self, dev_name: &str, port: u32) -> Result<PortStats, StatsError> {
        let dir = self.port_dir(dev_name, &port.to_string());
        let stats = read_counters(&dir.join(COUNTERS_DIR))?;
        let hw_stats = read_counters(&dir.join(HW_COUNTERS_DIR))?;
        Ok(PortStats {
            port,
            stats,
            hw_stats,
        })
    }

    /// Read the counters of every port of a device.
    pub fn all_port_stats(&self, dev_name: &str) -> Result<DeviceStats, StatsError> {
        let mut port_stats = Vec::new();
        for port in self.list_ports(dev_name) {
            let Ok(num) = port.parse::<u32>() else {
                log::debug!("rdmamap: skipping non-numeric port {:?} of {}", port, dev_name);
                continue;
            };
            port_stats.push(self.port_stats(dev_name, num)?);
        }
        Ok(DeviceStats { port_stats })
    }
}

#[cfg(test)]
mod tests {
    use crate::rdma::testing::FakeSysfs;

    use super::*;

    #[test]
    fn test_ports_and_ndevs() {
        let fake = FakeSysfs::new();
        fake.device("mlx5_0");
        fake.ndev("mlx5_0", "1", "0", "eth0");
        fake.ndev("mlx5_0", "1", "1", "eth0");

        let map = fake.map();
        assert_eq!(map.list_ports("mlx5_0"), ["1"]);

        let mut indices = map.netdev_attachments("mlx5_0", "1");
        indices.sort();
        assert_eq!(indices, ["0", "1"]);
        assert_eq!(map.netdev_name_at("mlx5_0", "1", "0").unwrap(), "eth0");
        assert!(map
            .netdev_name_at("mlx5_0", "1", "7")
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_missing_ports() {
        let fake = FakeSysfs::new();
        fake.device("mlx5_0");
        assert!(fake.map().list_ports("mlx5_0").is_empty());
        assert!(fake.map().netdev_attachments("mlx5_0", "1").is_empty());
    }

    #[test]
    fn test_port_stats() {
        let fake = FakeSysfs::new();
        fake.device("mlx5_0");
        fake.counter("mlx5_0", "1", "counters", "port_rcv_packets", "42\n");
        fake.counter("mlx5_0", "1", "hw_counters", "out_of_buffer", "7\n");
        fake.counter("mlx5_0", "1", "hw_counters", "garbage", "n/a\n");

        let stats = fake.map().port_stats("mlx5_0", 1).unwrap();
        assert_eq!(stats.port, 1);
        assert_eq!(
            stats.stats,
            [StatEntry {
                name: "port_rcv_packets".into(),
                value: 42
            }]
        );

        let mut hw = stats.hw_stats.clone();
        hw.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(hw[0].name, "garbage");
        assert_eq!(hw[0].value, 0);
        assert_eq!(hw[1].value, 7);
    }

    #[test]
    fn test_port_stats_missing_hw_counters() {
        let fake = FakeSysfs::new();
        fake.device("mlx5_0");
        fake.counter("mlx5_0", "1", "counters", "port_rcv_packets", "42\n");

        let err = fake.map().port_stats("mlx5_0", 1).unwrap_err();
        assert!(matches!(err, StatsError::MissingCounters(_)));
    }

    #[test]
    fn test_all_port_stats() {
        let fake = FakeSysfs::new();
        fake.device("mlx5_0");
        for port in ["1", "2"] {
            fake.counter("mlx5_0", port, "counters", "port_xmit_data", "1\n");
            fake.counter("mlx5_0", port, "hw_counters", "lifespan", "10\n");
        }

        let mut stats = fake.map().all_port_stats("mlx5_0").unwrap();
        stats.port_stats.sort_by_key(|s| s.port);
        assert_eq!(
            stats.port_stats.iter().map(|s| s.port).collect::<Vec<_>>(),
            [1, 2]
        );

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["port_stats"][0]["hw_stats"][0]["name"], "lifespan");
    }
}
