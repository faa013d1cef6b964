//! Network interface attributes.
//!
//! Resolution needs two facts about an interface: its link-layer
//! encapsulation and its hardware address. [`LinkResolver`] abstracts where
//! they come from; [`SysfsLinks`] reads them from `/sys/class/net`.

use std::fmt;
use std::io;
use std::path::PathBuf;

use super::sysfs::{self, SysfsLayout};

/// Link-layer encapsulation of a network interface.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LinkEncap {
    Ether,
    Infiniband,
    Other(String),
}

impl LinkEncap {
    /// Map an `ARPHRD_*` hardware type number.
    pub fn from_arphrd(ty: u16) -> Self {
        match ty {
            libc::ARPHRD_ETHER => Self::Ether,
            libc::ARPHRD_INFINIBAND => Self::Infiniband,
            libc::ARPHRD_LOOPBACK => Self::Other("loopback".to_owned()),
            libc::ARPHRD_NONE => Self::Other("none".to_owned()),
            _ => Self::Other(ty.to_string()),
        }
    }

    /// Get the conventional name of this encapsulation.
    #[inline]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ether => "ether",
            Self::Infiniband => "infiniband",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for LinkEncap {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attributes of a network interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkAttrs {
    pub encap: LinkEncap,
    pub hw_addr: Vec<u8>,
}

/// Source of network interface attributes.
pub trait LinkResolver {
    /// Look up an interface by name.
    fn link_attrs(&self, netdev: &str) -> io::Result<LinkAttrs>;
}

impl<T: LinkResolver + ?Sized> LinkResolver for &T {
    #[inline]
    fn link_attrs(&self, netdev: &str) -> io::Result<LinkAttrs> {
        (**self).link_attrs(netdev)
    }
}

/// Reads interface attributes from `<net_class_dir>/<netdev>/{type,address}`.
#[derive(Debug, Clone)]
pub struct SysfsLinks {
    net_class_dir: PathBuf,
}

impl SysfsLinks {
    pub fn new(layout: &SysfsLayout) -> Self {
        Self {
            net_class_dir: layout.net_class_dir.clone(),
        }
    }
}

impl Default for SysfsLinks {
    #[inline]
    fn default() -> Self {
        Self::new(&SysfsLayout::default())
    }
}

fn invalid_data(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}

/// Parse a colon-separated hex hardware address of any length.
fn parse_hw_addr(text: &str) -> io::Result<Vec<u8>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }
    text.split(':')
        .map(|b| {
            u8::from_str_radix(b, 16)
                .map_err(|e| invalid_data(format!("bad hardware address {:?}: {}", text, e)))
        })
        .collect()
}

impl LinkResolver for SysfsLinks {
    fn link_attrs(&self, netdev: &str) -> io::Result<LinkAttrs> {
        let dir = self.net_class_dir.join(netdev);
        if !dir.exists() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("link {} not found", netdev),
            ));
        }

        let ty = sysfs::read_line(&dir.join("type"))?;
        let ty = ty
            .trim()
            .parse::<u16>()
            .map_err(|e| invalid_data(format!("bad link type {:?}: {}", ty, e)))?;
        let hw_addr = parse_hw_addr(&sysfs::read_line(&dir.join("address"))?)?;

        Ok(LinkAttrs {
            encap: LinkEncap::from_arphrd(ty),
            hw_addr,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::rdma::testing::FakeSysfs;

    use super::*;

    #[test]
    fn test_ether_link() {
        let fake = FakeSysfs::new();
        let dir = fake.layout().net_class_dir.join("eth0");
        fake.file(&dir.join("type"), "1\n");
        fake.file(&dir.join("address"), "0c:42:a1:9e:2f:b0\n");

        let attrs = SysfsLinks::new(fake.layout()).link_attrs("eth0").unwrap();
        assert_eq!(attrs.encap, LinkEncap::Ether);
        assert_eq!(attrs.hw_addr, [0x0c, 0x42, 0xa1, 0x9e, 0x2f, 0xb0]);
    }

    #[test]
    fn test_ipoib_link() {
        let fake = FakeSysfs::new();
        let dir = fake.layout().net_class_dir.join("ib0");
        fake.file(&dir.join("type"), "32\n");
        fake.file(
            &dir.join("address"),
            "00:00:10:87:fe:80:00:00:00:00:00:00:00:02:c9:03:00:33:1a:84\n",
        );

        let attrs = SysfsLinks::new(fake.layout()).link_attrs("ib0").unwrap();
        assert_eq!(attrs.encap, LinkEncap::Infiniband);
        assert_eq!(attrs.hw_addr.len(), 20);
    }

    #[test]
    fn test_other_links() {
        assert_eq!(LinkEncap::from_arphrd(772).as_str(), "loopback");
        assert_eq!(LinkEncap::from_arphrd(65534).as_str(), "none");
        assert_eq!(LinkEncap::from_arphrd(778).to_string(), "778");
    }

    #[test]
    fn test_missing_link() {
        let fake = FakeSysfs::new();
        let err = SysfsLinks::new(fake.layout()).link_attrs("eth9").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
