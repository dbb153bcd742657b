//! Unix-style permission evaluation.
//!
//! The filesystem recognises exactly one identity as "owner": the
//! [`MountIdentity`] captured when the filesystem is mounted. Every node
//! reports that identity as its uid/gid, and every access check buckets the
//! requester relative to it (owner, then group, then other).

use std::fmt;
use std::ops::BitOr;

/// Requested access bits, laid out like `R_OK | W_OK | X_OK`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AccessMask(u8);

impl AccessMask {
    /// No access requested.
    pub const NONE: AccessMask = AccessMask(0);
    /// Execute / search.
    pub const EXECUTE: AccessMask = AccessMask(0o1);
    /// Write.
    pub const WRITE: AccessMask = AccessMask(0o2);
    /// Read.
    pub const READ: AccessMask = AccessMask(0o4);

    /// Build a mask from the low three bits of `bits`.
    pub const fn from_bits(bits: u8) -> Self {
        AccessMask(bits & 0o7)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when the two masks share at least one bit.
    pub const fn intersects(self, other: AccessMask) -> bool {
        self.0 & other.0 != 0
    }

    /// Iterate over the individual bits set in this mask (read, write, execute).
    pub fn iter(self) -> impl Iterator<Item = AccessMask> {
        [AccessMask::READ, AccessMask::WRITE, AccessMask::EXECUTE]
            .into_iter()
            .filter(move |bit| self.intersects(*bit))
    }
}

impl BitOr for AccessMask {
    type Output = AccessMask;

    fn bitor(self, rhs: AccessMask) -> AccessMask {
        AccessMask(self.0 | rhs.0)
    }
}

/// Nine permission bits of a node (`rwxrwxrwx`).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Access(u16);

impl Access {
    /// Wrap raw mode bits, discarding anything above the nine permission bits.
    pub const fn new(mode: u16) -> Self {
        Access(mode & 0o777)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn owner(self) -> AccessMask {
        AccessMask::from_bits((self.0 >> 6) as u8)
    }

    pub const fn group(self) -> AccessMask {
        AccessMask::from_bits((self.0 >> 3) as u8)
    }

    pub const fn other(self) -> AccessMask {
        AccessMask::from_bits(self.0 as u8)
    }

    /// Permission triplet for the given bucket.
    pub const fn bucket(self, bucket: Bucket) -> AccessMask {
        match bucket {
            Bucket::Owner => self.owner(),
            Bucket::Group => self.group(),
            Bucket::Other => self.other(),
        }
    }
}

impl fmt::Debug for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Access({:#o})", self.0)
    }
}

impl From<u16> for Access {
    fn from(mode: u16) -> Self {
        Access::new(mode)
    }
}

/// Which permission triplet applies to a requester.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Owner,
    Group,
    Other,
}

/// Credentials of the process issuing a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requester {
    pub uid: u32,
    pub gid: u32,
}

impl Requester {
    pub fn new(uid: u32, gid: u32) -> Self {
        Self { uid, gid }
    }
}

/// The single owner/group pair the whole mounted filesystem belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MountIdentity {
    pub uid: u32,
    pub gid: u32,
}

impl MountIdentity {
    pub fn new(uid: u32, gid: u32) -> Self {
        Self { uid, gid }
    }

    /// Identity of the current process (the one doing the mount).
    #[cfg(unix)]
    pub fn current() -> Self {
        Self {
            uid: rustix::process::getuid().as_raw(),
            gid: rustix::process::getgid().as_raw(),
        }
    }

    #[cfg(not(unix))]
    pub fn current() -> Self {
        Self { uid: 0, gid: 0 }
    }

    /// Classify a requester. Owner wins over group, group over other.
    pub fn bucket_for(&self, requester: Requester) -> Bucket {
        if requester.uid == self.uid {
            Bucket::Owner
        } else if requester.gid == self.gid {
            Bucket::Group
        } else {
            Bucket::Other
        }
    }

    /// Decide whether `requester` may perform `requested` on a node with
    /// permission bits `access`.
    ///
    /// Only the requester's bucket is consulted; the check passes when that
    /// triplet shares at least one bit with `requested`.
    pub fn authorize(&self, requested: AccessMask, access: Access, requester: Requester) -> bool {
        access.bucket(self.bucket_for(requester)).intersects(requested)
    }

    /// Like [`authorize`](Self::authorize), but every bit in `requested` must
    /// be granted on its own. An empty request is denied.
    pub fn authorize_all(
        &self,
        requested: AccessMask,
        access: Access,
        requester: Requester,
    ) -> bool {
        !requested.is_empty()
            && requested
                .iter()
                .all(|bit| self.authorize(bit, access, requester))
    }
}
