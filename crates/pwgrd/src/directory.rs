//! Identity directory backends.
//!
//! The daemons never parse `/etc/passwd` or `/etc/group` themselves. They ask
//! an [`IdentityDirectory`], which in production is the C library's NSS
//! stack reached through `nix`.

use std::collections::HashMap;

use nix::errno::Errno;
use nix::unistd::{Group, Uid, User};
use thiserror::Error;

/// A user entry as far as the daemons care about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    uid: u32,
    name: String,
}

impl UserRecord {
    /// Builds a record.
    #[must_use]
    pub fn new(uid: u32, name: impl Into<String>) -> Self {
        Self {
            uid,
            name: name.into(),
        }
    }

    /// Numeric user id.
    #[must_use]
    pub const fn uid(&self) -> u32 {
        self.uid
    }

    /// Login name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Consumes the record, returning the login name.
    #[must_use]
    pub fn into_name(self) -> String {
        self.name
    }
}

/// A group entry with its supplementary member list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRecord {
    name: String,
    members: Vec<String>,
}

impl GroupRecord {
    /// Builds a record.
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    /// Group name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Listed members.
    #[must_use]
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Exact, case-sensitive byte comparison against every listed member.
    ///
    /// Users whose primary group this is are not listed and do not match.
    #[must_use]
    pub fn has_member(&self, username: &[u8]) -> bool {
        self.members
            .iter()
            .any(|member| member.as_bytes() == username)
    }
}

/// Failures reported by a directory backend.
///
/// A record that does not exist is not an error; lookups return `Ok(None)`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The passwd lookup failed.
    #[error("passwd lookup for uid {uid} failed: {source}")]
    User {
        /// Requested uid.
        uid: u32,
        /// Error reported by the C library.
        #[source]
        source: Errno,
    },
    /// The group lookup failed.
    #[error("group lookup for '{name}' failed: {source}")]
    Group {
        /// Requested group name.
        name: String,
        /// Error reported by the C library.
        #[source]
        source: Errno,
    },
}

/// Read-only view of the host's users and groups.
#[cfg_attr(test, mockall::automock)]
pub trait IdentityDirectory {
    /// Resolves a uid to its user entry.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::User`] when the backend fails.
    fn user_by_uid(&self, uid: u32) -> Result<Option<UserRecord>, LookupError>;

    /// Resolves a group name to its entry.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Group`] when the backend fails.
    fn group_by_name(&self, name: &str) -> Result<Option<GroupRecord>, LookupError>;
}

/// Directory backed by `getpwuid_r` and `getgrnam_r`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemDirectory;

impl IdentityDirectory for SystemDirectory {
    fn user_by_uid(&self, uid: u32) -> Result<Option<UserRecord>, LookupError> {
        User::from_uid(Uid::from_raw(uid))
            .map(|user| user.map(|found| UserRecord::new(found.uid.as_raw(), found.name)))
            .map_err(|source| LookupError::User { uid, source })
    }

    fn group_by_name(&self, name: &str) -> Result<Option<GroupRecord>, LookupError> {
        Group::from_name(name)
            .map(|group| group.map(|found| GroupRecord::new(found.name, found.mem)))
            .map_err(|source| LookupError::Group {
                name: name.to_owned(),
                source,
            })
    }
}

/// Fixed in-memory directory for embedding and tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryDirectory {
    users: HashMap<u32, UserRecord>,
    groups: HashMap<String, GroupRecord>,
}

impl MemoryDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a user.
    #[must_use]
    pub fn with_user(mut self, uid: u32, name: impl Into<String>) -> Self {
        self.users.insert(uid, UserRecord::new(uid, name));
        self
    }

    /// Adds (or replaces) a group with its members.
    #[must_use]
    pub fn with_group<I, S>(mut self, name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let record = GroupRecord::new(name, members);
        self.groups.insert(record.name.clone(), record);
        self
    }
}

impl IdentityDirectory for MemoryDirectory {
    fn user_by_uid(&self, uid: u32) -> Result<Option<UserRecord>, LookupError> {
        Ok(self.users.get(&uid).cloned())
    }

    fn group_by_name(&self, name: &str) -> Result<Option<GroupRecord>, LookupError> {
        Ok(self.groups.get(name).cloned())
    }
}

impl<D: IdentityDirectory + ?Sized> IdentityDirectory for &D {
    fn user_by_uid(&self, uid: u32) -> Result<Option<UserRecord>, LookupError> {
        (**self).user_by_uid(uid)
    }

    fn group_by_name(&self, name: &str) -> Result<Option<GroupRecord>, LookupError> {
        (**self).group_by_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(b"alice", true)]
    #[case(b"bob", true)]
    #[case(b"Alice", false)]
    #[case(b"alic", false)]
    #[case(b"alice ", false)]
    #[case(b"", false)]
    #[case(b"\xffalice", false)]
    fn membership_is_exact_byte_comparison(#[case] username: &[u8], #[case] expected: bool) {
        let staff = GroupRecord::new("staff", ["alice", "bob"]);
        assert_eq!(staff.has_member(username), expected);
    }

    #[test]
    fn lossily_decoded_member_does_not_match_raw_bytes() {
        let decoded = String::from_utf8_lossy(b"\xffalice").into_owned();
        let staff = GroupRecord::new("staff", [decoded]);
        assert!(!staff.has_member(b"\xffalice"));
        assert!(staff.has_member("\u{fffd}alice".as_bytes()));
    }

    #[test]
    fn memory_directory_answers_configured_entries() {
        let directory = MemoryDirectory::new()
            .with_user(0, "root")
            .with_group("staff", ["alice"]);

        assert_eq!(
            directory.user_by_uid(0),
            Ok(Some(UserRecord::new(0, "root")))
        );
        assert_eq!(directory.user_by_uid(1), Ok(None));
        assert_eq!(
            directory
                .group_by_name("staff")
                .map(|group| group.map(|found| found.members().to_vec())),
            Ok(Some(vec!["alice".to_owned()]))
        );
        assert_eq!(directory.group_by_name("wheel"), Ok(None));
    }

    #[test]
    fn system_directory_resolves_current_user() {
        let uid = nix::unistd::getuid();
        let expected = User::from_uid(uid)
            .expect("passwd lookup")
            .map(|user| user.name);

        let found = SystemDirectory
            .user_by_uid(uid.as_raw())
            .expect("lookup succeeds")
            .map(UserRecord::into_name);

        assert_eq!(found, expected);
    }

    #[test]
    fn system_directory_reports_absent_group() {
        let found = SystemDirectory
            .group_by_name("pwgr-no-such-group-7f3a")
            .expect("lookup succeeds");
        assert_eq!(found, None);
    }
}
