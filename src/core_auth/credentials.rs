use log::info;

use crate::constants::{NOBODY_GID, NOBODY_UID};
use crate::core_auth::error::CredentialError;
use crate::core_auth::sha256aes;

/// One account, parsed from either the short `user:secret` form or the
/// Unix-style `user:secret:uid:gid:comment:home:shell` form. The short
/// form implies the unprivileged identity with home at the root.
#[derive(Debug, Clone)]
pub struct CredentialRecord {
    pub username: String,
    pub secret: String,
    pub uid: u32,
    pub gid: u32,
    pub comment: String,
    pub home_dir: String,
    pub shell: String,
}

impl CredentialRecord {
    pub fn parse(line: &str) -> Result<Self, CredentialError> {
        let fields: Vec<&str> = line.split(':').collect();
        match fields.len() {
            2 => Ok(Self {
                username: fields[0].to_string(),
                secret: fields[1].to_string(),
                uid: NOBODY_UID,
                gid: NOBODY_GID,
                comment: String::new(),
                home_dir: String::from("/"),
                shell: String::new(),
            }),
            7 => {
                let uid = fields[2]
                    .parse()
                    .map_err(|_| CredentialError::MalformedRecord(line.to_string()))?;
                let gid = fields[3]
                    .parse()
                    .map_err(|_| CredentialError::MalformedRecord(line.to_string()))?;
                Ok(Self {
                    username: fields[0].to_string(),
                    secret: fields[1].to_string(),
                    uid,
                    gid,
                    comment: fields[4].to_string(),
                    home_dir: fields[5].to_string(),
                    shell: fields[6].to_string(),
                })
            }
            _ => Err(CredentialError::MalformedRecord(line.to_string())),
        }
    }

    /// Checks a cleartext password against this record. Secrets starting
    /// with `$` are salted-hash entries, anything else compares directly.
    pub fn verify(&self, cleartext: &str) -> bool {
        if self.secret.starts_with('$') {
            sha256aes::verify_passwd_entry(&self.secret, cleartext)
        } else {
            self.secret == cleartext
        }
    }
}

/// The in-memory account list, loaded once before the listener starts and
/// immutable afterwards.
#[derive(Debug, Default)]
pub struct CredentialStore {
    records: Vec<CredentialRecord>,
}

impl CredentialStore {
    pub fn load(lines: &[String]) -> Result<Self, CredentialError> {
        let mut records = Vec::with_capacity(lines.len());
        for line in lines {
            records.push(CredentialRecord::parse(line)?);
        }
        info!("Loaded {} credential record(s)", records.len());
        Ok(Self { records })
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First record matching the username wins.
    pub fn lookup(&self, username: &str) -> Option<&CredentialRecord> {
        self.records.iter().find(|r| r.username == username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_field_record_implies_unprivileged_identity() {
        let record = CredentialRecord::parse("felicia:friday").unwrap();
        assert_eq!(record.username, "felicia");
        assert_eq!(record.secret, "friday");
        assert_eq!(record.uid, NOBODY_UID);
        assert_eq!(record.gid, NOBODY_GID);
        assert_eq!(record.home_dir, "/");
    }

    #[test]
    fn seven_field_record_parses_identity_fields() {
        let record =
            CredentialRecord::parse("bob:secret:1000:1000:Bob:/home/bob:/bin/false").unwrap();
        assert_eq!(record.uid, 1000);
        assert_eq!(record.gid, 1000);
        assert_eq!(record.home_dir, "/home/bob");
        assert_eq!(record.comment, "Bob");
    }

    #[test]
    fn malformed_records_are_rejected() {
        assert!(CredentialRecord::parse("justausername").is_err());
        assert!(CredentialRecord::parse("a:b:c").is_err());
        assert!(CredentialRecord::parse("a:b:notanumber:1:x:/:/bin/sh").is_err());
    }

    #[test]
    fn cleartext_and_hashed_secrets_both_verify() {
        let cleartext = CredentialRecord::parse("a:friday").unwrap();
        assert!(cleartext.verify("friday"));
        assert!(!cleartext.verify("thursday"));

        let entry = sha256aes::create_passwd_entry("friday").unwrap();
        let hashed = CredentialRecord::parse(&format!("b:{}", entry)).unwrap();
        assert!(hashed.verify("friday"));
        assert!(!hashed.verify("thursday"));
    }

    #[test]
    fn first_matching_record_wins() {
        let store = CredentialStore::load(&[
            String::from("dup:first"),
            String::from("dup:second"),
        ])
        .unwrap();
        let record = store.lookup("dup").unwrap();
        assert_eq!(record.secret, "first");
    }

    #[test]
    fn lookup_of_unknown_user_is_none() {
        let store = CredentialStore::load(&[String::from("felicia:friday")]).unwrap();
        assert!(store.lookup("mallory").is_none());
        assert!(!store.is_empty());
        assert!(CredentialStore::load(&[]).unwrap().is_empty());
    }
}
