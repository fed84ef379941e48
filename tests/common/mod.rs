//! In-memory mock `User`/`Mailbox` backend, test-only scaffolding per
//! SPEC_FULL.md §10.4 — explicitly not the "in-memory sample mailbox
//! store" product feature excluded by spec §1.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use imap_core::backend::{
    FlagOp, Mailbox, MailboxInfo, MailboxStatus, MessageData, StatusItem, User,
};
use imap_core::error::MailboxError;
use imap_core::ext::{ExtensionOption, ExtensionResult};
use imap_core::seq::SequenceSet;

#[derive(Debug, Clone)]
pub struct StoredMessage {
    pub uid: u32,
    pub modseq: u64,
    pub flags: Vec<String>,
}

pub struct MockMailbox {
    pub name: String,
    pub messages: Mutex<Vec<StoredMessage>>,
    pub uid_validity: u32,
    pub next_uid: Mutex<u32>,
    pub next_modseq: Mutex<u64>,
    pub subscribed: Mutex<bool>,
    /// UIDs expunged by a previous `expunge()` call, reported as
    /// `QresyncVanished { earlier: true }` the next time a QRESYNC-aware
    /// FETCH asks for them.
    pub vanished_uids: Mutex<Vec<u32>>,
}

impl MockMailbox {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            messages: Mutex::new(Vec::new()),
            uid_validity: 1,
            next_uid: Mutex::new(1),
            next_modseq: Mutex::new(1),
            subscribed: Mutex::new(false),
            vanished_uids: Mutex::new(Vec::new()),
        }
    }

    fn bump_modseq(&self) -> u64 {
        let mut m = self.next_modseq.lock().unwrap();
        *m += 1;
        *m
    }

    fn seq_of_uid(messages: &[StoredMessage], uid: u32) -> Option<u32> {
        messages.iter().position(|m| m.uid == uid).map(|i| i as u32 + 1)
    }
}

#[async_trait]
impl Mailbox for MockMailbox {
    fn name(&self) -> &str {
        &self.name
    }

    async fn info(&self, _opts: &[ExtensionOption]) -> Result<(MailboxInfo, Vec<ExtensionResult>), MailboxError> {
        Ok((
            MailboxInfo {
                name: self.name.clone(),
                delimiter: '.',
                no_select: false,
                attributes: Vec::new(),
            },
            Vec::new(),
        ))
    }

    async fn status(
        &self,
        items: &[StatusItem],
        _opts: &[ExtensionOption],
    ) -> Result<(MailboxStatus, Vec<ExtensionResult>), MailboxError> {
        let messages = self.messages.lock().unwrap();
        let highest_modseq = messages.iter().map(|m| m.modseq).max().unwrap_or(0);
        let status = MailboxStatus {
            flags: vec!["\\Seen".into(), "\\Deleted".into(), "\\Flagged".into()],
            permanent_flags: vec!["\\Seen".into(), "\\Deleted".into(), "\\*".into()],
            unseen_seq_num: messages
                .iter()
                .position(|m| !m.flags.iter().any(|f| f == "\\Seen"))
                .map(|i| i as u32 + 1)
                .unwrap_or(0),
            messages: messages.len() as u32,
            recent: 0,
            uid_next: *self.next_uid.lock().unwrap(),
            uid_validity: self.uid_validity,
            highest_modseq,
            read_only: false,
            items: items.iter().copied().collect::<HashSet<_>>(),
        };
        Ok((status, Vec::new()))
    }

    async fn set_subscribed(&self, subscribed: bool) -> Result<(), MailboxError> {
        *self.subscribed.lock().unwrap() = subscribed;
        Ok(())
    }

    async fn check(&self) -> Result<(), MailboxError> {
        Ok(())
    }

    async fn select(&self, _opts: &[ExtensionOption]) -> Result<Vec<ExtensionResult>, MailboxError> {
        Ok(Vec::new())
    }

    async fn deselect(&self) -> Result<(), MailboxError> {
        Ok(())
    }

    async fn list_messages(
        &self,
        uid: bool,
        set: Option<&SequenceSet>,
        items: &[String],
        opts: &[ExtensionOption],
    ) -> Result<(Vec<MessageData>, Vec<ExtensionResult>), MailboxError> {
        let messages = self.messages.lock().unwrap();
        let wants_body = items.iter().any(|i| i != "FLAGS" && i != "UID" && i != "MODSEQ");
        let mut out = Vec::new();
        for (idx, m) in messages.iter().enumerate() {
            let seq = idx as u32 + 1;
            let matches = match set {
                None => true,
                Some(s) => s.contains(if uid { m.uid } else { seq }),
            };
            if !matches {
                continue;
            }
            out.push(MessageData {
                seq,
                uid: m.uid,
                modseq: m.modseq,
                flags: m.flags.clone(),
                body_summary: if wants_body { Some("stub".to_string()) } else { None },
            });
        }
        drop(messages);

        let wants_vanished = opts
            .iter()
            .any(|o| matches!(o, ExtensionOption::QresyncFetch { enable_vanished: true }));
        let mut results = Vec::new();
        if wants_vanished {
            let earlier = self.vanished_uids.lock().unwrap().clone();
            if !earlier.is_empty() {
                results.push(ExtensionResult::QresyncVanished {
                    set: SequenceSet::from_ranges(
                        earlier.iter().map(|u| imap_core::seq::SeqRange::single(*u)).collect(),
                    ),
                    earlier: true,
                });
            }
        }
        Ok((out, results))
    }

    async fn search_messages(
        &self,
        _uid: bool,
        deleted_only: bool,
        _opts: &[ExtensionOption],
    ) -> Result<(Vec<u32>, Vec<ExtensionResult>), MailboxError> {
        let messages = self.messages.lock().unwrap();
        let ids = messages
            .iter()
            .enumerate()
            .filter(|(_, m)| !deleted_only || m.flags.iter().any(|f| f == "\\Deleted"))
            .map(|(i, _)| i as u32 + 1)
            .collect();
        Ok((ids, Vec::new()))
    }

    async fn create_message(
        &self,
        flags: &[String],
        _date: Option<chrono::DateTime<chrono::Utc>>,
        literal: &mut (dyn std::io::Read + Send),
        _opts: &[ExtensionOption],
    ) -> Result<Vec<ExtensionResult>, MailboxError> {
        let mut buf = Vec::new();
        std::io::Read::read_to_end(literal, &mut buf).map_err(|e| MailboxError::Backend(e.into()))?;

        let mut next_uid = self.next_uid.lock().unwrap();
        let uid = *next_uid;
        *next_uid += 1;
        drop(next_uid);

        let modseq = self.bump_modseq();
        self.messages.lock().unwrap().push(StoredMessage {
            uid,
            modseq,
            flags: flags.to_vec(),
        });

        Ok(vec![ExtensionResult::AppendUid {
            uid_validity: self.uid_validity,
            uid,
        }])
    }

    async fn update_messages_flags(
        &self,
        uid: bool,
        set: &SequenceSet,
        op: FlagOp,
        flags: &[String],
        _opts: &[ExtensionOption],
    ) -> Result<Vec<ExtensionResult>, MailboxError> {
        let modseq = self.bump_modseq();
        let mut messages = self.messages.lock().unwrap();
        for (idx, m) in messages.iter_mut().enumerate() {
            let seq = idx as u32 + 1;
            if !set.contains(if uid { m.uid } else { seq }) {
                continue;
            }
            match op {
                FlagOp::Add => {
                    for f in flags {
                        if !m.flags.contains(f) {
                            m.flags.push(f.clone());
                        }
                    }
                }
                FlagOp::Remove => m.flags.retain(|f| !flags.contains(f)),
                FlagOp::Replace => m.flags = flags.to_vec(),
            }
            m.modseq = modseq;
        }
        Ok(Vec::new())
    }

    async fn copy_messages(
        &self,
        uid: bool,
        set: &SequenceSet,
        dest: &dyn Mailbox,
        _opts: &[ExtensionOption],
    ) -> Result<Vec<ExtensionResult>, MailboxError> {
        let src_messages: Vec<StoredMessage> = {
            let messages = self.messages.lock().unwrap();
            messages
                .iter()
                .enumerate()
                .filter(|(i, m)| set.contains(if uid { m.uid } else { *i as u32 + 1 }))
                .map(|(_, m)| m.clone())
                .collect()
        };

        let mut dst_uids = Vec::new();
        for m in &src_messages {
            let mut cursor = std::io::Cursor::new(Vec::<u8>::new());
            let results = dest.create_message(&m.flags, None, &mut cursor, &[]).await?;
            if let Some((_, new_uid)) = imap_core::ext::append_uid(&results) {
                dst_uids.push(new_uid);
            }
        }

        let src_uids: Vec<u32> = src_messages.iter().map(|m| m.uid).collect();
        Ok(vec![ExtensionResult::CopyUids {
            uid_validity: self.uid_validity,
            src_set: SequenceSet::from_ranges(
                src_uids
                    .iter()
                    .map(|u| imap_core::seq::SeqRange::single(*u))
                    .collect(),
            ),
            dst_set: SequenceSet::from_ranges(
                dst_uids
                    .iter()
                    .map(|u| imap_core::seq::SeqRange::single(*u))
                    .collect(),
            ),
        }])
    }

    async fn expunge(&self, opts: &[ExtensionOption]) -> Result<Vec<ExtensionResult>, MailboxError> {
        let restrict_uids: Option<SequenceSet> = opts.iter().find_map(|o| match o {
            ExtensionOption::ExpungeSeqSet { set } => Some(set.clone()),
            _ => None,
        });

        let mut messages = self.messages.lock().unwrap();
        let mut removed_seqs = Vec::new();
        let mut removed_uids = Vec::new();
        let mut kept = Vec::new();
        for (idx, m) in messages.iter().enumerate() {
            let seq = idx as u32 + 1;
            let deleted = m.flags.iter().any(|f| f == "\\Deleted");
            let in_scope = restrict_uids.as_ref().map(|s| s.contains(m.uid)).unwrap_or(true);
            if deleted && in_scope {
                removed_seqs.push(seq);
                removed_uids.push(m.uid);
            } else {
                kept.push(m.clone());
            }
        }
        *messages = kept;
        drop(messages);
        removed_seqs.sort_unstable_by(|a, b| b.cmp(a));

        self.vanished_uids.lock().unwrap().extend(removed_uids.iter().copied());

        let mut results = vec![ExtensionResult::ExpungedSeqNums(removed_seqs)];
        if !removed_uids.is_empty() {
            results.push(ExtensionResult::QresyncVanished {
                set: SequenceSet::from_ranges(removed_uids.iter().map(|u| imap_core::seq::SeqRange::single(*u)).collect()),
                earlier: false,
            });
        }
        Ok(results)
    }

    fn broadcasts_updates(&self) -> bool {
        false
    }
}

pub struct MockUser {
    pub mailboxes: Mutex<std::collections::HashMap<String, std::sync::Arc<MockMailbox>>>,
    pub uidplus: bool,
}

impl MockUser {
    pub fn new() -> std::sync::Arc<Self> {
        let mut map = std::collections::HashMap::new();
        map.insert("INBOX".to_string(), std::sync::Arc::new(MockMailbox::new("INBOX")));
        std::sync::Arc::new(Self {
            mailboxes: Mutex::new(map),
            uidplus: true,
        })
    }
}

#[async_trait]
impl User for MockUser {
    async fn get_mailbox(&self, name: &str) -> Result<std::sync::Arc<dyn Mailbox>, MailboxError> {
        self.mailboxes
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .map(|mb| mb as std::sync::Arc<dyn Mailbox>)
            .ok_or(MailboxError::NoSuchMailbox)
    }

    async fn list_mailboxes(&self, _subscribed: bool) -> Result<Vec<MailboxInfo>, MailboxError> {
        Ok(self
            .mailboxes
            .lock()
            .unwrap()
            .values()
            .map(|mb| MailboxInfo {
                name: mb.name.clone(),
                delimiter: '.',
                no_select: false,
                attributes: Vec::new(),
            })
            .collect())
    }

    async fn create(&self, name: &str) -> Result<(), MailboxError> {
        self.mailboxes
            .lock()
            .unwrap()
            .insert(name.to_string(), std::sync::Arc::new(MockMailbox::new(name)));
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), MailboxError> {
        self.mailboxes
            .lock()
            .unwrap()
            .remove(name)
            .map(|_| ())
            .ok_or(MailboxError::NoSuchMailbox)
    }

    async fn rename(&self, from: &str, to: &str) -> Result<(), MailboxError> {
        let mut map = self.mailboxes.lock().unwrap();
        let mb = map.remove(from).ok_or(MailboxError::NoSuchMailbox)?;
        map.insert(to.to_string(), mb);
        Ok(())
    }

    async fn unselect(&self) -> Result<(), MailboxError> {
        Ok(())
    }

    fn has_uidplus(&self) -> bool {
        self.uidplus
    }

    fn is_enable_qresync(&self) -> bool {
        true
    }
}
