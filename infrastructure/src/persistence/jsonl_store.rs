//! JSONL file writer for finished replies.
//!
//! Each saved exchange becomes two JSON lines (`user` then `assistant`) with
//! the conversation id and an RFC 3339 timestamp. The file is opened in
//! append mode so transcripts accumulate across runs.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use streamchat_application::TranscriptStore;
use streamchat_domain::{ConversationId, Role};
use tracing::warn;

/// JSONL transcript store that writes one JSON object per message.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes after every exchange
/// and on `Drop`.
pub struct JsonlTranscriptStore {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlTranscriptStore {
    /// Open (or create) the transcript file at the given path.
    ///
    /// Creates parent directories as needed. Returns `None` if the file
    /// cannot be opened; persistence is then simply disabled.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create transcript directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open transcript file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn record(conversation_id: &ConversationId, role: Role, content: &str, timestamp: &str) -> String {
        serde_json::json!({
            "conversation_id": conversation_id.as_str(),
            "role": role.as_str(),
            "content": content,
            "timestamp": timestamp,
        })
        .to_string()
    }
}

impl TranscriptStore for JsonlTranscriptStore {
    fn save_reply(&self, conversation_id: &ConversationId, prompt: &str, reply: &str) {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        let lines = [
            Self::record(conversation_id, Role::User, prompt, &timestamp),
            Self::record(conversation_id, Role::Assistant, reply, &timestamp),
        ];

        let Ok(mut writer) = self.writer.lock() else {
            return;
        };
        for line in &lines {
            if let Err(e) = writeln!(writer, "{}", line) {
                warn!("Could not write transcript {}: {}", self.path.display(), e);
                return;
            }
        }
        let _ = writer.flush();
    }
}

impl Drop for JsonlTranscriptStore {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_lines(path: &Path) -> Vec<serde_json::Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_save_reply_writes_user_and_assistant_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcripts.jsonl");
        let store = JsonlTranscriptStore::new(&path).unwrap();
        let id = ConversationId::try_new("c1").unwrap();

        store.save_reply(&id, "Hi", "Hello");
        drop(store);

        let records = read_lines(&path);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["role"], "user");
        assert_eq!(records[0]["content"], "Hi");
        assert_eq!(records[1]["role"], "assistant");
        assert_eq!(records[1]["content"], "Hello");
        assert_eq!(records[1]["conversation_id"], "c1");
        assert!(records[1]["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn test_store_appends_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("transcripts.jsonl");
        let id = ConversationId::try_new("c1").unwrap();

        JsonlTranscriptStore::new(&path)
            .unwrap()
            .save_reply(&id, "one", "1");
        JsonlTranscriptStore::new(&path)
            .unwrap()
            .save_reply(&id, "two", "2");

        let records = read_lines(&path);
        assert_eq!(records.len(), 4);
        assert_eq!(records[2]["content"], "two");
    }

    #[test]
    fn test_multiline_reply_stays_on_one_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.jsonl");
        let store = JsonlTranscriptStore::new(&path).unwrap();
        let id = ConversationId::try_new("c").unwrap();

        store.save_reply(&id, "poem", "line one\nline two");
        drop(store);

        let records = read_lines(&path);
        assert_eq!(records[1]["content"], "line one\nline two");
    }
}
