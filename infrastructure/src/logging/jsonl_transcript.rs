//! JSONL file writer for the conversation transcript.
//!
//! Every appended message and every vote becomes one JSON line with a
//! `type` field, a `timestamp` and the run id, appended to the file via a
//! buffered writer.

use chrono::{DateTime, Local};
use roundtable_application::ports::transcript::TranscriptSink;
use roundtable_domain::{Message, Role, TokenUsage, Vote};
use serde_json::{Value, json};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;
use uuid::Uuid;

/// File name for a run's transcript:
/// `<YYYY-MM-DD-HH-MM>_conversation_log_<first 8 chars of the run id>.jsonl`
pub fn transcript_file_name(started_at: DateTime<Local>, run_id: &Uuid) -> String {
    let id = run_id.simple().to_string();
    format!(
        "{}_conversation_log_{}.jsonl",
        started_at.format("%Y-%m-%d-%H-%M"),
        &id[..8]
    )
}

/// JSONL transcript sink that writes one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes after every record
/// and on `Drop`.
pub struct JsonlTranscriptSink {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
    run_id: String,
}

impl JsonlTranscriptSink {
    /// Create a transcript under a fresh random run id.
    pub fn start_run(directory: impl AsRef<Path>) -> Option<Self> {
        Self::create_in(directory, &Uuid::new_v4())
    }

    /// Create a transcript for a new run inside `directory`.
    pub fn create_in(directory: impl AsRef<Path>, run_id: &Uuid) -> Option<Self> {
        let path = directory
            .as_ref()
            .join(transcript_file_name(Local::now(), run_id));
        Self::new(path, run_id.to_string())
    }

    /// Create a new sink writing to the given path.
    ///
    /// Creates the file (and parent directories) if they don't exist.
    /// Returns `None` if the file cannot be created.
    pub fn new(path: impl AsRef<Path>, run_id: impl Into<String>) -> Option<Self> {
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

        let file = match File::create(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not create transcript file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
            run_id: run_id.into(),
        })
    }

    /// Get the path to the transcript file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_record(&self, event_type: &str, mut payload: Value) {
        if let Value::Object(map) = &mut payload {
            map.insert("type".to_string(), Value::String(event_type.to_string()));
            map.insert(
                "timestamp".to_string(),
                Value::String(
                    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
                ),
            );
            map.insert("run_id".to_string(), Value::String(self.run_id.clone()));
        }

        let line = match serde_json::to_string(&payload) {
            Ok(line) => line,
            Err(e) => {
                warn!("Could not serialize transcript record: {}", e);
                return;
            }
        };

        match self.writer.lock() {
            Ok(mut writer) => {
                if let Err(e) = writeln!(writer, "{}", line).and_then(|_| writer.flush()) {
                    warn!("Could not write transcript {}: {}", self.path.display(), e);
                }
            }
            Err(_) => warn!("Transcript writer lock poisoned"),
        }
    }
}

fn role_kind(role: &Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Agent(_) => "agent",
        Role::Human => "human",
    }
}

impl TranscriptSink for JsonlTranscriptSink {
    fn record(&self, message: &Message, usage: Option<TokenUsage>) {
        let usage = usage.unwrap_or_default();
        self.write_record(
            "message",
            json!({
                "speaker": message.speaker(),
                "role": role_kind(&message.role),
                "cycle": message.cycle,
                "sequence": message.sequence,
                "content": message.content,
                "input_tokens": usage.input_tokens,
                "output_tokens": usage.output_tokens,
            }),
        );
    }

    fn record_vote(&self, round: usize, phase: u32, vote: &Vote) {
        self.write_record(
            "vote",
            json!({
                "round": round,
                "cycle": phase,
                "speaker": vote.agent.as_str(),
                "decision": vote.decision.as_str(),
                "justification": vote.justification,
            }),
        );
    }
}

impl Drop for JsonlTranscriptSink {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_file_name_format() {
        let started = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap();
        let id = Uuid::parse_str("a1b2c3d4-0000-4000-8000-000000000000").unwrap();
        assert_eq!(
            transcript_file_name(started, &id),
            "2024-03-09-14-05_conversation_log_a1b2c3d4.jsonl"
        );
    }

    #[test]
    fn test_writes_messages_and_votes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.jsonl");
        let sink = JsonlTranscriptSink::new(&path, "run-1").unwrap();

        sink.record(&Message::user("What is 6 x 7?", 0, 0), None);
        sink.record(
            &Message::agent("agent1", "42", 0, 1),
            Some(TokenUsage::new(120, 3)),
        );
        sink.record_vote(1, 1, &Vote::approve("agent2", "Correct."));
        drop(sink);

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 3);
        for line in &lines {
            assert!(line.get("timestamp").is_some());
            assert_eq!(line["run_id"], "run-1");
        }

        assert_eq!(lines[0]["type"], "message");
        assert_eq!(lines[0]["speaker"], "User");
        assert_eq!(lines[0]["role"], "user");
        assert_eq!(lines[1]["speaker"], "agent1");
        assert_eq!(lines[1]["sequence"], 1);
        assert_eq!(lines[1]["content"], "42");
        assert_eq!(lines[1]["input_tokens"], 120);
        assert_eq!(lines[1]["output_tokens"], 3);
        assert_eq!(lines[0]["input_tokens"], 0);
        assert_eq!(lines[0]["output_tokens"], 0);

        assert_eq!(lines[2]["type"], "vote");
        assert_eq!(lines[2]["decision"], "APPROVE");
        assert_eq!(lines[2]["round"], 1);
    }

    #[test]
    fn test_create_in_makes_directory() {
        let dir = tempfile::tempdir().unwrap();
        let logs = dir.path().join("conversation_logs");
        let id = Uuid::new_v4();
        let sink = JsonlTranscriptSink::create_in(&logs, &id).unwrap();

        assert!(logs.is_dir());
        let name = sink.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.ends_with(&format!("_conversation_log_{}.jsonl", &id.simple().to_string()[..8])));
    }
}
