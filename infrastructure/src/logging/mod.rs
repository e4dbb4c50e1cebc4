//! Logging infrastructure: the conversation transcript.
//!
//! Provides [`JsonlTranscriptSink`], a JSONL file writer that implements
//! the [`TranscriptSink`](roundtable_application::TranscriptSink) port.

mod jsonl_transcript;

pub use jsonl_transcript::{JsonlTranscriptSink, transcript_file_name};
