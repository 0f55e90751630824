//! JSON Lines output, one object per entity, stamped with the run id.

use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use uuid::Uuid;

#[derive(Serialize)]
struct Line<'a, T: Serialize> {
    run_id: Uuid,
    #[serde(flatten)]
    record: &'a T,
}

pub(crate) struct JsonLinesSink<W: Write> {
    writer: W,
    run_id: Uuid,
}

impl JsonLinesSink<Box<dyn Write>> {
    /// Appends to `output` (created if missing), or writes to stdout.
    pub(crate) fn open(output: Option<&Path>, run_id: Uuid) -> anyhow::Result<Self> {
        let writer: Box<dyn Write> = match output {
            Some(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("failed to open output file {}", path.display()))?;
                Box::new(BufWriter::new(file))
            }
            None => Box::new(BufWriter::new(io::stdout())),
        };
        Ok(Self::new(writer, run_id))
    }
}

impl<W: Write> JsonLinesSink<W> {
    pub(crate) fn new(writer: W, run_id: Uuid) -> Self {
        Self { writer, run_id }
    }

    pub(crate) fn write<T: Serialize>(&mut self, record: &T) -> anyhow::Result<()> {
        let line = Line {
            run_id: self.run_id,
            record,
        };
        serde_json::to_writer(&mut self.writer, &line).context("failed to serialize record")?;
        self.writer
            .write_all(b"\n")
            .context("failed to write record")?;
        Ok(())
    }

    /// Flushes buffered lines and hands back the writer.
    pub(crate) fn finish(mut self) -> anyhow::Result<W> {
        self.writer.flush().context("failed to flush output")?;
        Ok(self.writer)
    }
}

#[cfg(test)]
mod tests {
    use locus_core::{Resolution, UnresolvedReason};

    use super::*;

    #[test]
    fn each_record_is_one_line_with_run_id() {
        let run_id = Uuid::new_v4();
        let mut sink = JsonLinesSink::new(Vec::new(), run_id);
        for entity_id in [1, 2] {
            sink.write(&Resolution::Unresolved {
                entity_id,
                reason: UnresolvedReason::NoSearchResults,
            })
            .unwrap();
        }
        let bytes = sink.finish().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["run_id"], run_id.to_string());
        assert_eq!(first["outcome"], "unresolved");
        assert_eq!(first["entity_id"], 1);
        assert_eq!(first["reason"], "no_search_results");
    }

    #[test]
    fn file_output_appends_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jsonl");

        for _ in 0..2 {
            let mut sink = JsonLinesSink::open(Some(&path), Uuid::new_v4()).unwrap();
            sink.write(&serde_json::json!({"entity_id": 3})).unwrap();
            sink.finish().unwrap();
        }

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
    }
}
