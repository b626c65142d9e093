//! Rendered EDL documents.

use crate::builder::ClipRecord;
use crate::error::EdlResult;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;
use tracing::info;

/// A titled list of clip events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditDecisionList {
    pub title: String,
    pub records: Vec<ClipRecord>,
}

impl EditDecisionList {
    pub fn new(title: impl Into<String>, records: Vec<ClipRecord>) -> Self {
        Self {
            title: title.into(),
            records,
        }
    }

    /// CMX-3600-style text.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "TITLE:  {}\nFCM: NON-DROP FRAME\n", self.title);
        for record in &self.records {
            let _ = writeln!(
                out,
                "{:03}        AX AA/V C        {} {} {} {}\n* FROM CLIP NAME:  {}\n",
                record.sequence,
                record.source_in,
                record.source_out,
                record.record_in,
                record.record_out,
                record.clip_name,
            );
        }
        out
    }

    pub fn to_json(&self) -> EdlResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the rendered text to `path`.
    pub fn write_to(&self, path: &Path) -> EdlResult<()> {
        std::fs::write(path, self.render())?;
        info!(path = %path.display(), clips = self.records.len(), "Wrote EDL");
        Ok(())
    }

    /// Write the JSON form to `path`.
    pub fn write_json_to(&self, path: &Path) -> EdlResult<()> {
        std::fs::write(path, self.to_json()?)?;
        info!(path = %path.display(), "Wrote EDL JSON");
        Ok(())
    }
}
