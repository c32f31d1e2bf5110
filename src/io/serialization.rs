// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation record serialization and deserialization.
//!
//! This module handles writing the run's annotation records to disk as a
//! JSON array and reading them back, plus a YAML export for the manual
//! export menu.

use crate::models::annotation::AnnotationRecord;
use anyhow::Result;
use serde::Serialize;
use std::path::Path;

/// Fixed output file, relative to the process working directory. Fully
/// rewritten at the end of every run.
pub const ANNOTATIONS_FILE: &str = "annotations.json";

/// Export annotation records to JSON format.
///
/// The file is a JSON array pretty-printed with 4-space indentation and a
/// trailing newline, overwriting anything previously at `path`.
pub fn export_json(records: &[AnnotationRecord], path: &Path) -> Result<()> {
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    records.serialize(&mut serializer)?;
    buf.push(b'\n');
    std::fs::write(path, buf)?;
    Ok(())
}

/// Export annotation records to YAML format.
pub fn export_yaml(records: &[AnnotationRecord], path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(records)?;
    std::fs::write(path, yaml)?;
    Ok(())
}

/// Import annotation records from JSON format.
pub fn import_json(path: &Path) -> Result<Vec<AnnotationRecord>> {
    let json = std::fs::read_to_string(path)?;
    let records = serde_json::from_str(&json)?;
    Ok(records)
}
