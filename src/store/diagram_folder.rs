// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowpane-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowpane and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use log::debug;

use super::{DiagramStore, DiagramSummary, StoreError};
use crate::model::{DiagramId, DiagramState};

const DIAGRAM_SUFFIX: &str = ".flow.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteDurability {
    /// Fast, best-effort persistence.
    ///
    /// - Writes a temp file and renames atomically into place.
    /// - Does not perform per-file fsync/sync.
    #[default]
    BestEffort,

    /// Slower, best-effort durability.
    ///
    /// Flushes file contents and the rename to stable storage where the platform allows.
    Durable,
}

/// One JSON file per diagram under a root directory: `<root>/<id>.flow.json`.
#[derive(Debug, Clone)]
pub struct DiagramFolder {
    root: PathBuf,
    durability: WriteDurability,
}

impl DiagramFolder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            durability: WriteDurability::default(),
        }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn diagram_path(&self, id: &DiagramId) -> PathBuf {
        self.root
            .join(format!("{}{DIAGRAM_SUFFIX}", encode_file_segment(id.as_str())))
    }

    pub fn read_diagram(&self, id: &DiagramId) -> Result<DiagramState, StoreError> {
        let path = self.diagram_path(id);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound { id: id.clone() });
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        let mut state: DiagramState =
            serde_json::from_str(&raw).map_err(|source| StoreError::Json {
                path: path.clone(),
                source,
            })?;
        state.diagram_id = Some(id.clone());
        debug!(path = path.display().to_string(); "Read diagram");
        Ok(state)
    }

    pub fn write_diagram(&self, id: &DiagramId, state: &DiagramState) -> Result<(), StoreError> {
        let path = self.diagram_path(id);
        let contents = serde_json::to_vec_pretty(state).map_err(|source| StoreError::Json {
            path: path.clone(),
            source,
        })?;
        write_atomic(&self.root, &path, &contents, self.durability)?;
        debug!(path = path.display().to_string(); "Wrote diagram");
        Ok(())
    }

    pub fn diagram_ids(&self) -> Result<Vec<DiagramId>, StoreError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.root.clone(),
                    source,
                })
            }
        };

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io {
                path: self.root.clone(),
                source,
            })?;
            let file_name = entry.file_name();
            let Some(stem) = file_name.to_str().and_then(|n| n.strip_suffix(DIAGRAM_SUFFIX))
            else {
                continue;
            };
            let Some(decoded) = decode_file_segment(stem) else {
                continue;
            };
            let id = DiagramId::new(decoded.clone())
                .map_err(|source| StoreError::InvalidId { value: decoded, source })?;
            ids.push(id);
        }
        ids.sort();
        Ok(ids)
    }
}

impl DiagramStore for DiagramFolder {
    async fn load_diagram(&self, id: &DiagramId) -> Result<DiagramState, StoreError> {
        self.read_diagram(id)
    }

    async fn save_diagram(&self, id: &DiagramId, state: &DiagramState) -> Result<(), StoreError> {
        self.write_diagram(id, state)
    }

    async fn list_diagrams(&self) -> Result<Vec<DiagramSummary>, StoreError> {
        let mut summaries = Vec::new();
        for id in self.diagram_ids()? {
            let state = self.read_diagram(&id)?;
            summaries.push(DiagramSummary {
                id,
                title: state.title,
            });
        }
        Ok(summaries)
    }
}

/// Ids may contain `/` (graph-id style); anything outside a conservative set is hex-encoded
/// behind a `~` marker so every id maps to exactly one portable file name.
fn encode_file_segment(segment: &str) -> String {
    let plain = !segment.starts_with('~')
        && !segment.starts_with('.')
        && segment
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.'));
    if plain {
        return segment.to_owned();
    }

    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(1 + segment.len().saturating_mul(2));
    out.push('~');
    for &b in segment.as_bytes() {
        out.push(HEX[(b >> 4) as usize] as char);
        out.push(HEX[(b & 0x0f) as usize] as char);
    }
    out
}

fn decode_file_segment(segment: &str) -> Option<String> {
    let Some(hex) = segment.strip_prefix('~') else {
        return Some(segment.to_owned());
    };
    if hex.len() % 2 != 0 {
        return None;
    }
    let bytes = hex
        .as_bytes()
        .chunks(2)
        .map(|pair| Some((hex_digit(pair[0])? << 4) | hex_digit(pair[1])?))
        .collect::<Option<Vec<_>>>()?;
    String::from_utf8(bytes).ok()
}

fn hex_digit(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

/// Removes a half-written temp file when writing it failed.
fn discard_on_error<T>(tmp_path: &Path, result: io::Result<T>) -> Result<T, StoreError> {
    result.map_err(|source| {
        let _ = fs::remove_file(tmp_path);
        StoreError::Io {
            path: tmp_path.to_path_buf(),
            source,
        }
    })
}

fn write_atomic(
    root: &Path,
    path: &Path,
    contents: &[u8],
    durability: WriteDurability,
) -> Result<(), StoreError> {
    fs::create_dir_all(root).map_err(|source| StoreError::Io {
        path: root.to_path_buf(),
        source,
    })?;

    let Some(file_name) = path.file_name() else {
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source: io::Error::other("path has no file name"),
        });
    };

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let tmp_path = root.join(format!(
        ".flowpane.tmp.{}.{}",
        file_name.to_string_lossy(),
        nanos
    ));

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp_path)
        .map_err(|source| StoreError::Io {
            path: tmp_path.clone(),
            source,
        })?;

    let written = file.write_all(contents).and_then(|()| {
        if durability == WriteDurability::Durable {
            file.sync_all()
        } else {
            Ok(())
        }
    });
    drop(file);
    discard_on_error(&tmp_path, written)?;

    if let Err(source) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        });
    }

    if durability == WriteDurability::Durable {
        #[cfg(unix)]
        {
            let dir = fs::File::open(root).map_err(|source| StoreError::Io {
                path: root.to_path_buf(),
                source,
            })?;
            dir.sync_all().map_err(|source| StoreError::Io {
                path: root.to_path_buf(),
                source,
            })?;
        }
    }

    Ok(())
}
