//! Executes a move plan against the file system.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::AppError;
use crate::history::{compute_file_checksum, OperationRecord, RecordedOperation};

use super::category::{self, FALLBACK_CATEGORY};
use super::scanner::FileEntry;
use super::OrganizeOptions;

/// What to do when a move destination already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ConflictPolicy {
    /// Abort the run at the first conflicting destination.
    #[default]
    Fail,
    /// Leave the conflicting file where it is and continue.
    Skip,
    /// Move under a numbered name such as `report_1.pdf`.
    #[value(name = "rename")]
    AutoRename,
}

impl FromStr for ConflictPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fail" => Ok(Self::Fail),
            "skip" => Ok(Self::Skip),
            "rename" | "auto-rename" | "auto_rename" => Ok(Self::AutoRename),
            other => Err(format!("unknown conflict policy: {other}")),
        }
    }
}

/// One scanned file together with its table category. `category` is `None`
/// for files routed to the fallback folder.
#[derive(Debug, Clone)]
pub struct PlannedMove {
    pub entry: FileEntry,
    pub category: Option<&'static str>,
}

impl PlannedMove {
    /// Folder name this file will move into.
    pub fn category_name(&self) -> &'static str {
        self.category.unwrap_or(FALLBACK_CATEGORY)
    }

    /// Whether the extension matched the table (fallback moves are quiet
    /// in live output).
    pub fn matched(&self) -> bool {
        self.category.is_some()
    }

    pub fn destination(&self, target: &Path) -> PathBuf {
        target.join(self.category_name()).join(&self.entry.name)
    }
}

/// Classify scanned files against the category table.
pub fn plan_moves(entries: Vec<FileEntry>) -> Vec<PlannedMove> {
    entries
        .into_iter()
        .map(|entry| {
            let category = category::category_for_path(&entry.path);
            PlannedMove { entry, category }
        })
        .collect()
}

/// Progress events surfaced while a plan executes.
#[derive(Debug, Clone, PartialEq)]
pub enum MoveEvent {
    /// A file moved (or, in dry-run, would move) into `category`.
    Moved {
        file_name: String,
        category: &'static str,
        matched: bool,
        /// Final name when the auto-rename policy had to pick a new one.
        renamed_to: Option<String>,
    },
    /// Destination existed and the `Skip` policy left the file in place.
    Skipped {
        file_name: String,
        category: &'static str,
    },
}

/// Outcome of executing a plan. `errors` is non-empty when the run aborted.
#[derive(Debug, Default)]
pub struct OrganizeReport {
    pub planned: usize,
    pub moved: usize,
    pub renamed: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
    /// Operations applied to disk, in order, for the history journal.
    pub operations: Vec<RecordedOperation>,
}

impl OrganizeReport {
    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Execute `plan` under `target`. Moves run in plan order and the run stops
/// at the first failure, leaving earlier moves in place. In dry-run mode
/// nothing touches the disk and every planned move is reported.
pub fn execute_moves(
    target: &Path,
    plan: &[PlannedMove],
    options: &OrganizeOptions,
    observer: &mut dyn FnMut(&MoveEvent),
) -> OrganizeReport {
    let mut report = OrganizeReport {
        planned: plan.len(),
        ..OrganizeReport::default()
    };
    let mut created: HashSet<&'static str> = HashSet::new();
    let mut sequence: u32 = 0;

    for planned in plan {
        let category = planned.category_name();
        let source = planned.entry.path.clone();
        let mut destination = planned.destination(target);

        if options.dry_run {
            report.moved += 1;
            observer(&MoveEvent::Moved {
                file_name: planned.entry.name.clone(),
                category,
                matched: planned.matched(),
                renamed_to: None,
            });
            continue;
        }

        if !created.contains(category) {
            match ensure_category_dir(target, category) {
                Ok(true) => {
                    sequence += 1;
                    report.operations.push(RecordedOperation::new(
                        sequence,
                        OperationRecord::CreateFolder {
                            path: target.join(category),
                        },
                        None,
                    ));
                    created.insert(category);
                }
                Ok(false) => {
                    created.insert(category);
                }
                Err(e) => {
                    report
                        .errors
                        .push(format!("could not create {category}/: {e}"));
                    break;
                }
            }
        }

        let mut renamed_to = None;
        if destination.exists() {
            match options.on_conflict {
                ConflictPolicy::Fail => {
                    report.errors.push(
                        AppError::DestinationExists {
                            path: destination.display().to_string(),
                        }
                        .to_string(),
                    );
                    break;
                }
                ConflictPolicy::Skip => {
                    report.skipped += 1;
                    tracing::info!(file = %planned.entry.name, "skipped, destination exists");
                    observer(&MoveEvent::Skipped {
                        file_name: planned.entry.name.clone(),
                        category,
                    });
                    continue;
                }
                ConflictPolicy::AutoRename => {
                    destination = next_available(&destination);
                    renamed_to = destination
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string());
                }
            }
        }

        if let Err(e) = move_file(&source, &destination) {
            report.errors.push(format!(
                "failed to move {}: {e}",
                planned.entry.name
            ));
            break;
        }

        let checksum = match compute_file_checksum(&destination) {
            Ok(checksum) => Some(checksum),
            Err(e) => {
                tracing::warn!(file = %destination.display(), "checksum failed: {e}");
                None
            }
        };
        sequence += 1;
        report.operations.push(RecordedOperation::new(
            sequence,
            OperationRecord::Move {
                source,
                destination,
            },
            checksum,
        ));

        report.moved += 1;
        if renamed_to.is_some() {
            report.renamed += 1;
        }
        observer(&MoveEvent::Moved {
            file_name: planned.entry.name.clone(),
            category,
            matched: planned.matched(),
            renamed_to,
        });
    }

    report
}

/// Create the category folder if needed. Returns whether it was created.
fn ensure_category_dir(target: &Path, category: &str) -> std::io::Result<bool> {
    let dir = target.join(category);
    if dir.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(&dir)?;
    Ok(true)
}

/// Move a file, falling back to copy-and-delete across devices.
pub(crate) fn move_file(source: &Path, destination: &Path) -> std::io::Result<()> {
    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(_) => {
            fs::copy(source, destination)?;
            fs::remove_file(source)
        }
    }
}

/// First free `stem_N.ext` name next to an occupied destination.
fn next_available(destination: &Path) -> PathBuf {
    let stem = destination
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let ext = destination
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let parent = destination.parent().unwrap_or_else(|| Path::new("."));

    let mut counter = 1;
    loop {
        let candidate = parent.join(format!("{stem}_{counter}{ext}"));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}
