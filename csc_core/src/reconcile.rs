//! Diff-based reconciliation of user edits with the extracted course set.
//!
//! The source page is sometimes outdated or plain wrong, so the first run
//! writes a stripped snapshot of the extracted courses next to a digest of
//! the snapshot bytes and halts. A human fixes titles, instructors or rooms
//! in the snapshot file; the next run notices the digest mismatch and merges
//! every non-null scalar back into the live model. Dates, times, weekday
//! lists and class numbers are never read from the file, so a tampered
//! snapshot cannot corrupt the machine-derived scheduling fields.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::model::{Course, CourseSet};

static SNAPSHOT_FILE: &str = "modifications.json";
static DIGEST_FILE: &str = "modifications.json.sha256";

/// Editable mirror of a [`CourseSet`], keyed identically.
pub type SnapshotSet = BTreeMap<String, CourseSnapshot>;

/// Stripped mirror of a [`Course`]; every field starts out null.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseSnapshot {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub credit_units: Option<String>,
    pub meeting_blocks: BTreeMap<String, BlockSnapshot>,
}

/// Stripped mirror of a [`crate::model::MeetingBlock`].
///
/// Section and component are kept filled so the file stays navigable.
/// The temporal fields and the class number exist here only so a full
/// mirror round-trips; the merge pass never reads them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockSnapshot {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub days: Option<Vec<String>>,
    pub building: Option<String>,
    pub room: Option<String>,
    pub instructor: Option<String>,
    pub class_number: Option<String>,
    pub section: Option<String>,
    pub component: Option<String>,
}

impl From<&Course> for CourseSnapshot {
    fn from(course: &Course) -> Self {
        let meeting_blocks = course
            .meeting_blocks
            .iter()
            .map(|(key, block)| {
                let snapshot = BlockSnapshot {
                    section: Some(block.section.clone()),
                    component: Some(block.component.clone()),
                    ..Default::default()
                };
                (key.clone(), snapshot)
            })
            .collect();
        Self {
            title: None,
            subtitle: None,
            credit_units: None,
            meeting_blocks,
        }
    }
}

/// Build the null-valued snapshot of a freshly extracted course set.
pub fn strip(courses: &CourseSet) -> SnapshotSet {
    courses
        .iter()
        .map(|(title, course)| (title.clone(), CourseSnapshot::from(course)))
        .collect()
}

/// Whether the persisted snapshot was edited since it was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotStatus {
    /// No snapshot has been written yet.
    Missing,
    /// Snapshot bytes still match the stored digest.
    Clean,
    /// Digest mismatch, a human edited the file between runs.
    Edited,
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileStatus {
    /// A fresh baseline was written; the run must halt so the user can
    /// edit it before anything is synced.
    BaselineWritten(PathBuf),
    /// The snapshot is untouched; the run halts without syncing.
    Unchanged,
    /// User edits were merged into the live model, carrying the number of
    /// fields that were overridden.
    Merged(usize),
}

/// Content-addressed persistence of the editable snapshot.
///
/// The snapshot file is stored together with the SHA-256 digest of its
/// bytes; a digest mismatch is exactly an edit having occurred.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    snapshot_path: PathBuf,
    digest_path: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            snapshot_path: dir.join(SNAPSHOT_FILE),
            digest_path: dir.join(DIGEST_FILE),
        }
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    pub fn status(&self) -> Result<SnapshotStatus> {
        if !self.snapshot_path.exists() || !self.digest_path.exists() {
            return Ok(SnapshotStatus::Missing);
        }
        let bytes = fs::read(&self.snapshot_path)
            .with_context(|| format!("cannot read {}", self.snapshot_path.display()))?;
        let stored = fs::read_to_string(&self.digest_path)
            .with_context(|| format!("cannot read {}", self.digest_path.display()))?;
        if digest(&bytes) == stored.trim() {
            Ok(SnapshotStatus::Clean)
        } else {
            Ok(SnapshotStatus::Edited)
        }
    }

    pub fn write_baseline(&self, snapshot: &SnapshotSet) -> Result<()> {
        let json = serde_json::to_string_pretty(snapshot)?;
        fs::write(&self.snapshot_path, &json)
            .with_context(|| format!("cannot write {}", self.snapshot_path.display()))?;
        fs::write(&self.digest_path, digest(json.as_bytes()))
            .with_context(|| format!("cannot write {}", self.digest_path.display()))?;
        Ok(())
    }

    pub fn load(&self) -> Result<SnapshotSet> {
        let bytes = fs::read(&self.snapshot_path)
            .with_context(|| format!("cannot read {}", self.snapshot_path.display()))?;
        let snapshot = serde_json::from_slice(&bytes)
            .with_context(|| format!("cannot parse {}", self.snapshot_path.display()))?;
        Ok(snapshot)
    }
}

fn digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Run the reconciliation state machine against the persisted snapshot.
pub fn reconcile(courses: &mut CourseSet, store: &SnapshotStore) -> Result<ReconcileStatus> {
    match store.status()? {
        SnapshotStatus::Missing => {
            store.write_baseline(&strip(courses))?;
            info!(path = %store.snapshot_path().display(), "wrote snapshot baseline");
            Ok(ReconcileStatus::BaselineWritten(
                store.snapshot_path().to_path_buf(),
            ))
        }
        SnapshotStatus::Clean => Ok(ReconcileStatus::Unchanged),
        SnapshotStatus::Edited => {
            let snapshot = store.load()?;
            let applied = merge_overrides(courses, &snapshot);
            info!(applied, "merged user overrides into course set");
            Ok(ReconcileStatus::Merged(applied))
        }
    }
}

/// Copy every non-null scalar field of the snapshot into the live model.
///
/// Courses are matched by title, blocks by component-type key. Fields
/// absent or null in the snapshot, or equal to the live value (the
/// baseline keeps section and component filled), stay untouched and are
/// not counted. Dates, times, days and the class number are structurally
/// excluded: this pass never reads them.
///
/// An overridden title or component changes the stored field only; the
/// course and block mapping keys keep the extracted values, which is what
/// the next run's snapshot is matched against.
pub fn merge_overrides(courses: &mut CourseSet, snapshot: &SnapshotSet) -> usize {
    let mut applied = 0;
    for (title, course_snapshot) in snapshot {
        let Some(course) = courses.get_mut(title) else {
            continue;
        };
        for (target, value) in [
            (&mut course.title, &course_snapshot.title),
            (&mut course.subtitle, &course_snapshot.subtitle),
            (&mut course.credit_units, &course_snapshot.credit_units),
        ] {
            if let Some(value) = value {
                if *target != *value {
                    *target = value.clone();
                    applied += 1;
                }
            }
        }
        for (key, block_snapshot) in &course_snapshot.meeting_blocks {
            let Some(block) = course.meeting_blocks.get_mut(key) else {
                continue;
            };
            for (target, value) in [
                (&mut block.building, &block_snapshot.building),
                (&mut block.room, &block_snapshot.room),
                (&mut block.instructor, &block_snapshot.instructor),
                (&mut block.section, &block_snapshot.section),
                (&mut block.component, &block_snapshot.component),
            ] {
                if let Some(value) = value {
                    if *target != *value {
                        *target = value.clone();
                        applied += 1;
                    }
                }
            }
        }
    }
    applied
}
