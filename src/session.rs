//! The review session engine.
//!
//! A [`ReviewSession`] owns a fixed, ordered list of items, the position of
//! the item under review, and the decisions made so far. All mutation goes
//! through [`ReviewSession::decide`] and [`ReviewSession::undo`].
//!
//! ```text
//!   Reviewing --decide(last item)--> Completed
//!     |  ^
//!     +--+ decide / undo
//! ```
//!
//! Invariant: `decisions.len() == current_index()` after every call.
//! Operations that are not allowed in the current state are ignored and
//! leave the session unchanged.
//!
//! ## Example
//!
//! ```rust,ignore
//! use image_sorter::{Item, Outcome, ReviewSession, Transition};
//!
//! let mut session = ReviewSession::builder()
//!     .items(vec![Item::url("/img/a.png"), Item::url("/img/b.png")])
//!     .build()?;
//!
//! session.decide(Outcome::Liked);
//! if let Transition::Completed(report) = session.decide(Outcome::Disliked) {
//!     println!("liked {}", report.total_liked);
//! }
//! ```

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::activity::ActivityLog;
use crate::blob::BlobRegistry;
use crate::display::{DisplayStatus, ImageInfo};
use crate::error::{Error, Result};
use crate::export::{ExportBundle, Exporter};
use crate::item::{Item, Outcome};
use crate::report::SessionReport;

/// A recorded outcome for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// Index of the item in the session.
    pub position: usize,
    /// Display name of the item.
    pub name: String,
    /// Reference of the item, rendered as a string.
    pub reference: String,
    /// What the operator chose.
    pub outcome: Outcome,
}

impl Decision {
    /// Record `outcome` for the item at `position`.
    #[must_use]
    pub fn new(position: usize, item: &Item, outcome: Outcome) -> Self {
        Self {
            position,
            name: item.name().to_string(),
            reference: item.reference().to_string(),
            outcome,
        }
    }
}

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Accepting decisions and undos.
    Reviewing,
    /// Every item has been decided. Terminal.
    Completed,
}

/// Result of [`ReviewSession::decide`].
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// The session was already completed; nothing changed.
    Ignored,
    /// The decision was recorded and the next item is current.
    Advanced {
        /// Index of the new current item.
        next: usize,
    },
    /// The last item was decided. Carries the final report.
    Completed(SessionReport),
}

/// Position for progress display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Number of items decided so far.
    pub current: usize,
    /// Larger of the expected count and the number of items.
    pub total: usize,
}

impl Progress {
    /// Completion percentage, rounded to the nearest whole number.
    #[must_use]
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 100;
        }
        ((self.current as f64 / self.total as f64) * 100.0).round() as u32
    }
}

/// Builder for [`ReviewSession`].
///
/// Pre-supplied items come first, followed by uploads in the order they
/// were added.
#[derive(Debug, Default)]
pub struct SessionBuilder {
    items: Vec<Item>,
    uploads: Vec<Item>,
    blobs: BlobRegistry,
    total_expected: Option<usize>,
}

impl SessionBuilder {
    /// Set the pre-supplied items.
    #[must_use]
    pub fn items(mut self, items: Vec<Item>) -> Self {
        self.items = items;
        self
    }

    /// Set how many items were expected, for progress display.
    #[must_use]
    pub fn total_expected(mut self, total: usize) -> Self {
        self.total_expected = Some(total);
        self
    }

    /// Append an uploaded image held in memory.
    #[must_use]
    pub fn upload(mut self, file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let handle = self.blobs.register(file_name, bytes);
        self.uploads.push(Item::blob(handle));
        self
    }

    /// Append an uploaded image read from disk.
    pub fn upload_file(mut self, path: &Path) -> Result<Self> {
        let handle = self.blobs.register_file(path)?;
        self.uploads.push(Item::blob(handle));
        Ok(self)
    }

    /// Freeze the item list and start reviewing.
    ///
    /// Returns [`Error::NothingToReview`] when there are no items.
    pub fn build(self) -> Result<ReviewSession> {
        let Self {
            mut items,
            uploads,
            blobs,
            total_expected,
        } = self;

        let mut activity = ActivityLog::new();
        if !uploads.is_empty() {
            activity.push(format!("Processing {} uploaded files", uploads.len()));
            for upload in &uploads {
                activity.push(format!("Added uploaded file: {}", upload.name()));
            }
        }
        items.extend(uploads);

        if items.is_empty() {
            warn!("no items to review");
            return Err(Error::NothingToReview);
        }

        let mut session = ReviewSession {
            expected: total_expected.unwrap_or(0),
            items,
            current: 0,
            decisions: Vec::new(),
            state: SessionState::Reviewing,
            display: DisplayStatus::Loading,
            activity,
            blobs,
        };
        info!(
            items = session.items.len(),
            expected = session.expected,
            "review session started"
        );
        session.on_current_changed();
        Ok(session)
    }
}

/// One pass over an ordered list of items.
#[derive(Debug)]
pub struct ReviewSession {
    items: Vec<Item>,
    expected: usize,
    current: usize,
    decisions: Vec<Decision>,
    state: SessionState,
    display: DisplayStatus,
    activity: ActivityLog,
    blobs: BlobRegistry,
}

impl ReviewSession {
    /// Create a new session builder.
    #[must_use]
    pub fn builder() -> SessionBuilder {
        SessionBuilder::default()
    }

    /// Start a session over `items` with no uploads.
    pub fn new(items: Vec<Item>, total_expected: Option<usize>) -> Result<Self> {
        let mut builder = Self::builder().items(items);
        if let Some(total) = total_expected {
            builder = builder.total_expected(total);
        }
        builder.build()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether every item has been decided.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.state == SessionState::Completed
    }

    /// Index of the item under review; equals `items().len()` once completed.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// All items, in review order.
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Decisions so far, in the order they were made.
    #[must_use]
    pub fn decisions(&self) -> &[Decision] {
        &self.decisions
    }

    /// Item under review, or `None` once completed.
    #[must_use]
    pub fn current_item(&self) -> Option<&Item> {
        match self.state {
            SessionState::Reviewing => self.items.get(self.current),
            SessionState::Completed => None,
        }
    }

    /// Progress for display. Never used for control flow.
    #[must_use]
    pub fn progress(&self) -> Progress {
        Progress {
            current: self.current,
            total: self.total_expected(),
        }
    }

    /// Larger of the expected count and the number of items.
    #[must_use]
    pub fn total_expected(&self) -> usize {
        self.expected.max(self.items.len())
    }

    /// Whether undo would currently do anything.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.state == SessionState::Reviewing && self.current > 0
    }

    /// Record a decision for the current item and advance.
    ///
    /// Ignored once the session is completed.
    pub fn decide(&mut self, outcome: Outcome) -> Transition {
        if self.state == SessionState::Completed {
            debug!(?outcome, "decision ignored: session completed");
            return Transition::Ignored;
        }

        let item = &self.items[self.current];
        let decision = Decision::new(self.current, item, outcome);
        let label = match outcome {
            Outcome::Liked => "LIKED",
            Outcome::Disliked => "DISLIKED",
        };
        self.activity.push(format!("{label}: {}", decision.name));
        self.decisions.push(decision);
        self.current += 1;

        if self.current == self.items.len() {
            self.state = SessionState::Completed;
            self.activity.push("Completed reviewing all images");
            let report = self.report();
            info!(
                liked = report.total_liked,
                disliked = report.total_disliked,
                "review session completed"
            );
            return Transition::Completed(report);
        }

        self.on_current_changed();
        Transition::Advanced { next: self.current }
    }

    /// Shorthand for `decide(Outcome::Liked)`.
    pub fn like(&mut self) -> Transition {
        self.decide(Outcome::Liked)
    }

    /// Shorthand for `decide(Outcome::Disliked)`.
    pub fn dislike(&mut self) -> Transition {
        self.decide(Outcome::Disliked)
    }

    /// Reverse the most recent decision and step back one item.
    ///
    /// Returns the removed decision, or `None` when there is nothing to undo
    /// or the session is completed.
    pub fn undo(&mut self) -> Option<Decision> {
        if !self.can_undo() {
            debug!(current = self.current, "undo ignored");
            return None;
        }

        self.current -= 1;
        // Decisions are positional: the last record belongs to the item we
        // just stepped back to, even when names repeat.
        let decision = self.decisions.pop()?;
        debug_assert_eq!(decision.position, self.current);

        let label = match decision.outcome {
            Outcome::Liked => "UNDO LIKE",
            Outcome::Disliked => "UNDO DISLIKE",
        };
        self.activity.push(format!("{label}: {}", decision.name));
        self.on_current_changed();
        Some(decision)
    }

    /// Build a report from the current decisions.
    ///
    /// Does not change the session; calling it again yields the same lists
    /// and counts with a fresh timestamp.
    #[must_use]
    pub fn report(&self) -> SessionReport {
        SessionReport::from_decisions(&self.decisions, self.items.len(), self.total_expected())
    }

    /// Rendering state of the current item.
    #[must_use]
    pub fn display_status(&self) -> &DisplayStatus {
        &self.display
    }

    /// Record the display collaborator's result for the item at `index`.
    ///
    /// Results for an item that is no longer current are dropped and
    /// `false` is returned.
    pub fn report_display(
        &mut self,
        index: usize,
        result: std::result::Result<ImageInfo, String>,
    ) -> bool {
        if self.state == SessionState::Completed || index != self.current {
            debug!(index, current = self.current, "stale display result dropped");
            return false;
        }

        self.display = match result {
            Ok(info) => {
                self.activity.push(format!(
                    "Successfully loaded image {}/{}",
                    index + 1,
                    self.items.len()
                ));
                DisplayStatus::Loaded(info)
            }
            Err(reason) => {
                let reference = self.items[index].reference().to_string();
                let display = reference.replace("?url", "");
                warn!(%reference, %reason, "image failed to display");
                let message = format!("Error loading image at path: {display}");
                self.activity.push(message.clone());
                DisplayStatus::Failed(message)
            }
        };
        true
    }

    /// The session's activity log.
    #[must_use]
    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    /// Uploaded blob data backing blob items.
    #[must_use]
    pub fn blobs(&self) -> &BlobRegistry {
        &self.blobs
    }

    /// Hand the current report to an exporter.
    ///
    /// Failures are logged and returned; the session is left as it was so
    /// the export can be retried.
    pub fn export_with(&mut self, exporter: &dyn Exporter) -> Result<Vec<PathBuf>> {
        let report = self.report();
        let bundle = ExportBundle {
            report: &report,
            decisions: &self.decisions,
            activity: &self.activity,
        };

        match exporter.export(&bundle) {
            Ok(paths) => {
                for path in &paths {
                    self.activity
                        .push(format!("Results saved to {}", path.display()));
                }
                Ok(paths)
            }
            Err(e) => {
                warn!(error = %e, "export failed");
                self.activity.push(format!("Error saving results: {e}"));
                Err(e)
            }
        }
    }

    /// End the session, releasing every uploaded blob.
    ///
    /// Returns the number of blobs released and the final activity log.
    pub fn teardown(mut self) -> (usize, ActivityLog) {
        let released = self.blobs.release_all();
        if released > 0 {
            self.activity
                .push(format!("Released {released} uploaded files"));
        }
        info!(released, "review session ended");
        (released, self.activity)
    }

    fn on_current_changed(&mut self) {
        self.display = DisplayStatus::Loading;
        if let Some(item) = self.items.get(self.current) {
            let message = format!("Loading image: {}", item.reference());
            self.activity.push(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(names: &[&str]) -> Vec<Item> {
        names.iter().map(|n| Item::url(format!("/img/{n}"))).collect()
    }

    fn session(names: &[&str]) -> ReviewSession {
        ReviewSession::new(items(names), None).unwrap()
    }

    fn summary(session: &ReviewSession) -> Vec<(String, Outcome)> {
        session
            .decisions()
            .iter()
            .map(|d| (d.name.clone(), d.outcome))
            .collect()
    }

    #[test]
    fn test_empty_items_never_review() {
        let err = ReviewSession::new(Vec::new(), Some(5)).unwrap_err();
        assert!(matches!(err, Error::NothingToReview));
    }

    #[test]
    fn test_walkthrough_with_undo() {
        let mut s = ReviewSession::new(items(&["A", "B", "C"]), Some(3)).unwrap();
        assert_eq!(s.current_item().unwrap().name(), "A");

        assert_eq!(s.like(), Transition::Advanced { next: 1 });
        assert_eq!(summary(&s), vec![("A".to_string(), Outcome::Liked)]);

        s.dislike();
        assert_eq!(s.current_index(), 2);

        let undone = s.undo().unwrap();
        assert_eq!(undone.name, "B");
        assert_eq!(s.current_index(), 1);
        assert_eq!(summary(&s), vec![("A".to_string(), Outcome::Liked)]);

        s.dislike();
        assert_eq!(s.current_index(), 2);

        let Transition::Completed(report) = s.like() else {
            panic!("expected completion");
        };
        assert_eq!(s.current_index(), 3);
        assert!(s.is_completed());
        assert!(s.current_item().is_none());
        assert_eq!(report.liked_images, vec!["A", "C"]);
        assert_eq!(report.disliked_images, vec!["B"]);
        assert_eq!(report.total_liked, 2);
        assert_eq!(report.total_disliked, 1);
    }

    #[test]
    fn test_decisions_track_index() {
        let mut s = session(&["a", "b", "c", "d"]);
        let script = [
            Some(Outcome::Liked),
            Some(Outcome::Disliked),
            None,
            None,
            None,
            Some(Outcome::Disliked),
            Some(Outcome::Liked),
            None,
            Some(Outcome::Liked),
            Some(Outcome::Liked),
            Some(Outcome::Disliked),
        ];
        for step in script {
            match step {
                Some(outcome) => {
                    s.decide(outcome);
                }
                None => {
                    s.undo();
                }
            }
            assert_eq!(s.decisions().len(), s.current_index());
        }
    }

    #[test]
    fn test_decide_then_undo_restores_state() {
        let script = [
            Outcome::Liked,
            Outcome::Disliked,
            Outcome::Disliked,
            Outcome::Liked,
            Outcome::Liked,
        ];
        let names = ["a", "b", "c", "d", "e", "f"];

        for prefix in 0..names.len() - 1 {
            let mut s = session(&names);
            for outcome in &script[..prefix] {
                s.decide(*outcome);
            }
            let before_index = s.current_index();
            let before = s.decisions().to_vec();

            for outcome in [Outcome::Liked, Outcome::Disliked] {
                assert!(matches!(s.decide(outcome), Transition::Advanced { .. }));
                let undone = s.undo().unwrap();
                assert_eq!(undone.outcome, outcome);
                assert_eq!(undone.position, before_index);
                assert_eq!(s.current_index(), before_index);
                assert_eq!(s.decisions(), before.as_slice());
            }
        }
    }

    #[test]
    fn test_undo_at_start_is_noop() {
        let mut s = session(&["a"]);
        assert!(s.undo().is_none());
        assert_eq!(s.current_index(), 0);
        assert!(s.decisions().is_empty());
        assert_eq!(s.state(), SessionState::Reviewing);
    }

    #[test]
    fn test_completion_fires_once() {
        let mut s = session(&["a", "b"]);
        s.like();
        assert!(matches!(s.like(), Transition::Completed(_)));
        assert_eq!(s.dislike(), Transition::Ignored);
        assert_eq!(s.decisions().len(), 2);
        assert!(s.undo().is_none());
        assert_eq!(s.current_index(), 2);
    }

    #[test]
    fn test_undo_removes_by_position_with_duplicate_names() {
        let items = vec![
            Item::url("/a/same.png"),
            Item::url("/b/same.png"),
            Item::url("/c/x.png"),
        ];
        let mut s = ReviewSession::new(items, None).unwrap();
        s.like();
        s.like();

        let undone = s.undo().unwrap();
        assert_eq!(undone.position, 1);
        assert_eq!(undone.reference, "/b/same.png");
        assert_eq!(s.decisions().len(), 1);
        assert_eq!(s.decisions()[0].reference, "/a/same.png");
    }

    #[test]
    fn test_report_is_repeatable() {
        let mut s = session(&["a", "b"]);
        s.like();
        s.dislike();

        let first = s.report();
        let second = s.report();
        assert_eq!(first.liked_images, second.liked_images);
        assert_eq!(first.disliked_images, second.disliked_images);
        assert_eq!(first.total_decided(), s.decisions().len());
        assert_eq!(s.decisions().len(), 2);
    }

    #[test]
    fn test_progress_uses_larger_total() {
        let mut s = ReviewSession::new(items(&["a", "b"]), Some(10)).unwrap();
        s.like();
        assert_eq!(s.progress(), Progress { current: 1, total: 10 });
        assert_eq!(s.progress().percent(), 10);

        let s = ReviewSession::new(items(&["a", "b", "c"]), Some(1)).unwrap();
        assert_eq!(s.progress().total, 3);
        assert_eq!(s.report().total_expected, 3);
    }

    #[test]
    fn test_uploads_follow_supplied_items() {
        let mut s = ReviewSession::builder()
            .items(items(&["first.png"]))
            .upload("up1.png", vec![1])
            .upload("up2.png", vec![2])
            .build()
            .unwrap();

        let names: Vec<&str> = s.items().iter().map(Item::name).collect();
        assert_eq!(names, vec!["first.png", "up1.png", "up2.png"]);
        assert!(s.items()[1].is_uploaded());
        assert_eq!(s.blobs().live_count(), 2);

        // Uploads stay resolvable after stepping back over them.
        s.like();
        s.like();
        s.undo();
        let item = s.current_item().unwrap().clone();
        let crate::item::ItemRef::Blob(handle) = item.reference() else {
            panic!("expected blob item");
        };
        assert_eq!(s.blobs().resolve(handle), Some(&[1u8][..]));

        let (released, log) = s.teardown();
        assert_eq!(released, 2);
        assert!(log.lines().last().unwrap().ends_with("Released 2 uploaded files"));
    }

    #[test]
    fn test_upload_activity_order() {
        let s = ReviewSession::builder()
            .upload("one.png", vec![1])
            .upload("two.png", vec![2])
            .build()
            .unwrap();

        let messages: Vec<&str> = s
            .activity()
            .entries()
            .iter()
            .map(|e| e.message.as_str())
            .collect();
        assert_eq!(
            &messages[..3],
            &[
                "Processing 2 uploaded files",
                "Added uploaded file: one.png",
                "Added uploaded file: two.png",
            ]
        );
    }

    #[test]
    fn test_teardown_without_uploads_logs_nothing() {
        let s = session(&["a"]);
        let entries = s.activity().len();
        let (released, log) = s.teardown();
        assert_eq!(released, 0);
        assert_eq!(log.len(), entries);
    }

    #[test]
    fn test_uploads_only_session() {
        let s = ReviewSession::builder()
            .upload("only.png", vec![0])
            .build()
            .unwrap();
        assert_eq!(s.items().len(), 1);
    }

    #[test]
    fn test_display_failure_does_not_block() {
        let mut s = session(&["broken.png", "ok.png"]);
        assert!(s.report_display(0, Err("corrupt".to_string())));
        assert!(s.display_status().is_failed());

        s.dislike();
        assert_eq!(s.display_status(), &DisplayStatus::Loading);
        assert!(!s.report_display(0, Err("late".to_string())));
        assert_eq!(s.display_status(), &DisplayStatus::Loading);
    }

    #[test]
    fn test_activity_records_decisions() {
        let mut s = session(&["a.png", "b.png"]);
        s.like();
        s.undo();
        s.dislike();
        s.like();

        let messages: Vec<&str> = s
            .activity()
            .entries()
            .iter()
            .map(|e| e.message.as_str())
            .filter(|m| !m.starts_with("Loading image"))
            .collect();
        assert_eq!(
            messages,
            vec![
                "LIKED: a.png",
                "UNDO LIKE: a.png",
                "DISLIKED: a.png",
                "LIKED: b.png",
                "Completed reviewing all images",
            ]
        );
    }

    #[test]
    fn test_failed_export_keeps_state() {
        struct Failing;
        impl Exporter for Failing {
            fn export(&self, _bundle: &ExportBundle<'_>) -> Result<Vec<PathBuf>> {
                Err(Error::Export("disk full".to_string()))
            }
        }

        let mut s = session(&["a"]);
        s.like();
        assert!(s.export_with(&Failing).is_err());
        assert!(s.is_completed());
        assert_eq!(s.decisions().len(), 1);
        assert!(
            s.activity()
                .lines()
                .last()
                .unwrap()
                .contains("Error saving results: Export error: disk full")
        );

        let dir = tempfile::tempdir().unwrap();
        let exporter = crate::export::DirectoryExporter::new(dir.path());
        let paths = s.export_with(&exporter).unwrap();

        let results = paths
            .iter()
            .find(|p| p.extension().is_some_and(|e| e == "json"))
            .unwrap();
        let json = std::fs::read_to_string(results).unwrap();
        let report = SessionReport::from_json(&json).unwrap();
        assert_eq!(report.total_liked, 1);
        assert_eq!(report.liked_images, vec!["a"]);

        let lines = s.activity().lines();
        assert!(lines.iter().any(|l| l.contains("Error saving results")));
        assert!(lines.last().unwrap().contains("Results saved to"));
    }
}
