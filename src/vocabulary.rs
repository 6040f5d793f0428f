/*!
 * Lesson vocabulary reconciliation.
 *
 * The editor sends back the full, reordered word list of a lesson plus the
 * ids the user removed. Each list element is written with `sort` equal to
 * its position, so positions stay dense without a separate renumbering pass.
 *
 * Steps run one at a time and stop at the first failure. Nothing is rolled
 * back: rows written before the failing step keep their new state.
 */

use log::{debug, info};

use crate::database::Repository;
use crate::database::models::WordFields;
use crate::errors::AppResult;

/// Identity of the lesson being edited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LessonRef {
    pub lesson_id: i64,
    pub language_id: i64,
}

/// One element of the edited list; `id == 0` marks a new word
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordEdit {
    pub id: i64,
    pub fields: WordFields,
}

impl WordEdit {
    pub fn new_word(fields: WordFields) -> Self {
        Self { id: 0, fields }
    }

    pub fn existing(id: i64, fields: WordFields) -> Self {
        Self { id, fields }
    }

    pub fn is_new(&self) -> bool {
        self.id == 0
    }
}

/// What a reconciliation changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Ids of inserted words, in list order
    pub inserted: Vec<i64>,
    pub updated: usize,
    /// Rows actually removed; ids already gone are not counted
    pub deleted: usize,
}

/// Applies an edited word list to a lesson
#[derive(Clone)]
pub struct WordSetReconciler {
    repo: Repository,
}

impl WordSetReconciler {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Upsert every element of `words` at its position, then delete `delete_ids`.
    ///
    /// Words of the lesson that appear in neither list are left untouched.
    pub async fn reconcile(
        &self,
        lesson: LessonRef,
        words: &[WordEdit],
        delete_ids: &[i64],
    ) -> AppResult<ReconcileReport> {
        let mut report = ReconcileReport::default();

        for (index, word) in words.iter().enumerate() {
            let sort = index as i64;
            if word.is_new() {
                let id = self
                    .repo
                    .insert_word(lesson.lesson_id, lesson.language_id, &word.fields, sort)
                    .await?;
                debug!("Inserted word {} at position {}", id, sort);
                report.inserted.push(id);
            } else {
                self.repo
                    .update_word(lesson.lesson_id, word.id, &word.fields, sort)
                    .await?;
                report.updated += 1;
            }
        }

        for id in delete_ids {
            report.deleted += self.repo.delete_word(lesson.lesson_id, *id).await?;
        }

        info!(
            "Reconciled lesson {}: {} inserted, {} updated, {} deleted",
            lesson.lesson_id,
            report.inserted.len(),
            report.updated,
            report.deleted
        );
        Ok(report)
    }
}
