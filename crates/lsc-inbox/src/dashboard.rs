//! Admin dashboard view model.
//!
//! A [`Dashboard`] is the state behind the admin panel: a snapshot of the
//! submission list, the active filter and search text, and the selected
//! entry. Listing and counting work on the snapshot. Every mutation goes to
//! the store first and then reloads the whole snapshot.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::storage::KeyValueStore;
use crate::store::SubmissionStore;
use crate::submission::{Submission, SubmissionKind};

/// Prompt shown before deleting one submission.
pub const DELETE_PROMPT: &str = "Delete this submission?";

/// Prompt shown before deleting every submission.
pub const CLEAR_ALL_PROMPT: &str = "Delete ALL submissions? This cannot be undone.";

/// Which submissions the list shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Filter {
    /// Everything.
    #[default]
    All,
    /// Only submissions not yet marked read.
    Unread,
    /// Only support requests.
    Support,
    /// Only staff applications.
    StaffApplication,
}

impl Filter {
    /// All filters, in the order the panel shows them.
    pub const ALL: [Filter; 4] = [
        Filter::All,
        Filter::Unread,
        Filter::Support,
        Filter::StaffApplication,
    ];

    /// The filter's name as used in config and on the command line.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Unread => "unread",
            Self::Support => "support",
            Self::StaffApplication => "staff-application",
        }
    }

    /// Whether a submission passes this filter, ignoring any search text.
    #[must_use]
    pub fn admits(&self, submission: &Submission) -> bool {
        match self {
            Self::All => true,
            Self::Unread => !submission.read,
            Self::Support => submission.kind() == SubmissionKind::Support,
            Self::StaffApplication => submission.kind() == SubmissionKind::StaffApplication,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a submission passes the filter and, if `query` is non-empty,
/// contains it case-insensitively in one of its searchable fields.
#[must_use]
pub fn matches(submission: &Submission, filter: Filter, query: &str) -> bool {
    if !filter.admits(submission) {
        return false;
    }
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    submission
        .payload
        .search_fields()
        .into_iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Totals over the full, unfiltered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Counts {
    /// All submissions.
    pub total: usize,
    /// Support requests.
    pub support: usize,
    /// Staff applications.
    pub staff: usize,
    /// Submissions not yet read.
    pub unread: usize,
}

impl Counts {
    /// Count a list of submissions.
    #[must_use]
    pub fn of(submissions: &[Submission]) -> Self {
        submissions.iter().fold(Self::default(), |mut counts, s| {
            counts.total += 1;
            match s.kind() {
                SubmissionKind::Support => counts.support += 1,
                SubmissionKind::StaffApplication => counts.staff += 1,
            }
            if !s.read {
                counts.unread += 1;
            }
            counts
        })
    }
}

/// Asks the user to confirm a destructive action.
pub trait Confirm {
    /// Return `true` to go ahead.
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// State of the admin panel over a [`SubmissionStore`].
#[derive(Debug)]
pub struct Dashboard<'a, S> {
    store: &'a SubmissionStore<S>,
    submissions: Vec<Submission>,
    filter: Filter,
    query: String,
    selected: Option<String>,
}

impl<'a, S: KeyValueStore> Dashboard<'a, S> {
    /// Open the dashboard and load the submission list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LoginRequired`] if the admin flag is not set, or a
    /// storage error if the list cannot be read.
    pub fn open(store: &'a SubmissionStore<S>) -> Result<Self> {
        if !store.is_admin_authenticated()? {
            debug!("dashboard refused: admin flag not set");
            return Err(Error::LoginRequired);
        }
        let submissions = store.all()?;
        Ok(Self {
            store,
            submissions,
            filter: Filter::All,
            query: String::new(),
            selected: None,
        })
    }

    /// Re-read the full list from the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn reload(&mut self) -> Result<()> {
        self.submissions = self.store.all()?;
        debug!(count = self.submissions.len(), "dashboard reloaded");
        Ok(())
    }

    /// The loaded list, unfiltered.
    #[must_use]
    pub fn submissions(&self) -> &[Submission] {
        &self.submissions
    }

    /// The active filter.
    #[must_use]
    pub fn filter(&self) -> Filter {
        self.filter
    }

    /// Change the active filter.
    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    /// The active search text.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Change the search text.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Submissions passing the active filter and search, in stored order.
    #[must_use]
    pub fn visible(&self) -> Vec<&Submission> {
        self.submissions
            .iter()
            .filter(|s| matches(s, self.filter, &self.query))
            .collect()
    }

    /// Counts over the full loaded list.
    #[must_use]
    pub fn counts(&self) -> Counts {
        Counts::of(&self.submissions)
    }

    /// Select a loaded submission for the detail view.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SubmissionNotFound`] if no loaded submission has that id.
    pub fn select(&mut self, id: &str) -> Result<&Submission> {
        let found = self
            .submissions
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| Error::not_found(id))?;
        self.selected = Some(found.id.clone());
        Ok(found)
    }

    /// The selected submission, if it is still in the loaded list.
    #[must_use]
    pub fn selected(&self) -> Option<&Submission> {
        let id = self.selected.as_deref()?;
        self.submissions.iter().find(|s| s.id == id)
    }

    /// Clear the selection.
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Mark a submission read and reload. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn mark_read(&mut self, id: &str) -> Result<bool> {
        let found = self.store.mark_read(id)?;
        self.reload()?;
        Ok(found)
    }

    /// Mark a submission unread and reload. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn mark_unread(&mut self, id: &str) -> Result<bool> {
        let found = self.store.mark_unread(id)?;
        self.reload()?;
        Ok(found)
    }

    /// Delete a submission after confirmation, then reload.
    ///
    /// Clears the selection if it was the deleted entry. Returns whether
    /// anything was removed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] if the confirmation is declined (nothing
    /// changes), or a storage error.
    pub fn delete(&mut self, id: &str, confirm: &mut dyn Confirm) -> Result<bool> {
        if !confirm.confirm(DELETE_PROMPT) {
            return Err(Error::cancelled(format!("delete submission {id}")));
        }
        let removed = self.store.delete(id)?;
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        self.reload()?;
        Ok(removed)
    }

    /// Delete every submission after confirmation, then reload and clear the
    /// selection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] if the confirmation is declined (nothing
    /// changes), or a storage error.
    pub fn clear_all(&mut self, confirm: &mut dyn Confirm) -> Result<()> {
        if !confirm.confirm(CLEAR_ALL_PROMPT) {
            return Err(Error::cancelled("clear all submissions"));
        }
        self.store.clear_all()?;
        self.reload()?;
        self.selected = None;
        Ok(())
    }

    /// Clear the admin flag and close the dashboard.
    ///
    /// # Errors
    ///
    /// Returns an error if the flag cannot be removed.
    pub fn logout(self) -> Result<()> {
        self.store.set_admin_authenticated(false)?;
        info!("admin logged out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::submission::{ContactForm, StaffApplicationForm};

    fn contact(name: &str, method: &str, message: &str) -> ContactForm {
        ContactForm {
            name: name.to_string(),
            contact_method: method.to_string(),
            message: message.to_string(),
        }
    }

    fn application(
        full_name: &str,
        discord: &str,
        roblox: &str,
        position: &str,
    ) -> StaffApplicationForm {
        StaffApplicationForm {
            full_name: full_name.to_string(),
            discord_username: discord.to_string(),
            roblox_username: roblox.to_string(),
            position: position.to_string(),
            motivation: "hidden text".to_string(),
            ..StaffApplicationForm::default()
        }
    }

    fn logged_in_store() -> SubmissionStore<MemoryStore> {
        let store = SubmissionStore::new(MemoryStore::new());
        store.set_admin_authenticated(true).unwrap();
        store
    }

    fn yes() -> impl FnMut(&str) -> bool {
        |_: &str| true
    }

    fn no() -> impl FnMut(&str) -> bool {
        |_: &str| false
    }

    fn visible_ids<S: KeyValueStore>(dashboard: &Dashboard<'_, S>) -> Vec<String> {
        dashboard.visible().into_iter().map(|s| s.id.clone()).collect()
    }

    #[test]
    fn test_filter_display() {
        for filter in Filter::ALL {
            assert_eq!(filter.to_string(), filter.as_str());
        }
    }

    #[test]
    fn test_filter_serde_names() {
        assert_eq!(
            serde_json::to_string(&Filter::StaffApplication).unwrap(),
            "\"staff-application\""
        );
        let parsed: Filter = serde_json::from_str("\"unread\"").unwrap();
        assert_eq!(parsed, Filter::Unread);
    }

    #[test]
    fn test_matches_hebrew_query() {
        let submission = Submission::new(contact("דנה", "דיסקורד", "שלום"));

        assert!(matches(&submission, Filter::All, "דנה"));
        assert!(!matches(&submission, Filter::All, "xyz"));
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let submission = Submission::new(contact("Dana", "Discord", "Hello"));

        assert!(matches(&submission, Filter::All, "dana"));
        assert!(matches(&submission, Filter::All, "DISCORD"));
        assert!(matches(&submission, Filter::All, "eLLo"));
    }

    #[test]
    fn test_matches_only_searchable_staff_fields() {
        let submission = Submission::new(application("Noa", "noa#1", "NoaRBX", "Builder"));

        assert!(matches(&submission, Filter::All, "rbx"));
        assert!(matches(&submission, Filter::All, "build"));
        assert!(matches(&submission, Filter::All, "noa#"));
        assert!(!matches(&submission, Filter::All, "hidden"));
    }

    #[test]
    fn test_filters_compose_with_query() {
        let mut read_support = Submission::new(contact("Dana", "d", "m"));
        read_support.read = true;
        let unread_support = Submission::new(contact("Dan", "d", "m"));
        let staff = Submission::new(application("Dana Staff", "", "", "Mod"));

        assert!(!matches(&read_support, Filter::Unread, ""));
        assert!(matches(&unread_support, Filter::Unread, "dan"));
        assert!(!matches(&unread_support, Filter::Unread, "zzz"));
        assert!(matches(&staff, Filter::StaffApplication, "dana"));
        assert!(!matches(&staff, Filter::Support, "dana"));
        assert!(matches(&read_support, Filter::Support, "dana"));
    }

    #[test]
    fn test_counts() {
        let mut read = Submission::new(contact("a", "", ""));
        read.read = true;
        let list = vec![
            read,
            Submission::new(contact("b", "", "")),
            Submission::new(application("c", "", "", "")),
        ];

        assert_eq!(
            Counts::of(&list),
            Counts {
                total: 3,
                support: 2,
                staff: 1,
                unread: 2,
            }
        );
        assert_eq!(Counts::of(&[]), Counts::default());
    }

    #[test]
    fn test_open_requires_login() {
        let store = SubmissionStore::new(MemoryStore::new());
        let err = Dashboard::open(&store).unwrap_err();
        assert!(err.is_login_required());
    }

    #[test]
    fn test_open_loads_list() {
        let store = logged_in_store();
        let a = store.save(contact("a", "", "")).unwrap();
        let b = store.save(application("b", "", "", "")).unwrap();

        let dashboard = Dashboard::open(&store).unwrap();
        assert_eq!(dashboard.filter(), Filter::All);
        assert_eq!(dashboard.query(), "");
        assert_eq!(visible_ids(&dashboard), vec![b.id, a.id]);
        assert!(dashboard.selected().is_none());
    }

    #[test]
    fn test_snapshot_is_stale_until_reload() {
        let store = logged_in_store();
        let mut dashboard = Dashboard::open(&store).unwrap();

        store.save(contact("late", "", "")).unwrap();
        assert!(dashboard.submissions().is_empty());

        dashboard.reload().unwrap();
        assert_eq!(dashboard.submissions().len(), 1);
    }

    #[test]
    fn test_visible_applies_filter_and_query() {
        let store = logged_in_store();
        let support = store.save(contact("Dana", "discord", "hi")).unwrap();
        let staff = store.save(application("Dana Levi", "", "", "Mod")).unwrap();
        store.save(contact("Other", "", "")).unwrap();

        let mut dashboard = Dashboard::open(&store).unwrap();
        dashboard.set_query("dana");
        assert_eq!(visible_ids(&dashboard), vec![staff.id.clone(), support.id.clone()]);

        dashboard.set_filter(Filter::Support);
        assert_eq!(visible_ids(&dashboard), vec![support.id]);

        dashboard.set_filter(Filter::StaffApplication);
        assert_eq!(visible_ids(&dashboard), vec![staff.id]);
    }

    #[test]
    fn test_counts_ignore_filter() {
        let store = logged_in_store();
        store.save(contact("a", "", "")).unwrap();
        store.save(application("b", "", "", "")).unwrap();

        let mut dashboard = Dashboard::open(&store).unwrap();
        dashboard.set_filter(Filter::Support);
        dashboard.set_query("zzz");

        assert!(dashboard.visible().is_empty());
        assert_eq!(dashboard.counts().total, 2);
        assert_eq!(dashboard.counts().unread, 2);
    }

    #[test]
    fn test_select() {
        let store = logged_in_store();
        let a = store.save(contact("a", "", "")).unwrap();

        let mut dashboard = Dashboard::open(&store).unwrap();
        assert_eq!(dashboard.select(&a.id).unwrap().id, a.id);
        assert_eq!(dashboard.selected().unwrap().id, a.id);

        let err = dashboard.select("missing").unwrap_err();
        assert!(matches!(err, Error::SubmissionNotFound { .. }));
        assert_eq!(dashboard.selected().unwrap().id, a.id);

        dashboard.clear_selection();
        assert!(dashboard.selected().is_none());
    }

    #[test]
    fn test_mark_read_reloads() {
        let store = logged_in_store();
        let a = store.save(contact("a", "", "")).unwrap();

        let mut dashboard = Dashboard::open(&store).unwrap();
        dashboard.select(&a.id).unwrap();

        assert!(dashboard.mark_read(&a.id).unwrap());
        assert!(dashboard.selected().unwrap().read);
        assert_eq!(dashboard.counts().unread, 0);

        dashboard.set_filter(Filter::Unread);
        assert!(dashboard.visible().is_empty());

        assert!(dashboard.mark_unread(&a.id).unwrap());
        assert_eq!(visible_ids(&dashboard), vec![a.id]);
        assert!(!dashboard.mark_read("missing").unwrap());
    }

    #[test]
    fn test_delete_confirmed_clears_selection() {
        let store = logged_in_store();
        let a = store.save(contact("a", "", "")).unwrap();
        let b = store.save(contact("b", "", "")).unwrap();

        let mut dashboard = Dashboard::open(&store).unwrap();
        dashboard.select(&a.id).unwrap();

        let mut prompts = Vec::new();
        let mut confirm = |prompt: &str| {
            prompts.push(prompt.to_string());
            true
        };
        assert!(dashboard.delete(&a.id, &mut confirm).unwrap());
        assert_eq!(prompts, vec![DELETE_PROMPT.to_string()]);
        assert!(dashboard.selected().is_none());
        assert_eq!(visible_ids(&dashboard), vec![b.id]);
    }

    #[test]
    fn test_delete_other_keeps_selection() {
        let store = logged_in_store();
        let a = store.save(contact("a", "", "")).unwrap();
        let b = store.save(contact("b", "", "")).unwrap();

        let mut dashboard = Dashboard::open(&store).unwrap();
        dashboard.select(&a.id).unwrap();
        dashboard.delete(&b.id, &mut yes()).unwrap();

        assert_eq!(dashboard.selected().unwrap().id, a.id);
    }

    #[test]
    fn test_delete_declined_changes_nothing() {
        let store = logged_in_store();
        let a = store.save(contact("a", "", "")).unwrap();

        let mut dashboard = Dashboard::open(&store).unwrap();
        dashboard.select(&a.id).unwrap();

        let err = dashboard.delete(&a.id, &mut no()).unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(store.all().unwrap().len(), 1);
        assert_eq!(dashboard.selected().unwrap().id, a.id);
    }

    #[test]
    fn test_clear_all() {
        let store = logged_in_store();
        let a = store.save(contact("a", "", "")).unwrap();
        store.save(application("b", "", "", "")).unwrap();

        let mut dashboard = Dashboard::open(&store).unwrap();
        dashboard.select(&a.id).unwrap();

        assert!(dashboard.clear_all(&mut no()).unwrap_err().is_cancelled());
        assert_eq!(dashboard.counts().total, 2);

        dashboard.clear_all(&mut yes()).unwrap();
        assert_eq!(dashboard.counts(), Counts::default());
        assert!(dashboard.selected().is_none());
        assert!(store.all().unwrap().is_empty());
    }

    #[test]
    fn test_logout() {
        let store = logged_in_store();
        let dashboard = Dashboard::open(&store).unwrap();
        dashboard.logout().unwrap();

        assert!(!store.is_admin_authenticated().unwrap());
        assert!(Dashboard::open(&store).unwrap_err().is_login_required());
    }
}
