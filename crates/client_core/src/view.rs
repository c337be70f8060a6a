//! List view model: rows, pager, detail view and delete confirmation.

use shared::{
    domain::{Contact, ContactId},
    protocol::total_pages,
};

use crate::{
    controller::{DirectoryController, DirectoryState, LoadOutcome},
    error::ClientError,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRow {
    /// 1-based position on the current page.
    pub position: usize,
    pub id: ContactId,
    pub name: String,
    pub description: String,
    pub photo_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    pub current_page: u32,
    pub page_size: u32,
    pub total: u64,
    pub total_pages: u32,
    /// Page links to show; `None` marks a gap.
    pub pages: Vec<Option<u32>>,
}

impl Pager {
    pub fn new(current_page: u32, page_size: u32, total: u64) -> Self {
        let current_page = current_page.max(1);
        let total_pages = total_pages(total, page_size);
        Self {
            current_page,
            page_size,
            total,
            total_pages,
            pages: page_window(total_pages, current_page, 2, 2, 2, 2),
        }
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

fn page_window(
    last_page: u32,
    current_page: u32,
    left_edge: u32,
    left_current: u32,
    right_current: u32,
    right_edge: u32,
) -> Vec<Option<u32>> {
    if last_page == 0 {
        return vec![];
    }

    // A page past the end still gets a window anchored on the last page.
    let current_page = current_page.clamp(1, last_page);
    let end = last_page.saturating_add(1);
    let mut pages = Vec::new();

    let left_end = left_edge.saturating_add(1).min(end);
    pages.extend((1..left_end).map(Some));

    let mid_start = left_end.max(current_page.saturating_sub(left_current));
    let mid_end = current_page
        .saturating_add(right_current)
        .saturating_add(1)
        .min(end);

    if mid_start > left_end {
        pages.push(None);
    }
    pages.extend((mid_start..mid_end).map(Some));

    let right_start = mid_end.max(last_page.saturating_sub(right_edge).saturating_add(1));

    if right_start > mid_end {
        pages.push(None);
    }
    pages.extend((right_start..=last_page).map(Some));

    pages
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    pub rows: Vec<ContactRow>,
    pub pager: Pager,
    pub search_text: String,
    pub loading: bool,
    pub error: Option<String>,
}

impl ListView {
    pub fn from_state(state: &DirectoryState) -> Self {
        let rows = state
            .items
            .iter()
            .enumerate()
            .map(|(idx, contact)| ContactRow {
                position: idx + 1,
                id: contact.id,
                name: contact.name.clone(),
                description: contact.description.clone(),
                photo_url: contact.photo_url.clone(),
            })
            .collect();
        Self {
            rows,
            pager: Pager::new(state.current_page, state.page_size, state.total),
            search_text: state.search_text.clone(),
            loading: state.loading,
            error: state.error.clone(),
        }
    }

    pub fn row(&self, position: usize) -> Option<&ContactRow> {
        self.rows.iter().find(|row| row.position == position)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Read-only view of a single contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    pub name: String,
    pub description: String,
    pub photo_url: String,
}

impl From<&Contact> for DetailView {
    fn from(contact: &Contact) -> Self {
        Self {
            name: contact.name.clone(),
            description: contact.description.clone(),
            photo_url: contact.photo_url.clone(),
        }
    }
}

impl From<&ContactRow> for DetailView {
    fn from(row: &ContactRow) -> Self {
        Self {
            name: row.name.clone(),
            description: row.description.clone(),
            photo_url: row.photo_url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelete {
    pub id: ContactId,
    pub name: String,
}

/// Row selection and delete confirmation for the list view.
#[derive(Debug, Clone, Default)]
pub struct ListInteraction {
    detail: Option<DetailView>,
    pending_delete: Option<PendingDelete>,
}

impl ListInteraction {
    pub fn select(&mut self, row: &ContactRow) {
        self.detail = Some(DetailView::from(row));
    }

    pub fn detail(&self) -> Option<&DetailView> {
        self.detail.as_ref()
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
    }

    pub fn request_delete(&mut self, row: &ContactRow) {
        self.pending_delete = Some(PendingDelete {
            id: row.id,
            name: row.name.clone(),
        });
    }

    pub fn pending_delete(&self) -> Option<&PendingDelete> {
        self.pending_delete.as_ref()
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Deletes the contact awaiting confirmation; `None` if nothing was pending.
    pub async fn confirm_delete(
        &mut self,
        controller: &DirectoryController,
    ) -> Option<Result<LoadOutcome, ClientError>> {
        let pending = self.pending_delete.take()?;
        Some(controller.remove(pending.id).await)
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
