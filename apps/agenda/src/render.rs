//! Plain-text rendering of the list view, detail view, form and notifications.

use std::fmt::Write as _;

use client_core::{
    events::{Notification, NotificationLevel},
    form::{CreationForm, FormField},
    view::{DetailView, ListView, Pager},
};

const DESCRIPTION_WIDTH: usize = 48;

pub fn list(view: &ListView) -> String {
    let mut out = String::new();
    if !view.search_text.is_empty() {
        let _ = writeln!(out, "Search: \"{}\"", view.search_text);
    }
    if view.loading {
        let _ = writeln!(out, "Loading...");
        return out;
    }
    if let Some(error) = &view.error {
        let _ = writeln!(out, "Error: {error}");
    }

    if view.is_empty() {
        let _ = writeln!(out, "No contacts found.");
    } else {
        let name_width = view
            .rows
            .iter()
            .map(|row| row.name.chars().count())
            .max()
            .unwrap_or(0)
            .max(4);
        let _ = writeln!(out, "  #  {:<name_width$}  Description", "Name");
        for row in &view.rows {
            let _ = writeln!(
                out,
                "{:>3}  {:<name_width$}  {}",
                row.position,
                row.name,
                truncate(&row.description, DESCRIPTION_WIDTH)
            );
        }
    }
    out.push_str(&pager(&view.pager));
    out.push('\n');
    out
}

pub fn pager(pager: &Pager) -> String {
    if pager.total_pages == 0 {
        return "Page 0 of 0 (0 contacts)".to_string();
    }
    let links: Vec<String> = pager
        .pages
        .iter()
        .map(|page| match page {
            Some(page) if *page == pager.current_page => format!("[{page}]"),
            Some(page) => page.to_string(),
            None => "...".to_string(),
        })
        .collect();
    format!(
        "Page {} of {} ({} contacts, {} per page)  {} {} {}",
        pager.current_page,
        pager.total_pages,
        pager.total,
        pager.page_size,
        if pager.has_previous() { "<" } else { " " },
        links.join(" "),
        if pager.has_next() { ">" } else { " " },
    )
    .trim_end()
    .to_string()
}

pub fn detail(view: &DetailView) -> String {
    format!(
        "{}\n{}\nPhoto: {}\n",
        view.name, view.description, view.photo_url
    )
}

pub fn notification(note: &Notification) -> String {
    match note.level {
        NotificationLevel::Success => format!("[ok] {}", note.message),
        NotificationLevel::Error => format!("[error] {}", note.message),
    }
}

pub fn form_errors(form: &CreationForm) -> String {
    let mut out = String::new();
    for field in FormField::ALL {
        if let Some(err) = form.error_for(field) {
            let _ = writeln!(out, "{}: {}", field.label(), err.message);
        }
    }
    if let Some(message) = form.submit_error() {
        let _ = writeln!(out, "{message}");
    }
    out
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}
