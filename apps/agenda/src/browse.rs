//! Interactive browse loop over the directory.

use anyhow::Result;
use client_core::{
    form::{CreationForm, FormField},
    view::{ListInteraction, ListView},
    DirectoryController, SubmitOutcome,
};
use tracing::debug;

use crate::{prompt::Prompt, render};

const HELP: &str = "\
Commands:
  /<text>      search (a lone / clears the search)
  n, p         next / previous page
  page <N>     jump to page N
  size <N>     show N contacts per page
  open <row>   show contact details
  del <row>    delete a contact (asks for confirmation)
  add          add a new contact
  r            reload
  ?            help
  q            quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    Search(String),
    Next,
    Previous,
    Page(u32),
    PageSize(u32),
    Open(usize),
    Delete(usize),
    Add,
    Reload,
    Help,
    Quit,
    Unknown(String),
}

impl BrowseCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if let Some(text) = line.strip_prefix('/') {
            return Self::Search(text.trim().to_string());
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        match (word, rest) {
            ("n" | "next", "") => Self::Next,
            ("p" | "prev", "") => Self::Previous,
            ("page", n) => n.parse().map(Self::Page).unwrap_or_else(|_| Self::Unknown(line.into())),
            ("size", n) => match n.parse() {
                Ok(size) if size > 0 => Self::PageSize(size),
                _ => Self::Unknown(line.into()),
            },
            ("open", n) => n.parse().map(Self::Open).unwrap_or_else(|_| Self::Unknown(line.into())),
            ("del" | "delete", n) => n
                .parse()
                .map(Self::Delete)
                .unwrap_or_else(|_| Self::Unknown(line.into())),
            ("add", "") => Self::Add,
            ("r" | "reload", "") => Self::Reload,
            ("?" | "help", "") => Self::Help,
            ("q" | "quit" | "exit", "") => Self::Quit,
            _ => Self::Unknown(line.into()),
        }
    }
}

async fn flush_notifications(controller: &DirectoryController) {
    for note in controller.drain_notifications().await {
        println!("{}", render::notification(&note));
    }
}

pub async fn run(controller: &DirectoryController, prompt: &mut Prompt) -> Result<()> {
    let mut interaction = ListInteraction::default();
    let mut form = CreationForm::new();
    controller.reload().await;
    println!("{HELP}\n");

    loop {
        flush_notifications(controller).await;
        let view = ListView::from_state(&controller.snapshot().await);
        print!("{}", render::list(&view));

        let Some(line) = prompt.ask("> ").await? else {
            break;
        };
        if line.is_empty() {
            continue;
        }
        let command = BrowseCommand::parse(&line);
        debug!(?command, "browse command");

        let pager = &view.pager;
        match command {
            BrowseCommand::Quit => break,
            BrowseCommand::Help => println!("{HELP}"),
            BrowseCommand::Search(text) => {
                controller.search(&text).await;
            }
            BrowseCommand::Next if pager.has_next() => {
                controller
                    .change_page(pager.current_page + 1, pager.page_size)
                    .await;
            }
            BrowseCommand::Previous if pager.has_previous() => {
                controller
                    .change_page(pager.current_page - 1, pager.page_size)
                    .await;
            }
            BrowseCommand::Next | BrowseCommand::Previous => println!("No more pages."),
            BrowseCommand::Page(page) => {
                controller.change_page(page, pager.page_size).await;
            }
            BrowseCommand::PageSize(size) => {
                controller.change_page(1, size).await;
            }
            BrowseCommand::Open(position) => match view.row(position) {
                Some(row) => {
                    interaction.select(row);
                    if let Some(detail) = interaction.detail() {
                        println!("\n{}", render::detail(detail));
                    }
                    interaction.close_detail();
                }
                None => println!("No row {position} on this page."),
            },
            BrowseCommand::Delete(position) => match view.row(position) {
                Some(row) => {
                    interaction.request_delete(row);
                    let question = format!("Delete \"{}\"?", row.name);
                    if prompt.confirm(&question).await? {
                        let _ = interaction.confirm_delete(controller).await;
                    } else {
                        interaction.cancel_delete();
                    }
                }
                None => println!("No row {position} on this page."),
            },
            BrowseCommand::Add => fill_form(&mut form, controller, prompt).await?,
            BrowseCommand::Reload => {
                controller.reload().await;
            }
            BrowseCommand::Unknown(input) => println!("Unknown command '{input}'; ? for help."),
        }
    }
    Ok(())
}

/// Walks the user through the creation form. Typing `/cancel` abandons it.
async fn fill_form(
    form: &mut CreationForm,
    controller: &DirectoryController,
    prompt: &mut Prompt,
) -> Result<()> {
    form.open();
    let mut fields: Vec<FormField> = FormField::ALL.to_vec();

    while form.is_open() {
        for field in &fields {
            let Some(value) = prompt.ask(&format!("{}: ", field.label())).await? else {
                form.cancel();
                return Ok(());
            };
            if value == "/cancel" {
                form.cancel();
                println!("Cancelled.");
                return Ok(());
            }
            form.set(*field, value);
        }

        match form.submit(controller).await {
            SubmitOutcome::Created(_) => {}
            SubmitOutcome::Invalid => {
                print!("{}", render::form_errors(form));
                fields = form.errors().iter().map(|err| err.field).collect();
            }
            SubmitOutcome::Failed(_) => {
                print!("{}", render::form_errors(form));
                if prompt.confirm("Retry?").await? {
                    fields.clear();
                } else {
                    form.cancel();
                }
            }
        }
    }
    Ok(())
}
