// Interactive menu. Each choice maps to a `MenuAction`, and `dispatch` calls
// into the core pipeline; no pipeline logic lives in the prompts.

use anyhow::Result;
use dialoguer::{Confirm, Input, Select};
use log::error;
use photo_organizer_core::url_list::parse_url_list;
use photo_organizer_core::{
    Config, DateOrder, DateRange, NamingFormat, PhotoOrganizer, UrlList,
};
use std::path::Path;

use crate::report;

pub const INSTRUCTIONS: &str = "\
URL EXTRACTION INSTRUCTIONS

Browser console method:
  1. Open the page with the photos and log in if needed
  2. Load every photo (scroll, click 'Load more')
  3. Press F12 and open the Console tab
  4. Paste the extractor script and press Enter
  5. Save the produced list as a text file

Manual method:
  Save image URLs to a text file, one per line, e.g.
    https://example.com/photos/photo1.jpg
    https://example.com/photos/photo2.jpg

Then choose 'Download photos' and give the path to that file,
or paste the URLs directly and finish with 'done'.";

/// Operations offered by the menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    ConfigureSettings,
    ShowInstructions,
    DownloadPhotos,
    OrganizePhotos,
    ViewSettings,
    Exit,
}

impl MenuAction {
    pub const ALL: [MenuAction; 6] = [
        MenuAction::ConfigureSettings,
        MenuAction::ShowInstructions,
        MenuAction::DownloadPhotos,
        MenuAction::OrganizePhotos,
        MenuAction::ViewSettings,
        MenuAction::Exit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::ConfigureSettings => "Configure settings",
            Self::ShowInstructions => "Extract URLs from a website (instructions)",
            Self::DownloadPhotos => "Download photos from a URL list",
            Self::OrganizePhotos => "Organize downloaded photos",
            Self::ViewSettings => "View current configuration",
            Self::Exit => "Exit",
        }
    }
}

/// Run the menu until the user exits
pub fn main_menu(mut config: Config, config_path: &Path) -> Result<()> {
    let labels: Vec<&str> = MenuAction::ALL.iter().map(|a| a.label()).collect();

    loop {
        println!();
        let choice = Select::new()
            .with_prompt("PHOTO DOWNLOADER & ORGANIZER")
            .items(&labels)
            .default(0)
            .interact()?;

        let action = MenuAction::ALL[choice];
        if action == MenuAction::Exit {
            println!("Goodbye!");
            return Ok(());
        }

        // A failed step is reported and the menu carries on
        if let Err(e) = dispatch(action, &mut config, config_path) {
            error!("{:?} failed: {:#}", action, e);
            println!("\n{:#}", e);
        }
    }
}

fn dispatch(action: MenuAction, config: &mut Config, config_path: &Path) -> Result<()> {
    match action {
        MenuAction::ConfigureSettings => configure_settings(config, config_path),
        MenuAction::ShowInstructions => {
            println!("\n{}", INSTRUCTIONS);
            Ok(())
        }
        MenuAction::DownloadPhotos => download_photos(config),
        MenuAction::OrganizePhotos => organize_photos(config),
        MenuAction::ViewSettings => {
            report::print_config(config);
            Ok(())
        }
        MenuAction::Exit => Ok(()),
    }
}

fn configure_settings(config: &mut Config, config_path: &Path) -> Result<()> {
    report::print_config(config);

    let options = [
        "Change download folder",
        "Change naming format",
        "Change date order",
        "Change minimum thumbnail dimensions",
        "Change minimum file size",
        "Return to main menu",
    ];
    let choice = Select::new().items(&options).default(0).interact()?;

    match choice {
        0 => {
            let folder: String = Input::new()
                .with_prompt("New download folder")
                .with_initial_text(config.download_dir.display().to_string())
                .interact_text()?;
            config.set("download_dir", &folder)?;
        }
        1 => {
            let labels: Vec<String> = NamingFormat::ALL
                .iter()
                .map(|f| format!("{} ({})", f, f.format(example_date())))
                .collect();
            let idx = Select::new().items(&labels).default(0).interact()?;
            config.naming_format = NamingFormat::ALL[idx];
        }
        2 => {
            let orders = [DateOrder::NewestFirst, DateOrder::OldestFirst];
            let labels = ["newest_first - most recent photos first", "oldest_first - oldest photos first"];
            let idx = Select::new().items(&labels).default(0).interact()?;
            config.date_order = orders[idx];
        }
        3 => {
            let width: String = Input::new()
                .with_prompt("Minimum width in pixels")
                .default(config.thumbnails.min_width.to_string())
                .interact_text()?;
            let height: String = Input::new()
                .with_prompt("Minimum height in pixels")
                .default(config.thumbnails.min_height.to_string())
                .interact_text()?;
            config.set("min_width", &width)?;
            config.set("min_height", &height)?;
        }
        4 => {
            let size: String = Input::new()
                .with_prompt("Minimum file size in KB (0 disables)")
                .default(config.thumbnails.min_file_size_kb.to_string())
                .interact_text()?;
            config.set("min_file_size_kb", &size)?;
        }
        _ => return Ok(()),
    }

    config.save_to_file(config_path)?;
    println!("Configuration updated!");
    Ok(())
}

/// Line that ends a pasted URL list
const PASTE_TERMINATOR: &str = "done";

/// Join pasted lines up to (not including) the terminator
fn collect_pasted<I: IntoIterator<Item = String>>(lines: I) -> String {
    lines
        .into_iter()
        .take_while(|line| !line.trim().eq_ignore_ascii_case(PASTE_TERMINATOR))
        .collect::<Vec<_>>()
        .join("\n")
}

fn prompt_pasted_lines() -> Result<Vec<String>> {
    println!("Paste URLs one per line, then type '{}':", PASTE_TERMINATOR);
    let mut lines = Vec::new();
    loop {
        let line: String = Input::new().allow_empty(true).interact_text()?;
        let finished = line.trim().eq_ignore_ascii_case(PASTE_TERMINATOR);
        lines.push(line);
        if finished {
            return Ok(lines);
        }
    }
}

fn prompt_url_list(organizer: &PhotoOrganizer) -> Result<UrlList> {
    let sources = ["Load URLs from a text file", "Paste URLs manually"];
    let source = Select::new()
        .with_prompt("Where are the URLs?")
        .items(&sources)
        .default(0)
        .interact()?;

    if source == 0 {
        let path: String = Input::new()
            .with_prompt("Path to URL list file")
            .interact_text()?;
        return Ok(organizer.load_urls(path.trim())?);
    }

    let text = collect_pasted(prompt_pasted_lines()?);
    Ok(parse_url_list(&text, &organizer.config().url_rules))
}

fn download_photos(config: &Config) -> Result<()> {
    let organizer = PhotoOrganizer::new(config.clone());
    let urls = prompt_url_list(&organizer)?;
    report::print_url_list(&urls);
    if urls.is_empty() {
        println!("No URLs to download.");
        return Ok(());
    }

    let summary = organizer.download(&urls.urls)?;
    report::print_download_summary(&summary);

    if summary.succeeded() > 0
        && Confirm::new()
            .with_prompt("Organize photos now?")
            .default(true)
            .interact()?
    {
        organize_with(&organizer)?;
    }
    Ok(())
}

fn organize_photos(config: &Config) -> Result<()> {
    let folder: String = Input::new()
        .with_prompt("Folder to organize")
        .default(config.download_dir.display().to_string())
        .interact_text()?;

    let mut config = config.clone();
    config.download_dir = folder.trim().into();
    if !config.download_dir.exists() {
        println!("Folder not found: {}", config.download_dir.display());
        return Ok(());
    }

    organize_with(&PhotoOrganizer::new(config))
}

fn organize_with(organizer: &PhotoOrganizer) -> Result<()> {
    let range = prompt_date_range()?;
    let outcome = organizer.organize_staged(range.as_ref())?;
    report::print_pipeline_report(&outcome);
    Ok(())
}

/// Ask for an optional date range; an invalid range aborts the step
fn prompt_date_range() -> Result<Option<DateRange>> {
    let assign = Confirm::new()
        .with_prompt("Assign dates to these photos?")
        .default(true)
        .interact()?;
    if !assign {
        return Ok(None);
    }

    let start: String = Input::new()
        .with_prompt("Start date (YYYY-MM-DD)")
        .interact_text()?;
    let end: String = Input::new()
        .with_prompt("End date (YYYY-MM-DD)")
        .interact_text()?;

    let range = DateRange::parse(&start, &end)?;
    println!("Date range: {}", range);
    Ok(Some(range))
}

fn example_date() -> chrono::NaiveDate {
    chrono::NaiveDate::from_ymd_opt(2025, 1, 28).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_lists_every_action_once() {
        assert_eq!(MenuAction::ALL.len(), 6);
        assert_eq!(MenuAction::ALL[5], MenuAction::Exit);
        let labels: std::collections::HashSet<_> =
            MenuAction::ALL.iter().map(|a| a.label()).collect();
        assert_eq!(labels.len(), MenuAction::ALL.len());
    }

    #[test]
    fn test_pasted_lines_stop_at_done() {
        let lines = [
            "https://photos.test/a.jpg",
            "",
            "https://photos.test/b.jpg",
            "  DONE ",
            "https://photos.test/ignored.jpg",
        ]
        .map(String::from);

        let text = collect_pasted(lines);
        let list = parse_url_list(&text, &Config::default().url_rules);
        assert_eq!(
            list.urls,
            vec!["https://photos.test/a.jpg", "https://photos.test/b.jpg"]
        );
    }

    #[test]
    fn test_non_interactive_actions_dispatch() {
        let dir = std::env::temp_dir().join("photo-organizer-menu-test");
        let mut config = Config::default();
        assert!(dispatch(MenuAction::ViewSettings, &mut config, &dir.join("c.json")).is_ok());
        assert!(dispatch(MenuAction::ShowInstructions, &mut config, &dir.join("c.json")).is_ok());
        assert_eq!(config, Config::default());
    }
}
