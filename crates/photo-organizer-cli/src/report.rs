// Console summaries printed after each command. Details go to the log file.

use photo_organizer_core::url_list::SkipReason;
use photo_organizer_core::{Config, DownloadSummary, OrganizeReport, Partition, UrlList};
use photo_organizer_core::PipelineReport;

const RULE: &str = "======================================================================";

pub fn print_url_list(list: &UrlList) {
    let malformed = list
        .skipped
        .iter()
        .filter(|s| matches!(s.reason, SkipReason::Malformed(_)))
        .count();
    println!(
        "Loaded {} URLs ({} malformed, {} skipped by rules or repeats)",
        list.len(),
        malformed,
        list.skipped.len() - malformed
    );
}

pub fn print_download_summary(summary: &DownloadSummary) {
    println!(
        "\nDownloads: {} attempted, {} succeeded, {} failed",
        summary.attempted(),
        summary.succeeded(),
        summary.failed()
    );
    for (url, reason) in summary.failures() {
        println!("  failed: {} ({})", url, reason);
    }
    if summary.failed() > 0 {
        println!("Re-run the download to retry the failed URLs.");
    }
}

pub fn print_partition(partition: &Partition) {
    println!(
        "\nFilter: kept {} unique photos, moved {} thumbnails and {} exact duplicates",
        partition.unique.len(),
        partition.thumbnails.len(),
        partition.duplicates.len()
    );
}

pub fn print_organize_report(report: &OrganizeReport, organized_dir: Option<&std::path::Path>) {
    println!(
        "\nOrganized {} photos ({} already present)",
        report.organized.len(),
        report.already_present.len()
    );
    if let Some(dir) = organized_dir {
        println!("Saved to: {}", dir.display());
    }
    for path in report.organized.iter().take(10) {
        if let Some(name) = path.file_name() {
            println!("  {}", name.to_string_lossy());
        }
    }
    for collision in &report.collisions {
        println!(
            "  COLLISION {}: {} vs {}",
            collision.file_name,
            collision.first.display(),
            collision.second.display()
        );
    }
}

pub fn print_pipeline_report(report: &PipelineReport) {
    if let Some(summary) = &report.download {
        print_download_summary(summary);
    }
    if let Some(partition) = &report.partition {
        print_partition(partition);
    }
    match (&report.partition, &report.organize) {
        (_, Some(organized)) => {
            let dir = organized
                .organized
                .first()
                .or_else(|| organized.already_present.first())
                .and_then(|p| p.parent());
            print_organize_report(organized, dir);
        }
        (Some(_), None) => println!("\nNo photos left to organize."),
        (None, None) => {}
    }
}

pub fn print_config(config: &Config) {
    println!("\n{}\nCURRENT CONFIGURATION\n{}", RULE, RULE);
    println!("  download_dir:     {}", config.download_dir.display());
    println!("  organized_dir:    {}", config.organized_dir.display());
    println!("  thumbnails_dir:   {}", config.thumbnails_dir.display());
    println!("  duplicates_dir:   {}", config.duplicates_dir.display());
    println!("  naming_format:    {}", config.naming_format);
    println!("  date_order:       {}", config.date_order);
    println!(
        "  min dimensions:   {}x{} px",
        config.thumbnails.min_width, config.thumbnails.min_height
    );
    println!("  min_file_size_kb: {}", config.thumbnails.min_file_size_kb);
    println!("  timeout_secs:     {}", config.download.timeout_secs);
    println!("  delay_ms:         {}", config.download.delay_ms);
    println!("  user_agent:       {}", config.download.user_agent);
    println!("{}", RULE);
}
