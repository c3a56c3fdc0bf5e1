use chrono::{DateTime, Local, Utc};
use curator_core::{
    AppViewModel, CollectionRowView, CompanyRowView, HistoryEntry, JobRowView, JobStatus,
    Notification, NotificationKind,
};

const BAR_WIDTH: usize = 24;

pub fn render_collections(view: &AppViewModel) -> String {
    if view.collections.is_empty() {
        return "No collections.".to_string();
    }
    view.collections
        .iter()
        .map(format_collection_row)
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_collection_row(row: &CollectionRowView) -> String {
    let mut tags = Vec::new();
    if row.favorites {
        tags.push("favorites");
    }
    if row.protected {
        tags.push("protected");
    }
    let tags = if tags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", tags.join(", "))
    };
    format!(
        "{:<36} {:<30} {:>9}{}",
        row.id.as_str(),
        row.name,
        format_with_commas(row.total),
        tags
    )
}

/// Header, one line per visible company, and a footer with the range.
pub fn render_page(view: &AppViewModel) -> String {
    let name = view.collection_name.as_deref().unwrap_or("(no collection)");
    let mut lines = vec![format!(
        "{name} - page {page} of {pages}",
        page = view.page,
        pages = view.total_pages
    )];
    if !view.search_term.is_empty() {
        lines.push(format!(
            "Filter \"{}\": {} of {} loaded companies",
            view.search_term,
            view.rows.len(),
            view.loaded_count
        ));
    }
    if view.rows.is_empty() {
        lines.push("  (no companies)".to_string());
    }
    lines.extend(view.rows.iter().map(format_company_row));
    lines.push(format!(
        "Showing {}-{} of {}",
        view.start_index,
        view.end_index,
        format_with_commas(view.total)
    ));
    lines.join("\n")
}

fn format_company_row(row: &CompanyRowView) -> String {
    let heart = if row.liked { "\u{2665}" } else { " " };
    let mark = if row.selected { "x" } else { " " };
    format!("[{mark}] {heart} {:>8}  {}", row.id, row.name)
}

pub fn format_job_row(job: &JobRowView) -> String {
    let route = format!("{} -> {}", job.source_name, job.target_name);
    match job.status {
        JobStatus::Queued => format!("[{}] queued    {route}", job.job_id),
        JobStatus::Running => format!(
            "[{}] running   {route} {} {}/{} ({:.0}%)",
            job.job_id,
            progress_bar(job.percent),
            format_with_commas(job.processed),
            format_with_commas(job.total),
            job.percent
        ),
        JobStatus::Completed => format!(
            "[{}] completed {route}: {} inserted, {} skipped, {} failed",
            job.job_id,
            format_with_commas(job.inserted),
            format_with_commas(job.skipped),
            format_with_commas(job.failed)
        ),
        JobStatus::Failed => format!(
            "[{}] failed    {route}: {}",
            job.job_id,
            job.error.as_deref().unwrap_or("unknown error")
        ),
    }
}

fn progress_bar(percent: f64) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

pub fn render_history(entries: &[HistoryEntry]) -> String {
    entries
        .iter()
        .map(|entry| {
            format!(
                "{} {} companies: {} -> {}",
                format_timestamp(entry.timestamp),
                format_with_commas(entry.count),
                entry.source_list,
                entry.target_list
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_notification(notification: &Notification) -> String {
    let label = match notification.kind {
        NotificationKind::Success => "ok",
        NotificationKind::Error => "error",
        NotificationKind::Info => "info",
    };
    format!(
        "{} [{label}] {}",
        format_timestamp(notification.timestamp),
        notification.message
    )
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M:%S").to_string()
}

fn format_with_commas(value: u64) -> String {
    let mut out = String::new();
    for (i, ch) in value.to_string().chars().rev().enumerate() {
        if i != 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use curator_core::{CollectionId, JobId};
    use pretty_assertions::assert_eq;

    fn job(status: JobStatus) -> JobRowView {
        JobRowView {
            job_id: JobId::new("j1"),
            status,
            source_name: "My List".to_string(),
            target_name: "Liked Companies".to_string(),
            processed: 1_500,
            total: 3_000,
            inserted: 1_200,
            skipped: 300,
            failed: 0,
            error: None,
            percent: 50.0,
        }
    }

    #[test]
    fn commas_every_three_digits() {
        assert_eq!(format_with_commas(0), "0");
        assert_eq!(format_with_commas(999), "999");
        assert_eq!(format_with_commas(1_000), "1,000");
        assert_eq!(format_with_commas(1_234_567), "1,234,567");
    }

    #[test]
    fn running_job_shows_progress() {
        let line = format_job_row(&job(JobStatus::Running));
        assert!(line.contains("1,500/3,000"));
        assert!(line.contains("(50%)"));
        assert!(line.contains(&format!("[{}{}]", "#".repeat(12), "-".repeat(12))));
    }

    #[test]
    fn finished_jobs_show_counts_or_error() {
        let done = format_job_row(&job(JobStatus::Completed));
        assert!(done.contains("1,200 inserted, 300 skipped, 0 failed"));

        let failed = format_job_row(&JobRowView {
            error: Some("Transfer job timed out".to_string()),
            ..job(JobStatus::Failed)
        });
        assert!(failed.ends_with("Transfer job timed out"));
    }

    #[test]
    fn page_footer_reports_range() {
        let view = AppViewModel {
            collection_id: Some(CollectionId::new("all")),
            collection_name: Some("All".to_string()),
            page: 3,
            total_pages: 3,
            total: 120,
            start_index: 101,
            end_index: 120,
            ..AppViewModel::default()
        };
        let text = render_page(&view);
        assert!(text.starts_with("All - page 3 of 3"));
        assert!(text.ends_with("Showing 101-120 of 120"));
    }

    #[test]
    fn collection_rows_are_tagged() {
        let view = AppViewModel {
            collections: vec![CollectionRowView {
                id: CollectionId::new("fav"),
                name: "Liked Companies".to_string(),
                total: 12_000,
                selected: false,
                favorites: true,
                protected: true,
            }],
            ..AppViewModel::default()
        };
        let text = render_collections(&view);
        assert!(text.contains("12,000"));
        assert!(text.ends_with("[favorites, protected]"));
    }
}
