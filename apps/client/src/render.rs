//! Terminal rendering of the dashboard.

use std::fmt::Write as _;

use referhub_models::{Candidate, CandidateStats, CandidateStatus};

pub const EMPTY_STATE: &str = "No candidates found.";

/// Link target for a stored resume. Cloudinary guesses the content type of
/// `/upload/` URLs; `f_auto` makes it serve PDFs inline. Only the first
/// `/upload/` segment is rewritten and URLs without one pass through.
pub fn resume_view_url(resume_url: &str) -> String {
    resume_url.replacen("/upload/", "/upload/f_auto/", 1)
}

fn status_color(status: CandidateStatus) -> &'static str {
    match status {
        CandidateStatus::Pending => "\x1b[33m",
        CandidateStatus::Reviewed => "\x1b[34m",
        CandidateStatus::Hired => "\x1b[32m",
    }
}

pub fn status_badge(status: CandidateStatus, color: bool) -> String {
    if color {
        format!("{}{status}\x1b[0m", status_color(status))
    } else {
        status.to_string()
    }
}

pub fn render_stats(stats: &CandidateStats) -> String {
    format!(
        "Total: {}  Pending: {}  Reviewed: {}  Hired: {}",
        stats.total, stats.pending, stats.reviewed, stats.hired
    )
}

pub fn render_candidate(candidate: &Candidate, color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}  <{}>", candidate.name, candidate.email);
    let _ = writeln!(out, "  id:     {}", candidate.id);
    let _ = writeln!(out, "  role:   {}", candidate.job_title);
    let _ = writeln!(out, "  phone:  {}", candidate.phone);
    if let Some(url) = candidate.resume_url.as_deref() {
        let _ = writeln!(out, "  resume: {}", resume_view_url(url));
    }
    let _ = writeln!(out, "  status: {}", status_badge(candidate.status, color));
    out
}

pub fn render_candidates(candidates: &[Candidate], color: bool) -> String {
    if candidates.is_empty() {
        return format!("{EMPTY_STATE}\n");
    }
    candidates
        .iter()
        .map(|c| render_candidate(c, color))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn candidate(resume_url: Option<&str>) -> Candidate {
        Candidate {
            id: Uuid::nil(),
            name: "Ana Lima".to_string(),
            email: "ana@example.com".to_string(),
            phone: "555-0100".to_string(),
            job_title: "Frontend Engineer".to_string(),
            resume_url: resume_url.map(str::to_string),
            status: CandidateStatus::Hired,
            referred_by: Uuid::nil(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_resume_view_url_inserts_f_auto_once() {
        assert_eq!(
            resume_view_url("https://res.cloudinary.com/demo/image/upload/v1/cv.pdf"),
            "https://res.cloudinary.com/demo/image/upload/f_auto/v1/cv.pdf"
        );
        assert_eq!(
            resume_view_url("https://x/upload/a/upload/b.pdf"),
            "https://x/upload/f_auto/a/upload/b.pdf"
        );
        assert_eq!(
            resume_view_url("https://minio.local/bucket/resumes/cv.pdf"),
            "https://minio.local/bucket/resumes/cv.pdf"
        );
    }

    #[test]
    fn test_empty_list_renders_empty_state() {
        assert_eq!(render_candidates(&[], false), "No candidates found.\n");
    }

    #[test]
    fn test_candidate_card_uses_view_link() {
        let card = render_candidate(
            &candidate(Some("https://res.cloudinary.com/demo/image/upload/v1/cv.pdf")),
            false,
        );
        assert!(card.contains("resume: https://res.cloudinary.com/demo/image/upload/f_auto/v1/cv.pdf"));
        assert!(card.contains("status: Hired"));

        let card = render_candidate(&candidate(None), false);
        assert!(!card.contains("resume:"));
    }

    #[test]
    fn test_stats_line() {
        let stats = CandidateStats {
            total: 4,
            pending: 2,
            reviewed: 1,
            hired: 1,
        };
        assert_eq!(render_stats(&stats), "Total: 4  Pending: 2  Reviewed: 1  Hired: 1");
    }
}
