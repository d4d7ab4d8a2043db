//! Screen-level derivations over record listings.
//!
//! Nothing here holds state; every value is recomputed from the records it
//! is given.

use std::collections::HashMap;

use crate::model::{Booking, BookingStatus, Image, Project, ProjectStatus, ProjectSummary};

/// Which projects the gallery shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ProjectFilter {
    #[default]
    All,
    Project(String),
}

impl ProjectFilter {
    /// Parses a select-box value, where `"all"` is the catch-all sentinel.
    pub fn from_selection(value: &str) -> Self {
        if value.eq_ignore_ascii_case("all") {
            ProjectFilter::All
        } else {
            ProjectFilter::Project(value.to_string())
        }
    }
}

/// Search box and project selector of the gallery.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GalleryFilter {
    pub search: String,
    pub project: ProjectFilter,
}

impl GalleryFilter {
    /// Filter with the given search term and project selection.
    pub fn new(search: impl Into<String>, project: ProjectFilter) -> Self {
        Self {
            search: search.into(),
            project,
        }
    }

    /// Whether `image` passes the project filter and the search term matches
    /// its filename, its project's title or one of its tags, ignoring case.
    pub fn matches(&self, image: &Image, project_title: Option<&str>) -> bool {
        if let ProjectFilter::Project(id) = &self.project {
            if &image.project_id != id {
                return false;
            }
        }

        let term = self.search.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }

        let contains = |text: &str| text.to_lowercase().contains(&term);
        contains(image.filename.as_str())
            || project_title.is_some_and(|title| contains(title))
            || image.tags.iter().any(|tag| contains(tag.as_str()))
    }
}

/// An image as shown in the gallery grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryItem {
    pub image: Image,
    /// `None` when the image points at a project that no longer exists.
    pub project_title: Option<String>,
}

/// Applies `filter` to `images`, keeping their order.
pub fn filter_gallery(
    images: &[Image],
    projects: &[Project],
    filter: &GalleryFilter,
) -> Vec<GalleryItem> {
    let titles: HashMap<&str, &str> = projects
        .iter()
        .map(|project| (project.id.as_str(), project.title.as_str()))
        .collect();

    images
        .iter()
        .filter_map(|image| {
            let title = titles.get(image.project_id.as_str()).copied();
            filter.matches(image, title).then(|| GalleryItem {
                image: image.clone(),
                project_title: title.map(str::to_string),
            })
        })
        .collect()
}

/// Presentation tone of a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BadgeTone {
    Success,
    Info,
    Warning,
    Danger,
    Neutral,
}

impl BadgeTone {
    /// Tailwind classes the web front end renders the badge with.
    pub fn css_class(&self) -> &'static str {
        match self {
            BadgeTone::Success => "bg-green-500/20 text-green-400 border-green-500/30",
            BadgeTone::Info => "bg-studio-blue/20 text-studio-blue border-studio-blue/30",
            BadgeTone::Warning => "bg-orange-500/20 text-orange-400 border-orange-500/30",
            BadgeTone::Danger => "bg-red-500/20 text-red-400 border-red-500/30",
            BadgeTone::Neutral => "bg-gray-500/20 text-gray-400 border-gray-500/30",
        }
    }
}

impl From<ProjectStatus> for BadgeTone {
    fn from(status: ProjectStatus) -> Self {
        match status {
            ProjectStatus::Completed | ProjectStatus::Delivered => BadgeTone::Success,
            ProjectStatus::InProgress => BadgeTone::Info,
            ProjectStatus::Editing => BadgeTone::Warning,
        }
    }
}

impl From<BookingStatus> for BadgeTone {
    fn from(status: BookingStatus) -> Self {
        match status {
            BookingStatus::Approved | BookingStatus::Completed => BadgeTone::Success,
            BookingStatus::Pending => BadgeTone::Warning,
            BookingStatus::Rejected => BadgeTone::Danger,
        }
    }
}

/// Tone for a free-form status label; labels that name no known project or
/// booking status get [`BadgeTone::Neutral`].
pub fn badge_tone(label: &str) -> BadgeTone {
    if let Ok(status) = label.parse::<ProjectStatus>() {
        return status.into();
    }
    match label.parse::<BookingStatus>() {
        Ok(status) => status.into(),
        Err(_) => BadgeTone::Neutral,
    }
}

const RECENT_PROJECTS: usize = 3;

/// Figures shown on the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub active_projects: usize,
    pub total_photos: usize,
    pub pending_bookings: usize,
    pub storage_used_bytes: u64,
    pub recent_projects: Vec<ProjectSummary>,
}

impl DashboardStats {
    /// Scans the full record set; `projects` is expected in list order so
    /// the first entries are the most recent.
    pub fn compute(projects: &[ProjectSummary], bookings: &[Booking], images: &[Image]) -> Self {
        Self {
            active_projects: projects
                .iter()
                .filter(|summary| summary.project.status.is_active())
                .count(),
            total_photos: projects.iter().map(|summary| summary.image_count).sum(),
            pending_bookings: bookings
                .iter()
                .filter(|booking| booking.status == BookingStatus::Pending)
                .count(),
            storage_used_bytes: images.iter().map(|image| image.size_bytes).sum(),
            recent_projects: projects.iter().take(RECENT_PROJECTS).cloned().collect(),
        }
    }

    /// Storage figure rounded to one decimal, e.g. `2.3 GB`.
    pub fn storage_used_label(&self) -> String {
        format_bytes(self.storage_used_bytes)
    }
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
