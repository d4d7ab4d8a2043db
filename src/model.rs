//! Records kept by the store and the session types handed out by the
//! session manager.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, Time};

/// Type tag of a logical collection.
///
/// The tag is part of every storage key, so two kinds never share a stored
/// sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Project,
    Image,
    Booking,
    Session,
}

impl RecordKind {
    /// Segment used for this kind inside a storage key.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Project => "projects",
            RecordKind::Image => "images",
            RecordKind::Booking => "bookings",
            RecordKind::Session => "session",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Project => write!(f, "project"),
            RecordKind::Image => write!(f, "image"),
            RecordKind::Booking => write!(f, "booking"),
            RecordKind::Session => write!(f, "session"),
        }
    }
}

/// A signed-in user. Created on sign-up or first sign-in and never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub created_at: OffsetDateTime,
}

/// A locally fabricated session.
///
/// Tokens are opaque and carry no authority; they only exist so callers can
/// treat a demo session like one issued by a real identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
    pub issued_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
}

impl Session {
    /// Whether the session is past its expiry at `now`.
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now
    }
}

/// Optional profile data supplied at sign-up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpMetadata {
    pub full_name: Option<String>,
}

/// Returned when a status label does not name a known status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status `{0}`")]
pub struct UnknownStatus(pub String);

fn normalize_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Where a project stands. New projects start in progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectStatus {
    #[default]
    InProgress,
    Editing,
    Completed,
    Delivered,
}

impl ProjectStatus {
    /// Label shown on status badges.
    pub fn label(&self) -> &'static str {
        match self {
            ProjectStatus::InProgress => "In Progress",
            ProjectStatus::Editing => "Editing",
            ProjectStatus::Completed => "Completed",
            ProjectStatus::Delivered => "Delivered",
        }
    }

    /// Projects still being worked on count as active on the dashboard.
    pub fn is_active(&self) -> bool {
        matches!(self, ProjectStatus::InProgress | ProjectStatus::Editing)
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for ProjectStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "inprogress" => Ok(ProjectStatus::InProgress),
            "editing" => Ok(ProjectStatus::Editing),
            "completed" => Ok(ProjectStatus::Completed),
            "delivered" => Ok(ProjectStatus::Delivered),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

/// A photography project owned by one user.
///
/// The number of images is not part of the record; see [`ProjectSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub client_name: Option<String>,
    pub shoot_date: Option<Date>,
    pub location: Option<String>,
    pub status: ProjectStatus,
    pub created_at: OffsetDateTime,
}

/// Form input for a new project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewProject {
    pub title: String,
    pub description: Option<String>,
    pub client_name: Option<String>,
    pub shoot_date: Option<Date>,
    pub location: Option<String>,
    pub status: ProjectStatus,
}

impl NewProject {
    /// Input with just a title; everything else is left at its default.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// A project together with its derived image count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSummary {
    pub project: Project,
    pub image_count: usize,
}

/// An uploaded image belonging to a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub id: String,
    pub url: String,
    pub filename: String,
    pub project_id: String,
    pub tags: BTreeSet<String>,
    pub size_bytes: u64,
    pub created_at: OffsetDateTime,
}

/// Review state of a booking request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookingStatus {
    #[default]
    Pending,
    Approved,
    Completed,
    Rejected,
}

impl BookingStatus {
    /// Label shown on status badges.
    pub fn label(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Approved => "Approved",
            BookingStatus::Completed => "Completed",
            BookingStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for BookingStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "pending" => Ok(BookingStatus::Pending),
            "approved" => Ok(BookingStatus::Approved),
            "completed" => Ok(BookingStatus::Completed),
            "rejected" => Ok(BookingStatus::Rejected),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

/// A client's request for a shoot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub client_name: String,
    pub email: String,
    pub shoot_type: String,
    pub date: Date,
    pub time: Option<Time>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub status: BookingStatus,
    pub submitted_at: OffsetDateTime,
}

/// Form input for a new booking. New bookings always start as pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub client_name: String,
    pub email: String,
    pub shoot_type: String,
    pub date: Date,
    pub time: Option<Time>,
    pub location: Option<String>,
    pub notes: Option<String>,
}
