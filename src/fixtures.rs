//! Sample catalog for demo accounts.

use time::macros::{date, time};
use time::{Date, OffsetDateTime, Time};
use tracing::info;
use uuid::Uuid;

use crate::error::Result;
use crate::model::{Booking, BookingStatus, Image, Project, ProjectStatus};
use crate::records::RecordStore;

struct SampleProject {
    title: &'static str,
    description: &'static str,
    client: &'static str,
    date: Date,
    location: &'static str,
    status: ProjectStatus,
    images: &'static [SampleImage],
}

struct SampleImage {
    url: &'static str,
    tags: &'static [&'static str],
    size_bytes: u64,
}

struct SampleBooking {
    client: &'static str,
    email: &'static str,
    shoot_type: &'static str,
    date: Date,
    time: Time,
    location: &'static str,
    status: BookingStatus,
    notes: &'static str,
    submitted: Date,
}

// Listed in the order listings return them in.
const PROJECTS: &[SampleProject] = &[
    SampleProject {
        title: "Sarah & Mike Wedding",
        description: "Beautiful outdoor wedding ceremony and reception",
        client: "Sarah Johnson",
        date: date!(2024-01-15),
        location: "Central Park, NYC",
        status: ProjectStatus::InProgress,
        images: &[SampleImage {
            url: "https://images.unsplash.com/photo-1469474968028-56623f02e42e?w=600",
            tags: &["wedding", "outdoor", "sunset"],
            size_bytes: 4_812_004,
        }],
    },
    SampleProject {
        title: "Corporate Headshots",
        description: "Professional headshots for tech company executives",
        client: "TechCorp Inc.",
        date: date!(2024-01-10),
        location: "Downtown Office",
        status: ProjectStatus::Completed,
        images: &[SampleImage {
            url: "https://images.unsplash.com/photo-1581091226825-a6a2a5aee158?w=600",
            tags: &["corporate", "headshots", "professional"],
            size_bytes: 3_204_551,
        }],
    },
    SampleProject {
        title: "Product Photography",
        description: "Fashion brand product catalog shoot",
        client: "Fashion Brand Co.",
        date: date!(2024-01-08),
        location: "Studio A",
        status: ProjectStatus::Editing,
        images: &[SampleImage {
            url: "https://images.unsplash.com/photo-1488590528505-98d2b5aba04b?w=600",
            tags: &["product", "fashion", "studio"],
            size_bytes: 2_998_310,
        }],
    },
    SampleProject {
        title: "Family Portrait Session",
        description: "Annual family photos at the beach",
        client: "The Anderson Family",
        date: date!(2024-01-05),
        location: "Santa Monica Beach",
        status: ProjectStatus::Delivered,
        images: &[SampleImage {
            url: "https://images.unsplash.com/photo-1470071459604-3b5ec3a7fe05?w=600",
            tags: &["family", "portrait", "beach"],
            size_bytes: 5_120_877,
        }],
    },
    // The last two only appear in the gallery; every image needs a project,
    // so they get portfolio projects of their own.
    SampleProject {
        title: "Urban Photography",
        description: "Street and architecture portfolio series",
        client: "Portfolio",
        date: date!(2024-01-03),
        location: "Lower Manhattan",
        status: ProjectStatus::Delivered,
        images: &[SampleImage {
            url: "https://images.unsplash.com/photo-1526374965328-7f61d4dc18c5?w=600",
            tags: &["urban", "street", "architecture"],
            size_bytes: 3_870_142,
        }],
    },
    SampleProject {
        title: "Nature Series",
        description: "Landscape portfolio series",
        client: "Portfolio",
        date: date!(2024-01-01),
        location: "Hudson Valley",
        status: ProjectStatus::Delivered,
        images: &[SampleImage {
            url: "https://images.unsplash.com/photo-1500673922987-e212871fec22?w=600",
            tags: &["nature", "landscape", "trees"],
            size_bytes: 4_406_219,
        }],
    },
];

const BOOKINGS: &[SampleBooking] = &[
    SampleBooking {
        client: "Emily Rodriguez",
        email: "emily@email.com",
        shoot_type: "Wedding Photography",
        date: date!(2024-02-15),
        time: time!(14:00),
        location: "Garden Venue, Brooklyn",
        status: BookingStatus::Pending,
        notes: "Outdoor ceremony followed by indoor reception. Need both photo and video coverage.",
        submitted: date!(2024-01-20),
    },
    SampleBooking {
        client: "Marcus Thompson",
        email: "marcus@techcorp.com",
        shoot_type: "Corporate Headshots",
        date: date!(2024-02-10),
        time: time!(10:00),
        location: "Tech Corp Offices, Manhattan",
        status: BookingStatus::Approved,
        notes: "Headshots for 15 executives. Professional attire required.",
        submitted: date!(2024-01-18),
    },
    SampleBooking {
        client: "Sarah Kim",
        email: "sarah@fashionco.com",
        shoot_type: "Product Photography",
        date: date!(2024-02-08),
        time: time!(9:00),
        location: "Studio B",
        status: BookingStatus::Completed,
        notes: "New spring collection catalog shoot. 50+ products to photograph.",
        submitted: date!(2024-01-15),
    },
    SampleBooking {
        client: "David Wilson",
        email: "david@email.com",
        shoot_type: "Family Portrait",
        date: date!(2024-02-20),
        time: time!(16:00),
        location: "Central Park",
        status: BookingStatus::Rejected,
        notes: "Family of 5 with young children. Golden hour preferred.",
        submitted: date!(2024-01-22),
    },
];

fn at_noon(date: Date) -> OffsetDateTime {
    date.with_time(time!(12:00)).assume_utc()
}

fn filename_of(url: &str) -> String {
    let path = url.split('?').next().unwrap_or(url);
    let stem = path.rsplit('/').next().unwrap_or(path);
    format!("{stem}.jpg")
}

/// Fills `owner`'s partition with the sample projects, their images and a
/// set of bookings.
///
/// Inserts prepend, so the samples are written in reverse to come back
/// in the order above.
pub async fn seed_sample_catalog(records: &RecordStore, owner: &str) -> Result<()> {
    for sample in PROJECTS.iter().rev() {
        let project = Project {
            id: Uuid::new_v4().to_string(),
            title: sample.title.to_string(),
            description: Some(sample.description.to_string()),
            client_name: Some(sample.client.to_string()),
            shoot_date: Some(sample.date),
            location: Some(sample.location.to_string()),
            status: sample.status,
            created_at: at_noon(sample.date),
        };

        for sample_image in sample.images {
            records
                .add_image(
                    owner,
                    Image {
                        id: Uuid::new_v4().to_string(),
                        url: sample_image.url.to_string(),
                        filename: filename_of(sample_image.url),
                        project_id: project.id.clone(),
                        tags: sample_image.tags.iter().map(|tag| tag.to_string()).collect(),
                        size_bytes: sample_image.size_bytes,
                        created_at: at_noon(sample.date),
                    },
                )
                .await?;
        }

        records.insert(owner, None, project).await?;
    }

    for sample in BOOKINGS.iter().rev() {
        let booking = Booking {
            id: Uuid::new_v4().to_string(),
            client_name: sample.client.to_string(),
            email: sample.email.to_string(),
            shoot_type: sample.shoot_type.to_string(),
            date: sample.date,
            time: Some(sample.time),
            location: Some(sample.location.to_string()),
            notes: Some(sample.notes.to_string()),
            status: sample.status,
            submitted_at: at_noon(sample.submitted),
        };
        records.insert(owner, None, booking).await?;
    }

    info!(
        owner,
        projects = PROJECTS.len(),
        bookings = BOOKINGS.len(),
        "seeded sample catalog"
    );
    Ok(())
}
