//! Fixed option lists offered by the note upload form.
//!
//! The document store keeps these labels as free text; the lists only
//! constrain what a new upload may carry.

use serde::Serialize;

use crate::types::Note;

pub const ACADEMIC_YEARS: &[&str] = &["1st Year", "2nd Year", "3rd Year", "4th Year"];

pub const SEMESTERS: &[&str] = &["1st", "2nd", "3rd", "4th", "5th", "6th", "7th", "8th"];

pub const STREAMS: &[&str] = &[
    "Computer Science",
    "Textile Chemistry",
    "Textile Technology",
    "Electronics",
    "Fashion Designing",
];

pub const CATEGORIES: &[&str] = &[
    "Lecture Notes",
    "Practice Problems",
    "Previous Year Papers",
    "Study Material",
    "Lab Manual",
];

/// Semesters taught during an academic year, or `None` for an unknown year.
pub fn semesters_for_year(year: &str) -> Option<&'static [&'static str]> {
    let idx = ACADEMIC_YEARS.iter().position(|y| *y == year)?;
    Some(&SEMESTERS[idx * 2..idx * 2 + 2])
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearSemesters {
    pub year: &'static str,
    pub semesters: &'static [&'static str],
}

/// Everything a client needs to render the upload form.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub academic_years: &'static [&'static str],
    pub semesters: &'static [&'static str],
    pub year_semesters: Vec<YearSemesters>,
    pub streams: &'static [&'static str],
    pub categories: &'static [&'static str],
}

impl Catalog {
    pub fn get() -> Self {
        Self {
            academic_years: ACADEMIC_YEARS,
            semesters: SEMESTERS,
            year_semesters: ACADEMIC_YEARS
                .iter()
                .filter_map(|&y| {
                    semesters_for_year(y).map(|semesters| YearSemesters { year: y, semesters })
                })
                .collect(),
            streams: STREAMS,
            categories: CATEGORIES,
        }
    }
}

/// Notes of one stream, in store order.
#[derive(Debug, Clone, Serialize)]
pub struct StreamGroup {
    pub stream: &'static str,
    pub notes: Vec<Note>,
}

/// Bucket notes by stream in catalog order. Every stream gets a group, even
/// an empty one; notes whose subject is not a catalog stream are left out.
pub fn group_by_stream(notes: &[Note]) -> Vec<StreamGroup> {
    STREAMS
        .iter()
        .map(|&stream| StreamGroup {
            stream,
            notes: notes
                .iter()
                .filter(|n| n.subject == stream)
                .cloned()
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NewNote;
    use chrono::Utc;

    fn note(id: &str, subject: &str) -> Note {
        NewNote {
            title: format!("note {id}"),
            description: String::new(),
            subject: subject.into(),
            category: "Study Material".into(),
            academic_year: "1st Year".into(),
            semester: "1st".into(),
            uploaded_by: "Meera".into(),
            file_url: String::new(),
            file_path: String::new(),
        }
        .into_note(id.into(), Utc::now())
    }

    #[test]
    fn test_group_by_stream_keeps_order_and_empty_groups() {
        let notes = vec![
            note("3", "Electronics"),
            note("2", "Computer Science"),
            note("1", "Electronics"),
            note("0", "Basket Weaving"),
        ];
        let groups = group_by_stream(&notes);

        assert_eq!(groups.len(), STREAMS.len());
        assert_eq!(groups[0].stream, "Computer Science");
        assert_eq!(groups[0].notes.len(), 1);
        assert!(groups[1].notes.is_empty());

        let electronics: Vec<_> = groups[3].notes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(electronics, vec!["3", "1"]);

        let total: usize = groups.iter().map(|g| g.notes.len()).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn test_year_semester_map() {
        assert_eq!(semesters_for_year("1st Year"), Some(&["1st", "2nd"][..]));
        assert_eq!(semesters_for_year("3rd Year"), Some(&["5th", "6th"][..]));
        assert_eq!(semesters_for_year("4th Year"), Some(&["7th", "8th"][..]));
        assert_eq!(semesters_for_year("5th Year"), None);
    }

    #[test]
    fn test_catalog_covers_every_year() {
        let catalog = Catalog::get();
        assert_eq!(catalog.year_semesters.len(), ACADEMIC_YEARS.len());
        let json = serde_json::to_value(&catalog).unwrap();
        assert_eq!(json["yearSemesters"][1]["semesters"][0], "3rd");
        assert_eq!(json["streams"][0], "Computer Science");
    }
}
